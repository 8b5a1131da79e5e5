//! Gate runs: driving a unit of work to a single terminal outcome.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::deadline::Deadline;
use super::state::{CompletionWait, DoneHandle, FailReason, GateReport, GateShared, TestOutcome};
use crate::assert::Assertions;
use crate::error::Error;

/// Drives one asynchronous unit of work to exactly one terminal outcome.
///
/// A gate is configured first (deadline, expected assertion count), then
/// runs a single unit of work through one of three completion styles. The
/// style is declared by the method the caller picks, never inferred from
/// what the body returns:
///
/// - [`run_callback_style`](CompletionGate::run_callback_style) - the body
///   receives a [`DoneHandle`] and signals completion explicitly
/// - [`run_deferred_style`](CompletionGate::run_deferred_style) - the body
///   returns a deferred value that resolves or rejects
/// - [`run_suspending_style`](CompletionGate::run_suspending_style) - the
///   body is itself a unit of work with internal suspension points
///
/// Reaching the deadline stops the wait and yields `Failed(Timeout)`; it
/// does not abort a still-running body, and signals arriving after the
/// terminal transition are reported as violations without un-terminating
/// the gate.
///
/// # Example
///
/// ```rust,ignore
/// use std::time::Duration;
/// use mockgate::gate::{CompletionGate, TestOutcome};
///
/// let gate = CompletionGate::new().with_deadline(Duration::from_secs(5));
/// let report = gate
///     .run_deferred_style(|| async { Ok::<_, String>("peanut butter") })
///     .await;
/// assert_eq!(report.outcome, TestOutcome::Succeeded("peanut butter"));
/// ```
#[derive(Debug, Default)]
pub struct CompletionGate {
    deadline: Option<Duration>,
    assertions: Assertions,
}

impl CompletionGate {
    /// Create a gate with no deadline and no declared assertion count.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the run with `Failed(Timeout)` if no completion arrives within
    /// `limit`.
    #[must_use]
    pub fn with_deadline(mut self, limit: Duration) -> Self {
        self.deadline = Some(limit);
        self
    }

    /// Declare the number of assertions the unit of work must execute. A
    /// run that completes successfully with any other count is forced to
    /// `Failed(AssertionCount)`.
    #[must_use]
    pub fn expect_assertions(self, count: usize) -> Self {
        self.assertions.expect_count(count);
        self
    }

    /// The configured deadline, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// A handle onto this gate's assertion counter, for moving into the
    /// unit of work.
    #[must_use]
    pub fn assertions(&self) -> Assertions {
        self.assertions.clone()
    }

    /// Run a body that signals completion through an explicit
    /// [`DoneHandle`].
    ///
    /// The body is invoked synchronously; it typically moves the handle
    /// into spawned work and returns immediately. The run resolves when
    /// the handle is invoked or the deadline elapses.
    pub async fn run_callback_style<B>(&self, body: B) -> GateReport<()>
    where
        B: FnOnce(DoneHandle),
    {
        let shared = GateShared::new();
        body(DoneHandle::new(Arc::clone(&shared)));

        let wait = CompletionWait::new(Arc::clone(&shared));
        let outcome = match Deadline::new(wait, self.deadline).await {
            Ok(outcome) => outcome,
            Err(limit) => shared.force_timeout(limit),
        };

        self.seal(outcome, shared.take_violations())
    }

    /// Run a body that returns a deferred value, and wait for it to
    /// resolve or reject.
    pub async fn run_deferred_style<B, F, T, E>(&self, body: B) -> GateReport<T>
    where
        B: FnOnce() -> F,
        F: Future<Output = Result<T, E>>,
        E: Display,
    {
        let deferred = body();
        self.drive(deferred).await
    }

    /// Run a unit of work that may suspend internally, and wait for it to
    /// complete or raise.
    pub async fn run_suspending_style<F, T, E>(&self, work: F) -> GateReport<T>
    where
        F: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.drive(work).await
    }

    async fn drive<F, T, E>(&self, work: F) -> GateReport<T>
    where
        F: Future<Output = Result<T, E>>,
        E: Display,
    {
        let outcome = match Deadline::new(work, self.deadline).await {
            Ok(Ok(value)) => TestOutcome::Succeeded(value),
            Ok(Err(error)) => TestOutcome::Failed(FailReason::Rejected(error.to_string())),
            Err(limit) => TestOutcome::Failed(FailReason::Timeout(limit)),
        };

        self.seal(outcome, Vec::new())
    }

    /// Apply the assertion-count contract and package the report. The
    /// count check only overrides a success; an earlier failure stands.
    fn seal<T>(&self, outcome: TestOutcome<T>, violations: Vec<Error>) -> GateReport<T> {
        let outcome = match outcome {
            TestOutcome::Succeeded(value) => match self.assertions.count_mismatch() {
                None => TestOutcome::Succeeded(value),
                Some((expected, executed)) => {
                    TestOutcome::Failed(FailReason::AssertionCount { expected, executed })
                }
            },
            failed @ TestOutcome::Failed(_) => failed,
        };

        GateReport { outcome, violations }
    }
}
