//! The completion state machine shared between a gate run, its completion
//! handles, and the future waiting on it.

use std::fmt::{self, Debug, Display};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::Error;

/// Terminal verdict of one gate run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOutcome<T = ()> {
    /// The unit of work completed and its asserted outcome held.
    Succeeded(T),
    /// The unit of work failed, timed out, or broke the assertion contract.
    Failed(FailReason),
}

impl<T> TestOutcome<T> {
    /// Returns `true` for [`TestOutcome::Succeeded`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    /// Returns `true` for [`TestOutcome::Failed`].
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The success value, if any.
    #[must_use]
    pub fn success(self) -> Option<T> {
        match self {
            Self::Succeeded(value) => Some(value),
            Self::Failed(_) => None,
        }
    }

    /// The failure reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&FailReason> {
        match self {
            Self::Succeeded(_) => None,
            Self::Failed(reason) => Some(reason),
        }
    }
}

impl<T> Display for TestOutcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded(_) => f.write_str("succeeded"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Why a gate run failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailReason {
    /// The unit of work reported an error.
    Rejected(String),
    /// The deadline elapsed before any completion signal.
    Timeout(Duration),
    /// The declared assertion count was not met.
    AssertionCount {
        /// The count declared up front.
        expected: usize,
        /// The count actually executed.
        executed: usize,
    },
}

impl Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected(reason) => write!(f, "rejected with {reason:?}"),
            Self::Timeout(limit) => write!(f, "timed out after {limit:?}"),
            Self::AssertionCount { expected, executed } => {
                write!(f, "expected {expected} assertion(s), {executed} executed")
            }
        }
    }
}

/// Everything one gate run produced: the terminal outcome plus any protocol
/// violations observed along the way.
///
/// Violations (currently only [`Error::DoubleCompletion`]) never change the
/// terminal outcome; they are reported alongside it so the enclosing test
/// can fail on them explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateReport<T = ()> {
    /// The terminal outcome of the run.
    pub outcome: TestOutcome<T>,
    /// Protocol violations observed during the run.
    pub violations: Vec<Error>,
}

impl<T> GateReport<T> {
    /// Returns `true` when the outcome succeeded and no violations were
    /// observed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.outcome.is_success() && self.violations.is_empty()
    }
}

enum GateState {
    Pending { waker: Option<Waker> },
    Done(TestOutcome<()>),
}

pub(crate) struct GateShared {
    state: Mutex<GateState>,
    violations: Mutex<Vec<Error>>,
}

impl GateShared {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(GateState::Pending { waker: None }),
            violations: Mutex::new(Vec::new()),
        })
    }

    /// Drive the gate to a terminal state. A signal that arrives after the
    /// gate is already terminal is recorded as a violation, never applied.
    pub(crate) fn complete(&self, outcome: TestOutcome<()>) {
        let mut state = self.state.lock();
        if let GateState::Done(prior) = &*state {
            let terminal = prior.to_string();
            drop(state);
            self.violations
                .lock()
                .push(Error::DoubleCompletion { terminal });
            return;
        }

        let previous = std::mem::replace(&mut *state, GateState::Done(outcome));
        drop(state);
        if let GateState::Pending { waker: Some(waker) } = previous {
            waker.wake();
        }
    }

    /// Transition to `Failed(Timeout)` unless already terminal; returns the
    /// terminal outcome either way. Reaching the deadline is not a signal,
    /// so an already-terminal gate records no violation here.
    pub(crate) fn force_timeout(&self, limit: Duration) -> TestOutcome<()> {
        let mut state = self.state.lock();
        match &*state {
            GateState::Done(outcome) => outcome.clone(),
            GateState::Pending { .. } => {
                let outcome = TestOutcome::Failed(FailReason::Timeout(limit));
                *state = GateState::Done(outcome.clone());
                outcome
            }
        }
    }

    pub(crate) fn take_violations(&self) -> Vec<Error> {
        std::mem::take(&mut *self.violations.lock())
    }
}

/// The completion signal handed to a callback-style test body.
///
/// The handle is cheap to clone and may be moved into spawned work. The
/// first signal wins; every later signal is recorded as a
/// [`Error::DoubleCompletion`] violation in the run's [`GateReport`].
#[derive(Clone)]
pub struct DoneHandle {
    shared: Arc<GateShared>,
}

impl DoneHandle {
    pub(crate) fn new(shared: Arc<GateShared>) -> Self {
        Self { shared }
    }

    /// Signal successful completion.
    pub fn done(&self) {
        self.shared.complete(TestOutcome::Succeeded(()));
    }

    /// Signal failed completion with the given reason.
    pub fn fail(&self, reason: impl Into<String>) {
        self.shared
            .complete(TestOutcome::Failed(FailReason::Rejected(reason.into())));
    }
}

impl Debug for DoneHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DoneHandle").finish_non_exhaustive()
    }
}

/// Future that resolves once the gate reaches a terminal state.
pub(crate) struct CompletionWait {
    shared: Arc<GateShared>,
}

impl CompletionWait {
    pub(crate) fn new(shared: Arc<GateShared>) -> Self {
        Self { shared }
    }
}

impl Future for CompletionWait {
    type Output = TestOutcome<()>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.shared.state.lock();
        match &mut *state {
            GateState::Done(outcome) => Poll::Ready(outcome.clone()),
            GateState::Pending { waker } => {
                *waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::task::noop_waker;

    fn poll_wait(wait: &mut CompletionWait) -> Poll<TestOutcome<()>> {
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        Pin::new(wait).poll(&mut cx)
    }

    #[test]
    fn wait_is_pending_until_completion() {
        let shared = GateShared::new();
        let mut wait = CompletionWait::new(Arc::clone(&shared));

        assert_eq!(poll_wait(&mut wait), Poll::Pending);

        shared.complete(TestOutcome::Succeeded(()));
        assert_eq!(poll_wait(&mut wait), Poll::Ready(TestOutcome::Succeeded(())));
    }

    #[test]
    fn first_signal_wins() {
        let shared = GateShared::new();

        shared.complete(TestOutcome::Succeeded(()));
        shared.complete(TestOutcome::Failed(FailReason::Rejected("late".into())));

        let mut wait = CompletionWait::new(Arc::clone(&shared));
        assert_eq!(poll_wait(&mut wait), Poll::Ready(TestOutcome::Succeeded(())));

        let violations = shared.take_violations();
        assert_eq!(violations.len(), 1);
        assert!(matches!(violations[0], Error::DoubleCompletion { .. }));
    }

    #[test]
    fn violations_are_taken_once() {
        let shared = GateShared::new();
        shared.complete(TestOutcome::Succeeded(()));
        shared.complete(TestOutcome::Succeeded(()));

        assert_eq!(shared.take_violations().len(), 1);
        assert!(shared.take_violations().is_empty());
    }

    #[test]
    fn force_timeout_only_applies_when_pending() {
        let shared = GateShared::new();
        let limit = Duration::from_millis(50);

        let outcome = shared.force_timeout(limit);
        assert_eq!(outcome, TestOutcome::Failed(FailReason::Timeout(limit)));

        // A second force keeps the first terminal outcome.
        let outcome = shared.force_timeout(Duration::from_secs(9));
        assert_eq!(outcome, TestOutcome::Failed(FailReason::Timeout(limit)));
        // The deadline is not a signal; no violation recorded.
        assert!(shared.take_violations().is_empty());
    }

    #[test]
    fn late_signal_after_timeout_is_a_violation() {
        let shared = GateShared::new();
        shared.force_timeout(Duration::from_millis(10));

        let handle = DoneHandle::new(Arc::clone(&shared));
        handle.done();

        let violations = shared.take_violations();
        assert_eq!(violations.len(), 1);
        assert!(matches!(violations[0], Error::DoubleCompletion { .. }));
    }

    #[test]
    fn handle_fail_carries_the_reason() {
        let shared = GateShared::new();
        let handle = DoneHandle::new(Arc::clone(&shared));

        handle.fail("broken pipe");

        let mut wait = CompletionWait::new(shared);
        assert_eq!(
            poll_wait(&mut wait),
            Poll::Ready(TestOutcome::Failed(FailReason::Rejected(
                "broken pipe".into()
            )))
        );
    }

    #[test]
    fn waiter_is_woken_on_completion() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let shared = GateShared::new();
        let woken = Arc::new(AtomicBool::new(false));

        // A waker that records being woken.
        let flag = Arc::clone(&woken);
        let waker = futures::task::waker(Arc::new(TestWake { flag }));
        let mut cx = Context::from_waker(&waker);

        let mut wait = CompletionWait::new(Arc::clone(&shared));
        assert!(Pin::new(&mut wait).poll(&mut cx).is_pending());

        shared.complete(TestOutcome::Succeeded(()));
        assert!(woken.load(Ordering::SeqCst));

        struct TestWake {
            flag: Arc<AtomicBool>,
        }

        impl futures::task::ArcWake for TestWake {
            fn wake_by_ref(arc_self: &Arc<Self>) {
                arc_self.flag.store(true, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn outcome_accessors() {
        let ok: TestOutcome<i32> = TestOutcome::Succeeded(5);
        let failed: TestOutcome<i32> =
            TestOutcome::Failed(FailReason::Rejected("error".into()));

        assert!(ok.is_success());
        assert!(failed.is_failure());
        assert_eq!(ok.clone().success(), Some(5));
        assert_eq!(failed.clone().success(), None);
        assert_eq!(
            failed.reason(),
            Some(&FailReason::Rejected("error".into()))
        );
        assert!(failed.to_string().contains("error"));
    }
}
