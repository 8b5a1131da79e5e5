// Allow must_use_candidate since recorder methods often have useful side effects
#![allow(clippy::must_use_candidate)]

//! Call-recording mock functions.
//!
//! This module provides [`MockFn`] for wrapping a function and recording
//! every invocation made through it.
//!
//! # Example
//!
//! ```rust
//! use mockgate::mock::MockFn;
//!
//! // Wrap an implementation
//! let callback = MockFn::new(|x: i32| 42 + x);
//!
//! // Call through the mock
//! assert_eq!(callback.call(0), 42);
//! assert_eq!(callback.call(1), 43);
//!
//! // Inspect the recording
//! assert_eq!(callback.call_count(), 2);
//! assert_eq!(callback.call_args_at(1).unwrap(), 1);
//! ```

use std::convert::Infallible;
use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Error, Result};

type Behavior<A, R, E> = Arc<dyn Fn(A) -> std::result::Result<R, E> + Send + Sync>;

/// What the forwarded implementation did on one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome<R, E> {
    /// The implementation returned normally with this value.
    Returned(R),
    /// The implementation raised this error; it was re-raised to the caller
    /// after recording.
    Raised(E),
    /// The implementation never returned. The record is appended before the
    /// call is forwarded, so this is what remains when the implementation
    /// panicked mid-call.
    Incomplete,
}

impl<R, E> CallOutcome<R, E> {
    /// The returned value, if the call returned normally.
    pub fn value(&self) -> Option<&R> {
        match self {
            Self::Returned(value) => Some(value),
            Self::Raised(_) | Self::Incomplete => None,
        }
    }

    /// The raised error, if the call raised one.
    pub fn error(&self) -> Option<&E> {
        match self {
            Self::Raised(error) => Some(error),
            Self::Returned(_) | Self::Incomplete => None,
        }
    }

    /// Returns `true` if the call returned normally.
    pub fn is_returned(&self) -> bool {
        matches!(self, Self::Returned(_))
    }

    /// Returns `true` if the call raised an error.
    pub fn is_raised(&self) -> bool {
        matches!(self, Self::Raised(_))
    }
}

/// A record of a single invocation of a [`MockFn`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call<A, R, E> {
    /// The argument passed to the call.
    pub args: A,
    /// The receiver label, when the call was made through
    /// [`MockFn::call_in_context`]. Plain calls record `None`.
    pub context: Option<String>,
    /// What the forwarded implementation did.
    pub outcome: CallOutcome<R, E>,
}

struct MockState<A, R, E> {
    name: Mutex<Option<String>>,
    original: Behavior<A, R, E>,
    stand_in: Mutex<Option<Behavior<A, R, E>>>,
    fixed_return: Mutex<Option<R>>,
    calls: Mutex<Vec<Call<A, R, E>>>,
}

/// A mock function: wraps an implementation and records every call made
/// through it.
///
/// Each invocation appends exactly one [`Call`] to the log, in strict
/// chronological order. The log is never reordered, deduplicated, or
/// implicitly cleared; only [`reset`](MockFn::reset) empties it, and reset
/// never removes the wrapping or configuration.
///
/// Calls are dispatched with this precedence:
///
/// 1. a fixed return override ([`set_return`](MockFn::set_return)),
/// 2. a stand-in implementation ([`with_stand_in`](MockFn::with_stand_in)),
/// 3. the original implementation given at construction.
///
/// Clones share the same log and configuration, so a mock handed to the
/// code under test can still be inspected from the test body. The interior
/// lock keeps the log coherent if a clone ends up on another thread, but
/// the intended use is single-threaded test code; no cross-thread ordering
/// is promised.
///
/// # Type Parameters
///
/// - `A` - The argument type (must be `Clone` for recording)
/// - `R` - The return type (must be `Clone` for recording)
/// - `E` - The error type raised by fallible implementations; defaults to
///   [`Infallible`] for mocks built with [`MockFn::new`]
///
/// # Example
///
/// ```rust
/// use mockgate::mock::MockFn;
///
/// let double = MockFn::new(|x: i32| x * 2);
/// assert_eq!(double.call(5), 10);
/// assert!(double.was_called());
/// ```
pub struct MockFn<A, R, E = Infallible> {
    state: Arc<MockState<A, R, E>>,
}

impl<A, R, E> MockFn<A, R, E>
where
    A: Clone,
    R: Clone,
    E: Clone,
{
    /// Wrap an infallible implementation.
    pub fn new<F>(implementation: F) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        Self::try_new(move |args| Ok(implementation(args)))
    }

    /// Wrap a fallible implementation. Raised errors are recorded and then
    /// re-raised to the caller.
    pub fn try_new<F>(implementation: F) -> Self
    where
        F: Fn(A) -> std::result::Result<R, E> + Send + Sync + 'static,
    {
        Self {
            state: Arc::new(MockState {
                name: Mutex::new(None),
                original: Arc::new(implementation),
                stand_in: Mutex::new(None),
                fixed_return: Mutex::new(None),
                calls: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Build a pure recorder with no behavior of its own: every call
    /// returns `R::default()` and is recorded like any other.
    pub fn recorder() -> Self
    where
        R: Default,
    {
        Self::try_new(|_| Ok(R::default()))
    }

    /// Label the mock; the label shows up in `Debug` output.
    #[must_use]
    pub fn with_name(self, name: impl Into<String>) -> Self {
        *self.state.name.lock() = Some(name.into());
        self
    }

    /// Replace the forwarded implementation entirely. The original
    /// implementation is kept but no longer reachable until the stand-in
    /// is cleared.
    #[must_use]
    pub fn with_stand_in<F>(self, stand_in: F) -> Self
    where
        F: Fn(A) -> std::result::Result<R, E> + Send + Sync + 'static,
    {
        *self.state.stand_in.lock() = Some(Arc::new(stand_in));
        self
    }

    /// Remove a configured stand-in, restoring the original implementation.
    pub fn clear_stand_in(&self) {
        *self.state.stand_in.lock() = None;
    }

    /// Configure a fixed return value. Takes precedence over both the
    /// stand-in and the original implementation.
    pub fn set_return(&self, value: R) {
        *self.state.fixed_return.lock() = Some(value);
    }

    /// Remove a configured fixed return value.
    pub fn clear_return(&self) {
        *self.state.fixed_return.lock() = None;
    }

    /// Call the mock, recording the invocation and re-raising any error
    /// after it has been recorded.
    ///
    /// # Errors
    ///
    /// Returns whatever error the forwarded implementation raised.
    pub fn try_call(&self, args: A) -> std::result::Result<R, E> {
        self.dispatch(None, args)
    }

    /// Like [`try_call`](MockFn::try_call), but records a receiver label
    /// alongside the arguments.
    ///
    /// # Errors
    ///
    /// Returns whatever error the forwarded implementation raised.
    pub fn try_call_in_context(
        &self,
        context: impl Into<String>,
        args: A,
    ) -> std::result::Result<R, E> {
        self.dispatch(Some(context.into()), args)
    }

    fn dispatch(&self, context: Option<String>, args: A) -> std::result::Result<R, E> {
        // The record goes in before the implementation runs; a panicking
        // implementation leaves it behind with an Incomplete outcome.
        let index = {
            let mut calls = self.state.calls.lock();
            calls.push(Call {
                args: args.clone(),
                context,
                outcome: CallOutcome::Incomplete,
            });
            calls.len() - 1
        };

        // Locks are released before the implementation runs so it may call
        // back into this mock (or another) without deadlocking.
        let fixed = self.state.fixed_return.lock().clone();
        let result = if let Some(value) = fixed {
            Ok(value)
        } else {
            let stand_in = self.state.stand_in.lock().clone();
            match stand_in {
                Some(implementation) => implementation(args),
                None => (self.state.original)(args),
            }
        };

        {
            let mut calls = self.state.calls.lock();
            calls[index].outcome = match &result {
                Ok(value) => CallOutcome::Returned(value.clone()),
                Err(error) => CallOutcome::Raised(error.clone()),
            };
        }

        result
    }

    /// The number of calls recorded so far.
    pub fn call_count(&self) -> usize {
        self.state.calls.lock().len()
    }

    /// Returns `true` if the mock was called at least once.
    pub fn was_called(&self) -> bool {
        self.call_count() > 0
    }

    /// Returns `true` if the mock was called exactly `n` times.
    pub fn was_called_times(&self, n: usize) -> bool {
        self.call_count() == n
    }

    /// Returns `true` if any recorded call carried this argument.
    pub fn was_called_with(&self, expected: &A) -> bool
    where
        A: PartialEq,
    {
        self.state.calls.lock().iter().any(|c| &c.args == expected)
    }

    /// All recorded calls, in invocation order.
    pub fn calls(&self) -> Vec<Call<A, R, E>> {
        self.state.calls.lock().clone()
    }

    /// The most recent recorded call.
    pub fn last_call(&self) -> Option<Call<A, R, E>> {
        self.state.calls.lock().last().cloned()
    }

    /// The argument of the `index`-th call (0-indexed).
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if fewer than `index + 1` calls
    /// were recorded.
    pub fn call_args_at(&self, index: usize) -> Result<A> {
        self.record_at(index).map(|call| call.args)
    }

    /// The outcome of the `index`-th call (0-indexed).
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if fewer than `index + 1` calls
    /// were recorded.
    pub fn result_at(&self, index: usize) -> Result<CallOutcome<R, E>> {
        self.record_at(index).map(|call| call.outcome)
    }

    /// The receiver label of the `index`-th call (0-indexed).
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if fewer than `index + 1` calls
    /// were recorded.
    pub fn context_at(&self, index: usize) -> Result<Option<String>> {
        self.record_at(index).map(|call| call.context)
    }

    fn record_at(&self, index: usize) -> Result<Call<A, R, E>> {
        let calls = self.state.calls.lock();
        calls
            .get(index)
            .cloned()
            .ok_or(Error::IndexOutOfRange {
                index,
                len: calls.len(),
            })
    }

    /// Clear the recorded calls. The wrapping, stand-in, fixed return, and
    /// name all stay in place.
    pub fn reset(&self) {
        self.state.calls.lock().clear();
    }
}

impl<A, R> MockFn<A, R, Infallible>
where
    A: Clone,
    R: Clone,
{
    /// Call the mock, whose implementation cannot raise.
    pub fn call(&self, args: A) -> R {
        match self.try_call(args) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Like [`call`](MockFn::call), but records a receiver label alongside
    /// the arguments.
    pub fn call_in_context(&self, context: impl Into<String>, args: A) -> R {
        match self.try_call_in_context(context, args) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }
}

// Clones share the recording and configuration.
impl<A, R, E> Clone for MockFn<A, R, E> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<A, R, E> Debug for MockFn<A, R, E>
where
    A: Debug,
    R: Debug,
    E: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = f.debug_struct("MockFn");
        if let Some(name) = self.state.name.lock().as_deref() {
            out.field("name", &name);
        }
        out.field("call_count", &self.state.calls.lock().len())
            .field("calls", &*self.state.calls.lock())
            .finish()
    }
}
