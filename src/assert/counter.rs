//! Assertion counting and the primitives the gate's helpers build on.
//!
//! An [`Assertions`] handle counts how many assertions a test body actually
//! executed, against an optionally declared expectation. The count guards
//! async branches that silently complete without exercising the intended
//! assertion path, such as a rejection branch that was never taken.
//!
//! # Example
//!
//! ```rust
//! use mockgate::assert::Assertions;
//!
//! let assertions = Assertions::expecting(1);
//! assertions.eq(&(42 + 0), &42).unwrap();
//! assert!(assertions.verify_count().is_ok());
//! ```

use std::fmt::{Debug, Display};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::assert::matcher::Matcher;
use crate::error::{Error, Result};

#[derive(Default)]
struct AssertState {
    executed: AtomicUsize,
    expected: Mutex<Option<usize>>,
}

/// Counts executed assertions against an optionally declared expectation.
///
/// Handles are cheap to clone and all clones share the same count, so a
/// handle can be moved into an async body or a spawned task while the gate
/// keeps its own. Every assertion primitive increments the count *before*
/// evaluating, so failed assertions still count as executed.
#[derive(Clone, Default)]
pub struct Assertions {
    state: Arc<AssertState>,
}

impl Assertions {
    /// Create a counter with no declared expectation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a counter expecting exactly `count` assertions.
    #[must_use]
    pub fn expecting(count: usize) -> Self {
        let assertions = Self::new();
        assertions.expect_count(count);
        assertions
    }

    /// Declare the expected number of assertions up front.
    pub fn expect_count(&self, count: usize) {
        *self.state.expected.lock() = Some(count);
    }

    /// How many assertions have been executed so far.
    #[must_use]
    pub fn executed(&self) -> usize {
        self.state.executed.load(Ordering::SeqCst)
    }

    /// The declared expectation, if any.
    #[must_use]
    pub fn expected(&self) -> Option<usize> {
        *self.state.expected.lock()
    }

    /// The `(expected, executed)` pair when the declared count was missed.
    #[must_use]
    pub fn count_mismatch(&self) -> Option<(usize, usize)> {
        let expected = (*self.state.expected.lock())?;
        let executed = self.executed();
        (executed != expected).then_some((expected, executed))
    }

    /// Check the declared count, if one was declared.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssertionCountMismatch`] when the declared count
    /// was not met exactly.
    pub fn verify_count(&self) -> Result<()> {
        match self.count_mismatch() {
            None => Ok(()),
            Some((expected, executed)) => Err(Error::AssertionCountMismatch { expected, executed }),
        }
    }

    fn bump(&self) {
        self.state.executed.fetch_add(1, Ordering::SeqCst);
    }

    /// Assert that two values are equal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssertionFailed`] when the values differ.
    pub fn eq<T: PartialEq + Debug>(&self, actual: &T, expected: &T) -> Result<()> {
        self.bump();
        if actual == expected {
            Ok(())
        } else {
            Err(Error::assertion_failed(format!(
                "expected {expected:?}, got {actual:?}"
            )))
        }
    }

    /// Assert that a condition holds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssertionFailed`] when the condition is false.
    pub fn truthy(&self, condition: bool) -> Result<()> {
        self.bump();
        if condition {
            Ok(())
        } else {
            Err(Error::assertion_failed("expected condition to hold"))
        }
    }

    /// Assert that `haystack` contains `needle`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssertionFailed`] when the substring is absent.
    pub fn contains(&self, haystack: &str, needle: &str) -> Result<()> {
        self.bump();
        if haystack.contains(needle) {
            Ok(())
        } else {
            Err(Error::assertion_failed(format!(
                "{haystack:?} does not contain {needle:?}"
            )))
        }
    }

    /// Assert that a value satisfies a [`Matcher`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssertionFailed`] when the matcher rejects the
    /// value.
    pub fn matches<T: Debug>(&self, value: &T, matcher: impl Matcher<T>) -> Result<()> {
        self.bump();
        if matcher.matches(value) {
            Ok(())
        } else {
            Err(Error::assertion_failed(matcher.describe_mismatch(value)))
        }
    }

    /// Assert that a deferred value resolves to `expected`, returning the
    /// resolved value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssertionFailed`] when the deferred value resolves
    /// to something else or rejects.
    pub async fn resolves_to<T, E, F>(&self, deferred: F, expected: T) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, E>>,
        T: PartialEq + Debug,
        E: Display,
    {
        self.bump();
        match deferred.await {
            Ok(value) if value == expected => Ok(value),
            Ok(value) => Err(Error::assertion_failed(format!(
                "resolved to {value:?}, expected {expected:?}"
            ))),
            Err(error) => Err(Error::assertion_failed(format!(
                "expected resolution to {expected:?}, but rejected with {error}"
            ))),
        }
    }

    /// Assert that a deferred value rejects with a reason accepted by
    /// `matcher`, returning the rejection reason.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssertionFailed`] when the deferred value resolves,
    /// or rejects with a reason the matcher refuses.
    pub async fn rejects_with<T, E, F, M>(&self, deferred: F, matcher: M) -> Result<E>
    where
        F: Future<Output = std::result::Result<T, E>>,
        T: Debug,
        E: Debug,
        M: Matcher<E>,
    {
        self.bump();
        match deferred.await {
            Err(reason) if matcher.matches(&reason) => Ok(reason),
            Err(reason) => Err(Error::assertion_failed(matcher.describe_mismatch(&reason))),
            Ok(value) => Err(Error::assertion_failed(format!(
                "expected rejection with {}, but resolved to {value:?}",
                matcher.describe()
            ))),
        }
    }
}

impl Debug for Assertions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assertions")
            .field("executed", &self.executed())
            .field("expected", &self.expected())
            .finish()
    }
}
