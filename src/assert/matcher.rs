// Allow must_use_candidate for matcher factories; building a matcher without
// immediately consuming it is the normal setup pattern
#![allow(clippy::must_use_candidate)]

//! Matchers for asserted values and rejected reasons.
//!
//! A [`Matcher`] is a reusable check with a human-readable description.
//! The gate's assertion helpers ([`rejects_with`] in particular) accept any
//! matcher, which covers the equality, substring, and predicate checks on a
//! rejection reason.
//!
//! [`rejects_with`]: crate::assert::Assertions::rejects_with
//!
//! # Example
//!
//! ```rust
//! use mockgate::assert::matcher::{contains_str, eq, not, Matcher};
//!
//! assert!(eq(42).matches(&42));
//! assert!(contains_str("butter").matches(&"peanut butter".to_string()));
//! assert!(not(eq(0)).matches(&1));
//! ```

use std::fmt::{Debug, Display};

/// A check applied to an asserted or rejected value.
pub trait Matcher<T: ?Sized> {
    /// Check whether the value matches.
    fn matches(&self, value: &T) -> bool;

    /// Describe what this matcher expects.
    fn describe(&self) -> String;

    /// Describe why a value did not match.
    fn describe_mismatch(&self, value: &T) -> String;
}

/// Match values equal to `expected`.
pub fn eq<T: PartialEq + Debug>(expected: T) -> EqMatcher<T> {
    EqMatcher { expected }
}

/// Matcher built by [`eq`].
pub struct EqMatcher<T> {
    expected: T,
}

impl<T: PartialEq + Debug> Matcher<T> for EqMatcher<T> {
    fn matches(&self, value: &T) -> bool {
        value == &self.expected
    }

    fn describe(&self) -> String {
        format!("equal to {:?}", self.expected)
    }

    fn describe_mismatch(&self, value: &T) -> String {
        format!("expected {:?}, got {:?}", self.expected, value)
    }
}

/// Match string-like values containing `substring`.
pub fn contains_str(substring: impl Into<String>) -> ContainsStrMatcher {
    ContainsStrMatcher {
        substring: substring.into(),
    }
}

/// Matcher built by [`contains_str`].
pub struct ContainsStrMatcher {
    substring: String,
}

impl<T: AsRef<str> + Debug + ?Sized> Matcher<T> for ContainsStrMatcher {
    fn matches(&self, value: &T) -> bool {
        value.as_ref().contains(&self.substring)
    }

    fn describe(&self) -> String {
        format!("containing {:?}", self.substring)
    }

    fn describe_mismatch(&self, value: &T) -> String {
        format!("{:?} does not contain {:?}", value, self.substring)
    }
}

/// Match any value whose `Display` rendering contains `substring`.
///
/// Useful for error types that are not string-like themselves.
pub fn message(substring: impl Into<String>) -> MessageMatcher {
    MessageMatcher {
        substring: substring.into(),
    }
}

/// Matcher built by [`message`].
pub struct MessageMatcher {
    substring: String,
}

impl<T: Display> Matcher<T> for MessageMatcher {
    fn matches(&self, value: &T) -> bool {
        value.to_string().contains(&self.substring)
    }

    fn describe(&self) -> String {
        format!("a message containing {:?}", self.substring)
    }

    fn describe_mismatch(&self, value: &T) -> String {
        format!("message {:?} does not contain {:?}", value.to_string(), self.substring)
    }
}

/// Match values satisfying a predicate, described by `description`.
pub fn satisfies<T, F>(predicate: F, description: impl Into<String>) -> PredicateMatcher<T, F>
where
    F: Fn(&T) -> bool,
{
    PredicateMatcher {
        predicate,
        description: description.into(),
        _marker: std::marker::PhantomData,
    }
}

/// Matcher built by [`satisfies`].
pub struct PredicateMatcher<T, F> {
    predicate: F,
    description: String,
    _marker: std::marker::PhantomData<fn(&T)>,
}

impl<T: Debug, F: Fn(&T) -> bool> Matcher<T> for PredicateMatcher<T, F> {
    fn matches(&self, value: &T) -> bool {
        (self.predicate)(value)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }

    fn describe_mismatch(&self, value: &T) -> String {
        format!("{:?} is not {}", value, self.description)
    }
}

/// Negate another matcher.
pub fn not<T, M: Matcher<T> + 'static>(inner: M) -> NotMatcher<T> {
    NotMatcher {
        inner: Box::new(inner),
    }
}

/// Matcher built by [`not`].
pub struct NotMatcher<T: ?Sized> {
    inner: Box<dyn Matcher<T>>,
}

impl<T: Debug> Matcher<T> for NotMatcher<T> {
    fn matches(&self, value: &T) -> bool {
        !self.inner.matches(value)
    }

    fn describe(&self) -> String {
        format!("not {}", self.inner.describe())
    }

    fn describe_mismatch(&self, value: &T) -> String {
        format!("{:?} unexpectedly is {}", value, self.inner.describe())
    }
}

// Boxed matchers stay matchers, so they can be stored and nested.
impl<T: ?Sized> Matcher<T> for Box<dyn Matcher<T>> {
    fn matches(&self, value: &T) -> bool {
        (**self).matches(value)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }

    fn describe_mismatch(&self, value: &T) -> String {
        (**self).describe_mismatch(value)
    }
}
