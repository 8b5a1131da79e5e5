//! # mockgate
//!
//! > Call-recording mocks and async completion gates for tests
//!
//! **mockgate** provides two independent test primitives: a mock function
//! that records every invocation made through it, and a completion gate
//! that decides when an asynchronous test body's outcome is known and
//! reports it exactly once.
//!
//! ## Recording calls
//!
//! ```rust
//! use mockgate::mock::MockFn;
//!
//! let callback = MockFn::new(|x: i32| 42 + x);
//!
//! for value in [0, 1] {
//!     callback.call(value);
//! }
//!
//! assert_eq!(callback.call_count(), 2);
//! assert_eq!(callback.call_args_at(0).unwrap(), 0);
//! assert_eq!(callback.result_at(0).unwrap().value(), Some(&42));
//! ```
//!
//! ## Gating async completion
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use mockgate::gate::{CompletionGate, TestOutcome};
//!
//! let gate = CompletionGate::new()
//!     .with_deadline(Duration::from_secs(5))
//!     .expect_assertions(1);
//! let assertions = gate.assertions();
//!
//! let report = gate
//!     .run_suspending_style(async {
//!         let data = fetch_data().await?;
//!         assertions.eq(&data, &"peanut butter".to_string())?;
//!         Ok::<_, mockgate::Error>(())
//!     })
//!     .await;
//!
//! assert!(report.is_clean());
//! ```
//!
//! ## Features
//!
//! - 🪤 **`MockFn`** - record arguments, outcomes, and contexts per call
//! - 🚪 **`CompletionGate`** - callback, deferred, and suspending styles
//! - ⏱️ **Deadlines** - stalled bodies fail with a timeout, exactly once
//! - 🔢 **Assertion counting** - declared counts catch silently skipped
//!   assertion paths

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod assert;
pub mod error;
pub mod gate;
pub mod mock;

/// Prelude for convenient imports
///
/// ```rust
/// use mockgate::prelude::*;
/// ```
pub mod prelude {
    pub use crate::assert::matcher::{contains_str, eq, message, not, satisfies, Matcher};
    pub use crate::assert::Assertions;
    pub use crate::error::{Error, Result};
    #[cfg(feature = "tokio")]
    pub use crate::gate::CompletionGate;
    pub use crate::gate::{DoneHandle, FailReason, GateReport, TestOutcome};
    pub use crate::mock::{Call, CallOutcome, MockFn};
}

// Re-exports
pub use error::{Error, Result};

// Re-export the test macro when the macros feature is enabled
#[cfg(feature = "macros")]
pub use mockgate_macros::test;
