//! Async completion gates.
//!
//! A [`CompletionGate`] decides when an asynchronous test body's outcome is
//! known and reports it exactly once. The body declares how it completes -
//! through an explicit [`DoneHandle`], a deferred value, or a suspending
//! unit of work - and the gate maps that completion onto a terminal
//! [`TestOutcome`], enforcing an optional deadline and the declared
//! assertion count along the way.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use mockgate::gate::{CompletionGate, TestOutcome};
//!
//! let gate = CompletionGate::new().with_deadline(Duration::from_secs(5));
//! let report = gate
//!     .run_callback_style(|done| {
//!         tokio::spawn(async move {
//!             // ... asynchronous work ...
//!             done.done();
//!         });
//!     })
//!     .await;
//! assert_eq!(report.outcome, TestOutcome::Succeeded(()));
//! ```

mod state;

pub use state::{DoneHandle, FailReason, GateReport, TestOutcome};

#[cfg(feature = "tokio")]
mod deadline;
#[cfg(feature = "tokio")]
mod runner;

#[cfg(feature = "tokio")]
pub use runner::CompletionGate;
