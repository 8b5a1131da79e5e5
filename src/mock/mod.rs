//! Call-recording mock functions.
//!
//! This module provides [`MockFn`] for wrapping a function, forwarding its
//! calls, and recording every invocation for later inspection:
//!
//! ```rust
//! use mockgate::mock::{CallOutcome, MockFn};
//!
//! let callback = MockFn::new(|x: i32| 42 + x);
//!
//! callback.call(0);
//! callback.call(1);
//!
//! assert_eq!(callback.call_count(), 2);
//! assert_eq!(callback.call_args_at(0).unwrap(), 0);
//! assert_eq!(callback.result_at(0).unwrap(), CallOutcome::Returned(42));
//! ```

mod recorder;

pub use recorder::{Call, CallOutcome, MockFn};
