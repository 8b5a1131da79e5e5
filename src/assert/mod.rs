//! Assertion counting and matchers.
//!
//! - [`Assertions`] - executed-assertion counting plus the `eq` / `truthy` /
//!   `contains` / `resolves_to` / `rejects_with` primitives
//! - [`matcher`] - reusable value checks for rejected reasons and asserted
//!   values
//!
//! ```rust
//! use mockgate::assert::{matcher::contains_str, Assertions};
//!
//! let assertions = Assertions::expecting(1);
//! assertions
//!     .matches(&"an error".to_string(), contains_str("error"))
//!     .unwrap();
//! assert!(assertions.verify_count().is_ok());
//! ```

pub mod matcher;

mod counter;

pub use counter::Assertions;
