//! # botrelay-error
//!
//! Unified error handling for botrelay.
//!
//! ## Design Philosophy
//!
//! - **ErrorKind**: Know what went wrong (e.g., Timeout, ConnectionFailed)
//! - **Error Context**: Record which service and endpoint were involved
//! - **Error Source**: Wrap underlying errors without leaking raw types
//!
//! ## Usage
//!
//! ```rust
//! use botrelay_error::{Error, ErrorKind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::new(ErrorKind::ServiceUnavailable, "model not loaded")
//!         .with_operation("inference::connect")
//!         .with_context("url", "http://localhost:5000"))
//! }
//! ```
//!
//! ## Principles
//!
//! - Fallible functions return `Result<T, botrelay_error::Error>`
//! - External errors are wrapped with `set_source(err)`
//! - Same error handled once, callers only append context
//! - Don't abuse `From<OtherError>` to prevent raw error leakage

mod error;
mod kind;

pub use error::Error;
pub use kind::ErrorKind;

/// Result type alias using botrelay Error
pub type Result<T> = std::result::Result<T, Error>;
