//! # Layer Module
//!
//! A layer is one compiled path pattern bound to one handler. Patterns are
//! compiled once when a route table is built and are then read-only, so they
//! can be shared freely across concurrent requests.
//!
//! ## Matching
//!
//! [`PathPattern::matches`] is a pure function of the pattern and the input
//! path: it returns a fresh [`PathMatch`] (or `None`) and never records anything
//! on the pattern itself. Two shapes skip the regex entirely:
//!
//! - `/` compiled with `end = false` matches every path with no parameters
//! - `*` matches every path and captures it as parameter `0`
//!
//! ```rust
//! use brrtstack::layer::{MatchOptions, PathPattern};
//!
//! let pattern = PathPattern::new("/users/:id", MatchOptions::default()).unwrap();
//! let m = pattern.matches("/users/42").unwrap().unwrap();
//! assert_eq!(m.params.get("id"), Some("42"));
//! assert_eq!(m.path, "/users/42");
//! assert!(pattern.matches("/users").unwrap().is_none());
//! ```
//!
//! Captured segments are percent-decoded. A segment that cannot be decoded fails
//! the match with [`crate::error::MalformedUri`] instead of returning garbled text.

mod core;
mod decode;
mod pattern;
#[cfg(test)]
mod tests;

pub use core::{Layer, MethodFilter};
pub use decode::decode_param;
pub use pattern::{
    MatchOptions, ParamKey, ParamVec, Params, PathMatch, PathPattern, MAX_INLINE_PARAMS,
};
