//! Request-scoped values passed to every handler.
//!
//! A [`Request`] and [`Response`] pair is owned by one dispatch. Nothing here is
//! shared between requests, which is what lets routes and patterns stay
//! immutable while many requests run through them at once.

mod request;
mod response;

pub use request::{HeaderVec, Request, RouteContext, MAX_INLINE_HEADERS};
pub use response::Response;
