//! # Route Module
//!
//! A [`Route`] owns the ordered handler stack for one path. The enclosing router
//! selects a route by path; the route then decides which of its handlers run,
//! in what order, and how errors and skip signals end the run.
//!
//! ## Registration
//!
//! Handlers are registered per method through [`Route::register`], through one
//! generated method per entry in [`METHODS`] (`get`, `post`, `m_search`, ...),
//! or for every method through [`Route::all`]:
//!
//! ```rust
//! use brrtstack::handler::{Handler, Next};
//! use brrtstack::route::Route;
//!
//! let mut route = Route::new("/users/:id").unwrap();
//! route
//!     .all(Handler::request(|_req, _res| Next::Continue).named("audit"))
//!     .unwrap()
//!     .get(Handler::request(|req, res| {
//!         let id = req.param("id").unwrap_or_default().to_string();
//!         res.json(serde_json::json!({ "id": id }));
//!         Next::Halt
//!     }))
//!     .unwrap();
//!
//! assert!(route.supports_method("HEAD"));
//! assert_eq!(route.allowed_methods(), vec!["GET", "HEAD"]);
//! ```
//!
//! ## Dispatch
//!
//! [`Route::dispatch`] walks the stack with the signal protocol described in
//! [`crate::handler::Next`]; [`Route::run`] and [`Route::handle`] wrap it for
//! callers that want the outcome as a [`Completion`] value.
//!
//! ## Concurrency
//!
//! A built route is read-only during dispatch and can be shared across
//! coroutines behind an `Arc`. [`SharedRoute`] supports registration after
//! traffic has started by swapping in a new copy of the route.

mod core;
mod dispatch;
mod methods;
mod shared;

pub use core::Route;
pub use dispatch::{Completion, Dispatched, Exit};
pub use methods::{is_standard_method, METHODS};
pub use shared::SharedRoute;
