//! # brrtstack
//!
//! **brrtstack** is the per-route handler stack of an Express-style HTTP router,
//! built for the `may` coroutine runtime.
//!
//! ## Overview
//!
//! A router selects a [`Route`] by path. The route owns an ordered stack of
//! [`Layer`]s, each binding one handler to an optional HTTP method, and runs
//! that stack for every request it receives: request handlers in order, error
//! handlers only while an error is in flight, with explicit signals to skip the
//! rest of the route or the enclosing router.
//!
//! ## Architecture
//!
//! - **[`layer`]** - Path pattern compilation, matching and parameter decoding
//! - **[`handler`]** - Handler tagging, the [`Next`] signal and [`HandlerError`]
//! - **[`route`]** - Registration, method bookkeeping and dispatch
//! - **[`context`]** - Request and response values handlers operate on
//! - **[`error`]** - Construction and matching errors
//! - **[`runtime_config`]** - Environment-driven settings
//! - **[`logging`]** - `tracing` subscriber setup
//!
//! ### Dispatch Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Router
//!     participant Route
//!     participant Layer
//!     participant Handler
//!
//!     Router->>Route: handle(req, res)
//!     Route->>Route: match path, decode params
//!     loop each eligible layer
//!         Route->>Layer: handle_request / handle_error
//!         Layer->>Handler: call (panics caught)
//!         Handler-->>Layer: Next
//!         Layer-->>Route: Next
//!     end
//!     Route-->>Router: Completion
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use brrtstack::context::{Request, Response};
//! use brrtstack::handler::{Handler, HandlerError, Next};
//! use brrtstack::route::{Completion, Route};
//!
//! let mut route = Route::new("/pets/:id").unwrap();
//! route
//!     .get(Handler::request(|req, _res| {
//!         match req.param("id") {
//!             Some("0") => Next::Error(HandlerError::msg(404, "no such pet")),
//!             _ => Next::Continue,
//!         }
//!     }))
//!     .unwrap()
//!     .all(Handler::error(|err, _req, res| {
//!         res.status(err.status()).json(err.to_json());
//!         Next::Halt
//!     }))
//!     .unwrap();
//!
//! let mut req = Request::new(http::Method::GET, "/pets/0");
//! let mut res = Response::new();
//! assert!(matches!(route.handle(&mut req, &mut res), Completion::Handled));
//! assert_eq!(res.status, 404);
//! ```
//!
//! ## Configuration
//!
//! See [`runtime_config`] for `BRRTS_STACK_SIZE`, `BRRTS_CASE_SENSITIVE` and
//! `BRRTS_STRICT_ROUTING`, and [`logging`] for the `BRRTS_LOG_*` variables.

pub mod context;
pub mod error;
pub mod handler;
pub mod layer;
pub mod logging;
pub mod route;
pub mod runtime_config;

pub use context::{Request, Response};
pub use error::{MalformedUri, PatternSyntaxError, RouteError};
pub use handler::{Handler, HandlerArg, HandlerError, Next};
pub use layer::{Layer, MatchOptions, PathPattern};
pub use route::{Completion, Exit, Route, SharedRoute};
