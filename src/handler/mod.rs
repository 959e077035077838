//! # Handler Module
//!
//! Handlers are the callbacks a [`crate::route::Route`] runs in order. Each one
//! is explicitly tagged as a request handler or an error handler, and each one
//! answers with a [`Next`] telling the dispatcher how to continue:
//!
//! | `Next`        | Effect                                                      |
//! |---------------|-------------------------------------------------------------|
//! | `Continue`    | run the next eligible handler                               |
//! | `Error(e)`    | skip request handlers until an error handler takes `e`      |
//! | `SkipRoute`   | finish this route cleanly; the router tries the next route  |
//! | `SkipRouter`  | finish this route and make the enclosing router stop too    |
//! | `Halt`        | the response is complete; stop without reporting completion |
//!
//! ```rust
//! use brrtstack::handler::{Handler, HandlerError, Next};
//!
//! let load_user = Handler::request(|req, _res| {
//!     match req.params.get("id") {
//!         Some(_) => Next::Continue,
//!         None => Next::Error(HandlerError::msg(400, "missing id")),
//!     }
//! })
//! .named("load_user");
//!
//! let render_error = Handler::error(|err, _req, res| {
//!     res.status(err.status()).json(err.to_json());
//!     Next::Halt
//! });
//! # let _ = (load_user, render_error);
//! ```

mod core;
mod error;

pub use core::{ErrorHandler, Handler, HandlerArg, Next, RequestHandler};
pub use error::HandlerError;
