//! Route dispatch - hot path for running a route's handler stack.
//!
//! The dispatcher walks the stack once, front to back, carrying at most one
//! in-flight [`HandlerError`]:
//!
//! ```text
//!            ┌──────────── Continue ─────────────┐
//!            ▼                                   │
//!   next eligible layer ──► handler ──► Next ────┤
//!            │                            │      ├── Error(e) ─► only error handlers eligible
//!            │                            │      ├── SkipRoute ─► done(None)
//!            │                            │      ├── SkipRouter ─► done(Some(Exit::Router))
//!            │                            │      └── Halt ─► stop, done not called
//!            └── stack exhausted ─► done(in-flight error)
//! ```
//!
//! Layers constrained to another method are transparent: they are skipped
//! without running and without touching the in-flight error.

use may::coroutine::{self, JoinHandle};
use std::io;
use std::sync::Arc;
use tracing::{debug, debug_span, warn};

use super::Route;
use crate::context::{Request, Response};
use crate::handler::{HandlerError, Next};

/// How a route's dispatch ended, as reported to the completion callback.
///
/// `None` (no `Exit`) means the route finished without claiming the request,
/// either because the stack ran out or a handler answered [`Next::SkipRoute`].
#[derive(Debug)]
pub enum Exit {
    /// A handler answered [`Next::SkipRouter`]; the enclosing router should stop too
    Router,
    /// An application error reached the end of the stack unhandled
    Error(HandlerError),
}

/// Result of [`Route::dispatch`].
#[derive(Debug)]
pub enum Dispatched<R> {
    /// A handler answered [`Next::Halt`]; the completion callback was not invoked
    Halted,
    /// The completion callback ran and returned this value
    Done(R),
}

/// Outcome of [`Route::run`] and [`Route::handle`] as a single value.
#[derive(Debug)]
pub enum Completion {
    /// A handler finished the response
    Handled,
    /// The route let the request through; the router should try the next route
    Passed,
    /// A handler asked the enclosing router to stop routing
    SkipRouter,
    /// An application error was not absorbed by any error handler
    Failed(HandlerError),
    /// The request path did not match the route (only from [`Route::handle`])
    NotMatched,
}

impl Completion {
    fn from_exit(exit: Option<Exit>) -> Self {
        match exit {
            None => Completion::Passed,
            Some(Exit::Router) => Completion::SkipRouter,
            Some(Exit::Error(err)) => Completion::Failed(err),
        }
    }
}

impl Route {
    /// Run the handler stack for a request already matched to this route.
    ///
    /// `done` is invoked exactly once unless a handler answers [`Next::Halt`].
    /// Handlers run strictly in sequence; a handler that blocks (for example
    /// inside a `may` coroutine) holds the dispatch until it returns.
    ///
    /// For `HEAD` requests, layers registered for `GET` are eligible unless the
    /// route has explicit `HEAD` handlers. `req.method` itself is left as is.
    pub fn dispatch<F, R>(&self, req: &mut Request, res: &mut Response, done: F) -> Dispatched<R>
    where
        F: FnOnce(Option<Exit>) -> R,
    {
        if self.stack.is_empty() {
            debug!(path = %self.path(), "Route has no handlers");
            return Dispatched::Done(done(None));
        }

        let mut method = req.method.as_str().to_ascii_lowercase();
        if method == "head" && !self.methods.contains("head") {
            method = "get".to_string();
        }

        let span = debug_span!(
            "route_dispatch",
            route = %self.path(),
            method = %req.method,
            path = %req.path()
        );
        let _guard = span.enter();

        req.route = Some(self.context());

        let mut in_flight: Option<HandlerError> = None;
        for (idx, layer) in self.stack.iter().enumerate() {
            if !layer.method().admits(&method) {
                continue;
            }

            let handler = layer.handler();
            let next = match in_flight.take() {
                Some(err) if handler.is_error_handler() => {
                    debug!(
                        layer_idx = idx,
                        handler_name = %handler.name(),
                        status = err.status(),
                        "Error handler invoked"
                    );
                    layer.handle_error(err, req, res)
                }
                Some(err) => {
                    in_flight = Some(err);
                    continue;
                }
                None if handler.is_error_handler() => continue,
                None => {
                    debug!(
                        layer_idx = idx,
                        handler_name = %handler.name(),
                        "Handler invoked"
                    );
                    layer.handle_request(req, res)
                }
            };

            match next {
                Next::Continue => {}
                Next::Error(err) => in_flight = Some(err),
                Next::SkipRoute => {
                    debug!(layer_idx = idx, "Handler skipped the rest of the route");
                    return Dispatched::Done(done(None));
                }
                Next::SkipRouter => {
                    debug!(layer_idx = idx, "Handler skipped the enclosing router");
                    return Dispatched::Done(done(Some(Exit::Router)));
                }
                Next::Halt => {
                    debug!(layer_idx = idx, "Response completed by handler");
                    return Dispatched::Halted;
                }
            }
        }

        if let Some(err) = &in_flight {
            warn!(
                status = err.status(),
                error = %err,
                "Unhandled error reached the end of the route"
            );
        }
        Dispatched::Done(done(in_flight.map(Exit::Error)))
    }

    /// [`Route::dispatch`] with the outcome returned as a value.
    pub fn run(&self, req: &mut Request, res: &mut Response) -> Completion {
        match self.dispatch(req, res, Completion::from_exit) {
            Dispatched::Halted => Completion::Handled,
            Dispatched::Done(completion) => completion,
        }
    }

    /// Match the request path against this route, then dispatch.
    ///
    /// On a match the extracted parameters replace `req.params`. A path segment
    /// that cannot be percent-decoded becomes a 400 [`Completion::Failed`]
    /// without running any handler.
    pub fn handle(&self, req: &mut Request, res: &mut Response) -> Completion {
        match self.pattern().matches(req.path()) {
            Ok(None) => Completion::NotMatched,
            Err(err) => {
                debug!(
                    route = %self.path(),
                    param = %err.param,
                    "Path parameter could not be decoded"
                );
                Completion::Failed(HandlerError::from(err))
            }
            Ok(Some(matched)) => {
                req.params = matched.params;
                self.run(req, res)
            }
        }
    }

    /// Dispatch on a dedicated `may` coroutine.
    ///
    /// `done` receives the outcome together with the request and response once
    /// the stack has finished, on the coroutine.
    ///
    /// # Safety
    ///
    /// This calls `may::coroutine::Builder::spawn()`, which is unsafe in the
    /// `may` runtime. The caller must ensure the runtime is initialised and that
    /// handlers do not rely on thread-local state across blocking points.
    ///
    /// # Errors
    ///
    /// Returns the spawn error if the coroutine could not be created.
    pub unsafe fn spawn_dispatch<F>(
        self: &Arc<Self>,
        mut req: Request,
        mut res: Response,
        stack_size: usize,
        done: F,
    ) -> io::Result<JoinHandle<()>>
    where
        F: FnOnce(Completion, Request, Response) + Send + 'static,
    {
        let route = Arc::clone(self);
        // SAFETY: see the function-level contract; the closure owns everything it touches.
        unsafe {
            coroutine::Builder::new()
                .name(format!("route {}", route.path()))
                .stack_size(stack_size)
                .spawn(move || {
                    let completion = route.run(&mut req, &mut res);
                    done(completion, req, res);
                })
        }
    }
}
