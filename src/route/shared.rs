use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::debug;

use super::core::Registration;
use super::{Completion, Route};
use crate::context::{Request, Response};
use crate::error::RouteError;
use crate::handler::HandlerArg;

/// A route that can gain handlers while requests are being dispatched.
///
/// Readers take a snapshot with [`SharedRoute::load`] and dispatch against it
/// without locking. Registration clones the current route, appends, and swaps
/// the new version in; a dispatch already in progress keeps the snapshot it
/// started with.
#[derive(Debug)]
pub struct SharedRoute {
    inner: ArcSwap<Route>,
}

impl SharedRoute {
    #[must_use]
    pub fn new(route: Route) -> Self {
        Self {
            inner: ArcSwap::from_pointee(route),
        }
    }

    /// Current snapshot of the route.
    #[must_use]
    pub fn load(&self) -> Arc<Route> {
        self.inner.load_full()
    }

    /// Register handlers; visible to dispatches that load after this returns.
    ///
    /// # Errors
    ///
    /// Same as [`Route::register`]. On error the published route is unchanged.
    pub fn register(&self, method: &str, handlers: impl Into<HandlerArg>) -> Result<(), RouteError> {
        let current = self.inner.load_full();
        let registration = Registration::prepare(current.path(), method, handlers.into())?;
        if registration.handlers.is_empty() {
            return Ok(());
        }

        let mut current = current;
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let mut next = Route::clone(&current);
            next.apply(&registration);
            let next = Arc::new(next);

            let previous = self.inner.compare_and_swap(&current, Arc::clone(&next));
            if Arc::ptr_eq(&*previous, &current) {
                next.log_registration(&registration);
                debug!(
                    path = %next.path(),
                    method = %registration.method,
                    attempts = attempts,
                    "Shared route updated"
                );
                return Ok(());
            }
            current = self.inner.load_full();
        }
    }

    /// Register handlers that run for every method.
    ///
    /// # Errors
    ///
    /// Same as [`Route::register`].
    pub fn all(&self, handlers: impl Into<HandlerArg>) -> Result<(), RouteError> {
        self.register("all", handlers)
    }

    /// Dispatch against the current snapshot.
    pub fn run(&self, req: &mut Request, res: &mut Response) -> Completion {
        self.load().run(req, res)
    }

    /// Match and dispatch against the current snapshot.
    pub fn handle(&self, req: &mut Request, res: &mut Response) -> Completion {
        self.load().handle(req, res)
    }
}

impl From<Route> for SharedRoute {
    fn from(route: Route) -> Self {
        Self::new(route)
    }
}
