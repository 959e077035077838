use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::error;

use super::pattern::{MatchOptions, PathMatch, PathPattern};
use crate::context::{Request, Response};
use crate::error::{MalformedUri, PatternSyntaxError};
use crate::handler::{Handler, HandlerError, Next};

/// Which request methods a layer runs for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodFilter {
    /// Registered through `all`: runs for every method
    All,
    /// Runs only for this lower-cased method name
    Only(Arc<str>),
}

impl MethodFilter {
    /// Whether a layer with this filter runs for `method` (lower-cased).
    #[inline]
    #[must_use]
    pub fn admits(&self, method: &str) -> bool {
        match self {
            MethodFilter::All => true,
            MethodFilter::Only(m) => m.as_ref() == method,
        }
    }
}

/// A compiled path pattern bound to one handler.
///
/// The pattern is shared behind an `Arc`; layers created for a route all point
/// at the same root pattern.
#[derive(Debug, Clone)]
pub struct Layer {
    pattern: Arc<PathPattern>,
    method: MethodFilter,
    handler: Handler,
}

impl Layer {
    /// Compile `path` and bind it to `handler`. The layer runs for every method.
    ///
    /// # Errors
    ///
    /// Returns [`PatternSyntaxError`] if `path` is not a valid template.
    pub fn new(
        path: &str,
        options: MatchOptions,
        handler: Handler,
    ) -> Result<Self, PatternSyntaxError> {
        let pattern = PathPattern::new(path, options)?;
        Ok(Self::with_pattern(Arc::new(pattern), MethodFilter::All, handler))
    }

    pub(crate) fn with_pattern(
        pattern: Arc<PathPattern>,
        method: MethodFilter,
        handler: Handler,
    ) -> Self {
        Self {
            pattern,
            method,
            handler,
        }
    }

    #[must_use]
    pub fn method(&self) -> &MethodFilter {
        &self.method
    }

    #[must_use]
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Match a path against this layer's pattern.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedUri`] when a captured segment cannot be decoded.
    pub fn matches(&self, path: &str) -> Result<Option<PathMatch>, MalformedUri> {
        self.pattern.matches(path)
    }

    /// Run the handler for a request with no error in flight.
    ///
    /// Error handlers are not eligible and answer `Continue` without running.
    /// A panic becomes [`Next::Error`].
    pub fn handle_request(&self, req: &mut Request, res: &mut Response) -> Next {
        let Handler::Request { handler, name } = &self.handler else {
            return Next::Continue;
        };

        match catch_unwind(AssertUnwindSafe(|| handler.handle(req, res))) {
            Ok(next) => next,
            Err(panic) => {
                let err = HandlerError::from_panic(panic);
                error!(
                    handler_name = %name,
                    method = %req.method,
                    path = %req.path(),
                    error = %err,
                    "Handler panicked"
                );
                Next::Error(err)
            }
        }
    }

    /// Run the handler for a request carrying `err`.
    ///
    /// Request handlers are not eligible and hand the error straight back.
    /// A panic replaces `err` as the in-flight error.
    pub fn handle_error(&self, err: HandlerError, req: &mut Request, res: &mut Response) -> Next {
        let Handler::Error { handler, name } = &self.handler else {
            return Next::Error(err);
        };

        match catch_unwind(AssertUnwindSafe(|| handler.handle_error(err, req, res))) {
            Ok(next) => next,
            Err(panic) => {
                let err = HandlerError::from_panic(panic);
                error!(
                    handler_name = %name,
                    method = %req.method,
                    path = %req.path(),
                    error = %err,
                    "Error handler panicked"
                );
                Next::Error(err)
            }
        }
    }
}
