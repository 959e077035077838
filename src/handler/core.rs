use std::fmt;
use std::sync::Arc;

use super::HandlerError;
use crate::context::{Request, Response};

/// What a handler tells the dispatcher to do next.
///
/// `SkipRoute` and `SkipRouter` are control-flow signals, not failures: they are
/// never logged as errors and never reach an error handler.
#[must_use]
#[derive(Debug)]
pub enum Next {
    /// Run the next eligible handler
    Continue,
    /// Raise (or keep propagating) an application error
    Error(HandlerError),
    /// Leave this route; the enclosing router keeps trying other routes
    SkipRoute,
    /// Leave this route and tell the enclosing router to stop as well
    SkipRouter,
    /// The exchange is finished; nothing else runs and no completion is reported
    Halt,
}

impl Next {
    /// `Continue` on `Ok`, a 500 `Error` otherwise.
    pub fn from_result<E: Into<anyhow::Error>>(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Next::Continue,
            Err(e) => Next::Error(HandlerError::internal(e)),
        }
    }
}

impl From<HandlerError> for Next {
    fn from(err: HandlerError) -> Self {
        Next::Error(err)
    }
}

/// A handler for requests that are not carrying an error.
///
/// Closures `Fn(&mut Request, &mut Response) -> Next` can be registered directly
/// through [`Handler::request`]; implement this trait for stateful handlers.
pub trait RequestHandler: Send + Sync {
    fn handle(&self, req: &mut Request, res: &mut Response) -> Next;
}

/// A handler that only runs while an error is in flight.
pub trait ErrorHandler: Send + Sync {
    fn handle_error(&self, err: HandlerError, req: &mut Request, res: &mut Response) -> Next;
}

struct RequestFn<F>(F);

impl<F> RequestHandler for RequestFn<F>
where
    F: Fn(&mut Request, &mut Response) -> Next + Send + Sync,
{
    fn handle(&self, req: &mut Request, res: &mut Response) -> Next {
        (self.0)(req, res)
    }
}

struct ErrorFn<F>(F);

impl<F> ErrorHandler for ErrorFn<F>
where
    F: Fn(HandlerError, &mut Request, &mut Response) -> Next + Send + Sync,
{
    fn handle_error(&self, err: HandlerError, req: &mut Request, res: &mut Response) -> Next {
        (self.0)(err, req, res)
    }
}

const ANONYMOUS: &str = "<anonymous>";

/// A registered callback, tagged as either a request or an error handler.
///
/// The tag decides eligibility during dispatch: request handlers run while no
/// error is in flight, error handlers only while one is.
#[derive(Clone)]
pub enum Handler {
    Request {
        name: Arc<str>,
        handler: Arc<dyn RequestHandler>,
    },
    Error {
        name: Arc<str>,
        handler: Arc<dyn ErrorHandler>,
    },
}

impl Handler {
    /// A request handler from a closure.
    pub fn request<F>(f: F) -> Self
    where
        F: Fn(&mut Request, &mut Response) -> Next + Send + Sync + 'static,
    {
        Self::from_request_handler(RequestFn(f))
    }

    /// An error handler from a closure.
    pub fn error<F>(f: F) -> Self
    where
        F: Fn(HandlerError, &mut Request, &mut Response) -> Next + Send + Sync + 'static,
    {
        Self::from_error_handler(ErrorFn(f))
    }

    pub fn from_request_handler<H: RequestHandler + 'static>(handler: H) -> Self {
        Handler::Request {
            name: Arc::from(ANONYMOUS),
            handler: Arc::new(handler),
        }
    }

    pub fn from_error_handler<H: ErrorHandler + 'static>(handler: H) -> Self {
        Handler::Error {
            name: Arc::from(ANONYMOUS),
            handler: Arc::new(handler),
        }
    }

    /// Attach a name used in logs.
    #[must_use]
    pub fn named(self, new_name: &str) -> Self {
        match self {
            Handler::Request { handler, .. } => Handler::Request {
                name: Arc::from(new_name),
                handler,
            },
            Handler::Error { handler, .. } => Handler::Error {
                name: Arc::from(new_name),
                handler,
            },
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Handler::Request { name, .. } | Handler::Error { name, .. } => &**name,
        }
    }

    #[must_use]
    pub fn is_error_handler(&self) -> bool {
        matches!(self, Handler::Error { .. })
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_error_handler() {
            "error"
        } else {
            "request"
        };
        f.debug_struct("Handler")
            .field("name", &self.name())
            .field("kind", &kind)
            .finish()
    }
}

/// A value handed to a registration call.
///
/// Handler lists are often assembled at runtime (looked up by name, collected
/// from plugins), so registration accepts nested lists and values that turned
/// out not to be handlers; the latter fail the call with
/// [`crate::error::RouteError::InvalidHandler`].
#[derive(Debug, Clone)]
pub enum HandlerArg {
    One(Handler),
    List(Vec<HandlerArg>),
    /// Something that is not a handler, identified by its type name
    Invalid(&'static str),
}

impl HandlerArg {
    /// Mark an arbitrary value as a (rejected) registration argument.
    pub fn invalid<T: ?Sized>(_value: &T) -> Self {
        HandlerArg::Invalid(std::any::type_name::<T>())
    }

    /// Flatten nested lists in order. Stops at the first invalid value and
    /// returns its type name.
    pub(crate) fn flatten_into(self, out: &mut Vec<Handler>) -> Result<(), &'static str> {
        match self {
            HandlerArg::One(h) => {
                out.push(h);
                Ok(())
            }
            HandlerArg::List(items) => {
                for item in items {
                    item.flatten_into(out)?;
                }
                Ok(())
            }
            HandlerArg::Invalid(type_name) => Err(type_name),
        }
    }
}

impl From<Handler> for HandlerArg {
    fn from(h: Handler) -> Self {
        HandlerArg::One(h)
    }
}

impl From<Option<Handler>> for HandlerArg {
    fn from(h: Option<Handler>) -> Self {
        match h {
            Some(h) => HandlerArg::One(h),
            None => HandlerArg::Invalid("Option::None"),
        }
    }
}

impl From<Vec<Handler>> for HandlerArg {
    fn from(handlers: Vec<Handler>) -> Self {
        HandlerArg::List(handlers.into_iter().map(HandlerArg::One).collect())
    }
}

impl From<Vec<HandlerArg>> for HandlerArg {
    fn from(args: Vec<HandlerArg>) -> Self {
        HandlerArg::List(args)
    }
}

impl<const N: usize> From<[Handler; N]> for HandlerArg {
    fn from(handlers: [Handler; N]) -> Self {
        HandlerArg::List(handlers.into_iter().map(HandlerArg::One).collect())
    }
}
