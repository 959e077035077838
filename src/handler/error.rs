use std::any::Any;
use std::fmt;

use crate::error::MalformedUri;

/// An application error travelling through a route's dispatch chain.
///
/// Raised by a handler returning [`super::Next::Error`], by a panic inside a
/// handler, or by a path that fails to decode. It skips request handlers until
/// an error handler absorbs it, or reaches the route's completion callback.
pub struct HandlerError {
    status: u16,
    inner: anyhow::Error,
}

impl HandlerError {
    /// Wrap an error with the HTTP status the enclosing router should answer with.
    pub fn new(status: u16, err: impl Into<anyhow::Error>) -> Self {
        Self {
            status,
            inner: err.into(),
        }
    }

    /// A 500 error.
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::new(500, err)
    }

    /// An error from a plain message.
    pub fn msg<M>(status: u16, message: M) -> Self
    where
        M: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        Self {
            status,
            inner: anyhow::Error::msg(message),
        }
    }

    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "handler panicked".to_string()
        };
        Self::msg(500, format!("Handler panicked: {message}"))
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// JSON body suitable for a default error response.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "error": self.inner.to_string(), "status": self.status })
    }
}

impl fmt::Debug for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerError")
            .field("status", &self.status)
            .field("error", &self.inner)
            .finish()
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.inner, self.status)
    }
}

impl std::error::Error for HandlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.inner)
    }
}

impl From<anyhow::Error> for HandlerError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err)
    }
}

impl From<MalformedUri> for HandlerError {
    fn from(err: MalformedUri) -> Self {
        Self::new(MalformedUri::STATUS, err)
    }
}
