use http::Method;
use serde_json::Value;
use smallvec::SmallVec;
use std::sync::Arc;

use crate::layer::Params;

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Header storage for the dispatch path. Names are shared `Arc<str>`.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// The route currently dispatching a request, visible to its handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteContext {
    /// Path template the route was registered under
    pub path: Arc<str>,
    /// Methods the route answers, as reported by `Route::allowed_methods`
    pub methods: Vec<String>,
}

/// Request data threaded through a route's handler stack.
///
/// Only what dispatch needs lives here: the method, the URL, the parameters a
/// match produced, and the routing context. Headers and body are carried along
/// for handlers but never interpreted by the engine.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method; dispatch never rewrites it, even for the HEAD→GET fallback
    pub method: Method,
    /// Request target: path plus optional query string
    pub url: String,
    /// Parameters extracted by the matching route
    pub params: Params,
    /// Request headers (case-insensitive lookup via [`Request::header`])
    pub headers: HeaderVec,
    /// Parsed body, if the server decoded one
    pub body: Option<Value>,
    /// Set by `Route::dispatch` before the first handler runs
    pub route: Option<RouteContext>,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            params: Params::new(),
            headers: HeaderVec::new(),
            body: None,
            route: None,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((Arc::from(name), value.into()));
        self
    }

    /// The path component of the URL, without the query string.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        match self.url.find('?') {
            Some(pos) => &self.url[..pos],
            None => &self.url,
        }
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get a path parameter by name
    #[inline]
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }
}
