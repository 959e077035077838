use http::Method;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::methods::is_standard_method;
use crate::context::RouteContext;
use crate::error::RouteError;
use crate::handler::{Handler, HandlerArg};
use crate::layer::{Layer, MatchOptions, MethodFilter, PathPattern};
use crate::runtime_config::RuntimeConfig;

/// Handlers bound to one path across one or more HTTP methods.
///
/// The stack is append-only and dispatched in registration order. Every layer
/// shares the route's root pattern (`/` in prefix mode), which matches anything:
/// the route's own `path` is what selects the route in the first place.
///
/// A `Route` is built with `&mut self` registration calls and then shared
/// read-only (typically behind an `Arc`) for dispatch. Use
/// [`super::SharedRoute`] when handlers must be added while requests are flowing.
#[derive(Debug, Clone)]
pub struct Route {
    path: Arc<str>,
    pattern: Arc<PathPattern>,
    root: Arc<PathPattern>,
    pub(super) stack: Vec<Layer>,
    pub(super) methods: BTreeSet<String>,
    pub(super) all: bool,
}

impl Route {
    /// Create a route for `path` with default matching options.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Pattern`] if `path` is not a valid template.
    pub fn new(path: &str) -> Result<Self, RouteError> {
        Self::with_options(path, MatchOptions::default())
    }

    /// Create a route using the case/strictness settings from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Pattern`] if `path` is not a valid template.
    pub fn with_config(path: &str, config: &RuntimeConfig) -> Result<Self, RouteError> {
        Self::with_options(path, config.match_options())
    }

    /// Create a route whose own path is compiled with `options`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Pattern`] if `path` is not a valid template.
    pub fn with_options(path: &str, options: MatchOptions) -> Result<Self, RouteError> {
        let pattern = PathPattern::new(path, options)?;
        let root = PathPattern::new("/", MatchOptions::prefix())?;

        debug!(
            path = %path,
            params = pattern.keys().len(),
            "Route created"
        );

        Ok(Self {
            path: Arc::from(path),
            pattern: Arc::new(pattern),
            root: Arc::new(root),
            stack: Vec::new(),
            methods: BTreeSet::new(),
            all: false,
        })
    }

    /// The template this route was registered under.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The route's compiled path.
    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Registered layers in dispatch order.
    #[must_use]
    pub fn stack(&self) -> &[Layer] {
        &self.stack
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Register handlers that run for every method.
    ///
    /// # Errors
    ///
    /// See [`Route::register`].
    pub fn all(&mut self, handlers: impl Into<HandlerArg>) -> Result<&mut Self, RouteError> {
        self.register("all", handlers)
    }

    /// Register handlers for `method` (case-insensitive); `"all"` registers
    /// handlers that run for every method.
    ///
    /// Nested lists are flattened in order. The call is all-or-nothing: if any
    /// value is not a handler nothing is appended.
    ///
    /// # Errors
    ///
    /// - [`RouteError::InvalidMethod`] if `method` is not an HTTP token
    /// - [`RouteError::InvalidHandler`] naming the type of the first non-handler value
    pub fn register(
        &mut self,
        method: &str,
        handlers: impl Into<HandlerArg>,
    ) -> Result<&mut Self, RouteError> {
        let registration = Registration::prepare(&self.path, method, handlers.into())?;
        if self.apply(&registration) {
            self.log_registration(&registration);
        }
        Ok(self)
    }

    /// Append a validated registration. Returns `false` when it was empty.
    pub(super) fn apply(&mut self, registration: &Registration) -> bool {
        if registration.handlers.is_empty() {
            return false;
        }

        for handler in &registration.handlers {
            self.stack.push(Layer::with_pattern(
                Arc::clone(&self.root),
                registration.filter.clone(),
                handler.clone(),
            ));
        }

        match &registration.filter {
            MethodFilter::All => self.all = true,
            MethodFilter::Only(_) => {
                self.methods.insert(registration.method.clone());
            }
        }
        true
    }

    pub(super) fn log_registration(&self, registration: &Registration) {
        for handler in &registration.handlers {
            debug!(
                method = %registration.method,
                path = %self.path,
                handler_name = %handler.name(),
                error_handler = handler.is_error_handler(),
                "Handler registered"
            );
        }
        info!(
            path = %self.path,
            stack_len = self.stack.len(),
            methods = ?self.allowed_methods(),
            "Route stack updated"
        );
    }

    /// Whether the route has handlers for `method`.
    ///
    /// True when `all` handlers exist, or the lower-cased method was registered.
    /// `HEAD` falls back to `GET` when no `HEAD` handlers are registered.
    #[must_use]
    pub fn supports_method(&self, method: &str) -> bool {
        if self.all {
            return true;
        }
        let name = method.to_ascii_lowercase();
        let name = if name == "head" && !self.methods.contains("head") {
            "get"
        } else {
            name.as_str()
        };
        self.methods.contains(name)
    }

    /// Registered methods, upper-cased and sorted.
    ///
    /// `HEAD` is included when `GET` is registered and `HEAD` is not, reflecting
    /// the implicit fallback. Handlers registered through `all` add nothing.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<String> {
        let mut methods: Vec<String> = self
            .methods
            .iter()
            .map(|m| m.to_ascii_uppercase())
            .collect();
        if self.methods.contains("get") && !self.methods.contains("head") {
            methods.push("HEAD".to_string());
        }
        methods.sort();
        methods
    }

    /// Value for an `Allow` header or an automatic `OPTIONS` answer.
    #[must_use]
    pub fn allow_header(&self) -> String {
        self.allowed_methods().join(", ")
    }

    pub(crate) fn context(&self) -> RouteContext {
        RouteContext {
            path: Arc::clone(&self.path),
            methods: self.allowed_methods(),
        }
    }
}

/// A registration call after method validation and handler flattening.
#[derive(Debug, Clone)]
pub(super) struct Registration {
    pub(super) method: String,
    pub(super) filter: MethodFilter,
    pub(super) handlers: Vec<Handler>,
}

impl Registration {
    pub(super) fn prepare(
        path: &str,
        method: &str,
        handlers: HandlerArg,
    ) -> Result<Self, RouteError> {
        let method = method.to_ascii_lowercase();
        let filter = if method == "all" {
            MethodFilter::All
        } else {
            if Method::from_bytes(method.to_ascii_uppercase().as_bytes()).is_err() {
                return Err(RouteError::InvalidMethod(method));
            }
            if !is_standard_method(&method) {
                warn!(
                    method = %method,
                    path = %path,
                    "Registering handlers for a non-standard HTTP method"
                );
            }
            MethodFilter::Only(Arc::from(method.as_str()))
        };

        let mut flat = Vec::new();
        handlers
            .flatten_into(&mut flat)
            .map_err(|type_name| RouteError::InvalidHandler {
                method: method.clone(),
                type_name: type_name.to_string(),
            })?;

        Ok(Self {
            method,
            filter,
            handlers: flat,
        })
    }
}
