//! Registration and matching errors.
//!
//! These are the synchronous, caller-facing failures: a malformed path template,
//! a percent-encoding that cannot be decoded, or a registration call that was handed
//! something other than a handler. Application errors raised while handlers run are
//! [`crate::handler::HandlerError`] and travel through the dispatch chain instead.

use std::fmt;

/// What was wrong with a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternErrorKind {
    /// `(` without a matching `)`
    UnbalancedOpen,
    /// `)` without a matching `(`
    UnbalancedClose,
    /// `()` with nothing inside
    EmptyGroup,
    /// A parameter pattern that opens its own capturing group
    CapturingGroup,
    /// `:` not followed by a parameter name
    MissingName,
    /// The same parameter name declared twice
    DuplicateName(String),
    /// `?`, `*` or `+` that does not follow a parameter
    DanglingModifier(char),
    /// `\` at the end of the template
    TrailingEscape,
    /// The generated expression was rejected by the regex engine
    InvalidRegex(String),
}

/// A path template that could not be compiled.
///
/// Returned by [`crate::layer::PathPattern::new`]. `position` is the byte offset in
/// `pattern` where the problem was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSyntaxError {
    /// The template as supplied
    pub pattern: String,
    /// Byte offset of the offending character
    pub position: usize,
    /// What went wrong
    pub kind: PatternErrorKind,
}

impl PatternSyntaxError {
    pub(crate) fn new(pattern: &str, position: usize, kind: PatternErrorKind) -> Self {
        Self {
            pattern: pattern.to_string(),
            position,
            kind,
        }
    }
}

impl fmt::Display for PatternErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternErrorKind::UnbalancedOpen => write!(f, "unbalanced '('"),
            PatternErrorKind::UnbalancedClose => write!(f, "unbalanced ')'"),
            PatternErrorKind::EmptyGroup => write!(f, "empty group '()'"),
            PatternErrorKind::CapturingGroup => {
                write!(f, "capturing groups are not allowed inside a parameter, use '(?:...)'")
            }
            PatternErrorKind::MissingName => write!(f, "missing parameter name after ':'"),
            PatternErrorKind::DuplicateName(name) => {
                write!(f, "duplicate parameter name '{name}'")
            }
            PatternErrorKind::DanglingModifier(c) => {
                write!(f, "modifier '{c}' must follow a parameter")
            }
            PatternErrorKind::TrailingEscape => write!(f, "trailing '\\' escapes nothing"),
            PatternErrorKind::InvalidRegex(msg) => write!(f, "invalid expression: {msg}"),
        }
    }
}

impl fmt::Display for PatternSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid path pattern '{}' at position {}: {}",
            self.pattern, self.position, self.kind
        )
    }
}

impl std::error::Error for PatternSyntaxError {}

/// A captured path segment whose percent-encoding is invalid.
///
/// Matching fails with this error rather than falling back to the raw text.
/// [`crate::route::Route::handle`] turns it into a 400 [`crate::handler::HandlerError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedUri {
    /// The raw, undecoded segment
    pub param: String,
}

impl MalformedUri {
    /// HTTP status the enclosing router should answer with.
    pub const STATUS: u16 = 400;
}

impl fmt::Display for MalformedUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to decode param '{}'", self.param)
    }
}

impl std::error::Error for MalformedUri {}

/// Failure of a route registration call.
///
/// Registration is all-or-nothing: when any of these is returned the route's stack
/// is exactly what it was before the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// A value that is not a handler was passed to a registration method
    InvalidHandler {
        /// Registration method, e.g. `get` or `all`
        method: String,
        /// Type name of the rejected value
        type_name: String,
    },
    /// The method name is not a valid HTTP method token
    InvalidMethod(String),
    /// The route path could not be compiled
    Pattern(PatternSyntaxError),
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::InvalidHandler { method, type_name } => write!(
                f,
                "Route::{method}() requires a handler but got a {type_name}"
            ),
            RouteError::InvalidMethod(method) => {
                write!(f, "'{method}' is not a valid HTTP method")
            }
            RouteError::Pattern(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for RouteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouteError::Pattern(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PatternSyntaxError> for RouteError {
    fn from(err: PatternSyntaxError) -> Self {
        RouteError::Pattern(err)
    }
}
