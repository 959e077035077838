//! Path-template compilation and matching.
//!
//! Templates follow the familiar `path-to-regexp` grammar:
//!
//! | Template            | Matches              | Params                  |
//! |---------------------|----------------------|-------------------------|
//! | `/users/:id`        | `/users/42`          | `id = "42"`             |
//! | `/files/:name?`     | `/files`, `/files/a` | `name` may be undefined |
//! | `/p/:segs+`         | `/p/a/b`             | `segs = "a/b"`          |
//! | `/n/:num(\d+)`      | `/n/7`               | `num = "7"`             |
//! | `/static/*`         | `/static/css/app.css`| `0 = "css/app.css"`     |
//! | `/`  (prefix mode)  | anything             | none (fast path)        |
//! | `*`                 | anything             | `0 = <whole path>`      |
//!
//! A compiled [`PathPattern`] is immutable and `Send + Sync`; every call to
//! [`PathPattern::matches`] returns a fresh [`PathMatch`], so one pattern can be
//! shared by any number of concurrent dispatches.

use super::decode::decode_param;
use crate::error::{MalformedUri, PatternErrorKind, PatternSyntaxError};
use regex::{Regex, RegexBuilder};
use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Parameter storage for the dispatch path.
///
/// Names are `Arc<str>` shared with the compiled pattern's keys; values are
/// per-request. `None` marks an optional capture that did not participate.
pub type ParamVec = SmallVec<[(Arc<str>, Option<String>); MAX_INLINE_PARAMS]>;

const DEFAULT_PARAM_PATTERN: &str = "[^/#?]+";
const CATCH_ALL_PATTERN: &str = ".*";

/// Options controlling how a template is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// Require the match to consume the whole path. When `false` the pattern
    /// matches a prefix ending at a `/` boundary.
    pub end: bool,
    /// Treat a trailing `/` as significant.
    pub strict: bool,
    /// Match case-sensitively.
    pub sensitive: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            end: true,
            strict: false,
            sensitive: false,
        }
    }
}

impl MatchOptions {
    /// Options for prefix matching (`end = false`), as used by mounted layers.
    #[must_use]
    pub fn prefix() -> Self {
        Self {
            end: false,
            ..Self::default()
        }
    }
}

/// A parameter declared by a template, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamKey {
    /// Parameter name; unnamed groups and catch-alls use their index (`"0"`, `"1"`, ...)
    pub name: Arc<str>,
    /// Declared with `?` or `*`
    pub optional: bool,
    /// Declared with `*` or `+`
    pub repeat: bool,
}

/// Parameters extracted by a match.
///
/// Ordered by capture position. Lookups by name return the stored value; a
/// name appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(ParamVec);

impl Params {
    /// An empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self(ParamVec::new())
    }

    /// Value of a parameter, if present and defined.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Whether the parameter exists, even with an undefined value.
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.0.iter().any(|(k, _)| k.as_ref() == name)
    }

    /// Set a parameter, replacing any existing value.
    pub fn insert(&mut self, name: impl Into<Arc<str>>, value: Option<String>) {
        let name = name.into();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Record a capture: a defined value always lands, an undefined one only
    /// when the name has not been seen yet.
    pub(crate) fn merge(&mut self, name: Arc<str>, value: Option<String>) {
        if value.is_some() || !self.contains_key(&name) {
            self.insert(name, value);
        }
    }

    /// Iterate over `(name, value)` pairs in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0.iter().map(|(k, v)| (k.as_ref(), v.as_deref()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

}

impl<K: Into<Arc<str>>> FromIterator<(K, Option<String>)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// Result of a successful match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathMatch {
    /// Decoded parameters
    pub params: Params,
    /// The part of the input consumed by the match (empty for the root fast path)
    pub path: String,
}

#[derive(Debug)]
enum Token {
    Literal(String),
    Param {
        name: Option<String>,
        prefix: String,
        pattern: String,
        modifier: Option<char>,
    },
}

/// A compiled path template.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: Arc<str>,
    regex: Regex,
    keys: Vec<ParamKey>,
    options: MatchOptions,
    /// Capture group holding the `/` or end-of-input that closes a prefix match
    boundary: Option<usize>,
    fast_root: bool,
    fast_wildcard: bool,
}

impl PathPattern {
    /// Compile a template.
    ///
    /// # Errors
    ///
    /// Returns [`PatternSyntaxError`] for unbalanced groups, duplicate parameter
    /// names, misplaced modifiers or an expression the regex engine rejects.
    pub fn new(pattern: &str, options: MatchOptions) -> Result<Self, PatternSyntaxError> {
        let tokens = tokenize(pattern)?;
        let (expr, keys, boundary) = build_expression(&tokens, options);
        let regex = RegexBuilder::new(&expr)
            .case_insensitive(!options.sensitive)
            .build()
            .map_err(|e| {
                PatternSyntaxError::new(pattern, 0, PatternErrorKind::InvalidRegex(e.to_string()))
            })?;

        Ok(Self {
            source: Arc::from(pattern),
            regex,
            keys,
            options,
            boundary,
            fast_root: pattern == "/" && !options.end,
            fast_wildcard: pattern == "*",
        })
    }

    /// Wrap a caller-built expression with explicit parameter names.
    ///
    /// Capture group `i` is stored under `names[i - 1]`; groups beyond the
    /// supplied names are keyed by their index. Names may repeat, in which case
    /// a later defined capture replaces an earlier one and an undefined capture
    /// never replaces a defined one.
    ///
    /// The expression is used exactly as given: anchoring, case folding and
    /// trailing-slash handling are whatever the caller built into it, and the
    /// consumed path is the whole regex match. [`PathPattern::options`] reports
    /// [`MatchOptions::default`] for such a pattern and has no effect on matching.
    #[must_use]
    pub fn from_regex<S: AsRef<str>>(regex: Regex, names: &[S]) -> Self {
        let groups = regex.captures_len().saturating_sub(1);
        let keys = (0..groups)
            .map(|i| ParamKey {
                name: names
                    .get(i)
                    .map_or_else(|| Arc::from(i.to_string()), |n| Arc::from(n.as_ref())),
                optional: false,
                repeat: false,
            })
            .collect();

        Self {
            source: Arc::from(regex.as_str()),
            regex,
            keys,
            options: MatchOptions::default(),
            boundary: None,
            fast_root: false,
            fast_wildcard: false,
        }
    }

    /// Match a request path.
    ///
    /// Returns `Ok(None)` when the path does not match. An empty path only
    /// matches the root fast path.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedUri`] when a captured segment cannot be percent-decoded.
    pub fn matches(&self, path: &str) -> Result<Option<PathMatch>, MalformedUri> {
        if self.fast_root {
            return Ok(Some(PathMatch::default()));
        }
        if path.is_empty() {
            return Ok(None);
        }
        if self.fast_wildcard {
            let mut params = Params::new();
            params.insert("0", Some(decode_param(path)?.into_owned()));
            return Ok(Some(PathMatch {
                params,
                path: path.to_string(),
            }));
        }

        let Some(caps) = self.regex.captures(path) else {
            return Ok(None);
        };
        let Some(whole) = caps.get(0) else {
            return Ok(None);
        };

        let end = match self.boundary.and_then(|i| caps.get(i)) {
            Some(boundary) => boundary.start(),
            None => whole.end(),
        };

        let mut params = Params::new();
        for (i, key) in self.keys.iter().enumerate() {
            let value = match caps.get(i + 1) {
                Some(m) => Some(decode_param(m.as_str()).map(Cow::into_owned)?),
                None => None,
            };
            params.merge(Arc::clone(&key.name), value);
        }

        Ok(Some(PathMatch {
            params,
            path: path[..end].to_string(),
        }))
    }

    /// The template this pattern was compiled from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Declared parameters in capture order.
    #[must_use]
    pub fn keys(&self) -> &[ParamKey] {
        &self.keys
    }

    /// Options the template was compiled with; the defaults for
    /// [`PathPattern::from_regex`] patterns.
    #[must_use]
    pub fn options(&self) -> MatchOptions {
        self.options
    }

    /// `/` compiled in prefix mode: matches every path without evaluating the regex.
    #[must_use]
    pub fn is_fast_root(&self) -> bool {
        self.fast_root
    }

    /// `*`: matches every path, capturing it whole as parameter `0`.
    #[must_use]
    pub fn is_fast_wildcard(&self) -> bool {
        self.fast_wildcard
    }

}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Split a template into literal runs and parameters.
fn tokenize(pattern: &str) -> Result<Vec<Token>, PatternSyntaxError> {
    let err = |pos: usize, kind| PatternSyntaxError::new(pattern, pos, kind);
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut seen: Vec<String> = Vec::new();
    let mut chars = pattern.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, escaped)) => literal.push(escaped),
                None => return Err(err(pos, PatternErrorKind::TrailingEscape)),
            },
            ':' | '(' => {
                let name = if c == ':' {
                    let mut name = String::new();
                    while let Some(&(_, n)) = chars.peek() {
                        if !is_name_char(n) {
                            break;
                        }
                        name.push(n);
                        chars.next();
                    }
                    if name.is_empty() {
                        return Err(err(pos, PatternErrorKind::MissingName));
                    }
                    if seen.contains(&name) {
                        return Err(err(pos, PatternErrorKind::DuplicateName(name)));
                    }
                    seen.push(name.clone());
                    Some(name)
                } else {
                    None
                };

                let group_start = if c == '(' {
                    Some(pos)
                } else if let Some(&(p, '(')) = chars.peek() {
                    chars.next();
                    Some(p)
                } else {
                    None
                };
                let pattern_text = match group_start {
                    Some(start) => read_group(pattern, start, &mut chars)?,
                    None => DEFAULT_PARAM_PATTERN.to_string(),
                };

                let modifier = match chars.peek() {
                    Some(&(_, m @ ('?' | '*' | '+'))) => {
                        chars.next();
                        Some(m)
                    }
                    _ => None,
                };

                let prefix = match literal.chars().last() {
                    Some(p @ ('/' | '.')) => {
                        literal.pop();
                        p.to_string()
                    }
                    _ => String::new(),
                };
                if !literal.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                }
                tokens.push(Token::Param {
                    name,
                    prefix,
                    pattern: pattern_text,
                    modifier,
                });
            }
            ')' => return Err(err(pos, PatternErrorKind::UnbalancedClose)),
            '?' | '+' => return Err(err(pos, PatternErrorKind::DanglingModifier(c))),
            '*' => {
                if !literal.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                }
                tokens.push(Token::Param {
                    name: None,
                    prefix: String::new(),
                    pattern: CATCH_ALL_PATTERN.to_string(),
                    modifier: None,
                });
            }
            _ => literal.push(c),
        }
    }

    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    Ok(tokens)
}

/// Read a parenthesised parameter pattern; the opening `(` has been consumed.
fn read_group(
    pattern: &str,
    start: usize,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> Result<String, PatternSyntaxError> {
    let err = |pos: usize, kind| PatternSyntaxError::new(pattern, pos, kind);
    let mut depth = 1usize;
    let mut body = String::new();

    while let Some((pos, c)) = chars.next() {
        match c {
            '\\' => {
                body.push(c);
                match chars.next() {
                    Some((_, escaped)) => body.push(escaped),
                    None => return Err(err(pos, PatternErrorKind::TrailingEscape)),
                }
            }
            ')' => {
                depth -= 1;
                if depth == 0 {
                    if body.is_empty() {
                        return Err(err(start, PatternErrorKind::EmptyGroup));
                    }
                    return Ok(body);
                }
                body.push(c);
            }
            '(' => {
                if !matches!(chars.peek(), Some(&(_, '?'))) {
                    return Err(err(pos, PatternErrorKind::CapturingGroup));
                }
                depth += 1;
                body.push(c);
            }
            _ => body.push(c),
        }
    }

    Err(err(start, PatternErrorKind::UnbalancedOpen))
}

/// Turn tokens into an anchored expression plus the ordered key list.
///
/// In prefix mode the expression ends in a `(/|$)` group so the engine itself
/// backtracks until the match stops at a segment boundary; the index of that
/// group is returned so the boundary can be left out of the consumed path.
fn build_expression(
    tokens: &[Token],
    options: MatchOptions,
) -> (String, Vec<ParamKey>, Option<usize>) {
    let mut expr = String::from("^");
    let mut keys = Vec::new();
    let mut unnamed = 0usize;

    for token in tokens {
        match token {
            Token::Literal(text) => expr.push_str(&regex::escape(text)),
            Token::Param {
                name,
                prefix,
                pattern,
                modifier,
            } => {
                let name: Arc<str> = match name {
                    Some(n) => Arc::from(n.as_str()),
                    None => {
                        let n = Arc::from(unnamed.to_string());
                        unnamed += 1;
                        n
                    }
                };
                let pre = regex::escape(prefix);
                let group = match modifier {
                    None => format!("{pre}({pattern})"),
                    Some('?') => format!("(?:{pre}({pattern}))?"),
                    Some('+') => format!("{pre}((?:{pattern})(?:{pre}(?:{pattern}))*)"),
                    Some(_) => format!("(?:{pre}((?:{pattern})(?:{pre}(?:{pattern}))*))?"),
                };
                expr.push_str(&group);
                keys.push(ParamKey {
                    name,
                    optional: matches!(modifier, Some('?' | '*')),
                    repeat: matches!(modifier, Some('*' | '+')),
                });
            }
        }
    }

    if !options.strict {
        if expr.ends_with('/') {
            expr.push('?');
        } else {
            expr.push_str("/?");
        }
    }

    if options.end {
        expr.push('$');
        return (expr, keys, None);
    }
    if expr.ends_with('/') {
        return (expr, keys, None);
    }
    expr.push_str("(/|$)");
    let boundary = keys.len() + 1;
    (expr, keys, Some(boundary))
}
