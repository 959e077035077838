//! # Runtime Configuration Module
//!
//! Environment-driven settings for dispatch and route compilation.
//!
//! ## Environment Variables
//!
//! ### `BRRTS_STACK_SIZE`
//!
//! Stack size for coroutines started by [`crate::route::Route::spawn_dispatch`].
//! Accepts decimal (`65536`) or hexadecimal (`0x10000`). Default: `0x10000` (64 KB).
//!
//! Handler stacks run entirely on this stack, so deep middleware chains need
//! more than a single handler does.
//!
//! ### `BRRTS_CASE_SENSITIVE`
//!
//! `true` makes route paths match case-sensitively. Default: `false`.
//!
//! ### `BRRTS_STRICT_ROUTING`
//!
//! `true` makes a trailing `/` significant (`/users` does not match `/users/`).
//! Default: `false`.
//!
//! ```rust
//! use brrtstack::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Stack size: {} bytes", config.stack_size);
//! ```

use std::env;

use crate::layer::MatchOptions;

const DEFAULT_STACK_SIZE: usize = 0x10000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size for dispatch coroutines in bytes
    pub stack_size: usize,
    /// Match route paths case-sensitively
    pub case_sensitive: bool,
    /// Treat a trailing slash as significant
    pub strict_routing: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
            case_sensitive: false,
            strict_routing: false,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            stack_size: lookup("BRRTS_STACK_SIZE")
                .and_then(|v| parse_size(&v))
                .unwrap_or(defaults.stack_size),
            case_sensitive: lookup("BRRTS_CASE_SENSITIVE")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.case_sensitive),
            strict_routing: lookup("BRRTS_STRICT_ROUTING")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.strict_routing),
        }
    }

    /// Matching options for route paths.
    #[must_use]
    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            end: true,
            strict: self.strict_routing,
            sensitive: self.case_sensitive,
        }
    }
}

fn parse_size(value: &str) -> Option<usize> {
    let value = value.trim();
    match value.strip_prefix("0x") {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
