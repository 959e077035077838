//! Percent-decoding for captured path parameters.

use crate::error::MalformedUri;
use std::borrow::Cow;

/// Decode a captured path parameter.
///
/// Every `%` must start a two-digit hex escape and the decoded bytes must form
/// valid UTF-8. `+` is left untouched (it only means space in query strings).
/// Empty input is returned as-is.
///
/// # Errors
///
/// Returns [`MalformedUri`] carrying the raw text when an escape is truncated,
/// not hexadecimal, or decodes to invalid UTF-8.
pub fn decode_param(raw: &str) -> Result<Cow<'_, str>, MalformedUri> {
    if raw.is_empty() || !raw.contains('%') {
        return Ok(Cow::Borrowed(raw));
    }

    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return Err(malformed(raw));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    urlencoding::decode(raw).map_err(|_| malformed(raw))
}

fn malformed(raw: &str) -> MalformedUri {
    MalformedUri {
        param: raw.to_string(),
    }
}
