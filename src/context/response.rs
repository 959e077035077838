use serde_json::Value;
use std::sync::Arc;

use super::HeaderVec;

/// Response state handlers write into.
///
/// The engine itself never reads it; handlers set a status, headers and a JSON
/// body and usually answer [`crate::handler::Next::Halt`] once they have sent it.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderVec,
    /// Response body
    pub body: Value,
    /// Whether a handler has sent the response
    pub finished: bool,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: HeaderVec::new(),
            body: Value::Null,
            finished: false,
        }
    }

    /// Set the status code.
    pub fn status(&mut self, status: u16) -> &mut Self {
        self.status = status;
        self
    }

    /// Add or update a header (case-insensitive replace)
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value.into()));
        self
    }

    /// Send a JSON body and mark the response finished.
    pub fn json(&mut self, body: Value) -> &mut Self {
        self.set_header("content-type", "application/json");
        self.send(body)
    }

    /// Send a body and mark the response finished.
    pub fn send(&mut self, body: Value) -> &mut Self {
        self.body = body;
        self.finished = true;
        self
    }
}
