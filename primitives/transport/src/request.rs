//! Request and response envelopes exchanged with a [`Transport`](crate::Transport).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Result, TransportError};

/// HTTP verb of an API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Verb as sent on the request line.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// An API call, relative to the transport's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP verb
    pub method: HttpMethod,
    /// Path below the base URL, e.g. `/orders/42`
    pub path: String,
    /// Query parameters in order
    pub query: Vec<(String, String)>,
    /// Extra request headers
    pub headers: Vec<(String, String)>,
    /// JSON body
    pub body: Option<Value>,
}

impl ApiRequest {
    /// A request without query, headers or body.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), query: Vec::new(), headers: Vec::new(), body: None }
    }

    /// `GET path`.
    pub fn get(path: impl Into<String>) -> Self { Self::new(HttpMethod::Get, path) }

    /// `POST path` with a JSON body.
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Post, path).with_body(body)
    }

    /// `PUT path` with a JSON body.
    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Put, path).with_body(body)
    }

    /// `PATCH path` with a JSON body.
    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Patch, path).with_body(body)
    }

    /// `DELETE path`.
    pub fn delete(path: impl Into<String>) -> Self { Self::new(HttpMethod::Delete, path) }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Replace every query parameter named `key`.
    pub fn set_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.retain(|(existing, _)| existing != key);
        self.query(key, value)
    }

    /// Add a request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Value of the first query parameter named `key`.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(existing, _)| existing == key).map(|(_, value)| value.as_str())
    }
}

/// A response as received, before any decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers, names lowercased
    pub headers: Vec<(String, String)>,
    /// Response body text
    pub body: String,
}

impl RawResponse {
    /// A response with the given status and body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, headers: Vec::new(), body: body.into() }
    }

    /// Add a header; the name is lowercased.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.into()));
        self
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool { (200..300).contains(&self.status) }

    /// Value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Parse the body as JSON. An empty body reads as `null`.
    pub fn json(&self) -> Result<Value> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&self.body).map_err(|e| {
            TransportError::Serialization(format!(
                "{} (status: {}, body: {})",
                e, self.status, self.body
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_builders() {
        let request = ApiRequest::get("/orders").query("page", 2).query("status", "open");
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.query_value("page"), Some("2"));

        let request = request.set_query("page", 3);
        assert_eq!(request.query_value("page"), Some("3"));
        assert_eq!(request.query.len(), 2);

        let request =
            ApiRequest::post("/orders", json!({"number": "SO-1"})).header("X-Trace", "abc");
        assert_eq!(request.body, Some(json!({"number": "SO-1"})));
        assert_eq!(request.headers, vec![("X-Trace".to_string(), "abc".to_string())]);
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
    }

    #[test]
    fn test_response_json() {
        let response = RawResponse::new(200, r#"{"id": 1}"#)
            .with_header("Content-Type", "application/json");
        assert!(response.is_success());
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.json().expect("valid json"), json!({"id": 1}));

        assert_eq!(RawResponse::new(204, "").json().expect("empty body"), Value::Null);

        let err = RawResponse::new(200, "<html>").json().expect_err("not json");
        assert!(matches!(err, TransportError::Serialization(msg) if msg.contains("<html>")));
    }
}
