#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! # `tradewire-transport`: Request Execution Boundary
//!
//! This crate defines the **transport abstraction** the tradewire client
//! talks through. A transport executes an [`ApiRequest`] against some base
//! URL and hands back the [`RawResponse`]; it knows nothing about models or
//! coercion.
//!
//! ## Core Concepts
//!
//! ### `Transport` Trait
//! One async method, [`Transport::execute`]. Backends such as
//! `tradewire-http` implement it; tests implement it in memory.
//!
//! ### `TransportError`
//! Connection, timeout and serialization failures, plus [`ApiError`] for
//! non-2xx responses. The HTTP status is mapped onto an [`ApiErrorKind`]
//! once, here, so every backend reports API failures the same way.
//!
//! ### `RetryPolicy`
//! Which failures are worth repeating and how long to wait in between.
//! Backends own the retry loop; the policy only decides.
//!
//! ## Example
//! ```no_run
//! use transport::{ApiRequest, DynTransport, TransportError};
//!
//! async fn demo(transport: DynTransport) -> Result<(), TransportError> {
//!     let response = transport.execute(&ApiRequest::get("/orders").query("page", 1)).await?;
//!     println!("orders = {}", response.json()?);
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

mod request;
mod retry;

pub use request::{ApiRequest, HttpMethod, RawResponse};
pub use retry::{parse_retry_after, RetryPolicy};

/// Type alias for structured error handling in transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Category of an API error, derived from the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// 400
    BadRequest,
    /// 401
    Authentication,
    /// 403
    PermissionDenied,
    /// 404
    NotFound,
    /// 409
    Conflict,
    /// 422
    UnprocessableEntity,
    /// 429
    RateLimit,
    /// 5xx
    InternalServer,
    /// Any other non-2xx status
    Unexpected,
}

impl ApiErrorKind {
    /// Kind for a non-2xx status.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ApiErrorKind::BadRequest,
            401 => ApiErrorKind::Authentication,
            403 => ApiErrorKind::PermissionDenied,
            404 => ApiErrorKind::NotFound,
            409 => ApiErrorKind::Conflict,
            422 => ApiErrorKind::UnprocessableEntity,
            429 => ApiErrorKind::RateLimit,
            _ if status >= 500 => ApiErrorKind::InternalServer,
            _ => ApiErrorKind::Unexpected,
        }
    }
}

/// A non-2xx response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// Category derived from `status`
    pub kind: ApiErrorKind,
    /// HTTP status code
    pub status: u16,
    /// Server-provided message, or the raw body when none could be found
    pub message: String,
    /// Parsed JSON body, if the body was JSON
    pub body: Option<Value>,
}

impl ApiError {
    /// An error for `status` with a plain message.
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::from_status(status),
            status,
            message: message.into(),
            body: None,
        }
    }

    /// Build the error from a failed response.
    ///
    /// The message is taken from a `message` or `error` field of a JSON body
    /// (a nested `error.message` is understood too), otherwise the body text.
    pub fn from_response(response: &RawResponse) -> Self {
        let body: Option<Value> = serde_json::from_str(&response.body).ok();
        let message = body
            .as_ref()
            .and_then(|value| {
                value
                    .get("message")
                    .or_else(|| value.get("error").and_then(|error| error.get("message")))
                    .or_else(|| value.get("error"))
                    .and_then(Value::as_str)
            })
            .map(str::to_string)
            .unwrap_or_else(|| response.body.trim().to_string());
        Self { body, ..Self::new(response.status, message) }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:?}): {}", self.status, self.kind, self.message)
    }
}

/// Canonical error type for all transport implementations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// The request could not be sent or the connection failed.
    #[error("HTTP transport error: {0}")]
    Http(String),

    /// The request did not complete in time.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The server answered with a non-2xx status.
    #[error("API error: {0}")]
    Api(ApiError),

    /// Failure to serialize or deserialize a JSON payload.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The response did not have the expected shape.
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    /// The transport is misconfigured (bad base URL, invalid header, ...).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error not covered by the specific variants above.
    #[error("Other error: {0}")]
    Other(String),
}

impl TransportError {
    /// Whether repeating the request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Http(_) | TransportError::Timeout(_) => true,
            TransportError::Api(error) => RetryPolicy::is_retryable_status(error.status),
            _ => false,
        }
    }

    /// The API error, if the server answered with a non-2xx status.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            TransportError::Api(error) => Some(error),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self { TransportError::Serialization(err.to_string()) }
}

impl From<ApiError> for TransportError {
    fn from(err: ApiError) -> Self { TransportError::Api(err) }
}

/// Turn a non-2xx response into [`TransportError::Api`].
pub fn check_status(response: RawResponse) -> Result<RawResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(TransportError::Api(ApiError::from_response(&response)))
    }
}

/// The request execution boundary.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Executes a request and returns the successful response.
    ///
    /// Implementations apply their own retry policy and report non-2xx
    /// statuses as [`TransportError::Api`] (see [`check_status`]).
    async fn execute(&self, request: &ApiRequest) -> Result<RawResponse>;

    /// Returns the configured base URL.
    ///
    /// For mock or in-memory transports, it may be a symbolic name.
    fn endpoint(&self) -> &str;
}

/// Type alias for a shared, dynamically dispatched transport instance.
///
/// ```
/// use transport::{DynTransport, Transport};
///
/// fn use_transport(t: DynTransport) {
///     println!("Using endpoint: {}", t.endpoint());
/// }
/// ```
pub type DynTransport = Arc<dyn Transport>;
