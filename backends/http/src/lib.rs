#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! # `tradewire-http`: HTTP Transport Backend
//!
//! This crate provides a concrete HTTP-based implementation of the
//! [`transport::Transport`] trait on top of [`reqwest`].
//!
//! ## Overview
//!
//! - Implements [`HttpTransport`], a thin wrapper over [`reqwest::Client`]
//! - Joins the base URL with each request path and sends JSON bodies
//! - Retries transient failures according to a [`RetryPolicy`]
//! - Maps non-2xx statuses onto [`transport::ApiError`]
//!
//! ## Example
//! ```no_run
//! use tradewire_http::HttpTransport;
//! use transport::{ApiRequest, Transport};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let transport = HttpTransport::new("https://api.example.com/v1");
//! let response = transport.execute(&ApiRequest::get("/orders")).await.unwrap();
//! println!("{}", response.body);
//! # });
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use transport::{
    check_status, parse_retry_after, ApiRequest, HttpMethod, RawResponse, RetryPolicy, Transport,
    TransportError,
};

/// Default `User-Agent` header value.
pub const DEFAULT_USER_AGENT: &str = concat!("tradewire/", env!("CARGO_PKG_VERSION"));

/// Settings of an [`HttpTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct HttpTransportConfig {
    /// Base URL every request path is appended to
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// `User-Agent` header value
    pub user_agent: String,
    /// Retry behaviour for transient failures
    pub retry: RetryPolicy,
}

impl HttpTransportConfig {
    /// Defaults for `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

/// A failed attempt, with the server's requested back-off if it sent one.
struct Failure {
    error: TransportError,
    retry_after: Option<Duration>,
}

impl From<TransportError> for Failure {
    fn from(error: TransportError) -> Self { Self { error, retry_after: None } }
}

/// A concrete implementation of the [`Transport`] trait using HTTP.
///
/// `HttpTransport` performs no decoding: it returns the raw response of a
/// successful call and leaves coercion to the client. Errors encountered at
/// any stage (connection, timeout, status) are normalized into
/// [`TransportError`] variants for uniform handling.
#[derive(Clone)]
pub struct HttpTransport {
    /// The underlying HTTP client used to perform requests.
    client: reqwest::Client,
    /// Base URL, timeout, user agent and retry policy.
    config: HttpTransportConfig,
}

impl HttpTransport {
    /// Constructs a new `HttpTransport` targeting the provided base URL with
    /// default settings.
    ///
    /// # Example
    /// ```
    /// use tradewire_http::HttpTransport;
    /// use transport::Transport;
    ///
    /// let transport = HttpTransport::new("https://api.example.com/v1/");
    /// assert_eq!(transport.endpoint(), "https://api.example.com/v1");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_config(HttpTransportConfig::new(base_url))
    }

    /// Constructs a new `HttpTransport` from explicit settings.
    pub fn with_config(mut config: HttpTransportConfig) -> Self {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        logging::trace("HTTP", &format!("→ initializing HTTP transport for {}", config.base_url));
        Self { client: reqwest::Client::new(), config }
    }

    /// Settings in use.
    pub fn config(&self) -> &HttpTransportConfig { &self.config }

    /// Full URL of a request path.
    pub fn url_for(&self, path: &str) -> String {
        if path.is_empty() {
            return self.config.base_url.clone();
        }
        format!("{}/{}", self.config.base_url, path.trim_start_matches('/'))
    }

    fn method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }

    fn map_reqwest_error(err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_builder() {
            TransportError::Config(err.to_string())
        } else {
            TransportError::Http(err.to_string())
        }
    }

    /// Attempt a single call.
    async fn send_once(&self, url: &str, request: &ApiRequest) -> Result<RawResponse, Failure> {
        let mut builder = self
            .client
            .request(Self::method(request.method), url)
            .timeout(self.config.timeout)
            .header(USER_AGENT, &self.config.user_agent)
            .header(ACCEPT, "application/json");
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(|e| {
            tracing::error!("HTTP Transport - Request failed: {}", e);
            Self::map_reqwest_error(e)
        })?;

        let status = resp.status().as_u16();
        let headers: Vec<(String, String)> = resp
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();

        let body = resp.text().await.map_err(|e| {
            tracing::error!("HTTP Transport - Failed to read body: {}", e);
            Self::map_reqwest_error(e)
        })?;

        let response = RawResponse { status, headers, body };
        let retry_after = response.header("retry-after").and_then(parse_retry_after);
        check_status(response).map_err(|error| Failure { error, retry_after })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    /// Sends a request, retrying transient failures.
    ///
    /// # Errors
    /// - [`TransportError::Http`] if the connection fails
    /// - [`TransportError::Timeout`] if the request exceeds the timeout
    /// - [`TransportError::Api`] for non-2xx statuses
    /// - [`TransportError::Config`] if the request cannot be built
    async fn execute(&self, request: &ApiRequest) -> Result<RawResponse, TransportError> {
        let url = self.url_for(&request.path);
        let policy = self.config.retry;
        let mut last_error = None;

        for attempt in 0..=policy.max_retries {
            logging::trace(
                "HTTP",
                &format!("→ {} {} (attempt {})", request.method, url, attempt + 1),
            );
            match self.send_once(&url, request).await {
                Ok(response) => return Ok(response),
                Err(failure) => {
                    if !policy.should_retry(attempt, &failure.error) {
                        return Err(failure.error);
                    }
                    let delay = policy.delay_for(attempt, failure.retry_after);
                    tracing::warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "HTTP Transport - retrying {} {}: {}",
                        request.method,
                        url,
                        failure.error
                    );
                    last_error = Some(failure.error);
                    tokio::time::sleep(delay).await;
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| TransportError::Other("retry budget exhausted".to_string())))
    }

    /// Returns the configured base URL.
    fn endpoint(&self) -> &str { &self.config.base_url }
}
