// SPDX-License-Identifier: CC0-1.0

//! Tradewire umbrella crate.
//!
//! A client for a trade and logistics REST API. Responses are decoded
//! leniently: the converter of each endpoint coerces whatever it can into
//! typed values and passes the rest through untouched, so a server that
//! grows new fields or variants does not break existing callers.
//!
//! The building blocks live in the workspace member crates:
//! - `schema`: converter descriptors, [`Typed`] values and the [`Model`] trait
//! - `convert`: the coercion engine
//! - `models`: the API's generated models
//! - `transport` and `tradewire-http`: request execution
//!
//! This crate adds the [`Client`], the response strategies and pagination.
//!
//! ## Example
//! ```no_run
//! use tradewire::models::Order;
//! use tradewire::{ApiRequest, Client, Config, Endpoint, PageSpec};
//!
//! # async fn demo() -> tradewire::Result<()> {
//! let config = Config::load(None)?;
//! tradewire::init_logging(&config)?;
//! let client = Client::from_config(&config)?;
//! let endpoint = Endpoint::page::<Order>(PageSpec::default());
//! for order in client.collect_models::<Order>(&ApiRequest::get("/orders"), &endpoint, 50).await? {
//!     println!("{:?} {:?}", order.number, order.status);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

mod client;
pub mod response;

pub use client::Client;
pub use convert::{decode, encode, ConvertError};
pub use logging::LoggingError;
pub use models;
pub use response::{Decoded, Endpoint, NdjsonStream, Page, PageSpec, ResponseStrategy};
pub use schema::{Converter, Model, ModelInstance, SchemaError, Typed};
pub use tradewire_config::{Config, ConfigError};
pub use transport::{
    ApiError, ApiErrorKind, ApiRequest, DynTransport, RawResponse, Transport, TransportError,
};

/// Version string for the umbrella crate, as reported by Cargo.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Type alias for client results.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors surfaced by [`Client`] calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request failed or the body had an unexpected shape
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The decoded value could not be read through the requested model
    #[error("Decoding failed: {0}")]
    Convert(#[from] ConvertError),

    /// A model is missing required fields
    #[error("Invalid model: {0}")]
    Schema(#[from] SchemaError),

    /// Configuration could not be loaded or is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Logging could not be set up
    #[error(transparent)]
    Logging(#[from] LoggingError),

    /// The endpoint produced something other than what the caller asked for
    #[error("Unexpected response strategy: {0}")]
    Strategy(String),
}

impl ClientError {
    /// The API error, if the server answered with a non-2xx status.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ClientError::Transport(err) => err.api_error(),
            _ => None,
        }
    }
}

/// Install the tracing subscriber described by `config.logging`.
pub fn init_logging(config: &Config) -> Result<()> {
    logging::init_with_file(&config.logging.level, config.logging.file.as_deref())?;
    Ok(())
}
