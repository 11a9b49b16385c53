//! Error types for the backend clients.

use http::StatusCode;
use orbitdeck::ErrorKind;
use orbitdeck::deploy::ValidationError;
use orbitdeck::record::MalformedPayload;

/// Errors that can occur while fetching the chain registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// URL parse error.
    #[error("URL parse error: {context}: {source}")]
    UrlParse {
        /// Human-readable context.
        context: &'static str,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },
    /// HTTP transport error.
    #[error("HTTP error: {context}: {source}")]
    Http {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// Non-success HTTP status.
    #[error("Unexpected HTTP status {status}: {context}: {body}")]
    HttpStatus {
        /// Human-readable context.
        context: &'static str,
        /// The HTTP status code.
        status: StatusCode,
        /// The response body.
        body: String,
    },
    /// Failed to read the response body.
    #[error("Failed to read response body: {context}: {source}")]
    ResponseBodyRead {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// The body was not JSON.
    #[error("Failed to deserialize JSON: {context}: {source}")]
    JsonDeserialization {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// The body was JSON but held no chain list.
    #[error(transparent)]
    Malformed(#[from] MalformedPayload),
}

impl RegistryError {
    /// Classifies this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UrlParse { .. }
            | Self::Http { .. }
            | Self::HttpStatus { .. }
            | Self::ResponseBodyRead { .. } => ErrorKind::NetworkTransport,
            Self::JsonDeserialization { .. } | Self::Malformed(_) => ErrorKind::MalformedResponse,
        }
    }
}

/// Errors that can occur while submitting a deployment.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The form failed local validation; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// URL parse error.
    #[error("URL parse error: {context}: {source}")]
    UrlParse {
        /// Human-readable context.
        context: &'static str,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },
    /// The request never got a response.
    #[error("Could not reach the deployment service. Please try again.")]
    Transport {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// The service answered with a non-success status. `body` is the
    /// response text, unmodified.
    #[error("{body}")]
    Rejected {
        /// The HTTP status code.
        status: StatusCode,
        /// The response body.
        body: String,
    },
    /// Failed to read the response body.
    #[error("Failed to read response body: {context}: {source}")]
    ResponseBodyRead {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
}

impl DeployError {
    /// Classifies this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::UrlParse { .. } | Self::Transport { .. } | Self::ResponseBodyRead { .. } => {
                ErrorKind::NetworkTransport
            }
            Self::Rejected { .. } => ErrorKind::RemoteRejected,
        }
    }
}
