// SPDX-License-Identifier: MIT

//! Typed error handling for flowsync
//!
//! Remote failures, missing results and local storage failures each get
//! their own variant so callers can decide how to present them.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ClientError>;

/// Top-level error type for flowsync
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request errors (connection refused, timeout, TLS...)
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status from the GraphQL endpoint
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Errors reported by the GraphQL server in the `errors` array
    #[error("GraphQL error in {operation}: {}", .messages.join("; "))]
    GraphQl {
        operation: String,
        messages: Vec<String>,
    },

    /// Envelope carried neither `data` nor `errors`
    #[error("Malformed GraphQL response: {0}")]
    MalformedResponse(String),

    /// Server answered but omitted the field the operation expects
    #[error("Server returned no result for {operation}")]
    MissingResult { operation: String },

    /// Operation requires a signed-in identity
    #[error("User not authenticated")]
    NotAuthenticated,

    /// Payload could not be decoded into the expected type
    #[error("Failed to decode {operation} result: {source}")]
    Decode {
        operation: String,
        #[source]
        source: serde_json::Error,
    },

    /// Durable storage errors surfaced to the caller
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Configuration errors (invalid env vars, bad endpoint URL)
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Durable storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Stored value exists but cannot be interpreted
    #[error("Corrupt value stored under '{key}'")]
    Corrupt { key: String },
}

impl ClientError {
    /// Create a missing result error
    pub fn missing_result(operation: impl Into<String>) -> Self {
        Self::MissingResult {
            operation: operation.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a decode error for the given operation
    pub fn decode(operation: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            operation: operation.into(),
            source,
        }
    }
}
