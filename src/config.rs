// SPDX-License-Identifier: MIT

//! Client configuration loaded from the environment

use crate::gql::error::{ClientError, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/graphql";
pub const DEFAULT_STATE_FILE: &str = ".flowsync/session.json";

/// Settings shared by the transport and the durable session storage
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// GraphQL endpoint every operation is POSTed to
    pub endpoint: Url,
    /// File backing the durable session storage
    pub state_file: PathBuf,
    /// Per-request timeout; `None` leaves it to reqwest
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Build a config for the given endpoint with default storage and no timeout
    pub fn new(endpoint: &str) -> Result<Self> {
        Ok(Self {
            endpoint: parse_endpoint(endpoint)?,
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
            timeout: None,
        })
    }

    /// Load configuration from environment variables
    ///
    /// - `GRAPHQL_ENDPOINT` (default `http://localhost:3000/graphql`)
    /// - `FLOWSYNC_STATE_FILE` (default `.flowsync/session.json`)
    /// - `FLOWSYNC_TIMEOUT_SECS` (optional)
    pub fn from_env() -> Result<Self> {
        let endpoint =
            env::var("GRAPHQL_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let state_file = env::var("FLOWSYNC_STATE_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATE_FILE));
        let timeout = env::var("FLOWSYNC_TIMEOUT_SECS")
            .ok()
            .map(|raw| parse_timeout(&raw))
            .transpose()?;

        Ok(Self {
            endpoint: parse_endpoint(&endpoint)?,
            state_file,
            timeout,
        })
    }
}

fn parse_endpoint(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| ClientError::config(format!("invalid endpoint '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ClientError::config(format!(
            "endpoint must be http(s), got '{}'",
            other
        ))),
    }
}

fn parse_timeout(raw: &str) -> Result<Duration> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ClientError::config(format!("FLOWSYNC_TIMEOUT_SECS is not a number: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = ClientConfig::new("https://api.example.com/graphql").unwrap();
        assert_eq!(config.endpoint.as_str(), "https://api.example.com/graphql");
        assert_eq!(config.state_file, PathBuf::from(DEFAULT_STATE_FILE));
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_rejects_non_http_endpoint() {
        let err = ClientConfig::new("ws://localhost:3000/graphql").unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn test_rejects_garbage_endpoint() {
        assert!(ClientConfig::new("not a url").is_err());
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout(" 30 ").unwrap(), Duration::from_secs(30));
        assert!(parse_timeout("soon").is_err());
    }
}
