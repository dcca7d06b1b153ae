// SPDX-License-Identifier: MIT

//! HTTP transport - POSTs GraphQL operations to a single endpoint

use super::error::{ClientError, Result};
use super::{redacted, GraphQlRequest, GraphQlResponse, Transport};
use crate::config::ClientConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

/// reqwest-backed GraphQL transport
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Create a new HttpTransport from client configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: GraphQlRequest) -> Result<Value> {
        let body = request.body();
        log::debug!(
            "GraphQL request to {}: {}",
            self.endpoint,
            redacted(&body)
        );

        let mut req = self
            .client
            .post(self.endpoint.clone())
            .header("Accept", "application/json")
            .json(&body);

        if let Some(token) = &request.bearer {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;

        // GraphQL servers commonly answer 4xx with a regular error envelope
        let status = resp.status();
        let text = resp.text().await?;
        let envelope = serde_json::from_str::<GraphQlResponse>(&text);

        if !status.is_success() {
            if let Ok(envelope) = envelope {
                if !envelope.errors.is_empty() {
                    return envelope.into_data(request.operation);
                }
            }
            return Err(ClientError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        let envelope = envelope.map_err(|e| {
            ClientError::MalformedResponse(format!("{}: {}", request.operation.name(), e))
        })?;
        if log::log_enabled!(log::Level::Debug) {
            let logged = serde_json::to_value(&envelope)
                .map(|v| redacted(&v))
                .unwrap_or_default();
            log::debug!("GraphQL response for {}: {}", request.operation.name(), logged);
        }

        envelope.into_data(request.operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keeps_endpoint() {
        let config = ClientConfig::new("http://localhost:3000/graphql").unwrap();
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.endpoint().path(), "/graphql");
    }
}
