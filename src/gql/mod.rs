// SPDX-License-Identifier: MIT

//! GraphQL transport layer
//!
//! This module provides the request/response envelope and the `Transport`
//! trait the stores talk through. Implementations live in submodules:
//! - [http] - reqwest-backed transport for a real endpoint
//! - [operations] - the documents for every remote operation

pub mod error;
pub mod http;
pub mod operations;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use self::error::{ClientError, Result};
pub use operations::Operation;

/// A single GraphQL operation ready to send
#[derive(Debug, Clone)]
pub struct GraphQlRequest {
    pub operation: Operation,
    pub query: String,
    pub variables: Value,
    /// Bearer token sent as an `Authorization` header, never in the body
    pub bearer: Option<String>,
}

impl GraphQlRequest {
    /// Attach a bearer token when one is available
    pub fn with_bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }

    /// JSON body POSTed to the endpoint
    pub fn body(&self) -> Value {
        json!({
            "operationName": self.operation.name(),
            "query": self.query,
            "variables": self.variables,
        })
    }
}

const REDACTED_KEYS: [&str; 2] = ["password", "token"];

/// Copy of a JSON value with credential fields masked, for logging
pub fn redacted(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    if REDACTED_KEYS.contains(&k.as_str()) {
                        (k.clone(), json!("<redacted>"))
                    } else {
                        (k.clone(), redacted(v))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redacted).collect()),
        other => other.clone(),
    }
}

/// One entry of the GraphQL `errors` array
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlErrorEntry {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Value>>,
}

/// Standard GraphQL response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<GraphQlErrorEntry>,
}

impl GraphQlResponse {
    /// Unwrap the `data` object, turning reported errors into `ClientError::GraphQl`
    pub fn into_data(self, operation: Operation) -> Result<Value> {
        if !self.errors.is_empty() {
            return Err(ClientError::GraphQl {
                operation: operation.name().to_string(),
                messages: self.errors.into_iter().map(|e| e.message).collect(),
            });
        }
        match self.data {
            Some(Value::Null) | None => Err(ClientError::MalformedResponse(format!(
                "{} returned neither data nor errors",
                operation.name()
            ))),
            Some(data) => Ok(data),
        }
    }
}

/// Anything able to run a GraphQL operation and hand back its `data` object
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: GraphQlRequest) -> Result<Value>;
}

/// Decode `data[field]` for the operation; `null` or absent yields `None`
pub fn extract<T: DeserializeOwned>(data: &Value, operation: Operation) -> Result<Option<T>> {
    match data.get(operation.field()) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| ClientError::decode(operation.field(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_has_no_bearer() {
        let req = Operation::Workflows
            .request(json!({}))
            .with_bearer(Some("secret".to_string()));
        let body = req.body();
        assert_eq!(body["operationName"], "GetWorkflows");
        assert!(body["query"].as_str().unwrap().contains("workflows"));
        assert!(!body.to_string().contains("secret"));
    }

    #[test]
    fn test_redacted_masks_credentials() {
        let req = Operation::Login.request(json!({
            "loginInput": {"email": "a@x.com", "password": "hunter2"}
        }));
        let logged = redacted(&req.body()).to_string();
        assert!(!logged.contains("hunter2"));
        assert!(logged.contains("a@x.com"));

        let resp = json!({"data": {"register": {"token": "t-secret", "user": {"id": "u1"}}}});
        let logged = redacted(&resp);
        assert_eq!(logged["data"]["register"]["token"], "<redacted>");
        assert_eq!(logged["data"]["register"]["user"]["id"], "u1");
    }

    #[test]
    fn test_redacted_walks_arrays() {
        let value = json!([{"password": "p"}, "plain"]);
        assert_eq!(redacted(&value), json!([{"password": "<redacted>"}, "plain"]));
    }

    #[test]
    fn test_into_data_reports_errors_even_with_data() {
        let resp: GraphQlResponse = serde_json::from_value(json!({
            "data": {"workflow": null},
            "errors": [{"message": "Workflow not found", "path": ["workflow"]}]
        }))
        .unwrap();

        match resp.into_data(Operation::Workflow) {
            Err(ClientError::GraphQl {
                operation,
                messages,
            }) => {
                assert_eq!(operation, "GetWorkflow");
                assert_eq!(messages, vec!["Workflow not found"]);
            }
            other => panic!("Expected GraphQl error, got {:?}", other),
        }
    }

    #[test]
    fn test_into_data_without_data_is_malformed() {
        let resp: GraphQlResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(
            resp.into_data(Operation::Workflows),
            Err(ClientError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_extract_null_and_absent() {
        let data = json!({"createWorkflow": null});
        let created: Option<Value> = extract(&data, Operation::CreateWorkflow).unwrap();
        assert!(created.is_none());

        let missing: Option<Value> = extract(&data, Operation::UpdateWorkflow).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_extract_decode_failure() {
        let data = json!({"executeWorkflow": {"not": "a string"}});
        let result: Result<Option<String>> = extract(&data, Operation::ExecuteWorkflow);
        assert!(matches!(result, Err(ClientError::Decode { .. })));
    }
}
