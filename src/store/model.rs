// SPDX-License-Identifier: MIT

//! Wire types shared by the session and workflow stores
//!
//! Field names follow the API's camelCase convention. Status fields are
//! closed enums: an unknown status string fails to deserialize.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::Path;

/// Authenticated user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial user profile; `None` fields are left unchanged by `User::apply`
///
/// `id` and `createdAt` are assigned by the server and have no patch field.
/// Serialized patches carrying them still decode; the keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Shallow merge of the patch into this profile
    pub fn apply(&mut self, patch: UserPatch) {
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(avatar) = patch.avatar {
            self.avatar = Some(avatar);
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        if let Some(updated_at) = patch.updated_at {
            self.updated_at = updated_at;
        }
    }
}

/// Token and identity returned by login/register
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl fmt::Debug for LoginInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginInput")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for RegisterInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterInput")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

/// Workflow lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Draft,
    Active,
    Inactive,
    Archived,
}

/// Execution lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Success,
    Failed,
    Cancelled,
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkflowStatus::Draft => "draft",
            WorkflowStatus::Active => "active",
            WorkflowStatus::Inactive => "inactive",
            WorkflowStatus::Archived => "archived",
        };
        f.write_str(s)
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutionStatus::Pending => "pending",
            ExecutionStatus::Running => "running",
            ExecutionStatus::Success => "success",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Canvas position of a node
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NodePosition {
    pub x: f64,
    pub y: f64,
}

/// A module instance placed in a workflow graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub module_id: String,
    #[serde(default)]
    pub position: NodePosition,
    #[serde(default)]
    pub configuration: Map<String, Value>,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
}

/// Edge from one node's output to another node's input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowConnection {
    pub id: String,
    pub source_node_id: String,
    pub source_output: String,
    pub target_node_id: String,
    pub target_input: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Owner
    pub user_id: String,
    pub status: WorkflowStatus,
    #[serde(default)]
    pub nodes: Vec<WorkflowNode>,
    #[serde(default)]
    pub connections: Vec<WorkflowConnection>,
    #[serde(default)]
    pub settings: Map<String, Value>,
    #[serde(default)]
    pub variables: Map<String, Value>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub execution_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_executed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields sent to create or update a workflow; unset fields are omitted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkflowStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<WorkflowNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<Vec<WorkflowConnection>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl WorkflowInput {
    /// Load a workflow definition from a YAML or JSON file
    pub fn load<P: AsRef<Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a workflow definition; YAML is a superset of JSON so both are accepted
    pub fn parse(content: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let input: WorkflowInput = serde_yaml::from_str(content)?;
        Ok(input)
    }
}

/// One run of a workflow, as recorded by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowExecution {
    pub id: String,
    pub workflow_id: String,
    pub user_id: String,
    pub status: ExecutionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_log: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user_json() -> Value {
        json!({
            "id": "u1",
            "email": "a@x.com",
            "name": "Ada",
            "role": "user",
            "isActive": true,
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-02T00:00:00Z"
        })
    }

    #[test]
    fn test_user_deserializes_camel_case() {
        let user: User = serde_json::from_value(user_json()).unwrap();
        assert_eq!(user.id, "u1");
        assert!(user.is_active);
        assert!(user.avatar.is_none());
    }

    #[test]
    fn test_user_apply_is_shallow_merge() {
        let mut user: User = serde_json::from_value(user_json()).unwrap();
        user.apply(UserPatch {
            name: Some("Ada L.".to_string()),
            avatar: Some("https://cdn/ada.png".to_string()),
            ..Default::default()
        });

        assert_eq!(user.name, "Ada L.");
        assert_eq!(user.avatar.as_deref(), Some("https://cdn/ada.png"));
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.role, "user");
    }

    #[test]
    fn test_user_patch_cannot_change_identity() {
        let mut user: User = serde_json::from_value(user_json()).unwrap();
        let created_at = user.created_at;
        let patch: UserPatch = serde_json::from_value(json!({
            "id": "u2",
            "createdAt": "2030-01-01T00:00:00Z",
            "name": "Grace"
        }))
        .unwrap();
        user.apply(patch);

        assert_eq!(user.id, "u1");
        assert_eq!(user.created_at, created_at);
        assert_eq!(user.name, "Grace");
    }

    #[test]
    fn test_workflow_rejects_unknown_status() {
        let result = serde_json::from_value::<Workflow>(json!({
            "id": "wf1",
            "name": "Sync",
            "userId": "u1",
            "status": "paused",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_workflow_with_graph() {
        let wf: Workflow = serde_json::from_value(json!({
            "id": "wf1",
            "name": "Sync",
            "userId": "u1",
            "status": "active",
            "nodes": [{
                "id": "n1",
                "type": "trigger",
                "moduleId": "http-webhook",
                "position": {"x": 10.0, "y": 20.5},
                "configuration": {"path": "/hook"},
                "inputs": [],
                "outputs": ["body"]
            }],
            "connections": [{
                "id": "c1",
                "sourceNodeId": "n1",
                "sourceOutput": "body",
                "targetNodeId": "n2",
                "targetInput": "payload"
            }],
            "isPublic": true,
            "executionCount": 3,
            "tags": ["ops"],
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(wf.status, WorkflowStatus::Active);
        assert_eq!(wf.nodes[0].node_type, "trigger");
        assert_eq!(wf.nodes[0].position.y, 20.5);
        assert_eq!(wf.connections[0].target_input, "payload");
        assert!(wf.settings.is_empty());
    }

    #[test]
    fn test_execution_status_closed() {
        assert_eq!(
            serde_json::from_value::<ExecutionStatus>(json!("cancelled")).unwrap(),
            ExecutionStatus::Cancelled
        );
        assert!(serde_json::from_value::<ExecutionStatus>(json!("done")).is_err());
    }

    #[test]
    fn test_workflow_input_omits_unset_fields() {
        let input = WorkflowInput {
            name: Some("Nightly".to_string()),
            is_public: Some(false),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({"name": "Nightly", "isPublic": false})
        );
    }

    #[test]
    fn test_workflow_input_parse_yaml() {
        let yaml = r#"
name: Nightly report
status: draft
tags: [reports, nightly]
variables:
  recipient: ops@example.com
"#;
        let input = WorkflowInput::parse(yaml).unwrap();
        assert_eq!(input.name.as_deref(), Some("Nightly report"));
        assert_eq!(input.status, Some(WorkflowStatus::Draft));
        assert_eq!(input.tags.unwrap(), vec!["reports", "nightly"]);
        assert_eq!(input.variables.unwrap()["recipient"], "ops@example.com");
    }

    #[test]
    fn test_workflow_input_parse_json() {
        let input = WorkflowInput::parse(r#"{"name": "From JSON", "isPublic": true}"#).unwrap();
        assert_eq!(input.name.as_deref(), Some("From JSON"));
        assert_eq!(input.is_public, Some(true));
    }

    #[test]
    fn test_login_input_debug_redacts_password() {
        let input = LoginInput {
            email: "a@x.com".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(!format!("{:?}", input).contains("hunter2"));
    }
}
