// SPDX-License-Identifier: MIT

//! Workflow store - local mirror of server-side workflows and executions
//!
//! Every operation raises the busy flag, performs one remote call, and on
//! success reconciles the response into the cache. Overlapping calls are not
//! sequenced: whichever response lands last is what the cache holds.

use super::model::{Workflow, WorkflowExecution, WorkflowInput};
use super::session::SessionStore;
use super::{read, write, BusyFlag};
use crate::gql::error::{ClientError, Result};
use crate::gql::{extract, Operation, Transport};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::{Arc, RwLock};

pub struct WorkflowStore {
    transport: Arc<dyn Transport>,
    /// Read-only: consulted for the current user and bearer token
    session: Arc<SessionStore>,
    workflows: RwLock<Vec<Workflow>>,
    current: RwLock<Option<Workflow>>,
    executions: RwLock<Vec<WorkflowExecution>>,
    loading: BusyFlag,
}

impl WorkflowStore {
    pub fn new(transport: Arc<dyn Transport>, session: Arc<SessionStore>) -> Self {
        Self {
            transport,
            session,
            workflows: RwLock::new(Vec::new()),
            current: RwLock::new(None),
            executions: RwLock::new(Vec::new()),
            loading: BusyFlag::default(),
        }
    }

    pub fn workflows(&self) -> Vec<Workflow> {
        read(&self.workflows).clone()
    }

    pub fn current_workflow(&self) -> Option<Workflow> {
        read(&self.current).clone()
    }

    pub fn executions(&self) -> Vec<WorkflowExecution> {
        read(&self.executions).clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    /// Cached workflows owned by the signed-in user; empty when signed out
    pub fn owned_workflows(&self) -> Vec<Workflow> {
        let Some(user_id) = self.session.user_id() else {
            return Vec::new();
        };
        read(&self.workflows)
            .iter()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Cached workflows marked public
    pub fn public_workflows(&self) -> Vec<Workflow> {
        read(&self.workflows)
            .iter()
            .filter(|w| w.is_public)
            .cloned()
            .collect()
    }

    /// Run one operation and decode its result field, logging any failure
    async fn send<T: DeserializeOwned>(
        &self,
        operation: Operation,
        variables: Value,
    ) -> Result<Option<T>> {
        let request = operation.request(variables).with_bearer(self.session.token());

        let result = match self.transport.execute(request).await {
            Ok(data) => extract::<T>(&data, operation),
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            log::error!("{} failed: {}", operation.name(), e);
        }
        result
    }

    fn missing(operation: Operation) -> ClientError {
        log::error!("{} returned no result", operation.name());
        ClientError::missing_result(operation.field())
    }

    fn require_user(operation: Operation, user_id: Option<String>) -> Result<String> {
        user_id.ok_or_else(|| {
            log::error!("{} requires a signed-in user", operation.name());
            ClientError::NotAuthenticated
        })
    }

    /// Replace the cached collection with every workflow on the server
    pub async fn fetch_all(&self) -> Result<()> {
        let _busy = self.loading.enter();

        if let Some(list) = self
            .send::<Vec<Workflow>>(Operation::Workflows, json!({}))
            .await?
        {
            *write(&self.workflows) = list;
        }
        Ok(())
    }

    /// Replace the cached collection with the workflows owned by `user_id`
    pub async fn fetch_owned_by(&self, user_id: &str) -> Result<()> {
        let _busy = self.loading.enter();

        if let Some(list) = self
            .send::<Vec<Workflow>>(Operation::UserWorkflows, json!({ "userId": user_id }))
            .await?
        {
            *write(&self.workflows) = list;
        }
        Ok(())
    }

    /// Load one workflow as the current workflow; the collection is untouched
    pub async fn fetch_one(&self, id: &str) -> Result<()> {
        let _busy = self.loading.enter();

        if let Some(workflow) = self
            .send::<Workflow>(Operation::Workflow, json!({ "id": id }))
            .await?
        {
            *write(&self.current) = Some(workflow);
        }
        Ok(())
    }

    /// Create a workflow and append the server's copy to the cache
    pub async fn create(&self, input: WorkflowInput) -> Result<Workflow> {
        let _busy = self.loading.enter();

        let created = self
            .send::<Workflow>(
                Operation::CreateWorkflow,
                json!({ "createWorkflowInput": input }),
            )
            .await?
            .ok_or_else(|| Self::missing(Operation::CreateWorkflow))?;

        write(&self.workflows).push(created.clone());
        Ok(created)
    }

    /// Update a workflow and replace the cached entry wholesale
    ///
    /// When `id` is not cached the server's result is still returned but the
    /// collection is left alone.
    pub async fn update(&self, id: &str, input: WorkflowInput) -> Result<Workflow> {
        let _busy = self.loading.enter();

        let updated = self
            .send::<Workflow>(
                Operation::UpdateWorkflow,
                json!({ "id": id, "updateWorkflowInput": input }),
            )
            .await?
            .ok_or_else(|| Self::missing(Operation::UpdateWorkflow))?;

        {
            let mut workflows = write(&self.workflows);
            match workflows.iter_mut().find(|w| w.id == id) {
                Some(entry) => *entry = updated.clone(),
                None => log::warn!("Updated workflow {} is not in the local cache", id),
            }
        }

        let mut current = write(&self.current);
        if current.as_ref().is_some_and(|w| w.id == id) {
            *current = Some(updated.clone());
        }

        Ok(updated)
    }

    /// Delete a workflow and drop it from the cache
    ///
    /// Returns `false` when the server answered without acknowledging the
    /// deletion; the cache is left untouched in that case.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let _busy = self.loading.enter();

        let deleted = self
            .send::<Value>(Operation::DeleteWorkflow, json!({ "id": id }))
            .await?;
        if deleted.is_none() {
            log::warn!("Server did not acknowledge deletion of workflow {}", id);
            return Ok(false);
        }

        write(&self.workflows).retain(|w| w.id != id);

        let mut current = write(&self.current);
        if current.as_ref().is_some_and(|w| w.id == id) {
            *current = None;
        }
        Ok(true)
    }

    /// Start a run of a workflow and return the server-issued execution id
    ///
    /// Fails with `NotAuthenticated` before any remote call when signed out.
    /// The execution list is not touched; call `fetch_executions` to see it.
    pub async fn execute(&self, workflow_id: &str, input: Option<Value>) -> Result<String> {
        let user_id = Self::require_user(Operation::ExecuteWorkflow, self.session.user_id())?;
        let _busy = self.loading.enter();

        // inputData is a String argument: structured payloads go as JSON text
        let input_data = input.map(|value| match value {
            Value::String(s) => s,
            other => other.to_string(),
        });

        self.send::<String>(
            Operation::ExecuteWorkflow,
            json!({
                "workflowId": workflow_id,
                "userId": user_id,
                "inputData": input_data,
            }),
        )
        .await?
        .ok_or_else(|| Self::missing(Operation::ExecuteWorkflow))
    }

    /// Replace the cached executions with those of one workflow, or of the signed-in user
    pub async fn fetch_executions(&self, workflow_id: Option<&str>) -> Result<()> {
        let (operation, variables) = match workflow_id {
            Some(id) => (Operation::ExecutionsByWorkflow, json!({ "workflowId": id })),
            None => {
                let user_id =
                    Self::require_user(Operation::UserExecutions, self.session.user_id())?;
                (Operation::UserExecutions, json!({ "userId": user_id }))
            }
        };
        let _busy = self.loading.enter();

        if let Some(list) = self
            .send::<Vec<WorkflowExecution>>(operation, variables)
            .await?
        {
            *write(&self.executions) = list;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gql::GraphQlRequest;
    use crate::store::model::AuthPayload;
    use crate::store::navigation::LoggingNavigator;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingTransport {
        data: Value,
        requests: Mutex<Vec<GraphQlRequest>>,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn execute(&self, request: GraphQlRequest) -> Result<Value> {
            self.requests.lock().unwrap().push(request);
            Ok(self.data.clone())
        }
    }

    fn signed_in_store(data: Value) -> (WorkflowStore, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport {
            data,
            requests: Mutex::new(vec![]),
        });
        let session = Arc::new(SessionStore::new(
            transport.clone(),
            None,
            Arc::new(LoggingNavigator),
        ));
        let payload: AuthPayload = serde_json::from_value(json!({
            "token": "t1",
            "user": {
                "id": "u1",
                "email": "a@x.com",
                "name": "Ada",
                "role": "user",
                "isActive": true,
                "createdAt": "2024-01-01T00:00:00Z",
                "updatedAt": "2024-01-01T00:00:00Z"
            }
        }))
        .unwrap();
        session.commit_auth(payload);

        (WorkflowStore::new(transport.clone(), session), transport)
    }

    #[tokio::test]
    async fn test_requests_carry_session_token() {
        let (store, transport) = signed_in_store(json!({"workflows": []}));
        store.fetch_all().await.unwrap();

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[0].bearer.as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn test_execute_serializes_structured_input() {
        let (store, transport) = signed_in_store(json!({"executeWorkflow": "exec-1"}));

        let id = store
            .execute("wf1", Some(json!({"order": 42})))
            .await
            .unwrap();
        assert_eq!(id, "exec-1");

        let requests = transport.requests.lock().unwrap();
        let vars = &requests[0].variables;
        assert_eq!(vars["workflowId"], "wf1");
        assert_eq!(vars["userId"], "u1");
        assert_eq!(vars["inputData"], "{\"order\":42}");
    }

    #[tokio::test]
    async fn test_execute_passes_string_input_through() {
        let (store, transport) = signed_in_store(json!({"executeWorkflow": "exec-2"}));
        store
            .execute("wf1", Some(json!("raw text")))
            .await
            .unwrap();
        store.execute("wf1", None).await.unwrap();

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[0].variables["inputData"], "raw text");
        assert!(requests[1].variables["inputData"].is_null());
    }

    #[tokio::test]
    async fn test_execute_missing_result() {
        let (store, _) = signed_in_store(json!({"executeWorkflow": null}));
        let err = store.execute("wf1", None).await.unwrap_err();
        assert!(matches!(err, ClientError::MissingResult { .. }));
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_fetch_one_leaves_collection() {
        let (store, _) = signed_in_store(json!({
            "workflow": {
                "id": "wf9",
                "name": "Solo",
                "userId": "u1",
                "status": "draft",
                "createdAt": "2024-01-01T00:00:00Z",
                "updatedAt": "2024-01-01T00:00:00Z"
            }
        }));

        store.fetch_one("wf9").await.unwrap();
        assert_eq!(store.current_workflow().unwrap().id, "wf9");
        assert!(store.workflows().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_status_rejected() {
        let (store, _) = signed_in_store(json!({
            "workflows": [{
                "id": "wf1",
                "name": "Bad",
                "userId": "u1",
                "status": "paused",
                "createdAt": "2024-01-01T00:00:00Z",
                "updatedAt": "2024-01-01T00:00:00Z"
            }]
        }));

        let err = store.fetch_all().await.unwrap_err();
        assert!(matches!(err, ClientError::Decode { .. }));
        assert!(store.workflows().is_empty());
    }
}
