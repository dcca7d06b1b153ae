// SPDX-License-Identifier: MIT

//! GraphQL documents for every remote operation the stores consume

use super::GraphQlRequest;
use once_cell::sync::Lazy;
use serde_json::Value;

const USER_FIELDS: &str = "id email name avatar role isActive createdAt updatedAt";

const WORKFLOW_FIELDS: &str = "id name description userId status nodes connections settings \
variables isPublic executionCount lastExecutedAt tags createdAt updatedAt";

const EXECUTION_FIELDS: &str = "id workflowId userId status triggerType inputData outputData \
executionLog startedAt completedAt errorMessage metadata createdAt updatedAt";

static LOGIN: Lazy<String> = Lazy::new(|| {
    format!(
        "mutation Login($loginInput: LoginInput!) {{ login(loginInput: $loginInput) {{ token user {{ {} }} }} }}",
        USER_FIELDS
    )
});

static REGISTER: Lazy<String> = Lazy::new(|| {
    format!(
        "mutation Register($registerInput: RegisterInput!) {{ register(registerInput: $registerInput) {{ token user {{ {} }} }} }}",
        USER_FIELDS
    )
});

static WORKFLOWS: Lazy<String> =
    Lazy::new(|| format!("query GetWorkflows {{ workflows {{ {} }} }}", WORKFLOW_FIELDS));

static USER_WORKFLOWS: Lazy<String> = Lazy::new(|| {
    format!(
        "query GetUserWorkflows($userId: ID!) {{ userWorkflows(userId: $userId) {{ {} }} }}",
        WORKFLOW_FIELDS
    )
});

static WORKFLOW: Lazy<String> = Lazy::new(|| {
    format!(
        "query GetWorkflow($id: ID!) {{ workflow(id: $id) {{ {} }} }}",
        WORKFLOW_FIELDS
    )
});

static CREATE_WORKFLOW: Lazy<String> = Lazy::new(|| {
    format!(
        "mutation CreateWorkflow($createWorkflowInput: CreateWorkflowInput!) {{ createWorkflow(createWorkflowInput: $createWorkflowInput) {{ {} }} }}",
        WORKFLOW_FIELDS
    )
});

static UPDATE_WORKFLOW: Lazy<String> = Lazy::new(|| {
    format!(
        "mutation UpdateWorkflow($id: ID!, $updateWorkflowInput: UpdateWorkflowInput!) {{ updateWorkflow(id: $id, updateWorkflowInput: $updateWorkflowInput) {{ {} }} }}",
        WORKFLOW_FIELDS
    )
});

const DELETE_WORKFLOW: &str =
    "mutation DeleteWorkflow($id: ID!) { deleteWorkflow(id: $id) { id } }";

const EXECUTE_WORKFLOW: &str = "mutation ExecuteWorkflow($workflowId: ID!, $userId: ID!, $inputData: String) { executeWorkflow(workflowId: $workflowId, userId: $userId, inputData: $inputData) }";

static EXECUTIONS_BY_WORKFLOW: Lazy<String> = Lazy::new(|| {
    format!(
        "query GetWorkflowExecutions($workflowId: ID!) {{ executionsByWorkflow(workflowId: $workflowId) {{ {} }} }}",
        EXECUTION_FIELDS
    )
});

static USER_EXECUTIONS: Lazy<String> = Lazy::new(|| {
    format!(
        "query GetUserExecutions($userId: ID!) {{ userExecutions(userId: $userId) {{ {} }} }}",
        EXECUTION_FIELDS
    )
});

/// Remote operations exposed by the workflow API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Login,
    Register,
    Workflows,
    UserWorkflows,
    Workflow,
    CreateWorkflow,
    UpdateWorkflow,
    DeleteWorkflow,
    ExecuteWorkflow,
    ExecutionsByWorkflow,
    UserExecutions,
}

impl Operation {
    /// Operation name sent as `operationName`
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Login => "Login",
            Operation::Register => "Register",
            Operation::Workflows => "GetWorkflows",
            Operation::UserWorkflows => "GetUserWorkflows",
            Operation::Workflow => "GetWorkflow",
            Operation::CreateWorkflow => "CreateWorkflow",
            Operation::UpdateWorkflow => "UpdateWorkflow",
            Operation::DeleteWorkflow => "DeleteWorkflow",
            Operation::ExecuteWorkflow => "ExecuteWorkflow",
            Operation::ExecutionsByWorkflow => "GetWorkflowExecutions",
            Operation::UserExecutions => "GetUserExecutions",
        }
    }

    /// Key of the result inside the response `data` object
    pub fn field(&self) -> &'static str {
        match self {
            Operation::Login => "login",
            Operation::Register => "register",
            Operation::Workflows => "workflows",
            Operation::UserWorkflows => "userWorkflows",
            Operation::Workflow => "workflow",
            Operation::CreateWorkflow => "createWorkflow",
            Operation::UpdateWorkflow => "updateWorkflow",
            Operation::DeleteWorkflow => "deleteWorkflow",
            Operation::ExecuteWorkflow => "executeWorkflow",
            Operation::ExecutionsByWorkflow => "executionsByWorkflow",
            Operation::UserExecutions => "userExecutions",
        }
    }

    pub fn document(&self) -> &'static str {
        match self {
            Operation::Login => LOGIN.as_str(),
            Operation::Register => REGISTER.as_str(),
            Operation::Workflows => WORKFLOWS.as_str(),
            Operation::UserWorkflows => USER_WORKFLOWS.as_str(),
            Operation::Workflow => WORKFLOW.as_str(),
            Operation::CreateWorkflow => CREATE_WORKFLOW.as_str(),
            Operation::UpdateWorkflow => UPDATE_WORKFLOW.as_str(),
            Operation::DeleteWorkflow => DELETE_WORKFLOW,
            Operation::ExecuteWorkflow => EXECUTE_WORKFLOW,
            Operation::ExecutionsByWorkflow => EXECUTIONS_BY_WORKFLOW.as_str(),
            Operation::UserExecutions => USER_EXECUTIONS.as_str(),
        }
    }

    /// Build a request for this operation with the given variables
    pub fn request(&self, variables: Value) -> GraphQlRequest {
        GraphQlRequest {
            operation: *self,
            query: self.document().to_string(),
            variables,
            bearer: None,
        }
    }
}
