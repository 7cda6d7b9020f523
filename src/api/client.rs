use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use super::error::{ApiError, ApiResult};
use super::queries;
use super::transport::{GraphqlRequest, GraphqlTransport, HttpTransport};
use crate::models::{Comment, Issue, Label, Organization, Team, User, WorkflowState};

/// Fields accepted by `issueCreate` and `issueUpdate`.
///
/// `Some(None)` on the nullable ids serializes as an explicit `null`,
/// which clears the field on update.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegate_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_ids: Option<Vec<String>>,
}

impl IssueInput {
    pub fn is_empty(&self) -> bool {
        self.team_id.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.state_id.is_none()
            && self.assignee_id.is_none()
            && self.delegate_id.is_none()
            && self.project_id.is_none()
            && self.label_ids.is_none()
    }
}

/// Sort orders understood by `comments(orderBy:)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentOrder {
    Default,
    CreatedAt,
    UpdatedAt,
}

impl CommentOrder {
    fn as_variable(self) -> Value {
        match self {
            CommentOrder::Default => Value::Null,
            CommentOrder::CreatedAt => Value::from("createdAt"),
            CommentOrder::UpdatedAt => Value::from("updatedAt"),
        }
    }
}

/// Typed Linear API on top of a [`GraphqlTransport`].
pub struct Client<T = HttpTransport> {
    transport: T,
}

impl Client<HttpTransport> {
    pub fn connect(endpoint: &str, auth_header: &str, timeout: Duration) -> ApiResult<Self> {
        Ok(Client::new(HttpTransport::new(endpoint, auth_header, timeout)?))
    }
}

impl<T: GraphqlTransport> Client<T> {
    pub fn new(transport: T) -> Self {
        Client { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run a request and decode the value found at `pointer` in `data`.
    fn fetch<R: DeserializeOwned>(
        &self,
        operation: &'static str,
        query: &'static str,
        variables: Value,
        pointer: &str,
    ) -> ApiResult<R> {
        let data = self
            .transport
            .execute(GraphqlRequest::new(operation, query, variables))?;
        let node = data
            .pointer(pointer)
            .filter(|v| !v.is_null())
            .cloned()
            .ok_or(ApiError::MissingData(operation))?;
        Ok(serde_json::from_value(node)?)
    }

    /// Run a mutation whose payload has a `success` flag and an optional entity.
    fn mutate(
        &self,
        operation: &'static str,
        query: &'static str,
        variables: Value,
        payload: &str,
    ) -> ApiResult<Value> {
        let data = self
            .transport
            .execute(GraphqlRequest::new(operation, query, variables))?;
        let payload = data
            .get(payload)
            .cloned()
            .ok_or(ApiError::MissingData(operation))?;
        if payload.get("success").and_then(Value::as_bool) != Some(true) {
            return Err(ApiError::Unsuccessful(operation));
        }
        Ok(payload)
    }

    fn mutate_entity<R: DeserializeOwned>(
        &self,
        operation: &'static str,
        query: &'static str,
        variables: Value,
        payload: &str,
        entity: &str,
    ) -> ApiResult<R> {
        let mut payload = self.mutate(operation, query, variables, payload)?;
        match payload.get_mut(entity).map(Value::take) {
            Some(node) if !node.is_null() => Ok(serde_json::from_value(node)?),
            _ => Err(ApiError::MissingData(operation)),
        }
    }

    pub fn viewer(&self) -> ApiResult<User> {
        self.fetch("viewer", queries::VIEWER, json!({}), "/viewer")
    }

    pub fn organization(&self) -> ApiResult<Organization> {
        self.fetch("organization", queries::ORGANIZATION, json!({}), "/organization")
    }

    /// Issue with its delegate and comments, each comment carrying any
    /// embedded agent session and its first page of activities.
    pub fn get_issue_agent_session(&self, identifier: &str) -> ApiResult<Issue> {
        debug!(issue = identifier, "fetching agent session");
        self.fetch(
            "issueAgentSession",
            queries::ISSUE_AGENT_SESSION,
            json!({ "id": identifier }),
            "/issue",
        )
    }

    /// Post `@agent message` on the issue and return the new comment's id.
    pub fn mention_agent(
        &self,
        issue_id: &str,
        agent_display_name: &str,
        message: &str,
    ) -> ApiResult<String> {
        let body = format!("@{} {}", agent_display_name, message);
        let comment = self.create_comment(issue_id, &body, None)?;
        Ok(comment.id)
    }

    pub fn get_issue_comments(
        &self,
        identifier: &str,
        first: u32,
        order: CommentOrder,
    ) -> ApiResult<Vec<Comment>> {
        let nodes: Value = self.fetch(
            "issueComments",
            queries::ISSUE_COMMENTS,
            json!({ "id": identifier, "first": first, "orderBy": order.as_variable() }),
            "/issue/comments/nodes",
        )?;
        Ok(serde_json::from_value(nodes)?)
    }

    pub fn create_comment(
        &self,
        issue_id: &str,
        body: &str,
        parent_id: Option<&str>,
    ) -> ApiResult<Comment> {
        let mut input = json!({ "issueId": issue_id, "body": body });
        if let Some(parent) = parent_id.filter(|p| !p.is_empty()) {
            input["parentId"] = Value::from(parent);
        }
        self.mutate_entity(
            "commentCreate",
            queries::CREATE_COMMENT,
            json!({ "input": input }),
            "commentCreate",
            "comment",
        )
    }

    pub fn delete_comment(&self, id: &str) -> ApiResult<()> {
        self.mutate(
            "commentDelete",
            queries::DELETE_COMMENT,
            json!({ "id": id }),
            "commentDelete",
        )?;
        Ok(())
    }

    pub fn resolve_comment(&self, id: &str) -> ApiResult<Comment> {
        self.mutate_entity(
            "commentResolve",
            queries::RESOLVE_COMMENT,
            json!({ "id": id }),
            "commentResolve",
            "comment",
        )
    }

    pub fn unresolve_comment(&self, id: &str) -> ApiResult<Comment> {
        self.mutate_entity(
            "commentUnresolve",
            queries::UNRESOLVE_COMMENT,
            json!({ "id": id }),
            "commentUnresolve",
            "comment",
        )
    }

    pub fn list_issues(&self, filter: Value, first: u32) -> ApiResult<Vec<Issue>> {
        let nodes: Value = self.fetch(
            "issues",
            queries::LIST_ISSUES,
            json!({ "first": first, "filter": filter }),
            "/issues/nodes",
        )?;
        Ok(serde_json::from_value(nodes)?)
    }

    pub fn get_issue(&self, identifier: &str) -> ApiResult<Issue> {
        self.fetch("issue", queries::GET_ISSUE, json!({ "id": identifier }), "/issue")
    }

    pub fn create_issue(&self, input: &IssueInput) -> ApiResult<Issue> {
        self.mutate_entity(
            "issueCreate",
            queries::CREATE_ISSUE,
            json!({ "input": input }),
            "issueCreate",
            "issue",
        )
    }

    pub fn update_issue(&self, id: &str, input: &IssueInput) -> ApiResult<Issue> {
        self.mutate_entity(
            "issueUpdate",
            queries::UPDATE_ISSUE,
            json!({ "id": id, "input": input }),
            "issueUpdate",
            "issue",
        )
    }

    pub fn team_by_key(&self, key: &str) -> ApiResult<Team> {
        let teams: Vec<Team> = self.fetch(
            "teams",
            queries::TEAM_BY_KEY,
            json!({ "key": key.to_uppercase() }),
            "/teams/nodes",
        )?;
        teams
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("Team '{}'", key)))
    }

    pub fn workflow_state(&self, team_id: &str, name: &str) -> ApiResult<WorkflowState> {
        let states: Vec<WorkflowState> = self.fetch(
            "workflowStates",
            queries::WORKFLOW_STATE,
            json!({ "teamId": team_id, "name": name }),
            "/workflowStates/nodes",
        )?;
        states
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("State '{}'", name)))
    }

    /// Look a user up by email, name or display name.
    pub fn find_user(&self, query: &str) -> ApiResult<Option<User>> {
        let users: Vec<User> = self.fetch(
            "users",
            queries::FIND_USER,
            json!({ "query": query }),
            "/users/nodes",
        )?;
        Ok(users.into_iter().next())
    }

    pub fn team_labels(&self, team_id: &str) -> ApiResult<Vec<Label>> {
        self.fetch(
            "issueLabels",
            queries::TEAM_LABELS,
            json!({ "teamId": team_id }),
            "/issueLabels/nodes",
        )
    }
}
