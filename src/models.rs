use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// A GraphQL connection: `{ nodes: [...], pageInfo: {...} }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_info: Option<PageInfo>,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Connection {
            nodes: Vec::new(),
            page_info: None,
        }
    }
}

impl<T> Connection<T> {
    pub fn has_next_page(&self) -> bool {
        self.page_info.as_ref().is_some_and(|p| p.has_next_page)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl User {
    /// Preferred label: display name, then name, then email.
    pub fn label(&self) -> Option<&str> {
        [
            self.display_name.as_str(),
            self.name.as_str(),
            self.email.as_deref().unwrap_or(""),
        ]
        .into_iter()
        .map(str::trim)
        .find(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub url_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub key: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub state_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub identifier: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<WorkflowState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegate: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Connection<Label>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Connection<Comment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Issue {
    pub fn comment_nodes(&self) -> &[Comment] {
        self.comments.as_ref().map_or(&[], |c| c.nodes.as_slice())
    }

    pub fn label_names(&self) -> Vec<&str> {
        self.labels
            .as_ref()
            .map(|c| c.nodes.iter().map(|l| l.name.as_str()).collect())
            .unwrap_or_default()
    }
}

/// Only the id of the parent is ever requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRef {
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<CommentRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolving_user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_session: Option<AgentSession>,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent.as_ref().is_some_and(|p| !p.id.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSession {
    pub id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activities: Option<Connection<AgentActivity>>,
}

impl AgentSession {
    pub fn activity_nodes(&self) -> &[AgentActivity] {
        self.activities.as_ref().map_or(&[], |c| c.nodes.as_slice())
    }

    pub fn has_more_activities(&self) -> bool {
        self.activities.as_ref().is_some_and(Connection::has_next_page)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentActivity {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ephemeral: Option<bool>,
    #[serde(default)]
    pub content: ActivityContent,
}

/// Activity payload, discriminated by its `type` key.
///
/// Only payloads whose keys match a known shape exactly become a typed
/// variant; everything else is kept as `Unknown` so that re-encoding
/// reproduces the server's map.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivityContent {
    Thought { body: String },
    Response { body: String },
    Elicitation { body: String },
    Error { body: String },
    Action {
        action: String,
        parameter: Option<String>,
        result: Option<String>,
    },
    Unknown(Map<String, Value>),
}

impl Default for ActivityContent {
    fn default() -> Self {
        ActivityContent::Unknown(Map::new())
    }
}

fn str_field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

fn keys_within(map: &Map<String, Value>, allowed: &[&str]) -> bool {
    map.keys().all(|k| allowed.contains(&k.as_str()))
}

/// Optional string field: absent is fine, present must be a string.
fn optional_str(map: &Map<String, Value>, key: &str) -> Result<Option<String>, ()> {
    match map.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(()),
    }
}

impl ActivityContent {
    pub fn from_map(map: Map<String, Value>) -> Self {
        let body_shape = |map: &Map<String, Value>| {
            if keys_within(map, &["type", "body"]) {
                str_field(map, "body").map(str::to_owned)
            } else {
                None
            }
        };

        let typed = match str_field(&map, "type") {
            Some("thought") => body_shape(&map).map(|body| ActivityContent::Thought { body }),
            Some("response") => body_shape(&map).map(|body| ActivityContent::Response { body }),
            Some("elicitation") => {
                body_shape(&map).map(|body| ActivityContent::Elicitation { body })
            }
            Some("error") => body_shape(&map).map(|body| ActivityContent::Error { body }),
            Some("action") if keys_within(&map, &["type", "action", "parameter", "result"]) => {
                match (
                    str_field(&map, "action"),
                    optional_str(&map, "parameter"),
                    optional_str(&map, "result"),
                ) {
                    (Some(action), Ok(parameter), Ok(result)) => Some(ActivityContent::Action {
                        action: action.to_owned(),
                        parameter,
                        result,
                    }),
                    _ => None,
                }
            }
            _ => None,
        };

        typed.unwrap_or(ActivityContent::Unknown(map))
    }

    pub fn to_map(&self) -> Map<String, Value> {
        let with_body = |kind: &str, body: &str| {
            let mut map = Map::new();
            map.insert("type".into(), Value::from(kind));
            map.insert("body".into(), Value::from(body));
            map
        };

        match self {
            ActivityContent::Thought { body } => with_body("thought", body),
            ActivityContent::Response { body } => with_body("response", body),
            ActivityContent::Elicitation { body } => with_body("elicitation", body),
            ActivityContent::Error { body } => with_body("error", body),
            ActivityContent::Action {
                action,
                parameter,
                result,
            } => {
                let mut map = Map::new();
                map.insert("type".into(), Value::from("action"));
                map.insert("action".into(), Value::from(action.as_str()));
                if let Some(p) = parameter {
                    map.insert("parameter".into(), Value::from(p.as_str()));
                }
                if let Some(r) = result {
                    map.insert("result".into(), Value::from(r.as_str()));
                }
                map
            }
            ActivityContent::Unknown(raw) => raw.clone(),
        }
    }

    /// The `type` tag, or `unknown` when missing or not a string.
    pub fn kind(&self) -> &str {
        match self {
            ActivityContent::Thought { .. } => "thought",
            ActivityContent::Response { .. } => "response",
            ActivityContent::Elicitation { .. } => "elicitation",
            ActivityContent::Error { .. } => "error",
            ActivityContent::Action { .. } => "action",
            ActivityContent::Unknown(raw) => str_field(raw, "type").unwrap_or("unknown"),
        }
    }

    /// Display body: `body`, else `"{action}: {parameter}"`, else empty.
    pub fn body(&self) -> String {
        match self {
            ActivityContent::Thought { body }
            | ActivityContent::Response { body }
            | ActivityContent::Elicitation { body }
            | ActivityContent::Error { body } => body.clone(),
            ActivityContent::Action {
                action, parameter, ..
            } => format!("{}: {}", action, parameter.as_deref().unwrap_or("")),
            ActivityContent::Unknown(raw) => {
                if let Some(body) = str_field(raw, "body") {
                    body.to_string()
                } else if let Some(action) = str_field(raw, "action") {
                    format!("{}: {}", action, str_field(raw, "parameter").unwrap_or(""))
                } else {
                    String::new()
                }
            }
        }
    }
}

impl Serialize for ActivityContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ActivityContent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Object(map) => Ok(ActivityContent::from_map(map)),
            Value::Null => Ok(ActivityContent::default()),
            other => Err(D::Error::custom(format!(
                "activity content must be an object, got {}",
                other
            ))),
        }
    }
}
