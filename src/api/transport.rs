//! GraphQL transport over blocking HTTP

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::error::{ApiError, ApiResult};

pub const DEFAULT_ENDPOINT: &str = "https://api.linear.app/graphql";

#[derive(Debug, Clone)]
pub struct GraphqlRequest {
    /// Operation name, used for logging and error messages
    pub operation: &'static str,
    pub query: &'static str,
    pub variables: Value,
}

impl GraphqlRequest {
    pub fn new(operation: &'static str, query: &'static str, variables: Value) -> Self {
        Self {
            operation,
            query,
            variables,
        }
    }
}

/// Executes a GraphQL request and hands back the `data` payload.
pub trait GraphqlTransport {
    fn execute(&self, request: GraphqlRequest) -> ApiResult<Value>;
}

#[derive(Deserialize)]
struct ResponseEnvelope {
    data: Option<Value>,
    errors: Option<Vec<ResponseError>>,
}

#[derive(Deserialize)]
struct ResponseError {
    message: String,
}

pub struct HttpTransport {
    endpoint: String,
    auth_header: String,
    client: reqwest::blocking::Client,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint)
            .field("auth_header", &"<redacted>")
            .finish()
    }
}

impl HttpTransport {
    pub fn new(endpoint: &str, auth_header: &str, timeout: Duration) -> ApiResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("linctl/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            auth_header: auth_header.to_string(),
            client,
        })
    }
}

impl GraphqlTransport for HttpTransport {
    fn execute(&self, request: GraphqlRequest) -> ApiResult<Value> {
        debug!(operation = request.operation, "sending GraphQL request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", &self.auth_header)
            .json(&json!({
                "query": request.query,
                "variables": request.variables,
            }))
            .send()?;

        let status = response.status();
        let body = response.text()?;
        debug!(operation = request.operation, status = status.as_u16(), "received response");

        // GraphQL errors usually come back as 400 with an `errors` array;
        // prefer those messages over the bare status.
        let envelope = serde_json::from_str::<ResponseEnvelope>(&body);
        if let Ok(ResponseEnvelope {
            errors: Some(errors),
            ..
        }) = &envelope
        {
            if !errors.is_empty() {
                let messages: Vec<String> = errors.iter().map(|e| e.message.clone()).collect();
                warn!(operation = request.operation, errors = ?messages, "GraphQL errors");
                return Err(ApiError::Graphql(messages));
            }
        }

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: truncate_for_error(&body),
            });
        }

        envelope?
            .data
            .ok_or(ApiError::MissingData(request.operation))
    }
}

fn truncate_for_error(body: &str) -> String {
    const MAX_LEN: usize = 200;
    if body.chars().count() <= MAX_LEN {
        body.to_owned()
    } else {
        format!("{}...", body.chars().take(MAX_LEN).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_error_short() {
        assert_eq!(truncate_for_error("bad gateway"), "bad gateway");
    }

    #[test]
    fn test_truncate_for_error_long() {
        let body = "é".repeat(250);
        let out = truncate_for_error(&body);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 203);
    }

    #[test]
    fn test_debug_redacts_auth() {
        let transport =
            HttpTransport::new(DEFAULT_ENDPOINT, "lin_api_secret", Duration::from_secs(5)).unwrap();
        let debug = format!("{:?}", transport);
        assert!(!debug.contains("lin_api_secret"));
        assert!(debug.contains("<redacted>"));
    }
}
