//! Error types for Linear API calls

use thiserror::Error;

/// Errors that can occur when talking to the Linear GraphQL API
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response (DNS, TLS, timeout, ...)
    #[error("request to Linear failed")]
    Http(#[from] reqwest::Error),

    /// Linear answered with a non-success HTTP status
    #[error("Linear API returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, truncated
        body: String,
    },

    /// The response carried a GraphQL `errors` array
    #[error("GraphQL errors: {}", .0.join("; "))]
    Graphql(Vec<String>),

    /// The `data` payload did not match the expected shape
    #[error("failed to decode Linear response")]
    Decode(#[from] serde_json::Error),

    /// The response had no `data` for the named operation
    #[error("Linear response for {0} did not include data")]
    MissingData(&'static str),

    /// A lookup (team, state, user, issue) matched nothing
    #[error("{0} not found")]
    NotFound(String),

    /// A mutation reported `success: false`
    #[error("{0} was not successful")]
    Unsuccessful(&'static str),
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;
