//! Linear GraphQL API client
//!
//! A blocking transport, the GraphQL documents we send, and a typed client
//! that decodes responses into [`crate::models`].

pub mod client;
pub mod error;
#[cfg(test)]
pub(crate) mod fake;
pub mod queries;
pub mod transport;

pub use client::{Client, CommentOrder, IssueInput};
pub use error::{ApiError, ApiResult};
pub use transport::{GraphqlRequest, GraphqlTransport, HttpTransport, DEFAULT_ENDPOINT};
