pub mod agent;
pub mod auth;
pub mod comment;
pub mod issue;
