//! Command-line client for Linear: issues, comments and agent sessions.

pub mod agent;
pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod models;
pub mod output;
