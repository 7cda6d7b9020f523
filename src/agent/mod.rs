//! Agent sessions: finding the session delegated on an issue and rendering
//! its activity stream.

pub mod render;
pub mod resolve;

pub use render::{render, SessionStatus};
pub use resolve::{agent_display_name, find_session, resolve, SessionView};
