use crate::models::{AgentSession, Issue, User};

/// What the `agent` view has to show for an issue.
#[derive(Debug, Clone, Copy)]
pub enum SessionView<'a> {
    /// Neither a delegate nor any session.
    NoDelegate,
    /// Delegated, but no comment carries a session yet.
    DelegatedPending { delegate: &'a User },
    /// First session found in comment order.
    SessionFound {
        session: &'a AgentSession,
        delegate: Option<&'a User>,
    },
}

/// First agent session embedded in the issue's comments, in server order.
pub fn find_session(issue: &Issue) -> Option<&AgentSession> {
    issue
        .comment_nodes()
        .iter()
        .find_map(|comment| comment.agent_session.as_ref())
}

pub fn resolve(issue: &Issue) -> SessionView<'_> {
    let delegate = issue.delegate.as_ref();
    match (find_session(issue), delegate) {
        (Some(session), delegate) => SessionView::SessionFound { session, delegate },
        (None, Some(delegate)) => SessionView::DelegatedPending { delegate },
        (None, None) => SessionView::NoDelegate,
    }
}

/// Name to @mention: the delegate's display name, else the app user of the
/// first session that has one.
pub fn agent_display_name(issue: &Issue) -> Option<&str> {
    if let Some(name) = issue
        .delegate
        .as_ref()
        .map(|d| d.display_name.as_str())
        .filter(|n| !n.is_empty())
    {
        return Some(name);
    }

    issue
        .comment_nodes()
        .iter()
        .filter_map(|c| c.agent_session.as_ref())
        .find_map(|s| s.app_user.as_ref())
        .map(|u| u.display_name.as_str())
        .filter(|n| !n.is_empty())
}
