use std::io::{self, Write};

use colored::{Color, Colorize};
use serde_json::{json, Map, Value};

use super::resolve::SessionView;
use crate::models::{ActivityContent, AgentActivity, AgentSession, Issue, User};
use crate::output::{self, OutputMode};

/// Body lines wider than this are cut in the activity stream.
pub const MAX_LINE_CHARS: usize = 80;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const TIME_OF_DAY_FORMAT: &str = "%H:%M:%S";

/// Known session states. Anything else the server sends is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Pending,
    Active,
    AwaitingInput,
    Complete,
    Error,
    Stale,
    Other,
}

impl SessionStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "pending" => SessionStatus::Pending,
            "active" => SessionStatus::Active,
            "awaitingInput" => SessionStatus::AwaitingInput,
            "complete" => SessionStatus::Complete,
            "error" => SessionStatus::Error,
            "stale" => SessionStatus::Stale,
            _ => SessionStatus::Other,
        }
    }

    pub fn color(self) -> Color {
        match self {
            SessionStatus::Pending => Color::Magenta,
            SessionStatus::Active => Color::Green,
            SessionStatus::AwaitingInput => Color::Yellow,
            SessionStatus::Complete => Color::Blue,
            SessionStatus::Error => Color::Red,
            SessionStatus::Stale => Color::BrightBlack,
            SessionStatus::Other => Color::White,
        }
    }
}

pub fn activity_color(content: &ActivityContent) -> Color {
    match content {
        ActivityContent::Thought { .. } => Color::Magenta,
        ActivityContent::Response { .. } => Color::Green,
        ActivityContent::Action { .. } => Color::Blue,
        ActivityContent::Error { .. } => Color::Red,
        ActivityContent::Elicitation { .. } => Color::Yellow,
        ActivityContent::Unknown(_) => Color::White,
    }
}

impl<'a> SessionView<'a> {
    fn parts(self) -> (Option<&'a User>, Option<&'a AgentSession>) {
        match self {
            SessionView::NoDelegate => (None, None),
            SessionView::DelegatedPending { delegate } => (Some(delegate), None),
            SessionView::SessionFound { session, delegate } => (delegate, Some(session)),
        }
    }
}

/// Render the resolved view of `issue` in the requested mode.
pub fn render(
    out: &mut dyn Write,
    issue: &Issue,
    view: SessionView<'_>,
    mode: OutputMode,
) -> io::Result<()> {
    if let SessionView::NoDelegate = view {
        let message = format!("No agent session found for {}", issue.identifier);
        return match mode {
            OutputMode::Json => output::json(
                out,
                &json!({
                    "issue": issue.identifier,
                    "title": issue.title,
                    "message": message,
                }),
            ),
            OutputMode::Plain | OutputMode::Rich => output::info(out, &message, mode),
        };
    }

    match mode {
        OutputMode::Json => render_json(out, issue, view),
        OutputMode::Plain => render_plain(out, issue, view),
        OutputMode::Rich => render_rich(out, issue, view),
    }
}

fn render_json(out: &mut dyn Write, issue: &Issue, view: SessionView<'_>) -> io::Result<()> {
    let mut result = Map::new();
    result.insert("issue".into(), Value::from(issue.identifier.as_str()));
    result.insert("title".into(), Value::from(issue.title.as_str()));

    let (delegate, session) = view.parts();
    if let Some(delegate) = delegate {
        result.insert("delegate".into(), to_value(delegate)?);
    }
    if let Some(session) = session {
        result.insert("agentSession".into(), to_value(session)?);
    }

    output::json(out, &Value::Object(result))
}

fn to_value<T: serde::Serialize>(value: &T) -> io::Result<Value> {
    serde_json::to_value(value).map_err(io::Error::other)
}

fn user_label(user: &User) -> &str {
    user.label().unwrap_or(user.id.as_str())
}

fn render_plain(out: &mut dyn Write, issue: &Issue, view: SessionView<'_>) -> io::Result<()> {
    writeln!(out, "# Agent Session for {}\n", issue.identifier)?;
    writeln!(out, "**Title**: {}", issue.title)?;

    let (delegate, session) = view.parts();

    if let Some(delegate) = delegate {
        writeln!(out, "**Delegate**: {} ({})", delegate.name, delegate.display_name)?;
    }

    let Some(session) = session else {
        writeln!(out, "**Status**: Delegated but no session started yet")?;
        return Ok(());
    };

    writeln!(out, "**Status**: {}", session.status)?;
    if let Some(agent) = &session.app_user {
        writeln!(out, "**Agent**: {} ({})", agent.name, agent.display_name)?;
    }
    if let Some(created) = session.created_at {
        writeln!(out, "**Started**: {}", created.format(TIMESTAMP_FORMAT))?;
    }
    if let Some(updated) = session.updated_at {
        writeln!(out, "**Updated**: {}", updated.format(TIMESTAMP_FORMAT))?;
    }

    let activities = session.activity_nodes();
    if activities.is_empty() {
        writeln!(out, "\nNo activities yet")?;
        return Ok(());
    }

    writeln!(out, "\n## Activity Stream\n")?;
    for activity in activities {
        writeln!(
            out,
            "### [{}] {}",
            activity.content.kind(),
            activity.created_at.format(TIME_OF_DAY_FORMAT)
        )?;
        write_body(out, activity, "  ")?;
        writeln!(out)?;
    }
    write_more_notice(out, session, OutputMode::Plain)
}

fn render_rich(out: &mut dyn Write, issue: &Issue, view: SessionView<'_>) -> io::Result<()> {
    writeln!(
        out,
        "{} {}",
        issue.identifier.cyan().bold(),
        issue.title.white().bold()
    )?;

    let (delegate, session) = view.parts();

    if let Some(delegate) = delegate {
        writeln!(out, "\n{} {}", "Delegate:".yellow(), user_label(delegate).cyan())?;
    }

    let Some(session) = session else {
        writeln!(out, "\n{}", "Delegated but no session started yet".dimmed())?;
        return Ok(());
    };

    let status_color = SessionStatus::parse(&session.status).color();
    writeln!(out, "{} {}", "Status:".yellow(), session.status.color(status_color))?;
    if let Some(agent) = &session.app_user {
        writeln!(out, "{} {}", "Agent:".yellow(), user_label(agent).cyan())?;
    }
    if let Some(created) = session.created_at {
        writeln!(out, "{} {}", "Started:".yellow(), created.format(TIMESTAMP_FORMAT))?;
    }

    let activities = session.activity_nodes();
    if activities.is_empty() {
        writeln!(out, "\n{}", "No activities yet".dimmed())?;
        return Ok(());
    }

    writeln!(out, "\n{}", "Activity Stream:".yellow().bold())?;
    for activity in activities {
        let timestamp = activity.created_at.format(TIME_OF_DAY_FORMAT).to_string();
        writeln!(
            out,
            "\n  {} [{}]",
            timestamp.dimmed(),
            activity
                .content
                .kind()
                .color(activity_color(&activity.content))
        )?;
        write_body(out, activity, "    ")?;
    }
    write_more_notice(out, session, OutputMode::Rich)
}

/// Body lines under an activity header, each cut independently.
fn write_body(out: &mut dyn Write, activity: &AgentActivity, indent: &str) -> io::Result<()> {
    let body = activity.content.body();
    if body.is_empty() {
        return Ok(());
    }
    for line in body.split('\n') {
        writeln!(out, "{}{}", indent, output::truncate(line, MAX_LINE_CHARS))?;
    }
    Ok(())
}

fn write_more_notice(out: &mut dyn Write, session: &AgentSession, mode: OutputMode) -> io::Result<()> {
    if !session.has_more_activities() {
        return Ok(());
    }
    match mode {
        OutputMode::Rich => writeln!(out, "\n{} More activities available", "ℹ".yellow()),
        _ => writeln!(out, "_More activities available_"),
    }
}
