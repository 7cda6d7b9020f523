use std::io::Write;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde_json::json;

use crate::api::{Client, CommentOrder, GraphqlTransport};
use crate::cli::{CommentSort, ResolvedFilter};
use crate::models::Comment;
use crate::output::{self, OutputMode};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl From<CommentSort> for CommentOrder {
    fn from(sort: CommentSort) -> Self {
        match sort {
            CommentSort::Linear => CommentOrder::Default,
            CommentSort::Created => CommentOrder::CreatedAt,
            CommentSort::Updated => CommentOrder::UpdatedAt,
        }
    }
}

/// Keep comments matching the resolution filter, preserving order.
pub fn filter_comments_by_resolution(comments: Vec<Comment>, filter: ResolvedFilter) -> Vec<Comment> {
    match filter {
        ResolvedFilter::All => comments,
        ResolvedFilter::Resolved => comments.into_iter().filter(|c| c.resolved_at.is_some()).collect(),
        ResolvedFilter::Unresolved => comments.into_iter().filter(|c| c.resolved_at.is_none()).collect(),
    }
}

/// Author shown for a comment; integration comments have no user.
pub fn comment_author_name(comment: &Comment) -> &str {
    comment.user.as_ref().and_then(|u| u.label()).unwrap_or("System")
}

pub fn format_time_ago(t: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(t);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    let (count, unit) = if minutes < 1 {
        return "just now".to_string();
    } else if hours < 1 {
        (minutes, "minute")
    } else if days < 1 {
        (hours, "hour")
    } else if days < 30 {
        (days, "day")
    } else if days < 365 {
        (days / 30, "month")
    } else {
        (days / 365, "year")
    };

    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}

fn format_date(t: Option<DateTime<Utc>>) -> String {
    t.map(|t| t.format(DATE_FORMAT).to_string()).unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
pub fn list<T: GraphqlTransport>(
    client: &Client<T>,
    out: &mut dyn Write,
    issue_id: &str,
    limit: u32,
    sort: CommentSort,
    no_children: bool,
    resolved: ResolvedFilter,
    mode: OutputMode,
) -> Result<()> {
    let mut comments = client
        .get_issue_comments(issue_id, limit, sort.into())
        .context("Failed to list comments")?;

    if no_children {
        comments.retain(|c| !c.is_reply());
    }
    let comments = filter_comments_by_resolution(comments, resolved);

    match mode {
        OutputMode::Json => output::json(out, &comments)?,
        OutputMode::Plain => {
            for (i, comment) in comments.iter().enumerate() {
                if i > 0 {
                    writeln!(out, "---")?;
                }
                writeln!(out, "Author: {}", comment_author_name(comment))?;
                writeln!(out, "Date: {}", format_date(comment.created_at))?;
                writeln!(out, "Comment:\n{}", comment.body)?;
            }
        }
        OutputMode::Rich => {
            if comments.is_empty() {
                writeln!(out, "\n{} No comments on issue {}", "ℹ".yellow(), issue_id.cyan())?;
                return Ok(());
            }

            writeln!(
                out,
                "\n{} Comments on {} ({})\n",
                "💬".cyan().bold(),
                issue_id.cyan(),
                comments.len()
            )?;

            let now = Utc::now();
            for (i, comment) in comments.iter().enumerate() {
                if i > 0 {
                    writeln!(out, "{}", "─".repeat(50))?;
                }
                let ago = comment
                    .created_at
                    .map(|t| format_time_ago(t, now))
                    .unwrap_or_default();
                writeln!(
                    out,
                    "{} {} {}",
                    comment_author_name(comment).cyan().bold(),
                    "•".dimmed(),
                    ago.dimmed()
                )?;
                if comment.resolved_at.is_some() {
                    writeln!(out, "{}", "(resolved)".green())?;
                }
                writeln!(out, "\n{}\n", comment.body)?;
            }
        }
    }
    Ok(())
}

pub fn create<T: GraphqlTransport>(
    client: &Client<T>,
    out: &mut dyn Write,
    issue_id: &str,
    body: &str,
    parent: Option<&str>,
    mode: OutputMode,
) -> Result<()> {
    if body.trim().is_empty() {
        bail!("Comment body is required (--body)");
    }

    let comment = client
        .create_comment(issue_id, body, parent)
        .context("Failed to create comment")?;

    match mode {
        OutputMode::Json => output::json(out, &comment)?,
        OutputMode::Plain => {
            writeln!(out, "Created comment on {}", issue_id)?;
            writeln!(out, "ID: {}", comment.id)?;
            writeln!(out, "Author: {}", comment_author_name(&comment))?;
            writeln!(out, "Date: {}", format_date(comment.created_at))?;
            if let Some(parent) = comment.parent.as_ref().filter(|_| comment.is_reply()) {
                writeln!(out, "Parent: {}", parent.id)?;
            }
        }
        OutputMode::Rich => {
            let what = if comment.is_reply() {
                "Added reply to comment on"
            } else {
                "Added comment to"
            };
            writeln!(out, "{} {} {}", "✓".green(), what, issue_id.cyan().bold())?;
            writeln!(out, "ID: {}", comment.id.dimmed())?;
            writeln!(out, "\n{}", comment.body)?;
        }
    }
    Ok(())
}

pub fn delete<T: GraphqlTransport>(
    client: &Client<T>,
    out: &mut dyn Write,
    comment_id: &str,
    mode: OutputMode,
) -> Result<()> {
    client
        .delete_comment(comment_id)
        .context("Failed to delete comment")?;

    match mode {
        OutputMode::Json => output::json(
            out,
            &json!({
                "status": "success",
                "commentId": comment_id,
                "message": "Comment deleted successfully",
            }),
        )?,
        OutputMode::Plain => writeln!(out, "Deleted comment {}", comment_id)?,
        OutputMode::Rich => writeln!(out, "{} Deleted comment {}", "✓".green(), comment_id.cyan())?,
    }
    Ok(())
}

pub fn resolve<T: GraphqlTransport>(
    client: &Client<T>,
    out: &mut dyn Write,
    comment_id: &str,
    mode: OutputMode,
) -> Result<()> {
    let comment = client
        .resolve_comment(comment_id)
        .context("Failed to resolve comment")?;

    let resolver = comment.resolving_user.as_ref().and_then(|u| u.label());
    match mode {
        OutputMode::Json => output::json(out, &comment)?,
        OutputMode::Plain => {
            writeln!(out, "Resolved comment {}", comment_id)?;
            if let Some(name) = resolver {
                writeln!(out, "Resolved by: {}", name)?;
            }
        }
        OutputMode::Rich => {
            writeln!(out, "{} Resolved comment {}", "✓".green(), comment_id.cyan())?;
            if let Some(name) = resolver {
                writeln!(out, "Resolved by: {}", name.dimmed())?;
            }
        }
    }
    Ok(())
}

pub fn unresolve<T: GraphqlTransport>(
    client: &Client<T>,
    out: &mut dyn Write,
    comment_id: &str,
    mode: OutputMode,
) -> Result<()> {
    let comment = client
        .unresolve_comment(comment_id)
        .context("Failed to unresolve comment")?;

    match mode {
        OutputMode::Json => output::json(out, &comment)?,
        OutputMode::Plain => writeln!(out, "Unresolved comment {}", comment_id)?,
        OutputMode::Rich => writeln!(out, "{} Unresolved comment {}", "✓".green(), comment_id.cyan())?,
    }
    Ok(())
}
