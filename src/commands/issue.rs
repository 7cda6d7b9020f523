use std::io::Write;

use anyhow::{anyhow, bail, Context, Result};
use colored::Colorize;
use serde_json::{json, Map, Value};

use crate::api::{Client, GraphqlTransport, IssueInput};
use crate::cli::{IssueCreateArgs, IssueListArgs, IssueUpdateArgs};
use crate::models::{Issue, User};
use crate::output::{self, truncate, OutputMode};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// What a `--project` flag asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectAssignment {
    Unchanged,
    Clear,
    Set(String),
}

/// 8-4-4-4-12 hex digits, either case.
pub fn is_valid_uuid(s: &str) -> bool {
    let groups: Vec<&str> = s.split('-').collect();
    groups.len() == 5
        && groups
            .iter()
            .zip([8, 4, 4, 4, 12])
            .all(|(g, len)| g.len() == len && g.chars().all(|c| c.is_ascii_hexdigit()))
}

pub fn build_project_input(flag: Option<&str>) -> Result<ProjectAssignment> {
    match flag.map(str::trim) {
        None | Some("") => Ok(ProjectAssignment::Unchanged),
        Some(v) if v.eq_ignore_ascii_case("unassigned") => Ok(ProjectAssignment::Clear),
        Some(v) if is_valid_uuid(v) => Ok(ProjectAssignment::Set(v.to_string())),
        Some(v) => bail!("Invalid project ID '{}': expected a UUID or 'unassigned'", v),
    }
}

/// Linear reports an unknown project id in several phrasings; they all
/// mention the project and "not found".
pub fn is_project_not_found_err(err: &anyhow::Error) -> bool {
    let message = format!("{:#}", err).to_lowercase();
    message.contains("project") && message.contains("not found")
}

/// `0`-`4` or one of Linear's priority names.
pub fn parse_priority(s: &str) -> Result<u8> {
    let priority = match s.trim().to_lowercase().as_str() {
        "0" | "none" => 0,
        "1" | "urgent" => 1,
        "2" | "high" => 2,
        "3" | "normal" | "medium" => 3,
        "4" | "low" => 4,
        _ => bail!(
            "Invalid priority '{}'. Use 0-4 or none, urgent, high, normal, low",
            s
        ),
    };
    Ok(priority)
}

pub fn priority_label(priority: f64) -> &'static str {
    match priority.round() as i64 {
        1 => "Urgent",
        2 => "High",
        3 => "Normal",
        4 => "Low",
        _ => "None",
    }
}

/// GraphQL `IssueFilter` for the list flags.
pub fn build_issue_filter(args: &IssueListArgs) -> Result<Value> {
    let mut filter = Map::new();

    if let Some(assignee) = args.assignee.as_deref() {
        let assignee_filter = if assignee.eq_ignore_ascii_case("me") {
            json!({ "isMe": { "eq": true } })
        } else {
            json!({ "email": { "eq": assignee } })
        };
        filter.insert("assignee".into(), assignee_filter);
    }

    let mut state = Map::new();
    if let Some(name) = args.state.as_deref() {
        state.insert("name".into(), json!({ "eqIgnoreCase": name }));
    }
    if !args.include_completed {
        state.insert("type".into(), json!({ "nin": ["completed", "canceled"] }));
    }
    if !state.is_empty() {
        filter.insert("state".into(), Value::Object(state));
    }

    if let Some(team) = args.team.as_deref() {
        filter.insert("team".into(), json!({ "key": { "eq": team.to_uppercase() } }));
    }
    if let Some(priority) = args.priority.as_deref() {
        filter.insert("priority".into(), json!({ "eq": parse_priority(priority)? }));
    }

    Ok(Value::Object(filter))
}

fn user_label(user: Option<&User>) -> &str {
    user.and_then(User::label).unwrap_or("Unassigned")
}

fn lookup_user<T: GraphqlTransport>(client: &Client<T>, query: &str) -> Result<User> {
    client
        .find_user(query)
        .with_context(|| format!("Failed to look up user '{}'", query))?
        .ok_or_else(|| anyhow!("User '{}' not found", query))
}

/// Translate a project-not-found failure into a message naming the flag value.
fn explain_project_error(err: anyhow::Error, project: &ProjectAssignment) -> anyhow::Error {
    match project {
        ProjectAssignment::Set(id) if is_project_not_found_err(&err) => {
            anyhow!("Project '{}' not found. Check the --project ID", id)
        }
        _ => err,
    }
}

pub fn list<T: GraphqlTransport>(
    client: &Client<T>,
    out: &mut dyn Write,
    args: &IssueListArgs,
    mode: OutputMode,
) -> Result<()> {
    let filter = build_issue_filter(args)?;
    let issues = client
        .list_issues(filter, args.limit)
        .context("Failed to list issues")?;

    if mode.is_json() {
        output::json(out, &issues)?;
        return Ok(());
    }
    if issues.is_empty() {
        output::info(out, "No issues found.", mode)?;
        return Ok(());
    }

    for issue in &issues {
        let state = issue.state.as_ref().map_or("", |s| s.name.as_str());
        let row = format!(
            "{:<10} {:<14} {:<50} {:<7} {}",
            issue.identifier,
            format!("[{}]", state),
            truncate(&issue.title, 50),
            priority_label(issue.priority),
            user_label(issue.assignee.as_ref()),
        );
        match mode {
            OutputMode::Rich => {
                let (id, rest) = row.split_at(issue.identifier.len());
                writeln!(out, "{}{}", id.cyan().bold(), rest)?;
            }
            _ => writeln!(out, "{}", row)?,
        }
    }
    Ok(())
}

pub fn get<T: GraphqlTransport>(
    client: &Client<T>,
    out: &mut dyn Write,
    issue_id: &str,
    mode: OutputMode,
) -> Result<()> {
    let issue = client.get_issue(issue_id).context("Failed to fetch issue")?;
    if mode.is_json() {
        output::json(out, &issue)?;
        return Ok(());
    }
    print_issue(out, &issue, mode)?;
    Ok(())
}

fn print_issue(out: &mut dyn Write, issue: &Issue, mode: OutputMode) -> std::io::Result<()> {
    match mode {
        OutputMode::Rich => writeln!(out, "{}: {}", issue.identifier.cyan().bold(), issue.title.bold())?,
        _ => writeln!(out, "{}: {}", issue.identifier, issue.title)?,
    }
    if let Some(state) = &issue.state {
        writeln!(out, "State: {}", state.name)?;
    }
    writeln!(out, "Priority: {}", priority_label(issue.priority))?;
    writeln!(out, "Assignee: {}", user_label(issue.assignee.as_ref()))?;
    if let Some(delegate) = issue.delegate.as_ref().and_then(User::label) {
        writeln!(out, "Delegate: {}", delegate)?;
    }
    if let Some(team) = &issue.team {
        writeln!(out, "Team: {} ({})", team.name, team.key)?;
    }
    if let Some(project) = &issue.project {
        writeln!(out, "Project: {}", project.name)?;
    }
    let labels = issue.label_names();
    if !labels.is_empty() {
        writeln!(out, "Labels: {}", labels.join(", "))?;
    }
    if let Some(url) = &issue.url {
        writeln!(out, "URL: {}", url)?;
    }
    if let Some(created) = issue.created_at {
        writeln!(out, "Created: {}", created.format(DATE_FORMAT))?;
    }
    if let Some(updated) = issue.updated_at {
        writeln!(out, "Updated: {}", updated.format(DATE_FORMAT))?;
    }

    if let Some(desc) = issue.description.as_deref().filter(|d| !d.trim().is_empty()) {
        writeln!(out, "\nDescription:")?;
        for line in desc.lines() {
            writeln!(out, "  {}", line)?;
        }
    }
    Ok(())
}

pub fn create<T: GraphqlTransport>(
    client: &Client<T>,
    out: &mut dyn Write,
    args: &IssueCreateArgs,
    mode: OutputMode,
) -> Result<()> {
    if args.title.trim().is_empty() {
        bail!("Issue title is required (--title)");
    }
    // Validate local input before any request goes out.
    let project = build_project_input(args.project.as_deref())?;
    let priority = args.priority.as_deref().map(parse_priority).transpose()?;

    let team = client
        .team_by_key(&args.team)
        .context("Failed to find team")?;

    let mut input = IssueInput {
        team_id: Some(team.id.clone()),
        title: Some(args.title.clone()),
        description: args.description.clone(),
        priority,
        ..Default::default()
    };

    if args.assign_me {
        let viewer = client.viewer().context("Failed to get current user")?;
        input.assignee_id = Some(Some(viewer.id));
    }
    if let Some(delegate) = args.delegate.as_deref() {
        input.delegate_id = Some(Some(lookup_user(client, delegate)?.id));
    }
    if !args.labels.is_empty() {
        let available = client
            .team_labels(&team.id)
            .context("Failed to fetch labels")?;
        let ids = args
            .labels
            .iter()
            .map(|name| {
                available
                    .iter()
                    .find(|l| l.name.eq_ignore_ascii_case(name))
                    .map(|l| l.id.clone())
                    .ok_or_else(|| anyhow!("Label '{}' not found in team {}", name, team.key))
            })
            .collect::<Result<Vec<_>>>()?;
        input.label_ids = Some(ids);
    }
    if let ProjectAssignment::Set(id) = &project {
        input.project_id = Some(Some(id.clone()));
    }

    let issue = client
        .create_issue(&input)
        .context("Failed to create issue")
        .map_err(|e| explain_project_error(e, &project))?;
    tracing::info!(issue = %issue.identifier, "issue created");

    if mode.is_json() {
        output::json(out, &issue)?;
        return Ok(());
    }
    output::success(
        out,
        &format!("Created issue {}: {}", issue.identifier, issue.title),
        mode,
    )?;
    if let Some(url) = &issue.url {
        writeln!(out, "{}", url)?;
    }
    Ok(())
}

pub fn update<T: GraphqlTransport>(
    client: &Client<T>,
    out: &mut dyn Write,
    issue_id: &str,
    args: &IssueUpdateArgs,
    mode: OutputMode,
) -> Result<()> {
    let project = build_project_input(args.project.as_deref())?;
    let mut input = IssueInput {
        title: args.title.clone(),
        description: args.description.clone(),
        priority: args.priority.as_deref().map(parse_priority).transpose()?,
        ..Default::default()
    };

    match project {
        ProjectAssignment::Unchanged => {}
        ProjectAssignment::Clear => input.project_id = Some(None),
        ProjectAssignment::Set(ref id) => input.project_id = Some(Some(id.clone())),
    }

    if let Some(state) = args.state.as_deref() {
        // State names are per team.
        let current = client.get_issue(issue_id).context("Failed to fetch issue")?;
        let team = current
            .team
            .ok_or_else(|| anyhow!("Issue {} has no team", issue_id))?;
        let state = client
            .workflow_state(&team.id, state)
            .context("Failed to find state")?;
        input.state_id = Some(state.id);
    }

    if let Some(assignee) = args.assignee.as_deref() {
        input.assignee_id = Some(match assignee.to_lowercase().as_str() {
            "unassigned" | "none" => None,
            "me" => Some(client.viewer().context("Failed to get current user")?.id),
            _ => Some(lookup_user(client, assignee)?.id),
        });
    }
    if let Some(delegate) = args.delegate.as_deref() {
        input.delegate_id = Some(if delegate.eq_ignore_ascii_case("none") {
            None
        } else {
            Some(lookup_user(client, delegate)?.id)
        });
    }

    if input.is_empty() {
        bail!("No updates specified. Use --help to see available flags");
    }

    let issue = client
        .update_issue(issue_id, &input)
        .context("Failed to update issue")
        .map_err(|e| explain_project_error(e, &project))?;
    tracing::info!(issue = %issue.identifier, "issue updated");

    if mode.is_json() {
        output::json(out, &issue)?;
        return Ok(());
    }
    output::success(out, &format!("Updated issue {}", issue.identifier), mode)?;
    Ok(())
}
