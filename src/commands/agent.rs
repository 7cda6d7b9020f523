use std::io::Write;

use anyhow::{bail, Context, Result};
use serde_json::json;

use crate::agent::{agent_display_name, render, resolve};
use crate::api::{Client, GraphqlTransport};
use crate::output::{self, OutputMode};

/// Show the agent session (or delegation state) for an issue.
pub fn show<T: GraphqlTransport>(
    client: &Client<T>,
    out: &mut dyn Write,
    issue_id: &str,
    mode: OutputMode,
) -> Result<()> {
    let issue = client
        .get_issue_agent_session(issue_id)
        .context("Failed to fetch issue")?;

    render(out, &issue, resolve(&issue), mode)?;
    Ok(())
}

/// @mention the issue's agent so it picks the message up.
pub fn mention<T: GraphqlTransport>(
    client: &Client<T>,
    out: &mut dyn Write,
    issue_id: &str,
    message: &str,
    mode: OutputMode,
) -> Result<()> {
    let issue = client
        .get_issue_agent_session(issue_id)
        .context("Failed to fetch issue")?;

    let Some(agent) = agent_display_name(&issue) else {
        bail!("No agent found for {}", issue_id);
    };

    let comment_id = client
        .mention_agent(&issue.id, agent, message)
        .context("Failed to mention agent")?;
    tracing::info!(issue = %issue.identifier, agent, comment_id = %comment_id, "agent mentioned");

    match mode {
        OutputMode::Json => output::json(
            out,
            &json!({
                "success": true,
                "commentId": comment_id,
                "issue": issue_id,
                "agent": agent,
                "message": message,
            }),
        )?,
        OutputMode::Plain | OutputMode::Rich => output::success(
            out,
            &format!("@{} mentioned on {}", agent, issue.identifier),
            mode,
        )?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeTransport;
    use crate::api::ApiError;
    use serde_json::{json, Value};

    fn issue_data(delegate: Value, comments: Value) -> Value {
        json!({
            "issue": {
                "id": "uuid-80",
                "identifier": "ENG-80",
                "title": "Fix login",
                "delegate": delegate,
                "comments": {"nodes": comments}
            }
        })
    }

    fn run_show(fake: FakeTransport, mode: OutputMode) -> (Result<()>, String) {
        colored::control::set_override(false);
        let client = Client::new(fake);
        let mut buf = Vec::new();
        let result = show(&client, &mut buf, "ENG-80", mode);
        (result, String::from_utf8(buf).unwrap())
    }

    #[test]
    fn test_show_no_session() {
        let (result, out) = run_show(
            FakeTransport::new().respond(issue_data(Value::Null, json!([]))),
            OutputMode::Rich,
        );
        result.unwrap();
        assert_eq!(out, "No agent session found for ENG-80\n");
    }

    #[test]
    fn test_show_fetch_error_renders_nothing() {
        let (result, out) = run_show(
            FakeTransport::new().fail(ApiError::Graphql(vec!["Entity not found".into()])),
            OutputMode::Rich,
        );
        let err = result.unwrap_err();
        assert_eq!(
            format!("{:#}", err),
            "Failed to fetch issue: GraphQL errors: Entity not found"
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_mention_without_agent_makes_no_mutation() {
        colored::control::set_override(false);
        let client = Client::new(FakeTransport::new().respond(issue_data(
            Value::Null,
            json!([{"id": "c1", "body": "hi", "agentSession": null}]),
        )));
        let mut buf = Vec::new();

        let err = mention(&client, &mut buf, "ENG-80", "Fix it", OutputMode::Rich).unwrap_err();
        assert_eq!(err.to_string(), "No agent found for ENG-80");
        assert_eq!(client.transport().operations(), vec!["issueAgentSession"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_mention_uses_delegate_and_issue_uuid() {
        colored::control::set_override(false);
        let client = Client::new(
            FakeTransport::new()
                .respond(issue_data(json!({"id": "u", "displayName": "bot"}), json!([])))
                .respond(json!({"commentCreate": {"success": true, "comment": {"id": "c-9", "body": ""}}})),
        );
        let mut buf = Vec::new();

        mention(&client, &mut buf, "ENG-80", "Fix it", OutputMode::Rich).unwrap();

        let calls = client.transport().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].variables["input"]["issueId"], "uuid-80");
        assert_eq!(calls[1].variables["input"]["body"], "@bot Fix it");
        assert_eq!(String::from_utf8(buf).unwrap(), "✓ @bot mentioned on ENG-80\n");
    }

    #[test]
    fn test_mention_json_output() {
        let client = Client::new(
            FakeTransport::new()
                .respond(issue_data(
                    Value::Null,
                    json!([{"id": "c1", "body": "", "agentSession": {
                        "id": "s-1", "status": "complete",
                        "appUser": {"id": "app", "name": "Agent", "displayName": "agent"}
                    }}]),
                ))
                .respond(json!({"commentCreate": {"success": true, "comment": {"id": "c-7", "body": ""}}})),
        );
        let mut buf = Vec::new();

        mention(&client, &mut buf, "ENG-80", "again", OutputMode::Json).unwrap();

        let value: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["commentId"], "c-7");
        assert_eq!(value["agent"], "agent");
        assert_eq!(value["issue"], "ENG-80");
        assert_eq!(value["message"], "again");
    }

    #[test]
    fn test_mention_post_failure() {
        let client = Client::new(
            FakeTransport::new()
                .respond(issue_data(json!({"id": "u", "displayName": "bot"}), json!([])))
                .respond(json!({"commentCreate": {"success": false}})),
        );
        let mut buf = Vec::new();

        let err = mention(&client, &mut buf, "ENG-80", "x", OutputMode::Plain).unwrap_err();
        assert_eq!(
            format!("{:#}", err),
            "Failed to mention agent: commentCreate was not successful"
        );
        assert!(buf.is_empty());
    }
}
