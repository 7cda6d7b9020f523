use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::json;

use crate::api::{Client, GraphqlTransport};
use crate::config::Config;
use crate::models::User;
use crate::output::{self, OutputMode};

fn describe(user: &User) -> String {
    let name = user.label().unwrap_or(user.id.as_str());
    match user.email.as_deref().filter(|e| !e.is_empty() && *e != name) {
        Some(email) => format!("{} ({})", name, email),
        None => name.to_string(),
    }
}

/// Read an API key from `input` when none was given on the command line.
pub fn read_key(input: &mut dyn BufRead, prompt: &mut dyn Write) -> Result<String> {
    write!(prompt, "Linear API key: ")?;
    prompt.flush()?;
    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read API key")?;
    let key = line.trim().to_string();
    if key.is_empty() {
        bail!("No API key provided");
    }
    Ok(key)
}

/// Check the key against `viewer`, then store it.
pub fn login<T: GraphqlTransport>(
    client: &Client<T>,
    out: &mut dyn Write,
    config_path: &Path,
    key: &str,
    mode: OutputMode,
) -> Result<()> {
    let viewer = client.viewer().context("Failed to verify API key")?;

    let mut config = Config::load(config_path)?;
    config.api_key = Some(key.to_string());
    config.save(config_path)?;
    tracing::info!(path = %config_path.display(), "credential stored");

    match mode {
        OutputMode::Json => output::json(out, &json!({ "success": true, "user": viewer }))?,
        _ => output::success(out, &format!("Logged in as {}", describe(&viewer)), mode)?,
    }
    Ok(())
}

pub fn status<T: GraphqlTransport>(
    client: &Client<T>,
    out: &mut dyn Write,
    mode: OutputMode,
) -> Result<()> {
    let viewer = client.viewer().context("Failed to get current user")?;
    let org = client
        .organization()
        .context("Failed to get organization")?;

    match mode {
        OutputMode::Json => output::json(
            out,
            &json!({ "authenticated": true, "user": viewer, "organization": org }),
        )?,
        _ => {
            output::success(out, &format!("Authenticated as {}", describe(&viewer)), mode)?;
            writeln!(out, "Organization: {} ({})", org.name, org.url_key)?;
        }
    }
    Ok(())
}

pub fn logout(out: &mut dyn Write, config_path: &Path, mode: OutputMode) -> Result<()> {
    let mut config = Config::load(config_path)?;
    if config.api_key.take().is_none() {
        output::info(out, "Not logged in", mode)?;
        return Ok(());
    }
    config.save(config_path)?;
    output::success(out, "Logged out", mode)?;
    Ok(())
}

pub fn whoami<T: GraphqlTransport>(
    client: &Client<T>,
    out: &mut dyn Write,
    mode: OutputMode,
) -> Result<()> {
    let viewer = client.viewer().context("Failed to get current user")?;
    match mode {
        OutputMode::Json => output::json(out, &viewer)?,
        _ => writeln!(out, "{}", describe(&viewer))?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeTransport;
    use crate::api::ApiError;
    use serde_json::Value;
    use tempfile::tempdir;

    fn viewer() -> Value {
        json!({"viewer": {"id": "u-1", "name": "Jane Doe", "displayName": "jane", "email": "jane@example.com"}})
    }

    fn run(f: impl FnOnce(&mut dyn Write) -> Result<()>) -> String {
        colored::control::set_override(false);
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_login_stores_verified_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let client = Client::new(FakeTransport::new().respond(viewer()));

        let out = run(|o| login(&client, o, &path, "lin_api_abc", OutputMode::Rich));
        assert_eq!(out, "✓ Logged in as jane (jane@example.com)\n");
        assert_eq!(Config::load(&path).unwrap().api_key.as_deref(), Some("lin_api_abc"));
    }

    #[test]
    fn test_login_rejected_key_is_not_stored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let client = Client::new(FakeTransport::new().fail(ApiError::Status {
            status: 401,
            body: "unauthorized".into(),
        }));

        let mut buf = Vec::new();
        let err = login(&client, &mut buf, &path, "bad", OutputMode::Rich).unwrap_err();
        assert!(format!("{:#}", err).starts_with("Failed to verify API key: "));
        assert!(!path.exists());
    }

    #[test]
    fn test_logout_keeps_other_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        Config {
            api_key: Some("k".into()),
            timeout_secs: Some(9),
            ..Default::default()
        }
        .save(&path)
        .unwrap();

        assert_eq!(run(|o| logout(o, &path, OutputMode::Plain)), "Logged out\n");
        let config = Config::load(&path).unwrap();
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout_secs, Some(9));

        assert_eq!(run(|o| logout(o, &path, OutputMode::Plain)), "Not logged in\n");
    }

    #[test]
    fn test_status_reports_org() {
        let client = Client::new(
            FakeTransport::new()
                .respond(viewer())
                .respond(json!({"organization": {"id": "o", "name": "Acme", "urlKey": "acme"}})),
        );
        let out = run(|o| status(&client, o, OutputMode::Plain));
        assert_eq!(out, "Authenticated as jane (jane@example.com)\nOrganization: Acme (acme)\n");
    }

    #[test]
    fn test_whoami_json() {
        let client = Client::new(FakeTransport::new().respond(viewer()));
        let out = run(|o| whoami(&client, o, OutputMode::Json));
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["displayName"], "jane");
        assert_eq!(value["email"], "jane@example.com");
    }

    #[test]
    fn test_read_key() {
        let mut prompt = Vec::new();
        let key = read_key(&mut "  lin_api_xyz \n".as_bytes(), &mut prompt).unwrap();
        assert_eq!(key, "lin_api_xyz");
        assert_eq!(String::from_utf8(prompt).unwrap(), "Linear API key: ");

        assert!(read_key(&mut "\n".as_bytes(), &mut Vec::new()).is_err());
    }
}
