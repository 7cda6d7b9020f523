use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use linctl::api::Client;
use linctl::cli::{self, AgentCommands, AuthCommands, Cli, CommentCommands, Commands, IssueCommands};
use linctl::commands;
use linctl::config::{self, Config};
use linctl::logging;
use linctl::output::{self, OutputMode};

const README: &str = include_str!("../README.md");

fn config_path(cli: &Cli) -> Result<PathBuf> {
    match &cli.config {
        Some(path) => Ok(path.clone()),
        None => config::default_path(),
    }
}

/// Authenticated client; fails before any network call when no key is known.
fn get_client(cli: &Cli, config: &Config, key: Option<&str>) -> Result<Client> {
    let auth_header = config
        .auth_header(key.or(cli.api_key.as_deref()))
        .context("Authentication failed")?;
    let endpoint = config.endpoint(cli.api_url.as_deref());
    tracing::debug!(endpoint, "connecting");
    Client::connect(endpoint, auth_header, config.timeout()).context("Failed to build HTTP client")
}

fn run(cli: Cli, mode: OutputMode) -> Result<()> {
    let path = config_path(&cli)?;
    let config = Config::load(&path)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Commands::Agent { action, issue_id } => {
            let client = get_client(&cli, &config, None)?;
            match (action, issue_id) {
                (Some(AgentCommands::Mention { issue_id, message }), _) => {
                    commands::agent::mention(&client, &mut out, issue_id, message, mode)
                }
                (None, Some(issue_id)) => commands::agent::show(&client, &mut out, issue_id, mode),
                // arg_required_else_help prints help before we get here.
                (None, None) => Ok(()),
            }
        }

        Commands::Comment { action } => {
            let client = get_client(&cli, &config, None)?;
            match action {
                CommentCommands::List {
                    issue_id,
                    limit,
                    sort,
                    no_children,
                    resolved,
                } => commands::comment::list(
                    &client,
                    &mut out,
                    issue_id,
                    *limit,
                    *sort,
                    *no_children,
                    *resolved,
                    mode,
                ),
                CommentCommands::Create {
                    issue_id,
                    body,
                    parent,
                } => commands::comment::create(&client, &mut out, issue_id, body, parent.as_deref(), mode),
                CommentCommands::Delete { comment_id } => {
                    commands::comment::delete(&client, &mut out, comment_id, mode)
                }
                CommentCommands::Resolve { comment_id } => {
                    commands::comment::resolve(&client, &mut out, comment_id, mode)
                }
                CommentCommands::Unresolve { comment_id } => {
                    commands::comment::unresolve(&client, &mut out, comment_id, mode)
                }
            }
        }

        Commands::Issue { action } => {
            let client = get_client(&cli, &config, None)?;
            match action {
                IssueCommands::List(args) => commands::issue::list(&client, &mut out, args, mode),
                IssueCommands::Get { issue_id } => commands::issue::get(&client, &mut out, issue_id, mode),
                IssueCommands::Create(args) => commands::issue::create(&client, &mut out, args, mode),
                IssueCommands::Update { issue_id, args } => {
                    commands::issue::update(&client, &mut out, issue_id, args, mode)
                }
            }
        }

        Commands::Auth { action } => match action {
            AuthCommands::Login { key } => {
                let key = match key {
                    Some(key) => key.clone(),
                    None => commands::auth::read_key(&mut io::stdin().lock(), &mut io::stderr())?,
                };
                let client = get_client(&cli, &config, Some(key.as_str()))?;
                commands::auth::login(&client, &mut out, &path, &key, mode)
            }
            AuthCommands::Status => {
                let client = get_client(&cli, &config, None)?;
                commands::auth::status(&client, &mut out, mode)
            }
            AuthCommands::Logout => commands::auth::logout(&mut out, &path, mode),
        },

        Commands::Whoami => {
            let client = get_client(&cli, &config, None)?;
            commands::auth::whoami(&client, &mut out, mode)
        }

        Commands::Docs => {
            out.write_all(README.as_bytes())?;
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if cli::is_informational(&err) => err.exit(),
        Err(err) => {
            let mode = cli::requested_mode(std::env::args_os().skip(1));
            if mode.is_json() {
                output::error(&cli::usage_error_message(&err), mode);
            } else {
                let _ = err.print();
            }
            return ExitCode::FAILURE;
        }
    };
    let mode = OutputMode::from_flags(cli.json, cli.plaintext);
    if mode == OutputMode::Plain {
        colored::control::set_override(false);
    }
    logging::init(cli.verbose);

    match run(cli, mode) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            output::error(&format!("{:#}", err), mode);
            ExitCode::FAILURE
        }
    }
}
