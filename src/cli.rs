use std::ffi::OsStr;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::output::OutputMode;

#[derive(Parser, Debug)]
#[command(name = "linctl")]
#[command(about = "A command-line client for Linear issues, comments and agent sessions")]
#[command(version)]
pub struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Output plain text without colors
    #[arg(long, global = true)]
    pub plaintext: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Linear API key (overrides the stored credential)
    #[arg(long, global = true, env = "LINEAR_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Config file path
    #[arg(long, global = true, env = "LINCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// GraphQL endpoint override
    #[arg(long, global = true, env = "LINCTL_API_URL", hide = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// View agent session for an issue
    #[command(args_conflicts_with_subcommands = true, arg_required_else_help = true)]
    Agent {
        #[command(subcommand)]
        action: Option<AgentCommands>,
        /// Issue ID (e.g. ENG-80)
        issue_id: Option<String>,
    },

    /// Manage issue comments
    Comment {
        #[command(subcommand)]
        action: CommentCommands,
    },

    /// Manage issues
    Issue {
        #[command(subcommand)]
        action: IssueCommands,
    },

    /// Manage authentication
    Auth {
        #[command(subcommand)]
        action: AuthCommands,
    },

    /// Show the authenticated user
    Whoami,

    /// Print the bundled README
    Docs,
}

#[derive(Subcommand, Debug)]
pub enum AgentCommands {
    /// @mention an agent with a message
    Mention {
        /// Issue ID (e.g. ENG-80)
        issue_id: String,
        /// Message for the agent
        message: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CommentSort {
    /// Linear's default order
    Linear,
    /// Creation time
    #[value(alias = "createdAt")]
    Created,
    /// Last update time
    #[value(alias = "updatedAt")]
    Updated,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ResolvedFilter {
    All,
    Resolved,
    Unresolved,
}

#[derive(Subcommand, Debug)]
pub enum CommentCommands {
    /// List comments for an issue
    #[command(visible_alias = "ls")]
    List {
        /// Issue ID
        issue_id: String,
        /// Maximum number of comments to return
        #[arg(short, long, default_value_t = 50)]
        limit: u32,
        /// Sort order
        #[arg(short = 'o', long, value_enum, default_value_t = CommentSort::Linear)]
        sort: CommentSort,
        /// Only show root comments (skip comments that have a parent)
        #[arg(long)]
        no_children: bool,
        /// Filter by resolution state
        #[arg(long, value_enum, default_value_t = ResolvedFilter::All)]
        resolved: ResolvedFilter,
    },

    /// Create a comment on an issue
    #[command(visible_aliases = ["add", "new"])]
    Create {
        /// Issue ID
        issue_id: String,
        /// Comment body
        #[arg(short, long)]
        body: String,
        /// Parent comment ID for threaded replies
        #[arg(long)]
        parent: Option<String>,
    },

    /// Delete a comment
    #[command(visible_aliases = ["rm", "remove"])]
    Delete {
        /// Comment ID
        comment_id: String,
    },

    /// Resolve a comment thread
    Resolve {
        /// Comment ID
        comment_id: String,
    },

    /// Unresolve a comment thread
    Unresolve {
        /// Comment ID
        comment_id: String,
    },
}

#[derive(Args, Debug, Default)]
pub struct IssueListArgs {
    /// Filter by assignee ("me" or an email)
    #[arg(short, long)]
    pub assignee: Option<String>,
    /// Filter by state name
    #[arg(short, long)]
    pub state: Option<String>,
    /// Filter by team key
    #[arg(short, long)]
    pub team: Option<String>,
    /// Filter by priority (0-4 or none, urgent, high, normal, low)
    #[arg(short, long)]
    pub priority: Option<String>,
    /// Maximum number of issues to return
    #[arg(short, long, default_value_t = 50)]
    pub limit: u32,
    /// Include completed and canceled issues
    #[arg(long)]
    pub include_completed: bool,
}

#[derive(Args, Debug, Default)]
pub struct IssueCreateArgs {
    /// Issue title
    #[arg(long)]
    pub title: String,
    /// Team key
    #[arg(short, long)]
    pub team: String,
    /// Issue description
    #[arg(short, long)]
    pub description: Option<String>,
    /// Priority (0-4 or none, urgent, high, normal, low)
    #[arg(short, long)]
    pub priority: Option<String>,
    /// Assign the issue to yourself
    #[arg(long)]
    pub assign_me: bool,
    /// Delegate to agent (email, name, or displayName)
    #[arg(long)]
    pub delegate: Option<String>,
    /// Label name (repeatable)
    #[arg(long = "label")]
    pub labels: Vec<String>,
    /// Project ID to assign issue to
    #[arg(long)]
    pub project: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct IssueUpdateArgs {
    /// New title
    #[arg(long)]
    pub title: Option<String>,
    /// New description
    #[arg(short, long)]
    pub description: Option<String>,
    /// New state name
    #[arg(short, long)]
    pub state: Option<String>,
    /// Assignee ("me", an email, or "unassigned")
    #[arg(short, long)]
    pub assignee: Option<String>,
    /// Priority (0-4 or none, urgent, high, normal, low)
    #[arg(short, long)]
    pub priority: Option<String>,
    /// Delegate to agent (email, name, displayName, or 'none' to remove)
    #[arg(long)]
    pub delegate: Option<String>,
    /// Project ID to assign issue to (or "unassigned" to remove)
    #[arg(long)]
    pub project: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum IssueCommands {
    /// List issues
    #[command(visible_alias = "ls")]
    List(IssueListArgs),

    /// Show issue details
    #[command(visible_alias = "show")]
    Get {
        /// Issue ID
        issue_id: String,
    },

    /// Create a new issue
    Create(IssueCreateArgs),

    /// Update an issue
    Update {
        /// Issue ID
        issue_id: String,
        #[command(flatten)]
        args: IssueUpdateArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Verify and store an API key
    Login {
        /// Personal API key from Linear settings
        #[arg(long = "with-key")]
        key: Option<String>,
    },
    /// Show who the stored credential belongs to
    Status,
    /// Remove the stored credential
    Logout,
}

/// Help and version requests that clap should print and exit on.
pub fn is_informational(err: &clap::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}

/// Output mode asked for on a command line that failed to parse.
/// Tokens after `--` are operands, not flags.
pub fn requested_mode<I, S>(args: I) -> OutputMode
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut json = false;
    let mut plaintext = false;
    for arg in args {
        let arg = arg.as_ref();
        if arg == "--" {
            break;
        }
        json |= arg == "--json";
        plaintext |= arg == "--plaintext";
    }
    OutputMode::from_flags(json, plaintext)
}

/// First line of a clap error, without the `error: ` prefix.
pub fn usage_error_message(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    let first = rendered.lines().next().unwrap_or_default().trim();
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("linctl").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_agent_view() {
        let cli = parse(&["agent", "ENG-80", "--json"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Agent { action: None, issue_id } => assert_eq!(issue_id.as_deref(), Some("ENG-80")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_agent_mention_requires_two_args() {
        assert!(parse(&["agent", "mention", "ENG-80"]).is_err());
        assert!(parse(&["agent", "mention", "ENG-80", "message", "extra"]).is_err());

        let cli = parse(&["agent", "mention", "ENG-80", "Fix this bug"]).unwrap();
        match cli.command {
            Commands::Agent {
                action: Some(AgentCommands::Mention { issue_id, message }),
                ..
            } => {
                assert_eq!(issue_id, "ENG-80");
                assert_eq!(message, "Fix this bug");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_comment_list_defaults() {
        let cli = parse(&["comment", "ls", "ENG-123"]).unwrap();
        match cli.command {
            Commands::Comment {
                action:
                    CommentCommands::List {
                        issue_id,
                        limit,
                        sort,
                        no_children,
                        resolved,
                    },
            } => {
                assert_eq!(issue_id, "ENG-123");
                assert_eq!(limit, 50);
                assert_eq!(sort, CommentSort::Linear);
                assert!(!no_children);
                assert_eq!(resolved, ResolvedFilter::All);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_comment_list_flags() {
        let cli = parse(&[
            "comment", "list", "ENG-1", "-l", "5", "-o", "createdAt", "--no-children", "--resolved", "unresolved",
        ])
        .unwrap();
        match cli.command {
            Commands::Comment {
                action:
                    CommentCommands::List {
                        limit,
                        sort,
                        no_children,
                        resolved,
                        ..
                    },
            } => {
                assert_eq!(limit, 5);
                assert_eq!(sort, CommentSort::Created);
                assert!(no_children);
                assert_eq!(resolved, ResolvedFilter::Unresolved);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_comment_list_rejects_bad_sort() {
        assert!(parse(&["comment", "list", "ENG-1", "--sort", "random"]).is_err());
    }

    #[test]
    fn test_usage_error_in_json_mode() {
        let args = ["--json", "comment", "list", "ENG-1", "--sort", "random"];
        let err = parse(&args).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        assert!(!is_informational(&err));
        assert_eq!(requested_mode(args), OutputMode::Json);

        let message = usage_error_message(&err);
        assert!(message.starts_with("invalid value 'random'"), "{}", message);
        assert!(!message.contains('\n'));
    }

    #[test]
    fn test_help_and_version_stay_informational() {
        assert!(is_informational(&parse(&["--help"]).unwrap_err()));
        assert!(is_informational(&parse(&["--version"]).unwrap_err()));
        assert!(!is_informational(&parse(&["bogus"]).unwrap_err()));
    }

    #[test]
    fn test_requested_mode_stops_at_operands() {
        assert_eq!(requested_mode(["issue", "get", "ENG-1"]), OutputMode::Rich);
        assert_eq!(requested_mode(["--plaintext", "issue"]), OutputMode::Plain);
        assert_eq!(requested_mode(["--plaintext", "--json"]), OutputMode::Json);
        assert_eq!(requested_mode(["comment", "add", "--", "--json"]), OutputMode::Rich);
    }

    #[test]
    fn test_comment_verbs_require_one_arg() {
        for verb in ["list", "delete", "resolve", "unresolve"] {
            assert!(parse(&["comment", verb]).is_err(), "{} with no args", verb);
            assert!(parse(&["comment", verb, "a", "b"]).is_err(), "{} with two args", verb);
        }
        assert!(parse(&["comment", "rm", "comment-123"]).is_ok());
        assert!(parse(&["comment", "remove", "comment-123"]).is_ok());
    }

    #[test]
    fn test_comment_create_body_short_flag() {
        let cli = parse(&["comment", "add", "ENG-1", "-b", "hello", "--parent", "c-1"]).unwrap();
        match cli.command {
            Commands::Comment {
                action: CommentCommands::Create { body, parent, .. },
            } => {
                assert_eq!(body, "hello");
                assert_eq!(parent.as_deref(), Some("c-1"));
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(parse(&["comment", "create", "ENG-1"]).is_err());
    }

    #[test]
    fn test_issue_create_flags() {
        let cli = parse(&[
            "issue", "create", "--title", "Bug", "-t", "ENG", "--label", "bug", "--label", "ui",
            "--delegate", "bot", "--project", "123e4567-e89b-12d3-a456-426614174000",
        ])
        .unwrap();
        match cli.command {
            Commands::Issue {
                action: IssueCommands::Create(args),
            } => {
                assert_eq!(args.team, "ENG");
                assert_eq!(args.labels, vec!["bug", "ui"]);
                assert_eq!(args.delegate.as_deref(), Some("bot"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_issue_update_help_mentions_project() {
        let mut cmd = Cli::command();
        let update = cmd
            .find_subcommand_mut("issue")
            .and_then(|c| c.find_subcommand_mut("update"))
            .unwrap();
        // Collapse wrapping so assertions don't depend on terminal width.
        let help = update
            .render_help()
            .to_string()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        assert!(help.contains("--project"));
        assert!(help.contains("Project ID to assign issue to"));
        assert!(help.contains("unassigned"));
        assert!(help.contains("Delegate to agent (email, name, displayName, or 'none' to remove)"));
    }

    #[test]
    fn test_issue_update_short_flags() {
        let cli = parse(&["issue", "update", "ENG-1", "-s", "Done", "-p", "high", "-a", "me"]).unwrap();
        match cli.command {
            Commands::Issue {
                action: IssueCommands::Update { issue_id, args },
            } => {
                assert_eq!(issue_id, "ENG-1");
                assert_eq!(args.state.as_deref(), Some("Done"));
                assert_eq!(args.priority.as_deref(), Some("high"));
                assert_eq!(args.assignee.as_deref(), Some("me"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["comment", "delete", "c-1", "--plaintext", "-vv"]).unwrap();
        assert!(cli.plaintext);
        assert_eq!(cli.verbose, 2);
    }
}
