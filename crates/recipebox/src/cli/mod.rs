//! Command-line interface for recipebox.
//!
//! This module provides the CLI structure for the `recipebox` operator
//! binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddRecipeCommand, ConfigCommand, OutputFormat, RecipesCommand, StatusCommand, UsersCommand,
};

use crate::logging::Verbosity;

/// recipebox - Inspect and edit the recipe and user documents
///
/// Opens the YAML documents in the configured data folder, recovering any
/// that fail validation, and runs one operation against them.
#[derive(Debug, Parser)]
#[command(name = "recipebox")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List, add or delete recipes
    #[command(subcommand)]
    Recipes(RecipesCommand),

    /// Register or list users
    #[command(subcommand)]
    Users(UsersCommand),

    /// Show document status
    Status(StatusCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "recipebox");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(parse(&["recipebox", "status"]).verbosity(), Verbosity::Normal);
        assert_eq!(
            parse(&["recipebox", "-v", "status"]).verbosity(),
            Verbosity::Verbose
        );
        assert_eq!(
            parse(&["recipebox", "-vv", "status"]).verbosity(),
            Verbosity::Trace
        );
        assert_eq!(
            parse(&["recipebox", "-q", "status"]).verbosity(),
            Verbosity::Quiet
        );
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["recipebox", "-c", "/custom/config.toml", "status"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_recipes_list() {
        let cli = parse(&["recipebox", "recipes", "list", "--user", "alice", "--all"]);
        match cli.command {
            Command::Recipes(RecipesCommand::List { user, all, format }) => {
                assert_eq!(user, "alice");
                assert!(all);
                assert_eq!(format, OutputFormat::Table);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_recipes_add() {
        let cli = parse(&[
            "recipebox", "recipes", "add", "-u", "alice", "-t", "Soup", "--id", "4", "--image",
            "4_ab.png",
        ]);
        let Command::Recipes(RecipesCommand::Add(cmd)) = cli.command else {
            panic!("expected recipes add");
        };
        assert_eq!(cmd.user, "alice");
        assert_eq!(cmd.id, Some(4));
        assert_eq!(cmd.image.as_deref(), Some("4_ab.png"));
        assert_eq!(cmd.body, None);
    }

    #[test]
    fn test_parse_recipes_delete() {
        let cli = parse(&["recipebox", "recipes", "delete", "--user", "bob", "12"]);
        assert!(matches!(
            cli.command,
            Command::Recipes(RecipesCommand::Delete { id: 12, .. })
        ));
    }

    #[test]
    fn test_parse_users_add() {
        let cli = parse(&[
            "recipebox", "users", "add", "alice", "--email", "a@x", "--password", "pw",
        ]);
        assert!(matches!(cli.command, Command::Users(UsersCommand::Add { .. })));
    }

    #[test]
    fn test_parse_users_list_json() {
        let cli = parse(&["recipebox", "users", "list", "--format", "json"]);
        assert!(matches!(
            cli.command,
            Command::Users(UsersCommand::List {
                format: OutputFormat::Json
            })
        ));
    }

    #[test]
    fn test_parse_config_validate() {
        let cli = parse(&["recipebox", "config", "validate", "--file", "x.toml"]);
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }

    #[test]
    fn test_add_requires_title() {
        let result = Cli::try_parse_from(["recipebox", "recipes", "add", "--user", "alice"]);
        assert!(result.is_err());
    }
}
