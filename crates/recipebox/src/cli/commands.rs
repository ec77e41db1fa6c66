//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::record::RecipeInput;

/// Recipe commands.
#[derive(Debug, Subcommand)]
pub enum RecipesCommand {
    /// List recipes visible to a user
    List {
        /// User to list recipes for
        #[arg(short, long)]
        user: String,

        /// Include recipes owned by other users
        #[arg(short, long)]
        all: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Add a recipe
    Add(AddRecipeCommand),

    /// Delete a recipe owned by the user
    Delete {
        /// User requesting the deletion
        #[arg(short, long)]
        user: String,

        /// Id of the recipe to delete
        id: i64,
    },
}

/// Arguments for adding a recipe.
#[derive(Debug, Args)]
pub struct AddRecipeCommand {
    /// User the recipe is created for
    #[arg(short, long)]
    pub user: String,

    /// Recipe title
    #[arg(short, long)]
    pub title: String,

    /// Recipe text
    #[arg(short, long)]
    pub body: Option<String>,

    /// Explicit recipe id (allocated when omitted)
    #[arg(long)]
    pub id: Option<i64>,

    /// Creation time in seconds since the epoch (now when omitted)
    #[arg(long)]
    pub timestamp: Option<i64>,

    /// File name of an image in the images folder
    #[arg(short, long, value_name = "FILE")]
    pub image: Option<String>,
}

impl AddRecipeCommand {
    /// Convert the arguments into a recipe input.
    #[must_use]
    pub fn to_input(&self) -> RecipeInput {
        RecipeInput {
            id: self.id,
            title: Some(self.title.clone()),
            body: self.body.clone(),
            timestamp: self.timestamp,
            image_filename: self.image.clone(),
        }
    }
}

/// User account commands.
#[derive(Subcommand)]
pub enum UsersCommand {
    /// Register a user
    Add {
        /// Unique user name
        name: String,

        /// Unique email address
        #[arg(short, long)]
        email: String,

        /// Credential to store for the user
        #[arg(short, long)]
        password: String,
    },

    /// List registered users
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

impl std::fmt::Debug for UsersCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add { name, email, .. } => f
                .debug_struct("Add")
                .field("name", name)
                .field("email", email)
                .field("password", &"<redacted>")
                .finish(),
            Self::List { format } => f.debug_struct("List").field("format", format).finish(),
        }
    }
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}
