//! `recipebox` - CLI for the recipebox record store
//!
//! This binary opens the configured documents and runs one operation against
//! them. It stands in for the service bootstrap when operating on the data
//! folder by hand.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::Path;

use anyhow::Context;
use chrono::DateTime;
use clap::Parser;
use tracing::{info, warn};

use recipebox::cli::{
    AddRecipeCommand, Cli, Command, ConfigCommand, OutputFormat, RecipesCommand, UsersCommand,
};
use recipebox::{
    init_logging, Config, LoadOutcome, Recipe, RecordStore, Requester, ServiceContext, StoreStats,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    // Execute the command
    match cli.command {
        Command::Recipes(cmd) => handle_recipes(&open_context(config)?, cmd),
        Command::Users(cmd) => handle_users(&open_context(config)?, cmd),
        Command::Status(cmd) => handle_status(&open_context(config)?, cmd.json),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_context(config: Config) -> anyhow::Result<ServiceContext> {
    let data_folder = config.data_folder();
    ServiceContext::open(config)
        .with_context(|| format!("failed to open documents in {}", data_folder.display()))
}

fn handle_recipes(context: &ServiceContext, cmd: RecipesCommand) -> anyhow::Result<()> {
    match cmd {
        RecipesCommand::List { user, all, format } => {
            let recipes = context.recipes().get(&Requester::new(user), all)?;
            print_recipes(&recipes, format)?;
        }
        RecipesCommand::Add(add) => add_recipe(context, &add)?,
        RecipesCommand::Delete { user, id } => {
            let removed = context.recipes().delete(&Requester::new(user), id)?;
            println!("Deleted recipe {}: {}", removed.id, removed.title);
            if let Some(filename) = &removed.image_filename {
                remove_image(&context.images_folder(), filename);
            }
        }
    }
    Ok(())
}

fn add_recipe(context: &ServiceContext, cmd: &AddRecipeCommand) -> anyhow::Result<()> {
    let requester = Requester::new(cmd.user.clone());
    let recipe = context.recipes().put(&requester, cmd.to_input())?;

    if let Some(filename) = &recipe.image_filename {
        let image = context.images_folder().join(filename);
        if !image.exists() {
            warn!("Recipe {} references missing image {}", recipe.id, image.display());
        }
    }
    println!("Created recipe {}: {}", recipe.id, recipe.title);
    Ok(())
}

fn remove_image(folder: &Path, filename: &str) {
    let path = folder.join(filename);
    match std::fs::remove_file(&path) {
        Ok(()) => info!("Removed image {}", path.display()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!("Image {} was already missing", path.display());
        }
        Err(err) => warn!("Failed to remove image {}: {}", path.display(), err),
    }
}

fn print_recipes(recipes: &[Recipe], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(recipes)?),
        OutputFormat::Plain => {
            for recipe in recipes {
                println!("{} {} ({})", recipe.id, recipe.title, recipe.owner);
            }
        }
        OutputFormat::Table => {
            println!("{:>6}  {:<16}  {:<16}  TITLE", "ID", "CREATED", "OWNER");
            for recipe in recipes {
                println!(
                    "{:>6}  {:<16}  {:<16}  {}",
                    recipe.id,
                    format_timestamp(recipe.timestamp),
                    recipe.owner,
                    recipe.title
                );
            }
            println!();
            println!("{} recipe(s)", recipes.len());
        }
    }
    Ok(())
}

fn format_timestamp(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map_or_else(|| timestamp.to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}

fn handle_users(context: &ServiceContext, cmd: UsersCommand) -> anyhow::Result<()> {
    match cmd {
        UsersCommand::Add {
            name,
            email,
            password,
        } => {
            let user = context.users().create(&name, &email, &password)?;
            println!("Registered user {} <{}>", user.name, user.email);
        }
        UsersCommand::List { format } => {
            let users = context.users().list()?;
            match format {
                OutputFormat::Json => {
                    let listed: Vec<_> = users
                        .iter()
                        .map(|u| serde_json::json!({ "name": u.name, "email": u.email }))
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&listed)?);
                }
                OutputFormat::Plain => {
                    for user in &users {
                        println!("{} <{}>", user.name, user.email);
                    }
                }
                OutputFormat::Table => {
                    println!("{:<16}  EMAIL", "NAME");
                    for user in &users {
                        println!("{:<16}  {}", user.name, user.email);
                    }
                    println!();
                    println!("{} user(s)", users.len());
                }
            }
        }
    }
    Ok(())
}

fn describe_outcome(outcome: &LoadOutcome) -> String {
    match outcome {
        LoadOutcome::Created => "created empty".to_string(),
        LoadOutcome::Loaded { records } => format!("loaded {records} record(s)"),
        LoadOutcome::Recovered {
            backup: Some(path), ..
        } => format!("recovered, invalid copy kept at {}", path.display()),
        LoadOutcome::Recovered { backup: None, .. } => {
            "recovered, invalid copy could not be kept".to_string()
        }
    }
}

fn store_status<R: recipebox::Record>(
    store: &RecordStore<R>,
) -> anyhow::Result<(StoreStats, serde_json::Value)> {
    let stats = store.stats()?;
    let reasons = match store.outcome() {
        LoadOutcome::Recovered { reasons, .. } => reasons.clone(),
        _ => Vec::new(),
    };
    let json = serde_json::json!({
        "path": store.path(),
        "outcome": describe_outcome(store.outcome()),
        "recovery_reasons": reasons,
        "routine_backup": store.routine_backup(),
        "stats": &stats,
    });
    Ok((stats, json))
}

fn handle_status(context: &ServiceContext, json: bool) -> anyhow::Result<()> {
    let (recipe_stats, recipe_json) = store_status(context.recipe_store())?;
    let (user_stats, user_json) = store_status(context.user_store())?;

    if json {
        let status = serde_json::json!({
            "data_folder": context.config().data_folder(),
            "images_folder": context.images_folder(),
            "recipes": recipe_json,
            "users": user_json,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("recipebox status");
        println!("----------------");
        println!("Data folder:   {}", context.config().data_folder().display());
        println!("Images:        {}", context.images_folder().display());
        println!();
        println!("[Recipes]");
        println!("  Document:    {}", context.recipe_store().path().display());
        println!("  Load:        {}", describe_outcome(context.recipe_store().outcome()));
        println!("  Records:     {}", recipe_stats.total_records);
        match recipe_stats.next_id {
            Some(id) => println!("  Next id:     {id}"),
            None => println!("  Next id:     exhausted"),
        }
        println!("  Size:        {} bytes", recipe_stats.document_size_bytes);
        println!();
        println!("[Users]");
        println!("  Document:    {}", context.user_store().path().display());
        println!("  Load:        {}", describe_outcome(context.user_store().outcome()));
        println!("  Records:     {}", user_stats.total_records);
        println!("  Size:        {} bytes", user_stats.document_size_bytes);
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Data folder:        {}", config.data_folder().display());
                println!("  Recipes document:   {}", config.recipes_path().display());
                println!("  Users document:     {}", config.users_path().display());
                println!("  Backup on open:     {}", config.storage.backup_on_open);
                println!();
                println!("[Images]");
                println!("  Folder:             {}", config.images_folder().display());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
