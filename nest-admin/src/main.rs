//! Nest Admin command line tool
//!
//! Opens the establishment database and runs maintenance commands:
//! - `migrate`: apply pending schema migrations
//! - `health` (default): check connectivity and print record counts

use anyhow::Context;
use clap::{Parser, Subcommand};
use nest_admin::config::Config;
use nest_admin::open_storage;
use nest_admin_storage::migrations::Migrations;
use nest_admin_storage::StorageManager;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Nest Admin maintenance tool
#[derive(Parser)]
#[command(name = "nest-admin")]
#[command(about = "Maintenance commands for the Nest Admin establishment database")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long)]
    config: Option<String>,

    /// Override the database URL
    #[arg(long)]
    database_url: Option<String>,

    /// Log level used when RUST_LOG is not set
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Apply pending schema migrations
    Migrate,
    /// Check connectivity and print record counts
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {path}"))?,
        None => Config::load().context("Failed to load configuration")?,
    };
    apply_cli_overrides(&mut config, &cli);

    let log_filter = format!(
        "nest_admin={level},nest_admin_storage={level}",
        level = config.logging.level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let command = cli.command.unwrap_or(Command::Health);
    let manager = open_storage(&config)
        .await
        .context("Failed to open storage")?;

    let result = match command {
        Command::Migrate => migrate(&manager).await,
        Command::Health => health(&manager).await,
    };
    manager.close().await;

    if let Err(e) = &result {
        error!("Command failed: {e:#}");
    }
    result
}

/// Apply CLI argument overrides to configuration
fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(url) = &cli.database_url {
        config.database.url = url.clone();
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
}

async fn migrate(manager: &StorageManager) -> anyhow::Result<()> {
    let before = Migrations::current_version(manager.pool()).await?;
    manager.migrate().await?;
    let after = Migrations::current_version(manager.pool()).await?;

    match (before, after) {
        (b, a) if b == a => println!("Schema already at version {}", version(a)),
        (b, a) => println!("Schema migrated from {} to {}", version(b), version(a)),
    }
    Ok(())
}

async fn health(manager: &StorageManager) -> anyhow::Result<()> {
    manager
        .health_check()
        .await
        .context("Database health check failed")?;

    println!("Database:          ok");
    if Migrations::needs_migration(manager.pool()).await? {
        let current = Migrations::current_version(manager.pool()).await?;
        println!(
            "Schema version:    {} (latest {}, run `nest-admin migrate`)",
            version(current),
            version(Migrations::latest_version())
        );
        return Ok(());
    }

    let stats = manager.stats().await?;
    println!("Schema version:    {}", version(stats.schema_version));
    println!("Establishments:    {}", stats.establishments_count);
    println!("Addresses:         {}", stats.addresses_count);
    println!("Contacts:          {}", stats.contacts_count);
    println!("Phones:            {}", stats.phones_count);
    println!("Members:           {}", stats.members_count);
    println!("Employees:         {}", stats.employees_count);
    println!("Roles:             {}", stats.roles_count);
    println!("Social platforms:  {}", stats.social_media_count);
    println!("Handlers:          {}", manager.dispatcher().len());
    Ok(())
}

fn version(version: Option<i64>) -> String {
    version.map_or_else(|| "none".to_string(), |v| v.to_string())
}
