mod config;
mod server;

use clap::{Parser, Subcommand};

use pots_core::seed;
use pots_db::config::DbConfig;
use pots_db::pool;

use config::PotsConfig;

#[derive(Parser)]
#[command(name = "pots", about = "Garden management backend: areas, plots and plants")]
struct Cli {
    /// Database URL (overrides POTS_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a pots config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = DbConfig::DEFAULT_URL)]
        db_url: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Create the database if needed and apply migrations
    DbInit,
    /// Load the sample garden into an empty database
    Seed,
    /// Serve the JSON API
    Serve {
        /// Address to bind (overrides POTS_BIND)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (overrides POTS_PORT)
        #[arg(long)]
        port: Option<u16>,
    },
}

/// Execute the `pots init` command: write config file.
fn cmd_init(db_url: &str, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();
    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        server: config::ServerSection::default(),
    };
    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!();
    println!("Next: run `pots db-init` to create and migrate the database.");
    Ok(())
}

/// Execute the `pots db-init` command: create database and run migrations.
async fn cmd_db_init(resolved: &PotsConfig) -> anyhow::Result<()> {
    println!("Initializing pots database...");

    pool::ensure_database_exists(&resolved.db_config).await?;

    let db_pool = pool::create_pool(&resolved.db_config).await?;
    let result = pool::run_migrations(&db_pool).await;
    if result.is_ok() {
        let counts = pool::table_counts(&db_pool).await?;
        println!("Database ready. Tables:");
        for (table, count) in &counts {
            println!("  {table}: {count} rows");
        }
    }
    db_pool.close().await;
    result?;

    println!("pots db-init complete.");
    Ok(())
}

/// Execute the `pots seed` command.
async fn cmd_seed(resolved: &PotsConfig) -> anyhow::Result<()> {
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    let result = seed::seed(&db_pool).await;
    db_pool.close().await;

    let summary = result?;
    if summary.is_empty() {
        println!("Database already has data; nothing seeded.");
    } else {
        println!(
            "Seeded {} areas, {} plots, {} plant types, {} plants.",
            summary.areas, summary.plots, summary.plant_types, summary.plants
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { db_url, force } => {
            cmd_init(&db_url, force)?;
        }
        Commands::DbInit => {
            let resolved = PotsConfig::resolve(cli.database_url.as_deref(), None, None)?;
            cmd_db_init(&resolved).await?;
        }
        Commands::Seed => {
            let resolved = PotsConfig::resolve(cli.database_url.as_deref(), None, None)?;
            cmd_seed(&resolved).await?;
        }
        Commands::Serve { bind, port } => {
            let resolved =
                PotsConfig::resolve(cli.database_url.as_deref(), bind.as_deref(), port)?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = server::run_serve(db_pool.clone(), &resolved.server).await;
            db_pool.close().await;
            result?;
        }
    }

    Ok(())
}
