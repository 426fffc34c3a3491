use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lowdown::api::ApiServer;
use lowdown::config::Config;
use lowdown::scrape::HttpScraper;
use lowdown::store::Store;
use lowdown::summarize::StubSummarizer;

#[derive(Parser)]
#[command(
    name = "lowdown",
    version,
    about = "Backend API for The Lowdown, a defense and aviation newsletter",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Address to bind to (overrides config)
        #[arg(short, long)]
        bind: Option<String>,

        /// SQLite database path (overrides config)
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Path to a TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Create the database schema and exit
    InitDb {
        /// SQLite database path
        #[arg(short, long, default_value = "data/lowdown.db")]
        database: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_format, cli.verbose)?;

    match cli.command {
        Commands::Serve {
            bind,
            database,
            config,
        } => {
            serve(bind, database, config).await?;
        }

        Commands::InitDb { database } => {
            Store::open(&database)?;
            println!("Database initialized at {}", database.display());
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("lowdown=debug,tower_http=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("lowdown=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    Ok(())
}

async fn serve(
    bind: Option<String>,
    database: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => Config::from_file(&path)?,
        None => Config::from_env()?,
    };

    if let Some(bind) = bind {
        config.server.bind_address = bind.parse()?;
    }
    if let Some(database) = database {
        config.database.sqlite_path = database;
    }
    config.validate()?;

    tracing::info!(
        bind = %config.server.bind_address,
        database = %config.database.sqlite_path.display(),
        "The Lowdown API server starting"
    );

    let store = Arc::new(Store::open(&config.database.sqlite_path)?);
    let scraper = Arc::new(HttpScraper::new(&config.scraper)?);
    let server = ApiServer::new(config.server, store, scraper, Arc::new(StubSummarizer));

    server
        .start_with_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
