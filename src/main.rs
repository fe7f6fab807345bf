use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pace_agent::api::state::AppState;
use pace_agent::config::AppConfig;
use pace_agent::lookup::find_closest;
use pace_agent::source::{JsonlTable, RowSource, SupabaseTable};

#[derive(Parser)]
#[command(name = "pace-agent")]
#[command(about = "Running pace lookup: nearest VDOT match for a 5k race time")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port number (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Look up the closest pace row for a race time, from the terminal
    Lookup {
        /// Race time ("20", "20:30", "1:02:15", ...)
        value: String,
    },

    /// Print the first rows the configured source yields
    Sample {
        /// How many rows to print
        #[arg(long, default_value = "5")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting pace-agent v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load_or_default(&PathBuf::from(&cli.config))?;
    let source = build_source(&config)?;
    tracing::info!("Row source: {}", source.describe());

    match cli.command {
        Commands::Serve { host, port } => {
            // Log a small sample so a misconfigured source shows up at
            // startup, not on the first query
            match source.fetch_rows(&config.lookup.match_field, 5).await {
                Ok(rows) => {
                    tracing::info!("Fetched {} sample row(s)", rows.len());
                    for (idx, row) in rows.iter().enumerate() {
                        tracing::debug!("[{}] {}", idx + 1, serde_json::to_string(row)?);
                    }
                }
                Err(e) => tracing::warn!("Startup sample fetch failed: {}", e),
            }

            let state = AppState {
                source,
                match_field: config.lookup.match_field.clone(),
                fetch_limit: config.source.fetch_limit,
                cors_origins: config.server.cors_origins.clone(),
            };
            let app = pace_agent::api::build_router(state);

            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Lookup { value } => {
            let rows = match source
                .fetch_rows(&config.lookup.match_field, config.source.fetch_limit)
                .await
            {
                Ok(rows) => rows,
                Err(e) => {
                    tracing::error!("Row fetch failed: {}", e);
                    Vec::new()
                }
            };

            match find_closest(&value, &rows, &config.lookup.match_field) {
                Some(row) => {
                    println!("Closest row for {} ≈ {}:", config.lookup.match_field, value);
                    println!("{}", serde_json::to_string_pretty(row)?);
                }
                None => {
                    println!(
                        "No row found near {} ≈ {}",
                        config.lookup.match_field, value
                    );
                }
            }
        }
        Commands::Sample { limit } => {
            let rows = source
                .fetch_rows(&config.lookup.match_field, limit.max(1))
                .await?;
            println!("Fetched {} row(s) from {}:", rows.len(), source.describe());
            for (idx, row) in rows.iter().enumerate() {
                println!("[{}] {}", idx + 1, serde_json::to_string(row)?);
            }
        }
    }

    Ok(())
}

/// Build the configured row source.
fn build_source(config: &AppConfig) -> Result<Arc<dyn RowSource>> {
    match config.source.backend.as_str() {
        "supabase" => {
            let table = SupabaseTable::new(&config.source.url, &config.source.table)?;
            Ok(Arc::new(table))
        }
        _ => Ok(Arc::new(JsonlTable::new(config.source.path.clone()))),
    }
}
