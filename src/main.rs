//! appfront entry point.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use appfront::api::{create_router, AppState};
use appfront::cms::{ContentApi, PonzuClient, QueryOptions, ABOUT, EVENT};
use appfront::config::Config;
use appfront::error::AppError;
use appfront::metrics;
use appfront::render;
use appfront::utils::shutdown_signal;

/// HTML front-end for Ponzu CMS content.
#[derive(Parser, Debug)]
#[command(name = "appfront")]
#[command(about = "Serve About and Event pages from a Ponzu content API")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the front-end (default).
    Serve {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,

        /// Content API base URL (overrides CMS_HOST).
        #[arg(long)]
        cms_host: Option<String>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Fetch About and Event content to check the CMS connection.
    CheckCms,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging. Config errors are reported by the command itself.
    let log_config = load_config().unwrap_or_default();
    let filter = EnvFilter::try_new(log_config.log_filter(args.verbose))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match args.command {
        Some(Command::Serve { port, cms_host }) => cmd_serve(port, cms_host).await,
        Some(Command::CheckConfig) => cmd_check_config().await,
        Some(Command::CheckCms) => cmd_check_cms().await,
        None => cmd_serve(args.port, None).await,
    }
}

fn load_config() -> appfront::Result<Config> {
    Config::load().map_err(AppError::from)
}

/// Check configuration validity.
async fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("APPFRONT - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match load_config() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  CMS Host: {}", config.cms_base_url());
    println!("  Listen: {}", config.listen_addr());
    println!("  HTTP Timeout: {}ms", config.http_timeout_ms);
    println!("  Max Upload: {} bytes", config.max_upload_bytes);
    println!("  Metrics: {}", if config.metrics_enabled { "Enabled" } else { "Disabled" });
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Fetch the About record and the Event list.
async fn cmd_check_cms() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("APPFRONT - CMS CHECK");
    println!("======================================================================");

    let config = load_config()?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    println!("Host: {}", config.cms_base_url());
    println!("======================================================================");

    print!("\n1. Creating client... ");
    let client = PonzuClient::new(&config)?;
    println!("OK");

    print!("\n2. Fetching {} #1... ", ABOUT);
    match client.content(ABOUT, 1).await {
        Ok(response) => match response.data.first() {
            Some(record) => {
                println!("OK");
                println!("   Title: {}", render::display(record.get("title")));
            }
            None => println!("EMPTY"),
        },
        Err(e) => {
            println!("FAILED");
            println!("   Error: {}", e);
        }
    }

    print!("\n3. Fetching all {} records... ", EVENT);
    match client.contents(EVENT, &QueryOptions::all()).await {
        Ok(response) => {
            println!("OK");
            println!("   Total events: {}", response.data.len());
            for record in response.data.iter().take(5) {
                println!(
                    "   - #{} {}",
                    render::display(record.get("id")),
                    render::display(record.get("title"))
                );
            }
            if response.data.len() > 5 {
                println!("   ... and {} more", response.data.len() - 5);
            }
        }
        Err(e) => {
            println!("FAILED");
            println!("   Error: {}", e);
        }
    }

    println!("\n======================================================================");
    println!("CMS CHECK COMPLETED");
    println!("======================================================================");

    Ok(())
}

/// Run the HTTP front-end until shutdown.
async fn cmd_serve(port: Option<u16>, cms_host: Option<String>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let mut config = load_config().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    // Override with CLI args if provided
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(host) = cms_host {
        config.cms_host = host;
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    info!("CMS host: {}", config.cms_base_url());

    let client = PonzuClient::new(&config)?;
    let mut state = AppState::from_config(&config, Arc::new(client));

    if config.metrics_enabled {
        match metrics::install_recorder() {
            Ok(handle) => {
                let upkeep = handle.clone();
                tokio::spawn(async move {
                    let mut interval = tokio::time::interval(Duration::from_secs(5));
                    loop {
                        interval.tick().await;
                        upkeep.run_upkeep();
                    }
                });
                state = state.with_metrics(handle);
            }
            Err(e) => warn!("Metrics disabled, recorder install failed: {}", e),
        }
    }

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
