pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod models;
pub mod services;
pub mod state;

use std::sync::Arc;
use tokio::signal;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
pub use config::Config;
pub use error::{CatalogError, CatalogResult};

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::load()?;
    config.validate()?;

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.general.log_format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    match cli.command {
        Some(Commands::Serve { port }) => run_server(config, port).await,
        Some(Commands::Migrate) => cli::cmd_migrate(&config).await,
        Some(Commands::Init) => cli::cmd_init(),
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}

async fn run_server(mut config: Config, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let api_state = api::create_app_state_from_config(config).await?;
    api_state
        .shared
        .catalog
        .ping()
        .await
        .context("Database ping failed")?;

    let app = api::router(Arc::clone(&api_state));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Web Server running at http://{}", addr);

    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Web server error: {}", e);
        }
    });

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    server.abort();
    info!("Server stopped");

    Ok(())
}
