//! gemini-relay HTTP server
//!
//! Starts an Axum web server that relays prompts and uploads to Gemini.

use clap::Parser;
use gemini_relay::{
    cli::{Cli, Command, generate_config_template},
    config::Config,
    gemini::{GeminiClient, GenerativeModel},
    handlers::AppState,
    routes, telemetry,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Command::Config { output }) = cli.command {
        match output {
            Some(path) => {
                std::fs::write(&path, generate_config_template())?;
                println!("Wrote configuration template to {}", path.display());
            }
            None => print!("{}", generate_config_template()),
        }
        return Ok(());
    }

    // A missing .env is normal in production.
    dotenvy::dotenv().ok();

    let mut config = Config::load(cli.config.as_deref(), |key| std::env::var(key).ok())?;
    if let Some(variant) = cli.variant {
        config.api.variant = variant;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    telemetry::init(&config.observability.log_level);

    tracing::info!(
        variant = %config.api.variant,
        model = %config.gemini.model,
        "Starting gemini-relay on {}:{}",
        config.server.host,
        config.server.port
    );

    let model: Arc<dyn GenerativeModel> = Arc::new(GeminiClient::from_config(&config.gemini));
    let config = Arc::new(config);
    let addr = config.socket_addr()?;

    let state = AppState::new(config.clone(), model)?;
    let app = routes::router(state)?;

    tracing::info!("Listening on {}", addr);
    for spec in routes::table(config.api.variant) {
        tracing::info!("  {} http://{}{}", spec.method(), addr, spec.path);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections");
}
