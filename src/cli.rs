//! Command-line interface for gemini-relay
//!
//! Provides argument parsing and subcommand handling for the gemini-relay binary.

use crate::config::Variant;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// HTTP relay between web clients and the Gemini API
#[derive(Parser)]
#[command(name = "gemini-relay")]
#[command(version)]
#[command(about = "HTTP relay between web clients and the Gemini API")]
#[command(
    long_about = "gemini-relay forwards text prompts and uploaded media to Gemini and \
    returns the generated text as JSON. The `generate` variant exposes text, image, \
    document, and audio endpoints; the `chat` variant serves a chat page and /api/chat."
)]
pub struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Which set of endpoints to serve (overrides RELAY_VARIANT)
    #[arg(long, value_enum)]
    pub variant: Option<Variant>,

    /// Port to listen on (overrides PORT)
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# gemini-relay configuration
#
# Every value here can be overridden from the environment; a `.env` file in
# the working directory is loaded first.

[server]
# IP address to bind to (0.0.0.0 for all interfaces, 127.0.0.1 for localhost only)
host = "0.0.0.0"

# Port to listen on (env: PORT)
port = 3000

# Largest request body accepted, uploads included, in bytes
max_upload_bytes = 20971520

[gemini]
# API key for generativelanguage.googleapis.com (env: GEMINI_API_KEY)
api_key = "your-api-key"

# Model used for every request (env: GEMINI_MODEL)
model = "gemini-1.5-flash"

# Upstream deadline in seconds, 1-600. Leave unset to wait as long as Gemini takes.
# request_timeout_seconds = 60

[cors]
# "production" restricts cross-origin requests to base_url (env: NODE_ENV)
# environment = "production"

# Only origin allowed in production (env: BASE_URL)
# base_url = "https://chat.example.com"

[api]
# "generate" for the media endpoints, "chat" for the chat page (env: RELAY_VARIANT)
variant = "generate"

# Where uploads are staged while a request is in flight (env: UPLOAD_DIR)
upload_dir = "uploads"

# Static files served for unmatched paths; the chat variant defaults to "public" (env: PUBLIC_DIR)
# public_dir = "public"

[observability]
# Log level: "trace", "debug", "info", "warn", "error"
log_level = "info"

# Expose Prometheus metrics at /metrics
metrics_enabled = false
"#
}
