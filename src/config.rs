//! Configuration management for gemini-relay
//!
//! Settings come from built-in defaults, an optional TOML file, and then the
//! process environment (`PORT`, `GEMINI_API_KEY`, `NODE_ENV`, `BASE_URL`, ...),
//! in that order.

use crate::error::{AppError, AppResult};
use crate::gemini::client::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Longest upstream deadline accepted in `gemini.request_timeout_seconds`
const MAX_TIMEOUT_SECONDS: u64 = 600;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Largest request body accepted, uploads included
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

/// Gemini API settings
#[derive(Clone, Deserialize, Serialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Upstream deadline. Unset means requests wait as long as Gemini takes.
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            base_url: default_base_url(),
            request_timeout_seconds: None,
        }
    }
}

// Keeps the key out of `{:?}` output and logs.
impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish()
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Cross-origin settings, named after the environment variables that set them
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CorsConfig {
    /// `NODE_ENV`; `"production"` restricts origins to `base_url`
    #[serde(default)]
    pub environment: Option<String>,
    /// `BASE_URL`; the only origin allowed in production
    #[serde(default)]
    pub base_url: Option<String>,
}

impl CorsConfig {
    pub fn is_production(&self) -> bool {
        self.environment.as_deref() == Some("production")
    }
}

/// Which route table the server exposes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// `/generate-text` and the three upload endpoints
    #[default]
    Generate,
    /// `/api/chat` plus the static chat page
    Chat,
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Variant::Generate => write!(f, "generate"),
            Variant::Chat => write!(f, "chat"),
        }
    }
}

impl FromStr for Variant {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generate" => Ok(Variant::Generate),
            "chat" => Ok(Variant::Chat),
            other => Err(AppError::Config(format!(
                "unknown variant '{}' (expected 'generate' or 'chat')",
                other
            ))),
        }
    }
}

/// API surface configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub variant: Variant,
    /// Directory served as static files. Defaults to `public` for the chat variant.
    #[serde(default)]
    pub public_dir: Option<PathBuf>,
    /// Where uploads are written while a request is in flight
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            public_dir: None,
            upload_dir: default_upload_dir(),
        }
    }
}

impl ApiConfig {
    /// Static asset root in effect for this variant, if any
    pub fn static_root(&self) -> Option<&Path> {
        match (&self.public_dir, self.variant) {
            (Some(dir), _) => Some(dir.as_path()),
            (None, Variant::Chat) => Some(Path::new("public")),
            (None, Variant::Generate) => None,
        }
    }
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Expose `GET /metrics`
    #[serde(default)]
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            metrics_enabled: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load, parse, and validate a TOML configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path_display = path.as_ref().display().to_string();
        let config = Self::parse_file(path.as_ref())?;

        config
            .validate()
            .map_err(|e| AppError::ConfigValidationFailed {
                path: path_display,
                reason: e.to_string(),
            })?;

        Ok(config)
    }

    fn parse_file(path: &Path) -> AppResult<Self> {
        let path_display = path.display().to_string();

        let content =
            std::fs::read_to_string(path).map_err(|source| AppError::ConfigFileRead {
                path: path_display.clone(),
                source,
            })?;

        toml::from_str(&content).map_err(|source| AppError::ConfigParseFailed {
            path: path_display,
            source,
        })
    }

    /// Defaults, then the optional file, then the environment, then validation.
    ///
    /// `lookup` resolves environment variables; pass `|k| std::env::var(k).ok()`
    /// in production.
    pub fn load<F>(path: Option<&Path>, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::parse_file(path)?,
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay environment variables. Empty values count as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(port) = get("PORT") {
            self.server.port = port.trim().parse().map_err(|_| {
                AppError::Config(format!("PORT must be a number between 1 and 65535, got '{}'", port))
            })?;
        }
        if let Some(key) = get("GEMINI_API_KEY") {
            self.gemini.api_key = key;
        }
        if let Some(model) = get("GEMINI_MODEL") {
            self.gemini.model = model;
        }
        if let Some(environment) = get("NODE_ENV") {
            self.cors.environment = Some(environment);
        }
        if let Some(base_url) = get("BASE_URL") {
            self.cors.base_url = Some(base_url);
        }
        if let Some(variant) = get("RELAY_VARIANT") {
            self.api.variant = variant.trim().parse()?;
        }
        if let Some(dir) = get("UPLOAD_DIR") {
            self.api.upload_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get("PUBLIC_DIR") {
            self.api.public_dir = Some(PathBuf::from(dir));
        }

        Ok(())
    }

    /// Address the server binds to
    pub fn socket_addr(&self) -> AppResult<SocketAddr> {
        let ip: IpAddr = self.server.host.parse().map_err(|_| {
            AppError::Config(format!("server.host '{}' is not an IP address", self.server.host))
        })?;
        Ok(SocketAddr::from((ip, self.server.port)))
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> AppResult<()> {
        if self.gemini.api_key.trim().is_empty() {
            return Err(AppError::Config(
                "GEMINI_API_KEY is required (set it in the environment or gemini.api_key)"
                    .to_string(),
            ));
        }

        if self.gemini.model.trim().is_empty() {
            return Err(AppError::Config("gemini.model cannot be empty".to_string()));
        }

        if self.server.port == 0 {
            return Err(AppError::Config("server.port cannot be 0".to_string()));
        }

        if self.server.max_upload_bytes == 0 {
            return Err(AppError::Config(
                "server.max_upload_bytes must be greater than 0".to_string(),
            ));
        }

        if let Some(seconds) = self.gemini.request_timeout_seconds
            && (seconds == 0 || seconds > MAX_TIMEOUT_SECONDS)
        {
            return Err(AppError::Config(format!(
                "gemini.request_timeout_seconds must be between 1 and {} (got {})",
                MAX_TIMEOUT_SECONDS, seconds
            )));
        }

        if self.api.upload_dir.as_os_str().is_empty() {
            return Err(AppError::Config("api.upload_dir cannot be empty".to_string()));
        }

        self.socket_addr()?;

        Ok(())
    }
}

impl FromStr for Config {
    type Err = AppError;

    fn from_str(toml_str: &str) -> Result<Self, Self::Err> {
        let config: Config =
            toml::from_str(toml_str).map_err(|source| AppError::ConfigParseFailed {
                path: "<string>".to_string(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }
}
