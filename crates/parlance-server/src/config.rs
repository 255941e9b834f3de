//! Server configuration loading from file and environment variables.

use parlance_agent::ChatConfig;
use parlance_voice::SpeechConfig;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Speech collaborator settings (STT + TTS).
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Chat-completion collaborator settings.
    #[serde(default)]
    pub chat: ChatConfig,

    /// Audio blob storage settings.
    #[serde(default)]
    pub media: MediaConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Public base URL clients use to reach this server. Media URLs are
    /// built from it.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,

    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled connections.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "parlance_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Audio blob storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// Directory where audio blobs are written. Served under `/media`.
    #[serde(default = "default_media_dir")]
    pub dir: String,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    3000
}

fn default_public_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_db_path() -> String {
    "parlance.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_pool_max_size() -> u32 {
    8
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_media_dir() -> String {
    "media".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_base_url: default_public_base_url(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            dir: default_media_dir(),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `PARLANCE_HOST` overrides `server.host`
/// - `PARLANCE_PORT` overrides `server.port`
/// - `PARLANCE_PUBLIC_BASE_URL` overrides `server.public_base_url`
/// - `PARLANCE_DB_PATH` overrides `database.path`
/// - `PARLANCE_LOG_LEVEL` overrides `logging.level`
/// - `PARLANCE_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `PARLANCE_MEDIA_DIR` overrides `media.dir`
/// - `PARLANCE_STT_URL` / `PARLANCE_TTS_URL` override the speech endpoints
/// - `PARLANCE_SPEECH_API_KEY` overrides `speech.api_key`
/// - `PARLANCE_CHAT_URL` / `PARLANCE_CHAT_API_KEY` / `PARLANCE_CHAT_MODEL`
///   override the corresponding `chat` fields
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    // Environment variable overrides
    if let Ok(host) = std::env::var("PARLANCE_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Ok(port) = std::env::var("PARLANCE_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Ok(url) = std::env::var("PARLANCE_PUBLIC_BASE_URL") {
        config.server.public_base_url = url;
    }
    if let Ok(db_path) = std::env::var("PARLANCE_DB_PATH") {
        config.database.path = db_path;
    }
    if let Ok(level) = std::env::var("PARLANCE_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(json) = std::env::var("PARLANCE_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Ok(dir) = std::env::var("PARLANCE_MEDIA_DIR") {
        config.media.dir = dir;
    }
    if let Ok(url) = std::env::var("PARLANCE_STT_URL") {
        config.speech.stt_url = url;
    }
    if let Ok(url) = std::env::var("PARLANCE_TTS_URL") {
        config.speech.tts_url = url;
    }
    if let Ok(key) = std::env::var("PARLANCE_SPEECH_API_KEY") {
        config.speech.api_key = key;
    }
    if let Ok(url) = std::env::var("PARLANCE_CHAT_URL") {
        config.chat.url = url;
    }
    if let Ok(key) = std::env::var("PARLANCE_CHAT_API_KEY") {
        config.chat.api_key = key;
    }
    if let Ok(model) = std::env::var("PARLANCE_CHAT_MODEL") {
        config.chat.model = model;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_no_file_given() {
        let config = load_config(None).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.path, "parlance.db");
        assert_eq!(config.media.dir, "media");
        assert!(!config.logging.json);
    }

    #[test]
    fn parses_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 8080

            [speech]
            stt_url = "http://stt.local/transcribe"
            tts_url = "http://tts.local/synthesize"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.speech.stt_url, "http://stt.local/transcribe");
        assert_eq!(config.speech.language, "sv-SE");
        assert_eq!(config.chat.timeout_secs, 30);
    }
}
