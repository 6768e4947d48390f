//! Configuration types and loading
//!
//! Values come from environment variables; the server binary loads `.env`
//! first.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// JSON data directory
    pub data: DataConfig,

    /// Uploaded document storage
    pub documents: DocumentsConfig,

    /// Data-access client settings
    pub client: ClientConfig,

    /// Log output
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    /// Directory holding `jobs.json`, `customers.json`, ...
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentsConfig {
    /// Root directory for uploaded files
    pub dir: PathBuf,
    /// Maximum upload size in bytes
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Base URL of the REST API
    pub api_url: String,
    /// URL of the static mock dataset; derived from `api_url` when unset
    pub mock_data_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}', expected text or json", other)),
        }
    }
}

impl ClientConfig {
    pub fn mock_data_url(&self) -> String {
        match &self.mock_data_url {
            Some(url) => url.clone(),
            None => format!("{}/data/mockData.json", self.api_url.trim_end_matches('/')),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                request_timeout_seconds: 60,
            },
            data: DataConfig {
                dir: PathBuf::from("./md.data"),
            },
            documents: DocumentsConfig {
                dir: PathBuf::from("./md.docs"),
                max_upload_bytes: 25 * 1024 * 1024, // 25MB
            },
            client: ClientConfig {
                api_url: "http://localhost:8000".to_string(),
                mock_data_url: None,
            },
            logging: LoggingConfig {
                format: LogFormat::Text,
            },
        }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        // Server
        if let Some(host) = lookup("HOST") {
            config.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.server.port = parse_value("PORT", &port)?;
        }

        // Storage
        if let Some(dir) = lookup("DATA_DIR") {
            config.data.dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("DOCS_DIR") {
            config.documents.dir = PathBuf::from(dir);
        }
        if let Some(size) = lookup("MD_MAX_UPLOAD_BYTES") {
            config.documents.max_upload_bytes = parse_value("MD_MAX_UPLOAD_BYTES", &size)?;
        }

        // Client
        if let Some(url) = lookup("MD_API_URL").or_else(|| lookup("VITE_API_URL")) {
            config.client.api_url = url;
        }
        if let Some(url) = lookup("MD_MOCK_DATA_URL") {
            config.client.mock_data_url = Some(url);
        }

        // Logging
        if let Some(format) = lookup("MD_LOG_FORMAT") {
            config.logging.format = parse_value("MD_LOG_FORMAT", &format)?;
        }

        Ok(config)
    }

    /// Get the server address
    pub fn server_addr(&self) -> std::net::SocketAddr {
        use std::net::SocketAddr;
        let ip: std::net::IpAddr = self.server.host.parse().unwrap_or([0, 0, 0, 0].into());
        SocketAddr::new(ip, self.server.port)
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}
