//! Application configuration loaded from environment variables.

use serde::Deserialize;
use url::Url;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Content API ===
    /// Base URL of the Ponzu content API.
    #[serde(default = "default_cms_host")]
    pub cms_host: String,

    /// Upstream request timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,

    // === Server Configuration ===
    /// Address the HTTP server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum accepted multipart body size in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Install the Prometheus recorder and expose `/metrics`.
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_cms_host() -> String {
    "http://localhost:8080".to_string()
}

fn default_http_timeout_ms() -> u64 {
    10_000
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_upload_bytes() -> usize {
    1024 * 1000 * 4 // 4MB
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cms_host: default_cms_host(),
            http_timeout_ms: default_http_timeout_ms(),
            bind_addr: default_bind_addr(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
            metrics_enabled: default_true(),
            rust_log: default_log_level(),
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        let host = Url::parse(&self.cms_host)
            .map_err(|e| format!("CMS_HOST is not a valid URL: {}", e))?;

        if !matches!(host.scheme(), "http" | "https") {
            return Err("CMS_HOST must use http or https".to_string());
        }

        if self.port == 0 {
            return Err("PORT must be non-zero".to_string());
        }

        if self.max_upload_bytes == 0 {
            return Err("MAX_UPLOAD_BYTES must be non-zero".to_string());
        }

        if self.http_timeout_ms == 0 {
            return Err("HTTP_TIMEOUT_MS must be non-zero".to_string());
        }

        Ok(())
    }

    /// CMS base URL without a trailing slash.
    pub fn cms_base_url(&self) -> &str {
        self.cms_host.trim_end_matches('/')
    }

    /// Log filter directive. `--verbose` or `VERBOSE` turns on debug output
    /// for this crate; otherwise `RUST_LOG` applies.
    pub fn log_filter(&self, verbose: bool) -> String {
        if verbose || self.verbose {
            "appfront=debug,info".to_string()
        } else {
            self.rust_log.clone()
        }
    }

    /// Socket address string the server binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}
