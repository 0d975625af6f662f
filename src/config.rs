//! Centralized configuration management for itkdb-browser

use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Result, Context};

use crate::itkdb::ItkdbApi;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Access code 1 prefilled on the login screen
    pub access_code1: Option<String>,
    /// Access code 2 prefilled on the login screen
    pub access_code2: Option<String>,
    /// Database endpoints
    pub endpoints: Endpoints,
    /// HTTP client configuration
    pub http: HttpConfig,
    /// File receiving tracing output
    pub log_file: PathBuf,
}

/// Where the identity provider and the database API live
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub auth_url: String,
    pub api_url: String,
    pub access_scope: String,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            auth_url: ItkdbApi::AUTH_URL.to_string(),
            api_url: ItkdbApi::API_URL.to_string(),
            access_scope: ItkdbApi::ACCESS_SCOPE.to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: format!("itkdb-browser/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoints = Endpoints {
            auth_url: with_trailing_slash(
                lookup("ITKDB_AUTH_URL").unwrap_or_else(|| ItkdbApi::AUTH_URL.to_string()),
            ),
            api_url: with_trailing_slash(
                lookup("ITKDB_API_URL").unwrap_or_else(|| ItkdbApi::API_URL.to_string()),
            ),
            access_scope: lookup("ITKDB_ACCESS_SCOPE")
                .unwrap_or_else(|| ItkdbApi::ACCESS_SCOPE.to_string()),
        };

        let defaults = HttpConfig::default();
        let http = HttpConfig {
            timeout_seconds: parse_var(&lookup, "ITKDB_BROWSER_HTTP_TIMEOUT_SECONDS")?
                .unwrap_or(defaults.timeout_seconds),
            user_agent: lookup("ITKDB_BROWSER_USER_AGENT").unwrap_or(defaults.user_agent),
        };

        let log_file = lookup("ITKDB_BROWSER_LOG_FILE")
            .unwrap_or_else(|| "./itkdb-browser.log".to_string())
            .into();

        Ok(Config {
            access_code1: lookup("ITKDB_ACCESS_CODE1").filter(|c| !c.is_empty()),
            access_code2: lookup("ITKDB_ACCESS_CODE2").filter(|c| !c.is_empty()),
            endpoints,
            http,
            log_file,
        })
    }

    /// Override the log file location
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = path.into();
        self
    }

    /// Get HTTP timeout as Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    /// Directory and file name of the log file, for the appender
    pub fn log_file_parts(&self) -> (PathBuf, PathBuf) {
        let dir = match self.log_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let name = self
            .log_file
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("itkdb-browser.log"));
        (dir, name)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("ITKDB_AUTH_URL", &self.endpoints.auth_url),
            ("ITKDB_API_URL", &self.endpoints.api_url),
        ] {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(anyhow::anyhow!("{} must be an http(s) URL, got '{}'", name, url));
            }
        }

        if self.http.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("HTTP timeout must be at least one second"));
        }

        let (dir, _) = self.log_file_parts();
        ensure_dir(&dir)
            .with_context(|| format!("Log directory is not usable: {}", dir.display()))?;

        Ok(())
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Err(anyhow::anyhow!("{} does not exist", dir.display()));
    }
    Ok(())
}

fn with_trailing_slash(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

/// Parse a variable from the lookup source as a specific type
fn parse_var<T, F>(lookup: &F, var_name: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match lookup(var_name) {
        Some(val) => val.parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        None => Ok(None),
    }
}
