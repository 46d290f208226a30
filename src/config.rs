//! Application configuration.
//!
//! Configuration is stored as YAML in the platform config directory
//! (`ARCHIEFBEHEER_CONFIG` overrides the location) and includes:
//! - The server's base URL and the paths of the pages and endpoints used
//! - Session credentials copied from a logged-in browser session
//! - Request timeout and form encoding options

use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::controller::submit::ZakenEncoding;
use crate::error::{ArchiefError, Result};

pub const CONFIG_PATH_ENV: &str = "ARCHIEFBEHEER_CONFIG";
pub const BASE_URL_ENV: &str = "ARCHIEFBEHEER_BASE_URL";
pub const SESSION_ID_ENV: &str = "ARCHIEFBEHEER_SESSION_ID";
pub const CSRF_TOKEN_ENV: &str = "ARCHIEFBEHEER_CSRF_TOKEN";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server root, e.g. `https://archief.example.com`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// Session credentials
    #[serde(default)]
    pub auth: AuthConfig,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_remote_timeout")]
    pub remote_timeout: u64,

    /// How selected zaken are encoded in the destruction list form
    #[serde(default)]
    pub zaken_encoding: ZakenEncoding,

    /// Zaaktypes that only need a single reviewer, used when the page does not list them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub short_review_zaaktypes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            endpoints: EndpointsConfig::default(),
            auth: AuthConfig::default(),
            remote_timeout: default_remote_timeout(),
            zaken_encoding: ZakenEncoding::default(),
            short_review_zaaktypes: Vec::new(),
        }
    }
}

fn default_remote_timeout() -> u64 {
    30
}

/// Server paths, relative to the base URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_zaken_path")]
    pub zaken: String,
    #[serde(default = "default_create_list_page")]
    pub create_list_page: String,
    #[serde(default = "default_no_archive_date_page")]
    pub no_archive_date_page: String,
}

fn default_zaken_path() -> String {
    "/vernietigen/_fetch-zaken".to_string()
}

fn default_create_list_page() -> String {
    "/vernietigen/lijsten/toevoegen".to_string()
}

fn default_no_archive_date_page() -> String {
    "/vernietigen/lijsten/zaken-zonder-archiedactiedatum/".to_string()
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            zaken: default_zaken_path(),
            create_list_page: default_create_list_page(),
            no_archive_date_page: default_no_archive_date_page(),
        }
    }
}

/// Session credentials
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("session_id", &self.session_id.as_ref().map(|_| "[REDACTED]"))
            .field("csrf_token", &self.csrf_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        if let Ok(path) = env::var(CONFIG_PATH_ENV)
            && !path.is_empty()
        {
            return PathBuf::from(path);
        }

        ProjectDirs::from("nl", "", "archiefbeheer")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
            .unwrap_or_else(|| PathBuf::from(".archiefbeheer").join("config.yaml"))
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            ArchiefError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config at {}: {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Server base URL from environment or config
    pub fn base_url(&self) -> Result<Url> {
        let raw = env_value(BASE_URL_ENV)
            .or_else(|| self.base_url.clone())
            .ok_or_else(|| {
                ArchiefError::Config(format!(
                    "base URL not configured. Set {BASE_URL_ENV} or run: archiefbeheer config set base_url <url>"
                ))
            })?;
        let url = Url::parse(&raw)
            .map_err(|e| ArchiefError::Config(format!("invalid base URL '{raw}': {e}")))?;
        if url.cannot_be_a_base() {
            return Err(ArchiefError::Config(format!(
                "base URL '{raw}' cannot be used as a base"
            )));
        }
        Ok(url)
    }

    /// Resolve a server path (or absolute URL) against the base URL
    pub fn resolve(&self, path: &str) -> Result<Url> {
        Ok(self.base_url()?.join(path)?)
    }

    /// Session cookie value from environment or config
    pub fn session_id(&self) -> Option<String> {
        env_value(SESSION_ID_ENV).or_else(|| self.auth.session_id.clone())
    }

    /// CSRF token from environment or config
    pub fn csrf_token(&self) -> Option<String> {
        env_value(CSRF_TOKEN_ENV).or_else(|| self.auth.csrf_token.clone())
    }
}

fn env_value(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}
