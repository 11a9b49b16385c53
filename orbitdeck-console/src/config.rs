//! Console configuration.
//!
//! Loads configuration from a TOML file with support for environment variable
//! expansion in string values. Variables use `$VAR` or `${VAR}` syntax.
//!
//! # Example Configuration
//!
//! ```toml
//! api_url = "https://panel.example.com/"
//! timeout_secs = 10
//! page_size = 25
//!
//! [[networks]]
//! chain_id = 39713
//! name = "Zora Network"
//! native_symbol = "ETH"
//! explorer_base_url = "https://explorer.zora.energy"
//! rpc_url = "$ZORA_RPC_URL"
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` - Path to configuration file (default: `orbitdeck.toml`)
//! - `ORBITDECK_API_URL` - Override the backend base URL
//! - `ORBITDECK_TIMEOUT_SECS` - Override the request timeout
//! - Any variable referenced by `$VAR` in the config file

use std::path::{Path, PathBuf};
use std::time::Duration;

use orbitdeck::ErrorKind;
use orbitdeck::networks::SupportedChain;
use orbitdeck::table::DEFAULT_PAGE_SIZE;
use orbitdeck_http::constants::DEFAULT_API_URL;
use serde::{Deserialize, Serialize};
use url::Url;

/// Config file used when `CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "orbitdeck.toml";

/// Environment variable overriding [`ConsoleConfig::api_url`].
pub const API_URL_ENV: &str = "ORBITDECK_API_URL";

/// Environment variable overriding [`ConsoleConfig::timeout_secs`].
pub const TIMEOUT_ENV: &str = "ORBITDECK_TIMEOUT_SECS";

/// Errors that can occur while loading the console configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("Failed to read config file {path}: {source}", path = path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`ConsoleConfig`].
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// `api_url` is not an absolute URL.
    #[error("Invalid api_url '{value}': {source}")]
    InvalidApiUrl {
        /// The offending value.
        value: String,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },
    /// An override variable held something unusable.
    #[error("Invalid value for {var}: '{value}'")]
    InvalidOverride {
        /// Variable name.
        var: &'static str,
        /// The offending value.
        value: String,
    },
}

impl ConfigError {
    /// Classifies this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

/// Top-level console configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Backend base URL (default: `http://localhost:3000/`).
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout in seconds. No timeout when absent.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Rows per table page (default: `10`).
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Extra wallet networks merged over the built-in catalog.
    #[serde(default)]
    pub networks: Vec<SupportedChain>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_owned()
}

const fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: None,
            page_size: default_page_size(),
            networks: Vec::new(),
        }
    }
}

impl ConsoleConfig {
    /// Loads configuration from the path given by the `CONFIG` environment
    /// variable, falling back to `orbitdeck.toml` in the current directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or an override
    /// variable is malformed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
        Self::load_from(Path::new(&path))
    }

    /// Loads configuration from a specific file path. A missing file yields
    /// the defaults.
    ///
    /// After loading, all `$VAR` / `${VAR}` references are expanded from the
    /// process environment, then `ORBITDECK_API_URL` and
    /// `ORBITDECK_TIMEOUT_SECS` override the file values.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or an override
    /// variable is malformed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = if path.exists() {
            std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            String::new()
        };
        Self::from_toml_with(&content, |name| std::env::var(name).ok())
    }

    /// Parses `content`, resolving variables through `lookup` instead of the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or an override is malformed.
    pub fn from_toml_with<F>(content: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let expanded = expand_env_vars(content, &lookup);
        let mut config: Self = toml::from_str(&expanded)?;

        if let Some(api_url) = lookup(API_URL_ENV) {
            config.api_url = api_url;
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidOverride {
                    var: TIMEOUT_ENV,
                    value: raw.clone(),
                })?;
            config.timeout_secs = Some(secs);
        }
        config.page_size = config.page_size.max(1);
        Ok(config)
    }

    /// Parses [`api_url`](Self::api_url), adding the trailing slash endpoint
    /// joins rely on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiUrl`] if the value is not a URL.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let normalized = if self.api_url.ends_with('/') {
            self.api_url.clone()
        } else {
            format!("{}/", self.api_url)
        };
        Url::parse(&normalized).map_err(|source| ConfigError::InvalidApiUrl {
            value: self.api_url.clone(),
            source,
        })
    }

    /// Request timeout, if configured.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Expands `$VAR` and `${VAR}` patterns in a string.
///
/// Unresolved variables are left as-is.
fn expand_env_vars<F>(input: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }
        let braced = chars.peek() == Some(&'{');
        if braced {
            chars.next();
        }

        let mut name = String::new();
        let mut closed = false;
        while let Some(&c) = chars.peek() {
            if braced {
                if c == '}' {
                    chars.next();
                    closed = true;
                    break;
                }
            } else if !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            name.push(c);
            chars.next();
        }

        match lookup(&name) {
            Some(value) if !name.is_empty() => result.push_str(&value),
            _ => {
                result.push('$');
                if braced {
                    result.push('{');
                }
                result.push_str(&name);
                if closed {
                    result.push('}');
                }
            }
        }
    }

    result
}
