//! Configuration for the reader endpoint, credentials, and scan defaults.
//!
//! Values come from an optional TOML file (`~/.config/feedscout/config.toml`)
//! with environment variables taking precedence; `.env` files are loaded by
//! the binary before this runs. The endpoint and API key are required: a
//! run cannot do anything useful without a reader to subscribe into.

use std::fmt;
use std::path::Path;

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

use crate::discovery::DEFAULT_SCAN_CONCURRENCY;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds the maximum allowed size.
    #[error("Config file too large: {0} bytes (max {1})")]
    TooLarge(u64, u64),

    #[error("RSS reader endpoint must be provided via RSS_READER_ENDPOINT or the config file")]
    MissingEndpoint,

    #[error("RSS reader API key must be provided via RSS_READER_API_KEY or the config file")]
    MissingApiKey,
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Raw config-file shape. All fields optional or defaulted so any subset
/// of keys can be specified; unknown keys are silently ignored.
#[derive(Clone, Deserialize)]
#[serde(default)]
struct FileConfig {
    /// Reader API endpoint (e.g., "https://reader.example.com").
    reader_endpoint: Option<String>,

    /// Reader API key. The RSS_READER_API_KEY env var takes precedence
    /// over the config file.
    reader_api_key: Option<String>,

    /// Default discovery mode: probe only the seed URL's own domain.
    single_url_mode: bool,

    /// Ceiling on concurrently probed domains in traversal mode.
    scan_concurrency: usize,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            reader_endpoint: None,
            reader_api_key: None,
            single_url_mode: false,
            scan_concurrency: DEFAULT_SCAN_CONCURRENCY,
        }
    }
}

/// Resolved application configuration.
///
/// Custom `Debug` impl masks the API key to prevent secret leakage in
/// logs, error messages, and debug output.
#[derive(Clone)]
pub struct Config {
    pub reader_endpoint: String,
    pub reader_api_key: SecretString,
    pub single_url_mode: bool,
    pub scan_concurrency: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("reader_endpoint", &self.reader_endpoint)
            .field("reader_api_key", &"[REDACTED]")
            .field("single_url_mode", &self.single_url_mode)
            .field("scan_concurrency", &self.scan_concurrency)
            .finish()
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from an optional TOML file plus the environment.
    ///
    /// - `path` of `None` (no home directory) → environment only
    /// - Missing file → environment only
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Missing endpoint or API key after merging → error
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => FileConfig::read(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Merge the file config with environment lookups. Environment values
    /// win whenever present and non-empty.
    fn resolve<E>(file: FileConfig, env: E) -> Result<Self, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
    {
        let env_nonempty = |key: &str| env(key).filter(|v| !v.is_empty());

        let reader_endpoint = env_nonempty("RSS_READER_ENDPOINT")
            .or(file.reader_endpoint)
            .ok_or(ConfigError::MissingEndpoint)?;

        let reader_api_key = env_nonempty("RSS_READER_API_KEY")
            .or(file.reader_api_key)
            .map(SecretString::from)
            .ok_or(ConfigError::MissingApiKey)?;

        let single_url_mode = env_nonempty("SINGLE_URL_MODE")
            .map(|v| parse_bool(&v))
            .unwrap_or(file.single_url_mode);

        let scan_concurrency = env_nonempty("SCAN_CONCURRENCY")
            .and_then(|v| v.parse().ok())
            .unwrap_or(file.scan_concurrency)
            .max(1);

        Ok(Self {
            reader_endpoint,
            reader_api_key,
            single_url_mode,
            scan_concurrency,
        })
    }
}

impl FileConfig {
    fn read(path: &Path) -> Result<Self, ConfigError> {
        // Check file size before reading to bound memory use on a
        // corrupted or hostile config file.
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Config::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(meta.len(), Config::MAX_FILE_SIZE));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
            Ok(_) => {}
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse_str(&content)
    }

    fn parse_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(toml::from_str(content)?)
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
