//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$MBOXSFT_CONFIG` (environment variable)
//! 2. `~/.config/mboxsft/config.toml` (Linux/macOS)
//!    `%APPDATA%\mboxsft\config.toml` (Windows)
//! 3. Built-in defaults
//!
//! Command-line flags always win over values read from the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default output file name, relative to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "gmail_sft_instruct.jsonl";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Pair selection policy.
    pub extract: ExtractConfig,
    /// Output and console preview.
    pub output: OutputConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

/// Pair selection policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Owner address used to recognise your own replies. Empty = must be given on the CLI.
    pub my_email: String,
    /// Minimum reply length in characters (inclusive).
    pub min_chars: usize,
    /// Maximum reply length in characters (inclusive).
    pub max_chars: usize,
}

/// Output and console preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// JSONL destination.
    pub path: PathBuf,
    /// Number of records shown in the console preview.
    pub preview_count: usize,
    /// Maximum displayed characters per preview field.
    pub preview_width: usize,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            log_level: "warn".to_string(),
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            my_email: String::new(),
            min_chars: 40,
            max_chars: 4000,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            preview_count: 3,
            preview_width: 200,
        }
    }
}

// ── Load ────────────────────────────────────────────────────────

/// A config file that exists but could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Load configuration, searching standard locations.
///
/// Falls back to the defaults when no file is found. A file that cannot be
/// read or parsed also yields the defaults, together with the error so the
/// caller can report it once logging is up.
pub fn load_config() -> (Config, Option<ConfigError>) {
    match config_file_path() {
        Some(path) if path.exists() => match load_config_from(&path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (Config::default(), Some(e)),
        },
        _ => (Config::default(), None),
    }
}

/// Read and parse one config file.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a TOML document into a [`Config`]; missing keys take their defaults.
pub fn parse_config(contents: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(contents)
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("MBOXSFT_CONFIG") {
        return Some(PathBuf::from(env_path));
    }
    dirs::config_dir().map(|d| d.join("mboxsft").join("config.toml"))
}

/// Return the cache directory used for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mboxsft")
}

/// Return the log file path.
pub fn log_file_path(config: &Config) -> PathBuf {
    cache_dir(config).join("mboxsft.log")
}
