// Configuration types module
// Defines all configuration-related data structures

use super::duration::{max_age_from_millis, parse_max_age};
use crate::error::OptionsError;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub serve: StaticConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub access_log: bool,
    /// `combined`, `common`, `json`, or a custom `$variable` pattern
    pub access_log_format: String,
    #[serde(default)]
    pub access_log_file: Option<String>,
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// Connection handling configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Seconds; 0 disables the per-connection timeout
    pub connection_timeout: u64,
    #[serde(default)]
    pub max_connections: Option<u64>,
}

/// Visibility of path segments starting with `.`
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dotfiles {
    /// No special treatment
    Allow,
    /// Respond 403
    Deny,
    /// Pretend the file does not exist
    #[default]
    Ignore,
}

/// A list of names that may also be given as a single string or `false`
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum NameList {
    Toggle(bool),
    One(String),
    Many(Vec<String>),
}

impl NameList {
    /// Expand to the configured names; `true` selects `default`
    pub fn names_or(&self, default: &[&str]) -> Vec<String> {
        match self {
            Self::Toggle(false) => Vec::new(),
            Self::Toggle(true) => default.iter().map(ToString::to_string).collect(),
            Self::One(name) => vec![name.clone()],
            Self::Many(names) => names.clone(),
        }
    }
}

/// Index file names (default `index.html`)
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct IndexSetting(pub NameList);

impl IndexSetting {
    pub fn names(&self) -> Vec<String> {
        self.0.names_or(&["index.html"])
    }
}

impl Default for IndexSetting {
    fn default() -> Self {
        Self(NameList::One("index.html".to_string()))
    }
}

/// Extension fallbacks (default disabled)
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct ExtensionsSetting(pub NameList);

impl ExtensionsSetting {
    pub fn names(&self) -> Vec<String> {
        self.0.names_or(&[])
    }
}

impl Default for ExtensionsSetting {
    fn default() -> Self {
        Self(NameList::Toggle(false))
    }
}

/// `max-age` as milliseconds or a duration string
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum MaxAgeSetting {
    Millis(f64),
    Text(String),
}

impl MaxAgeSetting {
    pub fn to_duration(&self) -> Result<Duration, OptionsError> {
        match self {
            Self::Millis(ms) => Ok(max_age_from_millis(*ms)),
            Self::Text(text) => parse_max_age(text),
        }
    }
}

impl Default for MaxAgeSetting {
    fn default() -> Self {
        Self::Millis(0.0)
    }
}

/// `[serve]` table: the middleware option surface
#[derive(Debug, Deserialize, Clone)]
pub struct StaticConfig {
    pub root: String,
    #[serde(default = "default_true")]
    pub fallthrough: bool,
    #[serde(default = "default_true")]
    pub redirect: bool,
    #[serde(default)]
    pub index: IndexSetting,
    #[serde(default)]
    pub extensions: ExtensionsSetting,
    #[serde(default)]
    pub dotfiles: Dotfiles,
    #[serde(default = "default_true")]
    pub cache_control: bool,
    #[serde(default)]
    pub max_age: MaxAgeSetting,
    #[serde(default)]
    pub immutable: bool,
    #[serde(default = "default_true")]
    pub last_modified: bool,
    #[serde(default = "default_true")]
    pub etag: bool,
    #[serde(default = "default_true")]
    pub accept_ranges: bool,
    #[serde(default)]
    pub gzip_static: bool,
}

#[allow(clippy::missing_const_for_fn)]
fn default_true() -> bool {
    true
}
