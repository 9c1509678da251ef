//! ETL configuration with per-field source tracking.
//!
//! Resolution order: built-in default, then the TOML file named by
//! `HANDFACT_CONFIG`, then `HANDFACT_*` environment variables, then
//! command-line flags.

use serde::{Deserialize, Serialize};
use std::fs;

pub const MIN_RUNTIME_MS: u64 = 800;
pub const MAX_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EtlConfig {
    pub database: String,
    pub max_runtime_ms: u64,
    pub max_hands_per_run: u32,
    pub page_size: u32,
    pub relay: bool,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            database: "data/handfact.sqlite".into(),
            max_runtime_ms: 2200,
            max_hands_per_run: 12,
            page_size: 50,
            relay: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
    Cli,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub database: ValueSource,
    pub max_runtime_ms: ValueSource,
    pub max_hands_per_run: ValueSource,
    pub page_size: ValueSource,
    pub relay: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            database: ValueSource::Default,
            max_runtime_ms: ValueSource::Default,
            max_hands_per_run: ValueSource::Default,
            page_size: ValueSource::Default,
            relay: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: EtlConfig,
    pub sources: ConfigSources,
}

/// Command-line values that take precedence over every other layer.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub database: Option<String>,
    pub max_runtime_ms: Option<u64>,
    pub max_hands_per_run: Option<u32>,
    pub page_size: Option<u32>,
    pub no_relay: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "cannot parse config file: {}", e),
            ConfigError::Invalid(msg) => write!(f, "{}", msg),
        }
    }
}

pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    load_with_overrides(&Overrides::default())
}

pub fn load_with_overrides(overrides: &Overrides) -> Result<ConfigResolved, ConfigError> {
    let mut cfg = EtlConfig::default();
    let mut sources = ConfigSources::default();

    if let Ok(path) = std::env::var("HANDFACT_CONFIG")
        && !path.is_empty()
    {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.database {
            cfg.database = v;
            sources.database = ValueSource::File;
        }
        if let Some(v) = f.max_runtime_ms {
            cfg.max_runtime_ms = v;
            sources.max_runtime_ms = ValueSource::File;
        }
        if let Some(v) = f.max_hands_per_run {
            cfg.max_hands_per_run = v;
            sources.max_hands_per_run = ValueSource::File;
        }
        if let Some(v) = f.page_size {
            cfg.page_size = v;
            sources.page_size = ValueSource::File;
        }
        if let Some(v) = f.relay {
            cfg.relay = v;
            sources.relay = ValueSource::File;
        }
    }

    if let Ok(db) = std::env::var("HANDFACT_DB")
        && !db.is_empty()
    {
        cfg.database = db;
        sources.database = ValueSource::Env;
    }
    if let Ok(ms) = std::env::var("HANDFACT_MAX_RUNTIME_MS")
        && !ms.is_empty()
    {
        cfg.max_runtime_ms = ms
            .parse()
            .map_err(|_| ConfigError::Invalid("Invalid max_runtime_ms".into()))?;
        sources.max_runtime_ms = ValueSource::Env;
    }
    if let Ok(n) = std::env::var("HANDFACT_MAX_HANDS_PER_RUN")
        && !n.is_empty()
    {
        cfg.max_hands_per_run = n
            .parse()
            .map_err(|_| ConfigError::Invalid("Invalid max_hands_per_run".into()))?;
        sources.max_hands_per_run = ValueSource::Env;
    }
    if let Ok(n) = std::env::var("HANDFACT_PAGE_SIZE")
        && !n.is_empty()
    {
        cfg.page_size = n
            .parse()
            .map_err(|_| ConfigError::Invalid("Invalid page_size".into()))?;
        sources.page_size = ValueSource::Env;
    }
    if let Ok(relay) = std::env::var("HANDFACT_RELAY")
        && !relay.is_empty()
    {
        cfg.relay =
            parse_bool(&relay).ok_or_else(|| ConfigError::Invalid("Invalid relay".into()))?;
        sources.relay = ValueSource::Env;
    }

    if let Some(v) = &overrides.database {
        cfg.database = v.clone();
        sources.database = ValueSource::Cli;
    }
    if let Some(v) = overrides.max_runtime_ms {
        cfg.max_runtime_ms = v;
        sources.max_runtime_ms = ValueSource::Cli;
    }
    if let Some(v) = overrides.max_hands_per_run {
        cfg.max_hands_per_run = v;
        sources.max_hands_per_run = ValueSource::Cli;
    }
    if let Some(v) = overrides.page_size {
        cfg.page_size = v;
        sources.page_size = ValueSource::Cli;
    }
    if overrides.no_relay {
        cfg.relay = false;
        sources.relay = ValueSource::Cli;
    }

    cfg.max_runtime_ms = cfg.max_runtime_ms.max(MIN_RUNTIME_MS);
    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    #[serde(default)]
    database: Option<String>,
    #[serde(default)]
    max_runtime_ms: Option<u64>,
    #[serde(default)]
    max_hands_per_run: Option<u32>,
    #[serde(default)]
    page_size: Option<u32>,
    #[serde(default)]
    relay: Option<bool>,
}

fn validate(cfg: &EtlConfig) -> Result<(), ConfigError> {
    if cfg.database.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "Invalid configuration: database must not be empty".into(),
        ));
    }
    if cfg.max_hands_per_run == 0 {
        return Err(ConfigError::Invalid(
            "Invalid configuration: max_hands_per_run must be >=1".into(),
        ));
    }
    if cfg.page_size == 0 || cfg.page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::Invalid(format!(
            "Invalid configuration: page_size must be within 1..={}",
            MAX_PAGE_SIZE
        )));
    }
    Ok(())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate(&EtlConfig::default()).is_ok());
    }

    #[test]
    fn page_size_bounds() {
        let cfg = EtlConfig {
            page_size: 51,
            ..Default::default()
        };
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn bool_spellings() {
        assert_eq!(parse_bool("ON"), Some(true));
        assert_eq!(parse_bool("no"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
