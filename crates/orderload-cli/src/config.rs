//! Configuration loading from TOML files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use orderload_core::{ConflictPolicy, DuckDbOptions};
use serde::Deserialize;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "ORDERLOAD_CONFIG";

/// Global configuration for orderload
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub ingest: IngestConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// DuckDB file, or `:memory:`
    #[serde(deserialize_with = "deserialize_env_string")]
    pub path: String,
    pub table: String,
    pub create_table: bool,
    #[serde(deserialize_with = "deserialize_conflict_policy")]
    pub on_conflict: ConflictPolicy,
    pub memory_limit: Option<String>,
    pub threads: Option<usize>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "orders.duckdb".to_string(),
            table: "orders".to_string(),
            create_table: true,
            on_conflict: ConflictPolicy::Fail,
            memory_limit: None,
            threads: None,
        }
    }
}

impl DatabaseConfig {
    pub fn duckdb_options(&self) -> DuckDbOptions {
        DuckDbOptions {
            path: self.path.clone(),
            table: self.table.clone(),
            create_table: self.create_table,
            memory_limit: self.memory_limit.clone(),
            threads: self.threads,
        }
    }
}

/// Raw ingest options; validated when a run starts.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub batch_size: i64,
    pub workers: i64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: orderload_core::config::DEFAULT_BATCH_SIZE as i64,
            workers: orderload_core::config::DEFAULT_WORKERS as i64,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    #[serde(deserialize_with = "deserialize_env_path")]
    pub timings: PathBuf,
    #[serde(deserialize_with = "deserialize_env_path")]
    pub report: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            timings: PathBuf::from("timings.csv"),
            report: PathBuf::from("results.csv"),
        }
    }
}

fn deserialize_env_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    expand_env_vars(&s).map_err(serde::de::Error::custom)
}

fn deserialize_env_path<'de, D>(deserializer: D) -> Result<PathBuf, D::Error>
where
    D: serde::Deserializer<'de>,
{
    deserialize_env_string(deserializer).map(PathBuf::from)
}

fn deserialize_conflict_policy<'de, D>(deserializer: D) -> Result<ConflictPolicy, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    ConflictPolicy::from_name(&s).ok_or_else(|| {
        serde::de::Error::custom(format!(
            "invalid on_conflict {s:?}, expected \"fail\" or \"ignore\""
        ))
    })
}

/// Expand every `${VAR}` in `s` from the environment.
///
/// An unset variable is an error; an unterminated `${` is kept literally.
fn expand_env_vars(s: &str) -> Result<String, String> {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        let name = &rest[start + 2..start + 2 + len];
        let value = std::env::var(name)
            .map_err(|_| format!("environment variable {name} is not set"))?;
        out.push_str(&rest[..start]);
        out.push_str(&value);
        rest = &rest[start + 3 + len..];
    }
    out.push_str(rest);
    Ok(out)
}

impl Config {
    /// Load configuration.
    ///
    /// Search order:
    /// 1. `explicit` (the `--config` flag)
    /// 2. `$ORDERLOAD_CONFIG`
    /// 3. ./orderload.toml
    /// 4. ~/.config/orderload/config.toml
    ///
    /// If no config file is found, returns the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }

        let local_config = PathBuf::from("orderload.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(dirs) = directories::ProjectDirs::from("", "", "orderload") {
            let user_config = dirs.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
