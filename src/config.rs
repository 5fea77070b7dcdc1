use std::fs;
use std::time::Duration;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::domain::SearchFilter;
use crate::error::HarvestError;

pub const DEFAULT_CONFIG_FILE: &str = "scopus-harvest.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_STORE_PATH: &str = "scopus_ids.json";
pub const DEFAULT_OUTPUT_DIR: &str = "data";
pub const DEFAULT_SEARCH_COUNT: u32 = 25;

pub const ENV_API_KEY: &str = "ELSEVIER_API_KEY";
pub const ENV_INST_TOKEN: &str = "ELSEVIER_INST_TOKEN";
pub const ENV_TIMEOUT: &str = "SCOPUS_HARVEST_TIMEOUT";
pub const ENV_BATCH_SIZE: &str = "SCOPUS_HARVEST_BATCH_SIZE";
pub const ENV_STORE: &str = "SCOPUS_HARVEST_STORE";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub inst_token: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub batch_size: Option<usize>,
    #[serde(default)]
    pub store_path: Option<Utf8PathBuf>,
    #[serde(default)]
    pub output_dir: Option<Utf8PathBuf>,
    #[serde(default)]
    pub search: Option<SearchEntry>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SearchEntry {
    Query { query: String },
    Filter(SearchFilter),
}

#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub api_key: Option<String>,
    pub inst_token: Option<String>,
    pub timeout: Duration,
    pub batch_size: usize,
    pub store_path: Utf8PathBuf,
    pub output_dir: Utf8PathBuf,
    pub query: String,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            inst_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            batch_size: DEFAULT_BATCH_SIZE,
            store_path: Utf8PathBuf::from(DEFAULT_STORE_PATH),
            output_dir: Utf8PathBuf::from(DEFAULT_OUTPUT_DIR),
            query: SearchFilter::default().to_query(),
        }
    }
}

impl HarvestConfig {
    pub fn require_api_key(&self) -> Result<&str, HarvestError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(HarvestError::MissingApiKey)
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<HarvestConfig, HarvestError> {
        let config_path = match path {
            Some(path) => Utf8PathBuf::from(path),
            None => Utf8PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        let config = if path.is_none() && !config_path.as_std_path().exists() {
            Config::default()
        } else {
            let content = fs::read_to_string(config_path.as_std_path())
                .map_err(|_| HarvestError::ConfigRead(config_path.clone()))?;
            serde_json::from_str(&content)
                .map_err(|err| HarvestError::ConfigParse(err.to_string()))?
        };

        let _ = dotenvy::dotenv();
        Self::resolve_config(config, |key| std::env::var(key).ok())
    }

    pub fn resolve_config<E>(config: Config, env: E) -> Result<HarvestConfig, HarvestError>
    where
        E: Fn(&str) -> Option<String>,
    {
        let defaults = HarvestConfig::default();

        let timeout_secs = match env(ENV_TIMEOUT) {
            Some(value) => parse_env(ENV_TIMEOUT, &value)?,
            None => config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };
        if timeout_secs == 0 {
            return Err(HarvestError::ConfigParse(
                "timeout_secs should be greater than 0".to_string(),
            ));
        }

        let batch_size = match env(ENV_BATCH_SIZE) {
            Some(value) => parse_env(ENV_BATCH_SIZE, &value)?,
            None => config.batch_size.unwrap_or(defaults.batch_size),
        };
        if batch_size == 0 {
            return Err(HarvestError::ConfigParse(
                "batch_size should be greater than 0".to_string(),
            ));
        }

        let store_path = env(ENV_STORE)
            .map(Utf8PathBuf::from)
            .or(config.store_path)
            .unwrap_or(defaults.store_path);

        let query = match config.search {
            Some(SearchEntry::Query { query }) => query,
            Some(SearchEntry::Filter(filter)) => filter.to_query(),
            None => defaults.query,
        };

        Ok(HarvestConfig {
            api_key: env(ENV_API_KEY).or(config.api_key),
            inst_token: env(ENV_INST_TOKEN).or(config.inst_token),
            timeout: Duration::from_secs(timeout_secs),
            batch_size,
            store_path,
            output_dir: config.output_dir.unwrap_or(defaults.output_dir),
            query,
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, HarvestError> {
    value
        .trim()
        .parse()
        .map_err(|_| HarvestError::ConfigParse(format!("{key} has invalid value {value:?}")))
}
