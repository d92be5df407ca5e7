use serde::Deserialize;
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::common::constants::{
    get_supported_apis, CATALOG_FILE_NAME, CSV_FILE_NAME, DEFAULT_USER_AGENT,
};
use crate::common::error::{Result, ScraperError};

pub const CONFIG_PATH_ENV: &str = "WEBINARS_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "webinars.toml";
const DATA_DIR_ENV: &str = "WEBINARS_DATA_DIR";
const PUBLIC_DIR_ENV: &str = "WEBINARS_PUBLIC_DIR";
const PUSHGATEWAY_URL_ENV: &str = "WEBINARS_PUSHGATEWAY_URL";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the persisted catalog and its CSV rendering
    pub data_dir: PathBuf,
    /// Directory holding the copies served to the listing page
    pub public_dir: PathBuf,
    /// Extractors to run, in call order
    pub sources: Vec<String>,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// Pause between detail-page fetches of one source
    pub detail_delay_ms: u64,
    pub log_dir: PathBuf,
    pub pushgateway_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            public_dir: PathBuf::from("public"),
            sources: get_supported_apis().iter().map(|s| s.to_string()).collect(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 60,
            detail_delay_ms: 500,
            log_dir: PathBuf::from("logs"),
            pushgateway_url: None,
        }
    }
}

impl Config {
    /// Load from `$WEBINARS_CONFIG` (or `webinars.toml`), then apply
    /// environment overrides. A missing file means defaults.
    pub fn load() -> Result<Self> {
        let path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load_from(Path::new(&path))?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ScraperError::Config(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                )))
            }
        };

        toml::from_str(&content).map_err(|e| {
            ScraperError::Config(format!("Failed to parse config file '{}': {}", path.display(), e))
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = env::var(DATA_DIR_ENV) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var(PUBLIC_DIR_ENV) {
            self.public_dir = PathBuf::from(dir);
        }
        if let Ok(url) = env::var(PUSHGATEWAY_URL_ENV) {
            if !url.trim().is_empty() {
                self.pushgateway_url = Some(url);
            }
        }
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join(CATALOG_FILE_NAME)
    }

    pub fn public_catalog_path(&self) -> PathBuf {
        self.public_dir.join(CATALOG_FILE_NAME)
    }

    pub fn data_csv_path(&self) -> PathBuf {
        self.data_dir.join(CSV_FILE_NAME)
    }

    pub fn public_csv_path(&self) -> PathBuf {
        self.public_dir.join(CSV_FILE_NAME)
    }
}
