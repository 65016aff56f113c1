use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use fragsync_core::{ViewKind, ViewProfile};
use fragsync_engine::FetchSettings;
use fragsync_logging::{sync_info, LogDestination};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "fragsync.ron";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("unknown view {0:?}")]
    UnknownView(String),
    #[error("invalid log level {0:?}")]
    InvalidLevel(String),
    #[error("invalid base url {url:?}: {source}")]
    InvalidBaseUrl { url: String, source: url::ParseError },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LogTarget {
    #[default]
    Terminal,
    File,
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub destination: LogTarget,
    pub file: PathBuf,
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            destination: LogTarget::Terminal,
            file: PathBuf::from("fragsync.log"),
            level: "info".to_string(),
        }
    }
}

impl LogConfig {
    pub fn destination(&self) -> LogDestination {
        match self.destination {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File(self.file.clone()),
            LogTarget::Both => LogDestination::Both(self.file.clone()),
        }
    }

    pub fn level(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(&self.level).map_err(|_| ConfigError::InvalidLevel(self.level.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    /// Extra request headers, such as `("Cookie", "sessionid=...")`.
    pub headers: Vec<(String, String)>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let defaults = FetchSettings::default();
        Self {
            connect_timeout_secs: defaults.connect_timeout.as_secs(),
            request_timeout_secs: defaults.request_timeout.as_secs(),
            redirect_limit: defaults.redirect_limit,
            max_bytes: defaults.max_bytes,
            headers: defaults.headers,
        }
    }
}

impl FetchConfig {
    pub fn settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            redirect_limit: self.redirect_limit,
            max_bytes: self.max_bytes,
            headers: self.headers.clone(),
            ..FetchSettings::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    /// Built-in view name or the name of one of `views`.
    pub view: String,
    pub debounce_ms: Option<u64>,
    pub log: LogConfig,
    pub fetch: FetchConfig,
    pub views: Vec<ViewProfile>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/".to_string(),
            view: ViewKind::Sales.name().to_string(),
            debounce_ms: None,
            log: LogConfig::default(),
            fetch: FetchConfig::default(),
            views: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                sync_info!("No config at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Custom profiles shadow built-in views of the same name.
    pub fn profile(&self) -> Result<ViewProfile, ConfigError> {
        let mut profile = self
            .views
            .iter()
            .find(|profile| profile.name == self.view)
            .cloned()
            .or_else(|| ViewKind::from_name(&self.view).map(ViewKind::profile))
            .ok_or_else(|| ConfigError::UnknownView(self.view.clone()))?;
        if let Some(debounce_ms) = self.debounce_ms {
            profile.debounce_ms = debounce_ms;
        }
        Ok(profile)
    }

    pub fn base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            source,
        })
    }
}
