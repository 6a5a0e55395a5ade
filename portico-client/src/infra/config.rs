use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::domains::auth::errors::StorageError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
    /// Overrides the platform data directory used for the token slot
    pub data_dir: Option<PathBuf>,
    pub timestamp_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            data_dir: None,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

impl Config {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "portico", "portico")
    }

    /// Defaults, then the config file, then environment overrides
    pub fn load() -> Self {
        let mut config = Self::project_dirs()
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
            .and_then(|path| Self::from_file(&path))
            .unwrap_or_default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Read a config file. Missing, unreadable or malformed files yield `None`.
    pub fn from_file(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("[Config] Unable to read {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_str::<Config>(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("[Config] Ignoring malformed {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Apply `PORTICO_*` overrides from the given lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("PORTICO_API_URL") {
            self.api_base_url = url;
        }
        if let Some(raw) = lookup("PORTICO_REQUEST_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => {
                    self.request_timeout = Duration::from_secs(secs)
                }
                _ => log::warn!(
                    "[Config] Ignoring invalid PORTICO_REQUEST_TIMEOUT_SECS '{}'",
                    raw
                ),
            }
        }
        if let Some(dir) = lookup("PORTICO_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Directory holding the persisted token
    pub fn resolve_data_dir(&self) -> Result<PathBuf, StorageError> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        Self::project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or(StorageError::NoDataDir)
    }
}

/// Normalise a user-supplied base URL.
///
/// Many users type "localhost:8080", which reqwest rejects, so a missing
/// scheme gets `http://`. A trailing slash is dropped to avoid `//api`.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    let normalized = if trimmed.starts_with("http://") || trimmed.starts_with("https://")
    {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };
    if normalized != raw {
        log::debug!(
            "[Config] Normalized base URL from '{}' to '{}'",
            raw,
            normalized
        );
    }
    normalized
}

/// Normalise and check that the result is an absolute http(s) URL
pub fn parse_base_url(raw: &str) -> Result<String, String> {
    let normalized = normalize_base_url(raw);
    let url = url::Url::parse(&normalized).map_err(|e| format!("invalid URL '{raw}': {e}"))?;
    if url.host_str().is_none() {
        return Err(format!("invalid URL '{raw}': missing host"));
    }
    Ok(normalized)
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
