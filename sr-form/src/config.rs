use serde::{Deserialize, Serialize};
use shared::ReferenceData;
use sr_client::ClientConfig;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Reference data compiled into the binary, used when no file is configured
pub const DEFAULT_REFERENCE_DATA: &str = include_str!("../reference/default.json");

/// Draft database file name inside the work directory
const DRAFT_DB_FILE: &str = "drafts.redb";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid reference data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Whether an attachment reference must be supplied before submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentPolicy {
    #[default]
    Optional,
    Required,
}

impl FromStr for AttachmentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "optional" => Ok(Self::Optional),
            "required" => Ok(Self::Required),
            other => Err(format!("unknown attachment policy '{other}'")),
        }
    }
}

/// Intake form configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | SR_API_BASE_URL | http://localhost:8000 | ticket service base URL |
/// | SR_REQUEST_TIMEOUT_SECS | 30 | HTTP timeout |
/// | SR_WORK_DIR | ./.sr-intake | directory holding the draft database |
/// | SR_DRAFT_DEBOUNCE_MS | 1000 | autosave debounce window |
/// | SR_ATTACHMENT_POLICY | optional | `optional` or `required` |
/// | SR_REFERENCE_DATA | (built-in) | reference data JSON file |
/// | LOG_LEVEL | info | log level |
/// | LOG_DIR | (none) | rolling log file directory |
#[derive(Debug, Clone)]
pub struct FormConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub work_dir: PathBuf,
    pub draft_debounce_ms: u64,
    pub attachment_policy: AttachmentPolicy,
    pub reference_data_path: Option<PathBuf>,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl FormConfig {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable values fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let attachment_policy = match lookup("SR_ATTACHMENT_POLICY") {
            Some(raw) => raw.parse().unwrap_or_else(|e: String| {
                tracing::warn!("{e}, using optional");
                AttachmentPolicy::Optional
            }),
            None => AttachmentPolicy::default(),
        };

        Self {
            api_base_url: lookup("SR_API_BASE_URL")
                .unwrap_or_else(|| "http://localhost:8000".into()),
            request_timeout_secs: lookup("SR_REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            work_dir: lookup("SR_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./.sr-intake")),
            draft_debounce_ms: lookup("SR_DRAFT_DEBOUNCE_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            attachment_policy,
            reference_data_path: lookup("SR_REFERENCE_DATA").map(PathBuf::from),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_dir: lookup("LOG_DIR"),
        }
    }

    /// Path of the draft database
    pub fn draft_db_path(&self) -> PathBuf {
        self.work_dir.join(DRAFT_DB_FILE)
    }

    pub fn draft_debounce(&self) -> Duration {
        Duration::from_millis(self.draft_debounce_ms)
    }

    /// HTTP client settings for the ticket service
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.api_base_url).with_timeout(self.request_timeout_secs)
    }

    /// Reference data from the configured file, or the built-in copy
    pub fn load_reference_data(&self) -> Result<ReferenceData, ConfigError> {
        match &self.reference_data_path {
            Some(path) => load_reference_file(path),
            None => parse_reference_data(DEFAULT_REFERENCE_DATA),
        }
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Read reference data from a JSON file
pub fn load_reference_file(path: &Path) -> Result<ReferenceData, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_reference_data(&raw)
}

/// Parse reference data; inconsistencies are logged, not rejected
pub fn parse_reference_data(raw: &str) -> Result<ReferenceData, ConfigError> {
    let data: ReferenceData = serde_json::from_str(raw)?;
    for issue in data.consistency_issues() {
        tracing::warn!("Reference data: {issue}");
    }
    Ok(data)
}
