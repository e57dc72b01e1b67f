use serde::{Deserialize, Serialize};
use std::{
    fmt,
    str::FromStr,
    time::{Duration, SystemTime},
};

pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 2500;
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_EXPORT_NAME: &str = "John Doe";
pub const DEFAULT_EXPORT_EMAIL: &str = "john.doe@example.com";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_GEMINI_MODEL: &str = "GEMINI_MODEL";
pub const ENV_GEMINI_BASE_URL: &str = "GEMINI_BASE_URL";

/// Which analysis channels a session samples.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum AnalysisMode {
    Facial,
    Voice,
    #[default]
    Both,
}

impl AnalysisMode {
    pub fn facial_enabled(&self) -> bool {
        matches!(self, AnalysisMode::Facial | AnalysisMode::Both)
    }

    pub fn voice_enabled(&self) -> bool {
        matches!(self, AnalysisMode::Voice | AnalysisMode::Both)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::Facial => "facial",
            AnalysisMode::Voice => "voice",
            AnalysisMode::Both => "both",
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "facial" => Ok(AnalysisMode::Facial),
            "voice" => Ok(AnalysisMode::Voice),
            "both" => Ok(AnalysisMode::Both),
            _ => Err(ConfigError::UnknownAnalysisMode(s.to_owned())),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, ConfigError> {
        let v = value.into();
        if v.trim().is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self(v))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(**redacted**)")
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SampleInterval {
    pub interval_ms: u64,
}

impl SampleInterval {
    pub fn new(interval_ms: u64) -> Result<Self, ConfigError> {
        if interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(Self { interval_ms })
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for SampleInterval {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryCapacity(usize);

impl HistoryCapacity {
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroHistoryCapacity);
        }
        Ok(Self(capacity))
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for HistoryCapacity {
    fn default() -> Self {
        Self(DEFAULT_HISTORY_CAPACITY)
    }
}

/// Endpoint settings for the generative language backend.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerativeConfig {
    pub base_url: String,
    pub model: String,
}

impl GenerativeConfig {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self, ConfigError> {
        let base_url = base_url.into();
        url::Url::parse(&base_url)?;
        Ok(Self {
            base_url,
            model: model.into(),
        })
    }
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEMINI_BASE_URL.to_owned(),
            model: DEFAULT_GEMINI_MODEL.to_owned(),
        }
    }
}

/// Who archives are exported on behalf of.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportIdentity {
    pub name: String,
    pub email: String,
}

impl Default for ExportIdentity {
    fn default() -> Self {
        Self {
            name: DEFAULT_EXPORT_NAME.to_owned(),
            email: DEFAULT_EXPORT_EMAIL.to_owned(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    pub mode: AnalysisMode,
    pub interval: SampleInterval,
    pub history: HistoryCapacity,
    pub api_key: Option<ApiKey>,
    pub generative: GenerativeConfig,
    pub identity: ExportIdentity,
    pub start_time: SystemTime,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("api key must not be empty")]
    EmptyApiKey,
    #[error("sample interval must be > 0 ms")]
    ZeroInterval,
    #[error("history capacity must be > 0")]
    ZeroHistoryCapacity,
    #[error("unknown analysis mode: {0}")]
    UnknownAnalysisMode(String),
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

pub trait Env {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct StdEnv;

impl Env for StdEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MapEnv {
    vars: std::collections::BTreeMap<String, String>,
}

impl MapEnv {
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl Env for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn resolve_api_key(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
) -> Result<Option<ApiKey>, ConfigError> {
    match cli_value {
        Some(v) => Ok(Some(ApiKey::new(v)?)),
        None => match env.var(env_key) {
            Some(v) => Ok(Some(ApiKey::new(v)?)),
            None => Ok(None),
        },
    }
}

pub fn resolve_string_with_default(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
    default: &str,
) -> String {
    match cli_value {
        Some(v) => v,
        None => env.var(env_key).unwrap_or_else(|| default.to_owned()),
    }
}
