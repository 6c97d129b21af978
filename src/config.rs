use crate::correction::{RequestDefaults, DEFAULT_ACCURACY_THRESHOLD, DEFAULT_MAX_ATTEMPTS};
use crate::transport::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "AUDIO_LOOP_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_AUDIO_DIR: &str = "data/audio";
pub const DEFAULT_WORKER_CONCURRENCY: usize = 4;
pub const DEFAULT_VENDOR_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TASK_RETENTION_SECS: u64 = 86_400;
pub const DEFAULT_TRANSPORT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_TRANSPORT_BASE_DELAY_MS: u64 = 500;
pub const DEFAULT_ELEVENLABS_MODEL: &str = "eleven_multilingual_v2";
pub const DEFAULT_OUTPUT_FORMAT: &str = "mp3_44100_128";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Which speech-to-text backend verifies the synthesized audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TranscriberKind {
    #[default]
    #[serde(rename = "whisper")]
    OpenAiWhisper,
    #[serde(rename = "elevenlabs")]
    ElevenLabs,
    #[serde(rename = "whisper-cpp")]
    WhisperCpp,
}

impl TranscriberKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriberKind::OpenAiWhisper => "whisper",
            TranscriberKind::ElevenLabs => "elevenlabs",
            TranscriberKind::WhisperCpp => "whisper-cpp",
        }
    }
}

impl FromStr for TranscriberKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "whisper" | "openai" => Ok(TranscriberKind::OpenAiWhisper),
            "elevenlabs" | "scribe" => Ok(TranscriberKind::ElevenLabs),
            "whisper-cpp" | "whisper.cpp" | "local" => Ok(TranscriberKind::WhisperCpp),
            other => Err(format!("Unknown transcriber: {}", other)),
        }
    }
}

impl fmt::Display for TranscriberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub audio_dir: PathBuf,
    pub worker_concurrency: usize,
    /// How long finished tasks and their audio are kept. `0` keeps them forever.
    pub task_retention_secs: u64,
    pub default_accuracy_threshold: f64,
    pub default_max_attempts: u32,
    pub synthesis_timeout_secs: u64,
    pub transcription_timeout_secs: u64,
    pub transport_max_retries: u32,
    pub transport_base_delay_ms: u64,
    pub elevenlabs_model_id: String,
    pub elevenlabs_output_format: String,
    pub transcriber: TranscriberKind,
    #[serde(skip_serializing)]
    pub elevenlabs_api_key: Option<String>,
    #[serde(skip_serializing)]
    pub openai_api_key: Option<String>,
    pub whisper_cpp_bin: Option<PathBuf>,
    pub whisper_model: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            audio_dir: PathBuf::from(DEFAULT_AUDIO_DIR),
            worker_concurrency: DEFAULT_WORKER_CONCURRENCY,
            task_retention_secs: DEFAULT_TASK_RETENTION_SECS,
            default_accuracy_threshold: DEFAULT_ACCURACY_THRESHOLD,
            default_max_attempts: DEFAULT_MAX_ATTEMPTS,
            synthesis_timeout_secs: DEFAULT_VENDOR_TIMEOUT_SECS,
            transcription_timeout_secs: DEFAULT_VENDOR_TIMEOUT_SECS,
            transport_max_retries: DEFAULT_TRANSPORT_MAX_RETRIES,
            transport_base_delay_ms: DEFAULT_TRANSPORT_BASE_DELAY_MS,
            elevenlabs_model_id: DEFAULT_ELEVENLABS_MODEL.to_string(),
            elevenlabs_output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            transcriber: TranscriberKind::default(),
            elevenlabs_api_key: None,
            openai_api_key: None,
            whisper_cpp_bin: None,
            whisper_model: None,
        }
    }
}

impl AppConfig {
    /// Loads the JSON file named by `AUDIO_LOOP_CONFIG` (or `config.json`),
    /// then applies process environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(&path, |key| std::env::var(key).ok())
    }

    /// A missing file yields defaults; an unreadable or malformed one is an
    /// error.
    pub fn load_from<F>(path: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = if path.exists() {
            let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            serde_json::from_str::<AppConfig>(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            AppConfig::default()
        };

        config.apply_env(lookup)?;
        normalize_config(&mut config);
        Ok(config)
    }

    fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(value) = get("BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Some(value) = get("AUDIO_DIR") {
            self.audio_dir = PathBuf::from(value);
        }
        if let Some(value) = get("WORKER_CONCURRENCY") {
            self.worker_concurrency = parse_env("WORKER_CONCURRENCY", value)?;
        }
        if let Some(value) = get("TASK_RETENTION_SECS") {
            self.task_retention_secs = parse_env("TASK_RETENTION_SECS", value)?;
        }
        if let Some(value) = get("DEFAULT_ACCURACY_THRESHOLD") {
            self.default_accuracy_threshold = parse_env("DEFAULT_ACCURACY_THRESHOLD", value)?;
        }
        if let Some(value) = get("DEFAULT_MAX_ATTEMPTS") {
            self.default_max_attempts = parse_env("DEFAULT_MAX_ATTEMPTS", value)?;
        }
        if let Some(value) = get("SYNTHESIS_TIMEOUT_SECS") {
            self.synthesis_timeout_secs = parse_env("SYNTHESIS_TIMEOUT_SECS", value)?;
        }
        if let Some(value) = get("TRANSCRIPTION_TIMEOUT_SECS") {
            self.transcription_timeout_secs = parse_env("TRANSCRIPTION_TIMEOUT_SECS", value)?;
        }
        if let Some(value) = get("TRANSPORT_MAX_RETRIES") {
            self.transport_max_retries = parse_env("TRANSPORT_MAX_RETRIES", value)?;
        }
        if let Some(value) = get("TRANSPORT_BASE_DELAY_MS") {
            self.transport_base_delay_ms = parse_env("TRANSPORT_BASE_DELAY_MS", value)?;
        }
        if let Some(value) = get("ELEVENLABS_MODEL_ID") {
            self.elevenlabs_model_id = value;
        }
        if let Some(value) = get("ELEVENLABS_OUTPUT_FORMAT") {
            self.elevenlabs_output_format = value;
        }
        if let Some(value) = get("TRANSCRIBER") {
            self.transcriber = parse_env("TRANSCRIBER", value)?;
        }
        if let Some(value) = get("ELEVENLABS_API_KEY") {
            self.elevenlabs_api_key = Some(value);
        }
        if let Some(value) = get("OPENAI_API_KEY") {
            self.openai_api_key = Some(value);
        }
        if let Some(value) = get("WHISPER_CPP_BIN") {
            self.whisper_cpp_bin = Some(PathBuf::from(value));
        }
        if let Some(value) = get("WHISPER_MODEL") {
            self.whisper_model = Some(PathBuf::from(value));
        }

        Ok(())
    }

    pub fn request_defaults(&self) -> RequestDefaults {
        RequestDefaults {
            accuracy_threshold: self.default_accuracy_threshold,
            max_attempts: self.default_max_attempts,
        }
    }

    pub fn synthesis_timeout(&self) -> Duration {
        Duration::from_secs(self.synthesis_timeout_secs)
    }

    pub fn transcription_timeout(&self) -> Duration {
        Duration::from_secs(self.transcription_timeout_secs)
    }

    pub fn task_retention(&self) -> Option<Duration> {
        match self.task_retention_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.transport_max_retries,
            Duration::from_millis(self.transport_base_delay_ms),
        )
    }

    /// Logs the effective configuration with secrets masked.
    pub fn log_summary(&self) {
        tracing::info!(
            bind_addr = %self.bind_addr,
            audio_dir = %self.audio_dir.display(),
            worker_concurrency = self.worker_concurrency,
            task_retention_secs = self.task_retention_secs,
            threshold = self.default_accuracy_threshold,
            max_attempts = self.default_max_attempts,
            transcriber = %self.transcriber,
            elevenlabs_key = %self.elevenlabs_api_key.as_deref().map(mask_api_key).unwrap_or_default(),
            openai_key = %self.openai_api_key.as_deref().map(mask_api_key).unwrap_or_default(),
            "Configuration loaded"
        );
    }
}

fn parse_env<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}

pub fn normalize_threshold(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        value
    } else {
        tracing::warn!(value, "Accuracy threshold out of range, using default");
        DEFAULT_ACCURACY_THRESHOLD
    }
}

fn normalize_config(config: &mut AppConfig) {
    config.default_accuracy_threshold = normalize_threshold(config.default_accuracy_threshold);

    if config.default_max_attempts == 0 {
        tracing::warn!("default_max_attempts must be at least 1, using default");
        config.default_max_attempts = DEFAULT_MAX_ATTEMPTS;
    }
    if config.worker_concurrency == 0 {
        tracing::warn!("worker_concurrency must be at least 1, using default");
        config.worker_concurrency = DEFAULT_WORKER_CONCURRENCY;
    }
    if config.synthesis_timeout_secs == 0 {
        config.synthesis_timeout_secs = DEFAULT_VENDOR_TIMEOUT_SECS;
    }
    if config.transcription_timeout_secs == 0 {
        config.transcription_timeout_secs = DEFAULT_VENDOR_TIMEOUT_SECS;
    }
    if config.bind_addr.trim().is_empty() {
        config.bind_addr = DEFAULT_BIND_ADDR.to_string();
    }
    if config.elevenlabs_model_id.trim().is_empty() {
        config.elevenlabs_model_id = DEFAULT_ELEVENLABS_MODEL.to_string();
    }
    if config.elevenlabs_output_format.trim().is_empty() {
        config.elevenlabs_output_format = DEFAULT_OUTPUT_FORMAT.to_string();
    }
    config.elevenlabs_api_key = normalize_secret(config.elevenlabs_api_key.take());
    config.openai_api_key = normalize_secret(config.openai_api_key.take());
}

fn normalize_secret(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub fn mask_api_key(api_key: &str) -> String {
    let chars: Vec<char> = api_key.chars().collect();
    if chars.len() <= 10 {
        return "******".to_string();
    }

    let prefix: String = chars[..6].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{}********{}", prefix, suffix)
}
