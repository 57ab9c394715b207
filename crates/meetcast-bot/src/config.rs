//! Bot configuration loading from file and environment variables.

use meetcast_session::{DEFAULT_API_BASE_URL, DEFAULT_JOIN_TIMEOUT, DEFAULT_MEETING_WS_URL};
use meetcast_stream::{FrameSize, Pacing, PlaybackSettings, DEFAULT_FRAME_DELAY};
use meetcast_types::{Credentials, MeetingParams, ValidationError, DEFAULT_FRAME_SIZE};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Top-level bot configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Platform credentials.
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// The meeting and the audio to play into it.
    #[serde(default)]
    pub meeting: MeetingConfig,

    /// Remote endpoints.
    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Framing and pacing.
    #[serde(default)]
    pub stream: StreamConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Clone, Default, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default)]
    pub sdk_key: String,
    #[serde(default)]
    pub sdk_secret: String,
}

impl fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("sdk_key", &self.sdk_key)
            .field("sdk_secret", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeetingConfig {
    /// Meeting number.
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub password: Option<String>,

    /// Path to the MP3 to play.
    #[serde(default)]
    pub audio_path: String,

    /// Look the meeting up over the REST API before joining.
    #[serde(default)]
    pub verify_before_join: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_ws_url")]
    pub ws_url: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Seconds to wait for the join acknowledgement.
    #[serde(default = "default_join_timeout_secs")]
    pub join_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    /// Raw bytes per frame.
    #[serde(default = "default_frame_size")]
    pub frame_size: usize,

    /// Pause after each frame, in milliseconds.
    #[serde(default = "default_frame_delay_ms")]
    pub frame_delay_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "meetcast_stream=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_ws_url() -> String {
    DEFAULT_MEETING_WS_URL.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_join_timeout_secs() -> u64 {
    DEFAULT_JOIN_TIMEOUT.as_secs()
}

fn default_frame_size() -> usize {
    DEFAULT_FRAME_SIZE
}

fn default_frame_delay_ms() -> u64 {
    DEFAULT_FRAME_DELAY.as_millis() as u64
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            api_base_url: default_api_base_url(),
            join_timeout_secs: default_join_timeout_secs(),
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            frame_size: default_frame_size(),
            frame_delay_ms: default_frame_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A required value is absent.
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    /// A value is present but unusable.
    #[error("invalid setting: {0}")]
    Invalid(String),
}

impl From<ValidationError> for ConfigError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Missing(field) => Self::Missing(field),
        }
    }
}

/// Validated inputs for one playback.
#[derive(Debug, Clone)]
pub struct Runtime {
    pub credentials: Credentials,
    pub meeting: MeetingParams,
    pub audio_path: PathBuf,
    pub ws_url: String,
    pub api_base_url: String,
    pub join_timeout: Duration,
    pub settings: PlaybackSettings,
    pub verify_before_join: bool,
}

impl Config {
    /// Checks that every required value is present and builds the typed
    /// runtime inputs.
    pub fn validate(&self) -> Result<Runtime, ConfigError> {
        let creds = &self.credentials;
        let credentials = Credentials::new(
            creds.api_key.as_str(),
            creds.api_secret.as_str(),
            creds.sdk_key.as_str(),
            creds.sdk_secret.as_str(),
        )?;
        let meeting = MeetingParams::new(self.meeting.id.as_str(), self.meeting.password.clone())?;

        if self.meeting.audio_path.trim().is_empty() {
            return Err(ConfigError::Missing("audio_path"));
        }
        if self.endpoint.join_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "join_timeout_secs must be greater than zero".to_string(),
            ));
        }
        let frame_size = FrameSize::new(self.stream.frame_size)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(Runtime {
            credentials,
            meeting,
            audio_path: PathBuf::from(&self.meeting.audio_path),
            ws_url: self.endpoint.ws_url.clone(),
            api_base_url: self.endpoint.api_base_url.clone(),
            join_timeout: Duration::from_secs(self.endpoint.join_timeout_secs),
            settings: PlaybackSettings {
                frame_size,
                pacing: Pacing::new(Duration::from_millis(self.stream.frame_delay_ms)),
            },
            verify_before_join: self.meeting.verify_before_join,
        })
    }
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `ZOOM_API_KEY`, `ZOOM_API_SECRET`, `ZOOM_SDK_KEY`, `ZOOM_SDK_SECRET`
///   override the `credentials` section
/// - `ZOOM_MEETING_ID` overrides `meeting.id`
/// - `ZOOM_MEETING_PASSWORD` overrides `meeting.password`
/// - `AUDIO_FILE_PATH` overrides `meeting.audio_path`
/// - `MEETCAST_WS_URL` overrides `endpoint.ws_url`
/// - `MEETCAST_API_URL` overrides `endpoint.api_base_url`
/// - `MEETCAST_LOG_LEVEL` overrides `logging.level`
/// - `MEETCAST_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Applies overrides looked up through `lookup`.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    let creds = &mut config.credentials;
    for (key, slot) in [
        ("ZOOM_API_KEY", &mut creds.api_key),
        ("ZOOM_API_SECRET", &mut creds.api_secret),
        ("ZOOM_SDK_KEY", &mut creds.sdk_key),
        ("ZOOM_SDK_SECRET", &mut creds.sdk_secret),
        ("ZOOM_MEETING_ID", &mut config.meeting.id),
        ("AUDIO_FILE_PATH", &mut config.meeting.audio_path),
        ("MEETCAST_WS_URL", &mut config.endpoint.ws_url),
        ("MEETCAST_API_URL", &mut config.endpoint.api_base_url),
        ("MEETCAST_LOG_LEVEL", &mut config.logging.level),
    ] {
        if let Some(value) = lookup(key) {
            *slot = value;
        }
    }

    if let Some(password) = lookup("ZOOM_MEETING_PASSWORD") {
        config.meeting.password = Some(password);
    }
    if let Some(json) = lookup("MEETCAST_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
}
