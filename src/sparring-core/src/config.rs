//! Configuration module for loading TOML config files.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::SparringError;
use crate::session::{DEFAULT_TOPIC, Language, Session, Stance, VoiceGender};

/// Endpoint of the hosted demo backend.
pub const DEFAULT_API_URL: &str = "https://mozzic-debate_pal.hf.space";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub session: SessionConfig,
    pub timing: TimingConfig,
    pub remote: RemoteConfig,
}

/// Initial debate settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub topic: String,
    pub stance: Stance,
    pub language: Language,
    pub voice: VoiceGender,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            stance: Stance::default(),
            language: Language::default(),
            voice: VoiceGender::default(),
        }
    }
}

/// Timer interval and simulated delays, in milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub tick_interval_ms: u64,
    pub processing_delay_ms: u64,
    pub restart_delay_ms: u64,
    pub transcription_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            processing_delay_ms: 2000,
            restart_delay_ms: 2000,
            transcription_delay_ms: 1500,
        }
    }
}

impl TimingConfig {
    /// No delays and a 1 ms tick, for driving the controller quickly.
    pub fn instant() -> Self {
        Self {
            tick_interval_ms: 1,
            processing_delay_ms: 0,
            restart_delay_ms: 0,
            transcription_delay_ms: 0,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.processing_delay_ms)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }

    pub fn transcription_delay(&self) -> Duration {
        Duration::from_millis(self.transcription_delay_ms)
    }
}

/// Best-effort backend notification settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub enabled: bool,
    pub api_url: String,
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SparringError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| SparringError::ConfigError(format!("Failed to read config: {}", e)))?;

        Self::from_str(&content)
    }

    /// Load configuration from string content.
    pub fn from_str(content: &str) -> Result<Self, SparringError> {
        let config: Config = toml::from_str(content)
            .map_err(|e| SparringError::ConfigError(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the controller cannot run with.
    pub fn validate(&self) -> Result<(), SparringError> {
        if self.timing.tick_interval_ms == 0 {
            return Err(SparringError::ConfigError(
                "timing.tick_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.remote.enabled && self.remote.api_url.trim().is_empty() {
            return Err(SparringError::ConfigError(
                "remote.api_url must be set when remote is enabled".to_string(),
            ));
        }
        Ok(())
    }

    /// A fresh session carrying the configured defaults.
    pub fn new_session(&self) -> Session {
        Session::new(
            self.session.topic.clone(),
            self.session.stance,
            self.session.language,
            self.session.voice,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.session.topic, DEFAULT_TOPIC);
        assert_eq!(config.timing.tick_interval_ms, 1000);
        assert_eq!(config.timing.processing_delay_ms, 2000);
        assert_eq!(config.timing.restart_delay_ms, 2000);
        assert_eq!(config.timing.transcription_delay_ms, 1500);
        assert!(config.remote.enabled);
        assert_eq!(config.remote.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_partial_config() {
        let config = Config::from_str(
            r#"
[session]
topic = "Remote work should be the default"
stance = "Against"
language = "Hausa"
voice = "Female"

[remote]
enabled = false
"#,
        )
        .unwrap();

        let session = config.new_session();
        assert_eq!(session.topic, "Remote work should be the default");
        assert_eq!(session.stance, Stance::Against);
        assert_eq!(session.language, Language::Hausa);
        assert_eq!(session.voice, VoiceGender::Female);
        assert!(!config.remote.enabled);
        assert_eq!(config.remote.timeout_secs, 10);
        assert_eq!(config.timing.tick_interval_ms, 1000);
    }

    #[test]
    fn test_zero_tick_interval_rejected() {
        let result = Config::from_str("[timing]\ntick_interval_ms = 0\n");
        assert!(matches!(result, Err(SparringError::ConfigError(_))));
    }

    #[test]
    fn test_enabled_remote_needs_url() {
        let result = Config::from_str("[remote]\napi_url = \"  \"\n");
        assert!(matches!(result, Err(SparringError::ConfigError(_))));
        assert!(Config::from_str("[remote]\nenabled = false\napi_url = \"\"\n").is_ok());
    }

    #[test]
    fn test_invalid_enum_rejected() {
        let result = Config::from_str("[session]\nstance = \"Sideways\"\n");
        assert!(matches!(result, Err(SparringError::ConfigError(_))));
    }
}
