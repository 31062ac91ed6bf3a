//! Engine Configuration
//!
//! Tunables shared by the engine components. Loadable from JSON; any
//! field left out takes its default.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::A11yError;
use crate::preferences::DEFAULT_STORAGE_KEY;
use crate::speech::{PITCH_RANGE, RATE_RANGE, VOLUME_RANGE};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Key under which preferences are persisted
    pub storage_key: String,
    /// How long a transient announcement stays in the document
    pub announcement_window_ms: u64,
    /// Max characters of element text quoted in audit messages
    pub excerpt_len: usize,
    /// BCP-47 language for narration requests
    pub default_language: String,
    pub default_rate: f32,
    pub default_pitch: f32,
    pub default_volume: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            announcement_window_ms: 1000,
            excerpt_len: 50,
            default_language: "en-US".to_string(),
            default_rate: 1.0,
            default_pitch: 1.0,
            default_volume: 1.0,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, A11yError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), A11yError> {
        if self.storage_key.trim().is_empty() {
            return Err(A11yError::Config("storageKey must not be empty".into()));
        }
        if self.default_language.trim().is_empty() {
            return Err(A11yError::Config("defaultLanguage must not be empty".into()));
        }
        for (name, value, (min, max)) in [
            ("defaultRate", self.default_rate, RATE_RANGE),
            ("defaultPitch", self.default_pitch, PITCH_RANGE),
            ("defaultVolume", self.default_volume, VOLUME_RANGE),
        ] {
            if !(min..=max).contains(&value) {
                return Err(A11yError::Config(format!("{} {} outside {}..={}", name, value, min, max)));
            }
        }
        Ok(())
    }

    pub fn announcement_window(&self) -> Duration {
        Duration::from_millis(self.announcement_window_ms)
    }

    pub fn with_storage_key(mut self, key: &str) -> Self {
        self.storage_key = key.to_string();
        self
    }

    pub fn with_announcement_window(mut self, window: Duration) -> Self {
        self.announcement_window_ms = window.as_millis() as u64;
        self
    }

    pub fn with_excerpt_len(mut self, len: usize) -> Self {
        self.excerpt_len = len;
        self
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.default_language = language.to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.storage_key, "accessibilityPreferences");
        assert_eq!(config.announcement_window(), Duration::from_secs(1));
        assert_eq!(config.excerpt_len, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{"announcementWindowMs": 250, "defaultLanguage": "es-ES"}"#).unwrap();
        assert_eq!(config.announcement_window(), Duration::from_millis(250));
        assert_eq!(config.default_language, "es-ES");
        assert_eq!(config.excerpt_len, 50);
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(matches!(EngineConfig::from_json("{"), Err(A11yError::Serialization(_))));
        assert!(matches!(
            EngineConfig::from_json(r#"{"defaultRate": 20.0}"#),
            Err(A11yError::Config(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{"storageKey": " "}"#),
            Err(A11yError::Config(_))
        ));
    }
}
