//! # Engine Configuration
//!
//! YAML settings for the playback engine. Every key is optional:
//!
//! ```yaml
//! highlight-period-ms: 350
//! speech-language: he-IL
//! speech-rate: 1.0
//! chapter-audio-url: "https://mechon-mamre.org/mp3/t26{chapter}.mp3"
//! ```
//!
//! `{chapter}` in the audio URL is replaced by the chapter number, zero-padded
//! to two digits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PsalterError;
use crate::playback::HIGHLIGHT_PERIOD;
use crate::verse::check_chapter;

pub const DEFAULT_SPEECH_LANGUAGE: &str = "he-IL";
pub const DEFAULT_CHAPTER_AUDIO_URL: &str = "https://mechon-mamre.org/mp3/t26{chapter}.mp3";

const MIN_SPEECH_RATE: f32 = 0.1;
const MAX_SPEECH_RATE: f32 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Cadence of the open-loop word highlight.
    pub highlight_period_ms: u64,
    /// BCP 47 tag handed to speech synthesis.
    pub speech_language: String,
    pub speech_rate: f32,
    pub chapter_audio_url: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            highlight_period_ms: HIGHLIGHT_PERIOD.as_millis() as u64,
            speech_language: DEFAULT_SPEECH_LANGUAGE.to_string(),
            speech_rate: 1.0,
            chapter_audio_url: DEFAULT_CHAPTER_AUDIO_URL.to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate YAML settings.
    ///
    /// # Example
    /// ```rust
    /// use psalter::EngineConfig;
    ///
    /// let config = EngineConfig::from_yaml("highlight-period-ms: 420").unwrap();
    /// assert_eq!(config.highlight_period().as_millis(), 420);
    /// assert_eq!(config.speech_language, "he-IL");
    /// ```
    pub fn from_yaml(content: &str) -> Result<Self, PsalterError> {
        // An empty document is null, not a mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: EngineConfig = serde_yaml::from_str(content)
            .map_err(|e| PsalterError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PsalterError> {
        if self.highlight_period_ms == 0 {
            return Err(PsalterError::ConfigError(
                "highlight-period-ms must be positive".to_string(),
            ));
        }
        if !(MIN_SPEECH_RATE..=MAX_SPEECH_RATE).contains(&self.speech_rate) {
            return Err(PsalterError::ConfigError(format!(
                "speech-rate must be between {} and {}, got {}",
                MIN_SPEECH_RATE, MAX_SPEECH_RATE, self.speech_rate
            )));
        }
        if self.speech_language.trim().is_empty() {
            return Err(PsalterError::ConfigError(
                "speech-language must not be empty".to_string(),
            ));
        }
        if !self.chapter_audio_url.contains("{chapter}") {
            return Err(PsalterError::ConfigError(
                "chapter-audio-url must contain {chapter}".to_string(),
            ));
        }
        Ok(())
    }

    pub fn highlight_period(&self) -> Duration {
        Duration::from_millis(self.highlight_period_ms)
    }

    /// Resolve the prerecorded track for a chapter.
    ///
    /// # Example
    /// ```rust
    /// use psalter::EngineConfig;
    ///
    /// let config = EngineConfig::default();
    /// assert_eq!(
    ///     config.chapter_audio_url(3).unwrap(),
    ///     "https://mechon-mamre.org/mp3/t2603.mp3"
    /// );
    /// ```
    pub fn chapter_audio_url(&self, chapter: u16) -> Result<String, PsalterError> {
        check_chapter(chapter)?;
        Ok(self
            .chapter_audio_url
            .replace("{chapter}", &format!("{:02}", chapter)))
    }
}
