//! # Error Types
//!
//! This module defines all error types for the Psalter engine.
//!
//! ## Error Types
//! - `MarkupError` - Verse markup that the markup reader rejected
//! - `ConfigError` - Invalid YAML engine configuration
//! - `ChapterOutOfRange` - Chapter number outside 1..=150
//! - `SpeechUnavailable` - No speech synthesis in this environment
//! - `SynthesisError` - Speech synthesis failed to start or errored mid-utterance
//! - `InvalidTransition` - A playback command issued from the wrong state
//! - `FetchError` - Transient failure of a text-repository or lexicon collaborator
//! - `PayloadError` - A collaborator answered with something we cannot read
//! - `Disconnected` - The playback driver task is gone
//!
//! None of these is sticky: after any error the engine accepts the next command.
//!
//! ## Usage
//! ```rust
//! use psalter::{EngineConfig, PsalterError};
//!
//! match EngineConfig::from_yaml("speech-rate: 40") {
//!     Err(PsalterError::ConfigError(message)) => eprintln!("bad config: {}", message),
//!     Err(e) => eprintln!("Error: {}", e),
//!     Ok(_) => {}
//! }
//! ```

use thiserror::Error;

use crate::playback::Channel;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PsalterError {
    /// Markup error with the byte offset reported by the reader.
    ///
    /// # Example
    /// ```
    /// # use psalter::PsalterError;
    /// let err = PsalterError::MarkupError {
    ///     position: 12,
    ///     message: "unexpected end of tag".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Markup error at byte 12: unexpected end of tag");
    /// ```
    #[error("Markup error at byte {position}: {message}")]
    MarkupError { position: usize, message: String },

    /// Invalid engine configuration.
    ///
    /// # Example
    /// ```
    /// # use psalter::PsalterError;
    /// let err = PsalterError::ConfigError("highlight-period-ms must be positive".to_string());
    /// assert_eq!(err.to_string(), "Invalid configuration: highlight-period-ms must be positive");
    /// ```
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Chapter {0} is outside the Psalter (1-150)")]
    ChapterOutOfRange(u16),

    /// Speech synthesis is not present. Surfaced to the user as a notice.
    #[error("Text-to-speech is not supported in this environment")]
    SpeechUnavailable,

    #[error("Speech synthesis failed: {0}")]
    SynthesisError(String),

    /// A playback command that is only valid from another channel.
    ///
    /// # Example
    /// ```
    /// # use psalter::{PsalterError, playback::Channel};
    /// let err = PsalterError::InvalidTransition {
    ///     operation: "pause chapter audio",
    ///     channel: Channel::Idle,
    /// };
    /// assert_eq!(err.to_string(), "Cannot pause chapter audio while idle");
    /// ```
    #[error("Cannot {operation} while {channel}")]
    InvalidTransition {
        operation: &'static str,
        channel: Channel,
    },

    #[error("Fetch failed: {0}")]
    FetchError(String),

    #[error("Malformed payload: {0}")]
    PayloadError(String),

    #[error("Playback engine has shut down")]
    Disconnected,
}

impl PsalterError {
    /// Whether the caller should offer a retry affordance.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PsalterError::FetchError(_))
    }
}
