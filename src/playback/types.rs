//! Playback type definitions
//!
//! State, events and collaborator messages shared by the synchronizer and its
//! async driver.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Cadence of the word highlight during verse speech.
///
/// Speech synthesis gives no reliable word boundaries, so the highlight is an
/// open-loop approximation: it advances on wall-clock time, not on the audio.
pub const HIGHLIGHT_PERIOD: Duration = Duration::from_millis(350);

/// Which playback channel is active. At most one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Channel {
    Idle,
    ChapterAudio,
    VerseSpeech,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Idle => write!(f, "idle"),
            Channel::ChapterAudio => write!(f, "chapter audio is playing"),
            Channel::VerseSpeech => write!(f, "a verse is being read"),
        }
    }
}

/// The engine's single playback state. Only the synchronizer writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "channel", rename_all = "camelCase")]
pub enum PlaybackState {
    #[default]
    Idle,
    ChapterAudio,
    #[serde(rename_all = "camelCase")]
    VerseSpeech {
        verse_number: usize,
        /// `None` until the utterance starts.
        highlighted_word: Option<usize>,
    },
}

impl PlaybackState {
    pub fn channel(&self) -> Channel {
        match self {
            PlaybackState::Idle => Channel::Idle,
            PlaybackState::ChapterAudio => Channel::ChapterAudio,
            PlaybackState::VerseSpeech { .. } => Channel::VerseSpeech,
        }
    }

    /// `(verse, word)` currently highlighted, if any.
    pub fn highlight(&self) -> Option<(usize, usize)> {
        match *self {
            PlaybackState::VerseSpeech {
                verse_number,
                highlighted_word: Some(word),
            } => Some((verse_number, word)),
            _ => None,
        }
    }
}

/// Token identifying one verse-speech session.
///
/// Every asynchronous callback carries the token it was scheduled under; a
/// callback whose token is no longer current is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SessionId(pub u64);

impl SessionId {
    pub fn next(self) -> Self {
        SessionId(self.0.wrapping_add(1))
    }
}

/// Token identifying the latest command sent to the chapter track.
///
/// The track tags every event with the newest generation it has been given,
/// so a late echo of an earlier `play` or `pause` is recognized and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub struct AudioGeneration(pub u64);

impl AudioGeneration {
    pub fn next(self) -> Self {
        AudioGeneration(self.0.wrapping_add(1))
    }
}

/// An utterance request for the speech-synthesis collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Utterance {
    pub text: String,
    pub language: String,
    pub rate: f32,
    pub session: SessionId,
}

/// Events reported by speech synthesis for one utterance.
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechEvent {
    Start,
    End,
    Error(String),
}

/// Events reported by the prerecorded chapter track.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    /// Started, possibly from the track's own controls.
    Play,
    Pause,
    Ended,
    Error(String),
}

/// What the rendering surface hears from the synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlaybackEvent {
    /// The active channel changed.
    StateChanged { state: PlaybackState },
    /// A word of the speaking verse is now highlighted.
    #[serde(rename_all = "camelCase")]
    HighlightChanged {
        verse_number: usize,
        word_index: usize,
    },
}

/// Speech settings the synchronizer hands to each utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechSettings {
    pub language: String,
    pub rate: f32,
    pub highlight_period: Duration,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            language: crate::config::DEFAULT_SPEECH_LANGUAGE.to_string(),
            rate: 1.0,
            highlight_period: HIGHLIGHT_PERIOD,
        }
    }
}

impl From<&crate::config::EngineConfig> for SpeechSettings {
    fn from(config: &crate::config::EngineConfig) -> Self {
        Self {
            language: config.speech_language.clone(),
            rate: config.speech_rate,
            highlight_period: config.highlight_period(),
        }
    }
}
