//! # Playback Module
//!
//! Synchronize the two playback channels of a chapter with the word highlight.
//!
//! ## Purpose
//! A chapter can be heard two ways:
//! 1. **Chapter audio** - a prerecorded track of the whole chapter
//! 2. **Verse speech** - one verse read by speech synthesis, with each word
//!    highlighted in turn on a fixed cadence
//!
//! The two never play at once. Starting one stops the other.
//!
//! ## Sub-modules
//! - `types` - PlaybackState, PlaybackEvent, SessionId and collaborator messages
//! - `synchronizer` - The state machine and its collaborator traits
//! - `runtime` - tokio driver that owns the synchronizer and feeds it one queue
//!
//! ## Key Types
//! - [`PlaybackSynchronizer`] - Plain `&mut self` state machine
//! - [`PlaybackState`] - `Idle`, `ChapterAudio` or `VerseSpeech { verse, word }`
//! - [`SessionId`] - Token carried by every asynchronous callback
//! - [`PlaybackHandle`] - Front end of a running driver
//!
//! ## Stale Callbacks
//!
//! Every speech event and timer tick is tagged with the session it was
//! scheduled under. Starting a verse, stopping, a chapter change and teardown
//! all move to a new session and stop the timer before returning, so a late
//! callback from an abandoned utterance is recognized and dropped.
//!
//! The chapter track works the same way with an [`AudioGeneration`]: each
//! `play` or `pause` sent to it carries a new one, and an event tagged with an
//! older generation is the echo of a superseded command.
//!
//! ## Example
//! ```rust
//! use psalter::playback::{
//!     AudioGeneration, ChapterAudio, HighlightTimer, PlaybackState, PlaybackSynchronizer,
//!     SessionId, SpeechEvent, SpeechSettings, SpeechSynthesizer, Utterance,
//! };
//! use psalter::PsalterError;
//! use std::time::Duration;
//!
//! struct Voice;
//! impl SpeechSynthesizer for Voice {
//!     fn is_available(&self) -> bool { true }
//!     fn speak(&mut self, _: Utterance) -> Result<(), PsalterError> { Ok(()) }
//!     fn cancel(&mut self) {}
//! }
//! struct Track;
//! impl ChapterAudio for Track {
//!     fn play(&mut self, _: AudioGeneration) {}
//!     fn pause(&mut self, _: AudioGeneration) {}
//! }
//! struct Timer;
//! impl HighlightTimer for Timer {
//!     fn start(&mut self, _: SessionId, _: Duration) {}
//!     fn stop(&mut self) {}
//! }
//!
//! let mut sync = PlaybackSynchronizer::new(Voice, Track, Timer, SpeechSettings::default());
//! let session = sync.start_verse_speech("בְּרֵאשִׁית בָּרָא", 1).unwrap();
//! sync.handle_speech_event(session, SpeechEvent::Start);
//! assert_eq!(sync.state().highlight(), Some((1, 0)));
//!
//! sync.handle_tick(session);
//! assert_eq!(sync.state().highlight(), Some((1, 1)));
//!
//! sync.handle_speech_event(session, SpeechEvent::End);
//! assert_eq!(sync.state(), PlaybackState::Idle);
//! ```

mod types;
mod synchronizer;
mod runtime;


pub use types::{
    AudioEvent, AudioGeneration, Channel, PlaybackEvent, PlaybackState, SessionId, SpeechEvent,
    SpeechSettings, Utterance, HIGHLIGHT_PERIOD,
};
pub use synchronizer::{ChapterAudio, HighlightTimer, PlaybackSynchronizer, SpeechSynthesizer};
pub use runtime::{EventSink, PlaybackHandle, PlaybackRuntime, TokioTimer};
