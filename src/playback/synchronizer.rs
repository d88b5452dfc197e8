//! Playback synchronizer
//!
//! A finite-state machine over [`PlaybackState`] that keeps chapter audio and
//! verse speech mutually exclusive and drives the word highlight from a
//! fixed-cadence timer.
//!
//! The synchronizer never blocks and never spawns. Collaborators report back
//! through [`PlaybackSynchronizer::handle_speech_event`],
//! [`PlaybackSynchronizer::handle_tick`] and
//! [`PlaybackSynchronizer::handle_audio_event`]; the caller is responsible for
//! delivering those on one queue (see the `runtime` module).

use std::time::Duration;

use crate::error::PsalterError;

use super::types::{
    AudioEvent, AudioGeneration, Channel, PlaybackEvent, PlaybackState, SessionId, SpeechEvent,
    SpeechSettings, Utterance,
};

/// Speech-synthesis collaborator.
pub trait SpeechSynthesizer {
    /// `false` when the environment has no speech synthesis at all.
    fn is_available(&self) -> bool;
    /// Queue an utterance; start/end/error come back tagged with its session.
    fn speak(&mut self, utterance: Utterance) -> Result<(), PsalterError>;
    /// Cancel whatever is being spoken or queued.
    fn cancel(&mut self);
}

/// Prerecorded chapter track. Load and playback failures are its own business;
/// it reports them as [`AudioEvent`]s tagged with the newest generation it has
/// been handed, native-control events included.
pub trait ChapterAudio {
    fn play(&mut self, generation: AudioGeneration);
    fn pause(&mut self, generation: AudioGeneration);
}

/// Repeating timer delivering ticks tagged with a session.
pub trait HighlightTimer {
    /// Start ticking every `period`, replacing any running timer.
    fn start(&mut self, session: SessionId, period: Duration);
    /// Stop synchronously; no tick scheduled before this call may be
    /// delivered as current.
    fn stop(&mut self);
}

/// Bookkeeping for the verse being spoken.
#[derive(Debug, Clone, Copy)]
struct Speaking {
    verse_number: usize,
    total_words: usize,
    /// Words advanced so far; also the index of the highlighted word.
    counter: usize,
    started: bool,
}

pub struct PlaybackSynchronizer<S, A, T>
where
    S: SpeechSynthesizer,
    A: ChapterAudio,
    T: HighlightTimer,
{
    speech: S,
    audio: A,
    timer: T,
    settings: SpeechSettings,
    state: PlaybackState,
    session: SessionId,
    audio_generation: AudioGeneration,
    speaking: Option<Speaking>,
    events: Vec<PlaybackEvent>,
}

impl<S, A, T> PlaybackSynchronizer<S, A, T>
where
    S: SpeechSynthesizer,
    A: ChapterAudio,
    T: HighlightTimer,
{
    pub fn new(speech: S, audio: A, timer: T, settings: SpeechSettings) -> Self {
        Self {
            speech,
            audio,
            timer,
            settings,
            state: PlaybackState::Idle,
            session: SessionId(0),
            audio_generation: AudioGeneration::default(),
            speaking: None,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn audio_generation(&self) -> AudioGeneration {
        self.audio_generation
    }

    pub fn speech(&self) -> &S {
        &self.speech
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Drain events emitted since the last call.
    pub fn take_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.events)
    }

    /// Start the prerecorded chapter track, stopping verse speech first.
    pub fn start_chapter_audio(&mut self) {
        if self.state.channel() == Channel::VerseSpeech || self.speaking.is_some() {
            self.stop_verse_speech();
        }
        self.play_track();
        self.transition(PlaybackState::ChapterAudio);
    }

    /// Pause the chapter track. Only valid while it is playing.
    pub fn pause_chapter_audio(&mut self) -> Result<(), PsalterError> {
        let channel = self.state.channel();
        if channel != Channel::ChapterAudio {
            return Err(PsalterError::InvalidTransition {
                operation: "pause chapter audio",
                channel,
            });
        }
        self.pause_track();
        self.transition(PlaybackState::Idle);
        Ok(())
    }

    /// Speak one verse with a timed word highlight.
    ///
    /// Returns the session the utterance runs under. When speech synthesis is
    /// absent this reports [`PsalterError::SpeechUnavailable`] and changes
    /// nothing.
    pub fn start_verse_speech(
        &mut self,
        token_stream: &str,
        verse_number: usize,
    ) -> Result<SessionId, PsalterError> {
        if !self.speech.is_available() {
            tracing::warn!(verse_number, "speech synthesis unavailable");
            return Err(PsalterError::SpeechUnavailable);
        }

        if self.state.channel() == Channel::ChapterAudio {
            self.pause_track();
            self.transition(PlaybackState::Idle);
        }

        // One utterance at a time, whatever state we think we are in.
        self.invalidate_session();
        self.speech.cancel();
        if self.state.channel() == Channel::VerseSpeech {
            self.transition(PlaybackState::Idle);
        }

        let total_words = token_stream.split_whitespace().count();
        let session = self.session;
        self.speaking = Some(Speaking {
            verse_number,
            total_words,
            counter: 0,
            started: false,
        });

        let utterance = Utterance {
            text: token_stream.to_string(),
            language: self.settings.language.clone(),
            rate: self.settings.rate,
            session,
        };

        match self.speech.speak(utterance) {
            Ok(()) => {
                tracing::debug!(?session, verse_number, total_words, "verse speech requested");
                Ok(session)
            }
            Err(e) => {
                tracing::warn!(?session, error = %e, "speech synthesis failed to start");
                self.end_session();
                Err(e)
            }
        }
    }

    /// Stop verse speech. Safe to call in any state.
    pub fn stop_verse_speech(&mut self) {
        self.invalidate_session();
        if self.speech.is_available() {
            self.speech.cancel();
        }
        if self.state.channel() == Channel::VerseSpeech {
            self.transition(PlaybackState::Idle);
        }
    }

    /// Chapter change: stop everything and return to idle.
    pub fn reset(&mut self) {
        self.stop_verse_speech();
        if self.state.channel() == Channel::ChapterAudio {
            self.pause_track();
        }
        self.transition(PlaybackState::Idle);
    }

    pub fn handle_speech_event(&mut self, session: SessionId, event: SpeechEvent) {
        if session != self.session {
            tracing::debug!(?session, current = ?self.session, ?event, "discarding stale speech event");
            return;
        }

        match event {
            SpeechEvent::Start => self.on_speech_start(),
            SpeechEvent::End => {
                tracing::debug!(?session, "verse speech finished");
                self.end_session();
            }
            SpeechEvent::Error(message) => {
                tracing::warn!(?session, %message, "speech synthesis error");
                self.end_session();
            }
        }
    }

    /// One highlight timer tick.
    pub fn handle_tick(&mut self, session: SessionId) {
        if session != self.session {
            tracing::trace!(?session, current = ?self.session, "discarding stale tick");
            return;
        }
        let Some(speaking) = self.speaking.as_mut() else {
            return;
        };
        if !speaking.started {
            return;
        }

        speaking.counter += 1;
        if speaking.counter >= speaking.total_words {
            // The last word stays highlighted until the utterance ends.
            tracing::trace!(?session, "highlight reached the last word");
            self.timer.stop();
            return;
        }

        let verse_number = speaking.verse_number;
        let word_index = speaking.counter;
        tracing::trace!(?session, word_index, "highlight advanced");
        self.set_highlight(verse_number, word_index);
    }

    pub fn handle_audio_event(&mut self, generation: AudioGeneration, event: AudioEvent) {
        if generation != self.audio_generation {
            tracing::debug!(
                ?generation,
                current = ?self.audio_generation,
                ?event,
                "discarding stale audio event"
            );
            return;
        }

        match event {
            AudioEvent::Play => {
                if self.state.channel() == Channel::VerseSpeech || self.speaking.is_some() {
                    self.stop_verse_speech();
                }
                self.transition(PlaybackState::ChapterAudio);
            }
            AudioEvent::Pause | AudioEvent::Ended => {
                if self.state.channel() == Channel::ChapterAudio {
                    self.transition(PlaybackState::Idle);
                }
            }
            AudioEvent::Error(message) => {
                tracing::warn!(%message, "chapter audio error");
                if self.state.channel() == Channel::ChapterAudio {
                    self.transition(PlaybackState::Idle);
                }
            }
        }
    }

    fn play_track(&mut self) {
        self.audio_generation = self.audio_generation.next();
        self.audio.play(self.audio_generation);
    }

    fn pause_track(&mut self) {
        self.audio_generation = self.audio_generation.next();
        self.audio.pause(self.audio_generation);
    }

    fn on_speech_start(&mut self) {
        let Some(speaking) = self.speaking.as_mut() else {
            return;
        };
        if speaking.started {
            return;
        }
        speaking.started = true;
        speaking.counter = 0;
        let verse_number = speaking.verse_number;

        self.transition(PlaybackState::VerseSpeech {
            verse_number,
            highlighted_word: None,
        });
        self.set_highlight(verse_number, 0);
        self.timer.start(self.session, self.settings.highlight_period);
    }

    fn set_highlight(&mut self, verse_number: usize, word_index: usize) {
        self.state = PlaybackState::VerseSpeech {
            verse_number,
            highlighted_word: Some(word_index),
        };
        self.events.push(PlaybackEvent::HighlightChanged {
            verse_number,
            word_index,
        });
    }

    /// Terminal outcome of a session: timer cleared, highlight cleared.
    fn end_session(&mut self) {
        self.invalidate_session();
        if self.state.channel() == Channel::VerseSpeech {
            self.transition(PlaybackState::Idle);
        }
    }

    /// Bump the session token and stop the timer, synchronously.
    fn invalidate_session(&mut self) {
        self.timer.stop();
        self.speaking = None;
        self.session = self.session.next();
    }

    fn transition(&mut self, next: PlaybackState) {
        if self.state == next {
            return;
        }
        tracing::debug!(from = ?self.state, to = ?next, "playback state");
        let channel_changed = self.state.channel() != next.channel();
        self.state = next;
        if channel_changed {
            self.events.push(PlaybackEvent::StateChanged { state: next });
        }
    }
}

impl<S, A, T> Drop for PlaybackSynchronizer<S, A, T>
where
    S: SpeechSynthesizer,
    A: ChapterAudio,
    T: HighlightTimer,
{
    fn drop(&mut self) {
        self.invalidate_session();
        if self.speech.is_available() {
            self.speech.cancel();
        }
    }
}
