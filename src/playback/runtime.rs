//! Async driver for the playback synchronizer.
//!
//! One tokio task owns the [`PlaybackSynchronizer`] and drains a single
//! unbounded queue carrying commands, speech events, audio events and timer
//! ticks, so every transition is totally ordered. The highlight timer is a
//! spawned interval task that is aborted when stopped; a tick that was already
//! queued carries an old session and is discarded by the synchronizer.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::error::PsalterError;

use super::synchronizer::{ChapterAudio, HighlightTimer, PlaybackSynchronizer, SpeechSynthesizer};
use super::types::{
    AudioEvent, AudioGeneration, PlaybackEvent, PlaybackState, SessionId, SpeechEvent,
    SpeechSettings,
};

enum Message {
    PlayVerse {
        token_stream: String,
        verse_number: usize,
        reply: oneshot::Sender<Result<SessionId, PsalterError>>,
    },
    StopVerse,
    PlayChapter,
    PauseChapter {
        reply: oneshot::Sender<Result<(), PsalterError>>,
    },
    Reset,
    Speech(SessionId, SpeechEvent),
    Tick(SessionId),
    Audio(AudioGeneration, AudioEvent),
    Shutdown,
}

/// Where collaborators report speech and audio events.
#[derive(Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<Message>,
}

impl EventSink {
    pub fn speech(&self, session: SessionId, event: SpeechEvent) -> Result<(), PsalterError> {
        self.tx
            .send(Message::Speech(session, event))
            .map_err(|_| PsalterError::Disconnected)
    }

    pub fn audio(&self, generation: AudioGeneration, event: AudioEvent) -> Result<(), PsalterError> {
        self.tx
            .send(Message::Audio(generation, event))
            .map_err(|_| PsalterError::Disconnected)
    }
}

/// Highlight timer backed by a tokio interval task.
pub struct TokioTimer {
    tx: mpsc::UnboundedSender<Message>,
    task: Option<JoinHandle<()>>,
}

impl TokioTimer {
    fn new(tx: mpsc::UnboundedSender<Message>) -> Self {
        Self { tx, task: None }
    }
}

impl HighlightTimer for TokioTimer {
    fn start(&mut self, session: SessionId, period: Duration) {
        self.stop();
        // interval_at panics on a zero period
        let period = period.max(Duration::from_millis(1));
        let tx = self.tx.clone();
        self.task = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(Message::Tick(session)).is_err() {
                    break;
                }
            }
        }));
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for TokioTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Channel pair created before the collaborators, so they can be handed a sink.
pub struct PlaybackRuntime {
    tx: mpsc::UnboundedSender<Message>,
    rx: mpsc::UnboundedReceiver<Message>,
}

impl Default for PlaybackRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackRuntime {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    pub fn sink(&self) -> EventSink {
        EventSink {
            tx: self.tx.clone(),
        }
    }

    /// Start the driver task. Must be called inside a tokio runtime.
    ///
    /// The task runs until [`PlaybackHandle::shutdown`] or until the handle is
    /// dropped.
    pub fn spawn<S, A>(self, speech: S, audio: A, settings: SpeechSettings) -> PlaybackHandle
    where
        S: SpeechSynthesizer + Send + 'static,
        A: ChapterAudio + Send + 'static,
    {
        let timer = TokioTimer::new(self.tx.clone());
        let synchronizer = PlaybackSynchronizer::new(speech, audio, timer, settings);
        let (state_tx, state_rx) = watch::channel(PlaybackState::Idle);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(drive(synchronizer, self.rx, state_tx, events_tx));

        PlaybackHandle {
            tx: self.tx,
            state: state_rx,
            events: events_rx,
            task: Some(task),
        }
    }
}

async fn drive<S, A>(
    mut synchronizer: PlaybackSynchronizer<S, A, TokioTimer>,
    mut rx: mpsc::UnboundedReceiver<Message>,
    state_tx: watch::Sender<PlaybackState>,
    events_tx: mpsc::UnboundedSender<PlaybackEvent>,
) where
    S: SpeechSynthesizer,
    A: ChapterAudio,
{
    while let Some(message) = rx.recv().await {
        // Replies go out after the new state is published.
        match message {
            Message::PlayVerse {
                token_stream,
                verse_number,
                reply,
            } => {
                let result = synchronizer.start_verse_speech(&token_stream, verse_number);
                publish(&mut synchronizer, &state_tx, &events_tx);
                let _ = reply.send(result);
            }
            Message::StopVerse => synchronizer.stop_verse_speech(),
            Message::PlayChapter => synchronizer.start_chapter_audio(),
            Message::PauseChapter { reply } => {
                let result = synchronizer.pause_chapter_audio();
                publish(&mut synchronizer, &state_tx, &events_tx);
                let _ = reply.send(result);
            }
            Message::Reset => synchronizer.reset(),
            Message::Speech(session, event) => synchronizer.handle_speech_event(session, event),
            Message::Tick(session) => synchronizer.handle_tick(session),
            Message::Audio(generation, event) => {
                synchronizer.handle_audio_event(generation, event)
            }
            Message::Shutdown => break,
        }
        publish(&mut synchronizer, &state_tx, &events_tx);
    }

    tracing::debug!("playback driver stopped");
    // Dropping the synchronizer aborts the timer and cancels speech.
    drop(synchronizer);
    state_tx.send_replace(PlaybackState::Idle);
}

fn publish<S, A>(
    synchronizer: &mut PlaybackSynchronizer<S, A, TokioTimer>,
    state_tx: &watch::Sender<PlaybackState>,
    events_tx: &mpsc::UnboundedSender<PlaybackEvent>,
) where
    S: SpeechSynthesizer,
    A: ChapterAudio,
{
    for event in synchronizer.take_events() {
        // Nobody listening is fine.
        let _ = events_tx.send(event);
    }
    state_tx.send_replace(synchronizer.state());
}

/// Front end of a running driver.
pub struct PlaybackHandle {
    tx: mpsc::UnboundedSender<Message>,
    state: watch::Receiver<PlaybackState>,
    events: mpsc::UnboundedReceiver<PlaybackEvent>,
    task: Option<JoinHandle<()>>,
}

impl PlaybackHandle {
    fn send(&self, message: Message) -> Result<(), PsalterError> {
        self.tx.send(message).map_err(|_| PsalterError::Disconnected)
    }

    pub async fn play_verse(
        &self,
        token_stream: &str,
        verse_number: usize,
    ) -> Result<SessionId, PsalterError> {
        let (reply, response) = oneshot::channel();
        self.send(Message::PlayVerse {
            token_stream: token_stream.to_string(),
            verse_number,
            reply,
        })?;
        response.await.map_err(|_| PsalterError::Disconnected)?
    }

    pub fn stop_verse(&self) -> Result<(), PsalterError> {
        self.send(Message::StopVerse)
    }

    pub fn play_chapter(&self) -> Result<(), PsalterError> {
        self.send(Message::PlayChapter)
    }

    pub async fn pause_chapter(&self) -> Result<(), PsalterError> {
        let (reply, response) = oneshot::channel();
        self.send(Message::PauseChapter { reply })?;
        response.await.map_err(|_| PsalterError::Disconnected)?
    }

    pub fn reset(&self) -> Result<(), PsalterError> {
        self.send(Message::Reset)
    }

    /// Latest state, updated after every processed message.
    pub fn state(&self) -> PlaybackState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state.clone()
    }

    /// Next event, or `None` once the driver has stopped.
    pub async fn next_event(&mut self) -> Option<PlaybackEvent> {
        self.events.recv().await
    }

    /// Events already emitted, without waiting.
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    /// Stop the driver and wait for its teardown.
    pub async fn shutdown(mut self) -> Result<(), PsalterError> {
        let _ = self.tx.send(Message::Shutdown);
        match self.task.take() {
            Some(task) => task.await.map_err(|_| PsalterError::Disconnected),
            None => Ok(()),
        }
    }
}

impl Drop for PlaybackHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            let _ = self.tx.send(Message::Shutdown);
        }
    }
}
