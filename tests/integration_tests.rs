//! Integration tests for the Psalter engine
//!
//! Tests the full pipeline from repository payload to indexed, transliterated
//! verses, and the playback driver running on a paused tokio clock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use psalter::lexicon::lexicon_key;
use psalter::playback::{
    AudioEvent, AudioGeneration, ChapterAudio, EventSink, PlaybackEvent, PlaybackRuntime, PlaybackState,
    SpeechEvent, SpeechSettings, SpeechSynthesizer, Utterance,
};
use psalter::{build_chapter, prepare_verse, EngineConfig, PsalterError};

#[test]
fn test_end_to_end_verse() {
    let verse = prepare_verse(1, "בְּרֵאשִׁית בָּרָא", "In the beginning created");

    assert_eq!(
        verse.indexed_markup,
        r#"<span data-word-index="0">בְּרֵאשִׁית</span> <span data-word-index="1">בָּרָא</span>"#
    );
    assert_eq!(verse.token_stream, "בְּרֵאשִׁית בָּרָא");
    assert_eq!(verse.word_count, 2);
    assert_eq!(verse.phonetic, "bereshit bara");
}

#[test]
fn test_build_chapter_from_payload() {
    let payload = r#"{
        "heRef": "תהילים א׳",
        "he": [
            "אַ֥שְֽׁרֵי הָאִ֗ישׁ אֲשֶׁ֤ר ׀ לֹ֥א הָלַךְ֮ בַּעֲצַ֪ת רְשָׁ֫עִ֥ים",
            "כִּ֤י אִ֥ם בְּתוֹרַ֥ת יְהֹוָ֗ה חֶ֫פְצ֥וֹ"
        ],
        "text": [
            "<b>Happy</b> is the man who has not followed the counsel of the wicked,",
            "rather, the teaching of the LORD is his delight,"
        ]
    }"#;
    let config = EngineConfig::from_yaml("chapter-audio-url: \"https://audio.example/{chapter}.mp3\"").unwrap();
    let chapter = build_chapter(1, payload, &config).unwrap();

    assert_eq!(chapter.number, 1);
    assert_eq!(chapter.audio_url, "https://audio.example/01.mp3");
    assert_eq!(chapter.verses.len(), 2);
    assert_eq!(chapter.verses[0].translation, "<b>Happy</b> is the man who has not followed the counsel of the wicked,");

    for verse in &chapter.verses {
        assert_eq!(verse.token_stream.split_whitespace().count(), verse.word_count);
        for k in 0..verse.word_count {
            let unit = format!("data-word-index=\"{}\"", k);
            assert!(verse.indexed_markup.contains(&unit), "missing unit {}", k);
        }
        assert!(!verse.phonetic.is_empty());
    }
    // The paseq between words is inert.
    assert_eq!(chapter.verses[0].word_count, 7);
}

#[test]
fn test_lexicon_key_from_indexed_word() {
    let chapter = build_chapter(
        1,
        r#"{"he": ["וּבְדֶ֣רֶךְ חַ֭טָּאִים לֹ֥א עָמָ֑ד׃"]}"#,
        &EngineConfig::default(),
    )
    .unwrap();
    let words: Vec<&str> = chapter.verses[0].token_stream.split_whitespace().collect();
    assert_eq!(lexicon_key(words[3]), "עָמָד");
}

#[test]
fn test_bad_payload_and_range() {
    assert!(matches!(
        build_chapter(1, "not json", &EngineConfig::default()),
        Err(PsalterError::PayloadError(_))
    ));
    assert_eq!(
        build_chapter(0, "{}", &EngineConfig::default()),
        Err(PsalterError::ChapterOutOfRange(0))
    );
}

/// Speech that starts every utterance immediately, through the driver's queue.
struct ScriptedSpeech {
    available: bool,
    sink: EventSink,
    cancels: Arc<Mutex<usize>>,
}

impl SpeechSynthesizer for ScriptedSpeech {
    fn is_available(&self) -> bool {
        self.available
    }

    fn speak(&mut self, utterance: Utterance) -> Result<(), PsalterError> {
        self.sink.speech(utterance.session, SpeechEvent::Start)
    }

    fn cancel(&mut self) {
        *self.cancels.lock().unwrap() += 1;
    }
}

#[derive(Default, Clone)]
struct RecordingAudio {
    calls: Arc<Mutex<Vec<&'static str>>>,
    generation: Arc<Mutex<AudioGeneration>>,
}

impl RecordingAudio {
    fn generation(&self) -> AudioGeneration {
        *self.generation.lock().unwrap()
    }
}

impl ChapterAudio for RecordingAudio {
    fn play(&mut self, generation: AudioGeneration) {
        self.calls.lock().unwrap().push("play");
        *self.generation.lock().unwrap() = generation;
    }

    fn pause(&mut self, generation: AudioGeneration) {
        self.calls.lock().unwrap().push("pause");
        *self.generation.lock().unwrap() = generation;
    }
}

fn spawn_driver(available: bool) -> (psalter::playback::PlaybackHandle, EventSink, Arc<Mutex<usize>>, RecordingAudio) {
    let runtime = PlaybackRuntime::new();
    let sink = runtime.sink();
    let cancels = Arc::new(Mutex::new(0));
    let speech = ScriptedSpeech {
        available,
        sink: sink.clone(),
        cancels: cancels.clone(),
    };
    let audio = RecordingAudio::default();
    let handle = runtime.spawn(speech, audio.clone(), SpeechSettings::default());
    (handle, sink, cancels, audio)
}

#[tokio::test(start_paused = true)]
async fn test_driver_highlights_on_cadence() {
    let (mut handle, sink, _, _) = spawn_driver(true);
    let verse = prepare_verse(1, "אַשְׁרֵי הָאִישׁ אֲשֶׁר", "");

    let session = handle.play_verse(&verse.token_stream, 1).await.unwrap();
    let start = tokio::time::Instant::now();

    let mut highlights = Vec::new();
    while highlights.len() < verse.word_count {
        match handle.next_event().await {
            Some(PlaybackEvent::HighlightChanged { verse_number, word_index }) => {
                assert_eq!(verse_number, 1);
                highlights.push((word_index, start.elapsed()));
            }
            Some(_) => {}
            None => panic!("driver stopped early"),
        }
    }

    let words: Vec<usize> = highlights.iter().map(|&(word, _)| word).collect();
    assert_eq!(words, vec![0, 1, 2]);
    assert!(highlights[0].1 < Duration::from_millis(50));
    assert!(highlights[1].1 >= Duration::from_millis(350));
    assert!(highlights[1].1 < Duration::from_millis(400));
    assert!(highlights[2].1 >= Duration::from_millis(700));

    // The timer has stopped; the last word stays lit.
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(handle.drain_events().is_empty());
    assert_eq!(handle.state().highlight(), Some((1, 2)));

    sink.speech(session, SpeechEvent::End).unwrap();
    loop {
        match handle.next_event().await {
            Some(PlaybackEvent::StateChanged { state }) => {
                assert_eq!(state, PlaybackState::Idle);
                break;
            }
            Some(other) => panic!("unexpected event {:?}", other),
            None => panic!("driver stopped early"),
        }
    }

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_driver_stop_discards_pending_ticks() {
    let (mut handle, _sink, cancels, _) = spawn_driver(true);

    handle.play_verse("שִׁיר לְדָוִד מִזְמוֹר", 4).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(handle.state().highlight(), Some((4, 0)));

    handle.stop_verse().unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;

    let highlights: Vec<_> = handle
        .drain_events()
        .into_iter()
        .filter(|event| matches!(event, PlaybackEvent::HighlightChanged { word_index, .. } if *word_index > 0))
        .collect();
    assert!(highlights.is_empty());
    assert_eq!(handle.state(), PlaybackState::Idle);
    assert!(*cancels.lock().unwrap() >= 2);

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_driver_mutual_exclusion() {
    let (handle, sink, _, audio) = spawn_driver(true);

    handle.play_chapter().unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(handle.state(), PlaybackState::ChapterAudio);

    handle.play_verse("שִׁיר לְדָוִד", 2).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(handle.state().highlight(), Some((2, 0)));
    assert_eq!(audio.calls.lock().unwrap().as_slice(), ["play", "pause"]);

    // Native controls restart the track.
    sink.audio(audio.generation(), AudioEvent::Play).unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(handle.state(), PlaybackState::ChapterAudio);

    handle.pause_chapter().await.unwrap();
    assert_eq!(handle.state(), PlaybackState::Idle);
    assert!(matches!(
        handle.pause_chapter().await,
        Err(PsalterError::InvalidTransition { .. })
    ));

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_driver_without_speech() {
    let (handle, _sink, cancels, _) = spawn_driver(false);

    assert_eq!(
        handle.play_verse("שִׁיר", 1).await,
        Err(PsalterError::SpeechUnavailable)
    );
    assert_eq!(handle.state(), PlaybackState::Idle);

    handle.shutdown().await.unwrap();
    assert_eq!(*cancels.lock().unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_commands_after_shutdown() {
    let (handle, sink, _, _) = spawn_driver(true);
    let watcher = handle.subscribe();
    handle.shutdown().await.unwrap();

    assert_eq!(*watcher.borrow(), PlaybackState::Idle);
    assert_eq!(sink.audio(AudioGeneration::default(), AudioEvent::Play), Err(PsalterError::Disconnected));
}
