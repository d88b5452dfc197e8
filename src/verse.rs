//! # Verses and Chapters
//!
//! Assembles display-ready verses from the text repository's payload: the
//! indexed Hebrew markup, the token stream for speech, the phonetic line and
//! the translation that sits at the same position.
//!
//! The repository payload is the Sefaria text shape:
//!
//! ```json
//! { "heRef": "תהילים כ״ג", "he": ["...", "..."], "text": ["...", "..."] }
//! ```

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::PsalterError;
use crate::indexer::index_verse;
use crate::transliterate::transliterate;

pub const FIRST_CHAPTER: u16 = 1;
pub const LAST_CHAPTER: u16 = 150;

pub fn check_chapter(chapter: u16) -> Result<u16, PsalterError> {
    if (FIRST_CHAPTER..=LAST_CHAPTER).contains(&chapter) {
        Ok(chapter)
    } else {
        Err(PsalterError::ChapterOutOfRange(chapter))
    }
}

/// One verse, immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verse {
    /// 1-based, in source order.
    pub number: usize,
    pub indexed_markup: String,
    pub token_stream: String,
    pub word_count: usize,
    pub phonetic: String,
    /// Opaque formatted text from the repository, passed through.
    pub translation: String,
}

/// Index and transliterate a single verse.
///
/// # Example
/// ```rust
/// use psalter::prepare_verse;
///
/// let verse = prepare_verse(1, "בְּרֵאשִׁית בָּרָא", "In the beginning created");
/// assert_eq!(verse.word_count, 2);
/// assert_eq!(verse.phonetic, "bereshit bara");
/// ```
pub fn prepare_verse(number: usize, markup: &str, translation: &str) -> Verse {
    let indexed = index_verse(markup);
    let phonetic = transliterate(&indexed.token_stream);
    Verse {
        number,
        indexed_markup: indexed.indexed_markup,
        token_stream: indexed.token_stream,
        word_count: indexed.word_count,
        phonetic,
        translation: translation.to_string(),
    }
}

/// What the text repository hands back for a chapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChapterText {
    #[serde(rename = "heRef", default)]
    pub title: String,
    /// Hebrew verse markup, in order.
    #[serde(rename = "he", default)]
    pub verses: Vec<String>,
    /// Translation markup, aligned with `verses` by position.
    #[serde(rename = "text", default)]
    pub translations: Vec<String>,
}

impl ChapterText {
    pub fn from_json(content: &str) -> Result<Self, PsalterError> {
        serde_json::from_str(content).map_err(|e| PsalterError::PayloadError(e.to_string()))
    }
}

/// Source of chapter text. Implementations own their transport.
pub trait TextRepository {
    fn chapter(&self, chapter: u16) -> Result<ChapterText, PsalterError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub number: u16,
    pub title: String,
    pub audio_url: String,
    pub verses: Vec<Verse>,
}

/// Build every verse of a chapter.
///
/// Missing translations become empty strings; extra translations are dropped.
pub fn prepare_chapter(
    chapter: u16,
    text: &ChapterText,
    config: &EngineConfig,
) -> Result<Chapter, PsalterError> {
    check_chapter(chapter)?;

    let verses: Vec<Verse> = text
        .verses
        .iter()
        .enumerate()
        .map(|(i, markup)| {
            let translation = text.translations.get(i).map(String::as_str).unwrap_or("");
            prepare_verse(i + 1, markup, translation)
        })
        .collect();

    if text.translations.len() != text.verses.len() {
        tracing::debug!(
            chapter,
            verses = text.verses.len(),
            translations = text.translations.len(),
            "translation count differs from verse count"
        );
    }

    let title = if text.title.trim().is_empty() {
        format!("תהילים {}", chapter)
    } else {
        text.title.clone()
    };

    Ok(Chapter {
        number: chapter,
        title,
        audio_url: config.chapter_audio_url(chapter)?,
        verses,
    })
}

/// Fetch a chapter from a repository and build it.
///
/// A fetch failure is returned as is; nothing previously loaded is touched.
pub fn load_chapter<R: TextRepository + ?Sized>(
    repository: &R,
    chapter: u16,
    config: &EngineConfig,
) -> Result<Chapter, PsalterError> {
    check_chapter(chapter)?;
    let text = repository.chapter(chapter).map_err(|e| {
        tracing::warn!(chapter, error = %e, "could not load chapter");
        e
    })?;
    prepare_chapter(chapter, &text, config)
}
