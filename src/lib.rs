pub mod config;
pub mod error;
pub mod hebrew;
pub mod indexer;
pub mod lexicon;
pub mod playback;
pub mod transliterate;
pub mod verse;

pub use config::EngineConfig;
pub use error::*;
pub use indexer::{index_verse, IndexedVerse};
pub use lexicon::{define, Lexicon, LexiconEntry};
pub use playback::{PlaybackEvent, PlaybackState, PlaybackSynchronizer};
pub use transliterate::transliterate;
pub use verse::{load_chapter, prepare_chapter, prepare_verse, Chapter, ChapterText, TextRepository, Verse};

/// Build a chapter from a saved text-repository payload.
/// This is the main entry point for the library.
pub fn build_chapter(chapter: u16, payload: &str, config: &EngineConfig) -> Result<Chapter, PsalterError> {
    let text = ChapterText::from_json(payload)?;
    prepare_chapter(chapter, &text, config)
}
