//! # Verse Indexer
//!
//! Turns verse markup into addressable words for highlighting, plus the flat
//! token stream handed to speech synthesis and the transliterator.
//!
//! ## Walk
//! The indexer descends into formatting wrappers and preserves them, but only
//! text runs produce words. Each run is split on whitespace with the
//! separators kept verbatim, so spacing round-trips exactly. A fragment with
//! a Hebrew letter, ASCII letter or digit becomes
//! `<span data-word-index="K">...</span>`; punctuation-only fragments stay
//! inert. `K` comes from one counter shared by the whole verse.
//!
//! ## Alignment Invariant
//! `token_stream.split_whitespace()` yields exactly `word_count` tokens and
//! token `K` is the text of the unit carrying `data-word-index="K"`. All
//! highlighting depends on this.
//!
//! ## Example
//! ```rust
//! use psalter::index_verse;
//!
//! let verse = index_verse("<b>שִׁיר</b> לְדָוִד");
//! assert_eq!(verse.word_count, 2);
//! assert_eq!(verse.token_stream, "שִׁיר לְדָוִד");
//! assert_eq!(
//!     verse.indexed_markup,
//!     r#"<b><span data-word-index="0">שִׁיר</span></b> <span data-word-index="1">לְדָוִד</span>"#
//! );
//! ```

mod markup;


pub use markup::{parse_markup, Element, MarkupNode};

use serde::Serialize;

use crate::hebrew;
use markup::escape_text;

/// Attribute carrying the zero-based word index on each addressable unit.
pub const WORD_INDEX_ATTRIBUTE: &str = "data-word-index";

/// Indexer output for one verse.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedVerse {
    pub indexed_markup: String,
    pub token_stream: String,
    pub word_count: usize,
}

/// Index a verse given as an HTML fragment.
///
/// Never fails: markup the reader rejects is indexed as a single text run.
pub fn index_verse(markup: &str) -> IndexedVerse {
    match parse_markup(markup) {
        Ok(nodes) => index_nodes(&nodes),
        Err(e) => {
            tracing::warn!(error = %e, "verse markup unreadable, indexing as plain text");
            index_nodes(&[MarkupNode::Text(markup.to_string())])
        }
    }
}

/// Index an already-built markup tree.
pub fn index_nodes(nodes: &[MarkupNode]) -> IndexedVerse {
    let mut walker = WordIndexer::default();
    for node in nodes {
        walker.walk(node);
    }
    walker.finish()
}

#[derive(Default)]
struct WordIndexer {
    markup: String,
    words: Vec<String>,
}

impl WordIndexer {
    fn walk(&mut self, node: &MarkupNode) {
        match node {
            MarkupNode::Text(text) => self.text_run(text),
            MarkupNode::Element(element) => {
                self.markup.push_str(&element.open_tag);
                for child in &element.children {
                    self.walk(child);
                }
                if let Some(close) = &element.close_tag {
                    self.markup.push_str(close);
                }
            }
            MarkupNode::Verbatim(raw) => self.markup.push_str(raw),
        }
    }

    fn text_run(&mut self, text: &str) {
        for fragment in split_keep_whitespace(text) {
            let escaped = escape_text(fragment);
            if hebrew::is_sayable(fragment) {
                let index = self.words.len();
                self.markup.push_str(&format!(
                    r#"<span {}="{}">{}</span>"#,
                    WORD_INDEX_ATTRIBUTE, index, escaped
                ));
                self.words.push(fragment.to_string());
            } else {
                self.markup.push_str(&escaped);
            }
        }
    }

    fn finish(self) -> IndexedVerse {
        IndexedVerse {
            indexed_markup: self.markup,
            token_stream: self.words.join(" "),
            word_count: self.words.len(),
        }
    }
}

/// Split into alternating runs of whitespace and non-whitespace, keeping both.
fn split_keep_whitespace(text: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;

    for (i, c) in text.char_indices() {
        let is_space = c.is_whitespace();
        match current {
            Some(kind) if kind != is_space => {
                fragments.push(&text[start..i]);
                start = i;
            }
            _ => {}
        }
        current = Some(is_space);
    }
    if start < text.len() {
        fragments.push(&text[start..]);
    }

    fragments
}
