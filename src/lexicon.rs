//! Lexicon lookups for a clicked word.
//!
//! The lexicon service is keyed by the word with cantillation removed but
//! vowel points kept. Its answer is a JSON array of entries; anything else
//! means "no entry".

use serde::{Deserialize, Serialize};

use crate::error::PsalterError;
use crate::hebrew::strip_cantillation;

const FALLBACK_DEFINITION: &str = "Definition available on Sefaria.";
const SEARCH_URL: &str = "https://www.sefaria.org/search";

/// Lookup key for a word fragment taken from the indexed markup.
///
/// # Example
/// ```rust
/// use psalter::lexicon::lexicon_key;
///
/// // dageshed bara with a tipcha accent and sof pasuq
/// assert_eq!(lexicon_key(" בָּרָ֖א׃ "), "בָּרָא");
/// ```
pub fn lexicon_key(word: &str) -> String {
    strip_cantillation(word).trim().to_string()
}

/// Full-text search page for a lookup key, offered next to the definitions.
pub fn search_url(key: &str) -> String {
    format!(
        "{}?q={}&tab=text&textSort=relevance&tvar=1&tsort=relevance&svar=1&ssort=relevance",
        SEARCH_URL,
        urlencoding::encode(key)
    )
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LexiconEntry {
    #[serde(default)]
    pub headword: String,
    #[serde(default)]
    pub lexicon: Option<String>,
    #[serde(default)]
    pub morphology: Option<Morphology>,
    #[serde(default)]
    pub content: Option<EntryContent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Morphology {
    #[serde(default)]
    pub part_of_speech: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryContent {
    #[serde(default)]
    pub senses: Vec<Sense>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sense {
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default)]
    pub meaning: Option<String>,
}

impl LexiconEntry {
    pub fn part_of_speech(&self) -> Option<&str> {
        self.morphology.as_ref()?.part_of_speech.as_deref()
    }

    /// One-line definition with markup removed.
    ///
    /// First sense's definition (or meaning), else the headword's root, else a
    /// pointer to the source.
    pub fn summary(&self) -> String {
        let first_sense = self
            .content
            .as_ref()
            .and_then(|content| content.senses.first());

        let summary = match first_sense {
            Some(sense) => sense
                .definition
                .clone()
                .or_else(|| sense.meaning.clone())
                .unwrap_or_default(),
            None if !self.headword.is_empty() => format!("Related to root: {}", self.headword),
            None => FALLBACK_DEFINITION.to_string(),
        };

        strip_tags(&summary)
    }
}

/// Lexicon collaborator. Implementations own their transport.
pub trait Lexicon {
    fn lookup(&self, key: &str) -> Result<Vec<LexiconEntry>, PsalterError>;
}

/// Look up a word fragment, deriving the key first.
pub fn define<L: Lexicon + ?Sized>(
    lexicon: &L,
    word: &str,
) -> Result<Vec<LexiconEntry>, PsalterError> {
    let key = lexicon_key(word);
    tracing::debug!(%key, "lexicon lookup");
    lexicon.lookup(&key)
}

/// Read a lexicon response body. A non-array body is an empty result.
pub fn parse_lexicon_response(body: &str) -> Result<Vec<LexiconEntry>, PsalterError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| PsalterError::PayloadError(e.to_string()))?;
    if !value.is_array() {
        return Ok(Vec::new());
    }
    serde_json::from_value(value).map_err(|e| PsalterError::PayloadError(e.to_string()))
}

/// Drop anything that looks like a tag, including an unterminated one at the end.
fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}
