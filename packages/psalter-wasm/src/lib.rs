use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct EngineError {
    message: String,
    retryable: bool,
}

fn error_to_engine_error(e: psalter::PsalterError) -> EngineError {
    EngineError {
        retryable: e.is_retryable(),
        message: e.to_string(),
    }
}

fn error_json(e: psalter::PsalterError) -> JsValue {
    let body = serde_json::to_string(&error_to_engine_error(e))
        .unwrap_or_else(|_| r#"{"message":"unknown error","retryable":false}"#.to_string());
    JsValue::from_str(&body)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| error_json(psalter::PsalterError::PayloadError(e.to_string())))
}

/// Transliterate a Hebrew token stream into Latin phonetics
#[wasm_bindgen]
pub fn transliterate(token_stream: &str) -> String {
    psalter::transliterate(token_stream)
}

/// Index one verse's markup; returns `{ indexedMarkup, tokenStream, wordCount }`
#[wasm_bindgen]
pub fn index_verse(markup: &str) -> Result<String, JsValue> {
    to_json(&psalter::index_verse(markup))
}

/// Build a chapter from the text repository's JSON payload
///
/// `config_yaml` may be empty for the default settings.
#[wasm_bindgen]
pub fn prepare_chapter(chapter: u16, payload: &str, config_yaml: &str) -> Result<String, JsValue> {
    let config = psalter::EngineConfig::from_yaml(config_yaml).map_err(error_json)?;
    let chapter = psalter::build_chapter(chapter, payload, &config).map_err(error_json)?;
    to_json(&chapter)
}

/// Lexicon lookup key for a clicked word
#[wasm_bindgen]
pub fn lexicon_key(word: &str) -> String {
    psalter::lexicon::lexicon_key(word)
}

/// Search page URL for a lexicon key
#[wasm_bindgen]
pub fn search_url(key: &str) -> String {
    psalter::lexicon::search_url(key)
}

/// One-line summaries of a lexicon response, as a JSON array
#[wasm_bindgen]
pub fn summarize_lexicon(body: &str) -> Result<String, JsValue> {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Summary {
        headword: String,
        part_of_speech: Option<String>,
        definition: String,
    }

    let entries = psalter::lexicon::parse_lexicon_response(body).map_err(error_json)?;
    let summaries: Vec<Summary> = entries
        .iter()
        .map(|entry| Summary {
            headword: entry.headword.clone(),
            part_of_speech: entry.part_of_speech().map(str::to_string),
            definition: entry.summary(),
        })
        .collect();
    to_json(&summaries)
}
