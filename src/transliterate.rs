//! # Transliteration
//!
//! Converts pointed Hebrew into a Latin phonetic approximation.
//!
//! ## Pipeline
//! 1. **Strip** cantillation and sof pasuq, map maqaf to `-`
//! 2. **Reorder** marks inside each letter cluster so the shin/sin dot and the
//!    dagesh sit directly after their letter (Unicode canonical order puts the
//!    vowel first, which would hide them from the one-character lookahead).
//!    A vav that carries its own vowel is a doubled consonant, not shuruq, so
//!    its dagesh goes last instead
//! 3. **Scan** left to right with one character of lookahead, firing the first
//!    matching rule from [`RULES`]
//! 4. **Clean up** the Latin string ([`cleanup`])
//!
//! ## Rule Order
//! Shin and vav appear in the plain consonant table too, so their rules must
//! run before the generic ones:
//!
//! | rule       | current   | lookahead        | output         | consumed |
//! |------------|-----------|------------------|----------------|----------|
//! | shin       | shin      | sin dot          | `s`            | 2        |
//! |            | shin      | shin dot         | `sh`           | 2        |
//! |            | shin      | other            | `sh`           | 1        |
//! | vav        | vav       | dagesh           | `u`            | 2        |
//! |            | vav       | holam            | `o`            | 2        |
//! |            | vav       | holam haser      | `vo`           | 2        |
//! | dagesh     | consonant | dagesh           | hard or plain  | 2        |
//! | consonant  | consonant | any              | plain          | 1        |
//! | vowel      | point     | any              | vowel          | 1        |
//! | silent     | mark      | any              | nothing        | 1        |
//!
//! Anything no rule claims (spaces, hyphens, Latin, digits, punctuation) is
//! copied verbatim; the transliterator never fails.
//!
//! ## Example
//! ```rust
//! use psalter::transliterate;
//!
//! // bereshit bara
//! let phonetic = transliterate("בְּרֵאשִׁית בָּרָא");
//! assert_eq!(phonetic, "bereshit bara");
//! ```

use crate::hebrew::{
    self, DAGESH, HOLAM, HOLAM_HASER_FOR_VAV, MAQAF, SHIN, SHIN_DOT, SIN_DOT, VAV,
};

/// Output of one rule firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub output: &'static str,
    /// Characters consumed: 1, or 2 when the lookahead took part.
    pub consumed: usize,
}

impl Step {
    const fn one(output: &'static str) -> Self {
        Step { output, consumed: 1 }
    }

    const fn two(output: &'static str) -> Self {
        Step { output, consumed: 2 }
    }
}

/// A scanner rule: `(current, lookahead) -> Step`, or `None` to fall through.
pub struct Rule {
    pub name: &'static str,
    pub fire: fn(char, Option<char>) -> Option<Step>,
}

/// Rules in evaluation order. The first one that fires wins.
pub const RULES: [Rule; 6] = [
    Rule { name: "shin", fire: shin_rule },
    Rule { name: "vav", fire: vav_rule },
    Rule { name: "dagesh", fire: dagesh_rule },
    Rule { name: "consonant", fire: consonant_rule },
    Rule { name: "vowel", fire: vowel_rule },
    Rule { name: "silent", fire: silent_rule },
];

fn shin_rule(c: char, next: Option<char>) -> Option<Step> {
    if c != SHIN {
        return None;
    }
    Some(match next {
        Some(SIN_DOT) => Step::two("s"),
        Some(SHIN_DOT) => Step::two("sh"),
        _ => Step::one("sh"),
    })
}

fn vav_rule(c: char, next: Option<char>) -> Option<Step> {
    if c != VAV {
        return None;
    }
    match next {
        Some(DAGESH) => Some(Step::two("u")),
        Some(HOLAM) => Some(Step::two("o")),
        Some(HOLAM_HASER_FOR_VAV) => Some(Step::two("vo")),
        _ => None,
    }
}

fn dagesh_rule(c: char, next: Option<char>) -> Option<Step> {
    if next != Some(DAGESH) {
        return None;
    }
    let plain = hebrew::consonant(c)?;
    Some(Step::two(hebrew::hardened(c).unwrap_or(plain)))
}

fn consonant_rule(c: char, _next: Option<char>) -> Option<Step> {
    hebrew::consonant(c).map(Step::one)
}

fn vowel_rule(c: char, _next: Option<char>) -> Option<Step> {
    hebrew::vowel(c).map(Step::one)
}

fn silent_rule(c: char, _next: Option<char>) -> Option<Step> {
    hebrew::is_silent_mark(c).then_some(Step::one(""))
}

/// Transliterate a space-joined Hebrew token stream.
///
/// Deterministic and total: unrecognized characters pass through unchanged.
///
/// # Example
/// ```rust
/// use psalter::transliterate;
///
/// assert_eq!(transliterate("\u{05D1}\u{05BC}"), "b"); // bet with dagesh
/// assert_eq!(transliterate("\u{05D1}"), "v");         // bet without
/// assert_eq!(transliterate(""), "");
/// ```
pub fn transliterate(token_stream: &str) -> String {
    let chars = prepare(token_stream);
    cleanup(&scan(&chars))
}

/// Strip cantillation, map maqaf and reorder cluster marks.
fn prepare(text: &str) -> Vec<char> {
    let mut chars: Vec<char> = text
        .chars()
        .filter(|&c| !hebrew::is_cantillation(c))
        .map(|c| if c == MAQAF { '-' } else { c })
        .collect();
    reorder_clusters(&mut chars);
    chars
}

/// Within each run of points following a letter, move shin/sin dots first and
/// dagesh second. Everything else keeps its relative order. On a vav that
/// also carries a vowel the dagesh moves last, out of the shuruq rule's reach.
fn reorder_clusters(chars: &mut [char]) {
    let mut i = 0;
    while i < chars.len() {
        if !hebrew::is_letter(chars[i]) {
            i += 1;
            continue;
        }
        let start = i + 1;
        let mut end = start;
        while end < chars.len() && hebrew::is_point(chars[end]) {
            end += 1;
        }
        let doubled_vav =
            chars[i] == VAV && chars[start..end].iter().any(|&c| hebrew::vowel(c).is_some());
        chars[start..end].sort_by_key(|&c| match c {
            SHIN_DOT | SIN_DOT => 0,
            DAGESH if doubled_vav => 3,
            DAGESH => 1,
            _ => 2,
        });
        i = end;
    }
}

fn scan(chars: &[char]) -> String {
    let mut result = String::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        match RULES.iter().find_map(|rule| (rule.fire)(c, next)) {
            Some(step) => {
                result.push_str(step.output);
                i += step.consumed;
            }
            None => {
                result.push(c);
                i += 1;
            }
        }
    }

    result
}

/// Readability cleanup applied once to the raw scanner output.
///
/// In order: `iy` → `i`, `uw` → `u`, trim `'` at both ends, drop `'` runs that
/// follow a space, collapse hyphen runs, collapse whitespace runs, trim.
///
/// The rules are empirically tuned and kept literal, and they are not
/// idempotent. `iyy` needs two passes, and so does scanner output where a word
/// ending in ayin precedes a silent one: `שָׁמַע א` gives `shama'` because the
/// `'` is only at the end once the trailing space is trimmed.
pub fn cleanup(raw: &str) -> String {
    let s = raw.replace("iy", "i").replace("uw", "u");
    let s = s.trim_start_matches('\'').trim_end_matches('\'');

    let mut out = String::with_capacity(s.len());
    let mut after_space = false;
    let mut after_hyphen = false;
    let mut in_whitespace = false;

    for c in s.chars() {
        if c == '\'' && after_space {
            continue;
        }
        after_space = c == ' ';

        if c == '-' {
            if after_hyphen {
                continue;
            }
            after_hyphen = true;
        } else {
            after_hyphen = false;
        }

        if c.is_whitespace() {
            if !in_whitespace {
                out.push(' ');
            }
            in_whitespace = true;
        } else {
            out.push(c);
            in_whitespace = false;
        }
    }

    out.trim().to_string()
}
