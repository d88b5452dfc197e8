//! # Hebrew Character Classes
//!
//! Code-point inventory for pointed Hebrew text, shared by the transliterator,
//! the verse indexer's word classifier and the lexicon lookup key.
//!
//! ## Mark Families
//! - **Cantillation** (te'amim, U+0591..=U+05AF) and **sof pasuq** (U+05C3):
//!   stripped before anything else looks at the text
//! - **Vowel points** (niqqud): map to a Latin vowel
//! - **Dagesh** (U+05BC): hardens bet/kaf/peh/tav, turns vav into shuruq
//! - **Shin/sin dots** (U+05C1 right, U+05C2 left)
//! - **Silent marks**: meteg, rafe and friends, no phonetic value
//!
//! Letters are U+05D0..=U+05EA plus the Yiddish ligatures U+05EF..=U+05F2.

pub const ALEPH: char = '\u{05D0}';
pub const BET: char = '\u{05D1}';
pub const VAV: char = '\u{05D5}';
pub const KAF: char = '\u{05DB}';
pub const PE: char = '\u{05E4}';
pub const SHIN: char = '\u{05E9}';
pub const TAV: char = '\u{05EA}';

pub const DAGESH: char = '\u{05BC}';
pub const HOLAM: char = '\u{05B9}';
pub const HOLAM_HASER_FOR_VAV: char = '\u{05BA}';
pub const METEG: char = '\u{05BD}';
pub const MAQAF: char = '\u{05BE}';
pub const RAFE: char = '\u{05BF}';
pub const PASEQ: char = '\u{05C0}';
pub const SHIN_DOT: char = '\u{05C1}';
pub const SIN_DOT: char = '\u{05C2}';
pub const SOF_PASUQ: char = '\u{05C3}';
pub const UPPER_DOT: char = '\u{05C4}';
pub const LOWER_DOT: char = '\u{05C5}';

/// Cantillation marks or the verse-end mark.
pub fn is_cantillation(c: char) -> bool {
    matches!(c, '\u{0591}'..='\u{05AF}') || c == SOF_PASUQ
}

pub fn is_letter(c: char) -> bool {
    matches!(c, '\u{05D0}'..='\u{05EA}' | '\u{05EF}'..='\u{05F2}')
}

/// Combining points that attach to the preceding letter (vowels, dagesh,
/// shin/sin dots, meteg, rafe, upper/lower dots).
///
/// Maqaf, paseq and sof pasuq live in the same block but are punctuation.
pub fn is_point(c: char) -> bool {
    matches!(c, '\u{05B0}'..='\u{05C7}')
        && !matches!(c, MAQAF | PASEQ | SOF_PASUQ | '\u{05C6}')
}

/// Points with no phonetic value once the lookahead rules have had their turn.
pub fn is_silent_mark(c: char) -> bool {
    matches!(
        c,
        DAGESH | METEG | RAFE | SHIN_DOT | SIN_DOT | UPPER_DOT | LOWER_DOT
    )
}

/// Plain consonant mapping, final forms included. `None` for non-letters.
pub fn consonant(c: char) -> Option<&'static str> {
    let latin = match c {
        '\u{05D0}' => "",   // aleph
        '\u{05D1}' => "v",  // bet
        '\u{05D2}' => "g",  // gimel
        '\u{05D3}' => "d",  // dalet
        '\u{05D4}' => "h",  // he
        '\u{05D5}' => "v",  // vav
        '\u{05D6}' => "z",  // zayin
        '\u{05D7}' => "ch", // het
        '\u{05D8}' => "t",  // tet
        '\u{05D9}' => "y",  // yod
        '\u{05DA}' => "ch", // final kaf
        '\u{05DB}' => "ch", // kaf
        '\u{05DC}' => "l",  // lamed
        '\u{05DD}' => "m",  // final mem
        '\u{05DE}' => "m",  // mem
        '\u{05DF}' => "n",  // final nun
        '\u{05E0}' => "n",  // nun
        '\u{05E1}' => "s",  // samekh
        '\u{05E2}' => "'",  // ayin
        '\u{05E3}' => "f",  // final pe
        '\u{05E4}' => "f",  // pe
        '\u{05E5}' => "tz", // final tsadi
        '\u{05E6}' => "tz", // tsadi
        '\u{05E7}' => "k",  // qof
        '\u{05E8}' => "r",  // resh
        '\u{05E9}' => "sh", // shin
        '\u{05EA}' => "t",  // tav
        _ => return None,
    };
    Some(latin)
}

/// Hard (dagesh lene) counterpart of the four doubling consonants.
pub fn hardened(c: char) -> Option<&'static str> {
    match c {
        BET => Some("b"),
        KAF => Some("k"),
        PE => Some("p"),
        TAV => Some("t"),
        _ => None,
    }
}

/// Vowel point mapping, independent of the surrounding consonants.
pub fn vowel(c: char) -> Option<&'static str> {
    let latin = match c {
        '\u{05B0}' => "e", // sheva
        '\u{05B1}' => "e", // hataf segol
        '\u{05B2}' => "a", // hataf patah
        '\u{05B3}' => "o", // hataf qamats
        '\u{05B4}' => "i", // hiriq
        '\u{05B5}' => "e", // tsere
        '\u{05B6}' => "e", // segol
        '\u{05B7}' => "a", // patah
        '\u{05B8}' => "a", // qamats
        '\u{05B9}' => "o", // holam
        '\u{05BA}' => "o", // holam haser for vav
        '\u{05BB}' => "u", // qubuts
        '\u{05C7}' => "o", // qamats qatan
        _ => return None,
    };
    Some(latin)
}

/// Remove cantillation and sof pasuq, leaving letters, vowels and dagesh.
pub fn strip_cantillation(text: &str) -> String {
    text.chars().filter(|&c| !is_cantillation(c)).collect()
}

/// A sayable fragment holds at least one Hebrew letter, ASCII letter or digit.
pub fn is_sayable(fragment: &str) -> bool {
    fragment
        .chars()
        .any(|c| is_letter(c) || c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_letter_has_a_mapping() {
        for c in '\u{05D0}'..='\u{05EA}' {
            assert!(consonant(c).is_some(), "missing mapping for U+{:04X}", c as u32);
        }
        assert_eq!(consonant('a'), None);
    }

    #[test]
    fn test_every_vowel_point_is_accounted_for() {
        // niqqud block minus dagesh and the marks with no vowel value
        for c in '\u{05B0}'..='\u{05BB}' {
            assert!(vowel(c).is_some(), "missing vowel for U+{:04X}", c as u32);
        }
        assert_eq!(vowel(HOLAM_HASER_FOR_VAV), Some("o"));
        assert_eq!(vowel(DAGESH), None);
    }

    #[test]
    fn test_only_doubling_letters_harden() {
        let hard: Vec<char> = ('\u{05D0}'..='\u{05EA}')
            .filter(|&c| hardened(c).is_some())
            .collect();
        assert_eq!(hard, vec![BET, KAF, PE, TAV]);
    }

    #[test]
    fn test_strip_cantillation_keeps_vowels() {
        // bara with a tipcha accent and sof pasuq
        let word = "\u{05D1}\u{05B8}\u{05BC}\u{05E8}\u{05B8}\u{0596}\u{05D0}\u{05C3}";
        assert_eq!(
            strip_cantillation(word),
            "\u{05D1}\u{05B8}\u{05BC}\u{05E8}\u{05B8}\u{05D0}"
        );
    }

    #[test]
    fn test_sayable_fragments() {
        assert!(is_sayable("\u{05D0}"));
        assert!(is_sayable("Psalm"));
        assert!(is_sayable("23"));
        assert!(is_sayable("(\u{05D0},"));
        assert!(!is_sayable(","));
        assert!(!is_sayable("\u{05C0}"));
        assert!(!is_sayable("\u{05B8}\u{0591}"));
        assert!(!is_sayable(""));
    }

    #[test]
    fn test_points_exclude_punctuation() {
        assert!(is_point(DAGESH));
        assert!(is_point(HOLAM));
        assert!(is_point(HOLAM_HASER_FOR_VAV));
        assert!(is_point(SIN_DOT));
        assert!(!is_point(MAQAF));
        assert!(!is_point(SOF_PASUQ));
        assert!(!is_point(PASEQ));
    }
}
