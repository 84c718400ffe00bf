//! Shared text canonicalization
//!
//! Diacritic stripping, casing and label cleaning used by the stay-id
//! resolver, the VIZ parser and the TM30 export. Everything here is pure
//! and locale-independent.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Separators and punctuation that split a stay label into tokens.
/// Hyphens and apostrophes are separators too (`Beach-House`, `O'Brien`).
static LABEL_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[_\-\u{2013}\u{2014},.;:!?'"\u{2019}/\\|()\[\]{}&+*#@]+"#).expect("valid regex")
});

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Latin letters that have no canonical decomposition
fn transliterate(c: char) -> Option<&'static str> {
    Some(match c {
        'ß' => "ss",
        'Ł' => "L",
        'ł' => "l",
        'Ø' => "O",
        'ø' => "o",
        'Æ' => "AE",
        'æ' => "ae",
        'Œ' => "OE",
        'œ' => "oe",
        'Đ' => "D",
        'đ' => "d",
        'Þ' => "Th",
        'þ' => "th",
        'ı' => "i",
        _ => return None,
    })
}

/// Remove diacritics: NFD, drop combining marks, transliterate the rest
///
/// `"Müller"` → `"Muller"`, `"Łukasz"` → `"Lukasz"`. Other characters,
/// including non-Latin scripts, pass through untouched.
pub fn strip_diacritics(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.nfd().filter(|c| !is_combining_mark(*c)) {
        match transliterate(c) {
            Some(replacement) => out.push_str(replacement),
            None => out.push(c),
        }
    }
    out
}

/// Collapse whitespace runs to a single space and trim
pub fn collapse_whitespace(input: &str) -> String {
    WHITESPACE_RE.replace_all(input.trim(), " ").into_owned()
}

/// Pre-clean a free-text stay label: separators to spaces, collapse, trim
pub fn clean_label(input: &str) -> String {
    let spaced = LABEL_SEPARATOR_RE.replace_all(input, " ");
    collapse_whitespace(&spaced)
}

/// Upper-case the first character, lower-case the rest
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Lower-case everything, then upper-case the first letter of each word
///
/// Word boundaries are any non-alphanumeric character, so
/// `"O'BRIEN-SMITH"` becomes `"O'Brien-Smith"`.
pub fn title_case_words(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_word = false;
    for c in input.chars() {
        if c.is_alphanumeric() || c == '_' {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// Keep ASCII letters and digits only
pub fn ascii_alphanumeric(input: &str) -> String {
    input.chars().filter(char::is_ascii_alphanumeric).collect()
}
