//! Splitting a reference into its book span and chapter/verse locator.

// Allow unwrap for compile-time constant regex patterns in lazy_static blocks
#![allow(clippy::unwrap_used)]

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// A letter or period immediately followed by a digit (`Colossians1`, `Gen.1`).
    static ref GLUED_NUMBER: Regex = Regex::new(r"([A-Za-z.])(\d)").unwrap();
    /// A numeral prefix glued to the book name (`1Jn`).
    static ref GLUED_PREFIX: Regex = Regex::new(r"^([1-3])([A-Za-z])").unwrap();
    /// Stand-alone numeral prefix of a numbered book.
    static ref NUMERAL_PREFIX: Regex = Regex::new(r"^(?:[1-3]|I{1,3})$").unwrap();
    /// `chapter`, `chap.` or `ch.` as a whole token.
    static ref CHAPTER_KEYWORD: Regex = Regex::new(r"(?i)^(?:chapter|chap|ch)\.?$").unwrap();
    /// Verse keyword, swallowing a preceding comma (`5, verse 8`).
    static ref VERSE_KEYWORD: Regex =
        Regex::new(r"(?i)\s*,?\s*(?:verses|verse|vv\.?|vs\.?|v\.?)\s*").unwrap();
    /// `and` / `&` list separators.
    static ref LIST_WORD: Regex = Regex::new(r"(?i)\s*(?:\band\b|&)\s*").unwrap();
    /// `.` or `:` chapter/verse separators.
    static ref VERSE_SEPARATOR: Regex = Regex::new(r"\s*[.:]\s*").unwrap();
    /// Hyphen or dash range separators.
    static ref RANGE_SEPARATOR: Regex = Regex::new(r"\s*[-\x{2013}\x{2014}]\s*").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// A reference split into the book as written and the raw locator text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitReference {
    /// Book tokens joined by single spaces (`"1 John"`).
    pub book: String,
    /// Everything after the book, before separator normalization.
    pub locator: String,
}

/// Separate the book name from the chapter/verse locator.
///
/// The book is every token before the first token that starts with a
/// digit, except that a leading numeral (`1`, `II`) always belongs to the
/// book. A `chapter`/`ch.` keyword after the book name ends the book span.
pub fn split_book(text: &str) -> SplitReference {
    let text = GLUED_PREFIX.replace(text.trim(), "$1 $2");
    let text = GLUED_NUMBER.replace_all(&text, "$1 $2");
    let tokens: Vec<&str> = text.split_whitespace().collect();

    let has_numeral_prefix = tokens.len() >= 2
        && NUMERAL_PREFIX.is_match(tokens[0])
        && !tokens[1].starts_with(|c: char| c.is_ascii_digit());
    let first_name_token = usize::from(has_numeral_prefix);

    let mut book_end = tokens.len();
    let mut locator_start = tokens.len();
    for (idx, token) in tokens.iter().enumerate().skip(first_name_token) {
        if token.starts_with(|c: char| c.is_ascii_digit()) {
            book_end = idx;
            locator_start = idx;
            break;
        }
        if idx > first_name_token && CHAPTER_KEYWORD.is_match(token) {
            book_end = idx;
            locator_start = idx + 1;
            break;
        }
    }

    SplitReference {
        book: tokens[..book_end].join(" "),
        locator: tokens[locator_start..].join(" "),
    }
}

/// Rewrite locator separators into the compact `C:V-V,N` form.
///
/// `and`/`&` become `,`; verse keywords and `.` become `:`; whitespace
/// around `-` and everywhere else is removed.
pub fn normalize_locator(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches(['.', ',', ';']);
    let s = VERSE_KEYWORD.replace_all(trimmed, ":");
    let s = LIST_WORD.replace_all(&s, ",");
    let s = VERSE_SEPARATOR.replace_all(&s, ":");
    let s = RANGE_SEPARATOR.replace_all(&s, "-");
    WHITESPACE.replace_all(&s, "").into_owned()
}
