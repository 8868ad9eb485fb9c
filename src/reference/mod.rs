//! Reference parsing and normalization.
//!
//! Turns text like `"Rom 8:1, 3-5"` or `"Ephesians chapter 5, verse 8"` into
//! an ordered list of [`CanonicalReference`]s.

pub mod expand;
pub mod locator;

use std::fmt;

use serde::Serialize;

use crate::bible::BookRegistry;
use crate::error::{Error, Result};
use expand::{expand_locator, PartError};
use locator::{normalize_locator, split_book};

/// A fully resolved `(book, chapter, verse?)` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CanonicalReference {
    /// Canonical book name (or the book token verbatim when unknown).
    pub book: String,
    /// Chapter number.
    pub chapter: u32,
    /// Verse number; `None` for a whole chapter.
    pub verse: Option<u32>,
}

impl CanonicalReference {
    /// A single-verse reference.
    pub fn verse(book: impl Into<String>, chapter: u32, verse: u32) -> Self {
        Self { book: book.into(), chapter, verse: Some(verse) }
    }

    /// A whole-chapter reference.
    pub fn chapter(book: impl Into<String>, chapter: u32) -> Self {
        Self { book: book.into(), chapter, verse: None }
    }

    /// `"C.V"`, or `"C"` for a whole chapter.
    pub fn locator(&self) -> String {
        match self.verse {
            Some(verse) => format!("{}.{verse}", self.chapter),
            None => self.chapter.to_string(),
        }
    }

    /// Link target: `"Book C.V"` or `"Book C"`.
    pub fn target(&self) -> String {
        format!("{} {}", self.book, self.locator())
    }
}

impl fmt::Display for CanonicalReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.book, self.locator())
    }
}

/// The outcome of parsing one reference string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedReference {
    /// The text that was parsed, trimmed.
    pub source: String,
    /// The book as written in the source (`"Rom"`).
    pub book_as_written: String,
    /// Expanded references in input order; never empty.
    pub references: Vec<CanonicalReference>,
}

impl ParsedReference {
    /// Default alias for one of the expanded references: the book as written
    /// followed by `C.V`.
    pub fn display_alias(&self, reference: &CanonicalReference) -> String {
        format!("{} {}", self.book_as_written, reference.locator())
    }

    /// Whether the parse produced exactly one reference naming a verse.
    pub fn is_single_verse(&self) -> bool {
        matches!(self.references.as_slice(), [only] if only.verse.is_some())
    }
}

/// Reference parser bound to a book registry.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceParser<'r> {
    registry: &'r BookRegistry,
}

impl Default for ReferenceParser<'static> {
    fn default() -> Self {
        Self::new(BookRegistry::standard())
    }
}

impl<'r> ReferenceParser<'r> {
    /// Create a parser resolving books through `registry`.
    pub const fn new(registry: &'r BookRegistry) -> Self {
        Self { registry }
    }

    /// The registry used for book resolution.
    pub const fn registry(&self) -> &'r BookRegistry {
        self.registry
    }

    /// Parse `text`, reporting why it is not a usable reference.
    pub fn parse(&self, text: &str) -> Result<ParsedReference> {
        let source = text.trim();
        let split = split_book(source);
        if split.book.is_empty() {
            return Err(Error::malformed(source));
        }

        let book = match self.registry.resolve(&split.book) {
            Some(book) => book.name.clone(),
            None => {
                tracing::debug!(
                    "Unknown book {:?}, using it verbatim (closest: {:?})",
                    split.book,
                    self.registry.closest(&split.book).map(|b| b.name.as_str())
                );
                split.book.clone()
            }
        };
        let single_chapter = self.registry.resolve(&book).is_some_and(|b| b.is_single_chapter());

        let locator = normalize_locator(&split.locator);
        let pairs = expand_locator(&locator, single_chapter).map_err(|e| match e {
            PartError::Malformed => Error::malformed(source),
            PartError::Inverted { start, end } => Error::InvalidRange { input: source.to_string(), start, end },
        })?;

        let references = pairs
            .into_iter()
            .map(|(chapter, verse)| CanonicalReference { book: book.clone(), chapter, verse })
            .collect();

        Ok(ParsedReference {
            source: source.to_string(),
            book_as_written: split.book,
            references,
        })
    }

    /// Expand `text` into canonical references.
    pub fn try_expand(&self, text: &str) -> Result<Vec<CanonicalReference>> {
        self.parse(text).map(|parsed| parsed.references)
    }

    /// Expand `text`, yielding nothing when it is not a recognizable reference.
    pub fn expand(&self, text: &str) -> Vec<CanonicalReference> {
        self.try_expand(text).unwrap_or_default()
    }
}

/// Parse `text` with the standard book table.
pub fn parse(text: &str) -> Result<ParsedReference> {
    ReferenceParser::default().parse(text)
}

/// Expand `text` with the standard book table, reporting malformed input.
pub fn try_expand(text: &str) -> Result<Vec<CanonicalReference>> {
    ReferenceParser::default().try_expand(text)
}

/// Expand `text` with the standard book table; empty when unparseable.
pub fn expand(text: &str) -> Vec<CanonicalReference> {
    ReferenceParser::default().expand(text)
}
