//! Bible book registry and name resolution.
//!
//! The registry is built once from a `{ name, abbr[] }` table (the embedded
//! `data/books.json` by default) and is read-only afterwards, so one instance
//! can be shared freely between threads.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};

use crate::constants::reference::{ROMAN_PREFIXES, SINGLE_CHAPTER_BOOKS};
use crate::error::{Error, Result};

/// Book table compiled into the binary.
const DEFAULT_BOOKS_JSON: &str = include_str!("../../data/books.json");

/// Minimum fuzzy score for [`BookRegistry::closest`] to return a suggestion.
const MIN_SUGGESTION_SCORE: i64 = 40;

/// Registry built from the embedded table.
#[allow(clippy::expect_used)]
static STANDARD: LazyLock<BookRegistry> = LazyLock::new(|| {
    BookRegistry::from_json(DEFAULT_BOOKS_JSON).expect("valid embedded book table")
});

/// A canonical book name with the abbreviations accepted for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibleBook {
    /// Canonical name (e.g. "1 Corinthians").
    pub name: String,
    /// Accepted abbreviations, in table order.
    #[serde(rename = "abbr", default)]
    pub abbreviations: Vec<String>,
}

impl BibleBook {
    /// Create a book entry.
    pub fn new<I, S>(name: impl Into<String>, abbreviations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            abbreviations: abbreviations.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether this book has exactly one chapter.
    pub fn is_single_chapter(&self) -> bool {
        SINGLE_CHAPTER_BOOKS.contains(&self.name.as_str())
    }
}

/// Immutable lookup table from names and abbreviations to books.
#[derive(Debug, Clone)]
pub struct BookRegistry {
    books: Vec<BibleBook>,
    /// Every accepted surface form (names, abbreviations, Roman variants) with its book index.
    surfaces: Vec<(String, usize)>,
    /// Lookup key → book index. First entry wins on collision.
    index: HashMap<String, usize>,
}

impl BookRegistry {
    /// The registry built from the embedded book table.
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    /// Build a registry from book entries.
    ///
    /// Names must be unique and non-empty. Abbreviations may collide; the
    /// earlier book keeps the abbreviation.
    pub fn new(books: Vec<BibleBook>) -> Result<Self> {
        let mut surfaces = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut names: HashMap<String, usize> = HashMap::new();

        for (idx, book) in books.iter().enumerate() {
            let name = book.name.trim();
            if name.is_empty() {
                return Err(Error::parse(format!("book #{} has an empty name", idx + 1), None));
            }
            if names.insert(lookup_key(name), idx).is_some() {
                return Err(Error::parse(format!("duplicate book name: {name}"), None));
            }

            let forms = std::iter::once(name)
                .chain(book.abbreviations.iter().map(|a| a.trim()))
                .filter(|form| !form.is_empty());

            for form in forms {
                let variants = std::iter::once(form.to_string()).chain(roman_variant(form));
                for variant in variants {
                    let key = lookup_key(&variant);
                    if let Some(&owner) = index.get(&key) {
                        if owner != idx {
                            tracing::debug!(
                                "Abbreviation {variant:?} of {} already belongs to {}",
                                book.name,
                                books[owner].name
                            );
                        }
                        continue;
                    }
                    index.insert(key, idx);
                    surfaces.push((variant, idx));
                }
            }
        }

        Ok(Self { books, surfaces, index })
    }

    /// Parse a JSON book table (`[{ "name": ..., "abbr": [...] }]`).
    pub fn from_json(json: &str) -> Result<Self> {
        let books: Vec<BibleBook> = serde_json::from_str(json)?;
        Self::new(books)
    }

    /// Load a JSON book table from disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).map_err(|e| Error::io(e, path.to_path_buf()))?;
        let books: Vec<BibleBook> = serde_json::from_str(&content)
            .map_err(|e| Error::parse(e.to_string(), path.to_path_buf()))?;
        let registry = Self::new(books)?;
        tracing::info!("Loaded {} books from {}", registry.len(), path.display());
        Ok(registry)
    }

    /// All books in table order.
    pub fn books(&self) -> &[BibleBook] {
        &self.books
    }

    /// Number of books.
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Whether the registry has no books.
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Case-insensitive lookup by canonical name or abbreviation.
    pub fn resolve(&self, token: &str) -> Option<&BibleBook> {
        let key = lookup_key(token);
        if key.is_empty() {
            return None;
        }
        self.index
            .get(&key)
            .or_else(|| key.strip_suffix('.').and_then(|k| self.index.get(k)))
            .and_then(|&idx| self.books.get(idx))
    }

    /// Canonical name for `token`, or the trimmed token itself when unknown.
    pub fn full_name<'a>(&'a self, token: &'a str) -> &'a str {
        self.resolve(token).map_or_else(|| token.trim(), |book| book.name.as_str())
    }

    /// Best fuzzy match for an unknown token, for diagnostics.
    pub fn closest(&self, token: &str) -> Option<&BibleBook> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        let matcher = SkimMatcherV2::default();
        self.surfaces
            .iter()
            .filter_map(|(surface, idx)| {
                let score = matcher.fuzzy_match(surface, token)?;
                (score >= MIN_SUGGESTION_SCORE).then_some((score, *idx))
            })
            .max_by_key(|(score, _)| *score)
            .and_then(|(_, idx)| self.books.get(idx))
    }

    /// Regex alternation matching any accepted book form.
    ///
    /// Forms are escaped, sorted longest first, and internal spaces accept
    /// any (or no) whitespace so `1John` and `1 John` both match.
    pub fn pattern(&self) -> String {
        let mut forms: Vec<&str> = self.surfaces.iter().map(|(s, _)| s.as_str()).collect();
        forms.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        forms
            .into_iter()
            .map(|form| {
                form.split_whitespace()
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(r"\s*")
            })
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl Default for BookRegistry {
    fn default() -> Self {
        Self::standard().clone()
    }
}

/// Normalize a token for lookup: lowercase with whitespace removed.
fn lookup_key(token: &str) -> String {
    token
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// `"1 John"` → `"I John"`; `None` for forms without a numeral prefix.
fn roman_variant(form: &str) -> Option<String> {
    let (prefix, rest) = form.split_once(' ')?;
    let n: usize = prefix.parse().ok()?;
    let roman = ROMAN_PREFIXES.get(n.checked_sub(1)?)?;
    Some(format!("{roman} {}", rest.trim_start()))
}
