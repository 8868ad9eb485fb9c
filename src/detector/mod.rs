//! Reference detection in free-form text.
//!
//! Two surface syntaxes are recognized: the numeric form (`Rom 8:1, 3-5`,
//! `John 3 verse 16`) and the written form (`Ephesians chapter 5, verse 8`).
//! Matches that sit entirely inside existing `[[...]]`/`![[...]]` markup are
//! dropped, and the rest are returned in document order.

pub mod links;

use std::ops::Range;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::bible::BookRegistry;
use crate::error::{Error, Result};
use links::LinkMask;

/// Compiled size limit for the detector patterns; the book alternation is large.
const PATTERN_SIZE_LIMIT: usize = 32 * (1 << 20);

/// Chapter and optional verse at the head of a numeric locator.
#[allow(clippy::expect_used)]
static RE_LOCATOR_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\d{1,3}(?:(?:[.:]|\s+(?:verse|vs\.?|v\.?)\s+)\d{1,3})?").expect("valid regex: RE_LOCATOR_HEAD")
});

/// One separator-plus-number item of a numeric locator's list tail.
#[allow(clippy::expect_used)]
static RE_LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*(?:-|\x{2013}|and|&|,)\s*(\d{1,3})").expect("valid regex: RE_LIST_ITEM")
});

/// Detector over the standard book table.
#[allow(clippy::expect_used)]
static STANDARD: LazyLock<ReferenceDetector> = LazyLock::new(|| {
    ReferenceDetector::new(BookRegistry::standard()).expect("valid detector patterns for the standard book table")
});

/// Which surface syntax produced a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReferenceKind {
    /// `Book C:V` and its lists/ranges.
    Numeric,
    /// `Book chapter C, verse V`.
    Written,
}

/// What to do when numeric and written matches overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OverlapPolicy {
    /// Keep the longer of two overlapping matches (the earlier one on a tie).
    #[default]
    PreferLonger,
    /// Report every match, overlapping or not.
    KeepAll,
}

impl FromStr for OverlapPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "preferlonger" => Ok(Self::PreferLonger),
            "keepall" => Ok(Self::KeepAll),
            other => Err(Error::config(
                format!("Unknown overlap policy {other:?}"),
                "Use `preferLonger` or `keepAll`",
            )),
        }
    }
}

/// One unlinked reference found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedReference {
    /// Canonical display form used for expansion (`"Ephesians 5.8"`).
    pub normalized_text: String,
    /// Exact matched substring, used as the link alias.
    pub original_text: String,
    /// Byte offset of the match start.
    #[serde(rename = "byteStart")]
    pub start: usize,
    /// Byte offset one past the match end.
    #[serde(rename = "byteEnd")]
    pub end: usize,
    /// Surface syntax that matched.
    pub kind: ReferenceKind,
}

impl DetectedReference {
    /// Byte span of the match.
    pub const fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Length of the match in bytes.
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the match is empty (never true for real detections).
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Character offsets of the match within the document it was detected in.
    pub fn char_range(&self, document: &str) -> Range<usize> {
        let count = |end: usize| document.get(..end).map_or(0, |s| s.chars().count());
        count(self.start)..count(self.end)
    }

    /// Whether the text at the recorded span still equals the matched text.
    pub fn is_current(&self, document: &str) -> bool {
        document.get(self.span()) == Some(self.original_text.as_str())
    }
}

/// Compiled numeric and written reference patterns.
///
/// Over the standard book table the two patterns never overlap: written
/// matches need a chapter keyword right after the book, which the numeric
/// pattern cannot consume. A custom table whose forms collide with the
/// keywords (a book called `Verse`) can make them overlap, which is what
/// [`OverlapPolicy`] resolves.
#[derive(Debug, Clone)]
pub struct ReferenceDetector {
    numeric: Regex,
    written: Regex,
    /// A book form followed by a chapter number or keyword, anchored at the start.
    citation_start: Regex,
    overlap: OverlapPolicy,
}

impl ReferenceDetector {
    /// Build a detector recognizing the books in `registry`.
    pub fn new(registry: &BookRegistry) -> Result<Self> {
        let books = registry.pattern();
        let numeric = compile(&format!(
            r"(?i)\b({books})\s*(\d{{1,3}}(?:(?:[.:]|\s+(?:verse|vs\.?|v\.?)\s+)\d{{1,3}})?(?:\s*(?:-|\x{{2013}}|and|&|,)\s*\d{{1,3}})*)"
        ))?;
        let written = compile(&format!(
            r"(?i)\b({books})\s+(?:chapter|chap\.?|ch\.?)\s*(\d{{1,3}})\s*,?\s*(?:verse|vs\.?|v\.?)\s*(\d{{1,3}})"
        ))?;
        let citation_start = compile(&format!(r"(?i)^(?:{books})(?:\s*\d|\s+(?:chapter|chap\.?|ch\.?)\b)"))?;
        Ok(Self { numeric, written, citation_start, overlap: OverlapPolicy::default() })
    }

    /// The detector for the standard book table.
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    /// Use `policy` for overlapping matches.
    #[must_use]
    pub const fn with_overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.overlap = policy;
        self
    }

    /// The configured overlap policy.
    pub const fn overlap_policy(&self) -> OverlapPolicy {
        self.overlap
    }

    /// Find every unlinked reference in `document`, ordered by start offset.
    pub fn detect(&self, document: &str) -> Vec<DetectedReference> {
        let mask = LinkMask::scan(document);
        let mut matches = Vec::new();

        // Matches can end early, so the search position is advanced by hand.
        let mut pos = 0;
        while let Some(caps) = self.numeric.captures_at(document, pos) {
            let (Some(full), Some(book), Some(locator)) = (caps.get(0), caps.get(1), caps.get(2)) else {
                break;
            };
            let Some(end) = self.numeric_end(document, &locator) else {
                tracing::debug!("Skipping {:?} at {}: number runs on", full.as_str(), full.start());
                pos = full.end();
                continue;
            };
            pos = end;
            if mask.covers(full.start(), end) {
                tracing::debug!("Skipping linked reference {:?} at {}", full.as_str(), full.start());
                continue;
            }
            matches.push(DetectedReference {
                normalized_text: format!("{} {}", book.as_str(), &document[locator.start()..end]),
                original_text: document[full.start()..end].to_string(),
                start: full.start(),
                end,
                kind: ReferenceKind::Numeric,
            });
        }

        for caps in self.written.captures_iter(document) {
            let (Some(full), Some(book), Some(chapter), Some(verse)) =
                (caps.get(0), caps.get(1), caps.get(2), caps.get(3))
            else {
                continue;
            };
            if starts_with_digit(document, full.end()) {
                tracing::debug!("Skipping {:?} at {}: number runs on", full.as_str(), full.start());
                continue;
            }
            if mask.covers(full.start(), full.end()) {
                tracing::debug!("Skipping linked reference {:?} at {}", full.as_str(), full.start());
                continue;
            }
            matches.push(DetectedReference {
                normalized_text: format!("{} {}.{}", book.as_str().trim(), chapter.as_str(), verse.as_str()),
                original_text: full.as_str().to_string(),
                start: full.start(),
                end: full.end(),
                kind: ReferenceKind::Written,
            });
        }

        // Stable: numeric before written at the same offset.
        matches.sort_by_key(|m| m.start);

        match self.overlap {
            OverlapPolicy::KeepAll => matches,
            OverlapPolicy::PreferLonger => drop_overlaps(matches),
        }
    }

    /// Where a numeric match really ends, given its locator capture.
    ///
    /// A list item that opens the next citation (`Rom 8:28, 1 Cor 13:4`) is cut
    /// off along with its separator. A trailing number that runs into more digits
    /// drops that list item, or the whole match when it is the head. `None`
    /// means the match is not a reference.
    fn numeric_end(&self, document: &str, locator: &regex::Match<'_>) -> Option<usize> {
        let text = locator.as_str();
        let head = RE_LOCATOR_HEAD.find(text).map_or(text.len(), |m| m.end());
        let base = locator.start() + head;

        // (separator start, number start) of each list item, contiguous from the head
        let mut items: Vec<(usize, usize)> = Vec::new();
        let mut expected = base;
        for caps in RE_LIST_ITEM.captures_iter(text.get(head..)?) {
            let (Some(item), Some(number)) = (caps.get(0), caps.get(1)) else {
                break;
            };
            if base + item.start() != expected {
                break;
            }
            items.push((base + item.start(), base + number.start()));
            expected = base + item.end();
        }

        let next_citation = items
            .iter()
            .find(|&&(_, number)| document.get(number..).is_some_and(|rest| self.citation_start.is_match(rest)));
        if let Some(&(separator, _)) = next_citation {
            return Some(separator);
        }

        let end = locator.end();
        if !starts_with_digit(document, end) {
            return Some(end);
        }
        items.last().map(|&(separator, _)| separator)
    }
}

fn starts_with_digit(document: &str, offset: usize) -> bool {
    document.get(offset..).is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
}

/// Detect references with the standard book table.
pub fn detect(document: &str) -> Vec<DetectedReference> {
    ReferenceDetector::standard().detect(document)
}

fn compile(pattern: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(pattern).size_limit(PATTERN_SIZE_LIMIT).build()?)
}

/// Collapse overlapping matches (sorted by start), keeping the longer one.
fn drop_overlaps(matches: Vec<DetectedReference>) -> Vec<DetectedReference> {
    let mut kept: Vec<DetectedReference> = Vec::with_capacity(matches.len());
    for m in matches {
        match kept.last_mut() {
            Some(last) if m.start < last.end => {
                if m.len() > last.len() {
                    tracing::debug!("Overlap: {:?} replaces {:?}", m.original_text, last.original_text);
                    *last = m;
                } else {
                    tracing::debug!("Overlap: dropping {:?} in favor of {:?}", m.original_text, last.original_text);
                }
            }
            _ => kept.push(m),
        }
    }
    kept
}
