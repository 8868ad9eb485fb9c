//! Chapter/verse list expansion.
//!
//! A normalized locator (`8:1,3-5` or `8,9-10`) is split on commas and each
//! part is classified, then resolved against a running [`LocatorState`].
//! Bare numbers are chapters until a `C:V` part has been seen, and verses in
//! that chapter afterwards. Single-chapter books start out in verse context.

use crate::constants::reference::MAX_NUMBER_DIGITS;

/// Why a locator part could not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartError {
    /// Not a recognized `C`, `C-C`, `C:V` or `C:V-V` shape.
    Malformed,
    /// A range whose end precedes its start.
    Inverted {
        /// First value of the range.
        start: u32,
        /// Last value of the range.
        end: u32,
    },
}

/// One comma-separated locator part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    /// `C:V` or `C:V-V2`; always verses.
    ChapterVerse {
        /// Chapter number.
        chapter: u32,
        /// First verse.
        start: u32,
        /// Last verse (equal to `start` for a single verse).
        end: u32,
    },
    /// `N` or `N-M`; chapters or verses depending on context.
    Bare {
        /// First value.
        start: u32,
        /// Last value (equal to `start` for a single number).
        end: u32,
    },
}

impl Part {
    /// Classify one part of a normalized locator.
    pub fn classify(part: &str) -> Result<Self, PartError> {
        if let Some((chapter, verses)) = part.split_once(':') {
            let chapter = parse_number(chapter)?;
            let (start, end) = parse_span(verses)?;
            Ok(Self::ChapterVerse { chapter, start, end })
        } else {
            let (start, end) = parse_span(part)?;
            Ok(Self::Bare { start, end })
        }
    }
}

/// Running context carried across the parts of one locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorState {
    /// No verse marker seen yet: bare numbers name chapters.
    Chapters,
    /// A verse has been produced: bare numbers are verses of `chapter`.
    Verses {
        /// Chapter that bare verse numbers belong to.
        chapter: u32,
    },
}

impl LocatorState {
    /// Initial state for a book.
    pub const fn for_book(single_chapter: bool) -> Self {
        if single_chapter {
            Self::Verses { chapter: 1 }
        } else {
            Self::Chapters
        }
    }

    /// Resolve `part` in the current context, appending `(chapter, verse)`
    /// pairs to `out` and updating the context.
    pub fn step(&mut self, part: Part, out: &mut Vec<(u32, Option<u32>)>) {
        match (part, *self) {
            (Part::ChapterVerse { chapter, start, end }, _) => {
                out.extend((start..=end).map(|verse| (chapter, Some(verse))));
                *self = Self::Verses { chapter };
            }
            (Part::Bare { start, end }, Self::Verses { chapter }) => {
                out.extend((start..=end).map(|verse| (chapter, Some(verse))));
            }
            (Part::Bare { start, end }, Self::Chapters) => {
                out.extend((start..=end).map(|chapter| (chapter, None)));
            }
        }
    }
}

/// Expand a normalized locator into `(chapter, verse)` pairs in input order.
///
/// Empty parts (`8:1,,3`) are ignored; an empty locator is malformed.
pub fn expand_locator(locator: &str, single_chapter: bool) -> Result<Vec<(u32, Option<u32>)>, PartError> {
    let mut state = LocatorState::for_book(single_chapter);
    let mut out = Vec::new();

    for raw in locator.split(',').filter(|p| !p.is_empty()) {
        let part = Part::classify(raw)?;
        state.step(part, &mut out);
    }

    if out.is_empty() {
        return Err(PartError::Malformed);
    }
    Ok(out)
}

/// `N` or `N-M` with `N <= M`.
fn parse_span(text: &str) -> Result<(u32, u32), PartError> {
    match text.split_once('-') {
        Some((start, end)) => {
            let start = parse_number(start)?;
            let end = parse_number(end)?;
            if end < start {
                return Err(PartError::Inverted { start, end });
            }
            Ok((start, end))
        }
        None => {
            let n = parse_number(text)?;
            Ok((n, n))
        }
    }
}

fn parse_number(text: &str) -> Result<u32, PartError> {
    if text.is_empty() || text.len() > MAX_NUMBER_DIGITS || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PartError::Malformed);
    }
    text.parse().map_err(|_| PartError::Malformed)
}
