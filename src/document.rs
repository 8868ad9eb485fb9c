//! Whole-document operations built on the detector and formatter.

use serde::Serialize;

use crate::detector::{DetectedReference, ReferenceDetector};
use crate::error::Result;
use crate::render::{Formatter, RenderMode};

/// Result of rewriting every detection in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatOutcome {
    /// The rewritten document.
    pub text: String,
    /// Detections replaced by a link or embed.
    pub formatted: usize,
    /// Detections left as they were because they rendered unchanged.
    pub skipped: usize,
}

/// Splice `replacement` over the span of `detected`.
///
/// Offsets of later detections are invalid afterwards; re-detect before the next
/// replacement. A detection that no longer matches the document is left alone.
pub fn replace_detection(document: &str, detected: &DetectedReference, replacement: &str) -> String {
    if !detected.is_current(document) {
        tracing::warn!(
            "Stale detection {:?} at {}..{}; document left unchanged",
            detected.original_text,
            detected.start,
            detected.end
        );
        return document.to_string();
    }
    let mut text = String::with_capacity(document.len() - detected.len() + replacement.len());
    text.push_str(&document[..detected.start]);
    text.push_str(replacement);
    text.push_str(&document[detected.end..]);
    text
}

/// Detect and render every reference in `document`.
///
/// Replacements are applied from the last detection to the first so earlier
/// offsets stay valid. Under a strict range policy the first rejected
/// reference aborts the whole rewrite.
pub fn format_all(
    document: &str,
    detector: &ReferenceDetector,
    formatter: &Formatter<'_>,
    mode: RenderMode,
) -> Result<FormatOutcome> {
    let detections = detector.detect(document);
    let mut text = document.to_string();
    let mut formatted = 0;
    let mut skipped = 0;
    // Right edge of the last splice; overlapping detections (keepAll) behind it are skipped.
    let mut limit = document.len();

    for detected in detections.iter().rev() {
        let rendered = formatter.format_detected(detected, mode)?;
        if rendered == detected.original_text || detected.end > limit {
            skipped += 1;
            continue;
        }
        text.replace_range(detected.span(), &rendered);
        limit = detected.start;
        formatted += 1;
    }

    tracing::debug!("Formatted {formatted} reference(s), skipped {skipped}");
    Ok(FormatOutcome { text, formatted, skipped })
}

/// The first `max` detections, for listings.
pub fn visible(detections: &[DetectedReference], max: usize) -> &[DetectedReference] {
    &detections[..detections.len().min(max)]
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::bible::{BibleBook, BookRegistry};
    use crate::detector::{detect, OverlapPolicy};
    use crate::render::{RangePolicy, Renderer};

    #[test]
    fn replaces_one_detection() {
        let doc = "Read John 3:16 today.";
        let found = detect(doc);
        let out = replace_detection(doc, &found[0], "[[John 3.16|John 3:16]]");
        assert_eq!(out, "Read [[John 3.16|John 3:16]] today.");
        assert!(detect(&out).is_empty());
    }

    #[test]
    fn stale_detection_is_ignored() {
        let found = detect("Read John 3:16 today.");
        assert_eq!(replace_detection("Something else", &found[0], "x"), "Something else");
    }

    #[test]
    fn formats_every_detection() {
        let doc = "See Romans 8:1 and also Romans 8:28.\nThen Ephesians chapter 5, verse 8.";
        let outcome = format_all(doc, ReferenceDetector::standard(), &Formatter::default(), RenderMode::Link).unwrap();
        assert_eq!(
            outcome.text,
            "See [[Romans 8.1|Romans 8:1]] and also [[Romans 8.28|Romans 8:28]].\n\
             Then [[Ephesians 5.8|Ephesians chapter 5, verse 8]]."
        );
        assert_eq!(outcome.formatted, 3);
        assert_eq!(outcome.skipped, 0);
        assert!(detect(&outcome.text).is_empty());
    }

    #[test]
    fn embeds_every_detection() {
        let doc = "Jn 3:16";
        let outcome = format_all(doc, ReferenceDetector::standard(), &Formatter::default(), RenderMode::Embed).unwrap();
        assert_eq!(outcome.text, "![[John 3.16#John 3.16|Jn 3:16]]");
    }

    #[test]
    fn invalid_ranges_are_skipped_when_lenient() {
        let doc = "Bad John 3:17-16, good John 3:16.";
        let outcome = format_all(doc, ReferenceDetector::standard(), &Formatter::default(), RenderMode::Link).unwrap();
        assert_eq!(outcome.text, "Bad John 3:17-16, good [[John 3.16|John 3:16]].");
        assert_eq!(outcome.formatted, 1);
        assert_eq!(outcome.skipped, 1);
    }

    #[test]
    fn invalid_ranges_fail_when_strict() {
        let formatter = Formatter::new(BookRegistry::standard(), Renderer::default(), RangePolicy::Strict);
        let result = format_all("John 3:17-16", ReferenceDetector::standard(), &formatter, RenderMode::Link);
        assert!(result.is_err());
    }

    #[test]
    fn keep_all_overlaps_splice_once() {
        let registry =
            BookRegistry::new(vec![BibleBook::new("Acts", ["Act"]), BibleBook::new("Verse", ["Vrs"])]).unwrap();
        let detector = ReferenceDetector::new(&registry).unwrap().with_overlap_policy(OverlapPolicy::KeepAll);
        let formatter = Formatter::new(&registry, Renderer::default(), RangePolicy::default());
        let doc = "Acts chapter 2, verse 4";
        assert_eq!(detector.detect(doc).len(), 2);

        let outcome = format_all(doc, &detector, &formatter, RenderMode::Link).unwrap();
        assert_eq!(outcome.formatted, 1);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.text.matches("[[").count(), 1);

        let detector = detector.with_overlap_policy(OverlapPolicy::PreferLonger);
        let outcome = format_all(doc, &detector, &formatter, RenderMode::Link).unwrap();
        assert_eq!(outcome.text, "[[Acts 2.4|Acts chapter 2, verse 4]]");
    }

    #[test]
    fn adjacent_citations_keep_their_own_numbers() {
        let format = |doc: &str| {
            format_all(doc, ReferenceDetector::standard(), &Formatter::default(), RenderMode::Link).unwrap().text
        };
        assert_eq!(
            format("Romans 8:28, 1 Corinthians 13:4"),
            "[[Romans 8.28|Romans 8:28]], [[1 Corinthians 13.4|1 Corinthians 13:4]]"
        );
        assert_eq!(
            format("Read Rom 8:1 and 2 Kings 2:11"),
            "Read [[Romans 8.1|Rom 8:1]] and [[2 Kings 2.11|2 Kings 2:11]]"
        );
    }

    #[test]
    fn long_numbers_are_left_alone() {
        let outcome =
            format_all("John 3:16000", ReferenceDetector::standard(), &Formatter::default(), RenderMode::Link).unwrap();
        assert_eq!(outcome.text, "John 3:16000");
        assert_eq!(outcome.formatted + outcome.skipped, 0);
    }

    #[test]
    fn caps_visible_detections() {
        let found = detect("John 3:16, Rom 8:1; Gen 1:1; Ex 20:3");
        assert_eq!(visible(&found, 2).len(), 2);
        assert_eq!(visible(&found, 50).len(), found.len());
        assert!(visible(&found, 0).is_empty());
    }
}
