//! Spans already wrapped in `[[...]]` or `![[...]]` markup.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// Non-greedy link or embed markup on a single line.
#[allow(clippy::expect_used)]
static RE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!?\[\[.*?\]\]").expect("valid regex: RE_LINK")
});

/// Exclusion mask of existing link spans, sorted by start offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkMask {
    ranges: Vec<Range<usize>>,
}

impl LinkMask {
    /// Record every link/embed span in `document`.
    pub fn scan(document: &str) -> Self {
        let ranges = RE_LINK.find_iter(document).map(|m| m.range()).collect();
        Self { ranges }
    }

    /// Recorded spans, in document order.
    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    /// Whether `start..end` lies fully inside one recorded span.
    pub fn covers(&self, start: usize, end: usize) -> bool {
        // Spans never overlap, so only the last one starting at or before `start` can contain it.
        let idx = self.ranges.partition_point(|r| r.start <= start);
        idx.checked_sub(1)
            .and_then(|i| self.ranges.get(i))
            .is_some_and(|r| end <= r.end)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn records_links_and_embeds() {
        let doc = "a [[John 3.16]] b ![[Rom 8.1#Rom 8.1]] c";
        let mask = LinkMask::scan(doc);
        assert_eq!(mask.ranges().len(), 2);
        assert_eq!(&doc[mask.ranges()[0].clone()], "[[John 3.16]]");
        assert_eq!(&doc[mask.ranges()[1].clone()], "![[Rom 8.1#Rom 8.1]]");
    }

    #[test]
    fn links_are_non_greedy() {
        let mask = LinkMask::scan("[[a]] text [[b]]");
        assert_eq!(mask.ranges(), &[0..5, 11..16]);
    }

    #[test]
    fn covers_only_fully_contained_spans() {
        let doc = "x [[John 3:16]] y";
        let mask = LinkMask::scan(doc);
        let inner = doc.find("John").unwrap();
        assert!(mask.covers(inner, inner + "John 3:16".len()));
        assert!(!mask.covers(0, 5));
        assert!(!mask.covers(inner, doc.len()));
        assert!(!mask.covers(doc.len() - 1, doc.len()));
    }

    #[test]
    fn empty_document_has_no_spans() {
        let mask = LinkMask::scan("");
        assert!(mask.ranges().is_empty());
        assert!(!mask.covers(0, 0));
    }
}
