//! Link and embed rendering.
//!
//! Default output is byte-exact with the host's wiki-link convention:
//! links are `[[Book C.V|alias]]` and embeds are `![[Book C.V#Book C.V|alias]]`,
//! where the heading anchor equals the note title. Lists and ranges render one
//! item per reference, comma-separated for links and one per line for embeds.

pub mod template;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bible::BookRegistry;
use crate::config::Config;
use crate::constants::render::{EMBED_SEPARATOR, LINK_SEPARATOR};
use crate::detector::DetectedReference;
use crate::error::{Error, Result};
use crate::reference::{CanonicalReference, ParsedReference, ReferenceParser};
pub use template::LinkTemplate;

/// How malformed references and inverted ranges are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RangePolicy {
    /// Leave the input text unchanged.
    #[default]
    Lenient,
    /// Report the problem as an error.
    Strict,
}

impl FromStr for RangePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(Error::config(format!("Unknown range policy {other:?}"), "Use `lenient` or `strict`")),
        }
    }
}

/// Link or embed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// `[[target|alias]]`
    #[default]
    Link,
    /// `![[target#target|alias]]`
    Embed,
}

/// `[[target|alias]]` for one reference.
pub fn link(reference: &CanonicalReference, alias: &str) -> String {
    format!("[[{}|{alias}]]", reference.target())
}

/// `![[target#target|alias]]` for one reference.
pub fn embed(reference: &CanonicalReference, alias: &str) -> String {
    let target = reference.target();
    format!("![[{target}#{target}|{alias}]]")
}

/// Renders parsed references, optionally through a custom link template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Renderer {
    template: Option<LinkTemplate>,
}

impl Renderer {
    /// A renderer using `template` for links, or the fixed form when `None`.
    pub const fn new(template: Option<LinkTemplate>) -> Self {
        Self { template }
    }

    /// The custom link template, if any.
    pub const fn template(&self) -> Option<&LinkTemplate> {
        self.template.as_ref()
    }

    /// Render every reference as a link.
    ///
    /// `alias` (the original text) labels the link when the parse produced a
    /// single reference; lists fall back to `"<book as written> C.V"` per item.
    pub fn render_link(&self, parsed: &ParsedReference, alias: Option<&str>) -> String {
        let original = alias.unwrap_or(parsed.source.as_str());
        join(parsed, alias, LINK_SEPARATOR, |reference, label| match &self.template {
            Some(template) => template.render(reference, original),
            None => link(reference, label),
        })
    }

    /// Render every reference as an embed. Templates never apply to embeds.
    pub fn render_embed(&self, parsed: &ParsedReference, alias: Option<&str>) -> String {
        join(parsed, alias, EMBED_SEPARATOR, embed)
    }

    /// Render in `mode`.
    pub fn render(&self, parsed: &ParsedReference, mode: RenderMode, alias: Option<&str>) -> String {
        match mode {
            RenderMode::Link => self.render_link(parsed, alias),
            RenderMode::Embed => self.render_embed(parsed, alias),
        }
    }
}

/// Render each reference with `item` and join them; the source text when there are none.
fn join<F>(parsed: &ParsedReference, alias: Option<&str>, separator: &str, item: F) -> String
where
    F: Fn(&CanonicalReference, &str) -> String,
{
    if parsed.references.is_empty() {
        return parsed.source.clone();
    }
    let single = parsed.references.len() == 1;
    parsed
        .references
        .iter()
        .map(|reference| match alias {
            Some(alias) if single => item(reference, alias),
            _ => item(reference, &parsed.display_alias(reference)),
        })
        .collect::<Vec<_>>()
        .join(separator)
}

/// Parses and renders selections and detections: the formatter commands.
#[derive(Debug, Clone)]
pub struct Formatter<'r> {
    parser: ReferenceParser<'r>,
    renderer: Renderer,
    range_policy: RangePolicy,
}

impl Default for Formatter<'static> {
    fn default() -> Self {
        Self::new(BookRegistry::standard(), Renderer::default(), RangePolicy::default())
    }
}

impl<'r> Formatter<'r> {
    /// Create a formatter.
    pub const fn new(registry: &'r BookRegistry, renderer: Renderer, range_policy: RangePolicy) -> Self {
        Self { parser: ReferenceParser::new(registry), renderer, range_policy }
    }

    /// Create a formatter from loaded settings.
    pub fn from_config(registry: &'r BookRegistry, config: &Config) -> Self {
        Self::new(registry, Renderer::new(config.link_template()), config.range_policy)
    }

    /// The underlying parser.
    pub const fn parser(&self) -> &ReferenceParser<'r> {
        &self.parser
    }

    /// The configured range policy.
    pub const fn range_policy(&self) -> RangePolicy {
        self.range_policy
    }

    /// Link a single verse; any other shape is returned unchanged.
    pub fn link_single_verse(&self, text: &str, alias: Option<&str>) -> Result<String> {
        self.single(text, RenderMode::Link, alias)
    }

    /// Embed a single verse; any other shape is returned unchanged.
    pub fn embed_single_verse(&self, text: &str, alias: Option<&str>) -> Result<String> {
        self.single(text, RenderMode::Embed, alias)
    }

    /// Link every reference of a list or range.
    pub fn link_verse_range(&self, text: &str, alias: Option<&str>) -> Result<String> {
        self.format(text, RenderMode::Link, alias)
    }

    /// Embed every reference of a list or range, one per line.
    pub fn embed_verse_range(&self, text: &str, alias: Option<&str>) -> Result<String> {
        self.format(text, RenderMode::Embed, alias)
    }

    /// Render `text` in `mode`.
    ///
    /// Unparseable text comes back unchanged under [`RangePolicy::Lenient`]
    /// and as an error under [`RangePolicy::Strict`].
    pub fn format(&self, text: &str, mode: RenderMode, alias: Option<&str>) -> Result<String> {
        Ok(match self.parse(text)? {
            Some(parsed) => self.renderer.render(&parsed, mode, alias),
            None => text.to_string(),
        })
    }

    /// Render a detection, aliased with its original text.
    pub fn format_detected(&self, detected: &DetectedReference, mode: RenderMode) -> Result<String> {
        Ok(match self.parse(&detected.normalized_text)? {
            Some(parsed) => self.renderer.render(&parsed, mode, Some(detected.original_text.as_str())),
            None => detected.original_text.clone(),
        })
    }

    fn single(&self, text: &str, mode: RenderMode, alias: Option<&str>) -> Result<String> {
        Ok(match self.parse(text)? {
            Some(parsed) if parsed.is_single_verse() => self.renderer.render(&parsed, mode, alias),
            _ => text.to_string(),
        })
    }

    fn parse(&self, text: &str) -> Result<Option<ParsedReference>> {
        match self.parser.parse(text) {
            Ok(parsed) => Ok(Some(parsed)),
            Err(e) if e.is_reference_error() && self.range_policy == RangePolicy::Lenient => {
                tracing::debug!("Leaving {text:?} unchanged: {e}");
                Ok(None)
            }
            Err(e) => {
                tracing::warn!("Rejected reference {text:?}: {e}");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::detector::detect;
    use crate::reference::parse;

    fn formatter() -> Formatter<'static> {
        Formatter::default()
    }

    #[test]
    fn links_a_simple_verse() {
        assert_eq!(formatter().link_single_verse("John 3:16", None).unwrap(), "[[John 3.16|John 3.16]]");
    }

    #[test]
    fn preserves_original_text_as_alias() {
        assert_eq!(
            formatter().link_single_verse("John 3.16", Some("John 3:16")).unwrap(),
            "[[John 3.16|John 3:16]]"
        );
    }

    #[test]
    fn handles_numbered_books() {
        assert_eq!(formatter().link_single_verse("1 John 1:9", None).unwrap(), "[[1 John 1.9|1 John 1.9]]");
    }

    #[test]
    fn aliases_with_book_as_written() {
        assert_eq!(formatter().link_single_verse("Rom 8:1", None).unwrap(), "[[Romans 8.1|Rom 8.1]]");
    }

    #[test]
    fn single_verse_commands_ignore_ranges() {
        let f = formatter();
        assert_eq!(f.link_single_verse("John 3:16-17", None).unwrap(), "John 3:16-17");
        assert_eq!(f.embed_single_verse("Psalm 23", None).unwrap(), "Psalm 23");
    }

    #[test]
    fn embeds_a_single_verse() {
        assert_eq!(
            formatter().embed_single_verse("Rom 8:1", None).unwrap(),
            "![[Romans 8.1#Romans 8.1|Rom 8.1]]"
        );
    }

    #[test]
    fn expands_ranges() {
        let result = formatter().link_verse_range("John 3:16-17", None).unwrap();
        assert_eq!(result, "[[John 3.16|John 3.16]], [[John 3.17|John 3.17]]");
    }

    #[test]
    fn expands_lists() {
        let result = formatter().link_verse_range("Romans 8:1, 3", None).unwrap();
        assert!(result.contains("[[Romans 8.1|Romans 8.1]]"));
        assert!(result.contains("[[Romans 8.3|Romans 8.3]]"));
    }

    #[test]
    fn list_ignores_single_alias() {
        let result = formatter().link_verse_range("Rom 8:1-2", Some("Rom 8:1-2")).unwrap();
        assert_eq!(result, "[[Romans 8.1|Rom 8.1]], [[Romans 8.2|Rom 8.2]]");
    }

    #[test]
    fn embeds_ranges_one_per_line() {
        let result = formatter().embed_verse_range("Genesis 1:1-2", None).unwrap();
        assert_eq!(
            result,
            "![[Genesis 1.1#Genesis 1.1|Genesis 1.1]]\n![[Genesis 1.2#Genesis 1.2|Genesis 1.2]]"
        );
    }

    #[test]
    fn whole_chapter_targets() {
        assert_eq!(formatter().link_verse_range("Psalm 23", None).unwrap(), "[[Psalms 23|Psalm 23]]");
    }

    #[test]
    fn lenient_policy_returns_input_unchanged() {
        let f = formatter();
        assert_eq!(f.link_verse_range("John 3:17-16", None).unwrap(), "John 3:17-16");
        assert_eq!(f.embed_verse_range("not a verse", None).unwrap(), "not a verse");
    }

    #[test]
    fn strict_policy_reports_invalid_ranges() {
        let f = Formatter::new(BookRegistry::standard(), Renderer::default(), RangePolicy::Strict);
        let err = f.link_verse_range("John 3:17-16", None).unwrap_err();
        assert!(matches!(err, Error::InvalidRange { start: 17, end: 16, .. }));
        assert!(f.link_verse_range("John", None).unwrap_err().is_reference_error());
    }

    #[test]
    fn custom_template_applies_to_links_only() {
        let renderer = Renderer::new(Some(LinkTemplate::new("[[{book} {chapter}:{verse}|{original}]]")));
        let parsed = parse("Jn 3:16").unwrap();
        assert_eq!(renderer.render_link(&parsed, None), "[[John 3:16|Jn 3:16]]");
        assert_eq!(renderer.render_embed(&parsed, None), "![[John 3.16#John 3.16|Jn 3.16]]");
    }

    #[test]
    fn custom_template_for_lists() {
        let renderer = Renderer::new(Some(LinkTemplate::new("[[{book} {chapter}.{verse}]]")));
        let parsed = parse("Romans 8:1, 3").unwrap();
        assert_eq!(renderer.render_link(&parsed, None), "[[Romans 8.1]], [[Romans 8.3]]");
    }

    #[test]
    fn formats_detected_written_reference() {
        let found = detect("Ephesians chapter 5, verse 8");
        let out = formatter().format_detected(&found[0], RenderMode::Link).unwrap();
        assert_eq!(out, "[[Ephesians 5.8|Ephesians chapter 5, verse 8]]");
    }

    #[test]
    fn formats_detected_list() {
        let found = detect("see Rom 8:1, 3 today");
        let out = formatter().format_detected(&found[0], RenderMode::Link).unwrap();
        assert_eq!(out, "[[Romans 8.1|Rom 8.1]], [[Romans 8.3|Rom 8.3]]");
    }

    #[test]
    fn range_policy_parses() {
        assert_eq!("strict".parse::<RangePolicy>().unwrap(), RangePolicy::Strict);
        assert_eq!(" Lenient ".parse::<RangePolicy>().unwrap(), RangePolicy::Lenient);
        assert!("sometimes".parse::<RangePolicy>().is_err());
    }
}
