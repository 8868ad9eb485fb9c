//! User-supplied link templates.

use crate::reference::CanonicalReference;

/// Placeholders recognized in a link template.
pub const PLACEHOLDERS: &[&str] = &["{book}", "{chapter}", "{verse}", "{original}"];

/// A link template such as `[[{book} {chapter}:{verse}|{original}]]`.
///
/// `{verse}` renders empty for whole-chapter references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTemplate {
    template: String,
}

impl LinkTemplate {
    /// Wrap a template string.
    pub fn new(template: impl Into<String>) -> Self {
        Self { template: template.into() }
    }

    /// The raw template string.
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Whether the template uses at least one placeholder.
    pub fn has_placeholders(&self) -> bool {
        PLACEHOLDERS.iter().any(|p| self.template.contains(p))
    }

    /// Substitute the placeholders for one reference.
    pub fn render(&self, reference: &CanonicalReference, original: &str) -> String {
        let verse = reference.verse.map(|v| v.to_string()).unwrap_or_default();
        self.template
            .replace("{book}", &reference.book)
            .replace("{chapter}", &reference.chapter.to_string())
            .replace("{verse}", &verse)
            .replace("{original}", original)
    }
}
