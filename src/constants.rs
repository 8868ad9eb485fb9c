//! Shared constants.
//!
//! Centralizes defaults and limits used across detection, expansion and rendering.

/// Rendering defaults.
pub mod render {
    /// Default link template, used only when custom templates are enabled.
    pub const DEFAULT_TEMPLATE: &str = "[[{book} {chapter}.{verse}]]";

    /// Separator between links produced from one reference list.
    pub const LINK_SEPARATOR: &str = ", ";

    /// Separator between embeds produced from one reference list.
    pub const EMBED_SEPARATOR: &str = "\n";
}

/// Detection listing constants.
pub mod detect {
    /// Default number of detections shown in a listing.
    pub const DEFAULT_MAX_VERSES: usize = 50;
}

/// Reference grammar constants.
pub mod reference {
    /// Maximum digits accepted for a chapter or verse number.
    pub const MAX_NUMBER_DIGITS: usize = 3;

    /// Books with a single chapter: a bare number after these is a verse.
    pub const SINGLE_CHAPTER_BOOKS: &[&str] = &["Obadiah", "Philemon", "2 John", "3 John", "Jude"];

    /// Roman numeral prefixes for numbered books, indexed by number - 1.
    pub const ROMAN_PREFIXES: &[&str] = &["I", "II", "III"];
}

/// Environment variable names read by the configuration loader.
pub mod env {
    /// Path of a JSON settings file.
    pub const SETTINGS: &str = "VERSELINK_SETTINGS";
    /// Enables the custom link template.
    pub const USE_CUSTOM_TEMPLATE: &str = "VERSELINK_USE_CUSTOM_TEMPLATE";
    /// Custom link template.
    pub const TEMPLATE: &str = "VERSELINK_TEMPLATE";
    /// Detection listing cap.
    pub const MAX_VERSES: &str = "VERSELINK_MAX_VERSES";
    /// `lenient` or `strict`.
    pub const RANGE_POLICY: &str = "VERSELINK_RANGE_POLICY";
    /// `preferLonger` or `keepAll`.
    pub const OVERLAP_POLICY: &str = "VERSELINK_OVERLAP_POLICY";
    /// Path of an external JSON book table.
    pub const BOOKS: &str = "VERSELINK_BOOKS";
    /// Log level for the command-line tool.
    pub const LOG: &str = "VERSELINK_LOG";
}
