//! `verselink` - detect Bible references in notes and turn them into wiki links.
//!
//! The crate finds references such as `John 3:16`, `Rom 8:1, 3-5` or
//! `Ephesians chapter 5, verse 8` in free text, normalizes them against a
//! registry of book names and abbreviations, and renders each verse as a
//! `[[Book C.V|alias]]` link or `![[Book C.V#Book C.V|alias]]` embed.
//!
//! ```
//! use verselink::{detect, Formatter};
//!
//! let found = detect("For God so loved the world (John 3:16)");
//! assert_eq!(found[0].original_text, "John 3:16");
//!
//! let link = Formatter::default().link_verse_range("Rom 8:1-2", None).unwrap();
//! assert_eq!(link, "[[Romans 8.1|Rom 8.1]], [[Romans 8.2|Rom 8.2]]");
//! ```

pub mod bible;
pub mod config;
pub mod constants;
pub mod detector;
pub mod document;
pub mod error;
pub mod reference;
pub mod render;

pub use bible::{BibleBook, BookRegistry};
pub use config::Config;
pub use detector::{detect, DetectedReference, OverlapPolicy, ReferenceDetector, ReferenceKind};
pub use document::{format_all, replace_detection, visible, FormatOutcome};
pub use error::{Error, Result};
pub use reference::{expand, parse, try_expand, CanonicalReference, ParsedReference, ReferenceParser};
pub use render::{embed, link, Formatter, LinkTemplate, RangePolicy, RenderMode, Renderer};
