//! Formatter configuration.
//!
//! Handles loading settings from a JSON settings file, environment variables
//! and .env files. Field names follow the plugin settings file, so an
//! existing `data.json` can be pointed at directly.

use std::borrow::Cow;
use std::env;
use std::path::{Path, PathBuf};

use dotenv::dotenv;
use serde::{Deserialize, Serialize};

use crate::bible::BookRegistry;
use crate::constants::detect::DEFAULT_MAX_VERSES;
use crate::constants::env as vars;
use crate::constants::render::DEFAULT_TEMPLATE;
use crate::detector::OverlapPolicy;
use crate::error::{Error, Result};
use crate::render::{LinkTemplate, RangePolicy};

/// Settings consumed by the detector and renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Render links through `template` instead of the fixed form.
    pub use_custom_template: bool,
    /// Link template with `{book}`, `{chapter}`, `{verse}`, `{original}`.
    pub template: String,
    /// Number of detections shown in a listing.
    pub max_verses: usize,
    /// Handling of malformed references and inverted ranges.
    pub range_policy: RangePolicy,
    /// Handling of overlapping detections.
    pub overlap_policy: OverlapPolicy,
    /// External JSON book table replacing the embedded one.
    pub books_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            use_custom_template: false,
            template: DEFAULT_TEMPLATE.to_string(),
            max_verses: DEFAULT_MAX_VERSES,
            range_policy: RangePolicy::default(),
            overlap_policy: OverlapPolicy::default(),
            books_path: None,
        }
    }
}

impl Config {
    /// Load configuration from the default settings file and environment.
    pub fn load() -> Result<Self> {
        Self::load_with(None)
    }

    /// Load configuration, reading `settings` instead of the default settings file.
    pub fn load_with(settings: Option<&Path>) -> Result<Self> {
        // Try to load .env file if present
        dotenv().ok();

        let path = settings.map(Path::to_path_buf).or_else(settings_path);
        let mut config = path.map_or_else(|| Ok(Self::default()), |path| Self::from_json_file(&path))?;

        config.apply_env(|key| env::var(key).ok());

        if config.use_custom_template && !config.link_template().is_some_and(|t| t.has_placeholders()) {
            tracing::warn!("Custom template {:?} has no placeholders", config.template);
        }

        Ok(config)
    }

    /// Read a JSON settings file. Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).map_err(|e| Error::io(e, path.to_path_buf()))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| Error::parse(e.to_string(), path.to_path_buf()))?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(config)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    ///
    /// Values that fail to parse are logged and ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(vars::USE_CUSTOM_TEMPLATE) {
            match parse_bool(&value) {
                Some(flag) => self.use_custom_template = flag,
                None => tracing::warn!("Ignoring {}={value:?}: expected true/false", vars::USE_CUSTOM_TEMPLATE),
            }
        }

        if let Some(template) = lookup(vars::TEMPLATE) {
            self.template = template;
        }

        if let Some(value) = lookup(vars::MAX_VERSES) {
            match value.trim().parse::<usize>() {
                Ok(max) => self.max_verses = max,
                Err(e) => tracing::warn!("Ignoring {}={value:?}: {e}", vars::MAX_VERSES),
            }
        }

        if let Some(value) = lookup(vars::RANGE_POLICY) {
            match value.parse() {
                Ok(policy) => self.range_policy = policy,
                Err(e) => tracing::warn!("Ignoring {}: {e}", vars::RANGE_POLICY),
            }
        }

        if let Some(value) = lookup(vars::OVERLAP_POLICY) {
            match value.parse() {
                Ok(policy) => self.overlap_policy = policy,
                Err(e) => tracing::warn!("Ignoring {}: {e}", vars::OVERLAP_POLICY),
            }
        }

        if let Some(path) = lookup(vars::BOOKS) {
            self.books_path = Some(expand_path(&path));
        }
    }

    /// The link template, when custom templates are enabled.
    pub fn link_template(&self) -> Option<LinkTemplate> {
        self.use_custom_template.then(|| LinkTemplate::new(self.template.clone()))
    }

    /// The configured book registry: the external table if set, else the embedded one.
    pub fn registry(&self) -> Result<Cow<'static, BookRegistry>> {
        self.books_path.as_ref().map_or_else(
            || Ok(Cow::Borrowed(BookRegistry::standard())),
            |path| BookRegistry::from_file(&expand_path(&path.to_string_lossy())).map(Cow::Owned),
        )
    }
}

/// Settings file named by the environment, or the per-user default if it exists.
fn settings_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(vars::SETTINGS) {
        return Some(expand_path(&path));
    }
    dirs::config_dir()
        .map(|dir| dir.join(env!("CARGO_PKG_NAME")).join("settings.json"))
        .filter(|p| p.is_file())
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_plugin_defaults() {
        let config = Config::default();
        assert!(!config.use_custom_template);
        assert_eq!(config.template, "[[{book} {chapter}.{verse}]]");
        assert_eq!(config.max_verses, 50);
        assert_eq!(config.range_policy, RangePolicy::Lenient);
        assert_eq!(config.overlap_policy, OverlapPolicy::PreferLonger);
        assert!(config.link_template().is_none());
    }

    #[test]
    fn reads_plugin_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(
            &path,
            r#"{
                "useCustomTemplate": true,
                "template": "[[{book} {chapter}:{verse}]]",
                "autoDetect": true,
                "autoDetectDelay": 1000,
                "maxVerses": 10
            }"#,
        )
        .unwrap();

        let config = Config::from_json_file(&path).unwrap();
        assert!(config.use_custom_template);
        assert_eq!(config.max_verses, 10);
        assert_eq!(config.link_template().unwrap().as_str(), "[[{book} {chapter}:{verse}]]");
        assert_eq!(config.range_policy, RangePolicy::Lenient);
    }

    #[test]
    fn bad_settings_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Config::from_json_file(&path), Err(Error::Parse { file: Some(_), .. })));
    }

    #[test]
    fn environment_overrides() {
        let mut config = Config::default();
        config.apply_env(lookup(&[
            ("VERSELINK_USE_CUSTOM_TEMPLATE", "yes"),
            ("VERSELINK_TEMPLATE", "{book}|{chapter}|{verse}"),
            ("VERSELINK_MAX_VERSES", "5"),
            ("VERSELINK_RANGE_POLICY", "strict"),
            ("VERSELINK_OVERLAP_POLICY", "keepAll"),
            ("VERSELINK_BOOKS", "/tmp/books.json"),
        ]));
        assert!(config.use_custom_template);
        assert_eq!(config.template, "{book}|{chapter}|{verse}");
        assert_eq!(config.max_verses, 5);
        assert_eq!(config.range_policy, RangePolicy::Strict);
        assert_eq!(config.overlap_policy, OverlapPolicy::KeepAll);
        assert_eq!(config.books_path, Some(PathBuf::from("/tmp/books.json")));
    }

    #[test]
    fn invalid_environment_values_are_ignored() {
        let mut config = Config::default();
        config.apply_env(lookup(&[
            ("VERSELINK_USE_CUSTOM_TEMPLATE", "maybe"),
            ("VERSELINK_MAX_VERSES", "lots"),
            ("VERSELINK_RANGE_POLICY", "sometimes"),
        ]));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_with_explicit_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "rangePolicy": "strict" }"#).unwrap();
        let config = Config::load_with(Some(&path)).unwrap();
        assert_eq!(config.range_policy, RangePolicy::Strict);
    }

    #[test]
    fn registry_defaults_to_embedded_table() {
        let config = Config::default();
        let registry = config.registry().unwrap();
        assert!(matches!(registry, Cow::Borrowed(_)));
        assert_eq!(registry.len(), 66);
    }

    #[test]
    fn registry_from_external_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.json");
        std::fs::write(&path, r#"[{"name": "Amos", "abbr": ["Am"]}]"#).unwrap();
        let config = Config { books_path: Some(path), ..Config::default() };
        let registry = config.registry().unwrap();
        assert_eq!(registry.full_name("am"), "Amos");
    }
}
