//! Host settings.
//!
//! Recognizes the three bibliography source keys and the content root used
//! to probe for downloadable PDFs. Settings files use the host generator's
//! upper-case key names; every other key in the file is ignored.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Content root used when the host does not set `PATH`.
pub const DEFAULT_CONTENT_PATH: &str = "content";

/// Errors that can occur when loading settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// One of the three artifact categories a bibliography file can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Publications,
    Presentations,
    Posters,
}

impl Source {
    /// All sources, in processing order.
    pub const ALL: [Source; 3] = [Source::Publications, Source::Presentations, Source::Posters];

    /// The settings key holding this source's bibliography path.
    pub fn setting_key(self) -> &'static str {
        match self {
            Source::Publications => "PUBLICATIONS_SRC",
            Source::Presentations => "PRESENTATIONS_SRC",
            Source::Posters => "POSTERS_SRC",
        }
    }

    /// The context key the rendered records are stored under.
    pub fn context_key(self) -> &'static str {
        match self {
            Source::Publications => "publications",
            Source::Presentations => "presentations",
            Source::Posters => "posters",
        }
    }
}

/// Settings as they appear in a host settings file.
#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    #[serde(rename = "PUBLICATIONS_SRC")]
    publications_src: Option<PathBuf>,
    #[serde(rename = "PRESENTATIONS_SRC")]
    presentations_src: Option<PathBuf>,
    #[serde(rename = "POSTERS_SRC")]
    posters_src: Option<PathBuf>,
    #[serde(rename = "PATH")]
    path: Option<PathBuf>,
}

/// Resolved settings for one generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub publications_src: Option<PathBuf>,
    pub presentations_src: Option<PathBuf>,
    pub posters_src: Option<PathBuf>,
    /// Root of the site content; PDFs are looked up in `<content_path>/download`.
    pub content_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            publications_src: None,
            presentations_src: None,
            posters_src: None,
            content_path: PathBuf::from(DEFAULT_CONTENT_PATH),
        }
    }
}

impl From<RawSettings> for Settings {
    fn from(raw: RawSettings) -> Self {
        Self {
            publications_src: raw.publications_src,
            presentations_src: raw.presentations_src,
            posters_src: raw.posters_src,
            content_path: raw
                .path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTENT_PATH)),
        }
    }
}

impl Settings {
    /// Loads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let raw: RawSettings = toml::from_str(content)?;
        Ok(raw.into())
    }

    /// Builds settings from a generic string map supplied by the host.
    pub fn from_map(map: &HashMap<String, String>) -> Self {
        let path_of = |key: &str| map.get(key).map(PathBuf::from);
        Self {
            publications_src: path_of(Source::Publications.setting_key()),
            presentations_src: path_of(Source::Presentations.setting_key()),
            posters_src: path_of(Source::Posters.setting_key()),
            content_path: path_of("PATH").unwrap_or_else(|| PathBuf::from(DEFAULT_CONTENT_PATH)),
        }
    }

    /// Returns the bibliography path configured for `source`, if any.
    pub fn source_path(&self, source: Source) -> Option<&Path> {
        match source {
            Source::Publications => self.publications_src.as_deref(),
            Source::Presentations => self.presentations_src.as_deref(),
            Source::Posters => self.posters_src.as_deref(),
        }
    }

    /// Returns true if at least one of the recognized source keys is set.
    pub fn any_source_configured(&self) -> bool {
        Source::ALL.iter().any(|s| self.source_path(*s).is_some())
    }

    /// Iterates the configured sources in processing order.
    pub fn configured_sources(&self) -> impl Iterator<Item = (Source, &Path)> + '_ {
        Source::ALL
            .into_iter()
            .filter_map(move |s| self.source_path(s).map(|p| (s, p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml_str_all_sources() {
        // Given: A settings file with all three sources
        let content = r#"
PUBLICATIONS_SRC = "content/pubs.bib"
PRESENTATIONS_SRC = "content/talks.bib"
POSTERS_SRC = "content/posters.bib"
"#;

        // When: We parse it
        let settings = Settings::from_toml_str(content).unwrap();

        // Then: Each source path is set and the content root has its default
        assert_eq!(
            settings.source_path(Source::Publications),
            Some(Path::new("content/pubs.bib"))
        );
        assert_eq!(
            settings.source_path(Source::Presentations),
            Some(Path::new("content/talks.bib"))
        );
        assert_eq!(
            settings.source_path(Source::Posters),
            Some(Path::new("content/posters.bib"))
        );
        assert_eq!(settings.content_path, PathBuf::from("content"));
    }

    #[test]
    fn test_from_toml_str_ignores_unrelated_keys() {
        // Given: A host settings file with unrelated keys
        let content = r#"
SITENAME = "My Site"
THEME = "notmyidea"
DEFAULT_PAGINATION = 10
PATH = "site/content"
"#;

        // When: We parse it
        let settings = Settings::from_toml_str(content).unwrap();

        // Then: No source is configured, but PATH is honored
        assert!(!settings.any_source_configured());
        assert_eq!(settings.content_path, PathBuf::from("site/content"));
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let result = Settings::from_toml_str("PUBLICATIONS_SRC = ");
        assert!(matches!(result, Err(SettingsError::TomlError(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Settings::load(Path::new("/nonexistent/pelicanconf.toml"));
        assert!(matches!(result, Err(SettingsError::IoError(_))));
    }

    #[test]
    fn test_from_map() {
        // Given: A host string map with only posters configured
        let mut map = HashMap::new();
        map.insert("POSTERS_SRC".to_string(), "posters.bib".to_string());
        map.insert("AUTHOR".to_string(), "Someone".to_string());

        // When: We build settings from it
        let settings = Settings::from_map(&map);

        // Then: Only posters is configured
        let configured: Vec<_> = settings.configured_sources().collect();
        assert_eq!(configured, vec![(Source::Posters, Path::new("posters.bib"))]);
    }

    #[test]
    fn test_configured_sources_fixed_order() {
        let settings = Settings {
            posters_src: Some(PathBuf::from("c.bib")),
            publications_src: Some(PathBuf::from("a.bib")),
            ..Settings::default()
        };

        let order: Vec<Source> = settings.configured_sources().map(|(s, _)| s).collect();
        assert_eq!(order, vec![Source::Publications, Source::Posters]);
    }

    #[test]
    fn test_source_keys() {
        assert_eq!(Source::Publications.setting_key(), "PUBLICATIONS_SRC");
        assert_eq!(Source::Publications.context_key(), "publications");
        assert_eq!(Source::Presentations.setting_key(), "PRESENTATIONS_SRC");
        assert_eq!(Source::Presentations.context_key(), "presentations");
        assert_eq!(Source::Posters.setting_key(), "POSTERS_SRC");
        assert_eq!(Source::Posters.context_key(), "posters");
    }
}
