//! Bibliography context builder.
//!
//! Runs once per generation: for every configured bibliography source it
//! parses the file, formats the entries with the plain style, resolves
//! artifacts and stores the resulting records in the host context under the
//! source's output key. A source that fails is reported and skipped; the
//! other sources are unaffected.

use std::path::{Path, PathBuf};

use biblatex::Entry;
use thiserror::Error;

use crate::artifacts::{take_artifact_fields, PdfResolver};
use crate::bibliography::{field_string, load_bibliography, BibError};
use crate::context::Context;
use crate::log::{TracingSink, WarningSink};
use crate::prettify::prettify;
use crate::record::Record;
use crate::richtext::HtmlBackend;
use crate::settings::{Settings, Source};
use crate::style::{FormattedEntry, PlainStyle, StyleError};
use crate::writer::write_entry;

/// Why a single source was skipped.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to parse file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: BibError,
    },

    #[error("failed to format entries of {}: {source}", .path.display())]
    Style {
        path: PathBuf,
        #[source]
        source: StyleError,
    },

    #[error("failed to store records for {key}: {source}")]
    Store {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// What happened to one configured source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceStatus {
    /// Records were written to the context.
    Stored { entries: usize },
    /// The source was left out of the context; the reason was also sent to the sink.
    Skipped { reason: String },
}

/// Per-source result of a build.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceReport {
    pub source: Source,
    pub path: PathBuf,
    pub status: SourceStatus,
}

/// Result of [`ContextBuilder::build`].
#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutcome {
    /// None of the recognized source keys is set; the context was not touched.
    NotConfigured,
    /// Every configured source was processed, in fixed order.
    Completed(Vec<SourceReport>),
}

impl BuildOutcome {
    /// Number of sources whose records were stored.
    pub fn stored_sources(&self) -> usize {
        match self {
            BuildOutcome::NotConfigured => 0,
            BuildOutcome::Completed(reports) => reports
                .iter()
                .filter(|r| matches!(r.status, SourceStatus::Stored { .. }))
                .count(),
        }
    }
}

/// Builds citation records for the configured bibliography sources.
///
/// # Examples
///
/// ```
/// use bibtex_context::{BuildOutcome, Context, ContextBuilder, Settings};
///
/// let mut context = Context::new();
/// let outcome = ContextBuilder::new(Settings::default()).build(&mut context);
///
/// assert_eq!(outcome, BuildOutcome::NotConfigured);
/// assert!(context.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ContextBuilder<S = TracingSink> {
    settings: Settings,
    sink: S,
}

impl ContextBuilder<TracingSink> {
    /// Creates a builder that reports warnings through `tracing`.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            sink: TracingSink,
        }
    }
}

impl<S: WarningSink> ContextBuilder<S> {
    /// Replaces the warning sink.
    pub fn with_sink<T: WarningSink>(self, sink: T) -> ContextBuilder<T> {
        ContextBuilder {
            settings: self.settings,
            sink,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Populates `context` with the records of every configured source.
    ///
    /// Only the output keys of configured, successfully processed sources are
    /// written; all other keys in `context` are left as they were.
    pub fn build(&self, context: &mut Context) -> BuildOutcome {
        if !self.settings.any_source_configured() {
            tracing::debug!("no bibliography source configured");
            return BuildOutcome::NotConfigured;
        }

        let resolver = PdfResolver::new(&self.settings.content_path);
        let reports = self
            .settings
            .configured_sources()
            .map(|(source, path)| {
                let status = match self.build_source(source, path, &resolver, context) {
                    Ok(entries) => SourceStatus::Stored { entries },
                    Err(e) => {
                        let reason = e.to_string();
                        self.sink.warn(&reason);
                        SourceStatus::Skipped { reason }
                    }
                };
                SourceReport {
                    source,
                    path: path.to_path_buf(),
                    status,
                }
            })
            .collect();

        BuildOutcome::Completed(reports)
    }

    fn build_source(
        &self,
        source: Source,
        path: &Path,
        resolver: &PdfResolver,
        context: &mut Context,
    ) -> Result<usize, SourceError> {
        let bibliography = load_bibliography(path).map_err(|e| SourceError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        let formatted = PlainStyle
            .format_entries(&bibliography)
            .map_err(|e| SourceError::Style {
                path: path.to_path_buf(),
                source: e,
            })?;

        let records: Vec<Record> = formatted
            .iter()
            .filter_map(|entry| {
                bibliography
                    .get(&entry.key)
                    .map(|raw| build_record(entry, raw, resolver))
            })
            .collect();

        let key = source.context_key();
        context
            .set_records(key, &records)
            .map_err(|e| SourceError::Store { key, source: e })?;

        tracing::debug!(
            source = key,
            path = %path.display(),
            entries = records.len(),
            "stored bibliography records"
        );
        Ok(records.len())
    }
}

/// Assembles the record for one formatted entry.
fn build_record(formatted: &FormattedEntry, raw: &Entry, resolver: &PdfResolver) -> Record {
    let mut entry = raw.clone();
    let year = field_string(&entry, "year");
    let (slides, poster) = take_artifact_fields(&mut entry);
    let pdf = resolver.resolve_entry(&entry);
    if !entry.fields.contains_key("file") {
        tracing::debug!(key = %entry.key, "entry has no file field");
    }
    let bibtex = write_entry(&entry);
    let text = prettify(&formatted.text.render(&HtmlBackend));
    let doi = field_string(&entry, "doi").unwrap_or_default();
    let url = field_string(&entry, "url").unwrap_or_default();

    Record {
        key: formatted.key.clone(),
        year,
        text,
        bibtex,
        doi,
        url,
        pdf,
        slides,
        poster,
    }
}

/// Builds the context with a `tracing` warning sink.
pub fn build(settings: &Settings, context: &mut Context) -> BuildOutcome {
    ContextBuilder::new(settings.clone()).build(context)
}
