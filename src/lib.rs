//! bibtex-context: render BibTeX bibliographies into template context records.
//!
//! This library provides functionality to:
//! - Load host settings naming up to three bibliography sources
//! - Parse BibTeX files and format entries with the plain citation style
//! - Resolve PDF, slides and poster artifacts for each entry
//! - Store the ordered citation records in a host-owned template context

pub mod artifacts;
pub mod bibliography;
pub mod builder;
pub mod context;
pub mod log;
pub mod prettify;
pub mod record;
pub mod richtext;
pub mod settings;
pub mod style;
pub mod writer;

pub use bibliography::{load_bibliography, BibError};
pub use builder::{build, BuildOutcome, ContextBuilder, SourceReport, SourceStatus};
pub use context::Context;
pub use log::{MemorySink, TracingSink, WarningSink};
pub use record::Record;
pub use settings::{Settings, SettingsError, Source};
pub use style::{FormattedEntry, PlainStyle, StyleError};
