//! BibTeX bibliography loading.
//!
//! Parsing itself is delegated to the `biblatex` crate; this module only
//! reads the file and offers a few helpers for pulling plain strings out of
//! the parsed field chunks.

use std::fs;
use std::path::Path;

use biblatex::{Bibliography, Chunk, Entry, Spanned};
use thiserror::Error;

/// Errors that can occur when loading a bibliography.
#[derive(Error, Debug)]
pub enum BibError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid BibTeX: {0}")]
    ParseError(String),
}

/// Loads and parses a BibTeX file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid BibTeX.
pub fn load_bibliography(path: &Path) -> Result<Bibliography, BibError> {
    let content = fs::read_to_string(path)?;
    parse_bibliography(&content)
}

/// Parses BibTeX source text.
pub fn parse_bibliography(content: &str) -> Result<Bibliography, BibError> {
    Bibliography::parse(content).map_err(|e| BibError::ParseError(e.to_string()))
}

/// Flattens field chunks to a plain string.
pub fn chunks_to_string(chunks: &[Spanned<Chunk>]) -> String {
    chunks
        .iter()
        .map(|c| match &c.v {
            Chunk::Normal(s) => s.as_str(),
            Chunk::Verbatim(s) => s.as_str(),
            Chunk::Math(s) => s.as_str(),
        })
        .collect()
}

/// Returns the named field as a plain string, if present.
pub fn field_string(entry: &Entry, name: &str) -> Option<String> {
    entry.fields.get(name).map(|chunks| chunks_to_string(chunks))
}

/// Returns the named field as a plain string, treating a blank value as absent.
pub fn nonempty_field(entry: &Entry, name: &str) -> Option<String> {
    field_string(entry, name)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Lower-case BibTeX entry type name (`article`, `inproceedings`, ...).
pub fn entry_type_name(entry: &Entry) -> String {
    entry.entry_type.to_string().to_lowercase()
}
