//! Downloadable artifacts attached to an entry: PDF, slides and poster.

use std::fs::File;
use std::path::{Path, PathBuf};

use biblatex::Entry;

use crate::bibliography::chunks_to_string;

/// Removes the `slides` and `poster` fields from the entry and returns their values.
///
/// They describe artifacts rather than the work itself, so they must not
/// appear in the serialized BibTeX.
pub fn take_artifact_fields(entry: &mut Entry) -> (Option<String>, Option<String>) {
    let slides = entry.fields.remove("slides").map(|c| chunks_to_string(&c));
    let poster = entry.fields.remove("poster").map(|c| chunks_to_string(&c));
    (slides, poster)
}

/// Resolves PDF links against the site's download directory.
#[derive(Debug, Clone)]
pub struct PdfResolver {
    download_dir: PathBuf,
}

impl PdfResolver {
    /// Creates a resolver probing `<content_path>/download`.
    pub fn new(content_path: &Path) -> Self {
        Self {
            download_dir: content_path.join("download"),
        }
    }

    /// Maps a `file` field to a site-relative PDF link.
    ///
    /// Reference managers export `file` as `name:path:mimetype`; only the
    /// part before the first `:` is used. The link is `download/<name>` when
    /// that file can be opened for reading, `None` otherwise.
    pub fn resolve(&self, file_field: &str) -> Option<String> {
        let filename = file_field.split(':').next().unwrap_or_default().trim();
        if filename.is_empty() {
            return None;
        }
        let candidate = self.download_dir.join(filename);
        if candidate.is_file() && File::open(&candidate).is_ok() {
            Some(format!("download/{filename}"))
        } else {
            None
        }
    }

    /// Resolves the entry's `file` field; entries without one have no PDF.
    pub fn resolve_entry(&self, entry: &Entry) -> Option<String> {
        let file_field = entry.fields.get("file").map(|c| chunks_to_string(c))?;
        self.resolve(&file_field)
    }
}
