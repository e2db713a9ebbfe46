//! The per-entry record handed to templates.

use serde::{Deserialize, Serialize};

/// Positional form of a [`Record`], as templates index it.
type RecordTuple = (
    String,
    Option<String>,
    String,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
);

/// One rendered bibliography entry.
///
/// Serializes as the 9-element array
/// `[key, year, text, bibtex, doi, url, pdf, slides, poster]`; every position
/// is always present. `doi` and `url` use the empty string when absent,
/// the other optional positions use `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RecordTuple", into = "RecordTuple")]
pub struct Record {
    pub key: String,
    pub year: Option<String>,
    /// Display HTML
    pub text: String,
    /// Canonical BibTeX for copy-paste
    pub bibtex: String,
    pub doi: String,
    pub url: String,
    /// Site-relative PDF link
    pub pdf: Option<String>,
    pub slides: Option<String>,
    pub poster: Option<String>,
}

impl From<RecordTuple> for Record {
    fn from(t: RecordTuple) -> Self {
        let (key, year, text, bibtex, doi, url, pdf, slides, poster) = t;
        Self {
            key,
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
}

impl From<Record> for RecordTuple {
    fn from(r: Record) -> Self {
        (
            r.key, r.year, r.text, r.bibtex, r.doi, r.url, r.pdf, r.slides, r.poster,
        )
    }
}
