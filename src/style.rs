//! The "plain" citation style.
//!
//! Entries are sorted by author (or editor), year and title, numbered in
//! that order, and rendered with one template per BibTeX entry type. A
//! template is a sequence of sentences; each sentence joins its non-empty
//! parts with ", " and ends in a period.

use std::cmp::Ordering;
use std::sync::LazyLock;

use biblatex::{Bibliography, Chunk, Entry, Person, Spanned};
use regex::Regex;
use thiserror::Error;

use crate::bibliography::{entry_type_name, nonempty_field};
use crate::richtext::Text;

/// Errors that can occur while formatting entries.
#[derive(Error, Debug, PartialEq)]
pub enum StyleError {
    #[error("Missing field '{field}' in entry '{key}'")]
    MissingField { key: String, field: &'static str },
}

/// A bibliography entry rendered by the style.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedEntry {
    /// Citation key of the source entry
    pub key: String,
    /// Numeric label, 1-based position in style order
    pub label: String,
    /// Rendered citation
    pub text: Text,
}

/// The fixed citation style used for every source.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainStyle;

impl PlainStyle {
    /// Formats every entry of the bibliography, in style order.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry lacks a field its type requires
    /// (for example `journal` on an `article`).
    pub fn format_entries(&self, bibliography: &Bibliography) -> Result<Vec<FormattedEntry>, StyleError> {
        let mut keyed: Vec<(SortKey, &Entry)> = bibliography
            .iter()
            .map(|entry| (SortKey::new(entry), entry))
            .collect();
        // Stable: entries that compare equal keep file order.
        keyed.sort_by(|a, b| a.0.cmp(&b.0));

        keyed
            .into_iter()
            .enumerate()
            .map(|(i, (_, entry))| {
                Ok(FormattedEntry {
                    key: entry.key.clone(),
                    label: (i + 1).to_string(),
                    text: format_entry(entry)?,
                })
            })
            .collect()
    }
}

/// Formats a single entry with the template for its type.
pub fn format_entry(entry: &Entry) -> Result<Text, StyleError> {
    let f = Fields { entry };
    match entry_type_name(entry).as_str() {
        "article" => article(&f),
        "book" => book(&f),
        "booklet" => booklet(&f),
        "inbook" => inbook(&f),
        "incollection" => incollection(&f),
        "inproceedings" | "conference" => inproceedings(&f),
        "manual" => manual(&f),
        "mastersthesis" => thesis(&f, "Master's thesis"),
        "phdthesis" => thesis(&f, "PhD thesis"),
        "proceedings" => proceedings(&f),
        "techreport" => techreport(&f),
        "unpublished" => unpublished(&f),
        _ => misc(&f),
    }
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
struct SortKey {
    names: String,
    year: String,
    title: String,
}

impl SortKey {
    fn new(entry: &Entry) -> Self {
        let mut persons = authors(entry);
        if persons.is_empty() {
            persons = editors(entry);
        }
        let names = if persons.is_empty() {
            entry.key.to_lowercase()
        } else {
            persons
                .iter()
                .map(sort_name)
                .collect::<Vec<_>>()
                .join("   ")
        };
        Self {
            names,
            year: nonempty_field(entry, "year").unwrap_or_default(),
            title: nonempty_field(entry, "title")
                .unwrap_or_default()
                .to_lowercase(),
        }
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.names
            .cmp(&other.names)
            .then_with(|| self.year.cmp(&other.year))
            .then_with(|| self.title.cmp(&other.title))
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn sort_name(person: &Person) -> String {
    [&person.prefix, &person.name, &person.given_name, &person.suffix]
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

fn authors(entry: &Entry) -> Vec<Person> {
    entry.author().unwrap_or_default()
}

fn editors(entry: &Entry) -> Vec<Person> {
    entry
        .editors()
        .ok()
        .and_then(|groups| groups.into_iter().next())
        .map(|(persons, _)| persons)
        .unwrap_or_default()
}

/// "Given von Last, Jr"
fn display_name(person: &Person) -> String {
    let mut name = [&person.given_name, &person.prefix, &person.name]
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    if !person.suffix.is_empty() {
        name.push_str(", ");
        name.push_str(&person.suffix);
    }
    name
}

fn format_names(persons: &[Person]) -> Option<Text> {
    let others = persons.iter().any(|p| p.name == "others" && p.given_name.is_empty());
    let names: Vec<Text> = persons
        .iter()
        .filter(|p| !(p.name == "others" && p.given_name.is_empty()))
        .map(|p| Text::str(display_name(p)))
        .collect();
    if names.is_empty() {
        return None;
    }
    let joined = if names.len() == 2 && !others {
        Text::join(names, " and ")
    } else {
        Text::join_last(names, ", ", ", and ")
    };
    if others {
        Some(Text::Seq(vec![joined, Text::str(" et al.")]))
    } else {
        Some(joined)
    }
}

// ---------------------------------------------------------------------------
// Field access
// ---------------------------------------------------------------------------

static DASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").expect("valid regex"));

struct Fields<'a> {
    entry: &'a Entry,
}

impl Fields<'_> {
    fn missing(&self, field: &'static str) -> StyleError {
        StyleError::MissingField {
            key: self.entry.key.clone(),
            field,
        }
    }

    fn text(&self, name: &str) -> Option<Text> {
        let text = chunks_to_text(self.entry.fields.get(name)?);
        (!text.is_empty()).then_some(text)
    }

    fn required(&self, name: &'static str) -> Result<Text, StyleError> {
        self.text(name).ok_or_else(|| self.missing(name))
    }

    fn raw(&self, name: &str) -> Option<String> {
        nonempty_field(self.entry, name)
    }

    fn author(&self) -> Option<Text> {
        format_names(&authors(self.entry))
    }

    fn required_author(&self) -> Result<Text, StyleError> {
        self.author().ok_or_else(|| self.missing("author"))
    }

    /// "A and B, editors"
    fn editor(&self) -> Option<Text> {
        let persons = editors(self.entry);
        let names = format_names(&persons)?;
        let word = if persons.len() > 1 { "editors" } else { "editor" };
        Some(Text::join(vec![names, Text::str(word)], ", "))
    }

    fn author_or_editor(&self) -> Result<Text, StyleError> {
        self.author()
            .or_else(|| self.editor())
            .ok_or_else(|| self.missing("author"))
    }

    /// Sentence-cased title.
    fn title(&self, name: &'static str) -> Result<Text, StyleError> {
        Ok(self.required(name)?.capitalize())
    }

    /// Emphasized book or container title, case preserved.
    fn btitle(&self, name: &'static str) -> Result<Text, StyleError> {
        Ok(Text::em(vec![self.required(name)?]))
    }

    fn year(&self) -> Option<Text> {
        self.text("year").or_else(|| {
            self.raw("date")
                .map(|d| Text::str(d.chars().take(4).collect::<String>()))
        })
    }

    fn date(&self) -> Result<Text, StyleError> {
        let year = self.year().ok_or_else(|| self.missing("year"))?;
        Ok(Text::words(vec![self.text("month").unwrap_or_default(), year]))
    }

    fn optional_date(&self) -> Option<Text> {
        self.date().ok()
    }

    fn pages(&self) -> Option<Text> {
        self.raw("pages")
            .map(|p| Text::str(DASHES.replace_all(&p, "\u{2013}").into_owned()))
    }

    fn edition(&self) -> Option<Text> {
        self.raw("edition")
            .map(|e| Text::str(format!("{} edition", e.to_lowercase())))
    }

    /// "volume 3 of <em>Series</em>", "number 7 in Series", or the bare series.
    fn volume_and_series(&self) -> Option<Text> {
        let series = self.text("series");
        if let Some(volume) = self.text("volume") {
            let mut parts = vec![Text::str("volume"), volume];
            if let Some(series) = series {
                parts.push(Text::str("of"));
                parts.push(Text::em(vec![series]));
            }
            return Some(Text::words(parts));
        }
        if let Some(number) = self.text("number") {
            let mut parts = vec![Text::str("number"), number];
            if let Some(series) = series {
                parts.push(Text::str("in"));
                parts.push(series);
            }
            return Some(Text::words(parts));
        }
        series
    }

    fn chapter_and_pages(&self) -> Text {
        Text::join(
            vec![
                self.text("chapter")
                    .map(|c| Text::words(vec![Text::str("chapter"), c]))
                    .unwrap_or_default(),
                self.pages()
                    .map(|p| Text::words(vec![Text::str("pages"), p]))
                    .unwrap_or_default(),
            ],
            ", ",
        )
    }

    fn address_organization_publisher_date(&self) -> Result<Text, StyleError> {
        let organization = self.text("organization").unwrap_or_default();
        let publisher = self.text("publisher").unwrap_or_default();
        let date = self.date()?;
        Ok(match self.text("address") {
            Some(address) => Text::words(vec![
                Text::sentence(vec![address, date]),
                Text::sentence(vec![organization, publisher]),
            ]),
            None => Text::sentence(vec![organization, publisher, date]),
        })
    }

    fn note(&self) -> Text {
        Text::sentence(vec![self.text("note").unwrap_or_default()])
    }

    /// URL, arXiv and DOI links.
    fn web_refs(&self) -> Text {
        let url = self.raw("url").map(|url| {
            let mut parts = vec![
                Text::str("URL:"),
                Text::Href(url.clone(), vec![Text::str(url)]),
            ];
            if let Some(visited) = self.raw("urldate") {
                parts.push(Text::str(format!("(visited on {visited})")));
            }
            Text::words(parts)
        });
        let eprint = self.raw("eprint").map(|id| {
            Text::Href(
                format!("https://arxiv.org/abs/{id}"),
                vec![Text::str(format!("arXiv:{id}"))],
            )
        });
        let doi = self.raw("doi").map(|doi| {
            Text::Href(
                format!("https://doi.org/{doi}"),
                vec![Text::str(format!("doi:{doi}"))],
            )
        });
        Text::sentence(vec![
            url.unwrap_or_default(),
            eprint.unwrap_or_default(),
            doi.unwrap_or_default(),
        ])
    }
}

fn chunks_to_text(chunks: &[Spanned<Chunk>]) -> Text {
    let parts: Vec<Text> = chunks
        .iter()
        .map(|c| match &c.v {
            Chunk::Normal(s) => Text::Str(s.clone()),
            Chunk::Verbatim(s) => Text::Protected(s.clone()),
            Chunk::Math(s) => Text::Str(format!("${s}$")),
        })
        .collect();
    Text::Seq(parts)
}

fn toplevel(parts: Vec<Text>) -> Text {
    Text::words(parts)
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

fn article(f: &Fields) -> Result<Text, StyleError> {
    let volume_and_pages = match (f.text("volume"), f.pages()) {
        (Some(volume), pages) => {
            let mut parts = vec![volume];
            if let Some(number) = f.text("number") {
                parts.push(Text::Seq(vec![Text::str("("), number, Text::str(")")]));
            }
            if let Some(pages) = pages {
                parts.push(Text::str(":"));
                parts.push(pages);
            }
            Text::Seq(parts)
        }
        (None, Some(pages)) => Text::words(vec![Text::str("pages"), pages]),
        (None, None) => Text::default(),
    };
    Ok(toplevel(vec![
        Text::sentence(vec![f.required_author()?]),
        Text::sentence(vec![f.title("title")?]),
        Text::sentence(vec![
            Text::em(vec![f.required("journal")?]),
            volume_and_pages,
            f.date()?,
        ]),
        f.note(),
        f.web_refs(),
    ]))
}

fn book(f: &Fields) -> Result<Text, StyleError> {
    Ok(toplevel(vec![
        Text::sentence(vec![f.author_or_editor()?]),
        Text::sentence(vec![
            f.btitle("title")?,
            f.volume_and_series().unwrap_or_default(),
        ]),
        Text::sentence(vec![
            f.required("publisher")?,
            f.text("address").unwrap_or_default(),
            f.edition().unwrap_or_default(),
            f.date()?,
        ]),
        Text::sentence(vec![f
            .raw("isbn")
            .map(|isbn| Text::str(format!("ISBN {isbn}")))
            .unwrap_or_default()]),
        f.note(),
        f.web_refs(),
    ]))
}

fn booklet(f: &Fields) -> Result<Text, StyleError> {
    Ok(toplevel(vec![
        Text::sentence(vec![f.author().unwrap_or_default()]),
        Text::sentence(vec![f.title("title")?]),
        Text::sentence(vec![
            f.text("howpublished").unwrap_or_default(),
            f.text("address").unwrap_or_default(),
            f.optional_date().unwrap_or_default(),
        ]),
        f.note(),
        f.web_refs(),
    ]))
}

fn inbook(f: &Fields) -> Result<Text, StyleError> {
    Ok(toplevel(vec![
        Text::sentence(vec![f.author_or_editor()?]),
        Text::sentence(vec![f.btitle("title")?, f.chapter_and_pages()]),
        Text::sentence(vec![f.volume_and_series().unwrap_or_default()]),
        Text::sentence(vec![
            f.required("publisher")?,
            f.text("address").unwrap_or_default(),
            f.edition().unwrap_or_default(),
            f.date()?,
        ]),
        f.note(),
        f.web_refs(),
    ]))
}

fn incollection(f: &Fields) -> Result<Text, StyleError> {
    Ok(toplevel(vec![
        Text::sentence(vec![f.required_author()?]),
        Text::sentence(vec![f.title("title")?]),
        Text::words(vec![
            Text::str("In"),
            Text::sentence(vec![
                f.editor().unwrap_or_default(),
                f.btitle("booktitle")?,
                f.volume_and_series().unwrap_or_default(),
                f.chapter_and_pages(),
            ]),
        ]),
        Text::sentence(vec![
            f.required("publisher")?,
            f.text("address").unwrap_or_default(),
            f.edition().unwrap_or_default(),
            f.date()?,
        ]),
        f.note(),
        f.web_refs(),
    ]))
}

fn inproceedings(f: &Fields) -> Result<Text, StyleError> {
    Ok(toplevel(vec![
        Text::sentence(vec![f.required_author()?]),
        Text::sentence(vec![f.title("title")?]),
        Text::words(vec![
            Text::str("In"),
            Text::sentence(vec![
                f.editor().unwrap_or_default(),
                f.btitle("booktitle")?,
                f.volume_and_series().unwrap_or_default(),
                f.pages().unwrap_or_default(),
            ]),
            f.address_organization_publisher_date()?,
        ]),
        f.note(),
        f.web_refs(),
    ]))
}

fn manual(f: &Fields) -> Result<Text, StyleError> {
    Ok(toplevel(vec![
        Text::sentence(vec![f.author().unwrap_or_default()]),
        Text::sentence(vec![f.btitle("title")?]),
        Text::sentence(vec![
            f.text("organization").unwrap_or_default(),
            f.text("address").unwrap_or_default(),
            f.edition().unwrap_or_default(),
            f.optional_date().unwrap_or_default(),
        ]),
        f.note(),
        f.web_refs(),
    ]))
}

fn thesis(f: &Fields, kind: &str) -> Result<Text, StyleError> {
    Ok(toplevel(vec![
        Text::sentence(vec![f.required_author()?]),
        Text::sentence(vec![f.title("title")?]),
        Text::sentence(vec![
            f.text("type").unwrap_or_else(|| Text::str(kind)),
            f.required("school")?,
            f.text("address").unwrap_or_default(),
            f.date()?,
        ]),
        f.note(),
        f.web_refs(),
    ]))
}

fn misc(f: &Fields) -> Result<Text, StyleError> {
    Ok(toplevel(vec![
        Text::sentence(vec![f.author().unwrap_or_default()]),
        Text::sentence(vec![f
            .text("title")
            .map(Text::capitalize)
            .unwrap_or_default()]),
        Text::sentence(vec![
            f.text("howpublished").unwrap_or_default(),
            f.optional_date().unwrap_or_default(),
        ]),
        f.note(),
        f.web_refs(),
    ]))
}

fn proceedings(f: &Fields) -> Result<Text, StyleError> {
    let heading = match f.editor() {
        Some(editor) => Text::sentence(vec![editor]),
        None => Text::sentence(vec![f.text("organization").unwrap_or_default()]),
    };
    Ok(toplevel(vec![
        heading,
        Text::sentence(vec![
            f.btitle("title")?,
            f.volume_and_series().unwrap_or_default(),
        ]),
        f.address_organization_publisher_date()?,
        f.note(),
        f.web_refs(),
    ]))
}

fn techreport(f: &Fields) -> Result<Text, StyleError> {
    Ok(toplevel(vec![
        Text::sentence(vec![f.required_author()?]),
        Text::sentence(vec![f.title("title")?]),
        Text::sentence(vec![
            Text::words(vec![
                f.text("type")
                    .unwrap_or_else(|| Text::str("Technical Report")),
                f.text("number").unwrap_or_default(),
            ]),
            f.required("institution")?,
            f.text("address").unwrap_or_default(),
            f.date()?,
        ]),
        f.note(),
        f.web_refs(),
    ]))
}

fn unpublished(f: &Fields) -> Result<Text, StyleError> {
    Ok(toplevel(vec![
        Text::sentence(vec![f.required_author()?]),
        Text::sentence(vec![f.title("title")?]),
        Text::sentence(vec![
            f.required("note")?,
            f.optional_date().unwrap_or_default(),
        ]),
        f.web_refs(),
    ]))
}
