//! BibTeX serialization of a single entry.
//!
//! Produces the copy-paste text shown next to each citation. Fields are
//! written in map order, one per line, so the output is stable across runs.

use biblatex::{Chunk, Entry, Spanned};

use crate::bibliography::entry_type_name;

/// Fields whose content is written back exactly as parsed.
const VERBATIM_FIELDS: &[&str] = &["doi", "eprint", "file", "pdf", "url", "urlraw"];

/// Serializes one entry as canonical BibTeX.
///
/// # Examples
///
/// ```
/// use bibtex_context::bibliography::parse_bibliography;
/// use bibtex_context::writer::write_entry;
///
/// let bib = parse_bibliography("@misc{k, title = {Notes}, year = {2020}}").unwrap();
/// let text = write_entry(bib.get("k").unwrap());
/// assert_eq!(text, "@misc{k,\n    title = \"Notes\",\n    year = \"2020\"\n}\n");
/// ```
pub fn write_entry(entry: &Entry) -> String {
    let mut out = format!("@{}{{{}", entry_type_name(entry), entry.key);
    for (name, chunks) in &entry.fields {
        let verbatim = VERBATIM_FIELDS.contains(&name.as_str());
        out.push_str(",\n    ");
        out.push_str(name);
        out.push_str(" = ");
        out.push_str(&quote(&encode_chunks(chunks, verbatim)));
    }
    out.push_str("\n}\n");
    out
}

/// Wraps a value in `"…"`, or in braces when it contains a double quote.
fn quote(value: &str) -> String {
    if value.contains('"') {
        format!("{{{value}}}")
    } else {
        format!("\"{value}\"")
    }
}

fn encode_chunks(chunks: &[Spanned<Chunk>], verbatim: bool) -> String {
    let mut out = String::new();
    for chunk in chunks {
        match &chunk.v {
            Chunk::Normal(s) if verbatim => out.push_str(s),
            Chunk::Verbatim(s) if verbatim => out.push_str(s),
            Chunk::Normal(s) => out.push_str(&escape_normal(s)),
            Chunk::Verbatim(s) => {
                out.push('{');
                out.push_str(s);
                out.push('}');
            }
            Chunk::Math(s) => {
                out.push('$');
                out.push_str(s);
                out.push('$');
            }
        }
    }
    out
}

/// Restores the TeX escapes the parser resolved into bare characters.
///
/// Backslashes stay as they are: unresolved commands arrive as `\cmd` text
/// and must be written back unchanged.
fn escape_normal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '{' | '}' | '$' | '%' | '&' | '#' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bibliography::{field_string, parse_bibliography};

    #[test]
    fn test_write_entry_layout() {
        // Given: An article with a few fields
        let bib = parse_bibliography(
            r#"@article{smith2020,
                title = {A Study},
                author = {Smith, John},
                year = {2020}
            }"#,
        )
        .unwrap();

        // When: We serialize it
        let text = write_entry(bib.get("smith2020").unwrap());

        // Then: Fields come out one per line, sorted by name
        assert_eq!(
            text,
            "@article{smith2020,\n    author = \"Smith, John\",\n    title = \"A Study\",\n    year = \"2020\"\n}\n"
        );
    }

    #[test]
    fn test_write_entry_protected_span() {
        let bib = parse_bibliography("@misc{k, title = {Urban {NO2} levels}}").unwrap();

        let text = write_entry(bib.get("k").unwrap());

        assert!(
            text.contains("title = \"Urban {NO2} levels\""),
            "got: {}",
            text
        );
    }

    #[test]
    fn test_write_entry_quote_in_value_uses_braces() {
        assert_eq!(quote("say \"hi\""), "{say \"hi\"}");
        assert_eq!(quote("plain"), "\"plain\"");
    }

    #[test]
    fn test_escape_normal_specials() {
        assert_eq!(escape_normal("Costs $5"), "Costs \\$5");
        assert_eq!(escape_normal("50% off & more"), "50\\% off \\& more");
        assert_eq!(escape_normal("snake_case #1 {x}"), "snake\\_case \\#1 \\{x\\}");
    }

    #[test]
    fn test_write_entry_tex_specials_reparse() {
        // Given: A title with TeX-escaped special characters
        let source = r#"@misc{costs,
            title = {Costs \$5, 50\% off \& more for snake\_case \#1},
            note = {R\&D}
        }"#;
        let bib = parse_bibliography(source).unwrap();
        let original = bib.get("costs").unwrap();

        // When: We serialize and parse again
        let text = write_entry(original);
        let reparsed = parse_bibliography(&text)
            .unwrap_or_else(|e| panic!("output should parse: {e}\n{text}"));

        // Then: The escapes are written back and the values survive
        assert!(text.contains(r"Costs \$5, 50\% off \& more"), "got: {}", text);
        assert!(text.contains(r"snake\_case \#1"), "got: {}", text);
        let entry = reparsed.get("costs").expect("key should survive");
        for name in ["title", "note"] {
            assert_eq!(
                field_string(entry, name),
                field_string(original, name),
                "field {} changed",
                name
            );
        }
    }

    #[test]
    fn test_write_entry_reparses() {
        // Given: An entry with verbatim and protected fields
        let source = r#"@inproceedings{lee2021,
            author = {Lee, Ann and Park, Min},
            title = {{CO2} Uptake},
            booktitle = {Fall Meeting},
            year = {2021},
            url = {https://example.org/a_b?x=1},
            file = {lee.pdf:lee.pdf:application/pdf}
        }"#;
        let bib = parse_bibliography(source).unwrap();
        let original = bib.get("lee2021").unwrap();

        // When: We serialize and parse again
        let text = write_entry(original);
        let reparsed = parse_bibliography(&text).unwrap();

        // Then: The key, field names and field values survive
        let entry = reparsed.get("lee2021").expect("key should survive");
        let names: Vec<&String> = entry.fields.keys().collect();
        let original_names: Vec<&String> = original.fields.keys().collect();
        assert_eq!(names, original_names);
        for name in ["author", "title", "url", "file", "year"] {
            assert_eq!(
                field_string(entry, name),
                field_string(original, name),
                "field {} changed",
                name
            );
        }
    }
}
