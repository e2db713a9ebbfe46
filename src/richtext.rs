//! Rich text produced by the citation style, and the backends that render it.
//!
//! A formatted citation is a small tree of text nodes. Rendering walks the
//! tree and hands each node to a [`Backend`], which decides how emphasis,
//! links and brace-protected spans look in the target markup.

/// A node of formatted citation text.
#[derive(Debug, Clone, PartialEq)]
pub enum Text {
    /// Ordinary text.
    Str(String),
    /// A brace-protected span from the BibTeX source; case changes skip it.
    Protected(String),
    /// Markup tag such as `em` wrapping its children.
    Tag(&'static str, Vec<Text>),
    /// Hyperlink to the given URL.
    Href(String, Vec<Text>),
    /// Plain concatenation.
    Seq(Vec<Text>),
}

impl Default for Text {
    fn default() -> Self {
        Text::Seq(Vec::new())
    }
}

/// Rendering target for [`Text`].
pub trait Backend {
    fn format_str(&self, text: &str) -> String;
    fn format_protected(&self, text: &str) -> String;
    fn format_tag(&self, name: &str, body: &str) -> String;
    fn format_href(&self, url: &str, body: &str) -> String;
}

/// Inline HTML, suitable for direct embedding in a page template.
///
/// Protected spans keep their BibTeX braces; display cleanup strips them.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlBackend;

impl Backend for HtmlBackend {
    fn format_str(&self, text: &str) -> String {
        escape_html(text)
    }

    fn format_protected(&self, text: &str) -> String {
        format!("{{{}}}", escape_html(text))
    }

    fn format_tag(&self, name: &str, body: &str) -> String {
        format!("<{name}>{body}</{name}>")
    }

    fn format_href(&self, url: &str, body: &str) -> String {
        format!("<a href=\"{}\">{}</a>", escape_attr(url), body)
    }
}

/// Unadorned text for terminals and logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextBackend;

impl Backend for PlainTextBackend {
    fn format_str(&self, text: &str) -> String {
        text.to_string()
    }

    fn format_protected(&self, text: &str) -> String {
        text.to_string()
    }

    fn format_tag(&self, _name: &str, body: &str) -> String {
        body.to_string()
    }

    fn format_href(&self, _url: &str, body: &str) -> String {
        body.to_string()
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(text: &str) -> String {
    escape_html(text).replace('"', "&quot;")
}

impl Text {
    pub fn str(text: impl Into<String>) -> Self {
        Text::Str(text.into())
    }

    pub fn em(children: Vec<Text>) -> Self {
        Text::Tag("em", children)
    }

    /// Renders the tree with the given backend.
    pub fn render(&self, backend: &dyn Backend) -> String {
        match self {
            Text::Str(s) => backend.format_str(s),
            Text::Protected(s) => backend.format_protected(s),
            Text::Tag(name, children) => backend.format_tag(name, &render_all(children, backend)),
            Text::Href(url, children) => backend.format_href(url, &render_all(children, backend)),
            Text::Seq(children) => render_all(children, backend),
        }
    }

    /// Returns true if the node renders no characters.
    pub fn is_empty(&self) -> bool {
        match self {
            Text::Str(s) | Text::Protected(s) => s.is_empty(),
            Text::Tag(_, children) | Text::Href(_, children) | Text::Seq(children) => {
                children.iter().all(Text::is_empty)
            }
        }
    }

    /// Last visible character, ignoring markup.
    fn last_char(&self) -> Option<char> {
        match self {
            Text::Str(s) | Text::Protected(s) => s.chars().last(),
            Text::Tag(_, children) | Text::Href(_, children) | Text::Seq(children) => {
                children.iter().rev().find_map(Text::last_char)
            }
        }
    }

    /// Returns true if the text already ends in sentence punctuation.
    pub fn ends_with_terminal(&self) -> bool {
        matches!(self.last_char(), Some('.' | '?' | '!'))
    }

    /// Appends a period unless the text is empty or already terminated.
    pub fn add_period(self) -> Text {
        if self.is_empty() || self.ends_with_terminal() {
            self
        } else {
            Text::Seq(vec![self, Text::str(".")])
        }
    }

    /// Sentence case: first letter upper, the rest lower. Protected spans are untouched.
    pub fn capitalize(self) -> Text {
        let mut first = true;
        self.capitalize_inner(&mut first)
    }

    fn capitalize_inner(self, first: &mut bool) -> Text {
        match self {
            Text::Str(s) => {
                let mut out = String::with_capacity(s.len());
                for c in s.chars() {
                    if *first && !c.is_whitespace() {
                        out.extend(c.to_uppercase());
                        *first = false;
                    } else {
                        out.extend(c.to_lowercase());
                    }
                }
                Text::Str(out)
            }
            Text::Protected(s) => {
                if !s.is_empty() {
                    *first = false;
                }
                Text::Protected(s)
            }
            Text::Tag(name, children) => Text::Tag(name, capitalize_all(children, first)),
            Text::Href(url, children) => Text::Href(url, capitalize_all(children, first)),
            Text::Seq(children) => Text::Seq(capitalize_all(children, first)),
        }
    }

    /// Joins the non-empty parts with `sep`.
    pub fn join(parts: Vec<Text>, sep: &str) -> Text {
        Self::join_last(parts, sep, sep)
    }

    /// Joins the non-empty parts with `sep`, using `last_sep` before the final part.
    pub fn join_last(parts: Vec<Text>, sep: &str, last_sep: &str) -> Text {
        let parts: Vec<Text> = parts.into_iter().filter(|p| !p.is_empty()).collect();
        let count = parts.len();
        let mut out = Vec::with_capacity(count * 2);
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                let s = if i + 1 == count { last_sep } else { sep };
                out.push(Text::str(s));
            }
            out.push(part);
        }
        Text::Seq(out)
    }

    /// A sentence: parts joined by ", " and terminated with a period.
    pub fn sentence(parts: Vec<Text>) -> Text {
        Text::join(parts, ", ").add_period()
    }

    /// Parts joined by single spaces.
    pub fn words(parts: Vec<Text>) -> Text {
        Text::join(parts, " ")
    }
}

fn render_all(children: &[Text], backend: &dyn Backend) -> String {
    children.iter().map(|c| c.render(backend)).collect()
}

fn capitalize_all(children: Vec<Text>, first: &mut bool) -> Vec<Text> {
    children
        .into_iter()
        .map(|c| c.capitalize_inner(first))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_html_tags_and_links() {
        // Given: Text with emphasis and a link
        let text = Text::Seq(vec![
            Text::str("In "),
            Text::em(vec![Text::str("Proc. A & B")]),
            Text::str(" "),
            Text::Href("https://x.org/?a=1&b=\"2\"".into(), vec![Text::str("link")]),
        ]);

        // When: We render to HTML
        let html = text.render(&HtmlBackend);

        // Then: Markup is produced and special characters are escaped
        assert_eq!(
            html,
            "In <em>Proc. A &amp; B</em> <a href=\"https://x.org/?a=1&amp;b=&quot;2&quot;\">link</a>"
        );
    }

    #[test]
    fn test_render_html_keeps_protected_braces() {
        let text = Text::Seq(vec![Text::str("The "), Text::Protected("LaTeX".into())]);
        assert_eq!(text.render(&HtmlBackend), "The {LaTeX}");
    }

    #[test]
    fn test_render_plain_text() {
        let text = Text::Seq(vec![
            Text::em(vec![Text::Protected("CO2".into())]),
            Text::Href("u".into(), vec![Text::str("u")]),
        ]);
        assert_eq!(text.render(&PlainTextBackend), "CO2u");
    }

    #[test]
    fn test_add_period() {
        assert_eq!(
            Text::str("Title").add_period().render(&PlainTextBackend),
            "Title."
        );
        assert_eq!(
            Text::str("Why?").add_period().render(&PlainTextBackend),
            "Why?"
        );
        assert_eq!(
            Text::em(vec![Text::str("Done.")])
                .add_period()
                .render(&PlainTextBackend),
            "Done."
        );
        assert!(Text::str("").add_period().is_empty());
    }

    #[test]
    fn test_capitalize_respects_protected() {
        // Given: A title with a protected acronym
        let text = Text::Seq(vec![
            Text::str("Measuring "),
            Text::Protected("NO2".into()),
            Text::str(" In The City"),
        ]);

        // When: We convert to sentence case
        let result = text.capitalize().render(&PlainTextBackend);

        // Then: Only unprotected text changes case
        assert_eq!(result, "Measuring NO2 in the city");
    }

    #[test]
    fn test_capitalize_leading_protected_span() {
        let text = Text::Seq(vec![Text::Protected("iPhone".into()), Text::str(" Apps")]);
        assert_eq!(text.capitalize().render(&PlainTextBackend), "iPhone apps");
    }

    #[test]
    fn test_join_skips_empty_parts() {
        let text = Text::join(
            vec![Text::str("a"), Text::str(""), Text::str("b")],
            ", ",
        );
        assert_eq!(text.render(&PlainTextBackend), "a, b");
    }

    #[test]
    fn test_join_last() {
        let text = Text::join_last(
            vec![Text::str("A"), Text::str("B"), Text::str("C")],
            ", ",
            ", and ",
        );
        assert_eq!(text.render(&PlainTextBackend), "A, B, and C");
    }
}
