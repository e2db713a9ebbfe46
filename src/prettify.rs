//! Display cleanup for rendered citation HTML.
//!
//! Each pass is a `&str -> String` function applied in a fixed order.

use std::sync::LazyLock;

use regex::Regex;

/// Runs every cleanup pass over a rendered citation.
pub fn prettify(text: &str) -> String {
    let mut result = strip_braces(text);
    result = subscript_formulas(&result);
    result = presented_at(&result);
    result
}

/// Removes escaped `\{`/`\}` and then any remaining bare braces.
fn strip_braces(text: &str) -> String {
    static BRACE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\\?[{}]").expect("valid regex"));

    BRACE_RE.replace_all(text, "").into_owned()
}

/// Subscripts the 2 in NO2 and CO2.
fn subscript_formulas(text: &str) -> String {
    text.replace("NO2", "NO<sub>2</sub>")
        .replace("CO2", "CO<sub>2</sub>")
}

/// Reads "In <em>Venue</em>" as "Presented at <em>Venue</em>".
fn presented_at(text: &str) -> String {
    text.replace("In <em>", "Presented at <em>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_braces() {
        // Given: Text with bare and backslash-escaped braces
        let text = r"The {LaTeX} \{Companion\} {{nested}}";

        // When: We strip braces
        let result = strip_braces(text);

        // Then: No brace or escape remains
        assert_eq!(result, "The LaTeX Companion nested");
    }

    #[test]
    fn test_subscript_formulas() {
        let result = subscript_formulas("NO2 and CO2 emissions");
        assert_eq!(result, "NO<sub>2</sub> and CO<sub>2</sub> emissions");
    }

    #[test]
    fn test_subscript_is_single_pass() {
        let once = subscript_formulas("CO2");
        assert_eq!(subscript_formulas(&once), once);
    }

    #[test]
    fn test_presented_at() {
        let result = presented_at("Ann Lee. Poster. In <em>AGU Fall Meeting</em>, 2021.");
        assert_eq!(result, "Ann Lee. Poster. Presented at <em>AGU Fall Meeting</em>, 2021.");
    }

    #[test]
    fn test_prettify_runs_passes_in_order() {
        // Given: Protected formulas inside a conference clause
        let text = "Urban {NO2} and {CO2}. In <em>{EGU} Assembly</em>, 2020.";

        // When: We prettify
        let result = prettify(text);

        // Then: Braces are gone before substitution, so the formulas are subscripted
        assert_eq!(
            result,
            "Urban NO<sub>2</sub> and CO<sub>2</sub>. Presented at <em>EGU Assembly</em>, 2020."
        );
        assert!(!result.contains('{') && !result.contains('}'));
    }

    #[test]
    fn test_prettify_leaves_plain_text_alone() {
        let text = "Jane Doe. A study. <em>Journal</em>, 2020.";
        assert_eq!(prettify(text), text);
    }
}
