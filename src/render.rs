//! Markdown-subset to HTML transformer.
//!
//! Only the handful of constructs the generation service emits are handled.
//! The stages run in a fixed order because later stages see the HTML produced
//! by earlier ones; [`PIPELINE`] is that order.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static RULE_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^-{3,}[ \t]*(?:\r?\n|\z)").expect("valid rule regex"));
static BOLD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold regex"));
static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(#{1,6})[ \t]+([^\r\n]*)").expect("valid header regex"));
static REFERENCES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"For more information[^\r\n]*").expect("valid references regex"));

/// CSS class of the footer block wrapping the references line.
pub const REFERENCES_CLASS: &str = "references-section";

pub type Stage = fn(&str) -> String;

/// The transformer stages, in application order.
pub const PIPELINE: [(&str, Stage); 5] = [
    ("strip_rules", strip_rules),
    ("bold", bold),
    ("headers", headers),
    ("references", references),
    ("paragraphs", paragraphs),
];

/// Renders the markdown subset to an HTML fragment.
pub fn render(text: &str) -> String {
    PIPELINE
        .iter()
        .fold(text.to_string(), |current, (_, stage)| stage(&current))
}

/// Deletes lines made only of three or more dashes.
pub fn strip_rules(text: &str) -> String {
    RULE_LINE_RE.replace_all(text, "").into_owned()
}

pub fn bold(text: &str) -> String {
    BOLD_RE
        .replace_all(text, "<strong>$1</strong>")
        .into_owned()
}

/// `#`..`######` headings; the level is the number of hashes.
pub fn headers(text: &str) -> String {
    HEADER_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let level = caps[1].len();
            format!("<h{level}>{}</h{level}>", &caps[2])
        })
        .into_owned()
}

/// Wraps each "For more information" line in the references footer.
pub fn references(text: &str) -> String {
    REFERENCES_RE
        .replace_all(text, |caps: &Captures<'_>| {
            format!(
                "<div class=\"{REFERENCES_CLASS}\">{}</div>",
                caps[0].replace("---", "")
            )
        })
        .into_owned()
}

/// One `<p>` per non-blank line; blank lines vanish.
pub fn paragraphs(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| format!("<p>{line}</p>"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_become_paragraphs() {
        assert_eq!(
            render("first line\n\n  \nsecond line\nthird"),
            "<p>first line</p><p>second line</p><p>third</p>"
        );
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert_eq!(render(""), "");
        assert_eq!(render("\n\n\n"), "");
    }

    #[test]
    fn title_is_wrapped_in_its_own_paragraph() {
        assert_eq!(
            render("# Title\n\nBody"),
            "<p><h1>Title</h1></p><p>Body</p>"
        );
    }

    #[test]
    fn header_level_follows_hash_count() {
        assert_eq!(headers("### Three"), "<h3>Three</h3>");
        assert_eq!(headers("###### Six"), "<h6>Six</h6>");
        assert_eq!(headers("####### Seven"), "####### Seven");
        assert_eq!(headers("#NoSpace"), "#NoSpace");
        assert_eq!(headers("text # not a header"), "text # not a header");
    }

    #[test]
    fn crlf_line_endings_do_not_leak_into_tags() {
        assert_eq!(
            render("# Title\r\nBody\r\n"),
            "<p><h1>Title</h1></p><p>Body</p>"
        );
        assert_eq!(
            references("For more information here\r\n"),
            "<div class=\"references-section\">For more information here</div>\r\n"
        );
    }

    #[test]
    fn bold_is_non_greedy() {
        assert_eq!(render("**bold** text"), "<p><strong>bold</strong> text</p>");
        assert_eq!(
            bold("**a** and **b**"),
            "<strong>a</strong> and <strong>b</strong>"
        );
        assert_eq!(bold("**open\nclose**"), "**open\nclose**");
    }

    #[test]
    fn rule_lines_are_removed_whole() {
        assert_eq!(strip_rules("Intro\n---\nOutro"), "Intro\nOutro");
        assert_eq!(strip_rules("Intro\n-----  \nOutro\n---"), "Intro\nOutro\n");
        assert_eq!(strip_rules("a ---- b"), "a ---- b");
        assert_eq!(strip_rules("--"), "--");
        assert_eq!(render("Intro\n---\nOutro"), "<p>Intro</p><p>Outro</p>");
    }

    #[test]
    fn references_block_is_wrapped_and_cleaned() {
        assert_eq!(
            render("Body\nFor more information, visit --- the docs.\nEnd"),
            "<p>Body</p><p><div class=\"references-section\">For more information, visit  the docs.</div></p><p>End</p>"
        );
    }

    #[test]
    fn header_inside_references_keeps_nested_tags() {
        assert_eq!(
            render("## For more information see x"),
            "<p><h2><div class=\"references-section\">For more information see x</h2></div></p>"
        );
    }

    #[test]
    fn stages_are_listed_in_order() {
        let names: Vec<_> = PIPELINE.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            ["strip_rules", "bold", "headers", "references", "paragraphs"]
        );
    }
}
