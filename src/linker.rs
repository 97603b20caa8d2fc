//! Keyword to hyperlink substitution.

use regex::{Captures, Regex, RegexBuilder};
use tracing::warn;

/// Replaces whole-word, case-insensitive occurrences of each keyword with an
/// anchor to the URL at the same position.
///
/// Only the paired prefix `min(keywords.len(), urls.len())` is linked. Pairs
/// are applied in order against the already-linked text, so a later keyword
/// can match inside an anchor inserted for an earlier one.
pub fn link<K, U>(text: &str, keywords: &[K], urls: &[U]) -> String
where
    K: AsRef<str>,
    U: AsRef<str>,
{
    let mut linked = text.to_string();
    for (keyword, url) in keywords.iter().zip(urls) {
        let (keyword, url) = (keyword.as_ref().trim(), url.as_ref().trim());
        if keyword.is_empty() || url.is_empty() {
            continue;
        }
        let Some(pattern) = keyword_pattern(keyword) else {
            continue;
        };
        let href = escape_attr(url);
        linked = pattern
            .replace_all(&linked, |caps: &Captures<'_>| anchor(&href, &caps[0]))
            .into_owned();
    }
    linked
}

fn keyword_pattern(keyword: &str) -> Option<Regex> {
    let source = format!(r"\b{}\b", regex::escape(keyword));
    match RegexBuilder::new(&source).case_insensitive(true).build() {
        Ok(pattern) => Some(pattern),
        Err(err) => {
            warn!(%keyword, %err, "skipping keyword with unusable pattern");
            None
        }
    }
}

fn anchor(href: &str, text: &str) -> String {
    format!(r#"<a href="{href}" target="_blank" rel="noopener noreferrer">{text}</a>"#)
}

fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
