//! Shape matching for humanized rewrites.
//!
//! The humanizer tends to flatten structure: titles disappear, paragraphs
//! merge and lists become prose. [`preserve`] nudges the rewrite back towards
//! the original's shape. It is a lossy heuristic, not a structural merge, and
//! makes no promise that the result is well-formed markdown.

use once_cell::sync::Lazy;
use regex::Regex;

static LIST_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(?:[-*]|\d+\.)[ \t]").expect("valid list regex"));
static SENTENCE_END_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([.!?])\s+").expect("valid sentence regex"));

/// Blocks at or above this many characters are never turned into lists.
const LIST_BLOCK_MAX_CHARS: usize = 200;
const LIST_MIN_SENTENCES: usize = 3;
/// How far sentence splitting may overshoot the original paragraph count.
const PARAGRAPH_OVERSHOOT: f64 = 1.5;

/// Reconciles `rewritten` with the title, paragraph count and list shape of
/// `original`.
pub fn preserve(original: &str, rewritten: &str) -> String {
    let mut result = rewritten.to_string();

    if let Some(title) = title_line(original) {
        if title_line(&result).is_none() {
            result = format!("{title}\n\n{}", result.trim_start());
        }
    }

    let target = blocks(original).len();
    if blocks(&result).len() < target {
        result = split_sentences(&result, target);
    }

    if LIST_LINE_RE.is_match(original) {
        result = listify(&result);
    }
    result
}

/// First line starting with `#`, ignoring leading whitespace.
pub fn title_line(text: &str) -> Option<&str> {
    text.lines()
        .map(str::trim)
        .find(|line| line.starts_with('#'))
}

/// Non-blank `\n\n`-delimited blocks, trimmed.
pub fn blocks(text: &str) -> Vec<&str> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .collect()
}

fn split_sentences(text: &str, target: usize) -> String {
    let trimmed = text.trim();
    let (title, body) = match trimmed.split_once("\n\n") {
        Some((head, rest)) if head.starts_with('#') => (Some(head.trim()), rest),
        _ if trimmed.starts_with('#') && !trimmed.contains("\n\n") => (Some(trimmed), ""),
        _ => (None, trimmed),
    };

    // The title counts towards the target; at most `target + 1` blocks survive.
    let reserved = usize::from(title.is_some());
    let spaced = SENTENCE_END_RE.replace_all(body, "$1\n\n");
    let pieces = blocks(&spaced);
    let total = pieces.len() + reserved;
    let mut paragraphs: Vec<String> = if total as f64 > target as f64 * PARAGRAPH_OVERSHOOT {
        let keep = target.saturating_sub(reserved).min(pieces.len());
        let mut kept: Vec<String> = pieces[..keep].iter().map(|p| p.to_string()).collect();
        let rest = pieces[keep..].join(" ");
        if !rest.is_empty() {
            kept.push(rest);
        }
        kept
    } else {
        pieces.iter().map(|p| p.to_string()).collect()
    };

    if let Some(title) = title {
        paragraphs.insert(0, title.to_string());
    }
    paragraphs.join("\n\n")
}

fn listify(text: &str) -> String {
    let mut changed = false;
    let reshaped: Vec<String> = blocks(text)
        .into_iter()
        .map(|block| match list_lines(block) {
            Some(lines) => {
                changed = true;
                lines
            }
            None => block.to_string(),
        })
        .collect();

    if changed {
        reshaped.join("\n\n")
    } else {
        text.to_string()
    }
}

fn list_lines(block: &str) -> Option<String> {
    if block.lines().any(|line| line.trim_start().starts_with('#'))
        || LIST_LINE_RE.is_match(block)
        || block.chars().count() >= LIST_BLOCK_MAX_CHARS
    {
        return None;
    }
    let sentences: Vec<&str> = block.split(". ").collect();
    if sentences.len() < LIST_MIN_SENTENCES {
        return None;
    }
    let last = sentences.len() - 1;
    let lines: Vec<String> = sentences
        .iter()
        .enumerate()
        .map(|(index, sentence)| {
            let sentence = sentence.trim();
            let sentence = if index < last {
                format!("{sentence}.")
            } else {
                sentence.to_string()
            };
            if index == 0 {
                sentence
            } else {
                format!("- {sentence}")
            }
        })
        .collect();
    Some(lines.join("\n"))
}
