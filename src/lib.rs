pub mod api;
pub mod config;
pub mod error;
pub mod humanizer;
pub mod langflow;
pub mod linker;
pub mod orchestrator;
pub mod preserve;
pub mod render;
pub mod session;
#[cfg(all(test, feature = "web"))]
mod testing;
#[cfg(feature = "web")]
pub mod web;

pub use error::BlogError;
pub use linker::link;
pub use preserve::preserve;
pub use render::render;

use serde::{Deserialize, Serialize};

/// The generation form as it arrives over the wire. Every field is optional
/// here so that a missing field surfaces as a validation error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateBlogForm {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
    /// Comma-separated keywords.
    #[serde(default)]
    pub keywords: Option<String>,
    /// Comma-separated URLs, positionally paired with `keywords`.
    #[serde(default)]
    pub urls: Option<String>,
}

/// A validated generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub topic: String,
    pub country: String,
    pub audience: String,
    pub keywords: Vec<String>,
    pub urls: Vec<String>,
}

impl GenerationRequest {
    /// Validates the form and splits its keyword and URL lists.
    pub fn from_form(form: &GenerateBlogForm) -> Result<Self, BlogError> {
        let field = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .ok_or_else(|| BlogError::validation(error::MISSING_FIELDS))
        };
        let topic = field(&form.topic)?;
        let country = field(&form.country)?;
        let audience = field(&form.audience)?;
        let keywords = field(&form.keywords)?;
        let urls = field(&form.urls)?;
        Ok(Self {
            topic,
            country,
            audience,
            keywords: split_list(&keywords),
            urls: split_list(&urls),
        })
    }

    /// The form this request would have been parsed from.
    pub fn to_form(&self) -> GenerateBlogForm {
        GenerateBlogForm {
            topic: Some(self.topic.clone()),
            country: Some(self.country.clone()),
            audience: Some(self.audience.clone()),
            keywords: Some(self.keywords.join(", ")),
            urls: Some(self.urls.join(", ")),
        }
    }
}

/// Splits a comma-separated list, trimming items and dropping empty ones.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub raw_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumanizeResult {
    pub humanized_text: String,
    /// AI-likelihood of the input, 0-100. Lower reads as more human.
    pub original_score: f64,
    pub humanized_score: f64,
    pub sources_checked: u32,
}

/// What the caller gets back from a successful generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub blog: String,
    pub keywords: Vec<String>,
    pub urls: Vec<String>,
}

/// Final HTML, ready to be rendered as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedDocument {
    html: String,
}

impl PublishedDocument {
    pub(crate) fn new(html: String) -> Self {
        Self { html }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn into_html(self) -> String {
        self.html
    }
}

/// Links keywords, renders the markdown subset and wraps the result in the
/// `blog-content` container.
pub fn publish<K, U>(text: &str, keywords: &[K], urls: &[U]) -> PublishedDocument
where
    K: AsRef<str>,
    U: AsRef<str>,
{
    let linked = link(text, keywords, urls);
    PublishedDocument::new(format!(
        "<div class=\"blog-content\">{}</div>",
        render(&linked)
    ))
}
