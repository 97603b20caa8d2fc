//! Caller-side client for the blogsmith proxy.
//!
//! The proxy already classifies upstream failures; this layer turns its
//! `{error}` bodies back into [`BlogError`] kinds so that callers only ever
//! show [`BlogError::user_message`].

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::CALLER_TIMEOUT;
use crate::{
    BlogError, GenerateBlogForm, GenerationOutcome, GenerationRequest, HumanizeResult,
    PublishedDocument, split_list,
};

/// Marker the proxy uses for extraction failures.
pub const UNEXPECTED_FORMAT: &str = "Unexpected response format";

#[derive(Debug, Deserialize)]
struct BlogResponse {
    #[serde(default)]
    blog: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HumanizeBody<'a> {
    content: &'a str,
    keywords: &'a [String],
}

#[derive(Debug, Serialize)]
struct PublishBody<'a> {
    content: &'a str,
    keywords: &'a [String],
    urls: &'a [String],
}

#[derive(Debug, Deserialize)]
struct PublishResponse {
    html: String,
}

pub struct BlogApi {
    client: reqwest::Client,
    base_url: String,
}

impl BlogApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, BlogError> {
        let client = reqwest::Client::builder()
            .timeout(CALLER_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub async fn generate_blog(&self, request: &GenerationRequest) -> Result<GenerationOutcome, BlogError> {
        self.generate_from_form(&request.to_form()).await
    }

    pub async fn generate_from_form(
        &self,
        form: &GenerateBlogForm,
    ) -> Result<GenerationOutcome, BlogError> {
        let url = format!("{}/api/generate-blog", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(form)
            .send()
            .await
            .inspect_err(|err| error!(%err, "generation request failed"))?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let err = classify_failure(status.as_u16(), &body);
            error!(status = status.as_u16(), %err, "proxy rejected generation");
            return Err(err);
        }

        let blog = serde_json::from_str::<BlogResponse>(&body)
            .ok()
            .and_then(|response| response.blog)
            .filter(|blog| !blog.trim().is_empty())
            .ok_or_else(|| BlogError::upstream(None, "Server returned empty blog content"))?;
        let preview: String = blog.chars().take(100).collect();
        info!(%preview, "generation successful");

        Ok(GenerationOutcome {
            blog,
            keywords: split_list(form.keywords.as_deref().unwrap_or_default()),
            urls: split_list(form.urls.as_deref().unwrap_or_default()),
        })
    }

    pub async fn humanize(
        &self,
        content: &str,
        keywords: &[String],
    ) -> Result<HumanizeResult, BlogError> {
        let url = format!("{}/api/humanize", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&HumanizeBody { content, keywords })
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(classify_failure(status.as_u16(), &body));
        }
        serde_json::from_str(&body).map_err(|_| BlogError::ContentExtraction { raw: body })
    }

    pub async fn publish(
        &self,
        content: &str,
        keywords: &[String],
        urls: &[String],
    ) -> Result<PublishedDocument, BlogError> {
        let url = format!("{}/api/publish", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&PublishBody {
                content,
                keywords,
                urls,
            })
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(classify_failure(status.as_u16(), &body));
        }
        let published: PublishResponse = serde_json::from_str(&body)
            .map_err(|_| BlogError::ContentExtraction { raw: body.clone() })?;
        Ok(PublishedDocument::new(published.html))
    }
}

/// Maps a proxy error response onto the error taxonomy.
pub fn classify_failure(status: u16, body: &str) -> BlogError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|response| response.error)
        .unwrap_or_else(|_| body.to_string());
    if message.contains(UNEXPECTED_FORMAT) {
        BlogError::ContentExtraction {
            raw: body.to_string(),
        }
    } else if status == 400 {
        BlogError::Validation(message)
    } else {
        BlogError::upstream(Some(status), message)
    }
}
