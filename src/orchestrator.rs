//! Coordinates calls to the generation and humanization services.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::HUMANIZE_MIN_DURATION;
use crate::error::{CONTENT_REQUIRED, MISSING_FIELDS};
use crate::{BlogError, GeneratedContent, GenerationRequest, HumanizeResult};

/// Something that turns a generation request into prose.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedContent, BlogError>;
}

/// Something that rewrites text and scores its AI likelihood.
#[async_trait]
pub trait HumanizationService: Send + Sync {
    async fn humanize(&self, text: &str, keywords: &[String])
    -> Result<HumanizeResult, BlogError>;
}

#[derive(Clone)]
pub struct Orchestrator {
    generator: Arc<dyn GenerationService>,
    humanizer: Arc<dyn HumanizationService>,
    min_humanize: Duration,
}

impl Orchestrator {
    pub fn new(
        generator: Arc<dyn GenerationService>,
        humanizer: Arc<dyn HumanizationService>,
    ) -> Self {
        Self {
            generator,
            humanizer,
            min_humanize: HUMANIZE_MIN_DURATION,
        }
    }

    pub fn with_min_humanize_duration(mut self, min: Duration) -> Self {
        self.min_humanize = min;
        self
    }

    pub async fn request_generation(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedContent, BlogError> {
        let required = [&request.topic, &request.country, &request.audience];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(BlogError::validation(MISSING_FIELDS));
        }
        info!(
            topic = %request.topic,
            country = %request.country,
            keywords = request.keywords.len(),
            "requesting blog generation"
        );
        let content = self.generator.generate(request).await?;
        info!(chars = content.raw_text.len(), "blog generated");
        Ok(content)
    }

    /// Humanizes `text`. The result is held back until at least the minimum
    /// duration has passed, whether the call succeeded or not.
    pub async fn request_humanization(
        &self,
        text: &str,
        keywords: &[String],
    ) -> Result<HumanizeResult, BlogError> {
        if text.trim().is_empty() {
            return Err(BlogError::validation(CONTENT_REQUIRED));
        }
        let result = paced(self.min_humanize, self.humanizer.humanize(text, keywords)).await;
        match &result {
            Ok(humanized) => info!(
                original = humanized.original_score,
                humanized = humanized.humanized_score,
                "humanization finished"
            ),
            Err(err) => warn!(%err, "humanization failed"),
        }
        result
    }
}

/// Runs `fut` alongside a timer and returns its output once both are done.
pub async fn paced<F: Future>(min: Duration, fut: F) -> F::Output {
    let ((), output) = tokio::join!(tokio::time::sleep(min), fut);
    output
}
