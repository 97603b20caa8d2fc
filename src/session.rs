//! Per-user session state from submission to publication.
//!
//! Every change goes through a method that appends a [`Transition`], so the
//! log reads as the history of the session. Only one outbound call may be in
//! flight at a time; a second submit or humanize is refused with
//! [`BlogError::Busy`].

use serde::Serialize;
use tracing::debug;

use crate::{
    BlogError, GeneratedContent, GenerationRequest, HumanizeResult, PublishedDocument, preserve,
    publish,
};

const NO_CONTENT: &str = "No blog content found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Submitted,
    Generated,
    GenerationFailed,
    Edited,
    HumanizeStarted,
    Humanized,
    HumanizeFailed,
    Published,
}

#[derive(Debug, Default)]
pub struct Session {
    request: Option<GenerationRequest>,
    content: Option<GeneratedContent>,
    humanized: Option<HumanizeResult>,
    published: Option<PublishedDocument>,
    in_flight: bool,
    log: Vec<Transition>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) -> Option<&GenerationRequest> {
        self.request.as_ref()
    }

    pub fn content(&self) -> Option<&GeneratedContent> {
        self.content.as_ref()
    }

    pub fn humanized(&self) -> Option<&HumanizeResult> {
        self.humanized.as_ref()
    }

    pub fn published(&self) -> Option<&PublishedDocument> {
        self.published.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.log
    }

    fn record(&mut self, transition: Transition) {
        debug!(?transition, "session transition");
        self.log.push(transition);
    }

    /// Starts a new generation. Earlier content is discarded.
    pub fn submit(&mut self, request: GenerationRequest) -> Result<(), BlogError> {
        if self.in_flight {
            return Err(BlogError::Busy);
        }
        self.request = Some(request);
        self.content = None;
        self.humanized = None;
        self.published = None;
        self.in_flight = true;
        self.record(Transition::Submitted);
        Ok(())
    }

    pub fn complete_generation(
        &mut self,
        result: Result<GeneratedContent, BlogError>,
    ) -> Result<&GeneratedContent, BlogError> {
        self.in_flight = false;
        match result {
            Ok(content) => {
                self.record(Transition::Generated);
                Ok(self.content.insert(content))
            }
            Err(err) => {
                self.record(Transition::GenerationFailed);
                Err(err)
            }
        }
    }

    pub fn edit(&mut self, text: impl Into<String>) -> Result<(), BlogError> {
        let content = self
            .content
            .as_mut()
            .ok_or_else(|| BlogError::validation(NO_CONTENT))?;
        content.raw_text = text.into();
        self.published = None;
        self.record(Transition::Edited);
        Ok(())
    }

    /// Marks a humanize call as started and returns the text to send.
    pub fn begin_humanize(&mut self) -> Result<String, BlogError> {
        if self.in_flight {
            return Err(BlogError::Busy);
        }
        let text = self
            .content
            .as_ref()
            .map(|content| content.raw_text.clone())
            .ok_or_else(|| BlogError::validation(NO_CONTENT))?;
        self.in_flight = true;
        self.record(Transition::HumanizeStarted);
        Ok(text)
    }

    /// Accepts a humanize result, reshaped after the current text. A newer
    /// result replaces any earlier one.
    pub fn complete_humanize(
        &mut self,
        result: Result<HumanizeResult, BlogError>,
    ) -> Result<&HumanizeResult, BlogError> {
        self.in_flight = false;
        let result = match result {
            Ok(result) => result,
            Err(err) => {
                self.record(Transition::HumanizeFailed);
                return Err(err);
            }
        };
        let content = self
            .content
            .as_mut()
            .ok_or_else(|| BlogError::validation(NO_CONTENT))?;
        let reshaped = preserve(&content.raw_text, &result.humanized_text);
        content.raw_text = reshaped.clone();
        self.published = None;
        self.record(Transition::Humanized);
        Ok(self.humanized.insert(HumanizeResult {
            humanized_text: reshaped,
            ..result
        }))
    }

    /// Links and renders the current text.
    pub fn publish(&mut self) -> Result<&PublishedDocument, BlogError> {
        let content = self
            .content
            .as_ref()
            .ok_or_else(|| BlogError::validation(NO_CONTENT))?;
        let (keywords, urls) = self
            .request
            .as_ref()
            .map(|request| (request.keywords.as_slice(), request.urls.as_slice()))
            .unwrap_or_default();
        let document = publish(&content.raw_text, keywords, urls);
        self.record(Transition::Published);
        Ok(self.published.insert(document))
    }
}
