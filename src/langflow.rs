//! Client for the Langflow workflow that writes the blog.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::config::LangflowConfig;
use crate::orchestrator::GenerationService;
use crate::{BlogError, GeneratedContent, GenerationRequest};

/// JSON pointer to the generated message in a run response.
pub const MESSAGE_POINTER: &str = "/outputs/0/outputs/0/artifacts/message";

#[derive(Debug, Serialize)]
pub struct RunPayload<'a> {
    pub input_value: String,
    pub input_type: &'static str,
    pub output_type: &'static str,
    pub tweaks: BTreeMap<&'a str, PromptTweak<'a>>,
}

/// Template variables for the prompt node.
#[derive(Debug, Serialize)]
pub struct PromptTweak<'a> {
    pub template: &'a str,
    pub topic: &'a str,
    pub details: &'a str,
    pub keywords: String,
    pub references: String,
}

pub fn build_payload<'a>(
    config: &'a LangflowConfig,
    request: &'a GenerationRequest,
) -> RunPayload<'a> {
    let tweak = PromptTweak {
        template: &config.template,
        topic: &request.topic,
        details: &request.audience,
        keywords: request.keywords.join(", "),
        references: request.urls.join(", "),
    };
    RunPayload {
        input_value: format!(
            "Generate blog about {} for {} in {}",
            request.topic, request.audience, request.country
        ),
        input_type: "chat",
        output_type: "chat",
        tweaks: BTreeMap::from([(config.prompt_node.as_str(), tweak)]),
    }
}

/// Pulls the generated text out of a run response body.
pub fn extract_message(body: &str) -> Result<String, BlogError> {
    serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(|value| value.pointer(MESSAGE_POINTER))
        .and_then(Value::as_str)
        .filter(|message| !message.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| BlogError::ContentExtraction {
            raw: body.to_string(),
        })
}

pub struct LangflowClient {
    client: reqwest::Client,
    config: LangflowConfig,
    endpoint: String,
}

impl LangflowClient {
    pub fn new(config: LangflowConfig) -> Result<Self, BlogError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        let endpoint = config.endpoint();
        Ok(Self {
            client,
            config,
            endpoint,
        })
    }

    pub async fn run(&self, request: &GenerationRequest) -> Result<String, BlogError> {
        let payload = build_payload(&self.config, request);
        let mut call = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .json(&payload);
        if let Some(token) = &self.config.token {
            call = call.bearer_auth(token);
        }

        info!(endpoint = %self.endpoint, "sending generation request");
        let response = call.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!(status = status.as_u16(), %body, "generation service returned an error");
            return Err(BlogError::upstream(Some(status.as_u16()), body));
        }

        match extract_message(&body) {
            Ok(message) => {
                let preview: String = message.chars().take(100).collect();
                info!(%preview, "parsed blog content");
                Ok(message)
            }
            Err(err) => {
                error!(raw = %body, "blog content not found in response structure");
                Err(err)
            }
        }
    }
}

#[async_trait]
impl GenerationService for LangflowClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedContent, BlogError> {
        let raw_text = self.run(request).await?;
        Ok(GeneratedContent { raw_text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> GenerationRequest {
        GenerationRequest {
            topic: "Urban beekeeping".into(),
            country: "France".into(),
            audience: "city dwellers".into(),
            keywords: vec!["bees".into(), "honey".into()],
            urls: vec!["https://a.example".into(), "https://b.example".into()],
        }
    }

    #[test]
    fn payload_matches_workflow_shape() {
        let config = LangflowConfig::default();
        let payload = serde_json::to_value(build_payload(&config, &request())).unwrap();
        assert_eq!(
            payload["input_value"],
            "Generate blog about Urban beekeeping for city dwellers in France"
        );
        assert_eq!(payload["input_type"], "chat");
        assert_eq!(payload["output_type"], "chat");
        let tweak = &payload["tweaks"]["Prompt-D7UlR"];
        assert_eq!(tweak["topic"], "Urban beekeeping");
        assert_eq!(tweak["details"], "city dwellers");
        assert_eq!(tweak["keywords"], "bees, honey");
        assert_eq!(tweak["references"], "https://a.example, https://b.example");
        assert!(tweak["template"].as_str().unwrap().contains("{references}"));
    }

    #[test]
    fn extracts_nested_message() {
        let body = json!({
            "outputs": [{ "outputs": [{ "artifacts": { "message": "# Bees\n\nBuzz." } }] }]
        })
        .to_string();
        assert_eq!(extract_message(&body).unwrap(), "# Bees\n\nBuzz.");
    }

    #[test]
    fn missing_path_keeps_raw_body() {
        for body in [
            r#"{"outputs":[]}"#,
            r#"{"outputs":[{"outputs":[{"artifacts":{"message":"  "}}]}]}"#,
            "not json at all",
        ] {
            match extract_message(body) {
                Err(BlogError::ContentExtraction { raw }) => assert_eq!(raw, body),
                other => panic!("unexpected result {other:?}"),
            }
        }
    }

    #[cfg(feature = "web")]
    mod http {
        use super::*;
        use crate::testing::spawn_upstream;
        use axum::{Json, Router, http::HeaderMap, http::StatusCode, routing::post};

        fn client(base_url: String) -> LangflowClient {
            LangflowClient::new(LangflowConfig {
                base_url,
                flow_path: "/run".into(),
                token: Some("secret-token".into()),
                ..LangflowConfig::default()
            })
            .unwrap()
        }

        #[tokio::test]
        async fn sends_bearer_token_and_reads_message() {
            let router = Router::new().route(
                "/run",
                post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    let topic = body["tweaks"]["Prompt-D7UlR"]["topic"].clone();
                    Json(json!({
                        "outputs": [{ "outputs": [{ "artifacts": {
                            "message": format!("{auth} {}", topic.as_str().unwrap_or_default())
                        } }] }]
                    }))
                }),
            );
            let base = spawn_upstream(router).await;
            let message = client(base).run(&request()).await.unwrap();
            assert_eq!(message, "Bearer secret-token Urban beekeeping");
        }

        #[tokio::test]
        async fn non_success_is_upstream_error() {
            let router = Router::new().route(
                "/run",
                post(|| async { (StatusCode::BAD_GATEWAY, "flow crashed") }),
            );
            let base = spawn_upstream(router).await;
            let err = client(base).run(&request()).await.unwrap_err();
            match err {
                BlogError::Upstream { status, detail } => {
                    assert_eq!(status, Some(502));
                    assert_eq!(detail, "flow crashed");
                }
                other => panic!("unexpected error {other:?}"),
            }
        }

        #[tokio::test]
        async fn slow_flow_times_out_with_a_friendly_message() {
            use std::time::Duration;

            let router = Router::new().route(
                "/run",
                post(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Json(json!({}))
                }),
            );
            let base = spawn_upstream(router).await;
            let client = LangflowClient::new(LangflowConfig {
                base_url: base,
                flow_path: "/run".into(),
                timeout: Duration::from_millis(100),
                ..LangflowConfig::default()
            })
            .unwrap();
            let err = client.generate(&request()).await.unwrap_err();
            assert!(matches!(err, BlogError::Timeout));
            assert_eq!(
                err.user_message(),
                "Generation is taking longer than expected. Please try again."
            );
        }

        #[tokio::test]
        async fn unexpected_shape_is_extraction_error() {
            let router = Router::new().route(
                "/run",
                post(|| async { Json(json!({ "session_id": "abc" })) }),
            );
            let base = spawn_upstream(router).await;
            let err = client(base).generate(&request()).await.unwrap_err();
            assert!(matches!(err, BlogError::ContentExtraction { ref raw } if raw.contains("session_id")));
        }
    }
}
