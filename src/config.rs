use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_LANGFLOW_BASE_URL: &str = "https://api.langflow.astra.datastax.com";
pub const DEFAULT_FLOW_PATH: &str = "/lf/90f26dad-f91c-4f96-b632-9a7b2ccafa2f/api/v1/run/328c3738-c19d-411f-b9f0-d011450221f3";
pub const DEFAULT_PROMPT_NODE: &str = "Prompt-D7UlR";
pub const DEFAULT_PROMPT_TEMPLATE: &str = "Write a blog in proper blog format on {topic}. The {topic} must cover {details}. It should also must include the following {keywords}. To support blog use the information from {references}.";
pub const DEFAULT_HUMANIZER_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

/// Proxy to generation service budget.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(90);
/// Caller to proxy budget. Must exceed [`UPSTREAM_TIMEOUT`] so the proxy's
/// own timeout is reported instead of being cut off client-side.
pub const CALLER_TIMEOUT: Duration = Duration::from_secs(120);
/// Minimum time a humanize call takes before its result is surfaced.
pub const HUMANIZE_MIN_DURATION: Duration = Duration::from_secs(6);

/// Connection details for the generation workflow.
#[derive(Debug, Clone)]
pub struct LangflowConfig {
    pub base_url: String,
    pub flow_path: String,
    pub prompt_node: String,
    pub template: String,
    /// Bearer token. Never compiled in; comes from flags or the environment.
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for LangflowConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LANGFLOW_BASE_URL.to_string(),
            flow_path: DEFAULT_FLOW_PATH.to_string(),
            prompt_node: DEFAULT_PROMPT_NODE.to_string(),
            template: DEFAULT_PROMPT_TEMPLATE.to_string(),
            token: None,
            timeout: UPSTREAM_TIMEOUT,
        }
    }
}

impl LangflowConfig {
    pub fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if self.flow_path.starts_with('/') {
            format!("{base}{}", self.flow_path)
        } else {
            format!("{base}/{}", self.flow_path)
        }
    }
}

#[derive(Debug, Clone)]
pub struct HumanizerConfig {
    pub base_url: String,
    pub min_duration: Duration,
}

impl Default for HumanizerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_HUMANIZER_URL.to_string(),
            min_duration: HUMANIZE_MIN_DURATION,
        }
    }
}

impl HumanizerConfig {
    pub fn analyze_url(&self) -> String {
        format!("{}/analyze", self.base_url.trim_end_matches('/'))
    }
}

/// Everything the proxy server needs to start.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub addr: SocketAddr,
    pub langflow: LangflowConfig,
    pub humanizer: HumanizerConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            langflow: LangflowConfig::default(),
            humanizer: HumanizerConfig::default(),
        }
    }
}
