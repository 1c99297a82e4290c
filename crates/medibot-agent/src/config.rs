use serde::{Deserialize, Serialize};

/// Configuration for the remote conversational agent endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Base URL of the agent service, without a trailing path.
    pub base_url: String,
    /// Identifier of the agent to invoke.
    pub agent_id: String,
    /// Optional API key sent as the `x-api-key` header.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-call timeout for the streamed invocation.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    60
}

impl AgentConfig {
    /// The base URL with any trailing slash removed.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
