use crate::config::AgentConfig;
use crate::stream::{parse_data_line, ChunkEvent, NO_CONTENT_REPLY};
use async_trait::async_trait;
use futures_util::StreamExt;
use medibot_core::{MediError, MediResult};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// Outbound interface to the remote conversational agent.
///
/// One call per turn. Implementations must assemble the streamed fragments
/// into a single reply string and substitute [`NO_CONTENT_REPLY`] when the
/// stream carries no content.
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Sends one user message to the agent and returns the full reply text.
    async fn invoke(&self, session_id: Uuid, input_text: &str) -> MediResult<String>;
}

/// HTTP implementation of [`AgentClient`] consuming the agent's SSE stream.
pub struct HttpAgentClient {
    config: AgentConfig,
    http: reqwest::Client,
}

impl HttpAgentClient {
    /// Creates a client for the configured agent endpoint.
    pub fn new(config: AgentConfig) -> MediResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MediError::Upstream(e.to_string()))?;
        Ok(Self { config, http })
    }
}

#[async_trait]
impl AgentClient for HttpAgentClient {
    async fn invoke(&self, session_id: Uuid, input_text: &str) -> MediResult<String> {
        let url = format!(
            "{}/agents/{}/invoke",
            self.config.base_url(),
            self.config.agent_id
        );

        let body = serde_json::json!({
            "sessionId": session_id,
            "inputText": input_text,
        });

        let mut request = self.http.post(&url).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.header("x-api-key", key);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| MediError::Upstream(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let error_body = resp
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(MediError::Upstream(format!(
                "agent returned {status}: {error_body}"
            )));
        }

        let mut stream = resp.bytes_stream();
        let mut buffer = String::new();
        let mut reply = String::new();

        'outer: while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result
                .map_err(|e| MediError::Upstream(format!("stream read error: {e}")))?;
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(line_end) = buffer.find('\n') {
                let line = buffer[..line_end].to_string();
                buffer = buffer[line_end + 1..].to_string();

                match parse_data_line(&line) {
                    Some(ChunkEvent::Fragment(text)) => reply.push_str(&text),
                    Some(ChunkEvent::Done) => break 'outer,
                    None => {}
                }
            }
        }

        if reply.is_empty() {
            info!(session_id = %session_id, "Agent stream carried no content, using fallback");
            return Ok(NO_CONTENT_REPLY.to_string());
        }

        debug!(session_id = %session_id, reply_len = reply.len(), "Agent reply assembled");
        Ok(reply)
    }
}
