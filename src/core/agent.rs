use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::core::model::WorkflowResponse;

// The approval agent is driven with natural-language instructions and
// answers with a JSON envelope. One invocation per lane trigger: no
// retries, no timeout, failure is terminal for that attempt.

#[derive(Serialize)]
struct InvokeRequest<'a> {
    message: &'a str,
}

/// Inner agent reply. `status` other than "success" is a remote logical
/// failure even when the transport round-trip succeeded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentResponse {
    pub status: Option<String>,
    pub result: Option<WorkflowResponse>,
    pub message: Option<String>,
}

impl AgentResponse {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }
}

/// Transport-level envelope around one agent invocation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvokeReply {
    #[serde(default)]
    pub success: bool,
    pub response: Option<AgentResponse>,
    pub error: Option<String>,
}

#[async_trait]
pub trait AgentInvoker: Send + Sync {
    async fn invoke(&self, instruction: &str, agent_id: &str) -> Result<InvokeReply>;
}

pub struct HttpAgentInvoker {
    client: Client,
    base_url: Url,
}

impl HttpAgentInvoker {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    fn endpoint(&self, agent_id: &str) -> Result<Url> {
        self.base_url
            .join(&format!("api/agents/{agent_id}/invoke"))
            .context("invalid agent endpoint")
    }
}

#[async_trait]
impl AgentInvoker for HttpAgentInvoker {
    async fn invoke(&self, instruction: &str, agent_id: &str) -> Result<InvokeReply> {
        let endpoint = self.endpoint(agent_id)?;
        debug!("invoking agent {} ({} chars)", agent_id, instruction.len());

        let res = self
            .client
            .post(endpoint)
            .json(&InvokeRequest { message: instruction })
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            return Err(anyhow!(
                "Agent API error ({}): {}",
                status,
                res.text().await.unwrap_or_default()
            ));
        }

        let reply: InvokeReply = res.json().await?;
        Ok(reply)
    }
}
