//! Chat-completion client for the enrichment service

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::EnrichError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CHAT_PATH: &str = "/api/v1/chat";

/// A text-generation collaborator: one prompt in, the reply text out.
pub(crate) trait Enricher {
    fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, EnrichError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: [ChatTurn<'a>; 1],
    provider: &'a str,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatTurn<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    content: String,
}

pub(crate) struct CbaiClient {
    agent: ureq::Agent,
    endpoint: String,
    provider: String,
}

impl CbaiClient {
    pub(crate) fn new(base_url: &str, provider: &str) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build()
            .into();
        Self {
            agent,
            endpoint: format!("{}{CHAT_PATH}", base_url.trim_end_matches('/')),
            provider: provider.to_string(),
        }
    }
}

impl Enricher for CbaiClient {
    fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, EnrichError> {
        let request = ChatRequest {
            messages: [ChatTurn {
                role: "user",
                content: prompt,
            }],
            provider: &self.provider,
            max_tokens,
        };
        let response = self
            .agent
            .post(&self.endpoint)
            .send_json(&request)
            .map_err(|err| match err {
                ureq::Error::StatusCode(code) => EnrichError::Status(code),
                other => EnrichError::Http(other.to_string()),
            })?;
        let reply: ChatResponse = response
            .into_body()
            .read_json()
            .map_err(|err| EnrichError::Decode(err.to_string()))?;
        Ok(reply.content)
    }
}
