//! Chat-completion client for the hosted model endpoint.

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::constants;
use crate::error::{ArchitectError, Result};
use crate::session::ConversationEntry;

/// One completion choice. Endpoints have shipped the assistant reply
/// either nested under `message` or as a bare `text` field, so both
/// layouts decode.
#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

/// Client for an OpenAI-style chat-completion endpoint.
pub struct ModelClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl ModelClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_api_base(constants::OPENAI_API_BASE.as_str(), api_key)
    }

    /// Point the client at a different endpoint (used by tests).
    pub fn with_api_base(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
            api_key: api_key.into(),
        }
    }

    /// Forward the conversation transcript to the model and return the
    /// assistant reply text. One blocking external call, no streaming,
    /// no retries.
    pub async fn generate_response(
        &self,
        model: &str,
        history: &[ConversationEntry],
    ) -> Result<String> {
        if self.api_key.trim().is_empty() {
            return Err(ArchitectError::MissingCredential("OpenAI API key"));
        }

        // Only role and content go over the wire; display timestamps
        // stay local.
        let messages: Vec<serde_json::Value> = history
            .iter()
            .map(|entry| json!({ "role": entry.role, "content": entry.content }))
            .collect();
        let body = json!({ "model": model, "messages": messages });

        let url = format!("{}/chat/completions", self.api_base);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(constants::http_timeout())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ArchitectError::remote(status.as_u16(), text));
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let reply = extract_reply(&completion);
        debug!("Model returned {} chars", reply.len());
        Ok(reply)
    }
}

/// Pull the assistant text out of whichever layout the endpoint used.
/// A response that matches neither layout yields an empty reply, not
/// an error.
fn extract_reply(completion: &ChatCompletionResponse) -> String {
    let Some(choice) = completion.choices.first() else {
        return String::new();
    };
    if let Some(content) = choice.message.as_ref().and_then(|m| m.content.as_ref()) {
        return content.clone();
    }
    choice.text.clone().unwrap_or_default()
}
