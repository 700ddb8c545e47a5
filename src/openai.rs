//! OpenAI chat-completions lead generator.
//!
//! The model is asked for a JSON array of candidate objects. Whatever
//! comes back — fenced Markdown, prose, a bare object — is degraded to
//! an empty batch if it does not parse as an array; malformed output
//! never fails an ingestion pass.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::GenerateError;
use crate::generate::LeadGenerator;
use crate::http::{send_with_retry, RetryPolicy};
use crate::types::LeadCandidate;

const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o";

pub struct OpenAiGenerator {
    api_key: String,
    model: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

// ============================================================================
// API response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

// ============================================================================
// Output parsing
// ============================================================================

/// Strip a surrounding Markdown code fence, with or without a `json`
/// language tag.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.trim_start_matches(['\r', '\n']);
    let rest = rest.trim_end();
    rest.strip_suffix("```").map(str::trim_end).unwrap_or(rest)
}

/// Parse model output into a candidate batch. Non-array or unparsable
/// content yields an empty batch, never an error.
pub fn parse_candidate_batch(content: &str) -> Vec<LeadCandidate> {
    let payload = strip_code_fence(content.trim());
    match serde_json::from_str::<Vec<LeadCandidate>>(payload) {
        Ok(candidates) => candidates,
        Err(e) => {
            log::warn!("generator output is not a candidate array ({e}); treating as empty");
            Vec::new()
        }
    }
}

// ============================================================================
// Generator
// ============================================================================

impl OpenAiGenerator {
    pub fn new(api_key: String) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL.to_string())
    }

    pub fn with_model(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: reqwest::Client::new(),
            retry: RetryPolicy::default(),
        }
    }
}

#[async_trait]
impl LeadGenerator for OpenAiGenerator {
    async fn generate_candidates(
        &self,
        prompt: &str,
    ) -> Result<Vec<LeadCandidate>, GenerateError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
        });

        let resp = send_with_retry(
            self.client
                .post(COMPLETIONS_URL)
                .bearer_auth(&self.api_key)
                .json(&body),
            &self.retry,
        )
        .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerateError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let chat: ChatResponse = resp.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .map(|m| m.content)
            .unwrap_or_default();

        if content.is_empty() {
            log::warn!("generator returned no content; treating as empty batch");
            return Ok(Vec::new());
        }

        Ok(parse_candidate_batch(&content))
    }
}
