//! Language-model client used to phrase answers for `POST /ask` and
//! `cguide ask --context`.
//!
//! The router does all retrieval. The model only turns the router's results
//! bag into a conversational reply. Two providers exist:
//!
//! - **[`DisabledProvider`]**: no model configured. `/ask` still answers with
//!   the structured results and a short summary line.
//! - **[`AnthropicProvider`]**: the messages API over HTTPS.
//!
//! # Retry Strategy
//!
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::time::Duration;

use community_guide_core::RouterResponse;

use crate::config::ModelConfig;

const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

const SYSTEM_PROMPT: &str = "You are a helpful assistant for the Richmond, Virginia tech \
community. Answer using only the community data provided with each question: meetups, \
events, venues and companies. Be concise and conversational. If the data does not cover \
the question, say so and suggest a related question the user could ask instead.";

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the model identifier, or `"disabled"`.
    fn model_name(&self) -> &str;

    /// Whether answers should be phrased by this provider at all. When
    /// `false`, callers answer with [`fallback_response`] and health reports
    /// the model as `disabled`.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Cheap readiness check for `GET /health`. Never calls the remote API.
    fn check(&self) -> Result<()> {
        Ok(())
    }

    /// Produce a reply to `prompt`. `context` is the optional free-form
    /// context the caller sent alongside the question.
    async fn complete(&self, prompt: &str, context: Option<&str>) -> Result<String>;
}

/// Provider used when `model.provider = "disabled"`.
pub struct DisabledProvider;

#[async_trait]
impl CompletionProvider for DisabledProvider {
    fn model_name(&self) -> &str {
        "disabled"
    }

    fn is_enabled(&self) -> bool {
        false
    }

    async fn complete(&self, _prompt: &str, _context: Option<&str>) -> Result<String> {
        bail!("Model provider is disabled")
    }
}

pub struct AnthropicProvider {
    client: reqwest::Client,
    model: String,
    api_url: String,
    max_tokens: u32,
    max_retries: u32,
}

impl AnthropicProvider {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow!("model.model required"))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            model,
            api_url: config
                .api_url
                .clone()
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            max_tokens: config.max_tokens,
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn check(&self) -> Result<()> {
        std::env::var("ANTHROPIC_API_KEY")
            .map(|_| ())
            .map_err(|_| anyhow!("ANTHROPIC_API_KEY not set"))
    }

    async fn complete(&self, prompt: &str, context: Option<&str>) -> Result<String> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| anyhow!("ANTHROPIC_API_KEY not set"))?;

        let content = match context {
            Some(ctx) if !ctx.trim().is_empty() => {
                format!("{}\n\nAdditional context from the user:\n{}", prompt, ctx)
            }
            _ => prompt.to_string(),
        };

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": SYSTEM_PROMPT,
            "messages": [{ "role": "user", "content": content }],
        });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(&self.api_url)
                .header("x-api-key", &api_key)
                .header("anthropic-version", API_VERSION)
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response.json().await?;
                        return parse_messages_response(&json);
                    }

                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        tracing::warn!(attempt, %status, "model call failed, retrying");
                        last_err = Some(anyhow!("Model API error {}: {}", status, body_text));
                        continue;
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    bail!("Model API error {}: {}", status, body_text);
                }
                Err(e) => {
                    tracing::warn!(attempt, "model request failed: {}", e);
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow!("Completion failed after retries")))
    }
}

/// Concatenate the text blocks of a messages API response.
fn parse_messages_response(json: &serde_json::Value) -> Result<String> {
    let blocks = json
        .get("content")
        .and_then(|c| c.as_array())
        .ok_or_else(|| anyhow!("Invalid model response: missing content array"))?;

    let text: Vec<&str> = blocks
        .iter()
        .filter(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
        .filter_map(|b| b.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.is_empty() {
        bail!("Invalid model response: no text content");
    }
    Ok(text.join(""))
}

pub fn create_provider(config: &ModelConfig) -> Result<Box<dyn CompletionProvider>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledProvider)),
        "anthropic" => Ok(Box::new(AnthropicProvider::new(config)?)),
        other => bail!("Unknown model provider: {}", other),
    }
}

/// Prompt for the model: the user's question followed by the router's
/// results bag as JSON.
pub fn build_prompt(query: &str, routed: &RouterResponse) -> Result<String> {
    let data = serde_json::to_string_pretty(&routed.results)?;
    let mut prompt = format!("Question: {}\n\nCommunity data:\n{}\n", query, data);
    if !routed.suggestions.is_empty() {
        prompt.push_str("\nSuggested follow-up questions:\n");
        for s in &routed.suggestions {
            prompt.push_str("- ");
            prompt.push_str(s);
            prompt.push('\n');
        }
    }
    if let Some(err) = &routed.error {
        prompt.push_str(&format!("\nSome data could not be loaded: {}\n", err));
    }
    Ok(prompt)
}

/// Reply used when no model is configured or the model call failed.
pub fn fallback_response(routed: &RouterResponse) -> String {
    if routed.results.is_empty() {
        return "I couldn't find community data matching that question. Try asking about \
upcoming events, meetups, venues or local tech companies."
            .to_string();
    }
    let labels: Vec<String> = routed
        .results
        .keys()
        .map(|k| k.replace('_', " "))
        .collect();
    format!("Here is what I found: {}.", labels.join(", "))
}
