//! Answering one question end to end: route it, then phrase the results
//! with the language model or fall back to a plain summary line.
//!
//! `POST /ask` and `cguide ask --context` both go through [`answer`], so the
//! HTTP surface and the command line produce the same response for the same
//! data.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

use community_guide_core::{QueryRouter, RouteResult};

use crate::llm::{self, CompletionProvider};

/// A routed question and its phrased reply.
#[derive(Debug, Serialize)]
pub struct Answer {
    pub query: String,
    pub response: String,
    pub results: BTreeMap<String, RouteResult>,
    pub suggestions: Vec<String>,
    /// Router and model errors, joined with `"; "`.
    pub error: Option<String>,
    pub model: String,
}

/// Free-form caller context as the text handed to the model. Strings pass
/// through; other JSON values are sent compact. `null` and `{}` mean no
/// context.
pub fn context_text(context: Option<&serde_json::Value>) -> Option<String> {
    match context? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(map) if map.is_empty() => None,
        other => Some(other.to_string()),
    }
}

/// Answer an already validated `query`.
///
/// A failing model call does not fail the answer: the fallback text is used
/// and the failure is appended to `error` as `model: ...`. Only a prompt that
/// cannot be built is an error.
pub async fn answer(
    router: &QueryRouter,
    model: &dyn CompletionProvider,
    query: &str,
    context: Option<&str>,
) -> Result<Answer> {
    let routed = router.natural_language_search(query).await;
    let mut error = routed.error.clone();

    let response = if model.is_enabled() {
        let prompt = llm::build_prompt(query, &routed)?;
        match model.complete(&prompt, context).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(model = model.model_name(), "model call failed: {:#}", e);
                let msg = format!("model: {}", e);
                error = Some(match error {
                    Some(prev) => format!("{}; {}", prev, msg),
                    None => msg,
                });
                llm::fallback_response(&routed)
            }
        }
    } else {
        llm::fallback_response(&routed)
    };

    Ok(Answer {
        query: routed.query,
        response,
        results: routed.results,
        suggestions: routed.suggestions,
        error,
        model: model.model_name().to_string(),
    })
}
