//! Per-dependency health, shared by `GET /health` and `cguide health`.
//!
//! `healthy` when every component passes. A model that is enabled but not
//! ready makes the service `degraded`. A store that cannot be reached makes
//! it `unhealthy`.

use std::collections::BTreeMap;

use serde::Serialize;

use community_guide_core::Store;

use crate::llm::CompletionProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "unhealthy",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    /// Component name (`store`, `model`) to its state line.
    pub components: BTreeMap<String, String>,
}

/// Ping the store and check the model without calling its remote API.
pub async fn check_health(store: &dyn Store, model: &dyn CompletionProvider) -> HealthReport {
    let ping = store.ping().await;
    assemble(ping, model)
}

/// Report for a store that could not be opened at all.
pub fn store_unreachable(error: anyhow::Error, model: &dyn CompletionProvider) -> HealthReport {
    assemble(Err(error), model)
}

fn assemble(store: anyhow::Result<()>, model: &dyn CompletionProvider) -> HealthReport {
    let mut components = BTreeMap::new();
    let mut status = HealthStatus::Healthy;

    match store {
        Ok(()) => {
            components.insert("store".to_string(), "healthy".to_string());
        }
        Err(e) => {
            components.insert("store".to_string(), format!("unhealthy: {:#}", e));
            status = HealthStatus::Unhealthy;
        }
    }

    let model_status = if !model.is_enabled() {
        "disabled".to_string()
    } else {
        match model.check() {
            Ok(()) => format!("healthy ({})", model.model_name()),
            Err(e) => {
                if status == HealthStatus::Healthy {
                    status = HealthStatus::Degraded;
                }
                format!("unhealthy: {}", e)
            }
        }
    };
    components.insert("model".to_string(), model_status);

    tracing::info!(health_status = status.as_str(), "health check completed");
    HealthReport { status, components }
}
