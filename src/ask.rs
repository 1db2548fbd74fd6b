//! `cguide ask`, `cguide summary` and `cguide health`: the service from the
//! command line.
//!
//! Every command prints pretty JSON to stdout so its output can be piped
//! into `jq`. Logs go to stderr.

use anyhow::{bail, Context, Result};
use serde_json::json;

use community_guide_core::validate::validate_query;

use crate::answer::{self, context_text};
use crate::config::Config;
use crate::health::{self, HealthStatus};
use crate::llm;
use crate::service;

/// Without `context`, prints the router response. With it, prints the full
/// answer `POST /ask` would return, phrased by the configured model.
pub async fn run_ask(config: &Config, query: &str, context: Option<&str>) -> Result<()> {
    let query = validate_query(query)?;
    let router = service::open_router(config).await?;

    let Some(raw) = context else {
        let response = router.natural_language_search(query).await;
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    };

    let value: serde_json::Value =
        serde_json::from_str(raw).context("--context must be valid JSON")?;
    let model = llm::create_provider(&config.model)?;
    let context = context_text(Some(&value));
    let answer = answer::answer(&router, model.as_ref(), query, context.as_deref()).await?;
    println!("{}", serde_json::to_string_pretty(&answer)?);
    Ok(())
}

pub async fn run_summary(config: &Config) -> Result<()> {
    let router = service::open_router(config).await?;
    let summary = router.get_tech_community_summary().await;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Print the same component report as `GET /health`. Fails when the store
/// is unreachable.
pub async fn run_health(config: &Config) -> Result<()> {
    let model = llm::create_provider(&config.model)?;
    let report = match service::connect_store(config).await {
        Ok(store) => health::check_health(store.as_ref(), model.as_ref()).await,
        Err(e) => health::store_unreachable(e, model.as_ref()),
    };

    let body = json!({
        "status": report.status,
        "version": env!("CARGO_PKG_VERSION"),
        "components": report.components,
    });
    println!("{}", serde_json::to_string_pretty(&body)?);

    if report.status == HealthStatus::Unhealthy {
        bail!("service is unhealthy");
    }
    Ok(())
}
