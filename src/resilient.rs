//! Retry and timeout wrapper around any [`Store`].
//!
//! Every call gets a per-attempt timeout. Failed or timed-out attempts are
//! retried with exponential backoff (`backoff`, `2 * backoff`, `4 * backoff`,
//! capped at 2^5 multiples) up to `max_retries` times. Calls are retried
//! whole, so a retried read returns exactly what a single successful read
//! would, and batch writes are idempotent puts and deletes. Counter adds are
//! not idempotent and get a single timed attempt.

use std::future::Future;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use community_guide_core::item::{Item, PrimaryKey};
use community_guide_core::store::{Filter, Store};

use crate::config::StoreConfig;

pub struct ResilientStore<S> {
    inner: S,
    max_retries: u32,
    backoff: Duration,
    timeout: Duration,
}

impl<S: Store> ResilientStore<S> {
    pub fn new(inner: S, config: &StoreConfig) -> Self {
        Self {
            inner,
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.backoff_ms),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn with_retry<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.backoff * (1u32 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            match tokio::time::timeout(self.timeout, call()).await {
                Ok(Ok(value)) => {
                    if attempt > 0 {
                        tracing::info!(operation, attempt, "store call recovered after retry");
                    }
                    return Ok(value);
                }
                Ok(Err(e)) => {
                    tracing::warn!(operation, attempt, "store call failed: {:#}", e);
                    last_err = Some(e);
                }
                Err(_) => {
                    tracing::warn!(operation, attempt, "store call timed out");
                    last_err = Some(anyhow!(
                        "{} timed out after {}ms",
                        operation,
                        self.timeout.as_millis()
                    ));
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow!("{} failed after retries", operation)))
    }

    async fn once<T, Fut>(&self, operation: &str, call: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => {
                if let Err(e) = &result {
                    tracing::warn!(operation, "store call failed: {:#}", e);
                }
                result
            }
            Err(_) => {
                tracing::warn!(operation, "store call timed out");
                Err(anyhow!(
                    "{} timed out after {}ms",
                    operation,
                    self.timeout.as_millis()
                ))
            }
        }
    }
}

#[async_trait]
impl<S: Store> Store for ResilientStore<S> {
    async fn get_item(&self, key: &PrimaryKey) -> Result<Option<Item>> {
        self.with_retry("get_item", || self.inner.get_item(key)).await
    }

    async fn query_index(&self, partition: &str) -> Result<Vec<Item>> {
        self.with_retry("query_index", || self.inner.query_index(partition))
            .await
    }

    async fn scan(&self, filter: &Filter) -> Result<Vec<Item>> {
        self.with_retry("scan", || self.inner.scan(filter)).await
    }

    async fn put_items(&self, items: &[Item]) -> Result<()> {
        self.with_retry("put_items", || self.inner.put_items(items)).await
    }

    async fn delete_items(&self, keys: &[PrimaryKey]) -> Result<()> {
        self.with_retry("delete_items", || self.inner.delete_items(keys))
            .await
    }

    async fn add_to_number(
        &self,
        key: &PrimaryKey,
        attribute: &str,
        delta: i64,
        updated_at: &str,
    ) -> Result<Option<i64>> {
        self.once(
            "add_to_number",
            self.inner.add_to_number(key, attribute, delta, updated_at),
        )
        .await
    }

    async fn ping(&self) -> Result<()> {
        self.with_retry("ping", || self.inner.ping()).await
    }
}
