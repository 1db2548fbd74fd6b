//! In-memory [`Store`] implementation for tests and local demos.
//!
//! Items live in a `Vec` behind `std::sync::RwLock`, so scans and index
//! queries see insertion order. Replacing an existing key keeps its position.
//!
//! Fault injection ([`InMemoryStore::set_offline`],
//! [`InMemoryStore::fail_next_calls`]) lets tests exercise the degrade and
//! retry paths without a real backend.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use crate::item::{
    decimal_to_number, string_attr, AttributeValue, Item, PrimaryKey, GSI1PK, GSI1SK, UPDATED_AT,
};

use super::{Filter, Store};

struct StoredItem {
    key: PrimaryKey,
    item: Item,
}

/// In-memory store with optional fault injection.
pub struct InMemoryStore {
    items: RwLock<Vec<StoredItem>>,
    offline: AtomicBool,
    failures_pending: AtomicUsize,
    calls: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            offline: AtomicBool::new(false),
            failures_pending: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    /// Make every call fail until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make the next `n` calls fail, then recover.
    pub fn fail_next_calls(&self, n: usize) {
        self.failures_pending.store(n, Ordering::SeqCst);
    }

    /// Number of store calls made so far, failed ones included.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.items.read().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn enter(&self, op: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            bail!("store offline during {}", op);
        }
        // Each pending failure is consumed by exactly one call.
        let consumed = self
            .failures_pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if consumed {
            bail!("transient store failure during {}", op);
        }
        Ok(())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

#[async_trait]
impl Store for InMemoryStore {
    async fn get_item(&self, key: &PrimaryKey) -> Result<Option<Item>> {
        self.enter("get_item")?;
        let items = self.items.read().map_err(|_| poisoned())?;
        Ok(items.iter().find(|s| &s.key == key).map(|s| s.item.clone()))
    }

    async fn query_index(&self, partition: &str) -> Result<Vec<Item>> {
        self.enter("query_index")?;
        let items = self.items.read().map_err(|_| poisoned())?;
        let mut matched: Vec<&Item> = items
            .iter()
            .map(|s| &s.item)
            .filter(|item| string_attr(item, GSI1PK) == Some(partition))
            .collect();
        // Stable sort keeps insertion order within equal sort keys.
        matched.sort_by(|a, b| string_attr(a, GSI1SK).cmp(&string_attr(b, GSI1SK)));
        Ok(matched.into_iter().cloned().collect())
    }

    async fn scan(&self, filter: &Filter) -> Result<Vec<Item>> {
        self.enter("scan")?;
        let items = self.items.read().map_err(|_| poisoned())?;
        Ok(items
            .iter()
            .filter(|s| filter.matches(&s.item))
            .map(|s| s.item.clone())
            .collect())
    }

    async fn put_items(&self, new_items: &[Item]) -> Result<()> {
        self.enter("put_items")?;
        let mut items = self.items.write().map_err(|_| poisoned())?;
        for item in new_items {
            let key = PrimaryKey::of_item(item)
                .ok_or_else(|| anyhow!("item is missing PK/SK attributes"))?;
            match items.iter_mut().find(|s| s.key == key) {
                Some(existing) => existing.item = item.clone(),
                None => items.push(StoredItem {
                    key,
                    item: item.clone(),
                }),
            }
        }
        Ok(())
    }

    async fn delete_items(&self, keys: &[PrimaryKey]) -> Result<()> {
        self.enter("delete_items")?;
        let mut items = self.items.write().map_err(|_| poisoned())?;
        items.retain(|s| !keys.contains(&s.key));
        Ok(())
    }

    async fn add_to_number(
        &self,
        key: &PrimaryKey,
        attribute: &str,
        delta: i64,
        updated_at: &str,
    ) -> Result<Option<i64>> {
        self.enter("add_to_number")?;
        let mut items = self.items.write().map_err(|_| poisoned())?;
        let Some(stored) = items.iter_mut().find(|s| &s.key == key) else {
            return Ok(None);
        };
        let current = match stored.item.get(attribute) {
            None | Some(AttributeValue::Null(_)) => 0,
            Some(AttributeValue::N(n)) => decimal_to_number(n)?
                .as_i64()
                .ok_or_else(|| anyhow!("attribute {} is not an integer: {}", attribute, n))?,
            Some(other) => bail!("attribute {} is not a number: {:?}", attribute, other),
        };
        let updated = current
            .checked_add(delta)
            .ok_or_else(|| anyhow!("attribute {} overflows", attribute))?;
        stored
            .item
            .insert(attribute.to_string(), AttributeValue::N(updated.to_string()));
        stored
            .item
            .insert(UPDATED_AT.to_string(), AttributeValue::S(updated_at.to_string()));
        Ok(Some(updated))
    }

    async fn ping(&self) -> Result<()> {
        self.enter("ping")
    }
}
