//! Storage abstraction for the community table.
//!
//! The [`Store`] trait is the narrow contract the Data Access Layer consumes:
//! point gets by composite key, secondary-index queries by partition key,
//! filtered scans, batch put/delete and an atomic counter add. There are no
//! transactions and no range conditions.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::item::{AttributeValue, Item, PrimaryKey};

/// Predicate evaluated by [`Store::scan`].
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every item.
    All,
    /// Attribute exists and equals the value.
    Eq(String, AttributeValue),
    /// Case-insensitive containment. Strings match by substring; lists and
    /// string sets match when any string element contains the needle.
    ContainsIgnoreCase(String, String),
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq_str(attr: &str, value: &str) -> Self {
        Filter::Eq(attr.to_string(), AttributeValue::S(value.to_string()))
    }

    pub fn contains(attr: &str, needle: &str) -> Self {
        Filter::ContainsIgnoreCase(attr.to_string(), needle.to_string())
    }

    pub fn matches(&self, item: &Item) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(attr, value) => item.get(attr) == Some(value),
            Filter::ContainsIgnoreCase(attr, needle) => {
                let needle = needle.to_lowercase();
                match item.get(attr) {
                    Some(value) => contains_ignore_case(value, &needle),
                    None => false,
                }
            }
            Filter::And(filters) => filters.iter().all(|f| f.matches(item)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(item)),
        }
    }
}

fn contains_ignore_case(value: &AttributeValue, needle_lower: &str) -> bool {
    match value {
        AttributeValue::S(s) => s.to_lowercase().contains(needle_lower),
        AttributeValue::SS(items) => items
            .iter()
            .any(|s| s.to_lowercase().contains(needle_lower)),
        AttributeValue::L(items) => items.iter().any(|v| match v {
            AttributeValue::S(s) => s.to_lowercase().contains(needle_lower),
            _ => false,
        }),
        _ => false,
    }
}

/// Abstract partitioned key-value store.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`get_item`](Store::get_item) | Point lookup by composite key |
/// | [`query_index`](Store::query_index) | All items in one `GSI1PK` partition |
/// | [`scan`](Store::scan) | Full scan with a filter predicate |
/// | [`put_items`](Store::put_items) | Batch insert-or-replace |
/// | [`delete_items`](Store::delete_items) | Batch delete by key |
/// | [`add_to_number`](Store::add_to_number) | Atomic counter update on one item |
/// | [`ping`](Store::ping) | Liveness check |
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch one item. `Ok(None)` when no item has the key.
    async fn get_item(&self, key: &PrimaryKey) -> Result<Option<Item>>;

    /// Items whose `GSI1PK` equals `partition`, ordered by `GSI1SK` and then
    /// insertion order.
    async fn query_index(&self, partition: &str) -> Result<Vec<Item>>;

    /// Every item matching `filter`, in insertion order.
    async fn scan(&self, filter: &Filter) -> Result<Vec<Item>>;

    /// Insert or replace items. Each item must carry `PK` and `SK`.
    async fn put_items(&self, items: &[Item]) -> Result<()>;

    /// Delete items by key. Missing keys are ignored.
    async fn delete_items(&self, keys: &[PrimaryKey]) -> Result<()>;

    /// Add `delta` to the integer attribute `attribute` of the item at `key`
    /// and set its `UpdatedAt` to `updated_at`, as one atomic step. A missing
    /// attribute counts as zero. Returns the new value, or `Ok(None)` when no
    /// item has the key.
    async fn add_to_number(
        &self,
        key: &PrimaryKey,
        attribute: &str,
        delta: i64,
        updated_at: &str,
    ) -> Result<Option<i64>>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<()>;
}
