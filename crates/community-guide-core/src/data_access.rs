//! Data Access Layer over the partitioned community table.
//!
//! [`DataAccess`] turns domain requests (venue by id, upcoming events, topic
//! search) into [`Store`] calls and decodes the resulting items into typed
//! records. Numeric normalization happens in the item codec on the way in and
//! out.
//!
//! # Failure handling
//!
//! Reads follow the configured [`FailureMode`]. In `Degrade` mode (the
//! default) a failed store call is logged and the read yields an empty list
//! or `None`; in `Strict` mode it yields [`DataError::StoreUnavailable`].
//! Items that fail to decode are logged and skipped in both modes. Writes
//! always report failures.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::error::{DataError, FailureMode};
use crate::item::{string_attr, Item, PrimaryKey, ENTITY_TYPE};
use crate::models::{
    event_day_partition, sort_events, Company, EntityKind, Event, MeetupGroup, Record, Venue,
};
use crate::store::{Filter, Store};
use crate::validate;

/// Records accepted by [`DataAccess::bulk_load`], in import-file shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub venues: Vec<Venue>,
    #[serde(default)]
    pub companies: Vec<Company>,
    #[serde(default)]
    pub meetups: Vec<MeetupGroup>,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// Outcome of a bulk load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub venues: usize,
    pub companies: usize,
    pub meetups: usize,
    pub events: usize,
    /// Records rejected by validation.
    pub skipped: usize,
    /// Records the store failed to write.
    pub failed: usize,
}

impl LoadReport {
    pub fn loaded(&self) -> usize {
        self.venues + self.companies + self.meetups + self.events
    }
}

/// Typed access to venues, companies, meetup groups and events.
#[derive(Clone)]
pub struct DataAccess {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    mode: FailureMode,
}

fn decode_all<R: Record>(items: &[Item]) -> Vec<R> {
    items
        .iter()
        .filter_map(|item| match R::from_item(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(
                    kind = R::KIND.entity_type(),
                    pk = string_attr(item, crate::item::PK).unwrap_or("?"),
                    "skipping undecodable item: {:#}",
                    e
                );
                None
            }
        })
        .collect()
}

fn event_filter(extra: Filter) -> Filter {
    Filter::And(vec![
        Filter::eq_str(ENTITY_TYPE, EntityKind::Event.entity_type()),
        extra,
    ])
}

impl DataAccess {
    /// Data access over `store` using the system clock and `Degrade` mode.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            mode: FailureMode::Degrade,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_failure_mode(mut self, mode: FailureMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn failure_mode(&self) -> FailureMode {
        self.mode
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Apply the failure mode to a failed read.
    fn degrade<T: Default>(&self, operation: &str, err: anyhow::Error) -> Result<T, DataError> {
        match self.mode {
            FailureMode::Degrade => {
                tracing::error!(operation, "store call failed, returning empty: {:#}", err);
                Ok(T::default())
            }
            FailureMode::Strict => {
                tracing::error!(operation, "store call failed: {:#}", err);
                Err(DataError::unavailable(operation, &err))
            }
        }
    }

    async fn get_record<R: Record>(
        &self,
        id: &str,
        operation: &str,
    ) -> Result<Option<R>, DataError> {
        let key = R::KIND.primary_key(id);
        match self.store.get_item(&key).await {
            Ok(Some(item)) => Ok(decode_all::<R>(std::slice::from_ref(&item)).pop()),
            Ok(None) => Ok(None),
            Err(e) => self.degrade(operation, e),
        }
    }

    async fn list_kind<R: Record>(&self, operation: &str) -> Result<Vec<R>, DataError> {
        match self.store.query_index(R::KIND.key_prefix()).await {
            Ok(items) => {
                let records = decode_all::<R>(&items);
                tracing::info!("Retrieved {} {} records", records.len(), R::KIND.entity_type());
                Ok(records)
            }
            Err(e) => self.degrade(operation, e),
        }
    }

    async fn scan_events(&self, filter: Filter, operation: &str) -> Result<Vec<Event>, DataError> {
        match self.store.scan(&event_filter(filter)).await {
            Ok(items) => {
                let mut events = decode_all::<Event>(&items);
                sort_events(&mut events);
                Ok(events)
            }
            Err(e) => self.degrade(operation, e),
        }
    }

    // ============ Point lookups ============

    /// Venue by id; `None` when absent.
    pub async fn get_venue(&self, id: &str) -> Result<Option<Venue>, DataError> {
        self.get_record(id, "get_venue").await
    }

    pub async fn get_company(&self, id: &str) -> Result<Option<Company>, DataError> {
        self.get_record(id, "get_company").await
    }

    pub async fn get_meetup(&self, id: &str) -> Result<Option<MeetupGroup>, DataError> {
        self.get_record(id, "get_meetup").await
    }

    pub async fn get_event(&self, id: &str) -> Result<Option<Event>, DataError> {
        self.get_record(id, "get_event").await
    }

    // ============ Kind listings ============

    pub async fn get_all_venues(&self) -> Result<Vec<Venue>, DataError> {
        self.list_kind("get_all_venues").await
    }

    pub async fn get_all_companies(&self) -> Result<Vec<Company>, DataError> {
        self.list_kind("get_all_companies").await
    }

    pub async fn get_all_meetups(&self) -> Result<Vec<MeetupGroup>, DataError> {
        self.list_kind("get_all_meetups").await
    }

    // ============ Event queries ============

    /// Events dated in `[today, today + days_ahead)`, sorted by
    /// `(date, start_time)`.
    ///
    /// The index is partitioned per day, so the window is fetched as one
    /// index query per calendar day and merged. A failure on any day fails
    /// the whole window.
    pub async fn get_upcoming_events(&self, days_ahead: u32) -> Result<Vec<Event>, DataError> {
        let today = self.today();
        let mut events = Vec::new();
        for offset in 0..days_ahead {
            let day = today + Duration::days(i64::from(offset));
            match self.store.query_index(&event_day_partition(day)).await {
                Ok(items) => events.extend(decode_all::<Event>(&items)),
                Err(e) => return self.degrade("get_upcoming_events", e),
            }
        }
        sort_events(&mut events);
        tracing::info!("Retrieved {} upcoming events", events.len());
        Ok(events)
    }

    /// All events of one meetup group, sorted by `(date, start_time)`.
    pub async fn get_events_by_meetup(&self, meetup_id: &str) -> Result<Vec<Event>, DataError> {
        let events = self
            .scan_events(Filter::eq_str("meetup_id", meetup_id), "get_events_by_meetup")
            .await?;
        tracing::info!("Retrieved {} events for meetup {}", events.len(), meetup_id);
        Ok(events)
    }

    /// Events whose title, description or any tag contains `query`.
    ///
    /// Matching is case-insensitive: `"python"` finds a `"Python"` tag.
    pub async fn search_events(&self, query: &str) -> Result<Vec<Event>, DataError> {
        let filter = Filter::Or(vec![
            Filter::contains("title", query),
            Filter::contains("description", query),
            Filter::contains("tags", query),
        ]);
        let events = self.scan_events(filter, "search_events").await?;
        tracing::info!("Found {} events matching '{}'", events.len(), query);
        Ok(events)
    }

    /// Earliest event in the next 90 days dated today or later, optionally
    /// restricted to events whose meetup name contains `meetup_name`
    /// (case-insensitive).
    pub async fn get_next_meetup_event(
        &self,
        meetup_name: Option<&str>,
    ) -> Result<Option<Event>, DataError> {
        let today = self.today();
        let needle = meetup_name
            .map(|n| n.trim().to_lowercase())
            .filter(|n| !n.is_empty());
        let upcoming = self.get_upcoming_events(90).await?;
        Ok(upcoming.into_iter().find(|event| {
            let name_matches = match &needle {
                Some(n) => event
                    .meetup_name
                    .as_deref()
                    .unwrap_or("")
                    .to_lowercase()
                    .contains(n.as_str()),
                None => true,
            };
            name_matches && event.day().is_some_and(|day| day >= today)
        }))
    }

    /// Record counts per kind, from one full scan.
    pub async fn record_counts(&self) -> Result<BTreeMap<String, usize>, DataError> {
        let items = match self.store.scan(&Filter::All).await {
            Ok(items) => items,
            Err(e) => return self.degrade("record_counts", e),
        };
        let mut counts: BTreeMap<String, usize> = EntityKind::ALL
            .iter()
            .map(|k| (k.entity_type().to_string(), 0))
            .collect();
        for item in &items {
            if let Some(kind) = string_attr(item, ENTITY_TYPE) {
                *counts.entry(kind.to_string()).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    // ============ Writes ============

    async fn put_record<R: Record>(&self, record: &R) -> Result<(), DataError> {
        let item = record
            .to_item(Utc::now())
            .map_err(|e| DataError::BadInput(format!("{:#}", e)))?;
        self.store.put_items(&[item]).await.map_err(|e| {
            tracing::error!("Error storing {} {}: {:#}", R::KIND.entity_type(), record.id(), e);
            DataError::unavailable("put", &e)
        })?;
        tracing::debug!("Stored {} {}", R::KIND.entity_type(), record.id());
        Ok(())
    }

    pub async fn put_venue(&self, venue: &Venue) -> Result<(), DataError> {
        validate::validate_venue(venue)?;
        self.put_record(venue).await
    }

    pub async fn put_company(&self, company: &Company) -> Result<(), DataError> {
        validate::validate_company(company)?;
        self.put_record(company).await
    }

    pub async fn put_meetup(&self, meetup: &MeetupGroup) -> Result<(), DataError> {
        validate::validate_meetup(meetup)?;
        self.put_record(meetup).await
    }

    pub async fn put_event(&self, event: &Event) -> Result<(), DataError> {
        validate::validate_event(event)?;
        self.put_record(event).await
    }

    /// Add `by` to an event's `registered` count and return the new count.
    ///
    /// The add happens inside the store in one step, so concurrent callers
    /// never lose each other's registrations.
    pub async fn increment_registered(&self, event_id: &str, by: u32) -> Result<u32, DataError> {
        let key = EntityKind::Event.primary_key(event_id);
        let updated_at = Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string();
        let registered = self
            .store
            .add_to_number(&key, "registered", i64::from(by), &updated_at)
            .await
            .map_err(|e| DataError::unavailable("increment_registered", &e))?
            .ok_or_else(|| DataError::NotFound(format!("event {}", event_id)))?;
        u32::try_from(registered).map_err(|_| {
            DataError::Decode(format!("event {} registered count out of range: {}", event_id, registered))
        })
    }

    /// Write every record in `data`. Invalid records are skipped and store
    /// failures counted; neither stops the load.
    pub async fn bulk_load(&self, data: &SeedData) -> LoadReport {
        let mut report = LoadReport::default();

        fn tally(report: &mut LoadReport, result: Result<(), DataError>, loaded: &mut usize) {
            match result {
                Ok(()) => *loaded += 1,
                Err(DataError::BadInput(msg)) => {
                    tracing::warn!("Skipping invalid record: {}", msg);
                    report.skipped += 1;
                }
                Err(_) => report.failed += 1,
            }
        }

        let mut n = 0;
        for venue in &data.venues {
            tally(&mut report, self.put_venue(venue).await, &mut n);
        }
        report.venues = n;

        let mut n = 0;
        for company in &data.companies {
            tally(&mut report, self.put_company(company).await, &mut n);
        }
        report.companies = n;

        let mut n = 0;
        for meetup in &data.meetups {
            tally(&mut report, self.put_meetup(meetup).await, &mut n);
        }
        report.meetups = n;

        let mut n = 0;
        for event in &data.events {
            tally(&mut report, self.put_event(event).await, &mut n);
        }
        report.events = n;

        tracing::info!(
            venues = report.venues,
            companies = report.companies,
            meetups = report.meetups,
            events = report.events,
            skipped = report.skipped,
            failed = report.failed,
            "Bulk load completed"
        );
        report
    }

    /// Delete every item in the table. Returns the number deleted.
    pub async fn clear_all(&self) -> Result<usize, DataError> {
        let items = self
            .store
            .scan(&Filter::All)
            .await
            .map_err(|e| DataError::unavailable("clear_all", &e))?;
        let keys: Vec<PrimaryKey> = items.iter().filter_map(PrimaryKey::of_item).collect();
        self.store
            .delete_items(&keys)
            .await
            .map_err(|e| DataError::unavailable("clear_all", &e))?;
        tracing::info!("Cleared {} items from table", keys.len());
        Ok(keys.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::item::AttributeValue;
    use crate::store::memory::InMemoryStore;
    use crate::test_support::*;
    use anyhow::Result;
    use async_trait::async_trait;

    /// Delegates to an in-memory store but yields after every read, so two
    /// concurrent writers interleave between their read and write.
    struct YieldingStore(InMemoryStore);

    #[async_trait]
    impl Store for YieldingStore {
        async fn get_item(&self, key: &PrimaryKey) -> Result<Option<Item>> {
            let item = self.0.get_item(key).await;
            tokio::task::yield_now().await;
            item
        }
        async fn query_index(&self, partition: &str) -> Result<Vec<Item>> {
            self.0.query_index(partition).await
        }
        async fn scan(&self, filter: &Filter) -> Result<Vec<Item>> {
            self.0.scan(filter).await
        }
        async fn put_items(&self, items: &[Item]) -> Result<()> {
            self.0.put_items(items).await
        }
        async fn delete_items(&self, keys: &[PrimaryKey]) -> Result<()> {
            self.0.delete_items(keys).await
        }
        async fn add_to_number(
            &self,
            key: &PrimaryKey,
            attribute: &str,
            delta: i64,
            updated_at: &str,
        ) -> Result<Option<i64>> {
            tokio::task::yield_now().await;
            self.0.add_to_number(key, attribute, delta, updated_at).await
        }
        async fn ping(&self) -> Result<()> {
            self.0.ping().await
        }
    }

    fn calendar() -> SeedData {
        let mut past = event("e_past", "Retro Night", days_from_today(-1), "18:30");
        past.meetup_name = Some("RVA.js".into());
        let mut late = event("e_late", "Zero Trust Architecture", days_from_today(2), "19:00");
        late.tags = vec!["Security".into()];
        late.meetup_id = "meetup_sec".into();
        late.meetup_name = Some("RVA Cybersecurity Guild".into());
        let mut early = event("e_early", "Serverless Basics", days_from_today(2), "18:30");
        early.tags = vec!["AWS".into(), "Serverless".into()];
        early.meetup_id = "meetup_cloud".into();
        early.meetup_name = Some("RVA Cloud Wranglers".into());
        let mut today_event = event("e_today", "Python Office Hours", today(), "12:00");
        today_event.description = "Bring your pandas questions".into();
        today_event.meetup_id = "meetup_py".into();
        today_event.meetup_name = Some("Richmond Python User Group".into());
        let far = event("e_far", "Python at Scale", days_from_today(30), "18:30");

        SeedData {
            venues: vec![venue("venue_a", "Common House"), venue("venue_b", "Startup Virginia")],
            companies: vec![company("c1", "CarMax", 25000), company("c2", "Flying Pig Labs", 15)],
            meetups: vec![meetup("meetup_py", "Richmond Python User Group", 320)],
            events: vec![late, past, far, early, today_event],
        }
    }

    #[tokio::test]
    async fn test_get_venue_found_and_missing() {
        let (_store, dal) = seeded(calendar()).await;
        let venue = dal.get_venue("venue_a").await.unwrap().unwrap();
        assert_eq!(venue.name, "Common House");
        assert!(dal.get_venue("venue_zzz").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_all_by_kind() {
        let (_store, dal) = seeded(calendar()).await;
        assert_eq!(dal.get_all_venues().await.unwrap().len(), 2);
        assert_eq!(dal.get_all_companies().await.unwrap().len(), 2);
        assert_eq!(dal.get_all_meetups().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upcoming_window_and_order() {
        let (_store, dal) = seeded(calendar()).await;
        let events = dal.get_upcoming_events(30).await.unwrap();
        let ids: Vec<_> = events.iter().map(|e| e.id.as_str()).collect();
        // e_past is before today and e_far is exactly today+30 (excluded).
        assert_eq!(ids, vec!["e_today", "e_early", "e_late"]);
        for e in &events {
            let day = e.day().unwrap();
            assert!(day >= today() && day < days_from_today(30));
        }

        let wider = dal.get_upcoming_events(31).await.unwrap();
        assert_eq!(wider.last().unwrap().id, "e_far");
        assert!(dal.get_upcoming_events(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upcoming_fans_out_one_query_per_day() {
        let (store, dal) = seeded(SeedData::default()).await;
        let before = store.call_count();
        dal.get_upcoming_events(7).await.unwrap();
        assert_eq!(store.call_count() - before, 7);
    }

    #[tokio::test]
    async fn test_next_meetup_event_never_in_past() {
        let (_store, dal) = seeded(calendar()).await;
        let next = dal.get_next_meetup_event(None).await.unwrap().unwrap();
        assert_eq!(next.id, "e_today");
        assert!(next.day().unwrap() >= today());
    }

    #[tokio::test]
    async fn test_next_meetup_event_by_name() {
        let (_store, dal) = seeded(calendar()).await;
        let next = dal
            .get_next_meetup_event(Some("cloud wranglers"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(next.id, "e_early");
        // Past events never qualify, even when the name matches.
        assert!(dal.get_next_meetup_event(Some("RVA.js")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_events_case_insensitive() {
        let (_store, dal) = seeded(calendar()).await;
        let ids: Vec<_> = dal
            .search_events("python")
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["e_today", "e_far"]);

        let by_tag = dal.search_events("serverless").await.unwrap();
        assert_eq!(by_tag.len(), 1);
        let by_description = dal.search_events("PANDAS").await.unwrap();
        assert_eq!(by_description[0].id, "e_today");
    }

    #[tokio::test]
    async fn test_search_events_ignores_other_kinds() {
        let (_store, dal) = seeded(calendar()).await;
        // Company tech stacks mention Python but companies are not events.
        let events = dal.search_events("carmax").await.unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_events_by_meetup() {
        let (_store, dal) = seeded(calendar()).await;
        let events = dal.get_events_by_meetup("meetup_cloud").await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Serverless Basics");
    }

    #[tokio::test]
    async fn test_reads_are_idempotent() {
        let (_store, dal) = seeded(calendar()).await;
        assert_eq!(
            dal.get_upcoming_events(60).await.unwrap(),
            dal.get_upcoming_events(60).await.unwrap()
        );
        assert_eq!(
            dal.search_events("a").await.unwrap(),
            dal.search_events("a").await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_degrade_mode_returns_empty() {
        let (store, dal) = seeded(calendar()).await;
        store.set_offline(true);
        assert!(dal.get_all_companies().await.unwrap().is_empty());
        assert!(dal.get_venue("venue_a").await.unwrap().is_none());
        assert!(dal.get_upcoming_events(30).await.unwrap().is_empty());
        assert!(dal.search_events("python").await.unwrap().is_empty());
        assert!(dal.get_next_meetup_event(None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_strict_mode_surfaces_unavailable() {
        let (store, dal) = seeded(calendar()).await;
        let dal = dal.with_failure_mode(FailureMode::Strict);
        store.set_offline(true);
        let err = dal.get_all_companies().await.unwrap_err();
        assert!(matches!(err, DataError::StoreUnavailable { .. }));
        assert_eq!(err.code(), "store_unavailable");
        assert!(dal.get_venue("venue_a").await.is_err());
    }

    #[tokio::test]
    async fn test_undecodable_items_are_skipped() {
        let (store, dal) = seeded(calendar()).await;
        let mut broken = Venue::to_item(&venue("venue_x", "Broken Hall"), Utc::now()).unwrap();
        broken.insert("capacity".into(), AttributeValue::S("lots".into()));
        store.put_items(&[broken]).await.unwrap();
        let venues = dal.get_all_venues().await.unwrap();
        assert_eq!(venues.len(), 2);
        assert!(dal.get_venue("venue_x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bulk_load_skips_invalid_records() {
        let store = Arc::new(InMemoryStore::new());
        let dal = DataAccess::new(store.clone()).with_clock(Arc::new(FixedClock(today())));
        let mut bad = event("e_bad", "Undated", today(), "18:30");
        bad.date = "someday".into();
        let data = SeedData {
            venues: vec![venue("v1", "Hall"), venue("", "Nameless id")],
            events: vec![event("e1", "Ok", today(), "18:30"), bad],
            ..Default::default()
        };
        let report = dal.bulk_load(&data).await;
        assert_eq!(report.venues, 1);
        assert_eq!(report.events, 1);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.failed, 0);
        assert_eq!(report.loaded(), 2);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_bulk_load_counts_store_failures() {
        let store = Arc::new(InMemoryStore::new());
        let dal = DataAccess::new(store.clone());
        store.set_offline(true);
        let report = dal
            .bulk_load(&SeedData {
                companies: vec![company("c1", "CarMax", 1)],
                ..Default::default()
            })
            .await;
        assert_eq!(report.companies, 0);
        assert_eq!(report.failed, 1);
    }

    #[tokio::test]
    async fn test_clear_all() {
        let (store, dal) = seeded(calendar()).await;
        let removed = dal.clear_all().await.unwrap();
        assert_eq!(removed, 10);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_increment_registered() {
        let (_store, dal) = seeded(calendar()).await;
        assert_eq!(dal.increment_registered("e_early", 3).await.unwrap(), 3);
        assert_eq!(dal.increment_registered("e_early", 2).await.unwrap(), 5);
        let event = dal.get_event("e_early").await.unwrap().unwrap();
        assert_eq!(event.registered, 5);
        assert!(matches!(
            dal.increment_registered("nope", 1).await,
            Err(DataError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_not_lost() {
        let store = Arc::new(YieldingStore(InMemoryStore::new()));
        let dal = DataAccess::new(store.clone()).with_clock(Arc::new(FixedClock(today())));
        dal.put_event(&event("e1", "Rust Night", days_from_today(1), "18:30"))
            .await
            .unwrap();

        let (a, b) = tokio::join!(
            dal.increment_registered("e1", 1),
            dal.increment_registered("e1", 1)
        );
        let mut counts = vec![a.unwrap(), b.unwrap()];
        counts.sort();
        assert_eq!(counts, vec![1, 2]);
        assert_eq!(dal.get_event("e1").await.unwrap().unwrap().registered, 2);
    }

    #[tokio::test]
    async fn test_increment_registered_store_down() {
        let (store, dal) = seeded(calendar()).await;
        store.set_offline(true);
        assert!(matches!(
            dal.increment_registered("e_early", 1).await,
            Err(DataError::StoreUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_bare_date_and_timestamp_on_same_day() {
        let mut late = event("late", "Lightning Talks", today(), "19:00");
        late.date = today().format("%Y-%m-%d").to_string();
        let early = event("early", "Pizza and Setup", today(), "18:30");
        assert_eq!(early.date, format!("{}T18:30:00", today().format("%Y-%m-%d")));
        let (_store, dal) = seeded(SeedData {
            events: vec![late, early],
            ..Default::default()
        })
        .await;

        let upcoming = dal.get_upcoming_events(1).await.unwrap();
        let ids: Vec<_> = upcoming.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late"]);
        let next = dal.get_next_meetup_event(None).await.unwrap().unwrap();
        assert_eq!(next.id, "early");
    }

    #[tokio::test]
    async fn test_record_counts() {
        let (_store, dal) = seeded(calendar()).await;
        let counts = dal.record_counts().await.unwrap();
        assert_eq!(counts["venue"], 2);
        assert_eq!(counts["company"], 2);
        assert_eq!(counts["meetup"], 1);
        assert_eq!(counts["event"], 5);
    }
}
