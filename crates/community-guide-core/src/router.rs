//! Keyword-routed natural-language entry point.
//!
//! [`QueryRouter::natural_language_search`] runs a fixed sequence of
//! independent classification passes over the lowercased query. Every pass
//! whose keywords match contributes a labelled entry to the response's
//! `results` map, so one question can fire several passes:
//!
//! | Pass | Triggers | Label |
//! |------|----------|-------|
//! | next event | `next`/`upcoming`/`when` and `meetup`/`event` | `next_event` |
//! | technology | each matching technology keyword | `<tech>_events` |
//! | venue | each matching venue keyword | `<venue>_info` |
//! | companies | `company`/`companies`/`work`/`jobs` | `companies` |
//! | summary | `overview`/`summary`/`about`/`community` | `community_summary` |
//!
//! Matching is plain substring containment, so `"ai"` also fires inside
//! longer words. Labels replace spaces with underscores.
//!
//! Public operations never fail: store errors are logged and turn into empty
//! or absent results, and the response's `error` field records passes that
//! could not complete.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration};
use serde::{Deserialize, Serialize};

use crate::data_access::DataAccess;
use crate::error::DataError;
use crate::models::{
    sort_events, Company, EnrichedEvent, Event, MeetupGroup, MeetupWithEvents, Venue, VenueInfo,
};

const NEXT_TRIGGERS: &[&str] = &["next", "upcoming", "when"];
const EVENT_NOUNS: &[&str] = &["meetup", "event"];
const COMPANY_TRIGGERS: &[&str] = &["company", "companies", "work", "jobs"];
const SUMMARY_TRIGGERS: &[&str] = &["overview", "summary", "about", "community"];

const TOPIC_LIMIT: usize = 5;
const TOP_COMPANIES: usize = 5;
const VENUE_EVENT_LIMIT: usize = 5;
const VENUE_WINDOW_DAYS: u32 = 60;
const SUMMARY_WINDOW_DAYS: u32 = 30;
const NEXT_EVENT_WINDOW_DAYS: u32 = 90;
const SPEAKER_WINDOW_DAYS: u32 = 180;

/// Keyword tables consulted by the technology and venue passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterVocabulary {
    #[serde(default = "default_tech_keywords")]
    pub tech_keywords: Vec<String>,
    #[serde(default = "default_venue_keywords")]
    pub venue_keywords: Vec<String>,
}

fn default_tech_keywords() -> Vec<String> {
    [
        "python",
        "javascript",
        "java",
        "react",
        "aws",
        "cloud",
        "ai",
        "machine learning",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_venue_keywords() -> Vec<String> {
    ["startup virginia", "common house", "vcu"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for RouterVocabulary {
    fn default() -> Self {
        Self {
            tech_keywords: default_tech_keywords(),
            venue_keywords: default_venue_keywords(),
        }
    }
}

/// Headline counts in a [`CommunitySummary`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityOverview {
    pub total_venues: usize,
    pub total_companies: usize,
    pub total_meetup_groups: usize,
    /// Events in the next 30 days.
    pub total_upcoming_events: usize,
    pub total_community_members: u64,
    pub total_tech_employees: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommunitySummary {
    pub overview: CommunityOverview,
    /// Up to 10 most frequent tags on upcoming events.
    pub popular_technologies: Vec<String>,
    pub largest_meetups: Vec<MeetupGroup>,
    pub major_employers: Vec<Company>,
    pub upcoming_highlights: Vec<Event>,
}

/// One labelled entry in [`RouterResponse::results`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RouteResult {
    NextEvent(EnrichedEvent),
    Events(Vec<EnrichedEvent>),
    Venue(VenueInfo),
    Companies(Vec<Company>),
    Summary(Box<CommunitySummary>),
}

/// Accumulated answer to one natural-language query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouterResponse {
    pub query: String,
    pub results: BTreeMap<String, RouteResult>,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RouterResponse {
    fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            ..Default::default()
        }
    }

    fn record_failure(&mut self, pass: &str, err: &DataError) {
        tracing::error!(pass, "routing pass failed: {}", err);
        let message = format!("{}: {}", pass, err);
        self.error = Some(match self.error.take() {
            Some(previous) => format!("{}; {}", previous, message),
            None => message,
        });
    }
}

fn mentions_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

fn label(keyword: &str, suffix: &str) -> String {
    format!("{}_{}", keyword.replace(' ', "_"), suffix)
}

/// Log a failed operation and fall back to its empty value.
fn recover<T: Default>(operation: &str, result: Result<T, DataError>) -> T {
    result.unwrap_or_else(|e| {
        tracing::error!(operation, "{}", e);
        T::default()
    })
}

fn by_members_desc(meetups: &mut [MeetupGroup]) {
    meetups.sort_by(|a, b| b.member_count.cmp(&a.member_count));
}

fn by_employees_desc(companies: &mut [Company]) {
    companies.sort_by(|a, b| b.employee_count.cmp(&a.employee_count));
}

/// Tags ranked by descending frequency; ties keep first-seen order.
fn rank_tags(events: &[Event], limit: usize) -> Vec<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for tag in events.iter().flat_map(|e| e.tags.iter()) {
        match counts.iter_mut().find(|(t, _)| t == tag) {
            Some((_, n)) => *n += 1,
            None => counts.push((tag.clone(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().take(limit).map(|(t, _)| t).collect()
}

/// Natural-language query router over a [`DataAccess`] handle.
#[derive(Clone)]
pub struct QueryRouter {
    dal: DataAccess,
    vocab: RouterVocabulary,
}

impl QueryRouter {
    pub fn new(dal: DataAccess) -> Self {
        Self {
            dal,
            vocab: RouterVocabulary::default(),
        }
    }

    pub fn with_vocabulary(mut self, vocab: RouterVocabulary) -> Self {
        self.vocab = vocab;
        self
    }

    pub fn data_access(&self) -> &DataAccess {
        &self.dal
    }

    pub fn vocabulary(&self) -> &RouterVocabulary {
        &self.vocab
    }

    /// Classify `query` and gather everything it asks about.
    pub async fn natural_language_search(&self, query: &str) -> RouterResponse {
        let text = query.to_lowercase();
        let mut response = RouterResponse::new(query);

        if mentions_any(&text, NEXT_TRIGGERS) && mentions_any(&text, EVENT_NOUNS) {
            match self.next_event().await {
                Ok(Some(event)) => {
                    response
                        .results
                        .insert("next_event".to_string(), RouteResult::NextEvent(event));
                    response
                        .suggestions
                        .push("Check out other upcoming events".to_string());
                }
                Ok(None) => {}
                Err(e) => response.record_failure("next_event", &e),
            }
        }

        for tech in &self.vocab.tech_keywords {
            if !text.contains(tech.as_str()) {
                continue;
            }
            match self.topic_events(tech, TOPIC_LIMIT).await {
                Ok(events) if !events.is_empty() => {
                    response
                        .results
                        .insert(label(tech, "events"), RouteResult::Events(events));
                }
                Ok(_) => {}
                Err(e) => response.record_failure(&label(tech, "events"), &e),
            }
        }

        for venue in &self.vocab.venue_keywords {
            if !text.contains(venue.as_str()) {
                continue;
            }
            match self.venue_information(venue).await {
                Ok(Some(info)) => {
                    response
                        .results
                        .insert(label(venue, "info"), RouteResult::Venue(info));
                }
                Ok(None) => {}
                Err(e) => response.record_failure(&label(venue, "info"), &e),
            }
        }

        if mentions_any(&text, COMPANY_TRIGGERS) {
            let companies = match self.companies(None).await {
                Ok(mut companies) => {
                    companies.truncate(TOP_COMPANIES);
                    companies
                }
                Err(e) => {
                    response.record_failure("companies", &e);
                    Vec::new()
                }
            };
            response
                .results
                .insert("companies".to_string(), RouteResult::Companies(companies));
        }

        if mentions_any(&text, SUMMARY_TRIGGERS) {
            match self.community_summary().await {
                Ok(summary) => {
                    response.results.insert(
                        "community_summary".to_string(),
                        RouteResult::Summary(Box::new(summary)),
                    );
                }
                Err(e) => response.record_failure("community_summary", &e),
            }
        }

        tracing::info!(
            results = response.results.len(),
            "Processed natural language query: '{}'",
            query
        );
        response
    }

    // ============ Public operations ============

    /// Events mentioning `topic`, earliest first, at most `limit`, with
    /// venues resolved where they exist.
    pub async fn search_events_by_topic(&self, topic: &str, limit: usize) -> Vec<EnrichedEvent> {
        recover("search_events_by_topic", self.topic_events(topic, limit).await)
    }

    /// Venue whose name contains `name`, preferring an exact
    /// (case-insensitive) match, with up to 5 events in the next 60 days.
    pub async fn get_venue_information(&self, name: &str) -> Option<VenueInfo> {
        recover("get_venue_information", self.venue_information(name).await)
    }

    pub async fn get_tech_community_summary(&self) -> CommunitySummary {
        recover("get_tech_community_summary", self.community_summary().await)
    }

    /// Next event in the coming 90 days whose title, description, tags or
    /// meetup name mention any of `keywords`. An empty keyword list matches
    /// every event.
    pub async fn get_next_tech_meetup(&self, keywords: &[&str]) -> Option<EnrichedEvent> {
        let result = async {
            let lowered: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
            let upcoming = self.dal.get_upcoming_events(NEXT_EVENT_WINDOW_DAYS).await?;
            let found = upcoming.into_iter().find(|event| {
                if lowered.is_empty() {
                    return true;
                }
                let haystack = format!(
                    "{} {} {} {}",
                    event.title,
                    event.description,
                    event.tags.join(" "),
                    event.meetup_name.as_deref().unwrap_or("")
                )
                .to_lowercase();
                lowered.iter().any(|k| haystack.contains(k.as_str()))
            });
            match found {
                Some(event) => Ok::<_, DataError>(Some(self.enrich(event).await)),
                None => Ok(None),
            }
        }
        .await;
        recover("get_next_tech_meetup", result)
    }

    /// Meetup groups, optionally restricted to one category, largest first.
    pub async fn get_meetup_groups_by_category(&self, category: Option<&str>) -> Vec<MeetupGroup> {
        let result = async {
            let mut meetups = self.dal.get_all_meetups().await?;
            if let Some(category) = category {
                meetups.retain(|m| m.category == category);
            }
            by_members_desc(&mut meetups);
            Ok::<_, DataError>(meetups)
        }
        .await;
        recover("get_meetup_groups_by_category", result)
    }

    /// Companies, optionally restricted to industries containing `industry`
    /// (case-insensitive), largest first.
    pub async fn get_tech_companies_info(&self, industry: Option<&str>) -> Vec<Company> {
        recover("get_tech_companies_info", self.companies(industry).await)
    }

    /// Events from today through Sunday of the current week.
    pub async fn get_events_this_week(&self) -> Vec<EnrichedEvent> {
        let result = async {
            let today = self.dal.today();
            let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
            let sunday = monday + Duration::days(6);
            let events = self.dal.get_upcoming_events(7).await?;
            let mut enriched = Vec::new();
            for event in events {
                if event.day().is_some_and(|d| d >= monday && d <= sunday) {
                    enriched.push(self.enrich(event).await);
                }
            }
            Ok::<_, DataError>(enriched)
        }
        .await;
        recover("get_events_this_week", result)
    }

    /// The `limit` largest meetup groups, each with its first three events.
    pub async fn get_popular_meetups(&self, limit: usize) -> Vec<MeetupWithEvents> {
        let result = async {
            let mut meetups = self.dal.get_all_meetups().await?;
            by_members_desc(&mut meetups);
            meetups.truncate(limit);
            let mut popular = Vec::with_capacity(meetups.len());
            for meetup in meetups {
                let mut events = self.dal.get_events_by_meetup(&meetup.id).await?;
                events.truncate(3);
                popular.push(MeetupWithEvents {
                    meetup,
                    upcoming_events: events,
                });
            }
            Ok::<_, DataError>(popular)
        }
        .await;
        recover("get_popular_meetups", result)
    }

    /// Events in the next 180 days whose speaker contains `speaker`
    /// (case-insensitive).
    pub async fn find_events_by_speaker(&self, speaker: &str) -> Vec<Event> {
        let result = async {
            let needle = speaker.to_lowercase();
            let mut events = self.dal.get_upcoming_events(SPEAKER_WINDOW_DAYS).await?;
            events.retain(|e| {
                e.speaker
                    .as_deref()
                    .unwrap_or("")
                    .to_lowercase()
                    .contains(needle.as_str())
            });
            Ok::<_, DataError>(events)
        }
        .await;
        recover("find_events_by_speaker", result)
    }

    /// Events in the next `days_ahead` days at the venue matching `name`.
    pub async fn get_venue_events(&self, name: &str, days_ahead: u32) -> Vec<Event> {
        let result = async {
            let venue = match self.find_venue(name).await? {
                Some(venue) => venue,
                None => return Ok::<_, DataError>(Vec::new()),
            };
            let mut events = self.dal.get_upcoming_events(days_ahead).await?;
            events.retain(|e| e.venue_id == venue.id);
            Ok(events)
        }
        .await;
        recover("get_venue_events", result)
    }

    // ============ Fallible building blocks ============

    /// Resolve the event's venue; a missing or unreadable venue leaves the
    /// event unenriched.
    async fn enrich(&self, event: Event) -> EnrichedEvent {
        if event.venue_id.is_empty() {
            return event.into();
        }
        let venue_details = match self.dal.get_venue(&event.venue_id).await {
            Ok(venue) => venue,
            Err(e) => {
                tracing::warn!(venue_id = %event.venue_id, "venue enrichment failed: {}", e);
                None
            }
        };
        EnrichedEvent {
            event,
            venue_details,
        }
    }

    async fn next_event(&self) -> Result<Option<EnrichedEvent>, DataError> {
        match self.dal.get_next_meetup_event(None).await? {
            Some(event) => Ok(Some(self.enrich(event).await)),
            None => Ok(None),
        }
    }

    async fn topic_events(&self, topic: &str, limit: usize) -> Result<Vec<EnrichedEvent>, DataError> {
        let mut events = self.dal.search_events(topic).await?;
        sort_events(&mut events);
        events.truncate(limit);
        let mut enriched = Vec::with_capacity(events.len());
        for event in events {
            enriched.push(self.enrich(event).await);
        }
        tracing::info!("Found {} events for topic '{}'", enriched.len(), topic);
        Ok(enriched)
    }

    async fn find_venue(&self, name: &str) -> Result<Option<Venue>, DataError> {
        let needle = name.to_lowercase();
        let mut matches: Vec<_> = self
            .dal
            .get_all_venues()
            .await?
            .into_iter()
            .filter(|v| v.name.to_lowercase().contains(needle.as_str()))
            .collect();
        if matches.is_empty() {
            return Ok(None);
        }
        let exact = matches.iter().position(|v| v.name.to_lowercase() == needle);
        Ok(Some(matches.swap_remove(exact.unwrap_or(0))))
    }

    async fn venue_information(&self, name: &str) -> Result<Option<VenueInfo>, DataError> {
        let venue = match self.find_venue(name).await? {
            Some(venue) => venue,
            None => return Ok(None),
        };
        let mut upcoming = self.dal.get_upcoming_events(VENUE_WINDOW_DAYS).await?;
        upcoming.retain(|e| e.venue_id == venue.id);
        upcoming.truncate(VENUE_EVENT_LIMIT);
        tracing::info!("Found venue: {}", venue.name);
        Ok(Some(VenueInfo {
            venue,
            upcoming_events: upcoming,
        }))
    }

    async fn companies(&self, industry: Option<&str>) -> Result<Vec<Company>, DataError> {
        let mut companies = self.dal.get_all_companies().await?;
        if let Some(industry) = industry {
            let needle = industry.to_lowercase();
            companies.retain(|c| c.industry.to_lowercase().contains(needle.as_str()));
        }
        by_employees_desc(&mut companies);
        Ok(companies)
    }

    async fn community_summary(&self) -> Result<CommunitySummary, DataError> {
        let venues = self.dal.get_all_venues().await?;
        let mut companies = self.dal.get_all_companies().await?;
        let mut meetups = self.dal.get_all_meetups().await?;
        let upcoming = self.dal.get_upcoming_events(SUMMARY_WINDOW_DAYS).await?;

        let overview = CommunityOverview {
            total_venues: venues.len(),
            total_companies: companies.len(),
            total_meetup_groups: meetups.len(),
            total_upcoming_events: upcoming.len(),
            total_community_members: meetups.iter().map(|m| m.member_count).sum(),
            total_tech_employees: companies.iter().map(|c| c.employee_count).sum(),
        };
        let popular_technologies = rank_tags(&upcoming, 10);

        by_members_desc(&mut meetups);
        meetups.truncate(3);
        by_employees_desc(&mut companies);
        companies.truncate(3);

        tracing::info!("Generated tech community summary");
        Ok(CommunitySummary {
            overview,
            popular_technologies,
            largest_meetups: meetups,
            major_employers: companies,
            upcoming_highlights: upcoming.into_iter().take(5).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_access::SeedData;
    use crate::error::FailureMode;
    use crate::test_support::*;
    use chrono::NaiveDate;

    fn router(dal: DataAccess) -> QueryRouter {
        QueryRouter::new(dal)
    }

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn tagged(id: &str, title: &str, day: NaiveDate, tags: &[&str]) -> Event {
        let mut e = event(id, title, day, "18:30");
        e.tags = tags.iter().map(|t| t.to_string()).collect();
        e
    }

    #[tokio::test]
    async fn test_next_tech_meetup_question() {
        let mut serverless = tagged("e1", "Serverless Basics", jan(10), &["AWS"]);
        serverless.venue_id = "venue_startup_va".into();
        let (_store, dal) = seeded(SeedData {
            venues: vec![venue("venue_startup_va", "Startup Virginia")],
            events: vec![serverless],
            ..Default::default()
        })
        .await;

        let response = router(dal)
            .natural_language_search("What's the next tech meetup in Richmond?")
            .await;
        match &response.results["next_event"] {
            RouteResult::NextEvent(e) => {
                assert_eq!(e.event.title, "Serverless Basics");
                assert_eq!(e.venue_details.as_ref().unwrap().name, "Startup Virginia");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(response.suggestions, vec!["Check out other upcoming events"]);
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_next_event_serializes_flat() {
        let (_store, dal) = seeded(SeedData {
            events: vec![tagged("e1", "Serverless Basics", jan(10), &[])],
            ..Default::default()
        })
        .await;
        let response = router(dal).natural_language_search("when is the next event").await;
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["results"]["next_event"]["title"], "Serverless Basics");
        assert!(json["results"]["next_event"].get("venue_details").is_none());
        assert!(json.get("error").is_none());
    }

    #[tokio::test]
    async fn test_exact_venue_name_wins() {
        let (_store, dal) = seeded(SeedData {
            venues: vec![
                venue("venue_north", "Startup Virginia North"),
                venue("venue_startup_va", "Startup Virginia"),
            ],
            ..Default::default()
        })
        .await;
        let response = router(dal)
            .natural_language_search("Tell me about Startup Virginia")
            .await;
        match &response.results["startup_virginia_info"] {
            RouteResult::Venue(info) => assert_eq!(info.venue.name, "Startup Virginia"),
            other => panic!("unexpected result: {:?}", other),
        }
        // "about" also fires the summary pass.
        assert!(response.results.contains_key("community_summary"));
    }

    #[tokio::test]
    async fn test_venue_info_lists_its_upcoming_events() {
        let mut events = Vec::new();
        for i in 0..7 {
            let mut e = event(&format!("e{}", i), "Hack Night", days_from_today(i), "18:30");
            e.venue_id = "venue_ch".into();
            events.push(e);
        }
        let mut elsewhere = event("other", "Elsewhere", days_from_today(1), "18:30");
        elsewhere.venue_id = "venue_vcu".into();
        events.push(elsewhere);
        let (_store, dal) = seeded(SeedData {
            venues: vec![venue("venue_ch", "Common House")],
            events,
            ..Default::default()
        })
        .await;

        let info = router(dal).get_venue_information("common house").await.unwrap();
        assert_eq!(info.upcoming_events.len(), 5);
        assert!(info.upcoming_events.iter().all(|e| e.venue_id == "venue_ch"));
    }

    #[tokio::test]
    async fn test_unknown_venue_is_absent() {
        let (_store, dal) = seeded(SeedData::default()).await;
        assert!(router(dal).get_venue_information("Nowhere").await.is_none());
    }

    #[tokio::test]
    async fn test_summary_members_and_largest_meetup() {
        let (_store, dal) = seeded(SeedData {
            meetups: vec![
                meetup("m1", "RVA.js", 300),
                meetup("m2", "Richmond Python", 450),
                meetup("m3", "Rust Richmond", 100),
            ],
            companies: vec![company("c1", "Small", 10), company("c2", "Big", 5000)],
            ..Default::default()
        })
        .await;
        let summary = router(dal).get_tech_community_summary().await;
        assert_eq!(summary.overview.total_community_members, 850);
        assert_eq!(summary.overview.total_tech_employees, 5010);
        assert_eq!(summary.overview.total_meetup_groups, 3);
        assert_eq!(summary.largest_meetups[0].member_count, 450);
        assert_eq!(summary.largest_meetups.len(), 3);
        assert_eq!(summary.major_employers[0].name, "Big");
    }

    #[tokio::test]
    async fn test_popular_technologies_ranked_with_stable_ties() {
        let (_store, dal) = seeded(SeedData {
            events: vec![
                tagged("e1", "One", days_from_today(1), &["Rust", "AWS"]),
                tagged("e2", "Two", days_from_today(2), &["AWS", "Python"]),
                tagged("e3", "Three", days_from_today(3), &["Python", "Go"]),
                tagged("e4", "Later", days_from_today(40), &["Go", "Go"]),
            ],
            ..Default::default()
        })
        .await;
        let summary = router(dal).get_tech_community_summary().await;
        assert_eq!(summary.overview.total_upcoming_events, 3);
        assert_eq!(summary.popular_technologies, vec!["AWS", "Python", "Rust", "Go"]);
        assert_eq!(summary.upcoming_highlights.len(), 3);
    }

    #[tokio::test]
    async fn test_companies_pass_survives_store_failure() {
        let (store, dal) = seeded(SeedData {
            companies: vec![company("c1", "CarMax", 25000)],
            ..Default::default()
        })
        .await;
        store.set_offline(true);
        let response = router(dal).natural_language_search("which companies are hiring").await;
        match &response.results["companies"] {
            RouteResult::Companies(list) => assert!(list.is_empty()),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_strict_mode_failure_recorded_not_raised() {
        let (store, dal) = seeded(SeedData {
            companies: vec![company("c1", "CarMax", 25000)],
            ..Default::default()
        })
        .await;
        let dal = dal.with_failure_mode(FailureMode::Strict);
        store.set_offline(true);
        let response = router(dal).natural_language_search("jobs").await;
        match &response.results["companies"] {
            RouteResult::Companies(list) => assert!(list.is_empty()),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(response.error.unwrap().contains("companies"));
    }

    #[tokio::test]
    async fn test_top_five_companies_by_employees() {
        let companies = (1..=7)
            .map(|i| company(&format!("c{}", i), &format!("Co {}", i), i * 100))
            .collect();
        let (_store, dal) = seeded(SeedData {
            companies,
            ..Default::default()
        })
        .await;
        let response = router(dal).natural_language_search("where can I work").await;
        match &response.results["companies"] {
            RouteResult::Companies(list) => {
                let counts: Vec<_> = list.iter().map(|c| c.employee_count).collect();
                assert_eq!(counts, vec![700, 600, 500, 400, 300]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_tech_passes_are_additive() {
        let (_store, dal) = seeded(SeedData {
            events: vec![
                tagged("e1", "Intro to Python", days_from_today(1), &["Python"]),
                tagged("e2", "Lambda Deep Dive", days_from_today(2), &["AWS", "Cloud"]),
            ],
            ..Default::default()
        })
        .await;
        let response = router(dal)
            .natural_language_search("python and aws talks")
            .await;
        assert!(response.results.contains_key("python_events"));
        assert!(response.results.contains_key("aws_events"));
        // No matching events means no entry, not an empty one.
        assert!(!response.results.contains_key("java_events"));
        assert!(!response.results.contains_key("next_event"));
    }

    #[tokio::test]
    async fn test_multi_word_keyword_label() {
        let (_store, dal) = seeded(SeedData {
            events: vec![tagged("e1", "ML Study Group", days_from_today(1), &["Machine Learning"])],
            ..Default::default()
        })
        .await;
        let response = router(dal)
            .natural_language_search("machine learning groups")
            .await;
        assert!(response.results.contains_key("machine_learning_events"));
    }

    #[tokio::test]
    async fn test_custom_vocabulary() {
        let (_store, dal) = seeded(SeedData {
            events: vec![tagged("e1", "Rust Night", days_from_today(1), &["Rust"])],
            ..Default::default()
        })
        .await;
        let vocab = RouterVocabulary {
            tech_keywords: vec!["rust".into()],
            venue_keywords: Vec::new(),
        };
        let response = router(dal)
            .with_vocabulary(vocab)
            .natural_language_search("any rust or python events?")
            .await;
        assert!(response.results.contains_key("rust_events"));
        assert!(!response.results.contains_key("python_events"));
    }

    #[tokio::test]
    async fn test_topic_search_limit_and_match() {
        let events = (0..8)
            .map(|i| tagged(&format!("e{}", i), "Cloud Night", days_from_today(i), &[]))
            .collect();
        let (_store, dal) = seeded(SeedData {
            events,
            ..Default::default()
        })
        .await;
        let found = router(dal).search_events_by_topic("CLOUD", 5).await;
        assert_eq!(found.len(), 5);
        assert!(found
            .iter()
            .all(|e| e.event.title.to_lowercase().contains("cloud")));
        assert_eq!(found[0].event.id, "e0");
    }

    #[tokio::test]
    async fn test_missing_venue_leaves_event_unenriched() {
        let mut e = tagged("e1", "Cloud Night", days_from_today(1), &[]);
        e.venue_id = "venue_gone".into();
        let (_store, dal) = seeded(SeedData {
            events: vec![e],
            ..Default::default()
        })
        .await;
        let found = router(dal).search_events_by_topic("cloud", 5).await;
        assert_eq!(found.len(), 1);
        assert!(found[0].venue_details.is_none());
    }

    #[tokio::test]
    async fn test_no_match_gives_empty_results() {
        let (_store, dal) = seeded(SeedData::default()).await;
        let response = router(dal).natural_language_search("hello there").await;
        assert!(response.results.is_empty());
        assert!(response.suggestions.is_empty());
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_next_tech_meetup_keywords() {
        let mut ml = tagged("e2", "Model Serving", days_from_today(4), &[]);
        ml.meetup_name = Some("RVA Machine Learning".into());
        let (_store, dal) = seeded(SeedData {
            events: vec![tagged("e1", "JS Night", days_from_today(1), &["JavaScript"]), ml],
            ..Default::default()
        })
        .await;
        let r = router(dal);
        assert_eq!(r.get_next_tech_meetup(&[]).await.unwrap().event.id, "e1");
        assert_eq!(
            r.get_next_tech_meetup(&["machine learning"]).await.unwrap().event.id,
            "e2"
        );
        assert!(r.get_next_tech_meetup(&["cobol"]).await.is_none());
    }

    #[tokio::test]
    async fn test_meetups_by_category() {
        let mut cloud = meetup("m2", "Cloud Wranglers", 500);
        cloud.category = "cloud_computing".into();
        let (_store, dal) = seeded(SeedData {
            meetups: vec![meetup("m1", "Python", 100), cloud, meetup("m3", "JS", 200)],
            ..Default::default()
        })
        .await;
        let r = router(dal);
        let all = r.get_meetup_groups_by_category(None).await;
        let names: Vec<_> = all.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Cloud Wranglers", "JS", "Python"]);
        let langs = r.get_meetup_groups_by_category(Some("programming_language")).await;
        assert_eq!(langs.len(), 2);
    }

    #[tokio::test]
    async fn test_companies_by_industry() {
        let mut bank = company("c2", "Capital One", 12000);
        bank.industry = "Banking".into();
        let (_store, dal) = seeded(SeedData {
            companies: vec![company("c1", "Fintech Co", 50), bank],
            ..Default::default()
        })
        .await;
        let r = router(dal);
        assert_eq!(r.get_tech_companies_info(Some("bank")).await.len(), 1);
        assert_eq!(r.get_tech_companies_info(None).await[0].name, "Capital One");
    }

    #[tokio::test]
    async fn test_events_this_week_stop_at_sunday() {
        // 2025-01-05 is a Sunday, so only today's events are in this week.
        let (_store, dal) = seeded(SeedData {
            events: vec![
                tagged("today", "Sunday Session", today(), &[]),
                tagged("monday", "Monday Session", days_from_today(1), &[]),
            ],
            ..Default::default()
        })
        .await;
        let week = router(dal).get_events_this_week().await;
        let ids: Vec<_> = week.iter().map(|e| e.event.id.as_str()).collect();
        assert_eq!(ids, vec!["today"]);
    }

    #[tokio::test]
    async fn test_popular_meetups_with_events() {
        let mut events = Vec::new();
        for i in 0..4 {
            let mut e = event(&format!("e{}", i), "Py Night", days_from_today(i + 1), "18:30");
            e.meetup_id = "m_py".into();
            events.push(e);
        }
        let (_store, dal) = seeded(SeedData {
            meetups: vec![meetup("m_js", "JS", 100), meetup("m_py", "Python", 300)],
            events,
            ..Default::default()
        })
        .await;
        let popular = router(dal).get_popular_meetups(1).await;
        assert_eq!(popular.len(), 1);
        assert_eq!(popular[0].meetup.id, "m_py");
        assert_eq!(popular[0].upcoming_events.len(), 3);
        assert_eq!(popular[0].upcoming_events[0].id, "e0");
    }

    #[tokio::test]
    async fn test_find_events_by_speaker() {
        let mut talk = event("e1", "Rust in Production", days_from_today(10), "18:30");
        talk.speaker = Some("Dr. Sarah Chen".into());
        let (_store, dal) = seeded(SeedData {
            events: vec![talk, event("e2", "Open Hack", days_from_today(11), "18:30")],
            ..Default::default()
        })
        .await;
        let found = router(dal).find_events_by_speaker("sarah").await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "e1");
    }

    #[tokio::test]
    async fn test_venue_events_window() {
        let mut near = event("near", "Near", days_from_today(3), "18:30");
        near.venue_id = "venue_vcu".into();
        let mut far = event("far", "Far", days_from_today(45), "18:30");
        far.venue_id = "venue_vcu".into();
        let (_store, dal) = seeded(SeedData {
            venues: vec![venue("venue_vcu", "VCU Engineering")],
            events: vec![near, far],
            ..Default::default()
        })
        .await;
        let r = router(dal);
        assert_eq!(r.get_venue_events("vcu", 30).await.len(), 1);
        assert_eq!(r.get_venue_events("vcu", 60).await.len(), 2);
        assert!(r.get_venue_events("nowhere", 60).await.is_empty());
    }
}
