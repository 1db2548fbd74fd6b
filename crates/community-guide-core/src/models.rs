//! Record models for the community table.
//!
//! Four record kinds share one partitioned table. Each implements [`Record`],
//! which knows the kind's composite key, its secondary-index keys and how to
//! encode itself as a store [`Item`].

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::item::{
    self, AttributeValue, Item, PrimaryKey, CREATED_AT, ENTITY_TYPE, GSI1PK, GSI1SK, PK, SK,
    UPDATED_AT,
};

/// The four record kinds stored in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Venue,
    Company,
    Meetup,
    Event,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Venue,
        EntityKind::Company,
        EntityKind::Meetup,
        EntityKind::Event,
    ];

    /// Prefix used in primary keys and kind-level index partitions.
    pub fn key_prefix(self) -> &'static str {
        match self {
            EntityKind::Venue => "VENUE",
            EntityKind::Company => "COMPANY",
            EntityKind::Meetup => "MEETUP",
            EntityKind::Event => "EVENT",
        }
    }

    /// Value of the `EntityType` attribute.
    pub fn entity_type(self) -> &'static str {
        match self {
            EntityKind::Venue => "venue",
            EntityKind::Company => "company",
            EntityKind::Meetup => "meetup",
            EntityKind::Event => "event",
        }
    }

    pub fn primary_key(self, id: &str) -> PrimaryKey {
        PrimaryKey::single(format!("{}#{}", self.key_prefix(), id))
    }
}

/// Index partition holding every event on `date`.
pub fn event_day_partition(date: NaiveDate) -> String {
    format!("EVENT#{}", date.format("%Y-%m-%d"))
}

/// Parse an event `date` attribute down to its calendar day.
///
/// Accepts RFC 3339 timestamps, naive ISO-8601 timestamps (with or without
/// fractional seconds) and bare `YYYY-MM-DD` dates.
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// A record kind that can be stored in the community table.
pub trait Record: Serialize + DeserializeOwned {
    const KIND: EntityKind;

    fn id(&self) -> &str;

    /// Secondary-index sort key (`GSI1SK`).
    fn index_sort_key(&self) -> String;

    /// Secondary-index partition key (`GSI1PK`). Defaults to the kind name.
    fn index_partition_key(&self) -> String {
        Self::KIND.key_prefix().to_string()
    }

    fn primary_key(&self) -> PrimaryKey {
        Self::KIND.primary_key(self.id())
    }

    /// Encode as a store item, adding key and bookkeeping attributes.
    fn to_item(&self, now: DateTime<Utc>) -> Result<Item> {
        let value = serde_json::to_value(self)?;
        let mut item = item::to_item(&value)?;
        let key = self.primary_key();
        let ts = now.format("%Y-%m-%dT%H:%M:%S%.6f").to_string();
        item.insert(PK.to_string(), AttributeValue::S(key.pk));
        item.insert(SK.to_string(), AttributeValue::S(key.sk));
        item.insert(GSI1PK.to_string(), AttributeValue::S(self.index_partition_key()));
        item.insert(GSI1SK.to_string(), AttributeValue::S(self.index_sort_key()));
        item.insert(
            ENTITY_TYPE.to_string(),
            AttributeValue::S(Self::KIND.entity_type().to_string()),
        );
        item.insert(CREATED_AT.to_string(), AttributeValue::S(ts.clone()));
        item.insert(UPDATED_AT.to_string(), AttributeValue::S(ts));
        Ok(item)
    }

    /// Decode from a store item. Key attributes are ignored.
    fn from_item(item: &Item) -> Result<Self> {
        let value = item::from_item(item)?;
        serde_json::from_value(value)
            .with_context(|| format!("malformed {} item", Self::KIND.entity_type()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// A place where events are hosted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub venue_type: Option<String>,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub contact: Contact,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Record for Venue {
    const KIND: EntityKind = EntityKind::Venue;

    fn id(&self) -> &str {
        &self.id
    }

    fn index_sort_key(&self) -> String {
        self.name.clone()
    }
}

/// A local employer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default)]
    pub employee_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headquarters: Option<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub founded: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub careers_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notable_projects: Vec<String>,
}

impl Record for Company {
    const KIND: EntityKind = EntityKind::Company;

    fn id(&self) -> &str {
        &self.id
    }

    fn index_sort_key(&self) -> String {
        self.name.clone()
    }
}

/// A recurring meetup group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetupGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer_company: Option<String>,
    #[serde(default)]
    pub member_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub founded: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_frequency: Option<String>,
    /// Venue id; resolved by lookup only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typical_venue: Option<String>,
    #[serde(default)]
    pub focus_areas: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub social_links: BTreeMap<String, String>,
}

impl Record for MeetupGroup {
    const KIND: EntityKind = EntityKind::Meetup;

    fn id(&self) -> &str {
        &self.id
    }

    fn index_sort_key(&self) -> String {
        self.name.clone()
    }
}

/// A scheduled event. `registered` is the only attribute that changes after
/// seeding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// ISO-8601 timestamp.
    pub date: String,
    pub start_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default)]
    pub venue_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_address: Option<String>,
    #[serde(default)]
    pub meetup_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meetup_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_bio: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub registered: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsvp_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parking_info: Option<String>,
}

impl Event {
    /// Calendar day of the event, if `date` parses.
    pub fn day(&self) -> Option<NaiveDate> {
        parse_event_date(&self.date)
    }
}

impl Record for Event {
    const KIND: EntityKind = EntityKind::Event;

    fn id(&self) -> &str {
        &self.id
    }

    fn index_sort_key(&self) -> String {
        self.start_time.clone()
    }

    fn index_partition_key(&self) -> String {
        match self.day() {
            Some(day) => event_day_partition(day),
            None => format!("EVENT#{}", self.date.chars().take(10).collect::<String>()),
        }
    }
}

/// Sort events ascending by calendar day, then `start_time`. Bare dates and
/// full timestamps on the same day compare equal on the day. Events whose
/// date does not parse go last, in their original order.
pub fn sort_events(events: &mut [Event]) {
    events.sort_by_cached_key(|e| {
        let day = e.day();
        (day.is_none(), day, e.start_time.clone())
    });
}

/// An event with its venue resolved, when the venue exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedEvent {
    #[serde(flatten)]
    pub event: Event,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_details: Option<Venue>,
}

impl From<Event> for EnrichedEvent {
    fn from(event: Event) -> Self {
        Self {
            event,
            venue_details: None,
        }
    }
}

/// A venue together with its next events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueInfo {
    #[serde(flatten)]
    pub venue: Venue,
    pub upcoming_events: Vec<Event>,
}

/// A meetup group together with its next events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetupWithEvents {
    #[serde(flatten)]
    pub meetup: MeetupGroup,
    pub upcoming_events: Vec<Event>,
}
