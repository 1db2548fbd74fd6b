//! Record builders shared by the unit tests.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::clock::FixedClock;
use crate::data_access::{DataAccess, SeedData};
use crate::models::{Company, Contact, Event, MeetupGroup, Venue};
use crate::store::memory::InMemoryStore;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 5).unwrap()
}

pub fn days_from_today(days: i64) -> NaiveDate {
    today() + chrono::Duration::days(days)
}

pub fn venue(id: &str, name: &str) -> Venue {
    Venue {
        id: id.to_string(),
        name: name.to_string(),
        address: "1 Main St, Richmond, VA".to_string(),
        venue_type: Some("event_space".to_string()),
        capacity: 100,
        amenities: vec!["wifi".to_string()],
        contact: Contact::default(),
        description: None,
    }
}

pub fn company(id: &str, name: &str, employees: u64) -> Company {
    Company {
        id: id.to_string(),
        name: name.to_string(),
        industry: "fintech".to_string(),
        size: None,
        employee_count: employees,
        headquarters: None,
        tech_stack: vec!["Python".to_string()],
        description: None,
        founded: None,
        careers_url: None,
        website: None,
        notable_projects: Vec::new(),
    }
}

pub fn meetup(id: &str, name: &str, members: u64) -> MeetupGroup {
    MeetupGroup {
        id: id.to_string(),
        name: name.to_string(),
        category: "programming_language".to_string(),
        description: None,
        organizer: None,
        organizer_company: None,
        member_count: members,
        founded: None,
        meeting_frequency: None,
        typical_venue: None,
        focus_areas: Vec::new(),
        social_links: Default::default(),
    }
}

pub fn event(id: &str, title: &str, day: NaiveDate, start: &str) -> Event {
    Event {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        date: format!("{}T{}:00", day.format("%Y-%m-%d"), start),
        start_time: start.to_string(),
        end_time: None,
        venue_id: String::new(),
        venue_name: None,
        venue_address: None,
        meetup_id: String::new(),
        meetup_name: None,
        speaker: None,
        speaker_bio: None,
        tags: Vec::new(),
        capacity: 100,
        registered: 0,
        status: Some("upcoming".to_string()),
        requirements: Vec::new(),
        cost: None,
        rsvp_url: None,
        parking_info: None,
    }
}

/// A store seeded with `data` and a data access layer pinned to [`today`].
pub async fn seeded(data: SeedData) -> (Arc<InMemoryStore>, DataAccess) {
    let store = Arc::new(InMemoryStore::new());
    let dal = DataAccess::new(store.clone()).with_clock(Arc::new(FixedClock(today())));
    let report = dal.bulk_load(&data).await;
    assert_eq!(report.failed, 0, "fixture load failed: {:?}", report);
    (store, dal)
}
