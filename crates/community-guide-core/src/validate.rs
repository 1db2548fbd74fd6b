//! Data-shape validation shared by the loader and the entry points.

use crate::error::DataError;
use crate::models::{parse_event_date, Company, Event, MeetupGroup, Venue};

/// Longest accepted natural-language query, in characters.
pub const MAX_QUERY_CHARS: usize = 1000;

/// Reject empty, whitespace-only and over-long queries. Returns the trimmed
/// query.
pub fn validate_query(query: &str) -> Result<&str, DataError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(DataError::BadInput("query must not be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_QUERY_CHARS {
        return Err(DataError::BadInput(format!(
            "query must be at most {} characters",
            MAX_QUERY_CHARS
        )));
    }
    Ok(trimmed)
}

fn require(kind: &str, field: &str, value: &str) -> Result<(), DataError> {
    if value.trim().is_empty() {
        return Err(DataError::BadInput(format!("{} {} must not be empty", kind, field)));
    }
    Ok(())
}

pub fn validate_venue(venue: &Venue) -> Result<(), DataError> {
    require("venue", "id", &venue.id)?;
    require("venue", "name", &venue.name)
}

pub fn validate_company(company: &Company) -> Result<(), DataError> {
    require("company", "id", &company.id)?;
    require("company", "name", &company.name)
}

pub fn validate_meetup(meetup: &MeetupGroup) -> Result<(), DataError> {
    require("meetup", "id", &meetup.id)?;
    require("meetup", "name", &meetup.name)
}

pub fn validate_event(event: &Event) -> Result<(), DataError> {
    require("event", "id", &event.id)?;
    require("event", "title", &event.title)?;
    require("event", "start_time", &event.start_time)?;
    if parse_event_date(&event.date).is_none() {
        return Err(DataError::BadInput(format!(
            "event {} has a date that is not ISO-8601: {:?}",
            event.id, event.date
        )));
    }
    Ok(())
}
