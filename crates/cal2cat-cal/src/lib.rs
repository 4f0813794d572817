//! Calendar loading for cal2cat.
//!
//! Reads iCalendar documents from local paths or URLs, decodes their events
//! and returns them as a single chronologically ordered [`EventArena`].

mod decode;
mod source;

use std::time::Duration;

use cal2cat_core::{Event, EventArena};
use rayon::prelude::*;
use thiserror::Error;

pub use decode::decode;
pub use source::Source;

/// Default request timeout for remote calendars.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Calendar loading errors.
#[derive(Debug, Error)]
pub enum CalendarError {
    /// The location is neither a readable path nor a supported URL.
    #[error("invalid calendar location {location}: {reason}")]
    InvalidLocation {
        location: String,
        reason: &'static str,
    },
    /// Failed to read a local calendar file.
    #[error("cannot read calendar from {location}: {source}")]
    Read {
        location: String,
        #[source]
        source: std::io::Error,
    },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("cannot fetch calendar from {location}: {source}")]
    Fetch {
        location: String,
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a non-success status.
    #[error("cannot fetch calendar from {location}: status {status}")]
    Status {
        location: String,
        status: reqwest::StatusCode,
    },
    /// The document is not valid iCalendar.
    #[error("cannot parse calendar from {location}: {source}")]
    Parse {
        location: String,
        #[source]
        source: ical::parser::ParserError,
    },
    /// An event lacks a required property.
    #[error("event in {location} has no {property}")]
    MissingProperty {
        location: String,
        property: &'static str,
    },
    /// A date or date-time value could not be decoded.
    #[error("invalid date-time {value:?} in {location}")]
    InvalidDateTime { location: String, value: String },
    /// A `DURATION` value could not be decoded.
    #[error("invalid duration {value:?} in {location}")]
    InvalidDuration { location: String, value: String },
    /// Failed to start the async runtime.
    #[error("failed to initialize async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// A fetch task panicked or was cancelled.
    #[error("calendar fetch task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Loads all calendars and returns their events ordered by start time.
///
/// Sources are fetched concurrently and decoded in parallel; the stable sort
/// runs only after every source has been merged, so the result does not
/// depend on which source finished first.
pub fn load(locations: &[String]) -> Result<EventArena, CalendarError> {
    let documents = source::fetch_all(locations)?;

    let decoded = documents
        .par_iter()
        .map(|(location, body)| decode(location, body))
        .collect::<Result<Vec<_>, _>>()?;

    let events: Vec<Event> = decoded.into_iter().flatten().map(Event::from).collect();
    tracing::debug!(
        calendars = locations.len(),
        events = events.len(),
        "loaded calendars"
    );

    Ok(EventArena::from_unsorted(events))
}
