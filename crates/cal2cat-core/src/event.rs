//! Calendar events and the arena that gives them identity.
//!
//! Two events with equal fields are still distinct bookings, so identity is
//! carried by the [`EventId`] assigned when an event enters an [`EventArena`],
//! never by comparing start, end and summary.

use std::ops::Deref;

use chrono::{DateTime, Duration, Utc};

/// An event decoded from an iCalendar source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalEvent {
    /// When the event starts.
    pub start: DateTime<Utc>,
    /// When the event ends.
    pub end: DateTime<Utc>,
    /// The `SUMMARY` property, empty if absent.
    pub summary: String,
    /// The `UID` property, if present.
    pub uid: Option<String>,
    /// The `LOCATION` property, if present.
    pub location: Option<String>,
    /// The calendar location (path or URL) the event was loaded from.
    pub source: String,
}

/// An event with the minimal set of properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleEvent {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    summary: String,
}

impl SimpleEvent {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, summary: impl Into<String>) -> Self {
        Self {
            start,
            end,
            summary: summary.into(),
        }
    }
}

/// Any event the pipeline can process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Calendar(CalEvent),
    Simple(SimpleEvent),
}

impl Event {
    pub const fn start_time(&self) -> DateTime<Utc> {
        match self {
            Self::Calendar(e) => e.start,
            Self::Simple(e) => e.start,
        }
    }

    pub const fn end_time(&self) -> DateTime<Utc> {
        match self {
            Self::Calendar(e) => e.end,
            Self::Simple(e) => e.end,
        }
    }

    /// Time between start and end. Never stored.
    pub fn duration(&self) -> Duration {
        self.end_time() - self.start_time()
    }

    pub fn summary(&self) -> &str {
        match self {
            Self::Calendar(e) => &e.summary,
            Self::Simple(e) => &e.summary,
        }
    }
}

impl From<CalEvent> for Event {
    fn from(e: CalEvent) -> Self {
        Self::Calendar(e)
    }
}

impl From<SimpleEvent> for Event {
    fn from(e: SimpleEvent) -> Self {
        Self::Simple(e)
    }
}

/// Stable identity of an event within its [`EventArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(usize);

impl EventId {
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A borrowed event together with its identity.
///
/// Equality compares identity only.
#[derive(Debug, Clone, Copy)]
pub struct EventRef<'a> {
    id: EventId,
    event: &'a Event,
}

impl<'a> EventRef<'a> {
    pub const fn id(self) -> EventId {
        self.id
    }

    pub const fn event(self) -> &'a Event {
        self.event
    }
}

impl Deref for EventRef<'_> {
    type Target = Event;

    fn deref(&self) -> &Event {
        self.event
    }
}

impl PartialEq for EventRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventRef<'_> {}

/// Owns every event of a run. Events are never mutated once pushed.
#[derive(Debug, Clone, Default)]
pub struct EventArena {
    events: Vec<Event>,
}

impl EventArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an arena in chronological order.
    ///
    /// The sort is stable: events starting at the same time keep their
    /// input order.
    pub fn from_unsorted(events: impl IntoIterator<Item = Event>) -> Self {
        let mut events: Vec<Event> = events.into_iter().collect();
        events.sort_by_key(Event::start_time);
        Self { events }
    }

    pub fn push(&mut self, event: impl Into<Event>) -> EventId {
        let id = EventId(self.events.len());
        self.events.push(event.into());
        id
    }

    pub fn get(&self, id: EventId) -> Option<EventRef<'_>> {
        self.events.get(id.0).map(|event| EventRef { id, event })
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// All events in arena order.
    pub fn events(&self) -> crate::Events<'_> {
        self.events
            .iter()
            .enumerate()
            .map(|(i, event)| EventRef {
                id: EventId(i),
                event,
            })
            .collect()
    }
}
