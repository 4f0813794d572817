//! Ordered event sequences and the predicates used to narrow them.

use std::collections::HashSet;
use std::fmt;
use std::ops::Not;

use chrono::{DateTime, Duration, Utc};

use crate::event::{EventId, EventRef};

/// An ordered series of events.
///
/// Filtering never reorders and never touches the events themselves; it only
/// produces a new sequence of handles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Events<'a>(Vec<EventRef<'a>>);

impl<'a> Events<'a> {
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, event: EventRef<'a>) {
        self.0.push(event);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<EventRef<'a>> {
        self.0.get(index).copied()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = EventRef<'a>> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[EventRef<'a>] {
        &self.0
    }

    /// Sum of every event's duration.
    pub fn total_duration(&self) -> Duration {
        self.iter().map(|e| e.duration()).sum()
    }

    /// Returns the events matching the filter, in their original order.
    pub fn filter(&self, f: &Filter) -> Self {
        self.iter().filter(|e| f.matches(*e)).collect()
    }
}

impl<'a> FromIterator<EventRef<'a>> for Events<'a> {
    fn from_iter<I: IntoIterator<Item = EventRef<'a>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for Events<'a> {
    type Item = EventRef<'a>;
    type IntoIter = std::vec::IntoIter<EventRef<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, 'b> IntoIterator for &'b Events<'a> {
    type Item = EventRef<'a>;
    type IntoIter = std::iter::Copied<std::slice::Iter<'b, EventRef<'a>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}

/// Checks whether an event matches a certain criteria.
pub struct Filter(Box<dyn Fn(EventRef<'_>) -> bool>);

impl Filter {
    pub fn new(f: impl Fn(EventRef<'_>) -> bool + 'static) -> Self {
        Self(Box::new(f))
    }

    /// Matches events lying strictly inside `(start, end)`.
    ///
    /// Both bounds are exclusive: an event starting exactly at `start` or
    /// ending exactly at `end` does not match.
    pub fn range(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::new(move |e| e.start_time() > start && e.end_time() < end)
    }

    /// Matches events that are members of `set`, by identity.
    pub fn contained_in<'a>(set: impl IntoIterator<Item = EventRef<'a>>) -> Self {
        let ids: HashSet<EventId> = set.into_iter().map(EventRef::id).collect();
        Self::new(move |e| ids.contains(&e.id()))
    }

    pub fn matches(&self, event: EventRef<'_>) -> bool {
        (self.0)(event)
    }
}

impl Not for Filter {
    type Output = Self;

    fn not(self) -> Self {
        Self::new(move |e| !(self.0)(e))
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    use crate::event::{EventArena, SimpleEvent};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 3, 1, hour, 0, 0).unwrap()
    }

    fn arena(spans: &[(u32, u32, &str)]) -> EventArena {
        let mut arena = EventArena::new();
        for &(start, end, summary) in spans {
            arena.push(SimpleEvent::new(at(start), at(end), summary));
        }
        arena
    }

    fn summaries<'a>(events: &'a Events<'_>) -> Vec<&'a str> {
        events.as_slice().iter().map(|e| e.event().summary()).collect()
    }

    #[test]
    fn total_duration_sums_events() {
        let arena = arena(&[(8, 9, "a"), (10, 13, "b")]);
        assert_eq!(arena.events().total_duration(), Duration::hours(4));
    }

    #[test]
    fn total_duration_of_empty_is_zero() {
        assert_eq!(Events::new().total_duration(), Duration::zero());
    }

    #[test]
    fn filter_preserves_order() {
        let arena = arena(&[(8, 9, "keep 1"), (9, 10, "drop"), (10, 11, "keep 2")]);
        let events = arena.events();
        let kept = events.filter(&Filter::new(|e| e.summary().starts_with("keep")));
        assert_eq!(summaries(&kept), ["keep 1", "keep 2"]);
    }

    #[test]
    fn filter_is_idempotent() {
        let arena = arena(&[(8, 9, "a"), (9, 10, "b"), (10, 11, "a")]);
        let events = arena.events();
        let f = Filter::new(|e| e.summary() == "a");
        let once = events.filter(&f);
        assert_eq!(once.filter(&f), once);
    }

    #[test]
    fn range_excludes_boundaries() {
        let arena = arena(&[
            (8, 10, "starts at range start"),
            (9, 12, "ends at range end"),
            (9, 11, "inside"),
            (7, 9, "starts before"),
        ]);
        let events = arena.events();
        let inside = events.filter(&Filter::range(at(8), at(12)));
        assert_eq!(summaries(&inside), ["inside"]);
    }

    #[test]
    fn not_negates() {
        let arena = arena(&[(8, 9, "a"), (9, 10, "b")]);
        let events = arena.events();
        let f = !Filter::new(|e| e.summary() == "a");
        assert_eq!(summaries(&events.filter(&f)), ["b"]);
    }

    #[test]
    fn contained_in_compares_identity() {
        let arena = arena(&[(8, 9, "twin"), (8, 9, "twin")]);
        let events = arena.events();
        let first = events.get(0).unwrap();
        let second = events.get(1).unwrap();

        let members = events.filter(&Filter::contained_in([first]));
        assert_eq!(members.len(), 1);
        assert_eq!(members.get(0), Some(first));

        let others = events.filter(&!Filter::contained_in([first]));
        assert_eq!(others.get(0), Some(second));
    }
}
