//! Detection of overlapping (double-booked) events.

use std::collections::HashSet;

use crate::event::{EventId, EventRef};
use crate::sequence::Events;

/// An event that overlaps an earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict<'a> {
    /// The later event, which is suppressed.
    pub event: EventRef<'a>,
    /// The earliest unsuppressed event it overlaps.
    pub reason: EventRef<'a>,
}

/// Conflicts in the order they were detected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conflicts<'a>(Vec<Conflict<'a>>);

impl<'a> Conflicts<'a> {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Conflict<'a>> {
        self.0.iter()
    }

    /// Returns the suppressed events.
    pub fn events(&self) -> Events<'a> {
        self.0.iter().map(|c| c.event).collect()
    }
}

impl<'a> IntoIterator for Conflicts<'a> {
    type Item = Conflict<'a>;
    type IntoIter = std::vec::IntoIter<Conflict<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Checks if `next` starts before `cur` ends.
fn overlaps(cur: &EventRef<'_>, next: &EventRef<'_>) -> bool {
    next.start_time() < cur.end_time()
}

impl<'a> Events<'a> {
    /// Returns every event overlapping an earlier, unsuppressed event.
    ///
    /// Events must be sorted by start time. Once an event is reported it is
    /// never used as a reason, so a chain of overlaps is attributed to the
    /// first event of the chain.
    pub fn conflicts(&self) -> Conflicts<'a> {
        let events = self.as_slice();
        let mut suppressed: HashSet<EventId> = HashSet::new();
        let mut found = Vec::new();

        let (mut i, mut j) = (0, 1);
        while i < events.len() {
            if j >= events.len() {
                (i, j) = (i + 1, i + 2);
                continue;
            }

            let cur = events[i];
            let next = events[j];

            if suppressed.contains(&cur.id()) || !overlaps(&cur, &next) {
                (i, j) = (i + 1, i + 2);
            } else {
                tracing::trace!(
                    event = next.summary(),
                    reason = cur.summary(),
                    "suppressing overlapping event"
                );
                suppressed.insert(next.id());
                found.push(Conflict {
                    event: next,
                    reason: cur,
                });
                j += 1;
            }
        }

        Conflicts(found)
    }
}
