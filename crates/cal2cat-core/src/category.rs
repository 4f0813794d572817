//! Grouping of events into named categories.

use std::collections::BTreeMap;

use crate::matcher::Mapper;
use crate::sequence::Events;

/// A named series of events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category<'a> {
    pub name: String,
    pub events: Events<'a>,
}

/// Categorizes events using the given mappers.
///
/// Each event goes to the first mapper that matches its summary; events no
/// mapper matches are left out. Categories are sorted by name, and events
/// keep their input order within a category.
pub fn map<'a>(events: &Events<'a>, mappers: &[Mapper]) -> Vec<Category<'a>> {
    let mut by_name: BTreeMap<&str, Events<'a>> = BTreeMap::new();
    let mut unmatched = 0_usize;

    for event in events {
        let summary = event.event().summary();
        match mappers.iter().find_map(|m| m.map(summary)) {
            Some(name) => by_name.entry(name).or_default().push(event),
            None => unmatched += 1,
        }
    }

    tracing::debug!(
        categories = by_name.len(),
        unmatched,
        "mapped events to categories"
    );

    by_name
        .into_iter()
        .map(|(name, events)| Category {
            name: name.to_string(),
            events,
        })
        .collect()
}
