//! The categorization pipeline shared by the commands.
//!
//! load → sort → range filter → conflict filter → map

use anyhow::{Context, Result};
use cal2cat_core::{
    Category, Conflicts, EventArena, Events, Filter, Mapper, WindowError, category, window,
};
use chrono::{DateTime, Utc};

use crate::WindowArgs;

/// Resolved, exclusive window boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    /// Resolves both offsets relative to `now` truncated to midnight UTC.
    pub fn resolve(now: DateTime<Utc>, start: &str, end: &str) -> Result<Self, WindowError> {
        let today = window::today(now);
        Ok(Self {
            start: window::resolve(today, start)?,
            end: window::resolve(today, end)?,
        })
    }

    pub fn from_args(now: DateTime<Utc>, args: &WindowArgs) -> Result<Self> {
        Self::resolve(now, &args.start, &args.end).context("invalid time window")
    }
}

/// Events left after range and conflict filtering.
#[derive(Debug)]
pub struct Selection<'a> {
    /// Events inside the window that are not suppressed.
    pub events: Events<'a>,
    /// Suppressed events inside the window with their reasons.
    pub conflicts: Conflicts<'a>,
}

/// Narrows the arena to the window and drops double bookings.
pub fn select<'a>(arena: &'a EventArena, window: &Window) -> Selection<'a> {
    let in_range = arena
        .events()
        .filter(&Filter::range(window.start, window.end));
    let conflicts = in_range.conflicts();
    let events = in_range.filter(&!Filter::contained_in(conflicts.events()));

    tracing::debug!(
        loaded = arena.len(),
        in_range = in_range.len(),
        conflicts = conflicts.len(),
        kept = events.len(),
        "selected events"
    );

    Selection { events, conflicts }
}

/// Runs the full pipeline on already loaded events.
pub fn categorize<'a>(
    arena: &'a EventArena,
    window: &Window,
    mappers: &[Mapper],
) -> Vec<Category<'a>> {
    let selection = select(arena, window);
    category::map(&selection.events, mappers)
}

#[cfg(test)]
mod tests {
    use super::*;

    use cal2cat_core::SimpleEvent;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 3, day, hour, 0, 0).unwrap()
    }

    fn arena() -> EventArena {
        let mut arena = EventArena::new();
        arena.push(SimpleEvent::new(at(1, 7), at(1, 9), "Meeting A"));
        arena.push(SimpleEvent::new(at(1, 8), at(1, 11), "Meeting B"));
        arena.push(SimpleEvent::new(at(1, 9), at(1, 10), "Review D"));
        arena.push(SimpleEvent::new(at(2, 9), at(2, 10), "Lunch"));
        arena.push(SimpleEvent::new(at(9, 9), at(9, 10), "Meeting next week"));
        arena
    }

    #[test]
    fn window_resolves_relative_to_midnight() {
        let now = Utc.with_ymd_and_hms(2020, 4, 10, 15, 4, 5).unwrap();
        let window = Window::resolve(now, "-1d", "1d").unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(2020, 4, 9, 0, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2020, 4, 11, 0, 0, 0).unwrap());
    }

    #[test]
    fn window_rejects_bad_offsets() {
        let now = Utc.with_ymd_and_hms(2020, 4, 10, 15, 4, 5).unwrap();
        assert!(Window::resolve(now, "yesterday", "1d").is_err());
    }

    #[test]
    fn select_filters_range_then_conflicts() {
        let arena = arena();
        let window = Window {
            start: at(1, 0),
            end: at(8, 0),
        };
        let selection = select(&arena, &window);

        let kept: Vec<_> = selection.events.iter().map(|e| e.event().summary()).collect();
        assert_eq!(kept, ["Meeting A", "Review D", "Lunch"]);
        assert_eq!(selection.conflicts.len(), 1);
    }

    #[test]
    fn categorize_groups_selected_events() {
        let arena = arena();
        let window = Window {
            start: at(1, 0),
            end: at(8, 0),
        };
        let mappers = vec![
            Mapper::new("Review*", "Reviews").unwrap(),
            Mapper::new("Meeting", "Meetings").unwrap(),
        ];

        let categories = categorize(&arena, &window, &mappers);
        let names: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Meetings", "Reviews"]);
        assert_eq!(categories[0].events.len(), 1);
    }
}
