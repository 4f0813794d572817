//! Core logic for categorizing calendar events.
//!
//! This crate contains the pure transformation pipeline:
//! - Events: the event shapes and the arena that gives them identity
//! - Sequences: duration totals and identity-aware filtering
//! - Conflicts: suppression of double-booked events
//! - Categories: pattern-based grouping of event summaries
//! - Windows and formats: resolving `-1cw` style boundaries and rendering durations

pub mod category;
mod conflict;
pub mod duration;
mod event;
pub mod matcher;
mod sequence;
pub mod window;

pub use category::Category;
pub use conflict::{Conflict, Conflicts};
pub use duration::{DurationFormat, FormatError, TimeFormat};
pub use event::{CalEvent, Event, EventArena, EventId, EventRef, SimpleEvent};
pub use matcher::{Mapper, Matcher, PatternError};
pub use sequence::{Events, Filter};
pub use window::WindowError;
