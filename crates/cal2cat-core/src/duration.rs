//! Validated output formats for durations and timestamps.

use std::fmt;
use std::str::FromStr;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default layout for timestamps.
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Errors parsing a format.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("format cannot be empty")]
    Empty,

    #[error("invalid strftime layout: {layout:?}")]
    InvalidLayout { layout: String },
}

fn validate_layout(layout: &str) -> Result<(), FormatError> {
    if layout.is_empty() {
        return Err(FormatError::Empty);
    }
    if StrftimeItems::new(layout).any(|item| matches!(item, Item::Error)) {
        return Err(FormatError::InvalidLayout {
            layout: layout.to_string(),
        });
    }
    Ok(())
}

/// How to render a duration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DurationFormat {
    /// Whole minutes, e.g. `45`.
    Minutes,
    /// Hours with two decimals, e.g. `0.75`.
    #[default]
    Hours,
    /// A strftime layout applied to midnight plus the duration, e.g. `%H:%M`.
    Layout(String),
}

impl DurationFormat {
    #[allow(clippy::cast_precision_loss)]
    pub fn format(&self, d: Duration) -> String {
        match self {
            Self::Minutes => format!("{:.0}", d.num_milliseconds() as f64 / 60_000.0),
            Self::Hours => format!("{:.2}", d.num_milliseconds() as f64 / 3_600_000.0),
            Self::Layout(layout) => {
                let origin = NaiveDate::default().and_time(NaiveTime::MIN);
                origin
                    .checked_add_signed(d)
                    .unwrap_or(origin)
                    .format(layout)
                    .to_string()
            }
        }
    }
}

impl FromStr for DurationFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minutes" => Ok(Self::Minutes),
            "hours" => Ok(Self::Hours),
            layout => {
                validate_layout(layout)?;
                Ok(Self::Layout(layout.to_string()))
            }
        }
    }
}

impl fmt::Display for DurationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minutes => write!(f, "minutes"),
            Self::Hours => write!(f, "hours"),
            Self::Layout(layout) => write!(f, "{layout}"),
        }
    }
}

impl TryFrom<String> for DurationFormat {
    type Error = FormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DurationFormat> for String {
    fn from(f: DurationFormat) -> Self {
        f.to_string()
    }
}

/// A validated strftime layout for timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeFormat(String);

impl TimeFormat {
    pub fn new(layout: impl Into<String>) -> Result<Self, FormatError> {
        let layout = layout.into();
        validate_layout(&layout)?;
        Ok(Self(layout))
    }

    pub fn format<Tz: TimeZone>(&self, t: &DateTime<Tz>) -> String
    where
        Tz::Offset: fmt::Display,
    {
        t.format(&self.0).to_string()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TimeFormat {
    fn default() -> Self {
        Self(DEFAULT_TIME_FORMAT.to_string())
    }
}

impl TryFrom<String> for TimeFormat {
    type Error = FormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TimeFormat> for String {
    fn from(f: TimeFormat) -> Self {
        f.0
    }
}
