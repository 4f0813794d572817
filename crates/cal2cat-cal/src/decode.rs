//! iCalendar decoding into [`CalEvent`]s.

use std::sync::LazyLock;

use cal2cat_core::CalEvent;
use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use ical::IcalParser;
use ical::parser::ical::component::IcalEvent;
use ical::property::Property;
use regex::Regex;

use crate::CalendarError;

/// ISO 8601 durations as used by the `DURATION` property.
static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-])?P(?:(\d+)W)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$").unwrap()
});

const DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";
const DATE_FORMAT: &str = "%Y%m%d";
/// Length of a `DATE` value such as `20210301`.
const DATE_LEN: usize = 8;

/// Decodes every `VEVENT` of an iCalendar document.
///
/// `location` is only used to attribute events and errors to their source.
pub fn decode(location: &str, body: &str) -> Result<Vec<CalEvent>, CalendarError> {
    let mut events = Vec::new();
    for calendar in IcalParser::new(body.as_bytes()) {
        let calendar = calendar.map_err(|source| CalendarError::Parse {
            location: location.to_string(),
            source,
        })?;

        for event in &calendar.events {
            events.push(decode_event(location, event)?);
        }
    }

    tracing::trace!(location, events = events.len(), "decoded calendar");
    Ok(events)
}

fn decode_event(location: &str, event: &IcalEvent) -> Result<CalEvent, CalendarError> {
    let property = |name: &str| event.properties.iter().find(|p| p.name == name);

    let dtstart = property("DTSTART").ok_or_else(|| CalendarError::MissingProperty {
        location: location.to_string(),
        property: "DTSTART",
    })?;
    let (start, all_day) = date_time(location, dtstart)?;

    let end = if let Some(dtend) = property("DTEND") {
        date_time(location, dtend)?.0
    } else if let Some(duration) = property("DURATION") {
        let value = duration.value.as_deref().unwrap_or_default();
        start
            .checked_add_signed(parse_duration(location, value)?)
            .ok_or_else(|| CalendarError::InvalidDuration {
                location: location.to_string(),
                value: value.to_string(),
            })?
    } else if all_day {
        start
            .checked_add_signed(Duration::days(1))
            .ok_or_else(|| CalendarError::InvalidDateTime {
                location: location.to_string(),
                value: dtstart.value.clone().unwrap_or_default(),
            })?
    } else {
        start
    };

    let text = |name: &str| {
        property(name)
            .and_then(|p| p.value.as_deref())
            .map(unescape_text)
    };

    Ok(CalEvent {
        start,
        end,
        summary: text("SUMMARY").unwrap_or_default(),
        uid: text("UID"),
        location: text("LOCATION"),
        source: location.to_string(),
    })
}

fn param<'p>(property: &'p Property, name: &str) -> Option<&'p str> {
    property
        .params
        .as_ref()?
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .and_then(|(_, values)| values.first())
        .map(String::as_str)
}

/// Decodes a `DATE` or `DATE-TIME` property.
///
/// UTC values (`...Z`) keep their instant. Floating values and values with a
/// `TZID` are read in the local time zone. Returns whether the value is a
/// whole day.
fn date_time(
    location: &str,
    property: &Property,
) -> Result<(DateTime<Utc>, bool), CalendarError> {
    let value = property.value.as_deref().unwrap_or_default().trim();
    let invalid = || CalendarError::InvalidDateTime {
        location: location.to_string(),
        value: value.to_string(),
    };

    let is_date = param(property, "VALUE").is_some_and(|v| v.eq_ignore_ascii_case("DATE"))
        || value.len() == DATE_LEN;
    if is_date {
        let date = NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())?;
        let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
        return Ok((local_to_utc(midnight).ok_or_else(invalid)?, true));
    }

    if let Some(utc) = value.strip_suffix('Z') {
        let naive = NaiveDateTime::parse_from_str(utc, DATE_TIME_FORMAT).map_err(|_| invalid())?;
        return Ok((naive.and_utc(), false));
    }

    if let Some(tzid) = param(property, "TZID") {
        tracing::trace!(tzid, "reading zoned time in local time zone");
    }
    let naive = NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT).map_err(|_| invalid())?;
    Ok((local_to_utc(naive).ok_or_else(invalid)?, false))
}

/// Converts a local wall-clock time to UTC.
/// Handles DST ambiguity by picking the earlier time.
fn local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.with_timezone(&Utc)),
        // Spring-forward gap: the wall-clock time does not exist, use the
        // next hour instead.
        LocalResult::None => Local
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

fn parse_duration(location: &str, value: &str) -> Result<Duration, CalendarError> {
    let invalid = || CalendarError::InvalidDuration {
        location: location.to_string(),
        value: value.to_string(),
    };

    let caps = DURATION_RE.captures(value.trim()).ok_or_else(invalid)?;
    let part = |i: usize| -> Result<i64, CalendarError> {
        caps.get(i)
            .map_or(Ok(0), |m| m.as_str().parse())
            .map_err(|_| invalid())
    };

    let seconds = part(2)?
        .checked_mul(7 * 86_400)
        .and_then(|s| s.checked_add(part(3).ok()?.checked_mul(86_400)?))
        .and_then(|s| s.checked_add(part(4).ok()?.checked_mul(3_600)?))
        .and_then(|s| s.checked_add(part(5).ok()?.checked_mul(60)?))
        .and_then(|s| s.checked_add(part(6).ok()?))
        .ok_or_else(invalid)?;

    let duration = Duration::try_seconds(seconds).ok_or_else(invalid)?;
    Ok(if caps.get(1).is_some_and(|m| m.as_str() == "-") {
        -duration
    } else {
        duration
    })
}

/// Reverses iCalendar TEXT escaping (`\\`, `\;`, `\,`, `\n`).
fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(escaped) => out.push(escaped),
            None => out.push('\\'),
        }
    }
    out
}
