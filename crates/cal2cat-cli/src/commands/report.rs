//! Report command: categorize events in a time window.
//!
//! Output is either a human-readable listing per category or, with `--json`,
//! a single JSON document.

use std::fmt::Display;
use std::io::{self, Write};

use anyhow::{Context, Result};
use cal2cat_core::Category;
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;

use crate::pipeline::{self, Window};
use crate::{Config, ReportArgs, Settings};

/// Width of the separator line between categories.
const SEPARATOR_WIDTH: usize = 80;

/// Runs the report command.
///
/// The text header is written before any calendar is loaded, so a failing
/// source still shows which window was requested.
pub fn run<W: Write>(writer: &mut W, config: &Config, args: &ReportArgs) -> Result<()> {
    let window = Window::from_args(Utc::now(), &args.window)?;
    let mappers = config.mappers().context("invalid mapping pattern")?;

    if !args.json {
        write_header(writer, &window, &config.settings, &Local)?;
    }

    if config.calendars.is_empty() {
        tracing::warn!("no calendars configured");
    }
    let arena = cal2cat_cal::load(&config.calendars).context("failed to load calendars")?;
    let categories = pipeline::categorize(&arena, &window, &mappers);

    if args.json {
        write_json(writer, &window, &categories)?;
    } else {
        write_categories(writer, &categories, &config.settings, &Local)?;
    }
    Ok(())
}

/// Writes the `Categorizing events from ... until ...` line.
pub fn write_header<W, Tz>(
    writer: &mut W,
    window: &Window,
    settings: &Settings,
    tz: &Tz,
) -> io::Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let time = |t: DateTime<Utc>| settings.time_format.format(&t.with_timezone(tz));
    writeln!(
        writer,
        "Categorizing events from {} until {}",
        time(window.start),
        time(window.end)
    )
}

/// Writes one block per category, rendering timestamps in `tz`.
pub fn write_categories<W, Tz>(
    writer: &mut W,
    categories: &[Category<'_>],
    settings: &Settings,
    tz: &Tz,
) -> io::Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let time = |t: DateTime<Utc>| settings.time_format.format(&t.with_timezone(tz));
    let duration = &settings.duration_format;

    for category in categories {
        writeln!(writer, "{}", "-".repeat(SEPARATOR_WIDTH))?;
        writeln!(
            writer,
            "{} ({} events - {})",
            category.name,
            category.events.len(),
            duration.format(category.events.total_duration())
        )?;

        for event in &category.events {
            writeln!(
                writer,
                "{} {} ({})",
                time(event.start_time()),
                event.summary(),
                duration.format(event.duration())
            )?;
        }
    }

    Ok(())
}

#[derive(Debug, Serialize)]
struct ReportJson<'r> {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    categories: Vec<CategoryJson<'r>>,
}

#[derive(Debug, Serialize)]
struct CategoryJson<'r> {
    name: &'r str,
    event_count: usize,
    total_minutes: i64,
    events: Vec<EventJson<'r>>,
}

#[derive(Debug, Serialize)]
struct EventJson<'r> {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    summary: &'r str,
    minutes: i64,
}

/// Writes the report as pretty-printed JSON.
pub fn write_json<W: Write>(
    writer: &mut W,
    window: &Window,
    categories: &[Category<'_>],
) -> Result<()> {
    let report = ReportJson {
        start: window.start,
        end: window.end,
        categories: categories
            .iter()
            .map(|category| CategoryJson {
                name: &category.name,
                event_count: category.events.len(),
                total_minutes: category.events.total_duration().num_minutes(),
                events: category
                    .events
                    .iter()
                    .map(|e| EventJson {
                        start: e.start_time(),
                        end: e.end_time(),
                        summary: e.event().summary(),
                        minutes: e.duration().num_minutes(),
                    })
                    .collect(),
            })
            .collect(),
    };

    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use cal2cat_core::{DurationFormat, EventArena, Mapper, SimpleEvent, TimeFormat};

    use crate::WindowArgs;
    use insta::assert_snapshot;

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 3, day, hour, minute, 0).unwrap()
    }

    fn arena() -> EventArena {
        let mut arena = EventArena::new();
        arena.push(SimpleEvent::new(at(1, 7, 0), at(1, 9, 0), "Meeting A"));
        arena.push(SimpleEvent::new(at(1, 8, 0), at(1, 11, 0), "Meeting B"));
        arena.push(SimpleEvent::new(at(1, 9, 0), at(1, 9, 45), "Review D"));
        arena.push(SimpleEvent::new(at(2, 10, 0), at(2, 11, 30), "Meeting C"));
        arena.push(SimpleEvent::new(at(2, 12, 0), at(2, 13, 0), "Lunch"));
        arena
    }

    fn window() -> Window {
        Window {
            start: at(1, 0, 0),
            end: at(8, 0, 0),
        }
    }

    fn mappers() -> Vec<Mapper> {
        vec![
            Mapper::new("Review*", "Reviews").unwrap(),
            Mapper::new("Meeting", "Meetings").unwrap(),
        ]
    }

    fn write_text(categories: &[Category<'_>], settings: &Settings) -> String {
        let mut output = Vec::new();
        write_header(&mut output, &window(), settings, &Utc).unwrap();
        write_categories(&mut output, categories, settings, &Utc).unwrap();
        String::from_utf8(output).unwrap()
    }

    fn render(settings: &Settings) -> String {
        let arena = arena();
        let categories = pipeline::categorize(&arena, &window(), &mappers());
        write_text(&categories, settings)
    }

    #[test]
    fn text_report_lists_categories_in_name_order() {
        assert_snapshot!(render(&Settings::default()), @r"
        Categorizing events from 2021-03-01 00:00 until 2021-03-08 00:00
        --------------------------------------------------------------------------------
        Meetings (2 events - 3.50)
        2021-03-01 07:00 Meeting A (2.00)
        2021-03-02 10:00 Meeting C (1.50)
        --------------------------------------------------------------------------------
        Reviews (1 events - 0.75)
        2021-03-01 09:00 Review D (0.75)
        ");
    }

    #[test]
    fn text_report_uses_configured_formats() {
        let settings = Settings {
            time_format: TimeFormat::new("%d.%m. %H:%M").unwrap(),
            duration_format: DurationFormat::Minutes,
        };
        assert_snapshot!(render(&settings), @r"
        Categorizing events from 01.03. 00:00 until 08.03. 00:00
        --------------------------------------------------------------------------------
        Meetings (2 events - 210)
        01.03. 07:00 Meeting A (120)
        02.03. 10:00 Meeting C (90)
        --------------------------------------------------------------------------------
        Reviews (1 events - 45)
        01.03. 09:00 Review D (45)
        ");
    }

    #[test]
    fn text_report_without_matches_prints_only_header() {
        let arena = arena();
        let categories = pipeline::categorize(&arena, &window(), &[]);

        assert_snapshot!(write_text(&categories, &Settings::default()), @"Categorizing events from 2021-03-01 00:00 until 2021-03-08 00:00");
    }

    #[test]
    fn header_is_written_before_calendars_load() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            calendars: vec![temp.path().join("missing.ics").display().to_string()],
            ..Config::default()
        };
        let args = ReportArgs {
            window: WindowArgs {
                start: "-1d".to_string(),
                end: "1d".to_string(),
            },
            json: false,
        };

        let mut output = Vec::new();
        let err = run(&mut output, &config, &args).unwrap_err();
        assert!(err.to_string().contains("failed to load calendars"));

        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("Categorizing events from "), "{output}");
        assert_eq!(output.lines().count(), 1);
    }

    #[test]
    fn json_report_contains_categories_and_events() {
        let arena = arena();
        let categories = pipeline::categorize(&arena, &window(), &mappers());
        let mut output = Vec::new();
        write_json(&mut output, &window(), &categories).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(json["start"], "2021-03-01T00:00:00Z");
        assert_eq!(json["categories"][0]["name"], "Meetings");
        assert_eq!(json["categories"][0]["event_count"], 2);
        assert_eq!(json["categories"][0]["total_minutes"], 210);
        assert_eq!(json["categories"][0]["events"][1]["summary"], "Meeting C");
        assert_eq!(json["categories"][1]["events"][0]["minutes"], 45);
    }
}
