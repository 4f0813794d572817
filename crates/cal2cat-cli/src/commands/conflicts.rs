//! Conflicts command: show which events were dropped as double bookings.

use std::fmt::Display;
use std::io::{self, Write};

use anyhow::{Context, Result};
use cal2cat_core::Conflicts;
use chrono::{DateTime, Local, TimeZone, Utc};

use crate::pipeline::{self, Window};
use crate::{Config, Settings, WindowArgs};

pub fn run<W: Write>(writer: &mut W, config: &Config, args: &WindowArgs) -> Result<()> {
    let window = Window::from_args(Utc::now(), args)?;
    write_header(writer, &window, &config.settings, &Local)?;

    let arena = cal2cat_cal::load(&config.calendars).context("failed to load calendars")?;
    let selection = pipeline::select(&arena, &window);

    write_conflicts(writer, &selection.conflicts, &config.settings, &Local)?;
    Ok(())
}

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
        "Conflicts from {} until {}",
        time(window.start),
        time(window.end)
    )
}

pub fn write_conflicts<W, Tz>(
    writer: &mut W,
    conflicts: &Conflicts<'_>,
    settings: &Settings,
    tz: &Tz,
) -> io::Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let time = |t: DateTime<Utc>| settings.time_format.format(&t.with_timezone(tz));

    if conflicts.is_empty() {
        writeln!(writer, "No conflicts.")?;
        return Ok(());
    }

    for conflict in conflicts.iter() {
        writeln!(
            writer,
            "{} {} (conflicts with {} {})",
            time(conflict.event.start_time()),
            conflict.event.summary(),
            time(conflict.reason.start_time()),
            conflict.reason.summary()
        )?;
    }

    Ok(())
}
