//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Default window start: beginning of last calendar week.
pub const DEFAULT_START: &str = "-1cw";

/// Default window end: beginning of this calendar week.
pub const DEFAULT_END: &str = "-0cw";

const OFFSET_HELP: &str = "\
Time ranges can be specified as <n><unit>, where <n> is an integer and <unit>
is any of:
  d   days
  w   weeks (7 days)
  cw  calendar weeks
  m   months (same day in another month)
  cm  calendar months
  y   years (same day in another year)
  cy  calendar years

Calendar weeks, months and years are truncated to Monday, the first day of the
month and the first day of the year, respectively. Offsets are relative to
today 00:00 UTC.";

/// Categorize calendar events.
///
/// Reads iCalendar files, drops double-booked events and groups the rest
/// into categories by matching their summaries.
#[derive(Debug, Parser)]
#[command(name = "cal2cat", version, about, long_about = None, after_long_help = OFFSET_HELP)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Categorize events in a time window (default).
    Report(ReportArgs),

    /// List double-booked events and the event they conflict with.
    Conflicts {
        #[command(flatten)]
        window: WindowArgs,
    },

    /// Write a default config file.
    Init {
        /// Overwrite an existing config file.
        #[arg(long)]
        force: bool,
    },
}

/// Time window boundaries.
#[derive(Debug, Clone, Args)]
pub struct WindowArgs {
    /// Start of the window, exclusive.
    #[arg(short, long, default_value = DEFAULT_START, allow_hyphen_values = true)]
    pub start: String,

    /// End of the window, exclusive.
    #[arg(short, long, default_value = DEFAULT_END, allow_hyphen_values = true)]
    pub end: String,
}

impl Default for WindowArgs {
    fn default() -> Self {
        Self {
            start: DEFAULT_START.to_string(),
            end: DEFAULT_END.to_string(),
        }
    }
}

/// Arguments of the report command.
#[derive(Debug, Clone, Default, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub window: WindowArgs,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}
