//! cal2cat CLI library.
//!
//! This crate provides the CLI interface: argument parsing, configuration,
//! the categorization pipeline and output rendering.

mod cli;
pub mod commands;
mod config;
pub mod pipeline;

pub use cli::{Cli, Commands, ReportArgs, WindowArgs};
pub use config::{Config, MappingRule, Settings};
