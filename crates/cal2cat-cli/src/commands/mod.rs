//! CLI subcommand implementations.

pub mod conflicts;
pub mod init;
pub mod report;
