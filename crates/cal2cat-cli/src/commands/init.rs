//! Init command: write a commented default config file.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::config::{DEFAULT_CONFIG, default_config_file};

/// Writes the default config to `path`, or to the platform config directory.
pub fn run<W: Write>(writer: &mut W, path: Option<&Path>, force: bool) -> Result<()> {
    let path: PathBuf = match path {
        Some(path) => path.to_path_buf(),
        None => default_config_file().context("cannot determine config directory")?,
    };

    if path.exists() && !force {
        bail!(
            "config file {} already exists, use --force to overwrite",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    std::fs::write(&path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))?;

    tracing::debug!(path = %path.display(), "wrote default config");
    writeln!(writer, "Wrote default config to {}", path.display())?;
    Ok(())
}
