// Path: crates/cli/src/commands/extract.rs

use crate::util;
use anyhow::{bail, Context, Result};
use clap::Parser;
use ggpk_archive::ContainerConfig;
use ggpk_telemetry::Timer;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// Path to the .ggpk archive.
    pub archive: PathBuf,
    /// Entry inside the archive; `ROOT` extracts everything.
    pub path: String,
    /// Destination directory, created if missing.
    pub dest: PathBuf,
}

pub fn run(args: ExtractArgs, config: &ContainerConfig, out: &mut dyn Write) -> Result<()> {
    let container = util::open_archive(&args.archive, config)?;
    let node = util::resolve(&container, &args.path)?;
    fs::create_dir_all(&args.dest)
        .with_context(|| format!("creating {}", args.dest.display()))?;

    let report = {
        let _timer = Timer::new("extract");
        container.extract_to(node, &args.dest)?
    };

    writeln!(
        out,
        "extracted {} files and {} directories to {}",
        report.files.len(),
        report.directories.len(),
        args.dest.display()
    )?;
    for (path, err) in &report.failures {
        writeln!(out, "failed: {}: {}", path.display(), err)?;
    }
    if !report.is_complete() {
        bail!("{} entries could not be extracted", report.failures.len());
    }
    Ok(())
}
