// Path: crates/cli/src/commands/find.rs

use crate::util;
use anyhow::Result;
use clap::Parser;
use ggpk_archive::ContainerConfig;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct FindArgs {
    /// Path to the .ggpk archive.
    pub archive: PathBuf,
    /// Regular expression matched against entry names.
    pub pattern: String,
    /// Only report files.
    #[clap(long)]
    pub files: bool,
    /// Only report directories.
    #[clap(long)]
    pub dirs: bool,
    /// Directory to search under; the root when omitted.
    #[clap(long, default_value = "")]
    pub under: String,
}

pub fn run(args: FindArgs, config: &ContainerConfig, out: &mut dyn Write) -> Result<()> {
    let container = util::open_archive(&args.archive, config)?;
    let start = util::resolve(&container, &args.under)?;

    // Neither flag means both kinds.
    let (files, dirs) = if args.files || args.dirs {
        (args.files, args.dirs)
    } else {
        (true, true)
    };

    let matches = start.search_pattern(&args.pattern, files, dirs)?;
    tracing::debug!(target: "ggpk", pattern = %args.pattern, matches = matches.len(), "search finished");
    for node in matches {
        writeln!(out, "{}", util::display_path(node))?;
    }
    Ok(())
}
