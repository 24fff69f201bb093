// Path: crates/cli/src/commands/info.rs

use crate::util;
use anyhow::Result;
use clap::Parser;
use ggpk_archive::ContainerConfig;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to the .ggpk archive.
    pub archive: PathBuf,
}

pub fn run(args: InfoArgs, config: &ContainerConfig, out: &mut dyn Write) -> Result<()> {
    let container = util::open_archive(&args.archive, config)?;
    let Some(table) = container.records() else {
        anyhow::bail!("archive was not scanned");
    };
    let stats = table.stats();

    writeln!(out, "archive:      {}", args.archive.display())?;
    writeln!(out, "records:      {}", table.len())?;
    writeln!(out, "directories:  {}", stats.directories)?;
    writeln!(out, "files:        {} ({} bytes)", stats.files, stats.file_bytes)?;
    writeln!(out, "free records: {} ({} bytes)", stats.free, stats.free_bytes)?;
    writeln!(out, "root dir at:  {}", table.root_directory_offset()?)?;
    writeln!(out, "tree nodes:   {}", container.tree()?.len())?;

    let chain = table.free_list()?;
    if !chain.is_empty() {
        let offsets: Vec<String> = chain.iter().map(|(offset, _)| offset.to_string()).collect();
        writeln!(out, "free list:    {}", offsets.join(" -> "))?;
    }
    Ok(())
}
