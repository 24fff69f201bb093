// Path: crates/cli/src/commands/cat.rs

use crate::util;
use anyhow::{bail, Result};
use clap::Parser;
use ggpk_archive::ContainerConfig;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct CatArgs {
    /// Path to the .ggpk archive.
    pub archive: PathBuf,
    /// File inside the archive.
    pub path: String,
    /// Print the record's SHA-256 digest instead of the content.
    #[clap(long)]
    pub digest: bool,
}

pub fn run(args: CatArgs, config: &ContainerConfig, out: &mut dyn Write) -> Result<()> {
    let container = util::open_archive(&args.archive, config)?;
    let node = util::resolve(&container, &args.path)?;
    let Some(file) = node.file_record() else {
        bail!("{:?} is a directory", args.path);
    };

    if args.digest {
        writeln!(out, "{}", hex::encode(file.digest.as_bytes()))?;
        return Ok(());
    }
    let content = container.extract(node)?;
    out.write_all(&content)?;
    Ok(())
}
