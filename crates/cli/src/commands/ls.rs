// Path: crates/cli/src/commands/ls.rs

use crate::util;
use anyhow::Result;
use clap::Parser;
use ggpk_archive::{ContainerConfig, DirectoryNode};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct LsArgs {
    /// Path to the .ggpk archive.
    pub archive: PathBuf,
    /// Directory inside the archive; the root when omitted.
    #[clap(default_value = "")]
    pub path: String,
    /// List the whole subtree.
    #[clap(long, short)]
    pub recursive: bool,
}

pub fn run(args: LsArgs, config: &ContainerConfig, out: &mut dyn Write) -> Result<()> {
    let container = util::open_archive(&args.archive, config)?;
    let node = util::resolve(&container, &args.path)?;

    if args.recursive {
        let mut result = Ok(());
        node.walk(|child, depth| {
            if depth > 0 && result.is_ok() {
                result = write_entry(out, child, &child.path());
            }
        });
        return result;
    }
    if node.is_file() {
        return write_entry(out, node, node.name());
    }
    for child in node.children() {
        write_entry(out, child, child.name())?;
    }
    Ok(())
}

fn write_entry(out: &mut dyn Write, node: DirectoryNode<'_>, label: &str) -> Result<()> {
    match node.file_record() {
        Some(file) => writeln!(out, "f {:>10}  {}", file.data_length, label)?,
        None => writeln!(out, "d {:>10}  {}/", "-", label)?,
    }
    Ok(())
}
