// Path: crates/cli/src/main.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # GGPK CLI
//!
//! Inspect and extract the contents of GGPK archives from the command line.

use anyhow::Result;
use clap::{Parser, Subcommand};
use ggpk_telemetry::LogFormat;
use std::io::Write;
use std::path::PathBuf;

mod commands;
mod util;

use commands::*;

#[derive(Parser, Debug)]
#[clap(
    name = "ggpk",
    version,
    about = "Inspect and extract GGPK archives.",
    long_about = "Reads a GGPK packed container, resolves its virtual directory tree and lets you list, search, print and extract its entries."
)]
struct Cli {
    /// TOML file with container options (io_mode, verification, depth limit).
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Log output format on stderr.
    #[clap(long, global = true, default_value = "text")]
    log_format: LogFormat,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print record counts, the free list and tree size.
    Info(info::InfoArgs),

    /// List the entries of a directory.
    Ls(ls::LsArgs),

    /// Find entries whose name matches a regular expression.
    Find(find::FindArgs),

    /// Write a file's content to stdout.
    Cat(cat::CatArgs),

    /// Extract a file or directory subtree to disk.
    Extract(extract::ExtractArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    ggpk_telemetry::init_tracing(cli.log_format)?;

    let config = util::load_config(cli.config.as_deref())?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Info(args) => info::run(args, &config, &mut out)?,
        Commands::Ls(args) => ls::run(args, &config, &mut out)?,
        Commands::Find(args) => find::run(args, &config, &mut out)?,
        Commands::Cat(args) => cat::run(args, &config, &mut out)?,
        Commands::Extract(args) => extract::run(args, &config, &mut out)?,
    }
    out.flush()?;
    Ok(())
}
