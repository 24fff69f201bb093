// Path: crates/cli/src/util.rs

use anyhow::{anyhow, Context, Result};
use ggpk_archive::{Container, ContainerConfig, DirectoryNode};
use ggpk_telemetry::Timer;
use std::path::Path;

/// Loads the container options, falling back to defaults without a file.
pub fn load_config(path: Option<&Path>) -> Result<ContainerConfig> {
    match path {
        Some(path) => ContainerConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(ContainerConfig::default()),
    }
}

/// Opens, scans and builds the archive at `path`, timing each phase.
pub fn open_archive(path: &Path, config: &ContainerConfig) -> Result<Container> {
    let mut container = Container::open(path, config.clone())
        .with_context(|| format!("opening {}", path.display()))?;
    {
        let _timer = Timer::new("scan");
        container.scan().context("scanning records")?;
    }
    {
        let _timer = Timer::new("build_tree");
        container.build_tree().context("building directory tree")?;
    }
    Ok(container)
}

/// Resolves `path` inside the archive, treating a missing entry as an error.
pub fn resolve<'a>(container: &'a Container, path: &str) -> Result<DirectoryNode<'a>> {
    container
        .get(path)?
        .ok_or_else(|| anyhow!("no entry at {:?}", path))
}

pub fn display_path(node: DirectoryNode<'_>) -> String {
    if node.is_root() {
        "/".to_string()
    } else {
        node.path()
    }
}
