// Path: crates/archive/src/container.rs

//! The entry point for reading an archive.
//!
//! A [`Container`] owns the byte source, the scanned [`RecordTable`] and the
//! built [`DirectoryTree`]. The lifecycle is open, [`scan`](Container::scan),
//! [`build_tree`](Container::build_tree), then navigate and extract.

use crate::config::ContainerConfig;
use crate::error::{GgpkError, Result};
use crate::extract::{ExtractReport, Extractor};
use crate::hash;
use crate::node::{DirectoryNode, ROOT_NAME};
use crate::source::{self, ByteSource};
use crate::table::RecordTable;
use crate::tree::{DirectoryTree, NodeId, TreeBuilder};
use std::path::{Path, PathBuf};

/// An opened GGPK archive.
pub struct Container {
    source: Box<dyn ByteSource>,
    path: Option<PathBuf>,
    config: ContainerConfig,
    table: Option<RecordTable>,
    tree: Option<DirectoryTree>,
}

impl Container {
    /// Opens the archive at `path` without reading any records yet.
    pub fn open(path: &Path, config: ContainerConfig) -> Result<Self> {
        let source = source::open_path(path, &config)?;
        tracing::debug!(target: "ggpk", path = %path.display(), io_mode = ?config.io_mode, "opened archive");
        Ok(Self {
            source,
            path: Some(path.to_path_buf()),
            config,
            table: None,
            tree: None,
        })
    }

    /// Wraps an arbitrary byte source.
    pub fn from_source(source: Box<dyn ByteSource>, config: ContainerConfig) -> Self {
        Self {
            source,
            path: None,
            config,
            table: None,
            tree: None,
        }
    }

    /// Opens, scans and builds the tree in one step.
    pub fn load(path: &Path, config: ContainerConfig) -> Result<Self> {
        let mut container = Self::open(path, config)?;
        container.scan()?;
        container.build_tree()?;
        Ok(container)
    }

    /// The archive path, when opened from the filesystem.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Reads every record into the offset table. Any previously built tree
    /// is discarded.
    pub fn scan(&mut self) -> Result<&RecordTable> {
        self.tree = None;
        self.table = None;
        let table = RecordTable::scan(&mut *self.source)?;
        tracing::info!(target: "ggpk", records = table.len(), "archive scanned");
        Ok(self.table.insert(table))
    }

    /// The scanned record table, if [`scan`](Self::scan) has run.
    pub fn records(&self) -> Option<&RecordTable> {
        self.table.as_ref()
    }

    /// Resolves the directory hierarchy from the scanned records.
    pub fn build_tree(&mut self) -> Result<DirectoryNode<'_>> {
        let table = self.table.as_ref().ok_or(GgpkError::NotScanned)?;
        let tree = Self::builder_for(&self.config, table).build()?;
        Ok(self.tree.insert(tree).root())
    }

    /// Resolves the not yet materialised entries of `node`.
    pub fn expand(&mut self, node: NodeId) -> Result<usize> {
        let table = self.table.as_ref().ok_or(GgpkError::NotScanned)?;
        let tree = self.tree.as_mut().ok_or(GgpkError::IndexNotBuilt)?;
        Self::builder_for(&self.config, table).expand(tree, node)
    }

    /// True once the tree has been built.
    pub fn is_parsed(&self) -> bool {
        self.tree.is_some()
    }

    pub fn tree(&self) -> Result<&DirectoryTree> {
        self.tree.as_ref().ok_or(GgpkError::IndexNotBuilt)
    }

    pub fn root(&self) -> Result<DirectoryNode<'_>> {
        Ok(self.tree()?.root())
    }

    /// Looks up a path from the root. `"ROOT"` names the root itself; a
    /// missing path is `Ok(None)`.
    pub fn get(&self, path: &str) -> Result<Option<DirectoryNode<'_>>> {
        let root = self.root()?;
        if path == ROOT_NAME {
            return Ok(Some(root));
        }
        Ok(root.lookup(path))
    }

    /// An independent read handle over the archive bytes.
    pub fn read_handle(&self) -> Result<Box<dyn ByteSource>> {
        Ok(self.source.try_clone_handle()?)
    }

    /// Reads the content of a file node through a fresh read handle.
    pub fn extract(&self, node: DirectoryNode<'_>) -> Result<Vec<u8>> {
        let mut handle = self.read_handle()?;
        Extractor::new(&mut *handle)
            .verify_content(self.config.verify_content_hashes)
            .read(node)
    }

    /// Writes `node` (and, for a directory, its whole subtree) under `directory`.
    pub fn extract_to(&self, node: DirectoryNode<'_>, directory: &Path) -> Result<ExtractReport> {
        let mut handle = self.read_handle()?;
        let report = Extractor::new(&mut *handle)
            .verify_content(self.config.verify_content_hashes)
            .extract_to(node, directory);
        Ok(report)
    }

    fn builder_for<'t>(config: &ContainerConfig, table: &'t RecordTable) -> TreeBuilder<'t> {
        let builder = TreeBuilder::new(table).with_max_depth(config.max_depth);
        if config.verify_entry_hashes {
            builder.verify_entry_hashes(hash::entry_hash)
        } else {
            builder
        }
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("path", &self.path)
            .field("records", &self.table.as_ref().map(RecordTable::len))
            .field("nodes", &self.tree.as_ref().map(DirectoryTree::len))
            .finish()
    }
}
