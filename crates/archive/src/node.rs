// Path: crates/archive/src/node.rs

//! Navigation over a built [`DirectoryTree`].

use crate::error::Result;
use crate::record::{DirectoryRecord, FileRecord, Record, RecordKind};
use crate::tree::{DirectoryTree, NodeData, NodeId};
use regex::Regex;
use std::fmt;
use std::path::{Component, Path};

/// Display name of the tree root, whose own record name is empty.
pub const ROOT_NAME: &str = "ROOT";

/// A borrowed view of one node of a [`DirectoryTree`].
///
/// Wraps a directory or file record, the entry hash its parent stored for
/// it (absent on the root), and gives access to parent and children.
#[derive(Clone, Copy)]
pub struct DirectoryNode<'a> {
    tree: &'a DirectoryTree,
    id: NodeId,
    data: &'a NodeData,
}

impl<'a> DirectoryNode<'a> {
    pub(crate) fn new(tree: &'a DirectoryTree, id: NodeId, data: &'a NodeData) -> Self {
        Self { tree, id, data }
    }

    /// The node's id within its tree.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The tree this node belongs to.
    pub fn tree(&self) -> &'a DirectoryTree {
        self.tree
    }

    /// The wrapped directory or file record.
    pub fn record(&self) -> &'a Record {
        &self.data.record
    }

    /// The hash the parent's entry list stores for this node; `None` on the root.
    pub fn entry_hash(&self) -> Option<u32> {
        self.data.entry_hash
    }

    pub fn is_root(&self) -> bool {
        self.data.parent.is_none()
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.data.record.kind, RecordKind::Directory(_))
    }

    pub fn is_file(&self) -> bool {
        matches!(self.data.record.kind, RecordKind::File(_))
    }

    /// False for a directory whose entries have not been resolved yet.
    pub fn is_expanded(&self) -> bool {
        self.data.expanded
    }

    pub fn directory_record(&self) -> Option<&'a DirectoryRecord> {
        match &self.data.record.kind {
            RecordKind::Directory(dir) => Some(dir),
            _ => None,
        }
    }

    pub fn file_record(&self) -> Option<&'a FileRecord> {
        match &self.data.record.kind {
            RecordKind::File(file) => Some(file),
            _ => None,
        }
    }

    /// The record's name, or [`ROOT_NAME`] for the tree root.
    pub fn name(&self) -> &'a str {
        if self.is_root() {
            return ROOT_NAME;
        }
        self.data.record.name().unwrap_or_default()
    }

    pub fn parent(&self) -> Option<DirectoryNode<'a>> {
        self.data.parent.and_then(|id| self.tree.node(id))
    }

    /// Direct children in entry order.
    pub fn children(&self) -> impl Iterator<Item = DirectoryNode<'a>> + 'a {
        let tree = self.tree;
        self.data.children.iter().filter_map(move |&id| tree.node(id))
    }

    /// Direct children that are directories, in entry order.
    pub fn directories(&self) -> Vec<DirectoryNode<'a>> {
        self.children().filter(|c| c.is_directory()).collect()
    }

    /// Direct children that are files, in entry order.
    pub fn files(&self) -> Vec<DirectoryNode<'a>> {
        self.children().filter(|c| c.is_file()).collect()
    }

    /// The direct child named exactly `name`.
    pub fn child(&self, name: &str) -> Option<DirectoryNode<'a>> {
        self.children().find(|c| c.name() == name)
    }

    /// Resolves a relative path below this node.
    ///
    /// The path is split on the platform separator; each segment must match
    /// a child name exactly (case-sensitive). An empty path yields this node.
    /// `a.lookup("b/c")` and `a.lookup("b")?.lookup("c")` are equivalent.
    pub fn lookup(&self, path: &str) -> Option<DirectoryNode<'a>> {
        let mut segments = Vec::new();
        for component in Path::new(path).components() {
            match component {
                Component::Normal(segment) => segments.push(segment.to_str()?),
                Component::RootDir | Component::CurDir => {}
                Component::ParentDir | Component::Prefix(_) => return None,
            }
        }
        self.lookup_segments(segments)
    }

    /// Resolves a pre-split path below this node.
    pub fn lookup_segments<I, S>(&self, segments: I) -> Option<DirectoryNode<'a>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut node = *self;
        for segment in segments {
            node = node.child(segment.as_ref())?;
        }
        Some(node)
    }

    /// The `/`-joined path from the root to this node; empty for the root.
    pub fn path(&self) -> String {
        let parts: Vec<&str> = self
            .ancestor_path(None, None)
            .iter()
            .skip(1)
            .map(|n| n.name())
            .collect();
        parts.join("/")
    }

    /// Every node in this subtree (this node included) whose name matches
    /// `pattern` and whose kind is selected by the flags.
    pub fn search(
        &self,
        pattern: &Regex,
        include_files: bool,
        include_directories: bool,
    ) -> Vec<DirectoryNode<'a>> {
        let mut matches = Vec::new();
        self.walk(|node, _| {
            let wanted = (include_files && node.is_file()) || (include_directories && node.is_directory());
            if wanted && pattern.is_match(node.name()) {
                matches.push(node);
            }
        });
        matches
    }

    /// [`search`](Self::search) with a pattern compiled from a string.
    pub fn search_pattern(
        &self,
        pattern: &str,
        include_files: bool,
        include_directories: bool,
    ) -> Result<Vec<DirectoryNode<'a>>> {
        let regex = Regex::new(pattern)?;
        Ok(self.search(&regex, include_files, include_directories))
    }

    /// Climbs up to `levels` parent links (`None` climbs to the root),
    /// stopping early at the root or at `stop_at`.
    pub fn ancestor(&self, levels: Option<usize>, stop_at: Option<DirectoryNode<'_>>) -> DirectoryNode<'a> {
        let mut node = *self;
        let mut remaining = levels;
        while remaining != Some(0) {
            if stop_at.is_some_and(|stop| stop == node) {
                break;
            }
            let Some(parent) = node.parent() else {
                break;
            };
            node = parent;
            remaining = remaining.map(|r| r - 1);
        }
        node
    }

    /// Like [`ancestor`](Self::ancestor) but returns every node from the
    /// stopping ancestor down to this node, both included.
    pub fn ancestor_path(
        &self,
        levels: Option<usize>,
        stop_at: Option<DirectoryNode<'_>>,
    ) -> Vec<DirectoryNode<'a>> {
        let top = self.ancestor(levels, stop_at);
        let mut chain = vec![*self];
        let mut node = *self;
        while node != top {
            match node.parent() {
                Some(parent) => {
                    chain.push(parent);
                    node = parent;
                }
                None => break,
            }
        }
        chain.reverse();
        chain
    }

    /// Visits this node and every descendant once, pre-order, passing each
    /// node's depth relative to this one.
    pub fn walk<F>(&self, mut visitor: F)
    where
        F: FnMut(DirectoryNode<'a>, usize),
    {
        let mut stack = vec![(*self, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            visitor(node, depth);
            let children: Vec<_> = node.children().collect();
            for child in children.into_iter().rev() {
                stack.push((child, depth + 1));
            }
        }
    }

    /// Number of nodes in this subtree, this node included.
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        self.walk(|_, _| count += 1);
        count
    }
}

impl PartialEq for DirectoryNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for DirectoryNode<'_> {}

impl fmt::Debug for DirectoryNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryNode")
            .field("id", &self.id.index())
            .field("name", &self.name())
            .field("tag", &self.data.record.tag())
            .field("offset", &self.data.record.offset)
            .field("children", &self.data.children.len())
            .finish()
    }
}
