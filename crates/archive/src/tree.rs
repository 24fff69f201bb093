// Path: crates/archive/src/tree.rs

//! Resolution of directory entry offsets into an owned node hierarchy.
//!
//! Nodes live in an arena owned by [`DirectoryTree`]. A node owns its
//! children through their [`NodeId`]s and refers back to its parent by id,
//! so parent links never form an ownership cycle.

use crate::error::{GgpkError, Result};
use crate::hash::EntryHasher;
use crate::node::DirectoryNode;
use crate::record::{Record, RecordKind};
use crate::table::RecordTable;
use std::collections::HashSet;

/// Stable identifier of a node within its [`DirectoryTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The root node of every tree.
    pub const ROOT: NodeId = NodeId(0);

    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) record: Record,
    pub(crate) entry_hash: Option<u32>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) expanded: bool,
}

/// The virtual directory tree of an archive.
#[derive(Debug, Clone)]
pub struct DirectoryTree {
    nodes: Vec<NodeData>,
}

impl DirectoryTree {
    fn with_root(record: Record) -> Self {
        Self {
            nodes: vec![NodeData {
                record,
                entry_hash: None,
                parent: None,
                children: Vec::new(),
                expanded: false,
            }],
        }
    }

    /// The root directory node.
    pub fn root(&self) -> DirectoryNode<'_> {
        match self.nodes.first() {
            Some(data) => DirectoryNode::new(self, NodeId::ROOT, data),
            // A tree is only ever constructed with its root in place.
            None => unreachable!("directory tree without a root node"),
        }
    }

    /// The node with the given id, if it belongs to this tree.
    pub fn node(&self, id: NodeId) -> Option<DirectoryNode<'_>> {
        self.nodes.get(id.0).map(|data| DirectoryNode::new(self, id, data))
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node in creation order, root first.
    pub fn nodes(&self) -> impl Iterator<Item = DirectoryNode<'_>> {
        self.nodes
            .iter()
            .enumerate()
            .map(move |(i, data)| DirectoryNode::new(self, NodeId(i), data))
    }

    pub(crate) fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0)
    }

    fn attach(&mut self, parent: NodeId, data: NodeData) -> Result<NodeId> {
        let id = NodeId(self.nodes.len());
        let parent_data = self.nodes.get_mut(parent.0).ok_or(GgpkError::IndexNotBuilt)?;
        parent_data.children.push(id);
        self.nodes.push(data);
        Ok(id)
    }

    fn offsets(&self) -> HashSet<u64> {
        self.nodes.iter().map(|n| n.record.offset).collect()
    }
}

struct Pending {
    offset: u64,
    hash: u32,
    parent: NodeId,
    depth: usize,
}

/// Builds a [`DirectoryTree`] from a scanned [`RecordTable`].
///
/// Resolution uses an explicit work list rather than recursion, so deep
/// archives cannot exhaust the stack. Every reachable offset is visited
/// exactly once; reaching one a second time fails with
/// [`GgpkError::CyclicReference`].
pub struct TreeBuilder<'t> {
    table: &'t RecordTable,
    max_depth: Option<usize>,
    hasher: Option<EntryHasher>,
}

impl<'t> TreeBuilder<'t> {
    pub fn new(table: &'t RecordTable) -> Self {
        Self {
            table,
            max_depth: None,
            hasher: None,
        }
    }

    /// Leaves directories deeper than `depth` unexpanded.
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Checks every entry hash against `hasher(child name)` while building.
    pub fn verify_entry_hashes(mut self, hasher: EntryHasher) -> Self {
        self.hasher = Some(hasher);
        self
    }

    /// Locates the root directory through the GGPK record and resolves the
    /// whole hierarchy beneath it.
    pub fn build(&self) -> Result<DirectoryTree> {
        let root_offset = self.table.root_directory_offset()?;
        let record = self
            .table
            .get(root_offset)
            .cloned()
            .ok_or(GgpkError::MissingRootDirectory)?;

        let mut tree = DirectoryTree::with_root(record);
        let mut visited = HashSet::from([root_offset]);
        let added = self.resolve(&mut tree, NodeId::ROOT, &mut visited)?;

        tracing::info!(target: "ggpk", nodes = tree.len(), added, root_offset, "directory tree built");
        Ok(tree)
    }

    /// Materialises the entries of `node` that are not yet its children.
    ///
    /// Only the subtree under `node` grows; its siblings and existing
    /// children are left as they are. The depth limit counts from `node`.
    /// Returns the number of nodes added.
    pub fn expand(&self, tree: &mut DirectoryTree, node: NodeId) -> Result<usize> {
        let mut visited = tree.offsets();
        let added = self.resolve(tree, node, &mut visited)?;
        tracing::debug!(target: "ggpk", node = node.index(), added, "expanded node");
        Ok(added)
    }

    fn resolve(
        &self,
        tree: &mut DirectoryTree,
        start: NodeId,
        visited: &mut HashSet<u64>,
    ) -> Result<usize> {
        let start_data = tree.data(start).ok_or(GgpkError::IndexNotBuilt)?;
        let RecordKind::Directory(dir) = &start_data.record.kind else {
            return Ok(0);
        };

        let present: HashSet<u64> = start_data
            .children
            .iter()
            .filter_map(|&c| tree.data(c))
            .map(|c| c.record.offset)
            .collect();

        let mut work: Vec<Pending> = Vec::new();
        if self.max_depth != Some(0) {
            // Reversed so the LIFO pops hand out entries in on-disk order.
            for entry in dir.entries.iter().rev() {
                if present.contains(&entry.offset) {
                    continue;
                }
                work.push(Pending {
                    offset: entry.offset,
                    hash: entry.hash,
                    parent: start,
                    depth: 1,
                });
            }
        }
        let start_expanded = self.max_depth != Some(0) || dir.entries.is_empty();
        if let Some(data) = tree.nodes.get_mut(start.0) {
            data.expanded = start_expanded;
        }

        let mut added = 0;
        while let Some(pending) = work.pop() {
            if !visited.insert(pending.offset) {
                return Err(GgpkError::CyclicReference {
                    offset: pending.offset,
                });
            }

            let record = self.resolve_record(tree, &pending)?;
            self.check_entry_hash(&record, pending.hash)?;

            let mut expanded = true;
            let mut entries = Vec::new();
            if let RecordKind::Directory(child_dir) = &record.kind {
                if self.max_depth.map_or(true, |max| pending.depth < max) {
                    entries = child_dir.entries.clone();
                } else {
                    expanded = child_dir.entries.is_empty();
                }
            }

            let id = tree.attach(
                pending.parent,
                NodeData {
                    record,
                    entry_hash: Some(pending.hash),
                    parent: Some(pending.parent),
                    children: Vec::new(),
                    expanded,
                },
            )?;
            added += 1;

            for entry in entries.iter().rev() {
                work.push(Pending {
                    offset: entry.offset,
                    hash: entry.hash,
                    parent: id,
                    depth: pending.depth + 1,
                });
            }
        }
        Ok(added)
    }

    fn resolve_record(&self, tree: &DirectoryTree, pending: &Pending) -> Result<Record> {
        let record = self.table.get(pending.offset).ok_or_else(|| {
            let referenced_by = tree
                .data(pending.parent)
                .map(|p| p.record.offset)
                .unwrap_or_default();
            GgpkError::DanglingReference {
                offset: pending.offset,
                referenced_by,
            }
        })?;
        match &record.kind {
            RecordKind::Directory(_) | RecordKind::File(_) => Ok(record.clone()),
            other => Err(GgpkError::UnexpectedRecordKind {
                offset: pending.offset,
                expected: "PDIR or FILE",
                found: other.tag(),
            }),
        }
    }

    fn check_entry_hash(&self, record: &Record, stored: u32) -> Result<()> {
        let (Some(hasher), Some(name)) = (self.hasher, record.name()) else {
            return Ok(());
        };
        let computed = hasher(name);
        if computed != stored {
            return Err(GgpkError::EntryHashMismatch {
                offset: record.offset,
                name: name.to_string(),
                stored,
                computed,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::entry_hash;
    use crate::record::{Digest, DirectoryEntry, DirectoryRecord, FileRecord, RecordName, RootRecord};

    fn dir(offset: u64, name: &str, children: &[(&str, u64)]) -> Record {
        Record::new(
            offset,
            RecordKind::Directory(DirectoryRecord {
                digest: Digest::default(),
                name: RecordName::new(name),
                entries: children
                    .iter()
                    .map(|(n, o)| DirectoryEntry {
                        hash: entry_hash(n),
                        offset: *o,
                    })
                    .collect(),
            }),
        )
        .unwrap()
    }

    fn file(offset: u64, name: &str) -> Record {
        Record::new(
            offset,
            RecordKind::File(FileRecord {
                digest: Digest::default(),
                name: RecordName::new(name),
                data_start: offset + 100,
                data_length: 0,
            }),
        )
        .unwrap()
    }

    fn root(children: &[u64]) -> Record {
        Record::new(
            0,
            RecordKind::Root(RootRecord {
                child_offsets: children.to_vec(),
            }),
        )
        .unwrap()
    }

    /// ROOT -> { Art -> { a.dds }, b.txt }
    fn sample_table() -> RecordTable {
        RecordTable::from_records([
            root(&[1000, 50]),
            Record::free(50, 0, 16).unwrap(),
            dir(1000, "", &[("Art", 2000), ("b.txt", 3000)]),
            dir(2000, "Art", &[("a.dds", 4000)]),
            file(3000, "b.txt"),
            file(4000, "a.dds"),
        ])
    }

    fn names(tree: &DirectoryTree) -> Vec<String> {
        tree.nodes().map(|n| n.name().to_string()).collect()
    }

    #[test]
    fn builds_full_hierarchy_in_entry_order() {
        let table = sample_table();
        let tree = TreeBuilder::new(&table).build().unwrap();
        assert_eq!(tree.len(), 4);

        let root = tree.root();
        let children: Vec<&str> = root.children().map(|c| c.name()).collect();
        assert_eq!(children, vec!["Art", "b.txt"]);
        assert_eq!(names(&tree), vec!["ROOT", "Art", "a.dds", "b.txt"]);
        assert_eq!(root.entry_hash(), None);
        assert_eq!(
            root.children().next().and_then(|c| c.entry_hash()),
            Some(entry_hash("Art"))
        );
    }

    #[test]
    fn root_directory_is_first_directory_child() {
        let table = RecordTable::from_records([
            root(&[50, 1000]),
            Record::free(50, 0, 16).unwrap(),
            dir(1000, "", &[]),
        ]);
        let tree = TreeBuilder::new(&table).build().unwrap();
        assert_eq!(tree.len(), 1);
        assert!(tree.root().is_root());
    }

    #[test]
    fn missing_anchors_fail() {
        let no_root = RecordTable::from_records([dir(1000, "", &[])]);
        assert!(matches!(
            TreeBuilder::new(&no_root).build(),
            Err(GgpkError::MissingRoot)
        ));

        let no_dir = RecordTable::from_records([root(&[50]), Record::free(50, 0, 16).unwrap()]);
        assert!(matches!(
            TreeBuilder::new(&no_dir).build(),
            Err(GgpkError::MissingRootDirectory)
        ));
    }

    #[test]
    fn cycle_is_rejected() {
        let table = RecordTable::from_records([
            root(&[1000]),
            dir(1000, "", &[("loop", 2000)]),
            dir(2000, "loop", &[("back", 1000)]),
        ]);
        assert!(matches!(
            TreeBuilder::new(&table).build(),
            Err(GgpkError::CyclicReference { offset: 1000 })
        ));
    }

    #[test]
    fn dangling_entry_is_rejected() {
        let table = RecordTable::from_records([root(&[1000]), dir(1000, "", &[("gone", 9999)])]);
        assert!(matches!(
            TreeBuilder::new(&table).build(),
            Err(GgpkError::DanglingReference {
                offset: 9999,
                referenced_by: 1000
            })
        ));
    }

    #[test]
    fn entry_pointing_at_free_record_is_rejected() {
        let table = RecordTable::from_records([
            root(&[1000]),
            dir(1000, "", &[("free", 50)]),
            Record::free(50, 0, 16).unwrap(),
        ]);
        assert!(matches!(
            TreeBuilder::new(&table).build(),
            Err(GgpkError::UnexpectedRecordKind { offset: 50, .. })
        ));
    }

    #[test]
    fn entry_hash_verification() {
        let table = sample_table();
        assert!(TreeBuilder::new(&table)
            .verify_entry_hashes(entry_hash)
            .build()
            .is_ok());

        let bad = RecordTable::from_records([
            root(&[1000]),
            Record::new(
                1000,
                RecordKind::Directory(DirectoryRecord {
                    digest: Digest::default(),
                    name: RecordName::new(""),
                    entries: vec![DirectoryEntry {
                        hash: 0xdead_beef,
                        offset: 3000,
                    }],
                }),
            )
            .unwrap(),
            file(3000, "b.txt"),
        ]);
        assert!(TreeBuilder::new(&bad).build().is_ok());
        assert!(matches!(
            TreeBuilder::new(&bad).verify_entry_hashes(entry_hash).build(),
            Err(GgpkError::EntryHashMismatch { offset: 3000, stored: 0xdead_beef, .. })
        ));
    }

    #[test]
    fn depth_limit_then_expand() {
        let table = sample_table();
        let builder = TreeBuilder::new(&table).with_max_depth(Some(1));
        let mut tree = builder.build().unwrap();
        assert_eq!(names(&tree), vec!["ROOT", "Art", "b.txt"]);

        let art = tree.root().lookup("Art").unwrap();
        assert!(!art.is_expanded());
        let art_id = art.id();

        let added = builder.expand(&mut tree, art_id).unwrap();
        assert_eq!(added, 1);
        assert!(tree.root().lookup("Art/a.dds").is_some());
        assert!(tree.node(art_id).unwrap().is_expanded());

        // Re-expanding adds nothing and leaves siblings alone.
        assert_eq!(builder.expand(&mut tree, art_id).unwrap(), 0);
        assert_eq!(builder.expand(&mut tree, NodeId::ROOT).unwrap(), 0);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn dangling_root_child_is_rejected_after_directory() {
        let table = RecordTable::from_records([root(&[1000, 9999]), dir(1000, "", &[])]);
        assert!(matches!(
            TreeBuilder::new(&table).build(),
            Err(GgpkError::DanglingReference {
                offset: 9999,
                referenced_by: 0
            })
        ));
    }

    #[test]
    fn deep_chain_builds_without_recursion() {
        const DEPTH: u64 = 200_000;
        let level = |i: u64| 1000 + i * 100;

        let mut records = vec![root(&[level(0)])];
        records.push(dir(level(0), "", &[("d", level(1))]));
        for i in 1..DEPTH {
            records.push(dir(level(i), "d", &[("d", level(i + 1))]));
        }
        records.push(dir(level(DEPTH), "d", &[("leaf.txt", level(DEPTH + 1))]));
        records.push(file(level(DEPTH + 1), "leaf.txt"));
        let table = RecordTable::from_records(records);

        let tree = TreeBuilder::new(&table).build().unwrap();
        assert_eq!(tree.len() as u64, DEPTH + 2);

        let mut deepest = 0;
        let mut leaf = None;
        tree.root().walk(|node, depth| {
            deepest = deepest.max(depth);
            if node.is_file() {
                leaf = Some(node);
            }
        });
        assert_eq!(deepest as u64, DEPTH + 1);

        let leaf = leaf.unwrap();
        let path = leaf.path();
        assert!(path.ends_with("d/leaf.txt"));
        assert_eq!(path.split('/').count() as u64, DEPTH + 1);
        assert!(leaf.ancestor(None, None).is_root());
    }
}
