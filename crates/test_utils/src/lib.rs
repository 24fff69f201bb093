// Path: crates/test_utils/src/lib.rs
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

//! Utilities for building synthetic GGPK archives in tests.
//!
//! [`ArchiveBuilder`] lays out a well-formed archive from a declarative tree:
//! the GGPK record at offset 0, then the free list, then every directory and
//! file record in pre-order with the root directory first.

use anyhow::{anyhow, Result};
use ggpk_archive::hash::{entry_hash, EntryHasher};
use ggpk_archive::record::{
    Digest, DirectoryEntry, DirectoryRecord, FileRecord, Record, RecordKind, RecordName, RootRecord,
    DIRECTORY_FIXED_SIZE, ENTRY_SIZE, FILE_FIXED_SIZE, ROOT_FIXED_SIZE,
};
use sha2::{Digest as _, Sha256};
use std::collections::BTreeMap;
use std::path::Path;

/// A node of the tree to lay out.
#[derive(Debug, Clone)]
pub enum Entry {
    File { name: String, content: Vec<u8> },
    Dir { name: String, children: Vec<Entry> },
}

/// A file entry.
pub fn file(name: &str, content: impl Into<Vec<u8>>) -> Entry {
    Entry::File {
        name: name.to_string(),
        content: content.into(),
    }
}

/// A directory entry.
pub fn dir(name: &str, children: Vec<Entry>) -> Entry {
    Entry::Dir {
        name: name.to_string(),
        children,
    }
}

enum Planned {
    File {
        name: String,
        content: Vec<u8>,
    },
    Dir {
        name: String,
        children: Vec<usize>,
    },
}

struct Slot {
    planned: Planned,
    path: String,
    offset: u64,
}

/// A synthetic archive and where each of its records landed.
#[derive(Debug, Clone)]
pub struct BuiltArchive {
    pub bytes: Vec<u8>,
    /// `/`-joined path (empty for the root directory) to record offset.
    pub offsets: BTreeMap<String, u64>,
    /// Offsets of the free records, in chain order.
    pub free_offsets: Vec<u64>,
}

impl BuiltArchive {
    /// Writes the archive bytes to `path`.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }

    /// Offset of the record at `path`.
    pub fn offset_of(&self, path: &str) -> Result<u64> {
        self.offsets
            .get(path)
            .copied()
            .ok_or_else(|| anyhow!("no record laid out at {:?}", path))
    }
}

/// Lays out a well-formed archive.
pub struct ArchiveBuilder {
    children: Vec<Entry>,
    free_lengths: Vec<u32>,
    hasher: EntryHasher,
}

impl ArchiveBuilder {
    /// An archive whose root directory holds `children`.
    pub fn new(children: Vec<Entry>) -> Self {
        Self {
            children,
            free_lengths: Vec::new(),
            hasher: entry_hash,
        }
    }

    /// Adds a free list made of records with the given lengths.
    pub fn with_free(mut self, lengths: &[u32]) -> Self {
        self.free_lengths = lengths.to_vec();
        self
    }

    /// Uses `hasher` for the entry hashes instead of the default name hash.
    pub fn with_hasher(mut self, hasher: EntryHasher) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn build(&self) -> Result<BuiltArchive> {
        // The root directory goes first in the record area.
        let mut slots = vec![Slot {
            planned: Planned::Dir {
                name: String::new(),
                children: Vec::new(),
            },
            path: String::new(),
            offset: 0,
        }];
        let root_children: Vec<usize> = self
            .children
            .iter()
            .map(|child| flatten(child, "", &mut slots))
            .collect();
        if let Some(Slot {
            planned: Planned::Dir { children, .. },
            ..
        }) = slots.first_mut()
        {
            *children = root_children;
        }

        let root_children_count = if self.free_lengths.is_empty() { 1 } else { 2 };
        let mut cursor = ROOT_FIXED_SIZE + 8 * root_children_count;

        let mut free_offsets = Vec::new();
        for &len in &self.free_lengths {
            free_offsets.push(cursor);
            cursor += u64::from(len);
        }

        for slot in slots.iter_mut() {
            slot.offset = cursor;
            cursor += planned_length(&slot.planned);
        }

        let root_dir_offset = slots.first().map(|s| s.offset).unwrap_or_default();
        let mut child_offsets = vec![root_dir_offset];
        if let Some(&head) = free_offsets.first() {
            child_offsets.push(head);
        }

        let mut bytes = Vec::with_capacity(cursor as usize);
        Record::new(0, RecordKind::Root(RootRecord { child_offsets }))?.encode(&mut bytes)?;

        for (i, (&offset, &len)) in free_offsets.iter().zip(&self.free_lengths).enumerate() {
            let next = free_offsets.get(i + 1).copied().unwrap_or(0);
            Record::free(offset, next, len)?.encode(&mut bytes)?;
        }

        for slot in &slots {
            let record = match &slot.planned {
                Planned::Dir { name, children } => {
                    let entries = children
                        .iter()
                        .map(|&c| {
                            let child = slots
                                .get(c)
                                .ok_or_else(|| anyhow!("directory {:?} lists unknown slot {}", slot.path, c))?;
                            Ok(DirectoryEntry {
                                hash: (self.hasher)(planned_name(&child.planned)),
                                offset: child.offset,
                            })
                        })
                        .collect::<Result<Vec<_>>>()?;
                    Record::new(
                        slot.offset,
                        RecordKind::Directory(DirectoryRecord {
                            digest: Digest::default(),
                            name: RecordName::new(name.as_str()),
                            entries,
                        }),
                    )?
                }
                Planned::File { name, content } => {
                    let name = RecordName::new(name.as_str());
                    let digest = Digest::try_from(Sha256::digest(content).as_slice())?;
                    Record::new(
                        slot.offset,
                        RecordKind::File(FileRecord {
                            digest,
                            data_start: slot.offset + FILE_FIXED_SIZE + name.encoded_len(),
                            data_length: content.len() as u64,
                            name,
                        }),
                    )?
                }
            };
            record.encode(&mut bytes)?;
            if let Planned::File { content, .. } = &slot.planned {
                bytes.extend_from_slice(content);
            }
        }

        if bytes.len() as u64 != cursor {
            return Err(anyhow!(
                "laid out {} bytes but planned {}",
                bytes.len(),
                cursor
            ));
        }

        let offsets = slots.iter().map(|s| (s.path.clone(), s.offset)).collect();
        Ok(BuiltArchive {
            bytes,
            offsets,
            free_offsets,
        })
    }
}

fn flatten(entry: &Entry, parent_path: &str, slots: &mut Vec<Slot>) -> usize {
    let (name, path) = match entry {
        Entry::File { name, .. } | Entry::Dir { name, .. } => {
            let path = if parent_path.is_empty() {
                name.clone()
            } else {
                format!("{}/{}", parent_path, name)
            };
            (name.clone(), path)
        }
    };

    let index = slots.len();
    match entry {
        Entry::File { content, .. } => slots.push(Slot {
            planned: Planned::File {
                name,
                content: content.clone(),
            },
            path,
            offset: 0,
        }),
        Entry::Dir { children, .. } => {
            slots.push(Slot {
                planned: Planned::Dir {
                    name,
                    children: Vec::new(),
                },
                path: path.clone(),
                offset: 0,
            });
            let child_indices: Vec<usize> = children.iter().map(|c| flatten(c, &path, slots)).collect();
            if let Some(Slot {
                planned: Planned::Dir { children, .. },
                ..
            }) = slots.get_mut(index)
            {
                *children = child_indices;
            }
        }
    }
    index
}

fn planned_name(planned: &Planned) -> &str {
    match planned {
        Planned::File { name, .. } | Planned::Dir { name, .. } => name,
    }
}

fn planned_length(planned: &Planned) -> u64 {
    let name_bytes = RecordName::new(planned_name(planned)).encoded_len();
    match planned {
        Planned::File { content, .. } => FILE_FIXED_SIZE + name_bytes + content.len() as u64,
        Planned::Dir { children, .. } => {
            DIRECTORY_FIXED_SIZE + name_bytes + ENTRY_SIZE * children.len() as u64
        }
    }
}
