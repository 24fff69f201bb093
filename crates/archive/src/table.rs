// Path: crates/archive/src/table.rs

//! The offset-keyed record table built from one linear scan of an archive.

use crate::error::{GgpkError, Result};
use crate::record::{FreeRecord, Record, RecordHeader, RecordKind, RecordTag, RootRecord, HEADER_SIZE};
use crate::source::ByteSource;
use std::collections::{BTreeMap, HashSet};
use std::io::SeekFrom;

/// Every record of an archive, keyed by its absolute offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordTable {
    records: BTreeMap<u64, Record>,
}

/// Per-kind record counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStats {
    pub roots: usize,
    pub directories: usize,
    pub files: usize,
    pub free: usize,
    /// Sum of all file content lengths.
    pub file_bytes: u64,
    /// Sum of all free record lengths.
    pub free_bytes: u64,
}

impl RecordTable {
    /// Scans `source` from offset 0 to its end, decoding every record.
    ///
    /// Each record is decoded at the current offset and the cursor advances by
    /// exactly its declared length, so the offsets in the table are exactly the
    /// record boundaries of the stream.
    pub fn scan<S: ByteSource + ?Sized>(source: &mut S) -> Result<Self> {
        let size = source.size()?;
        source.seek(SeekFrom::Start(0))?;

        let mut records = BTreeMap::new();
        let mut offset = 0u64;
        while offset < size {
            let remaining = size - offset;
            if remaining < HEADER_SIZE {
                return Err(GgpkError::TruncatedRecord {
                    offset,
                    declared: HEADER_SIZE,
                    available: remaining,
                });
            }

            let header = RecordHeader::read(source, offset)?;
            let declared = u64::from(header.length);
            if declared > remaining {
                return Err(GgpkError::TruncatedRecord {
                    offset,
                    declared,
                    available: remaining,
                });
            }

            let record = Record::decode_body(source, offset, header)?;
            tracing::trace!(target: "ggpk", offset, length = record.length, tag = %record.tag(), "decoded record");
            offset = record.end();
            records.insert(record.offset, record);
        }

        let table = Self { records };
        let stats = table.stats();
        tracing::debug!(
            target: "ggpk",
            records = table.len(),
            directories = stats.directories,
            files = stats.files,
            free = stats.free,
            "scan complete"
        );
        Ok(table)
    }

    /// Builds a table from already decoded records.
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        Self {
            records: records.into_iter().map(|r| (r.offset, r)).collect(),
        }
    }

    /// The record starting at `offset`.
    pub fn get(&self, offset: u64) -> Option<&Record> {
        self.records.get(&offset)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in offset order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// All record offsets in ascending order.
    pub fn offsets(&self) -> impl Iterator<Item = u64> + '_ {
        self.records.keys().copied()
    }

    /// The GGPK record at offset 0.
    pub fn root(&self) -> Result<&RootRecord> {
        match self.get(0).map(|r| &r.kind) {
            Some(RecordKind::Root(root)) => Ok(root),
            _ => Err(GgpkError::MissingRoot),
        }
    }

    /// Per-kind counts over the whole table.
    pub fn stats(&self) -> TableStats {
        let mut stats = TableStats::default();
        for record in self.records.values() {
            match &record.kind {
                RecordKind::Root(_) => stats.roots += 1,
                RecordKind::Directory(_) => stats.directories += 1,
                RecordKind::File(file) => {
                    stats.files += 1;
                    stats.file_bytes += file.data_length;
                }
                RecordKind::Free(_) => {
                    stats.free += 1;
                    stats.free_bytes += u64::from(record.length);
                }
            }
        }
        stats
    }

    /// Follows the free list from the root's free-record children, returning
    /// `(offset, record)` pairs in chain order.
    pub fn free_list(&self) -> Result<Vec<(u64, FreeRecord)>> {
        let root = self.root()?;
        let mut chain = Vec::new();
        let mut seen = HashSet::new();

        for &head in &root.child_offsets {
            let Some(record) = self.get(head) else {
                return Err(GgpkError::DanglingReference {
                    offset: head,
                    referenced_by: 0,
                });
            };
            let RecordKind::Free(_) = record.kind else {
                continue;
            };

            let mut cursor = head;
            let mut referenced_by = 0;
            loop {
                if !seen.insert(cursor) {
                    return Err(GgpkError::CyclicReference { offset: cursor });
                }
                let free = match self.get(cursor).map(|r| &r.kind) {
                    Some(RecordKind::Free(free)) => *free,
                    Some(other) => {
                        return Err(GgpkError::UnexpectedRecordKind {
                            offset: cursor,
                            expected: "FREE",
                            found: other.tag(),
                        })
                    }
                    None => {
                        return Err(GgpkError::DanglingReference {
                            offset: cursor,
                            referenced_by,
                        })
                    }
                };
                chain.push((cursor, free));
                if free.is_last() {
                    break;
                }
                referenced_by = cursor;
                cursor = free.next_free;
            }
        }
        Ok(chain)
    }

    /// Offset of the first root child that is a directory record.
    ///
    /// Every child offset of the GGPK record must resolve, whichever one
    /// turns out to be the directory.
    pub fn root_directory_offset(&self) -> Result<u64> {
        let root = self.root()?;
        let mut directory = None;
        for &child in &root.child_offsets {
            let record = self.get(child).ok_or(GgpkError::DanglingReference {
                offset: child,
                referenced_by: 0,
            })?;
            if directory.is_none() && record.tag() == RecordTag::Directory {
                directory = Some(child);
            }
        }
        directory.ok_or(GgpkError::MissingRootDirectory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Digest, DirectoryRecord, RecordName};
    use crate::source::MemorySource;

    fn encode_all(records: &[Record]) -> Vec<u8> {
        let mut buf = Vec::new();
        for record in records {
            record.encode(&mut buf).unwrap();
        }
        buf
    }

    #[test]
    fn offsets_follow_declared_lengths() {
        let bytes = encode_all(&[
            Record::free(0, 0, 40).unwrap(),
            Record::free(40, 0, 24).unwrap(),
            Record::free(64, 0, 56).unwrap(),
        ]);
        let table = RecordTable::scan(&mut MemorySource::new(bytes)).unwrap();
        let offsets: Vec<u64> = table.offsets().collect();
        assert_eq!(offsets, vec![0, 40, 64]);
    }

    #[test]
    fn truncated_tail_is_reported() {
        let mut bytes = encode_all(&[Record::free(0, 0, 40).unwrap()]);
        bytes.truncate(30);
        let err = RecordTable::scan(&mut MemorySource::new(bytes)).unwrap_err();
        assert!(matches!(
            err,
            GgpkError::TruncatedRecord {
                offset: 0,
                declared: 40,
                available: 30
            }
        ));
    }

    #[test]
    fn short_header_is_truncated() {
        let mut bytes = encode_all(&[Record::free(0, 0, 16).unwrap()]);
        bytes.extend_from_slice(&[1, 2, 3]);
        let err = RecordTable::scan(&mut MemorySource::new(bytes)).unwrap_err();
        assert!(matches!(err, GgpkError::TruncatedRecord { offset: 16, .. }));
    }

    #[test]
    fn empty_stream_yields_empty_table() {
        let table = RecordTable::scan(&mut MemorySource::new(Vec::new())).unwrap();
        assert!(table.is_empty());
        assert!(matches!(table.root(), Err(GgpkError::MissingRoot)));
    }

    #[test]
    fn free_list_follows_chain() {
        let root = Record::new(
            0,
            RecordKind::Root(RootRecord {
                child_offsets: vec![28, 78],
            }),
        )
        .unwrap();
        assert_eq!(root.length, 28);
        let dir = Record::new(
            28,
            RecordKind::Directory(DirectoryRecord {
                digest: Digest::default(),
                name: RecordName::new(""),
                entries: vec![],
            }),
        )
        .unwrap();
        assert_eq!(dir.end(), 78);
        let table = RecordTable::from_records([
            root,
            dir,
            Record::free(78, 200, 32).unwrap(),
            Record::free(200, 0, 16).unwrap(),
        ]);
        let chain: Vec<u64> = table.free_list().unwrap().into_iter().map(|(o, _)| o).collect();
        assert_eq!(chain, vec![78, 200]);
        assert_eq!(table.root_directory_offset().unwrap(), 28);
    }

    #[test]
    fn looping_free_list_is_cyclic() {
        let root = Record::new(
            0,
            RecordKind::Root(RootRecord {
                child_offsets: vec![100],
            }),
        )
        .unwrap();
        let table = RecordTable::from_records([
            root,
            Record::free(100, 200, 16).unwrap(),
            Record::free(200, 100, 16).unwrap(),
        ]);
        assert!(matches!(
            table.free_list(),
            Err(GgpkError::CyclicReference { offset: 100 })
        ));
        assert!(matches!(
            table.root_directory_offset(),
            Err(GgpkError::MissingRootDirectory)
        ));
    }
}
