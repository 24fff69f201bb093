// Path: crates/archive/src/error.rs
//! Error types for reading GGPK containers.

use crate::record::RecordTag;
use std::path::PathBuf;
use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Errors raised while decoding, indexing, navigating or extracting an archive.
#[derive(Error, Debug)]
pub enum GgpkError {
    /// A record carried a 4-byte tag outside the known set.
    #[error("Unknown record kind {tag:?} at offset {offset}")]
    UnknownRecordKind {
        /// Absolute offset of the offending record.
        offset: u64,
        /// The raw tag bytes as read from the stream.
        tag: [u8; 4],
    },
    /// A record declared more bytes than remain in the stream.
    #[error("Truncated record at offset {offset}: declared {declared} bytes, {available} available")]
    TruncatedRecord {
        /// Absolute offset of the record.
        offset: u64,
        /// The length the record header declared.
        declared: u64,
        /// The number of bytes left in the stream at `offset`.
        available: u64,
    },
    /// A record's fields are inconsistent with its own declared length.
    #[error("Invalid record at offset {offset}: {reason}")]
    InvalidRecord {
        /// Absolute offset of the record.
        offset: u64,
        /// What was wrong with it.
        reason: String,
    },
    /// A name field was not valid UTF-16.
    #[error("Record at offset {offset} has a name that is not valid UTF-16")]
    InvalidName {
        /// Absolute offset of the record.
        offset: u64,
    },
    /// There is no GGPK record at offset 0.
    #[error("No GGPK root record at offset 0")]
    MissingRoot,
    /// None of the GGPK record's children is a directory.
    #[error("GGPK root record does not reference a directory record")]
    MissingRootDirectory,
    /// An offset reference points to no record in the table.
    #[error("Record at offset {referenced_by} references missing offset {offset}")]
    DanglingReference {
        /// The referenced offset that has no record.
        offset: u64,
        /// The offset of the record holding the reference.
        referenced_by: u64,
    },
    /// A reference resolved to a record of the wrong kind.
    #[error("Record at offset {offset} is a {found}, expected {expected}")]
    UnexpectedRecordKind {
        /// Absolute offset of the record.
        offset: u64,
        /// Human readable description of what was acceptable.
        expected: &'static str,
        /// The tag actually found.
        found: RecordTag,
    },
    /// The offset graph revisits a record.
    #[error("Offset {offset} is referenced more than once (cycle or shared entry)")]
    CyclicReference {
        /// The offset reached a second time.
        offset: u64,
    },
    /// The directory tree was accessed before it was built.
    #[error("Directory tree not built; call build_tree() first")]
    IndexNotBuilt,
    /// The tree build was requested before the record table was scanned.
    #[error("No records; call scan() first")]
    NotScanned,
    /// A content hash was not exactly 32 bytes.
    #[error("Digest must be 32 bytes, was {0} bytes")]
    InvalidDigestLength(usize),
    /// A directory entry hash disagrees with the hash of the child's name.
    #[error("Entry hash mismatch for {name:?} at offset {offset}: stored {stored:#010x}, computed {computed:#010x}")]
    EntryHashMismatch {
        /// Offset of the child record.
        offset: u64,
        /// The child's decoded name.
        name: String,
        /// The hash stored in the parent's entry list.
        stored: u32,
        /// The hash computed from `name`.
        computed: u32,
    },
    /// Fetched file content does not hash to the record's digest.
    #[error("Content hash mismatch for file record at offset {offset}: expected {expected}, got {actual}")]
    ContentHashMismatch {
        /// Offset of the file record.
        offset: u64,
        /// Hex digest stored in the record.
        expected: String,
        /// Hex digest of the bytes read.
        actual: String,
    },
    /// Content was requested from a node that is not a file.
    #[error("Node {0:?} is not a file")]
    NotAFile(String),
    /// A directory's entries were never materialised, so its subtree is unknown.
    #[error("Directory {0:?} was not expanded; expand it before extracting")]
    NotExpanded(String),
    /// A search pattern failed to compile.
    #[error("Invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    /// The configuration could not be loaded.
    #[error("Invalid configuration: {0}")]
    Config(String),
    /// Writing an extracted node failed.
    #[error("Failed to extract to {path:?}: {source}")]
    Extract {
        /// The filesystem path being written.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// An I/O error on the underlying byte source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ErrorCode for GgpkError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnknownRecordKind { .. } => "GGPK_UNKNOWN_RECORD_KIND",
            Self::TruncatedRecord { .. } => "GGPK_TRUNCATED_RECORD",
            Self::InvalidRecord { .. } => "GGPK_INVALID_RECORD",
            Self::InvalidName { .. } => "GGPK_INVALID_NAME",
            Self::MissingRoot => "GGPK_MISSING_ROOT",
            Self::MissingRootDirectory => "GGPK_MISSING_ROOT_DIRECTORY",
            Self::DanglingReference { .. } => "GGPK_DANGLING_REFERENCE",
            Self::UnexpectedRecordKind { .. } => "GGPK_UNEXPECTED_RECORD_KIND",
            Self::CyclicReference { .. } => "GGPK_CYCLIC_REFERENCE",
            Self::IndexNotBuilt => "GGPK_INDEX_NOT_BUILT",
            Self::NotScanned => "GGPK_NOT_SCANNED",
            Self::InvalidDigestLength(_) => "GGPK_INVALID_DIGEST_LENGTH",
            Self::EntryHashMismatch { .. } => "GGPK_ENTRY_HASH_MISMATCH",
            Self::ContentHashMismatch { .. } => "GGPK_CONTENT_HASH_MISMATCH",
            Self::NotAFile(_) => "GGPK_NOT_A_FILE",
            Self::NotExpanded(_) => "GGPK_NOT_EXPANDED",
            Self::InvalidPattern(_) => "GGPK_INVALID_PATTERN",
            Self::Config(_) => "GGPK_CONFIG",
            Self::Extract { .. } => "GGPK_EXTRACT_FAILED",
            Self::Io(_) => "GGPK_IO",
        }
    }
}

impl GgpkError {
    pub(crate) fn invalid(offset: u64, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            offset,
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GgpkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(GgpkError::MissingRoot.code(), "GGPK_MISSING_ROOT");
        assert_eq!(
            GgpkError::CyclicReference { offset: 12 }.code(),
            "GGPK_CYCLIC_REFERENCE"
        );
        assert_eq!(GgpkError::InvalidDigestLength(3).code(), "GGPK_INVALID_DIGEST_LENGTH");
    }

    #[test]
    fn display_carries_offsets() {
        let err = GgpkError::TruncatedRecord {
            offset: 40,
            declared: 100,
            available: 12,
        };
        assert_eq!(
            err.to_string(),
            "Truncated record at offset 40: declared 100 bytes, 12 available"
        );
    }
}
