// Path: crates/archive/src/lib.rs
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

//! # GGPK Archive Reader
//!
//! Reads GGPK packed containers: a flat sequence of length-prefixed, tagged
//! records addressed by absolute byte offset, which together encode a virtual
//! directory tree.
//!
//! ## Pipeline
//!
//! *   **Record decoding** ([`record`]): the four record kinds (`GGPK`,
//!     `PDIR`, `FILE`, `FREE`) and their little-endian layouts.
//!
//! *   **Record table** ([`table`]): one forward scan of the byte source,
//!     keyed by offset. The raw bytes are not touched again until file
//!     content is extracted.
//!
//! *   **Tree building** ([`tree`]): resolves directory entry offsets into an
//!     arena-backed hierarchy with an explicit work list, rejecting cycles.
//!
//! *   **Navigation & extraction** ([`node`], [`extract`]): path lookup,
//!     regex search, ancestor walks and materialisation to a real filesystem.
//!
//! ```no_run
//! use ggpk_archive::{Container, ContainerConfig};
//! use std::path::Path;
//!
//! # fn main() -> ggpk_archive::Result<()> {
//! let ggpk = Container::load(Path::new("Content.ggpk"), ContainerConfig::default())?;
//! if let Some(node) = ggpk.get("Metadata/Items/Rings/AbstractRing.ot")? {
//!     ggpk.extract_to(node, Path::new("out"))?.into_result()?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod container;
pub mod error;
pub mod extract;
pub mod hash;
pub mod node;
pub mod record;
pub mod source;
pub mod table;
pub mod tree;

// Re-export primary types for consumer ergonomics
pub use config::{ContainerConfig, IoMode};
pub use container::Container;
pub use error::{ErrorCode, GgpkError, Result};
pub use extract::{ExtractReport, Extractor};
pub use node::{DirectoryNode, ROOT_NAME};
pub use record::{Digest, Record, RecordKind, RecordName, RecordTag};
pub use source::{ByteSource, FileSource, MemorySource, MmapSource};
pub use table::{RecordTable, TableStats};
pub use tree::{DirectoryTree, NodeId, TreeBuilder};

/// The standard file extension for GGPK containers.
pub const GGPK_FILE_EXTENSION: &str = "ggpk";
