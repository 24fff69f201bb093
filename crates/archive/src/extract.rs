// Path: crates/archive/src/extract.rs

//! Fetching file content and materialising nodes onto a real filesystem.

use crate::error::{GgpkError, Result};
use crate::node::DirectoryNode;
use crate::record::FileRecord;
use crate::source::ByteSource;
use sha2::{Digest as _, Sha256};
use std::fs;
use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};

/// Outcome of [`Extractor::extract_to`].
///
/// A failure on one node never stops its siblings, so a report can list
/// both written paths and failures.
#[derive(Debug, Default)]
pub struct ExtractReport {
    /// Files written, in extraction order.
    pub files: Vec<PathBuf>,
    /// Directories created or reused.
    pub directories: Vec<PathBuf>,
    /// Paths that could not be written, with the reason.
    pub failures: Vec<(PathBuf, GgpkError)>,
}

impl ExtractReport {
    /// True when nothing failed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Converts the first failure, if any, into an error.
    pub fn into_result(mut self) -> Result<Self> {
        if self.failures.is_empty() {
            return Ok(self);
        }
        let (_, err) = self.failures.swap_remove(0);
        Err(err)
    }
}

/// Reads file content from a byte source on behalf of tree nodes.
pub struct Extractor<'s, S: ?Sized> {
    source: &'s mut S,
    verify_content: bool,
}

impl<'s, S: ByteSource + ?Sized> Extractor<'s, S> {
    pub fn new(source: &'s mut S) -> Self {
        Self {
            source,
            verify_content: false,
        }
    }

    /// Check each file's SHA-256 against its record digest when read.
    pub fn verify_content(mut self, verify: bool) -> Self {
        self.verify_content = verify;
        self
    }

    /// Reads the full content of a file node into a new buffer.
    pub fn read(&mut self, node: DirectoryNode<'_>) -> Result<Vec<u8>> {
        let file = node
            .file_record()
            .ok_or_else(|| GgpkError::NotAFile(node.path()))?;
        self.read_record(node.record().offset, file)
    }

    /// Reads `data_length` bytes at `data_start`. The source position
    /// afterwards is unspecified.
    pub fn read_record(&mut self, offset: u64, file: &FileRecord) -> Result<Vec<u8>> {
        let len = usize::try_from(file.data_length)
            .map_err(|_| GgpkError::invalid(offset, "file content does not fit in memory"))?;
        self.source.seek(SeekFrom::Start(file.data_start))?;
        let mut content = vec![0u8; len];
        self.source.read_exact(&mut content)?;

        if self.verify_content {
            let actual = Sha256::digest(&content);
            if actual.as_slice() != file.digest.as_bytes() {
                return Err(GgpkError::ContentHashMismatch {
                    offset,
                    expected: file.digest.to_hex(),
                    actual: hex::encode(actual),
                });
            }
        }
        Ok(content)
    }

    /// Writes `node` under `target`: a file becomes `target/<name>`, a
    /// directory becomes `target/<name>/` with all of its children inside.
    pub fn extract_to(&mut self, node: DirectoryNode<'_>, target: &Path) -> ExtractReport {
        let mut report = ExtractReport::default();
        let mut work = vec![(node, target.to_path_buf())];

        while let Some((node, parent_dir)) = work.pop() {
            let path = match safe_join(&parent_dir, node.name()) {
                Ok(path) => path,
                Err(err) => {
                    report.failures.push((parent_dir.clone(), err));
                    continue;
                }
            };

            if node.is_directory() {
                if let Err(source) = create_dir(&path) {
                    tracing::warn!(target: "ggpk", path = %path.display(), error = %source, "failed to create directory");
                    report.failures.push((path.clone(), GgpkError::Extract { path, source }));
                    continue;
                }
                report.directories.push(path.clone());
                if !node.is_expanded() {
                    tracing::warn!(target: "ggpk", path = %path.display(), "directory not expanded, its entries are skipped");
                    report.failures.push((path.clone(), GgpkError::NotExpanded(node.path())));
                }
                let children: Vec<_> = node.children().collect();
                for child in children.into_iter().rev() {
                    work.push((child, path.clone()));
                }
            } else {
                match self.write_file(node, &path) {
                    Ok(()) => report.files.push(path),
                    Err(err) => {
                        tracing::warn!(target: "ggpk", path = %path.display(), error = %err, "failed to extract file");
                        report.failures.push((path, err));
                    }
                }
            }
        }

        tracing::debug!(
            target: "ggpk",
            files = report.files.len(),
            directories = report.directories.len(),
            failures = report.failures.len(),
            "extraction finished"
        );
        report
    }

    fn write_file(&mut self, node: DirectoryNode<'_>, path: &Path) -> Result<()> {
        let content = self.read(node)?;
        fs::write(path, content).map_err(|source| GgpkError::Extract {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn create_dir(path: &Path) -> io::Result<()> {
    match fs::create_dir(path) {
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        other => other,
    }
}

/// Joins a record name onto `dir`, refusing names that would leave it.
fn safe_join(dir: &Path, name: &str) -> Result<PathBuf> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(std::path::Component::Normal(part)), None) => Ok(dir.join(part)),
        _ => Err(GgpkError::Extract {
            path: dir.join(name),
            source: io::Error::new(io::ErrorKind::InvalidInput, "record name is not a single path component"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_join_rejects_escaping_names() {
        let base = Path::new("/tmp/out");
        assert_eq!(safe_join(base, "a.txt").unwrap(), base.join("a.txt"));
        assert!(safe_join(base, "..").is_err());
        assert!(safe_join(base, "a/b").is_err());
        assert!(safe_join(base, "/etc").is_err());
        assert!(safe_join(base, "").is_err());
    }

    #[test]
    fn report_into_result_surfaces_first_failure() {
        let report = ExtractReport::default();
        assert!(report.is_complete());
        assert!(report.into_result().is_ok());

        let mut report = ExtractReport::default();
        report.failures.push((PathBuf::from("x"), GgpkError::NotAFile("x".into())));
        assert!(!report.is_complete());
        assert!(matches!(report.into_result(), Err(GgpkError::NotAFile(_))));
    }
}
