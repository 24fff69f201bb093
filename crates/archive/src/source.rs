// Path: crates/archive/src/source.rs

//! Seekable byte sources an archive can be read from.
//!
//! Seeking is stateful, so a single source cannot serve several readers at
//! once. Each reader that needs its own position takes an independent handle
//! via [`ByteSource::try_clone_handle`].

use crate::config::{ContainerConfig, IoMode};
use fs2::FileExt;
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A seekable, readable view over the bytes of an archive.
pub trait ByteSource: Read + Seek + Send {
    /// Total number of bytes in the source. The read position is preserved.
    fn size(&mut self) -> io::Result<u64> {
        let pos = self.stream_position()?;
        let end = self.seek(SeekFrom::End(0))?;
        self.seek(SeekFrom::Start(pos))?;
        Ok(end)
    }

    /// Advances the read position by `n` bytes without reading them.
    fn skip(&mut self, n: u64) -> io::Result<()> {
        let delta = i64::try_from(n).map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?;
        self.seek(SeekFrom::Current(delta)).map(|_| ())
    }

    /// Opens an independent handle over the same bytes, positioned at 0.
    fn try_clone_handle(&self) -> io::Result<Box<dyn ByteSource>>;
}

/// Opens `path` with the access strategy selected by `config`.
pub fn open_path(path: &Path, config: &ContainerConfig) -> io::Result<Box<dyn ByteSource>> {
    match config.io_mode {
        IoMode::Buffered => Ok(Box::new(FileSource::open(
            path,
            config.buffer_capacity,
            config.lock_file,
        )?)),
        IoMode::Mmap => Ok(Box::new(MmapSource::open(path, config.lock_file)?)),
    }
}

/// Shared advisory lock on an archive file, released on drop.
#[derive(Debug)]
struct SharedLock(File);

impl SharedLock {
    fn acquire(file: File) -> io::Result<Self> {
        FileExt::lock_shared(&file)?;
        Ok(Self(file))
    }
}

impl Drop for SharedLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.0);
    }
}

/// Buffered reads over an archive file.
#[derive(Debug)]
pub struct FileSource {
    reader: BufReader<File>,
    path: PathBuf,
    capacity: usize,
    _lock: Option<SharedLock>,
}

impl FileSource {
    /// Opens `path` for reading, optionally holding a shared lock for the
    /// lifetime of this handle.
    pub fn open(path: &Path, capacity: usize, lock: bool) -> io::Result<Self> {
        let file = File::open(path)?;
        let lock = if lock {
            Some(SharedLock::acquire(file.try_clone()?)?)
        } else {
            None
        };
        Ok(Self {
            reader: BufReader::with_capacity(capacity, file),
            path: path.to_path_buf(),
            capacity,
            _lock: lock,
        })
    }

    /// The path this source reads from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Read for FileSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl Seek for FileSource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.reader.seek(pos)
    }
}

impl ByteSource for FileSource {
    fn size(&mut self) -> io::Result<u64> {
        Ok(self.reader.get_ref().metadata()?.len())
    }

    fn skip(&mut self, n: u64) -> io::Result<()> {
        // seek_relative keeps the buffer when the target is already in it.
        let delta = i64::try_from(n).map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?;
        self.reader.seek_relative(delta)
    }

    fn try_clone_handle(&self) -> io::Result<Box<dyn ByteSource>> {
        // The original handle already holds the lock.
        Ok(Box::new(Self::open(&self.path, self.capacity, false)?))
    }
}

/// Reads over a shared memory map of an archive file.
#[derive(Debug, Clone)]
pub struct MmapSource {
    map: Arc<Mmap>,
    pos: u64,
    _lock: Option<Arc<SharedLock>>,
}

impl MmapSource {
    /// Maps `path` read-only.
    pub fn open(path: &Path, lock: bool) -> io::Result<Self> {
        let file = File::open(path)?;
        // Mapping is only sound while nobody truncates the file; the shared
        // lock keeps cooperating writers out.
        let map = unsafe { Mmap::map(&file)? };
        let lock = if lock {
            Some(Arc::new(SharedLock::acquire(file)?))
        } else {
            None
        };
        Ok(Self {
            map: Arc::new(map),
            pos: 0,
            _lock: lock,
        })
    }
}

impl Read for MmapSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(read_at(&self.map, &mut self.pos, buf))
    }
}

impl Seek for MmapSource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        seek_within(self.map.len() as u64, &mut self.pos, pos)
    }
}

impl ByteSource for MmapSource {
    fn size(&mut self) -> io::Result<u64> {
        Ok(self.map.len() as u64)
    }

    fn try_clone_handle(&self) -> io::Result<Box<dyn ByteSource>> {
        let mut handle = self.clone();
        handle.pos = 0;
        Ok(Box::new(handle))
    }
}

/// An archive held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Arc<[u8]>,
    pos: u64,
}

impl MemorySource {
    /// Wraps `data`, positioned at 0.
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
        }
    }
}

impl Read for MemorySource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(read_at(&self.data, &mut self.pos, buf))
    }
}

impl Seek for MemorySource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        seek_within(self.data.len() as u64, &mut self.pos, pos)
    }
}

impl ByteSource for MemorySource {
    fn size(&mut self) -> io::Result<u64> {
        Ok(self.data.len() as u64)
    }

    fn try_clone_handle(&self) -> io::Result<Box<dyn ByteSource>> {
        Ok(Box::new(Self {
            data: Arc::clone(&self.data),
            pos: 0,
        }))
    }
}

fn read_at(data: &[u8], pos: &mut u64, buf: &mut [u8]) -> usize {
    let start = usize::try_from(*pos).unwrap_or(usize::MAX);
    let available = data.get(start..).unwrap_or(&[]);
    let n = available.len().min(buf.len());
    if let (Some(dst), Some(src)) = (buf.get_mut(..n), available.get(..n)) {
        dst.copy_from_slice(src);
    }
    *pos += n as u64;
    n
}

fn seek_within(len: u64, pos: &mut u64, target: SeekFrom) -> io::Result<u64> {
    let next = match target {
        SeekFrom::Start(n) => Some(n),
        SeekFrom::End(delta) => len.checked_add_signed(delta),
        SeekFrom::Current(delta) => pos.checked_add_signed(delta),
    };
    match next {
        Some(n) => {
            *pos = n;
            Ok(n)
        }
        None => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "seek to a negative or overflowing position",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn memory_source_reads_and_seeks() {
        let mut source = MemorySource::new(b"0123456789".to_vec());
        assert_eq!(source.size().unwrap(), 10);

        let mut buf = [0u8; 3];
        source.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"012");

        source.skip(4).unwrap();
        source.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"789");

        assert_eq!(source.read(&mut buf).unwrap(), 0);
        assert!(source.seek(SeekFrom::Current(-20)).is_err());
        assert_eq!(source.seek(SeekFrom::End(-2)).unwrap(), 8);
    }

    #[test]
    fn cloned_handles_keep_independent_positions() {
        let mut source = MemorySource::new(b"abcdef".to_vec());
        source.seek(SeekFrom::Start(4)).unwrap();

        let mut handle = source.try_clone_handle().unwrap();
        let mut buf = [0u8; 2];
        handle.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"ab");

        source.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"ef");
    }

    #[test]
    fn file_and_mmap_sources_agree() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.ggpk");
        let mut file = File::create(&path).unwrap();
        file.write_all(b"hello archive").unwrap();
        drop(file);

        let mut buffered = FileSource::open(&path, 4, true).unwrap();
        let mut mapped = MmapSource::open(&path, true).unwrap();
        assert_eq!(buffered.size().unwrap(), 13);
        assert_eq!(mapped.size().unwrap(), 13);

        buffered.skip(6).unwrap();
        mapped.skip(6).unwrap();
        let mut a = String::new();
        let mut b = String::new();
        buffered.read_to_string(&mut a).unwrap();
        mapped.read_to_string(&mut b).unwrap();
        assert_eq!(a, "archive");
        assert_eq!(a, b);

        let mut clone = buffered.try_clone_handle().unwrap();
        let mut head = [0u8; 5];
        clone.read_exact(&mut head).unwrap();
        assert_eq!(&head, b"hello");
    }
}
