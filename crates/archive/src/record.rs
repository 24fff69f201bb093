// Path: crates/archive/src/record.rs

//! Binary layout of the records that make up a GGPK container.
//!
//! A container is a flat sequence of length-prefixed, tagged records. Every
//! record starts with an 8-byte header (`i32` total length, 4-byte ASCII tag)
//! and is addressed by the absolute offset of its first byte. All integers are
//! little-endian; names are UTF-16LE with a trailing NUL code unit.
//!
//! | Tag    | Payload                                                                  |
//! |--------|--------------------------------------------------------------------------|
//! | `GGPK` | `i32` count, `count` x `i64` child offsets                               |
//! | `PDIR` | `i32` name length, `i32` entry count, 32-byte digest, name, entries       |
//! | `FILE` | `i32` name length, 32-byte digest, name, raw content to end of record     |
//! | `FREE` | `i64` next free offset, unused filler to end of record                    |

use crate::error::{GgpkError, Result};
use crate::source::ByteSource;
use std::fmt;
use std::io::{Read, Write};

/// Size of the `length` + `tag` header shared by every record.
pub const HEADER_SIZE: u64 = 8;

/// Size of a content digest.
pub const DIGEST_SIZE: usize = 32;

/// Fixed bytes of a FILE record before its name: header, name length and digest.
pub const FILE_FIXED_SIZE: u64 = HEADER_SIZE + 4 + DIGEST_SIZE as u64;

/// Fixed bytes of a PDIR record before its name: header, name length, entry count and digest.
pub const DIRECTORY_FIXED_SIZE: u64 = HEADER_SIZE + 4 + 4 + DIGEST_SIZE as u64;

/// Size of one `(hash, offset)` directory entry.
pub const ENTRY_SIZE: u64 = 4 + 8;

/// Fixed bytes of a GGPK record before its offsets.
pub const ROOT_FIXED_SIZE: u64 = HEADER_SIZE + 4;

/// Minimum size of a FREE record: header plus the next-free pointer.
pub const FREE_FIXED_SIZE: u64 = HEADER_SIZE + 8;

/// The closed set of record kinds, keyed by their on-disk tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordTag {
    /// `GGPK`: the master record at offset 0.
    Root,
    /// `PDIR`: a directory in the virtual tree.
    Directory,
    /// `FILE`: a file in the virtual tree.
    File,
    /// `FREE`: a node of the free-space list.
    Free,
}

impl RecordTag {
    /// The 4 ASCII bytes identifying this kind on disk.
    pub const fn as_bytes(&self) -> &'static [u8; 4] {
        match self {
            Self::Root => b"GGPK",
            Self::Directory => b"PDIR",
            Self::File => b"FILE",
            Self::Free => b"FREE",
        }
    }

    /// Maps raw tag bytes to a kind, or `None` for an unknown tag.
    pub fn from_bytes(tag: &[u8; 4]) -> Option<Self> {
        match tag {
            b"GGPK" => Some(Self::Root),
            b"PDIR" => Some(Self::Directory),
            b"FILE" => Some(Self::File),
            b"FREE" => Some(Self::Free),
            _ => None,
        }
    }
}

impl fmt::Display for RecordTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Tags are ASCII by construction.
        let tag = self.as_bytes();
        write!(f, "{}", String::from_utf8_lossy(tag))
    }
}

/// A 32-byte content digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Digest(pub [u8; DIGEST_SIZE]);

impl Digest {
    /// Lowercase hex rendering of the digest.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Digest {
    type Error = GgpkError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; DIGEST_SIZE] = bytes
            .try_into()
            .map_err(|_| GgpkError::InvalidDigestLength(bytes.len()))?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

/// A record name together with its on-disk length in UTF-16 code units,
/// NUL terminator included.
///
/// The pair is fixed at construction; there is no way to change the name
/// without also recomputing the length.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RecordName {
    name: String,
    units: u32,
}

impl RecordName {
    /// Builds a name, deriving its length from the UTF-16 encoding.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let units = name.encode_utf16().count() as u32 + 1;
        Self { name, units }
    }

    /// The decoded name. Empty for the root directory.
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// The `name_length` field: UTF-16 code units including the terminator.
    pub fn name_length(&self) -> u32 {
        self.units
    }

    /// Bytes the name occupies on disk, terminator included.
    pub fn encoded_len(&self) -> u64 {
        2 * u64::from(self.units)
    }

    fn read<R: ByteSource + ?Sized>(
        fields: &mut FieldReader<'_, R>,
        offset: u64,
        units: u32,
    ) -> Result<Self> {
        let visible = units.saturating_sub(1) as usize;
        let raw = fields.bytes(visible * 2)?;
        let code_units: Vec<u16> = raw
            .chunks_exact(2)
            .map(|pair| {
                let mut unit = [0u8; 2];
                unit.copy_from_slice(pair);
                u16::from_le_bytes(unit)
            })
            .collect();
        let name = String::from_utf16(&code_units).map_err(|_| GgpkError::InvalidName { offset })?;
        // NUL terminator
        fields.bytes(2)?;
        Ok(Self { name, units })
    }

    fn write<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        for unit in self.name.encode_utf16() {
            w.write_all(&unit.to_le_bytes())?;
        }
        w.write_all(&0u16.to_le_bytes())?;
        Ok(())
    }
}

impl fmt::Display for RecordName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The master record. In practice it has exactly two children: the root
/// directory and the head of the free list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootRecord {
    /// Offsets of the records this one references.
    pub child_offsets: Vec<u64>,
}

/// One `(hash, offset)` pair of a directory's entry list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DirectoryEntry {
    /// Hash of the referenced child's name.
    pub hash: u32,
    /// Absolute offset of the child record.
    pub offset: u64,
}

/// A directory in the virtual tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRecord {
    /// Digest over the directory's contents.
    pub digest: Digest,
    /// Directory name; empty for the root directory.
    pub name: RecordName,
    /// Child references, in on-disk order.
    pub entries: Vec<DirectoryEntry>,
}

/// A file in the virtual tree. Content is not loaded; only its location is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// SHA-256 of the file content.
    pub digest: Digest,
    /// File name.
    pub name: RecordName,
    /// Absolute offset of the first content byte.
    pub data_start: u64,
    /// Number of content bytes.
    pub data_length: u64,
}

/// A node of the singly linked free-space list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeRecord {
    /// Offset of the next free record, or 0 at the end of the list.
    pub next_free: u64,
}

impl FreeRecord {
    /// True when this is the last node of the free list.
    pub fn is_last(&self) -> bool {
        self.next_free == 0
    }
}

/// The decoded payload of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKind {
    Root(RootRecord),
    Directory(DirectoryRecord),
    File(FileRecord),
    Free(FreeRecord),
}

impl RecordKind {
    /// The tag this payload is stored under.
    pub fn tag(&self) -> RecordTag {
        match self {
            Self::Root(_) => RecordTag::Root,
            Self::Directory(_) => RecordTag::Directory,
            Self::File(_) => RecordTag::File,
            Self::Free(_) => RecordTag::Free,
        }
    }
}

/// The fixed header of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Total record size, header included.
    pub length: u32,
    /// The record kind.
    pub tag: RecordTag,
}

impl RecordHeader {
    /// Reads a header from the current position of `source`, which must be `offset`.
    pub fn read<R: ByteSource + ?Sized>(source: &mut R, offset: u64) -> Result<Self> {
        let mut fields = FieldReader::new(source);
        let length = fields.i32()?;
        let raw_tag = fields.array::<4>()?;
        let tag = RecordTag::from_bytes(&raw_tag)
            .ok_or(GgpkError::UnknownRecordKind { offset, tag: raw_tag })?;
        if length < 0 || (length as u64) < HEADER_SIZE {
            return Err(GgpkError::invalid(
                offset,
                format!("declared length {} is smaller than the record header", length),
            ));
        }
        Ok(Self {
            length: length as u32,
            tag,
        })
    }
}

/// A decoded record and its position in the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Absolute offset of the record's first byte.
    pub offset: u64,
    /// Total record size in bytes, header included.
    pub length: u32,
    /// The decoded payload.
    pub kind: RecordKind,
}

impl Record {
    /// Builds a record whose length is derived from its payload.
    ///
    /// Free records carry filler whose size is not part of the payload; use
    /// [`Record::free`] for those.
    pub fn new(offset: u64, kind: RecordKind) -> Result<Self> {
        let length = match &kind {
            RecordKind::Root(root) => ROOT_FIXED_SIZE + 8 * root.child_offsets.len() as u64,
            RecordKind::Directory(dir) => {
                DIRECTORY_FIXED_SIZE + dir.name.encoded_len() + ENTRY_SIZE * dir.entries.len() as u64
            }
            RecordKind::File(file) => FILE_FIXED_SIZE + file.name.encoded_len() + file.data_length,
            RecordKind::Free(_) => FREE_FIXED_SIZE,
        };
        Ok(Self {
            offset,
            length: to_i32_len(offset, length)?,
            kind,
        })
    }

    /// Builds a free record spanning `length` bytes.
    pub fn free(offset: u64, next_free: u64, length: u32) -> Result<Self> {
        if u64::from(length) < FREE_FIXED_SIZE {
            return Err(GgpkError::invalid(
                offset,
                format!("free record of {} bytes cannot hold its pointer", length),
            ));
        }
        Ok(Self {
            offset,
            length: to_i32_len(offset, u64::from(length))?,
            kind: RecordKind::Free(FreeRecord { next_free }),
        })
    }

    /// The record's tag.
    pub fn tag(&self) -> RecordTag {
        self.kind.tag()
    }

    /// The decoded name of a directory or file record.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            RecordKind::Directory(dir) => Some(dir.name.as_str()),
            RecordKind::File(file) => Some(file.name.as_str()),
            _ => None,
        }
    }

    /// Offset of the byte just past this record.
    pub fn end(&self) -> u64 {
        self.offset + u64::from(self.length)
    }

    /// Decodes the record starting at the current position of `source`,
    /// which must be `offset`. On success the source is positioned exactly
    /// `length` bytes past `offset`.
    pub fn decode<R: ByteSource + ?Sized>(source: &mut R, offset: u64) -> Result<Self> {
        let header = RecordHeader::read(source, offset)?;
        Self::decode_body(source, offset, header)
    }

    /// Decodes the payload following an already-read `header`.
    pub fn decode_body<R: ByteSource + ?Sized>(
        source: &mut R,
        offset: u64,
        header: RecordHeader,
    ) -> Result<Self> {
        let length = u64::from(header.length);
        let mut fields = FieldReader::new(source);
        // The header has been consumed already.
        fields.consumed = HEADER_SIZE;

        let kind = match header.tag {
            RecordTag::Root => {
                let count = non_negative(offset, "child count", fields.i32()?)?;
                require(offset, length, ROOT_FIXED_SIZE + 8 * count)?;
                let mut child_offsets = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    child_offsets.push(non_negative(offset, "child offset", fields.i64()?)?);
                }
                RecordKind::Root(RootRecord { child_offsets })
            }
            RecordTag::Directory => {
                let units = name_units(offset, fields.i32()?)?;
                let count = non_negative(offset, "entry count", fields.i32()?)?;
                require(
                    offset,
                    length,
                    DIRECTORY_FIXED_SIZE + 2 * u64::from(units) + ENTRY_SIZE * count,
                )?;
                let digest = Digest(fields.array::<DIGEST_SIZE>()?);
                let name = RecordName::read(&mut fields, offset, units)?;
                let mut entries = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    let hash = fields.u32()?;
                    let child = non_negative(offset, "entry offset", fields.i64()?)?;
                    entries.push(DirectoryEntry {
                        hash,
                        offset: child,
                    });
                }
                RecordKind::Directory(DirectoryRecord {
                    digest,
                    name,
                    entries,
                })
            }
            RecordTag::File => {
                let units = name_units(offset, fields.i32()?)?;
                let fixed = FILE_FIXED_SIZE + 2 * u64::from(units);
                require(offset, length, fixed)?;
                let digest = Digest(fields.array::<DIGEST_SIZE>()?);
                let name = RecordName::read(&mut fields, offset, units)?;
                RecordKind::File(FileRecord {
                    digest,
                    name,
                    data_start: offset + fixed,
                    data_length: length - fixed,
                })
            }
            RecordTag::Free => {
                require(offset, length, FREE_FIXED_SIZE)?;
                let next_free = non_negative(offset, "next free offset", fields.i64()?)?;
                RecordKind::Free(FreeRecord { next_free })
            }
        };

        // File content and free filler are not read; step over them.
        let consumed = fields.consumed;
        if consumed < length {
            source.skip(length - consumed)?;
        }

        Ok(Self {
            offset,
            length: header.length,
            kind,
        })
    }

    /// Writes the record's on-disk form.
    ///
    /// For a directory, file or root record the length field is recomputed
    /// from the payload. A file record is written up to the end of its name;
    /// the caller appends the `data_length` content bytes. A free record is
    /// written with zeroed filler up to its length.
    pub fn encode<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        let length = match &self.kind {
            RecordKind::Free(_) => self.length,
            _ => Self::new(self.offset, self.kind.clone())?.length,
        };
        w.write_all(&(length as i32).to_le_bytes())?;
        w.write_all(self.tag().as_bytes())?;

        match &self.kind {
            RecordKind::Root(root) => {
                w.write_all(&count_field(self.offset, root.child_offsets.len())?.to_le_bytes())?;
                for child in &root.child_offsets {
                    w.write_all(&offset_field(self.offset, *child)?.to_le_bytes())?;
                }
            }
            RecordKind::Directory(dir) => {
                w.write_all(&(dir.name.name_length() as i32).to_le_bytes())?;
                w.write_all(&count_field(self.offset, dir.entries.len())?.to_le_bytes())?;
                w.write_all(dir.digest.as_bytes())?;
                dir.name.write(w)?;
                for entry in &dir.entries {
                    w.write_all(&entry.hash.to_le_bytes())?;
                    w.write_all(&offset_field(self.offset, entry.offset)?.to_le_bytes())?;
                }
            }
            RecordKind::File(file) => {
                w.write_all(&(file.name.name_length() as i32).to_le_bytes())?;
                w.write_all(file.digest.as_bytes())?;
                file.name.write(w)?;
            }
            RecordKind::Free(free) => {
                w.write_all(&offset_field(self.offset, free.next_free)?.to_le_bytes())?;
                let filler = u64::from(length).saturating_sub(FREE_FIXED_SIZE);
                std::io::copy(&mut std::io::repeat(0).take(filler), w)?;
            }
        }
        Ok(())
    }
}

/// Little-endian field reader that counts the bytes it consumes.
struct FieldReader<'a, R: ?Sized> {
    inner: &'a mut R,
    consumed: u64,
}

impl<'a, R: ByteSource + ?Sized> FieldReader<'a, R> {
    fn new(inner: &'a mut R) -> Self {
        Self { inner, consumed: 0 }
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf)?;
        self.consumed += N as u64;
        Ok(buf)
    }

    fn bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.inner.read_exact(&mut buf)?;
        self.consumed += n as u64;
        Ok(buf)
    }

    fn i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.array()?))
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.array()?))
    }
}

fn require(offset: u64, length: u64, needed: u64) -> Result<()> {
    if needed > length {
        return Err(GgpkError::invalid(
            offset,
            format!("fields need {} bytes but the record is {} bytes", needed, length),
        ));
    }
    Ok(())
}

fn non_negative<T: Into<i64>>(offset: u64, field: &str, value: T) -> Result<u64> {
    let value = value.into();
    u64::try_from(value).map_err(|_| GgpkError::invalid(offset, format!("negative {}: {}", field, value)))
}

fn name_units(offset: u64, raw: i32) -> Result<u32> {
    if raw < 1 {
        return Err(GgpkError::invalid(
            offset,
            format!("name length {} does not cover the terminator", raw),
        ));
    }
    Ok(raw as u32)
}

fn to_i32_len(offset: u64, length: u64) -> Result<u32> {
    if length > i32::MAX as u64 {
        return Err(GgpkError::invalid(
            offset,
            format!("record length {} exceeds the i32 length field", length),
        ));
    }
    Ok(length as u32)
}

fn count_field(offset: u64, count: usize) -> Result<i32> {
    i32::try_from(count).map_err(|_| GgpkError::invalid(offset, format!("{} entries do not fit an i32 count", count)))
}

fn offset_field(offset: u64, value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| GgpkError::invalid(offset, format!("offset {} does not fit an i64", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use std::io::Seek;

    fn encoded(record: &Record) -> Vec<u8> {
        let mut buf = Vec::new();
        record.encode(&mut buf).unwrap();
        buf
    }

    fn decode_all(bytes: Vec<u8>) -> (Record, u64) {
        let mut source = MemorySource::new(bytes);
        let record = Record::decode(&mut source, 0).unwrap();
        let pos = source.stream_position().unwrap();
        (record, pos)
    }

    #[test]
    fn decodes_root_with_any_child_count() {
        let record = Record::new(
            0,
            RecordKind::Root(RootRecord {
                child_offsets: vec![28, 120, 400],
            }),
        )
        .unwrap();
        assert_eq!(record.length, 12 + 24);

        let (decoded, pos) = decode_all(encoded(&record));
        assert_eq!(decoded, record);
        assert_eq!(pos, 36);
    }

    #[test]
    fn directory_layout_matches_fixed_offsets() {
        let record = Record::new(
            0,
            RecordKind::Directory(DirectoryRecord {
                digest: Digest([7; 32]),
                name: RecordName::new("Art"),
                entries: vec![
                    DirectoryEntry { hash: 1, offset: 100 },
                    DirectoryEntry { hash: 2, offset: 200 },
                ],
            }),
        )
        .unwrap();
        let bytes = encoded(&record);
        assert_eq!(bytes.len() as u32, record.length);
        assert_eq!(&bytes[4..8], b"PDIR");
        // name_length includes the terminator
        assert_eq!(i32::from_le_bytes(bytes[8..12].try_into().unwrap()), 4);
        assert_eq!(i32::from_le_bytes(bytes[12..16].try_into().unwrap()), 2);
        assert_eq!(&bytes[16..48], &[7u8; 32]);
        assert_eq!(&bytes[48..54], &[b'A', 0, b'r', 0, b't', 0]);
        assert_eq!(&bytes[54..56], &[0, 0]);

        let (decoded, pos) = decode_all(bytes);
        assert_eq!(decoded, record);
        assert_eq!(pos, u64::from(record.length));
    }

    #[test]
    fn empty_directory_has_no_entries() {
        let record = Record::new(
            0,
            RecordKind::Directory(DirectoryRecord {
                digest: Digest::default(),
                name: RecordName::new(""),
                entries: vec![],
            }),
        )
        .unwrap();
        let (decoded, _) = decode_all(encoded(&record));
        match decoded.kind {
            RecordKind::Directory(dir) => {
                assert!(dir.entries.is_empty());
                // name_length of 1 decodes to the empty root name
                assert_eq!(dir.name.name_length(), 1);
                assert_eq!(dir.name.as_str(), "");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn file_data_length_is_derived() {
        // 5 visible characters + terminator = 6 units; 100 - 44 - 12 = 44
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&100i32.to_le_bytes());
        bytes.extend_from_slice(b"FILE");
        bytes.extend_from_slice(&6i32.to_le_bytes());
        bytes.extend_from_slice(&[0xAB; 32]);
        for c in "a.txt".encode_utf16() {
            bytes.extend_from_slice(&c.to_le_bytes());
        }
        bytes.extend_from_slice(&[0, 0]);
        bytes.extend_from_slice(&[0x5A; 44]);
        assert_eq!(bytes.len(), 100);

        let (decoded, pos) = decode_all(bytes);
        assert_eq!(pos, 100);
        match decoded.kind {
            RecordKind::File(file) => {
                assert_eq!(file.name.as_str(), "a.txt");
                assert_eq!(file.data_length, 44);
                assert_eq!(file.data_start, 56);
                assert_eq!(file.digest, Digest([0xAB; 32]));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn free_record_skips_filler() {
        let record = Record::free(0, 4096, 64).unwrap();
        let mut bytes = encoded(&record);
        assert_eq!(bytes.len(), 64);
        bytes.extend_from_slice(b"trailing");

        let (decoded, pos) = decode_all(bytes);
        assert_eq!(pos, 64);
        assert_eq!(decoded.kind, RecordKind::Free(FreeRecord { next_free: 4096 }));
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let mut bytes = 16i32.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"ABCD");
        bytes.extend_from_slice(&[0; 8]);
        let mut source = MemorySource::new(bytes);
        let err = Record::decode(&mut source, 0).unwrap_err();
        assert!(matches!(err, GgpkError::UnknownRecordKind { offset: 0, tag } if &tag == b"ABCD"));
    }

    #[test]
    fn zero_name_length_is_invalid() {
        let mut bytes = 44i32.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"FILE");
        bytes.extend_from_slice(&0i32.to_le_bytes());
        bytes.extend_from_slice(&[0; 32]);
        let mut source = MemorySource::new(bytes);
        let err = Record::decode(&mut source, 0).unwrap_err();
        assert!(matches!(err, GgpkError::InvalidRecord { offset: 0, .. }));
    }

    #[test]
    fn entries_overrunning_length_are_invalid() {
        let record = Record::new(
            0,
            RecordKind::Directory(DirectoryRecord {
                digest: Digest::default(),
                name: RecordName::new("d"),
                entries: vec![DirectoryEntry { hash: 0, offset: 8 }],
            }),
        )
        .unwrap();
        let mut bytes = encoded(&record);
        // Shrink the declared length so the entry no longer fits.
        let short = (record.length - 4) as i32;
        bytes[0..4].copy_from_slice(&short.to_le_bytes());
        let mut source = MemorySource::new(bytes);
        assert!(matches!(
            Record::decode(&mut source, 0),
            Err(GgpkError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn digest_requires_32_bytes() {
        assert!(Digest::try_from(&[0u8; 32][..]).is_ok());
        assert!(matches!(
            Digest::try_from(&[0u8; 31][..]),
            Err(GgpkError::InvalidDigestLength(31))
        ));
    }

    #[test]
    fn record_name_tracks_utf16_units() {
        let name = RecordName::new("Ünïcødé");
        assert_eq!(name.name_length(), 8);
        assert_eq!(name.encoded_len(), 16);
        // Characters outside the BMP take two code units.
        assert_eq!(RecordName::new("𝄞").name_length(), 3);
    }
}
