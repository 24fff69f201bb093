// Path: crates/archive/src/hash.rs

//! Name hashing for directory entries.
//!
//! Each directory entry stores a 32-bit MurmurHash2 of the child's name next to
//! the child's offset. The tree builder can check these against the decoded names.

const M: u32 = 0x5bd1_e995;
const R: u32 = 24;

/// Signature of the hash function used to verify directory entries.
pub type EntryHasher = fn(&str) -> u32;

/// 32-bit MurmurHash2 of `data` with the given `seed`.
pub fn murmur2_32(data: &[u8], seed: u32) -> u32 {
    let mut h = seed ^ (data.len() as u32);

    let mut chunks = data.chunks_exact(4);
    for chunk in &mut chunks {
        let mut word = [0u8; 4];
        word.copy_from_slice(chunk);
        let mut k = u32::from_le_bytes(word);
        k = k.wrapping_mul(M);
        k ^= k >> R;
        k = k.wrapping_mul(M);

        h = h.wrapping_mul(M);
        h ^= k;
    }

    let tail = chunks.remainder();
    if let Some(&b) = tail.get(2) {
        h ^= u32::from(b) << 16;
    }
    if let Some(&b) = tail.get(1) {
        h ^= u32::from(b) << 8;
    }
    if let Some(&b) = tail.first() {
        h ^= u32::from(b);
        h = h.wrapping_mul(M);
    }

    h ^= h >> 13;
    h = h.wrapping_mul(M);
    h ^= h >> 15;
    h
}

/// The hash stored alongside a child's offset in its parent's entry list:
/// MurmurHash2 (seed 0) over the lowercased name encoded as UTF-16LE.
pub fn entry_hash(name: &str) -> u32 {
    let bytes: Vec<u8> = name
        .to_lowercase()
        .encode_utf16()
        .flat_map(u16::to_le_bytes)
        .collect();
    murmur2_32(&bytes, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn murmur2_reference_vectors() {
        assert_eq!(murmur2_32(b"This is a test", 0), 895_688_205);
        assert_eq!(murmur2_32(b"This is a test", 42), 1_204_582_478);
    }

    #[test]
    fn murmur2_short_inputs() {
        assert_eq!(murmur2_32(b"", 0), 0);
        assert_eq!(murmur2_32(b"a", 0), 2_456_313_694);
    }

    #[test]
    fn entry_hash_ignores_case() {
        assert_eq!(entry_hash("abc"), 492_283_270);
        assert_eq!(entry_hash("ABC"), entry_hash("abc"));
        assert_ne!(entry_hash("abd"), entry_hash("abc"));
    }
}
