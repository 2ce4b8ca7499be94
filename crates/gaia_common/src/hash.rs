//! Content hashing for detecting drift between generated asset buffers.

use std::fmt;

/// A 128-bit XXH3 digest of a byte buffer.
///
/// Two buffers with the same `ContentHash` are assumed identical. The hash
/// is used purely for in-cache change detection (deciding whether an asset
/// buffer must be rewritten to disk), never for security.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash(u128);

impl ContentHash {
    /// Computes the XXH3-128 digest of the given buffer.
    pub fn of(data: &[u8]) -> Self {
        Self(xxhash_rust::xxh3::xxh3_128(data))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:08x}..)", (self.0 >> 96) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let a = ContentHash::of(b"roof_texture.png contents");
        let b = ContentHash::of(b"roof_texture.png contents");
        assert_eq!(a, b);
    }

    #[test]
    fn different_inputs_differ() {
        let a = ContentHash::of(b"first revision");
        let b = ContentHash::of(b"second revision");
        assert_ne!(a, b);
    }

    #[test]
    fn empty_buffer_hashes() {
        let a = ContentHash::of(b"");
        let b = ContentHash::of(b"");
        assert_eq!(a, b);
    }

    #[test]
    fn display_is_32_hex_chars() {
        let h = ContentHash::of(b"buffer");
        let s = format!("{h}");
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn debug_abbreviated() {
        let h = ContentHash::of(b"buffer");
        let s = format!("{h:?}");
        assert!(s.starts_with("ContentHash("));
        assert!(s.ends_with(".)"));
    }
}
