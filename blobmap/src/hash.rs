use std::hash::{BuildHasher, Hasher};

const DJB2_SEED: u64 = 5381;

/// djb2 string hash (`hash * 33 + c`, seeded with 5381).
///
/// Keys are treated as NUL-terminated byte strings: hashing stops at the first
/// zero byte, or at the end of the input when there is none. Bytes after the
/// terminator never influence the result, across any number of `write` calls.
/// Bytes are added as unsigned values, so bytes >= 0x80 hash differently than
/// under a C `int c = *str` loop on targets where `char` is signed.
#[derive(Debug, Clone, Copy)]
pub struct Djb2Hasher {
    hash: u64,
    terminated: bool,
}

impl Default for Djb2Hasher {
    fn default() -> Self {
        Self {
            hash: DJB2_SEED,
            terminated: false,
        }
    }
}

impl Hasher for Djb2Hasher {
    fn write(&mut self, bytes: &[u8]) {
        if self.terminated {
            return;
        }
        for &c in bytes {
            if c == 0 {
                self.terminated = true;
                return;
            }
            self.hash = self.hash.wrapping_mul(33).wrapping_add(u64::from(c));
        }
    }

    fn finish(&self) -> u64 {
        self.hash
    }
}

/// `BuildHasher` producing unseeded [`Djb2Hasher`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildDjb2;

impl BuildHasher for BuildDjb2 {
    type Hasher = Djb2Hasher;

    fn build_hasher(&self) -> Djb2Hasher {
        Djb2Hasher::default()
    }
}

/// Hashes a single byte string with djb2.
pub fn djb2(bytes: &[u8]) -> u64 {
    let mut hasher = Djb2Hasher::default();
    hasher.write(bytes);
    hasher.finish()
}

/// Hashes raw key bytes with `S`, without the length prefix `Hash for [u8]` adds.
pub(crate) fn hash_bytes<S: BuildHasher>(build: &S, bytes: &[u8]) -> u64 {
    let mut hasher = build.build_hasher();
    hasher.write(bytes);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_values() {
        assert_eq!(djb2(b""), 5381);
        assert_eq!(djb2(b"a"), 177_670);
        assert_eq!(djb2(b"ab"), 5_863_208);
    }

    #[test]
    fn test_stops_at_nul() {
        assert_eq!(djb2(b"aaa\0"), djb2(b"aaa"));
        assert_eq!(djb2(b"aaa\0zzz"), djb2(b"aaa"));
        assert_eq!(djb2(b"\0abc"), 5381);
    }

    #[test]
    fn test_split_writes_match_single_write() {
        let mut hasher = BuildDjb2.build_hasher();
        hasher.write(b"he");
        hasher.write(b"llo");
        assert_eq!(hasher.finish(), djb2(b"hello"));

        let mut hasher = BuildDjb2.build_hasher();
        hasher.write(b"ab\0");
        hasher.write(b"cd");
        assert_eq!(hasher.finish(), djb2(b"ab"));
    }

    #[test]
    fn test_high_bytes_are_unsigned() {
        assert_eq!(djb2(&[0xFF]), 5381 * 33 + 255);
    }

    #[test]
    fn test_hash_bytes_has_no_length_prefix() {
        assert_eq!(hash_bytes(&BuildDjb2, b"key"), djb2(b"key"));
    }

    proptest! {
        #[test]
        fn prop_deterministic(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            prop_assert_eq!(djb2(&bytes), djb2(&bytes));
            prop_assert_eq!(hash_bytes(&BuildDjb2, &bytes), djb2(&bytes));
        }
    }
}
