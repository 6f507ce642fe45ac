use std::cmp::Ordering;

/// Key equality capability held by a map for its whole lifetime.
///
/// Two keys are considered the same key when `compare` returns
/// [`Ordering::Equal`]. Both slices always have the map's key size.
/// Any `Fn(&[u8], &[u8]) -> Ordering` closure is a comparator.
pub trait KeyComparator {
    fn compare(&self, stored: &[u8], probe: &[u8]) -> Ordering;

    fn same_key(&self, stored: &[u8], probe: &[u8]) -> bool {
        self.compare(stored, probe) == Ordering::Equal
    }
}

impl<F> KeyComparator for F
where
    F: Fn(&[u8], &[u8]) -> Ordering,
{
    fn compare(&self, stored: &[u8], probe: &[u8]) -> Ordering {
        self(stored, probe)
    }
}

/// Compares the whole key blob byte by byte (`memcmp`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bytewise;

impl KeyComparator for Bytewise {
    fn compare(&self, stored: &[u8], probe: &[u8]) -> Ordering {
        stored.cmp(probe)
    }
}

/// Compares keys as NUL-terminated strings (`strcmp`): bytes after the first
/// zero byte are ignored. Pairs with the djb2 hasher, which ignores them too.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NulTerminated;

fn until_nul(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}

impl KeyComparator for NulTerminated {
    fn compare(&self, stored: &[u8], probe: &[u8]) -> Ordering {
        until_nul(stored).cmp(until_nul(probe))
    }
}
