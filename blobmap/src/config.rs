use std::hash::BuildHasher;

use crate::compare::{Bytewise, KeyComparator};
use crate::error::{MapError, Result};
use crate::hash::BuildDjb2;
use crate::map::BlobMap;

pub const DEFAULT_CAPACITY: usize = 16;
pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.7;

/// Construction parameters for a [`BlobMap`].
///
/// ```
/// use blobmap::{BlobMap, NulTerminated};
///
/// let map = BlobMap::builder()
///     .key_size(4)
///     .value_size(4)
///     .capacity(4)
///     .comparator(NulTerminated)
///     .build()
///     .unwrap();
/// assert_eq!(map.capacity(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct MapBuilder<C = Bytewise, S = BuildDjb2> {
    key_size: usize,
    value_size: usize,
    capacity: usize,
    max_load_factor: f64,
    comparator: Option<C>,
    hasher: S,
}

impl Default for MapBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MapBuilder {
    pub fn new() -> Self {
        Self {
            key_size: 0,
            value_size: 0,
            capacity: DEFAULT_CAPACITY,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            comparator: None,
            hasher: BuildDjb2,
        }
    }
}

impl<C, S> MapBuilder<C, S> {
    pub fn key_size(mut self, key_size: usize) -> Self {
        self.key_size = key_size;
        self
    }

    pub fn value_size(mut self, value_size: usize) -> Self {
        self.value_size = value_size;
        self
    }

    /// Initial number of slots.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Occupied/capacity ratio at which the next insert grows the table.
    /// Must be in `(0.0, 1.0]`.
    pub fn max_load_factor(mut self, max_load_factor: f64) -> Self {
        self.max_load_factor = max_load_factor;
        self
    }

    pub fn comparator<C2: KeyComparator>(self, comparator: C2) -> MapBuilder<C2, S> {
        MapBuilder {
            key_size: self.key_size,
            value_size: self.value_size,
            capacity: self.capacity,
            max_load_factor: self.max_load_factor,
            comparator: Some(comparator),
            hasher: self.hasher,
        }
    }

    pub fn hasher<S2: BuildHasher>(self, hasher: S2) -> MapBuilder<C, S2> {
        MapBuilder {
            key_size: self.key_size,
            value_size: self.value_size,
            capacity: self.capacity,
            max_load_factor: self.max_load_factor,
            comparator: self.comparator,
            hasher,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.key_size == 0 {
            return Err("key size must be non-zero".into());
        }
        if self.value_size == 0 {
            return Err("value size must be non-zero".into());
        }
        if self.capacity == 0 {
            return Err("capacity must be non-zero".into());
        }
        if !(self.max_load_factor > 0.0 && self.max_load_factor <= 1.0) {
            return Err(format!(
                "max load factor must be in (0, 1], got {}",
                self.max_load_factor
            )
            .into());
        }
        Ok(())
    }
}

impl<C, S> MapBuilder<C, S>
where
    C: KeyComparator,
    S: BuildHasher,
{
    /// Validates the parameters and allocates the table. Nothing is allocated on failure.
    pub fn build(self) -> Result<BlobMap<C, S>> {
        self.validate()?;
        let comparator = self.comparator.ok_or(MapError::MissingComparator)?;
        BlobMap::from_parts(
            self.key_size,
            self.value_size,
            self.capacity,
            self.max_load_factor,
            comparator,
            self.hasher,
        )
    }
}
