use std::fmt;
use std::hash::BuildHasher;

use log::{debug, trace};

use crate::compare::KeyComparator;
use crate::config::MapBuilder;
use crate::error::{MapError, Result};
use crate::hash::{BuildDjb2, hash_bytes};
use crate::table::{Probe, SlotTable, Status};

/// Entry API for the BlobMap, similar to std::collections::HashMap
pub enum MapEntry<'a, C, S = BuildDjb2> {
    Occupied(OccupiedEntry<'a, C, S>),
    Vacant(VacantEntry<'a, C, S>),
}

/// A view into an occupied slot
pub struct OccupiedEntry<'a, C, S = BuildDjb2> {
    map: &'a mut BlobMap<C, S>,
    slot_idx: usize,
}

/// A view into a vacant slot, already chosen for the key
pub struct VacantEntry<'a, C, S = BuildDjb2> {
    map: &'a mut BlobMap<C, S>,
    key: Vec<u8>,
    slot_idx: usize,
}

/// This is an open address hash map over fixed-size byte blobs.
/// Every key is exactly `key_size` bytes and every value exactly
/// `value_size` bytes; both are copied into one contiguous slot table.
/// Collisions are resolved by linear probing, removals leave tombstones,
/// and the table doubles once the occupied count reaches the load factor.
/// Key equality comes from the injected `KeyComparator`, the slot index
/// from the `BuildHasher` (djb2 by default).
pub struct BlobMap<C, S = BuildDjb2> {
    table: SlotTable,
    key_size: usize,
    value_size: usize,
    size: usize,
    tombstones: usize,
    max_load_factor: f64,
    comparator: C,
    hasher: S,
}

impl BlobMap<crate::compare::Bytewise, BuildDjb2> {
    /// Starts a [`MapBuilder`] with the default load factor and hasher.
    pub fn builder() -> MapBuilder {
        MapBuilder::new()
    }
}

impl<C: KeyComparator> BlobMap<C, BuildDjb2> {
    /// Creates a map with `capacity` empty slots, djb2 hashing and a 0.7 load factor.
    pub fn new(key_size: usize, value_size: usize, capacity: usize, comparator: C) -> Result<Self> {
        MapBuilder::new()
            .key_size(key_size)
            .value_size(value_size)
            .capacity(capacity)
            .comparator(comparator)
            .build()
    }
}

impl<C, S> BlobMap<C, S>
where
    C: KeyComparator,
    S: BuildHasher,
{
    pub(crate) fn from_parts(
        key_size: usize,
        value_size: usize,
        capacity: usize,
        max_load_factor: f64,
        comparator: C,
        hasher: S,
    ) -> Result<Self> {
        let table = SlotTable::try_new(capacity, key_size, value_size)?;
        trace!(
            "allocated blob map: capacity={capacity} key_size={key_size} value_size={value_size}"
        );
        Ok(Self {
            table,
            key_size,
            value_size,
            size: 0,
            tombstones: 0,
            max_load_factor,
            comparator,
            hasher,
        })
    }

    /// Returns the number of key-value pairs in the map
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if the map contains no elements
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the current number of slots
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn key_size(&self) -> usize {
        self.key_size
    }

    pub fn value_size(&self) -> usize {
        self.value_size
    }

    pub fn max_load_factor(&self) -> f64 {
        self.max_load_factor
    }

    /// Number of `Deleted` slots waiting for reuse or the next rehash
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// True once [`destroy`](Self::destroy) released the table
    pub fn is_destroyed(&self) -> bool {
        self.table.capacity() == 0
    }

    /// Bytes held by the slot table
    pub fn memory_usage(&self) -> usize {
        self.table.allocated_bytes()
    }

    /// Returns the load factor of the map (size / capacity)
    pub fn load_factor(&self) -> f64 {
        if self.capacity() == 0 {
            return 0.0;
        }
        self.size as f64 / self.capacity() as f64
    }

    /// Tombstones are not counted: only live entries push towards a resize.
    fn should_resize(&self) -> bool {
        self.size as f64 >= self.capacity() as f64 * self.max_load_factor
    }

    fn check_key(&self, key: &[u8]) -> Result<()> {
        if key.len() != self.key_size {
            return Err(MapError::KeySize {
                expected: self.key_size,
                actual: key.len(),
            });
        }
        Ok(())
    }

    fn check_value(&self, value: &[u8]) -> Result<()> {
        if value.len() != self.value_size {
            return Err(MapError::ValueSize {
                expected: self.value_size,
                actual: value.len(),
            });
        }
        Ok(())
    }

    fn start_index(&self, key: &[u8], capacity: usize) -> usize {
        (hash_bytes(&self.hasher, key) % capacity as u64) as usize
    }

    fn find_slot(&self, key: &[u8]) -> Probe {
        if self.is_destroyed() {
            return Probe::Full;
        }
        let start = self.start_index(key, self.capacity());
        self.table.probe(start, key, &self.comparator)
    }

    /// Resizes if needed, then probes. Never returns `Probe::Full`.
    fn reserve_slot(&mut self, key: &[u8]) -> Result<Probe> {
        if self.is_destroyed() {
            return Err(MapError::Destroyed);
        }
        if self.should_resize() {
            self.grow()?;
        }

        match self.find_slot(key) {
            Probe::Full => {
                // only reachable with a load factor of 1.0 and no tombstones
                self.grow()?;
                match self.find_slot(key) {
                    Probe::Full => Err(MapError::CapacityOverflow),
                    probe => Ok(probe),
                }
            }
            probe => Ok(probe),
        }
    }

    fn grow(&mut self) -> Result<()> {
        let new_capacity = self
            .capacity()
            .checked_mul(2)
            .ok_or(MapError::CapacityOverflow)?;
        self.rehash(new_capacity)
    }

    /// Rebuilds the table at `new_capacity`. The new table is fully populated
    /// before it replaces the old one, so a failed allocation leaves the map as it was.
    fn rehash(&mut self, new_capacity: usize) -> Result<()> {
        let old_capacity = self.capacity();
        let mut new_table = SlotTable::try_new(new_capacity, self.key_size, self.value_size)?;
        let mut live = 0;

        for i in self.table.occupied() {
            let key = self.table.key(i);
            let value = self.table.value(i);
            let start = self.start_index(key, new_capacity);
            match new_table.probe(start, key, &self.comparator) {
                Probe::Vacant(slot) => {
                    new_table.occupy(slot, key, value);
                    live += 1;
                }
                // the comparator merged two stored keys; keep the later value
                Probe::Found(slot) => new_table.value_mut(slot).copy_from_slice(value),
                Probe::Full => return Err(MapError::CapacityOverflow),
            }
        }

        debug!(
            "rehashed blob map: capacity {old_capacity} -> {new_capacity}, {live} live entries, {} tombstones dropped",
            self.tombstones
        );

        self.table = new_table;
        self.size = live;
        self.tombstones = 0;
        Ok(())
    }

    fn occupy(&mut self, slot_idx: usize, key: &[u8], value: &[u8]) {
        if self.table.status(slot_idx) == Status::Deleted {
            self.tombstones -= 1;
        }
        self.table.occupy(slot_idx, key, value);
        self.size += 1;
    }

    fn vacate(&mut self, slot_idx: usize) {
        self.table.vacate(slot_idx);
        self.size -= 1;
        self.tombstones += 1;
    }

    /// Insert a key-value pair into the map, returning the previous value if the key existed.
    ///
    /// The whole probe path is scanned to rule out an existing match before a
    /// new key takes the first `Empty` or `Deleted` slot on that path.
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<Option<Vec<u8>>> {
        self.check_key(key)?;
        self.check_value(value)?;

        match self.reserve_slot(key)? {
            Probe::Found(slot_idx) => {
                let slot = self.table.value_mut(slot_idx);
                let old = slot.to_vec();
                slot.copy_from_slice(value);
                Ok(Some(old))
            }
            Probe::Vacant(slot_idx) => {
                self.occupy(slot_idx, key, value);
                Ok(None)
            }
            Probe::Full => Err(MapError::CapacityOverflow),
        }
    }

    /// Get a value by key
    pub fn get(&self, key: &[u8]) -> Result<Option<&[u8]>> {
        self.check_key(key)?;
        match self.find_slot(key) {
            Probe::Found(slot_idx) => Ok(Some(self.table.value(slot_idx))),
            _ => Ok(None),
        }
    }

    /// Get an owned copy of the value stored under `key`
    pub fn get_owned(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.get(key)?.map(<[u8]>::to_vec))
    }

    /// Get a mutable view of the value stored under `key`
    pub fn get_mut(&mut self, key: &[u8]) -> Result<Option<&mut [u8]>> {
        self.check_key(key)?;
        match self.find_slot(key) {
            Probe::Found(slot_idx) => Ok(Some(self.table.value_mut(slot_idx))),
            _ => Ok(None),
        }
    }

    pub fn contains_key(&self, key: &[u8]) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Removes `key`, leaving a tombstone in its slot. Returns false when the key was absent.
    #[doc(alias = "delete")]
    pub fn remove(&mut self, key: &[u8]) -> Result<bool> {
        self.check_key(key)?;
        match self.find_slot(key) {
            Probe::Found(slot_idx) => {
                self.vacate(slot_idx);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Removes `key` and returns its value
    pub fn take(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.check_key(key)?;
        match self.find_slot(key) {
            Probe::Found(slot_idx) => {
                let value = self.table.value(slot_idx).to_vec();
                self.vacate(slot_idx);
                Ok(Some(value))
            }
            _ => Ok(None),
        }
    }

    /// Grows the table so that `additional` more keys fit without a resize.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        if self.is_destroyed() {
            return Err(MapError::Destroyed);
        }
        let needed = self
            .size
            .checked_add(additional)
            .ok_or(MapError::CapacityOverflow)?;

        let mut new_capacity = self.capacity();
        while needed as f64 > new_capacity as f64 * self.max_load_factor {
            new_capacity = new_capacity
                .checked_mul(2)
                .ok_or(MapError::CapacityOverflow)?;
        }

        if new_capacity != self.capacity() {
            self.rehash(new_capacity)?;
        }
        Ok(())
    }

    /// Get an entry for the given key, allowing for efficient insertion/access patterns
    pub fn entry(&mut self, key: &[u8]) -> Result<MapEntry<'_, C, S>> {
        self.check_key(key)?;
        match self.reserve_slot(key)? {
            Probe::Found(slot_idx) => Ok(MapEntry::Occupied(OccupiedEntry {
                map: self,
                slot_idx,
            })),
            Probe::Vacant(slot_idx) => Ok(MapEntry::Vacant(VacantEntry {
                map: self,
                key: key.to_vec(),
                slot_idx,
            })),
            Probe::Full => Err(MapError::CapacityOverflow),
        }
    }
}

impl<C, S> BlobMap<C, S> {
    /// Empties every slot, keeping the current capacity
    pub fn clear(&mut self) {
        self.table.clear();
        self.size = 0;
        self.tombstones = 0;
    }

    /// Releases the table. The map stays usable for lookups (always absent)
    /// but rejects inserts. Calling it again is a no-op.
    pub fn destroy(&mut self) {
        if self.table.capacity() == 0 {
            return;
        }
        trace!(
            "destroying blob map: capacity={} live={}",
            self.table.capacity(),
            self.size
        );
        self.table = SlotTable::unallocated(self.key_size, self.value_size);
        self.size = 0;
        self.tombstones = 0;
    }

    /// Iterates over live `(key, value)` pairs in slot order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            table: &self.table,
            next: 0,
            remaining: self.size,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.iter().map(|(_, v)| v)
    }
}

/// Iterator over the live entries of a [`BlobMap`].
pub struct Iter<'a> {
    table: &'a SlotTable,
    next: usize,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a [u8], &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.table.capacity() {
            let i = self.next;
            self.next += 1;
            if self.table.control(i).is_occupied() {
                self.remaining -= 1;
                return Some((self.table.key(i), self.table.value(i)));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a, C, S> IntoIterator for &'a BlobMap<C, S> {
    type Item = (&'a [u8], &'a [u8]);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<C, S> fmt::Debug for BlobMap<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, C, S> MapEntry<'a, C, S>
where
    C: KeyComparator,
    S: BuildHasher,
{
    pub fn key(&self) -> &[u8] {
        match self {
            MapEntry::Occupied(entry) => entry.key(),
            MapEntry::Vacant(entry) => entry.key(),
        }
    }

    /// Inserts `default` if the entry is vacant, returning the stored value either way
    pub fn or_insert(self, default: &[u8]) -> Result<&'a mut [u8]> {
        match self {
            MapEntry::Occupied(entry) => Ok(entry.into_mut()),
            MapEntry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the value returned by the closure if the entry is vacant
    pub fn or_insert_with<F>(self, f: F) -> Result<&'a mut [u8]>
    where
        F: FnOnce() -> Vec<u8>,
    {
        match self {
            MapEntry::Occupied(entry) => Ok(entry.into_mut()),
            MapEntry::Vacant(entry) => entry.insert(&f()),
        }
    }
}

impl<'a, C, S> OccupiedEntry<'a, C, S>
where
    C: KeyComparator,
    S: BuildHasher,
{
    /// The key as stored in the table
    pub fn key(&self) -> &[u8] {
        self.map.table.key(self.slot_idx)
    }

    /// Get a reference to the value in the entry
    pub fn get(&self) -> &[u8] {
        self.map.table.value(self.slot_idx)
    }

    pub fn get_mut(&mut self) -> &mut [u8] {
        self.map.table.value_mut(self.slot_idx)
    }

    pub fn into_mut(self) -> &'a mut [u8] {
        self.map.table.value_mut(self.slot_idx)
    }

    /// Overwrite the value in place, returning the old value
    pub fn insert(&mut self, value: &[u8]) -> Result<Vec<u8>> {
        self.map.check_value(value)?;
        let slot = self.map.table.value_mut(self.slot_idx);
        let old = slot.to_vec();
        slot.copy_from_slice(value);
        Ok(old)
    }

    /// Remove the entry, leaving a tombstone, and return its value
    pub fn remove(self) -> Vec<u8> {
        let value = self.map.table.value(self.slot_idx).to_vec();
        self.map.vacate(self.slot_idx);
        value
    }
}

impl<'a, C, S> VacantEntry<'a, C, S>
where
    C: KeyComparator,
    S: BuildHasher,
{
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Insert the value into the vacant slot, returning a mutable view of it
    pub fn insert(self, value: &[u8]) -> Result<&'a mut [u8]> {
        self.map.check_value(value)?;
        let VacantEntry { map, key, slot_idx } = self;
        map.occupy(slot_idx, &key, value);
        Ok(map.table.value_mut(slot_idx))
    }
}
