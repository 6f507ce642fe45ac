use std::ops::Range;

use crate::compare::KeyComparator;
use crate::error::{MapError, Result};

pub mod control;

use control::Control;
pub use control::Status;

/// Outcome of walking a probe sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// Slot holding a key the comparator considers equal.
    Found(usize),
    /// Key is absent; first `Empty` or `Deleted` slot seen on the path.
    Vacant(usize),
    /// Full cycle without a match, an empty slot, or a tombstone.
    Full,
}

/// Contiguous slot storage.
///
/// Layout, one allocation of `capacity * slot_size` bytes:
///
/// [ctrl_0][key_0][value_0][ctrl_1][key_1][value_1]...
///
/// where `slot_size = 1 + key_size + value_size`. Key and value bytes of a
/// slot that is not `Occupied` are kept zeroed.
pub struct SlotTable {
    bytes: Vec<u8>,
    key_size: usize,
    value_size: usize,
    slot_size: usize,
    capacity: usize,
}

impl SlotTable {
    /// Allocates `capacity` empty slots, reporting allocation failure instead of aborting.
    pub fn try_new(capacity: usize, key_size: usize, value_size: usize) -> Result<Self> {
        let slot_size = 1usize
            .checked_add(key_size)
            .and_then(|s| s.checked_add(value_size))
            .ok_or(MapError::CapacityOverflow)?;
        let total = capacity
            .checked_mul(slot_size)
            .ok_or(MapError::CapacityOverflow)?;

        let mut bytes = Vec::new();
        bytes.try_reserve_exact(total)?;
        bytes.resize(total, 0);

        Ok(Self {
            bytes,
            key_size,
            value_size,
            slot_size,
            capacity,
        })
    }

    /// A table without slots, used once a map has been destroyed.
    pub fn unallocated(key_size: usize, value_size: usize) -> Self {
        Self {
            bytes: Vec::new(),
            key_size,
            value_size,
            slot_size: 1 + key_size + value_size,
            capacity: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes owned by the table allocation.
    pub fn allocated_bytes(&self) -> usize {
        self.bytes.len()
    }

    fn slot_start(&self, index: usize) -> usize {
        debug_assert!(index < self.capacity);
        index * self.slot_size
    }

    fn key_range(&self, index: usize) -> Range<usize> {
        let start = self.slot_start(index) + 1;
        start..start + self.key_size
    }

    fn value_range(&self, index: usize) -> Range<usize> {
        let start = self.slot_start(index) + 1 + self.key_size;
        start..start + self.value_size
    }

    fn payload_range(&self, index: usize) -> Range<usize> {
        let start = self.slot_start(index) + 1;
        start..start + self.key_size + self.value_size
    }

    pub fn control(&self, index: usize) -> Control {
        let at = self.slot_start(index);
        *bytemuck::from_bytes(&self.bytes[at..at + 1])
    }

    fn set_control(&mut self, index: usize, ctrl: Control) {
        let at = self.slot_start(index);
        *bytemuck::from_bytes_mut(&mut self.bytes[at..at + 1]) = ctrl;
    }

    pub fn status(&self, index: usize) -> Status {
        self.control(index).status()
    }

    pub fn key(&self, index: usize) -> &[u8] {
        &self.bytes[self.key_range(index)]
    }

    pub fn value(&self, index: usize) -> &[u8] {
        &self.bytes[self.value_range(index)]
    }

    pub fn value_mut(&mut self, index: usize) -> &mut [u8] {
        let range = self.value_range(index);
        &mut self.bytes[range]
    }

    /// Copies `key` and `value` into the slot and marks it occupied.
    pub fn occupy(&mut self, index: usize, key: &[u8], value: &[u8]) {
        let key_range = self.key_range(index);
        let value_range = self.value_range(index);
        self.bytes[key_range].copy_from_slice(key);
        self.bytes[value_range].copy_from_slice(value);
        self.set_control(index, Control::occupied());
    }

    /// Turns an occupied slot into a tombstone and wipes its payload.
    pub fn vacate(&mut self, index: usize) {
        let payload = self.payload_range(index);
        self.bytes[payload].fill(0);
        self.set_control(index, Control::deleted());
    }

    /// Marks every slot empty, keeping the allocation.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    /// Indices of occupied slots in slot order.
    pub fn occupied(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.capacity).filter(move |&i| self.control(i).is_occupied())
    }

    /// Number of tombstones, counted by a full scan.
    #[cfg(test)]
    pub fn count_deleted(&self) -> usize {
        (0..self.capacity)
            .filter(|&i| self.control(i).is_deleted())
            .count()
    }

    /// Linear probe from `start`, wrapping, for at most `capacity` slots.
    ///
    /// Stops at the first `Empty` slot or at a match. Tombstones never stop
    /// the scan, but the first reusable slot on the path is remembered so an
    /// insert lands there once the key is known to be absent.
    pub fn probe<C>(&self, start: usize, key: &[u8], comparator: &C) -> Probe
    where
        C: KeyComparator + ?Sized,
    {
        if self.capacity == 0 {
            return Probe::Full;
        }

        let mut reusable = None;
        let mut index = start % self.capacity;

        for _ in 0..self.capacity {
            let ctrl = self.control(index);
            if ctrl.is_empty() {
                return Probe::Vacant(reusable.unwrap_or(index));
            }

            if ctrl.is_occupied() {
                if comparator.same_key(self.key(index), key) {
                    return Probe::Found(index);
                }
            } else if ctrl.is_deleted() && reusable.is_none() {
                reusable = Some(index);
            }
            index = (index + 1) % self.capacity;
        }

        match reusable {
            Some(index) => Probe::Vacant(index),
            None => Probe::Full,
        }
    }
}
