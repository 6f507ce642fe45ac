use bytemuck::{Pod, Zeroable};
use modular_bitfield::prelude::B6;
use modular_bitfield::{Specifier, bitfield};

/// Lifecycle state of a slot. The all-zero byte decodes as `Empty`, so a
/// zeroed allocation is a table of empty slots.
#[derive(Specifier, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Empty,
    Occupied,
    Deleted,
    /// Never written; keeps every 2-bit pattern decodable.
    Reserved,
}

/// One control byte at the head of every slot.
#[bitfield(bits = 8)]
#[derive(Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct Control {
    #[bits = 2]
    pub status: Status,
    #[skip]
    __: B6,
}

impl Control {
    pub fn occupied() -> Self {
        Control::new().with_status(Status::Occupied)
    }

    pub fn deleted() -> Self {
        Control::new().with_status(Status::Deleted)
    }

    pub fn is_occupied(&self) -> bool {
        self.status() == Status::Occupied
    }

    pub fn is_empty(&self) -> bool {
        self.status() == Status::Empty
    }

    pub fn is_deleted(&self) -> bool {
        self.status() == Status::Deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_is_empty() {
        let ctrl: Control = bytemuck::cast(0u8);
        assert!(ctrl.is_empty());
        assert_eq!(ctrl.status(), Status::Empty);
    }

    #[test]
    fn test_control_is_one_byte() {
        assert_eq!(std::mem::size_of::<Control>(), 1);
        assert_eq!(std::mem::align_of::<Control>(), 1);
    }

    #[test]
    fn test_states_round_trip_through_bytes() {
        let byte: u8 = bytemuck::cast(Control::occupied());
        let back: Control = bytemuck::cast(byte);
        assert!(back.is_occupied());

        let byte: u8 = bytemuck::cast(Control::deleted());
        let back: Control = bytemuck::cast(byte);
        assert!(back.is_deleted());
        assert!(!back.is_empty());
    }
}
