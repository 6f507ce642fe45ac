use std::collections::TryReserveError;
use thiserror::Error;

/// Errors that can occur when building or mutating a blob map
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// Invalid construction parameters (zero sizes, zero capacity, bad load factor)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The builder was finished without a key comparator
    #[error("No key comparator was supplied")]
    MissingComparator,

    /// A key blob does not match the configured key size
    #[error("Key size mismatch: expected {expected} bytes, got {actual}")]
    KeySize { expected: usize, actual: usize },

    /// A value blob does not match the configured value size
    #[error("Value size mismatch: expected {expected} bytes, got {actual}")]
    ValueSize { expected: usize, actual: usize },

    /// Slot count or table byte size does not fit in usize
    #[error("Map capacity exceeded")]
    CapacityOverflow,

    /// The allocator refused the table allocation
    #[error("Allocation failed: {0}")]
    Alloc(#[from] TryReserveError),

    /// The map was destroyed and no longer owns a table
    #[error("Map has been destroyed")]
    Destroyed,
}

pub type Result<T> = std::result::Result<T, MapError>;

impl From<String> for MapError {
    fn from(msg: String) -> Self {
        MapError::InvalidArgument(msg)
    }
}

impl From<&str> for MapError {
    fn from(msg: &str) -> Self {
        MapError::InvalidArgument(msg.to_string())
    }
}
