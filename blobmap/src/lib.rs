//! Open-addressing hash map over fixed-size byte blobs.
//!
//! ```
//! use blobmap::{BlobMap, NulTerminated};
//!
//! let mut map = BlobMap::new(4, 4, 4, NulTerminated)?;
//! map.insert(b"aaa\0", &1i32.to_le_bytes())?;
//! map.insert(b"bbb\0", &2i32.to_le_bytes())?;
//! assert_eq!(map.get(b"bbb\0")?, Some(&2i32.to_le_bytes()[..]));
//!
//! assert!(map.remove(b"bbb\0")?);
//! assert_eq!(map.get(b"bbb\0")?, None);
//! assert_eq!(map.len(), 1);
//! # Ok::<(), blobmap::MapError>(())
//! ```
pub mod compare;
pub mod config;
pub mod error;
pub mod hash;
#[cfg(test)]
mod logger;
pub mod map;
mod table;
pub mod typed;
pub use compare::{Bytewise, KeyComparator, NulTerminated};
pub use config::MapBuilder;
pub use error::{MapError, Result};
pub use hash::{BuildDjb2, Djb2Hasher, djb2};
pub use map::{BlobMap, Iter, MapEntry, OccupiedEntry, VacantEntry};
pub use typed::PodMap;
