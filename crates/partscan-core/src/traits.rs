//! Core traits for partition table decoding

use crate::types::PartitionRecord;
use std::io::{Read, Seek};

/// Trait for decoded partition tables
pub trait PartitionTable: Send + Sync {
    /// Get a human-readable identifier for this partition table scheme
    fn identify(&self) -> &str;

    /// Get all occupied entries, in physical slot order
    fn records(&self) -> &[PartitionRecord];

    /// Get the record for a physical slot number
    ///
    /// Empty slots are never recorded, so this looks up by `index` rather
    /// than by position.
    fn get_record(&self, index: usize) -> Option<&PartitionRecord> {
        self.records().iter().find(|r| r.index() == index)
    }
}

/// Combined trait for Read + Seek
pub trait ReadSeek: Read + Seek + Send {}

/// Blanket implementation for any type that implements Read + Seek
impl<T: Read + Seek + Send> ReadSeek for T {}
