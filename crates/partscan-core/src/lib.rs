//! # partscan core
//!
//! Shared types, traits and error handling for the partscan decoders.
//!
//! - [`PartitionRecord`]: the normalized output of every decoder
//! - [`TypeCode`]: raw MBR system ID or GPT type GUID
//! - [`registry`]: the DOS partition type label table
//! - [`PartitionTable`]: common view over a decoded table
//!
//! ## Example
//!
//! ```rust
//! use partscan_core::{PartitionRecord, TypeLabel};
//!
//! let record = PartitionRecord::mbr(0, 2048, 3047, 0x83);
//! assert_eq!(record.sector_count(), 1000);
//! assert_eq!(record.type_label(), TypeLabel::Known("Linux"));
//! ```

pub mod error;
pub mod registry;
pub mod security;
pub mod stream;
pub mod traits;
pub mod types;

// Re-export commonly used items
pub use error::{Error, Result};
pub use registry::{mbr_type_label, TypeLabel};
pub use security::DEFAULT_SECTOR_SIZE;
pub use traits::{PartitionTable, ReadSeek};
pub use types::{PartitionRecord, TypeCode};
