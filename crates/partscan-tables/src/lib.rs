//! # partscan tables
//!
//! Partition table decoders.
//!
//! - **MBR**: Master Boot Record, four primary slots in the boot sector
//! - **GPT**: GUID Partition Table, header at LBA 1 plus an entry array
//!
//! Both produce [`PartitionRecord`]s in physical slot order, skipping unused
//! slots. Neither checks signatures or checksums unless asked to through
//! [`GptPartitionTable::parse_verified`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use partscan_tables::{parse_gpt, parse_mbr, DEFAULT_SECTOR_SIZE};
//! use std::fs::File;
//! use std::io::Read;
//!
//! let mut file = File::open("disk.img").unwrap();
//! let mut sector = [0u8; 512];
//! file.read_exact(&mut sector).unwrap();
//!
//! for record in parse_mbr(&sector).unwrap() {
//!     println!("{}", record);
//! }
//! for record in parse_gpt(&mut file, DEFAULT_SECTOR_SIZE).unwrap() {
//!     println!("{}", record);
//! }
//! ```

pub mod gpt;
pub mod mbr;

pub use gpt::GptPartitionTable;
pub use mbr::MbrPartitionTable;
pub use partscan_core::registry;
pub use partscan_core::{
    Error, PartitionRecord, PartitionTable, ReadSeek, Result, TypeCode, TypeLabel,
    DEFAULT_SECTOR_SIZE,
};

/// Decode the four primary MBR slots of a boot sector
pub fn parse_mbr(bytes: &[u8]) -> Result<Vec<PartitionRecord>> {
    MbrPartitionTable::parse(bytes).map(MbrPartitionTable::into_records)
}

/// Decode the GPT entry array of a disk image
///
/// Pass [`DEFAULT_SECTOR_SIZE`] unless the image uses larger logical sectors.
pub fn parse_gpt(stream: &mut dyn ReadSeek, sector_size: u32) -> Result<Vec<PartitionRecord>> {
    GptPartitionTable::parse(stream, sector_size).map(GptPartitionTable::into_records)
}
