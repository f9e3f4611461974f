//! GPT (GUID Partition Table) decoder

pub mod types;

use partscan_core::stream::{read_exact_at, stream_length};
use partscan_core::{security, Error, PartitionRecord, PartitionTable, ReadSeek, Result};
use tracing::debug;
use types::{GptHeader, GptPartitionEntry};
use uuid::Uuid;

/// GPT partition table
///
/// The GUID Partition Table is the partitioning scheme used by UEFI systems.
/// Its header sits at LBA 1 and points at an array of fixed-stride entries.
///
/// # Structure
///
/// ```text
/// LBA 0:    Protective MBR (ignored)
/// LBA 1:    Primary GPT header
/// LBA 2-33: Partition entries array (typically 128 entries)
/// LBA 34+:  Usable disk space
/// ...
/// Last 33:  Backup partition entries array (not read)
/// Last 1:   Backup GPT header (not read)
/// ```
#[derive(Debug, Clone)]
pub struct GptPartitionTable {
    records: Vec<PartitionRecord>,
    header: GptHeader,
}

impl GptPartitionTable {
    /// LBA of the primary header
    pub const HEADER_LBA: u64 = 1;

    /// Decode a GPT from a readable and seekable stream
    ///
    /// The header signature and both CRC32 fields are not checked; use
    /// [`parse_verified`](Self::parse_verified) for that. Unused entries
    /// (all-zero type GUID) are skipped and the rest keep their array index.
    ///
    /// # Arguments
    ///
    /// * `stream` - A stream over the whole disk image
    /// * `sector_size` - The logical sector size in bytes (usually 512)
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidSectorSize`] for a sector size outside 512-4096 or not a power of 2
    /// - [`Error::TruncatedInput`] if the stream ends before the header block does
    /// - [`Error::MalformedHeader`] if the entry size is zero or smaller than an
    ///   entry, if the entry array size overflows or is absurd, or if the array
    ///   lies beyond the end of the stream
    pub fn parse(stream: &mut dyn ReadSeek, sector_size: u32) -> Result<Self> {
        Self::decode(stream, sector_size).map(|(table, _, _)| table)
    }

    /// Decode a GPT and then check its signature and checksums
    ///
    /// # Errors
    ///
    /// Everything [`parse`](Self::parse) returns, plus
    /// [`Error::SignatureVerification`] when the header does not start with
    /// "EFI PART" and [`Error::ChecksumVerification`] when either CRC32 does
    /// not match.
    pub fn parse_verified(stream: &mut dyn ReadSeek, sector_size: u32) -> Result<Self> {
        let (table, header_bytes, entries_bytes) = Self::decode(stream, sector_size)?;
        let header = &table.header;

        if !header.has_valid_signature() {
            return Err(Error::SignatureVerification(format!(
                "Invalid GPT header signature: {:02X?}",
                header.signature
            )));
        }

        if !header.verify_header_crc32(&header_bytes) {
            return Err(Error::ChecksumVerification(
                "GPT header CRC32 verification failed".to_string(),
            ));
        }

        if !header.verify_partition_entries_crc32(&entries_bytes) {
            return Err(Error::ChecksumVerification(
                "GPT partition entries CRC32 verification failed".to_string(),
            ));
        }

        Ok(table)
    }

    fn decode(stream: &mut dyn ReadSeek, sector_size: u32) -> Result<(Self, Vec<u8>, Vec<u8>)> {
        security::validate_sector_size(sector_size)?;

        let header_offset = Self::HEADER_LBA * sector_size as u64;
        let mut header_bytes = vec![0u8; sector_size as usize];
        read_exact_at(stream, header_offset, &mut header_bytes, || {
            Error::truncated(format!(
                "stream ended before the {}-byte GPT header at offset {}",
                sector_size, header_offset
            ))
        })?;

        let header = GptHeader::from_bytes(&header_bytes)?;
        debug!(
            entries_lba = header.partition_entries_lba,
            entries = header.num_partition_entries,
            entry_size = header.partition_entry_size,
            "read GPT header"
        );

        let entry_size = header.partition_entry_size as usize;
        if entry_size == 0 {
            return Err(Error::malformed_header("partition entry size is zero"));
        }
        if entry_size < GptPartitionEntry::ENTRY_SIZE {
            return Err(Error::malformed_header(format!(
                "partition entry size {} is smaller than the {}-byte entry layout",
                entry_size,
                GptPartitionEntry::ENTRY_SIZE
            )));
        }

        let entries_offset = security::checked_header_product(
            header.partition_entries_lba,
            sector_size as u64,
            "partition entry array offset",
        )?;
        let entries_len = security::checked_header_product(
            header.num_partition_entries as u64,
            entry_size as u64,
            "partition entry array size",
        )?;
        let entries_len = security::validate_allocation_size(entries_len, "partition entry array")?;

        let stream_len = stream_length(stream)?;
        let entries_end = entries_offset
            .checked_add(entries_len as u64)
            .ok_or_else(|| Error::malformed_header("partition entry array end overflows"))?;
        if entries_end > stream_len {
            return Err(Error::malformed_header(format!(
                "partition entry array {}..{} extends past the end of a {}-byte stream",
                entries_offset, entries_end, stream_len
            )));
        }

        let mut entries_bytes = vec![0u8; entries_len];
        read_exact_at(stream, entries_offset, &mut entries_bytes, || {
            Error::malformed_header("stream ended inside the partition entry array")
        })?;

        let mut records = Vec::new();
        for (i, entry_bytes) in entries_bytes.chunks_exact(entry_size).enumerate() {
            let entry = GptPartitionEntry::from_bytes(entry_bytes)?;

            if entry.is_unused() {
                continue;
            }

            records.push(PartitionRecord::gpt(
                i,
                entry.first_lba,
                entry.last_lba,
                entry.partition_type_guid,
                entry.name,
            ));
        }

        debug!(partitions = records.len(), "decoded GPT");

        Ok((Self { records, header }, header_bytes, entries_bytes))
    }

    /// Consume the table, keeping only its records
    pub fn into_records(self) -> Vec<PartitionRecord> {
        self.records
    }

    /// Get the disk GUID
    pub fn disk_guid(&self) -> Uuid {
        self.header.disk_guid
    }

    /// Get the GPT header
    pub fn header(&self) -> &GptHeader {
        &self.header
    }

    /// Get the number of usable sectors on the disk
    pub fn usable_lba_count(&self) -> u64 {
        if self.header.last_usable_lba >= self.header.first_usable_lba {
            self.header.last_usable_lba - self.header.first_usable_lba + 1
        } else {
            0
        }
    }
}

impl PartitionTable for GptPartitionTable {
    fn identify(&self) -> &str {
        "GUID Partition Table"
    }

    fn records(&self) -> &[PartitionRecord] {
        &self.records
    }
}
