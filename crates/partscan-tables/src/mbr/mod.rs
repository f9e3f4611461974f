//! MBR (Master Boot Record) partition table decoder

pub mod types;

use partscan_core::stream::{read_exact_at, stream_length};
use partscan_core::{registry, Error, PartitionRecord, PartitionTable, ReadSeek, Result, TypeCode};
use tracing::debug;
use types::MbrPartitionEntry;

/// MBR partition table
///
/// The Master Boot Record holds four fixed partition slots in the first sector
/// of a disk. Only primary slots are decoded; extended partitions are reported
/// as ordinary entries and the chain they point to is never read.
///
/// # Structure
///
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0x000   440   Bootstrap code
/// 0x1B8   4     Disk signature
/// 0x1BE   16    Partition entry 1
/// 0x1CE   16    Partition entry 2
/// 0x1DE   16    Partition entry 3
/// 0x1EE   16    Partition entry 4
/// 0x1FE   2     Boot signature (0xAA55, not checked)
/// ```
#[derive(Debug, Clone)]
pub struct MbrPartitionTable {
    records: Vec<PartitionRecord>,
    disk_signature: u32,
    boot_signature: Option<u16>,
}

impl MbrPartitionTable {
    /// Size of the MBR sector in bytes
    pub const MBR_SIZE: usize = 512;

    /// Bytes needed to reach the end of the last partition entry
    pub const MIN_SIZE: usize = 510;

    /// Offset of the first partition entry
    pub const PARTITION_TABLE_OFFSET: usize = 0x1BE;

    /// Offset of the disk signature
    pub const DISK_SIGNATURE_OFFSET: usize = 0x1B8;

    /// Offset of the boot signature
    pub const BOOT_SIGNATURE_OFFSET: usize = 0x1FE;

    /// Number of partition entries in MBR
    pub const NUM_PARTITIONS: usize = 4;

    /// Decode the partition table from a boot sector
    ///
    /// `bytes` is conventionally the first 512 bytes of a disk image; anything
    /// past offset 511 is ignored. Slots with a zero type byte are skipped and
    /// the remaining records keep their physical slot number.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TruncatedInput`] if fewer than 510 bytes are supplied.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::MIN_SIZE {
            return Err(Error::truncated(format!(
                "MBR needs {} bytes, got {}",
                Self::MIN_SIZE,
                bytes.len()
            )));
        }

        let disk_signature = u32::from_le_bytes([
            bytes[Self::DISK_SIGNATURE_OFFSET],
            bytes[Self::DISK_SIGNATURE_OFFSET + 1],
            bytes[Self::DISK_SIGNATURE_OFFSET + 2],
            bytes[Self::DISK_SIGNATURE_OFFSET + 3],
        ]);

        let boot_signature = bytes
            .get(Self::BOOT_SIGNATURE_OFFSET..Self::BOOT_SIGNATURE_OFFSET + 2)
            .map(|b| u16::from_le_bytes([b[0], b[1]]));

        let mut records = Vec::with_capacity(Self::NUM_PARTITIONS);

        for i in 0..Self::NUM_PARTITIONS {
            let offset = Self::PARTITION_TABLE_OFFSET + i * MbrPartitionEntry::ENTRY_SIZE;
            let mut raw = [0u8; MbrPartitionEntry::ENTRY_SIZE];
            raw.copy_from_slice(&bytes[offset..offset + MbrPartitionEntry::ENTRY_SIZE]);
            let entry = MbrPartitionEntry::from_bytes(&raw);

            if entry.is_unused() {
                debug!(slot = i, "skipping empty MBR slot");
                continue;
            }

            if registry::is_extended(entry.partition_type) {
                debug!(slot = i, kind = entry.partition_type, "extended partition chain not followed");
            }

            records.push(PartitionRecord::mbr(
                i,
                entry.start_sector(),
                entry.end_sector(),
                entry.partition_type,
            ));
        }

        debug!(partitions = records.len(), disk_signature, "decoded MBR");

        Ok(Self {
            records,
            disk_signature,
            boot_signature,
        })
    }

    /// Read the first sector of a stream and decode it
    ///
    /// Images shorter than 512 bytes are accepted as long as the partition
    /// entries themselves are present.
    pub fn from_reader(stream: &mut dyn ReadSeek) -> Result<Self> {
        let length = stream_length(stream)?;
        let wanted = length.min(Self::MBR_SIZE as u64) as usize;
        if wanted < Self::MIN_SIZE {
            return Err(Error::truncated(format!(
                "MBR needs {} bytes, stream holds {}",
                Self::MIN_SIZE,
                length
            )));
        }

        let mut sector = vec![0u8; wanted];
        read_exact_at(stream, 0, &mut sector, || {
            Error::truncated("stream ended inside the MBR")
        })?;

        Self::parse(&sector)
    }

    /// Consume the table, keeping only its records
    pub fn into_records(self) -> Vec<PartitionRecord> {
        self.records
    }

    /// Get the disk signature
    pub fn disk_signature(&self) -> u32 {
        self.disk_signature
    }

    /// Get the boot signature as stored, if the sector was long enough to hold it
    pub fn boot_signature(&self) -> Option<u16> {
        self.boot_signature
    }

    /// Check if this MBR contains a GPT protective partition
    ///
    /// A GPT protective partition indicates that this is actually a GPT disk
    /// with a protective MBR for backwards compatibility.
    pub fn is_gpt_protective(&self) -> bool {
        self.records
            .iter()
            .any(|r| matches!(r.type_code(), TypeCode::Mbr(code) if registry::is_gpt_protective(code)))
    }
}

impl PartitionTable for MbrPartitionTable {
    fn identify(&self) -> &str {
        "Master Boot Record"
    }

    fn records(&self) -> &[PartitionRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn set_entry(mbr: &mut [u8], slot: usize, kind: u8, start: u32, count: u32) {
        let entry_offset = MbrPartitionTable::PARTITION_TABLE_OFFSET + slot * 16;
        mbr[entry_offset + 4] = kind;
        mbr[entry_offset + 8..entry_offset + 12].copy_from_slice(&start.to_le_bytes());
        mbr[entry_offset + 12..entry_offset + 16].copy_from_slice(&count.to_le_bytes());
    }

    /// Create an MBR with one Linux partition in slot 0
    fn create_test_mbr() -> Vec<u8> {
        let mut mbr = vec![0u8; 512];

        // Disk signature
        mbr[0x1B8..0x1BC].copy_from_slice(&[0x12, 0x34, 0x56, 0x78]);

        // Bootable flag and CHS fields are present but never decoded
        mbr[0x1BE] = 0x80;
        mbr[0x1BF..0x1C2].copy_from_slice(&[0x20, 0x21, 0x00]);
        set_entry(&mut mbr, 0, 0x83, 2048, 1000);

        mbr[0x1FE] = 0x55;
        mbr[0x1FF] = 0xAA;

        mbr
    }

    #[test]
    fn test_parse_single_partition() {
        let table = MbrPartitionTable::parse(&create_test_mbr()).unwrap();

        assert_eq!(table.identify(), "Master Boot Record");
        assert_eq!(table.disk_signature(), 0x78563412);
        assert_eq!(table.boot_signature(), Some(0xAA55));

        let records = table.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].index(), 0);
        assert_eq!(records[0].type_code(), TypeCode::Mbr(0x83));
        assert_eq!(records[0].start_sector(), 2048);
        assert_eq!(records[0].end_sector(), 3047);
        assert!(records[0].name().is_none());
    }

    #[test]
    fn test_all_empty_slots() {
        let mut mbr = vec![0u8; 512];
        // Garbage outside the type byte does not make a slot occupied
        set_entry(&mut mbr, 1, 0x00, 63, 1000);

        let table = MbrPartitionTable::parse(&mbr).unwrap();
        assert!(table.records().is_empty());
    }

    #[test]
    fn test_boot_signature_not_checked() {
        let mut mbr = create_test_mbr();
        mbr[0x1FE] = 0x00;
        mbr[0x1FF] = 0x00;

        let table = MbrPartitionTable::parse(&mbr).unwrap();
        assert_eq!(table.boot_signature(), Some(0x0000));
        assert_eq!(table.records().len(), 1);
    }

    #[test]
    fn test_slot_order_and_gaps() {
        let mut mbr = vec![0u8; 512];
        set_entry(&mut mbr, 1, 0x07, 900_000, 100);
        set_entry(&mut mbr, 3, 0x0c, 2048, 4096);

        let table = MbrPartitionTable::parse(&mbr).unwrap();
        let indices: Vec<usize> = table.records().iter().map(|r| r.index()).collect();
        assert_eq!(indices, vec![1, 3]);
        assert_eq!(table.get_record(3).unwrap().start_sector(), 2048);
        assert!(table.get_record(0).is_none());
    }

    #[test]
    fn test_sector_count_round_trips() {
        let mut mbr = vec![0u8; 512];
        let counts = [1u32, 1000, 65536, u32::MAX];
        for (slot, &count) in counts.iter().enumerate() {
            set_entry(&mut mbr, slot, 0x83, 63 * slot as u32, count);
        }

        let table = MbrPartitionTable::parse(&mbr).unwrap();
        for (record, &count) in table.records().iter().zip(counts.iter()) {
            assert_eq!(record.end_sector() - record.start_sector() + 1, count as u64);
        }
    }

    #[test]
    fn test_zero_count_is_preserved() {
        let mut mbr = vec![0u8; 512];
        set_entry(&mut mbr, 0, 0x83, 0, 0);
        set_entry(&mut mbr, 1, 0x83, 500, 0);

        let table = MbrPartitionTable::parse(&mbr).unwrap();
        let records = table.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].start_sector(), 0);
        assert_eq!(records[0].end_sector(), u64::MAX);
        assert_eq!(records[1].end_sector(), 499);
    }

    #[test]
    fn test_extended_partition_is_plain_record() {
        let mut mbr = vec![0u8; 512];
        set_entry(&mut mbr, 0, 0x83, 2048, 2048);
        set_entry(&mut mbr, 1, 0x0f, 4096, 8192);

        let table = MbrPartitionTable::parse(&mbr).unwrap();
        assert_eq!(table.records().len(), 2);
        assert_eq!(table.records()[1].type_code(), TypeCode::Mbr(0x0f));
        assert_eq!(
            table.records()[1].type_label().as_known(),
            Some("Microsoft Extended, LBA")
        );
    }

    #[test]
    fn test_truncated_input() {
        let mbr = create_test_mbr();
        let result = MbrPartitionTable::parse(&mbr[..509]);
        assert!(matches!(result, Err(Error::TruncatedInput(_))));

        assert!(MbrPartitionTable::parse(&[]).unwrap_err().is_truncation());
    }

    #[test]
    fn test_510_bytes_is_enough() {
        let mbr = create_test_mbr();
        let table = MbrPartitionTable::parse(&mbr[..510]).unwrap();
        assert_eq!(table.records().len(), 1);
        assert_eq!(table.boot_signature(), None);
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut image = create_test_mbr();
        image.extend_from_slice(&[0xFF; 1024]);

        let table = MbrPartitionTable::parse(&image).unwrap();
        assert_eq!(table.records().len(), 1);
    }

    #[test]
    fn test_gpt_protective_detection() {
        let mut mbr = vec![0u8; 512];
        set_entry(&mut mbr, 0, 0xEE, 1, u32::MAX);

        let table = MbrPartitionTable::parse(&mbr).unwrap();
        assert!(table.is_gpt_protective());

        let table = MbrPartitionTable::parse(&create_test_mbr()).unwrap();
        assert!(!table.is_gpt_protective());
    }

    #[test]
    fn test_from_reader() {
        let mut image = create_test_mbr();
        image.resize(4096, 0);
        let mut cursor = Cursor::new(image);

        let table = MbrPartitionTable::from_reader(&mut cursor).unwrap();
        assert_eq!(table.records().len(), 1);

        let mut short = Cursor::new(vec![0u8; 200]);
        let result = MbrPartitionTable::from_reader(&mut short);
        assert!(matches!(result, Err(Error::TruncatedInput(_))));
    }

    #[test]
    fn test_parse_is_deterministic() {
        let mbr = create_test_mbr();
        let first = MbrPartitionTable::parse(&mbr).unwrap().into_records();
        let second = MbrPartitionTable::parse(&mbr).unwrap().into_records();
        assert_eq!(first, second);
    }
}
