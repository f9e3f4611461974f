//! GPT header and partition entry layouts

use partscan_core::{Error, Result};
use uuid::Uuid;

fn le_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn le_u64(bytes: &[u8], at: usize) -> u64 {
    u64::from_le_bytes([
        bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3],
        bytes[at + 4], bytes[at + 5], bytes[at + 6], bytes[at + 7],
    ])
}

/// Decode a GUID stored in the GPT mixed-endian layout
///
/// The first three fields are little-endian, the last eight bytes are stored
/// as-is.
pub fn guid_from_bytes(bytes: &[u8]) -> Uuid {
    let mut raw = [0u8; 16];
    raw.copy_from_slice(&bytes[..16]);
    Uuid::from_bytes_le(raw)
}

/// GPT partition entry
///
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       16    Partition type GUID
/// 16      16    Unique partition GUID   (not surfaced)
/// 32      8     First LBA
/// 40      8     Last LBA (inclusive)
/// 48      8     Attribute flags         (not surfaced)
/// 56      72    Partition name (UTF-16LE)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GptPartitionEntry {
    /// Partition type GUID
    pub partition_type_guid: Uuid,
    /// First LBA (inclusive)
    pub first_lba: u64,
    /// Last LBA (inclusive)
    pub last_lba: u64,
    /// Partition name, cut at the first null code unit
    pub name: String,
}

impl GptPartitionEntry {
    /// Size of the fixed entry layout in bytes
    pub const ENTRY_SIZE: usize = 128;

    const NAME_OFFSET: usize = 56;
    const NAME_SIZE: usize = 72;

    /// Parse a partition entry from bytes
    ///
    /// Entries larger than 128 bytes are accepted; the extra bytes are ignored.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::ENTRY_SIZE {
            return Err(Error::malformed_header(format!(
                "partition entry is {} bytes, layout needs {}",
                bytes.len(),
                Self::ENTRY_SIZE
            )));
        }

        Ok(Self {
            partition_type_guid: guid_from_bytes(&bytes[0..16]),
            first_lba: le_u64(bytes, 32),
            last_lba: le_u64(bytes, 40),
            name: Self::parse_name(&bytes[Self::NAME_OFFSET..Self::NAME_OFFSET + Self::NAME_SIZE]),
        })
    }

    /// Check if this entry is unused
    pub fn is_unused(&self) -> bool {
        self.partition_type_guid.is_nil()
    }

    /// Parse UTF-16LE partition name from bytes
    fn parse_name(bytes: &[u8]) -> String {
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .take_while(|&unit| unit != 0)
            .collect();

        String::from_utf16_lossy(&units)
    }
}

/// GPT header
///
/// Only the entry-array location, count and size are needed to decode a
/// table. The remaining fields are kept for inspection and for the opt-in
/// signature and checksum checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GptHeader {
    /// Header signature, "EFI PART" on a valid disk
    pub signature: [u8; 8],
    /// GPT revision (usually 0x00010000)
    pub revision: u32,
    /// Header size in bytes (usually 92)
    pub header_size: u32,
    /// CRC32 checksum of header
    pub header_crc32: u32,
    /// Current LBA (location of this header)
    pub current_lba: u64,
    /// Backup LBA (location of backup header)
    pub backup_lba: u64,
    /// First usable LBA for partitions
    pub first_usable_lba: u64,
    /// Last usable LBA for partitions
    pub last_usable_lba: u64,
    /// Disk GUID
    pub disk_guid: Uuid,
    /// Starting LBA of partition entries
    pub partition_entries_lba: u64,
    /// Number of partition entries
    pub num_partition_entries: u32,
    /// Size of each partition entry
    pub partition_entry_size: u32,
    /// CRC32 of partition entries array
    pub partition_entries_crc32: u32,
}

impl GptHeader {
    /// GPT header signature
    pub const SIGNATURE: &'static [u8; 8] = b"EFI PART";

    /// Bytes covered by the standard header fields
    pub const HEADER_SIZE: usize = 92;

    /// Parse GPT header fields from a header block
    ///
    /// The signature is read but not checked.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::HEADER_SIZE {
            return Err(Error::truncated(format!(
                "GPT header block is {} bytes, needs {}",
                bytes.len(),
                Self::HEADER_SIZE
            )));
        }

        let mut signature = [0u8; 8];
        signature.copy_from_slice(&bytes[0..8]);

        Ok(Self {
            signature,
            revision: le_u32(bytes, 8),
            header_size: le_u32(bytes, 12),
            header_crc32: le_u32(bytes, 16),
            current_lba: le_u64(bytes, 24),
            backup_lba: le_u64(bytes, 32),
            first_usable_lba: le_u64(bytes, 40),
            last_usable_lba: le_u64(bytes, 48),
            disk_guid: guid_from_bytes(&bytes[56..72]),
            partition_entries_lba: le_u64(bytes, 72),
            num_partition_entries: le_u32(bytes, 80),
            partition_entry_size: le_u32(bytes, 84),
            partition_entries_crc32: le_u32(bytes, 88),
        })
    }

    /// Check the "EFI PART" signature
    pub fn has_valid_signature(&self) -> bool {
        &self.signature == Self::SIGNATURE
    }

    /// Verify the header CRC32 checksum
    ///
    /// The checksum covers `header_size` bytes of the header block with the
    /// CRC32 field itself zeroed.
    pub fn verify_header_crc32(&self, header_bytes: &[u8]) -> bool {
        let size = self.header_size as usize;
        if size < Self::HEADER_SIZE || header_bytes.len() < size {
            return false;
        }

        let mut header_for_crc = header_bytes[..size].to_vec();
        header_for_crc[16..20].fill(0);

        crc32fast::hash(&header_for_crc) == self.header_crc32
    }

    /// Verify the partition entries array CRC32 checksum
    pub fn verify_partition_entries_crc32(&self, partition_entries_bytes: &[u8]) -> bool {
        let expected_size =
            self.num_partition_entries as usize * self.partition_entry_size as usize;

        if partition_entries_bytes.len() < expected_size {
            return false;
        }

        crc32fast::hash(&partition_entries_bytes[..expected_size]) == self.partition_entries_crc32
    }
}
