//! MBR partition entry layout

/// One 16-byte MBR partition entry
///
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0x0     1     Bootable flag          (not decoded)
/// 0x1     3     Starting CHS address   (not decoded)
/// 0x4     1     Partition type
/// 0x5     3     Ending CHS address     (not decoded)
/// 0x8     4     Starting LBA
/// 0xC     4     Size in sectors
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MbrPartitionEntry {
    /// System ID byte
    pub partition_type: u8,
    /// First sector, as stored
    pub start_lba: u32,
    /// Sector count, as stored
    pub sector_count: u32,
}

impl MbrPartitionEntry {
    /// Size of a partition entry in bytes
    pub const ENTRY_SIZE: usize = 16;

    const TYPE_OFFSET: usize = 4;
    const START_LBA_OFFSET: usize = 8;
    const SECTOR_COUNT_OFFSET: usize = 12;

    /// Parse a partition entry from its 16 bytes
    pub fn from_bytes(bytes: &[u8; 16]) -> Self {
        let le_u32 = |at: usize| {
            u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };

        Self {
            partition_type: bytes[Self::TYPE_OFFSET],
            start_lba: le_u32(Self::START_LBA_OFFSET),
            sector_count: le_u32(Self::SECTOR_COUNT_OFFSET),
        }
    }

    /// Unused slots have a zero type byte
    pub fn is_unused(&self) -> bool {
        self.partition_type == 0
    }

    pub fn start_sector(&self) -> u64 {
        self.start_lba as u64
    }

    /// Last sector (inclusive): `start + count - 1`
    ///
    /// Computed with wrapping arithmetic. A zero count yields `start - 1`, and
    /// `u64::MAX` when the start is also zero; such a range only comes from a
    /// malformed entry.
    pub fn end_sector(&self) -> u64 {
        (self.start_lba as u64 + self.sector_count as u64).wrapping_sub(1)
    }
}
