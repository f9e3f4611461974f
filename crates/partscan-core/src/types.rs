//! Core types for decoded partition tables

use crate::registry::{self, TypeLabel};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Raw partition type identifier
///
/// MBR entries carry a single system ID byte; GPT entries carry a type GUID.
/// The value is kept exactly as read from disk whether or not the registry
/// knows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeCode {
    /// MBR system ID byte
    Mbr(u8),
    /// GPT partition type GUID
    Gpt(Uuid),
}

impl TypeCode {
    /// True when this code marks an unused slot
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Mbr(code) => *code == 0,
            Self::Gpt(guid) => guid.is_nil(),
        }
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mbr(code) => write!(f, "0x{:02X}", code),
            Self::Gpt(guid) => write!(f, "{}", guid.hyphenated()),
        }
    }
}

/// A single occupied partition table slot
///
/// Both decoders produce this type. Records are plain values: they own their
/// data and hold nothing back from the buffer or stream they came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionRecord {
    index: usize,
    start_sector: u64,
    end_sector: u64,
    type_code: TypeCode,
    name: Option<String>,
}

impl PartitionRecord {
    /// Create a record for an MBR slot
    pub fn mbr(index: usize, start_sector: u64, end_sector: u64, type_code: u8) -> Self {
        Self {
            index,
            start_sector,
            end_sector,
            type_code: TypeCode::Mbr(type_code),
            name: None,
        }
    }

    /// Create a record for a GPT entry
    pub fn gpt(
        index: usize,
        start_sector: u64,
        end_sector: u64,
        type_guid: Uuid,
        name: String,
    ) -> Self {
        Self {
            index,
            start_sector,
            end_sector,
            type_code: TypeCode::Gpt(type_guid),
            name: Some(name),
        }
    }

    /// Physical slot number within the table
    pub fn index(&self) -> usize {
        self.index
    }

    /// First sector (inclusive)
    pub fn start_sector(&self) -> u64 {
        self.start_sector
    }

    /// Last sector (inclusive)
    pub fn end_sector(&self) -> u64 {
        self.end_sector
    }

    /// Raw partition type
    pub fn type_code(&self) -> TypeCode {
        self.type_code
    }

    /// Partition name, GPT only
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Number of sectors covered, or 0 when the range is inverted
    pub fn sector_count(&self) -> u64 {
        if self.end_sector >= self.start_sector {
            (self.end_sector - self.start_sector).saturating_add(1)
        } else {
            0
        }
    }

    /// Byte offset of the first sector, `None` on overflow
    pub fn byte_offset(&self, sector_size: u32) -> Option<u64> {
        self.start_sector.checked_mul(sector_size as u64)
    }

    /// Length in bytes, `None` on overflow
    pub fn byte_length(&self, sector_size: u32) -> Option<u64> {
        self.sector_count().checked_mul(sector_size as u64)
    }

    /// Resolve the type code against the registry
    pub fn type_label(&self) -> TypeLabel {
        match self.type_code {
            TypeCode::Mbr(code) => registry::mbr_type_label(code),
            TypeCode::Gpt(_) => TypeLabel::Unrecognized,
        }
    }
}

impl fmt::Display for PartitionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Partition {} [{} {}] sectors {}..={}",
            self.index,
            self.type_code,
            self.type_label(),
            self.start_sector,
            self.end_sector
        )?;
        if let Some(ref name) = self.name {
            if !name.is_empty() {
                write!(f, " \"{}\"", name)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mbr_record() {
        let record = PartitionRecord::mbr(2, 2048, 3047, 0x83);
        assert_eq!(record.index(), 2);
        assert_eq!(record.start_sector(), 2048);
        assert_eq!(record.end_sector(), 3047);
        assert_eq!(record.type_code(), TypeCode::Mbr(0x83));
        assert!(record.name().is_none());
        assert_eq!(record.sector_count(), 1000);
        assert_eq!(record.type_label(), TypeLabel::Known("Linux"));
    }

    #[test]
    fn test_inverted_range_has_no_sectors() {
        let record = PartitionRecord::mbr(0, 0, u64::MAX, 0x83);
        assert_eq!(record.sector_count(), u64::MAX);

        let record = PartitionRecord::mbr(0, 100, 99, 0x83);
        assert_eq!(record.sector_count(), 0);
    }

    #[test]
    fn test_byte_offsets() {
        let record = PartitionRecord::mbr(0, 2048, 4095, 0x0C);
        assert_eq!(record.byte_offset(512), Some(2048 * 512));
        assert_eq!(record.byte_length(512), Some(2048 * 512));
        assert_eq!(record.byte_length(4096), Some(2048 * 4096));

        let record = PartitionRecord::mbr(0, u64::MAX / 2, u64::MAX / 2, 0x0C);
        assert_eq!(record.byte_offset(512), None);
    }

    #[test]
    fn test_gpt_record() {
        let guid = Uuid::parse_str("c12a7328-f81f-11d2-ba4b-00a0c93ec93b").unwrap();
        let record = PartitionRecord::gpt(4, 2048, 206847, guid, "EFI System".to_string());
        assert_eq!(record.name(), Some("EFI System"));
        assert_eq!(record.type_code(), TypeCode::Gpt(guid));
        assert_eq!(record.type_label(), TypeLabel::Unrecognized);
        assert_eq!(
            record.to_string(),
            "Partition 4 [c12a7328-f81f-11d2-ba4b-00a0c93ec93b unrecognized] sectors 2048..=206847 \"EFI System\""
        );
    }

    #[test]
    fn test_type_code_display_and_empty() {
        assert_eq!(TypeCode::Mbr(0x0c).to_string(), "0x0C");
        assert!(TypeCode::Mbr(0).is_empty());
        assert!(TypeCode::Gpt(Uuid::nil()).is_empty());
        assert!(!TypeCode::Mbr(0xEE).is_empty());
    }

    #[test]
    fn test_record_serializes() {
        let record = PartitionRecord::mbr(0, 63, 1023, 0x07);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["index"], 0);
        assert_eq!(json["start_sector"], 63);
        assert_eq!(json["type_code"]["mbr"], 7);
        assert!(json["name"].is_null());

        let back: PartitionRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
