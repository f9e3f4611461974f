//! DOS partition type registry
//!
//! Maps MBR system ID bytes to descriptive labels. The table is deliberately
//! incomplete: plenty of legacy and vendor codes exist that are not listed,
//! and looking one up reports [`TypeLabel::Unrecognized`] rather than failing.

use std::fmt;

/// DOS partition types, sorted by code
pub const DOS_PARTITION_TYPES: &[(u8, &str)] = &[
    (0x00, "Empty"),
    (0x01, "FAT12, CHS"),
    (0x04, "FAT16, 16-32 MB, CHS"),
    (0x05, "Microsoft Extended, CHS"),
    (0x06, "FAT16, 32 MB-2GB, CHS"),
    (0x07, "NTFS"),
    (0x0b, "FAT32, CHS"),
    (0x0c, "FAT32, LBA"),
    (0x0e, "FAT16, 32 MB-2GB, LBA"),
    (0x0f, "Microsoft Extended, LBA"),
    (0x11, "Hidden Fat12, CHS"),
    (0x14, "Hidden FAT16, 16-32 MB, CHS"),
    (0x16, "Hidden FAT16, 32 MB-2GB, CHS"),
    (0x1b, "Hidden FAT32, CHS"),
    (0x1c, "Hidden FAT32, LBA"),
    (0x1e, "Hidden FAT16, 32 MB-2GB, LBA"),
    (0x42, "Microsoft MBR, Dynamic Disk"),
    (0x82, "Solaris x86 -or- Linux Swap"),
    (0x83, "Linux"),
    (0x84, "Hibernation"),
    (0x85, "Linux Extended"),
    (0x86, "NTFS Volume Set"),
    (0x87, "NTFS Volume SET"),
    (0xa0, "Hibernation"),
    (0xa1, "Hibernation"),
    (0xa5, "FreeBSD"),
    (0xa6, "OpenBSD"),
    (0xa8, "Mac OSX"),
    (0xa9, "NetBSD"),
    (0xab, "Mac OSX Boot"),
    (0xb7, "BSDI"),
    (0xb8, "BSDI swap"),
    (0xdb, "Recovery Partition"),
    (0xde, "Dell Diagnostic Partition"),
    (0xee, "EFI GPT Disk"),
    (0xef, "EFI System Partition"),
    (0xfb, "Vmware File System"),
    (0xfc, "Vmware swap"),
];

/// System ID of a GPT protective MBR entry
pub const GPT_PROTECTIVE: u8 = 0xee;

/// Extended partition container codes (DOS CHS, DOS LBA, Linux)
pub const EXTENDED_TYPES: [u8; 3] = [0x05, 0x0f, 0x85];

/// Outcome of a registry lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeLabel {
    /// Code is listed in the registry
    Known(&'static str),
    /// Code has no registry entry
    Unrecognized,
}

impl TypeLabel {
    /// Label text, if known
    pub fn as_known(&self) -> Option<&'static str> {
        match self {
            Self::Known(label) => Some(label),
            Self::Unrecognized => None,
        }
    }

    pub fn is_recognized(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

impl fmt::Display for TypeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(label) => f.write_str(label),
            Self::Unrecognized => f.write_str("unrecognized"),
        }
    }
}

/// Look up the label for an MBR system ID byte
pub fn mbr_type_label(code: u8) -> TypeLabel {
    DOS_PARTITION_TYPES
        .binary_search_by_key(&code, |&(c, _)| c)
        .map(|i| TypeLabel::Known(DOS_PARTITION_TYPES[i].1))
        .unwrap_or(TypeLabel::Unrecognized)
}

/// True for extended partition containers
///
/// These are reported like any other entry; the chain they point to is not followed.
pub fn is_extended(code: u8) -> bool {
    EXTENDED_TYPES.contains(&code)
}

pub fn is_gpt_protective(code: u8) -> bool {
    code == GPT_PROTECTIVE
}
