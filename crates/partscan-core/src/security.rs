//! Bounds used while decoding untrusted images
//!
//! Header fields come straight from the image, so every size derived from
//! them is checked before it is used to seek or allocate.

use crate::{Error, Result};

/// Sector size used when the caller does not specify one
pub const DEFAULT_SECTOR_SIZE: u32 = 512;

/// Smallest sector size we'll accept
pub const MIN_SECTOR_SIZE: u32 = 512;

/// Maximum sector size we'll accept (4KB - common for advanced format)
pub const MAX_SECTOR_SIZE: u32 = 4096;

/// Maximum allocation size for a single buffer (256 MB)
pub const MAX_ALLOCATION_SIZE: usize = 256 * 1024 * 1024;

/// Validate sector size is reasonable
pub fn validate_sector_size(sector_size: u32) -> Result<()> {
    if !(MIN_SECTOR_SIZE..=MAX_SECTOR_SIZE).contains(&sector_size) {
        return Err(Error::invalid_sector_size(format!(
            "{} (must be {}-{})",
            sector_size, MIN_SECTOR_SIZE, MAX_SECTOR_SIZE
        )));
    }

    if !sector_size.is_power_of_two() {
        return Err(Error::invalid_sector_size(format!(
            "{} is not a power of 2",
            sector_size
        )));
    }

    Ok(())
}

/// Multiply two header-derived values, reporting overflow as a malformed header
pub fn checked_header_product(a: u64, b: u64, context: &str) -> Result<u64> {
    a.checked_mul(b)
        .ok_or_else(|| Error::malformed_header(format!("{}: multiplication overflow", context)))
}

/// Check a header-derived buffer size against the allocation ceiling
pub fn validate_allocation_size(size: u64, context: &str) -> Result<usize> {
    if size > MAX_ALLOCATION_SIZE as u64 {
        return Err(Error::malformed_header(format!(
            "{} size {} exceeds limit {}",
            context, size, MAX_ALLOCATION_SIZE
        )));
    }

    size.try_into()
        .map_err(|_| Error::malformed_header(format!("{} size exceeds platform limits", context)))
}
