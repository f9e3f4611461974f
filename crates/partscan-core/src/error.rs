//! Decoding error types

use thiserror::Error;

/// The main error type for partition table decoding
///
/// Every variant is fatal to the decode call that produced it. A type code
/// missing from the registry is not an error; see
/// [`TypeLabel::Unrecognized`](crate::TypeLabel::Unrecognized).
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error other than running out of input
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Buffer or stream is shorter than a declared field requires
    #[error("Truncated input: {0}")]
    TruncatedInput(String),

    /// GPT header fields describe a read that cannot be satisfied
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    /// Sector size parameter is unusable
    #[error("Invalid sector size: {0}")]
    InvalidSectorSize(String),

    /// On-disk signature does not match (hardened GPT decoding only)
    #[error("Signature verification failed: {0}")]
    SignatureVerification(String),

    /// CRC32 mismatch (hardened GPT decoding only)
    #[error("Checksum verification failed: {0}")]
    ChecksumVerification(String),
}

/// Result type alias for decoding operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a truncated input error
    pub fn truncated(msg: impl Into<String>) -> Self {
        Error::TruncatedInput(msg.into())
    }

    /// Create a malformed header error
    pub fn malformed_header(msg: impl Into<String>) -> Self {
        Error::MalformedHeader(msg.into())
    }

    /// Create an invalid sector size error
    pub fn invalid_sector_size(msg: impl Into<String>) -> Self {
        Error::InvalidSectorSize(msg.into())
    }

    /// True for errors caused by input that ends too early
    pub fn is_truncation(&self) -> bool {
        matches!(self, Error::TruncatedInput(_))
    }
}
