//! Error types for the HotSync wire layer.
//!
//! This module defines every error the framing layer (SLP, PADP, CMP,
//! NetSync) can produce. Higher layers (DLP, sync engine) wrap these rather
//! than re-deriving their own framing error variants.

use core::fmt;

/// Result type alias for wire-layer operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for the HotSync wire layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Buffer is too small for the operation.
    BufferTooSmall,

    /// Buffer is full and cannot accept more data.
    BufferFull,

    /// SLP header checksum did not match.
    BadHeaderChecksum,

    /// CRC-16 verification failed.
    BadCrc,

    /// The three-byte SLP signature was never found before the read budget
    /// was exhausted.
    SignatureNotFound,

    /// A frame arrived with a field outside its declared shape
    /// (e.g. an unknown SLP socket type or PADP frame type).
    MalformedFrame,

    /// A PADP DATA fragment arrived whose `size_or_offset` did not match
    /// the expected cumulative byte count.
    OutOfOrderFragment,

    /// A PADP send exhausted its retransmit budget without an ACK.
    RetryExhausted,

    /// Operation attempted while not connected / in the wrong state.
    InvalidState,

    /// Transport I/O error occurred (propagated opaquely from the
    /// underlying transport).
    IoError,

    /// Resource temporarily unavailable (would block).
    WouldBlock,

    /// End of stream reached while a complete frame was expected.
    EndOfStream,

    /// A value did not fit the wire-format width declared for it
    /// (e.g. a message larger than 64 KiB handed to PADP).
    ValueTooLarge,
}

impl Error {
    /// Returns a human-readable description of the error.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Error::BufferTooSmall => "buffer too small",
            Error::BufferFull => "buffer full",
            Error::BadHeaderChecksum => "bad header checksum",
            Error::BadCrc => "bad crc",
            Error::SignatureNotFound => "signature not found",
            Error::MalformedFrame => "malformed frame",
            Error::OutOfOrderFragment => "out of order fragment",
            Error::RetryExhausted => "retry exhausted",
            Error::InvalidState => "invalid state",
            Error::IoError => "i/o error",
            Error::WouldBlock => "would block",
            Error::EndOfStream => "end of stream",
            Error::ValueTooLarge => "value too large",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
