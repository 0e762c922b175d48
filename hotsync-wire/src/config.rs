//! Tunable parameters for the PADP transport.
//!
//! Mirrors the builder-style configuration idiom used throughout this
//! stack: a plain struct with a `Default` impl and `with_*` builder methods.

/// PADP fragment size cap in bytes.
///
/// The PADP spec allows fragments up to 1024 bytes; this implementation
/// caps at 512 to preserve ACK latency under interleaved traffic, per the
/// documented open question in this crate's design notes.
pub const DEFAULT_MAX_FRAGMENT_SIZE: usize = 512;

/// Default stop-and-wait ACK timeout, in milliseconds.
pub const DEFAULT_ACK_TIMEOUT_MS: u64 = 2000;

/// Default number of retransmit attempts before a message send fails.
pub const DEFAULT_MAX_RETRANSMIT: u8 = 10;

/// Largest message PADP will assemble/fragment.
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024;

/// CMP handshake transaction id (reserved, never used by ordinary PADP
/// messages).
pub const CMP_XID: u8 = 0xFF;

/// First transaction id issued to ordinary PADP messages (0 and 255 are
/// reserved).
pub const XID_RANGE_START: u8 = 1;

/// Last transaction id issued to ordinary PADP messages.
pub const XID_RANGE_END: u8 = 254;

/// Configuration for a PADP transport instance.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Maximum payload bytes per PADP fragment.
    pub max_fragment_size: usize,

    /// How long to wait for an ACK before retransmitting a fragment.
    pub ack_timeout_ms: u64,

    /// Maximum number of retransmit attempts per fragment.
    pub max_retransmit: u8,

    /// Whether to verify SLP's 16-bit CRC on read (disabled only by tests
    /// exercising malformed input end to end).
    pub enable_checksum: bool,
}

impl Config {
    /// Creates a configuration with the documented defaults.
    pub const fn new() -> Self {
        Self {
            max_fragment_size: DEFAULT_MAX_FRAGMENT_SIZE,
            ack_timeout_ms: DEFAULT_ACK_TIMEOUT_MS,
            max_retransmit: DEFAULT_MAX_RETRANSMIT,
            enable_checksum: true,
        }
    }

    /// Sets the maximum fragment payload size.
    pub const fn with_max_fragment_size(mut self, size: usize) -> Self {
        self.max_fragment_size = size;
        self
    }

    /// Sets the ACK timeout, in milliseconds. Tests shorten this to keep
    /// retry-exhaustion scenarios fast.
    pub const fn with_ack_timeout_ms(mut self, ms: u64) -> Self {
        self.ack_timeout_ms = ms;
        self
    }

    /// Sets the maximum number of retransmit attempts.
    pub const fn with_max_retransmit(mut self, attempts: u8) -> Self {
        self.max_retransmit = attempts;
        self
    }

    /// Enables or disables CRC-16 verification on read.
    pub const fn with_checksum(mut self, enable: bool) -> Self {
        self.enable_checksum = enable;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
