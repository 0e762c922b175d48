//! DLP's closed error-code space, plus the framing and shape violations a
//! malformed request or response can trigger in this crate.

use thiserror::Error;

/// The status code carried in every DLP response header. Closed: a conduit
/// never needs to represent a code outside this set, and `from_u16` rejects
/// anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum DlpErrorCode {
    None = 0,
    System = 1,
    IllegalRequest = 2,
    Memory = 3,
    Param = 4,
    NotFound = 5,
    NoneOpen = 6,
    DatabaseOpen = 7,
    TooManyOpenDatabases = 8,
    AlreadyExists = 9,
    CantOpen = 10,
    RecordDeleted = 11,
    RecordBusy = 12,
    NotSupported = 13,
    Unused1 = 14,
    ReadOnly = 15,
    NotEnoughSpace = 16,
    LimitExceeded = 17,
    CancelSync = 18,
    BadWrapper = 19,
    ArgMissing = 20,
    ArgSize = 21,
}

impl DlpErrorCode {
    pub const fn from_u16(code: u16) -> Option<Self> {
        Some(match code {
            0 => Self::None,
            1 => Self::System,
            2 => Self::IllegalRequest,
            3 => Self::Memory,
            4 => Self::Param,
            5 => Self::NotFound,
            6 => Self::NoneOpen,
            7 => Self::DatabaseOpen,
            8 => Self::TooManyOpenDatabases,
            9 => Self::AlreadyExists,
            10 => Self::CantOpen,
            11 => Self::RecordDeleted,
            12 => Self::RecordBusy,
            13 => Self::NotSupported,
            14 => Self::Unused1,
            15 => Self::ReadOnly,
            16 => Self::NotEnoughSpace,
            17 => Self::LimitExceeded,
            18 => Self::CancelSync,
            19 => Self::BadWrapper,
            20 => Self::ArgMissing,
            21 => Self::ArgSize,
            _ => return None,
        })
    }

    pub const fn code(self) -> u16 {
        self as u16
    }

    pub const fn is_success(self) -> bool {
        matches!(self, Self::None)
    }
}

/// Errors surfaced by this crate: either the underlying transport/framing
/// failed, or a DLP message violated the request/response shape rules.
#[derive(Debug, Error)]
pub enum DlpError {
    #[error("wire transport error: {0}")]
    Wire(#[from] hotsync_wire::Error),

    #[error("peer returned error code {0:?}")]
    Remote(DlpErrorCode),

    #[error("peer returned unrecognized error code {0}")]
    UnknownErrorCode(u16),

    #[error("response function id {got:#04x} did not match request {expected:#04x}")]
    ProtocolMismatch { expected: u8, got: u8 },

    #[error("argument group expected {expected} fields, got {got}")]
    ArgShapeMismatch { expected: usize, got: usize },

    #[error("function declares {required} required argument groups, frame carries {got}")]
    ArgCountMismatch { required: u8, got: u8 },

    #[error("message too short to contain a DLP header")]
    Truncated,

    #[error("argument id {0:#04x} exceeds the 6-bit id space")]
    ArgIdOutOfRange(u8),

    #[error("argument data length {0} does not fit any size class")]
    ArgTooLarge(usize),

    #[error("non-zero error code {0:?} carried a non-empty argument list")]
    ErrorWithArgs(DlpErrorCode),
}

pub type Result<T> = core::result::Result<T, DlpError>;
