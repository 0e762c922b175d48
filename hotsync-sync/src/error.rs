//! Errors the sync engine can raise, layered over whatever the two
//! `DbSync` collaborators' own I/O failures look like.

use thiserror::Error;

use crate::record::SyncState;

/// Errors specific to reconciliation. `DE`/`PE` are the device and
/// desktop collaborators' own error types.
#[derive(Debug, Error)]
pub enum SyncError<DE, PE> {
    /// A device/desktop state pair landed on a transition-table cell the
    /// protocol declares impossible; the engine aborts that record pair
    /// rather than guessing at a resolution.
    #[error("invalid state transition for record id {record_id}: device={device_state:?} desktop={desktop_state:?}")]
    InvalidStateTransition { record_id: u32, device_state: SyncState, desktop_state: SyncState },

    /// A `write`/`delete` call returned an id that didn't match what the
    /// engine expected (e.g. a non-fresh id from `add_on_device_new_id`).
    #[error("record I/O returned an id that does not match the expected mapping")]
    RecordIoMismatch,

    #[error("device storage error: {0:?}")]
    Device(DE),

    #[error("desktop storage error: {0:?}")]
    Desktop(PE),
}

pub type Result<T, DE, PE> = core::result::Result<T, SyncError<DE, PE>>;
