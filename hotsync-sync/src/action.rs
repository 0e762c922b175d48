//! The actions a transition-table cell emits, and the `DbSync`
//! collaborator interface the engine drives them against.

use crate::record::Record;

/// Which side an action targets and what it does. Actions are produced in
/// the order the transition table lists them and must be executed in that
/// order — later actions in a cell can depend on earlier ones (e.g.
/// `archive` before `del_on_desktop` in the same cell).
#[derive(Debug, Clone)]
pub enum SyncAction {
    /// Write `record` to the device, keeping its existing id (overwrite).
    AddOnDevice(Record),
    /// Write `record` to the device with a freshly allocated id.
    AddOnDeviceNewId(Record),
    /// Write `record` to the desktop, keeping its existing id.
    AddOnDesktop(Record),
    /// Append `record` to the in-memory archive accumulator.
    Archive(Record),
    /// Delete by id on the device.
    DeleteOnDevice(u32),
    /// Delete by id on the desktop.
    DeleteOnDesktop(u32),
}

/// One side of a sync: either the device or the desktop. The engine is
/// generic over this trait so it never needs to know how either side
/// actually stores records.
pub trait DbSync {
    type Error;

    fn read_modified(&mut self) -> core::result::Result<Vec<Record>, Self::Error>;
    fn read_all(&mut self) -> core::result::Result<Vec<Record>, Self::Error>;
    fn read(&mut self, id: u32) -> core::result::Result<Option<Record>, Self::Error>;
    /// Writes `record`. If `record.unique_id == 0`, allocates and returns a
    /// fresh id; otherwise writes at the given id and returns it unchanged.
    fn write(&mut self, record: Record) -> core::result::Result<u32, Self::Error>;
    fn delete(&mut self, id: u32) -> core::result::Result<(), Self::Error>;
    /// Purges deleted records and clears dirty/busy bits on what remains.
    fn cleanup(&mut self) -> core::result::Result<(), Self::Error>;
}
