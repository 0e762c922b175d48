//! The 6x6 state transition table: given a device state and desktop
//! state (and, for the conflicting cells, whether the two records'
//! bytes are equal), produces the ordered list of actions to apply.

use crate::record::SyncState;

/// Which collaborator a [`RawAction`] draws its record (or id) from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Device,
    Desktop,
}

/// An action still abstract over which concrete record it touches — the
/// engine resolves `Side` to an actual `Record` before executing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawAction {
    Archive(Side),
    AddOnDevice(Side),
    AddOnDeviceNewId(Side),
    AddOnDesktop(Side),
    DeleteOnDevice(Side),
    DeleteOnDesktop(Side),
}

use RawAction::*;
use Side::*;

/// A transition-table cell declared impossible by the protocol: the
/// device/desktop state pair cannot legitimately arise together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImpossibleTransition {
    pub device_state: SyncState,
    pub desktop_state: SyncState,
}

/// Looks up the transition table cell for `(device_state, desktop_state)`.
/// `same` is only consulted by cells whose action depends on whether the
/// two records' bytes are equal; it's ignored otherwise.
pub fn transition(device_state: SyncState, desktop_state: SyncState, same: bool) -> Result<Vec<RawAction>, ImpossibleTransition> {
    use SyncState::*;

    let impossible = || Err(ImpossibleTransition { device_state, desktop_state });

    Ok(match (device_state, desktop_state) {
        (NotFound, NotFound) => vec![],
        (NotFound, ArchivedChanged) => vec![Archive(Desktop)],
        (NotFound, ArchivedUnchanged) => return impossible(),
        (NotFound, Deleted) => vec![],
        (NotFound, Changed) => vec![AddOnDevice(Desktop)],
        (NotFound, Unchanged) => return impossible(),

        (ArchivedChanged, NotFound) => vec![Archive(Device)],
        (ArchivedChanged, ArchivedChanged) => {
            if same { vec![Archive(Device)] } else { vec![Archive(Device), Archive(Desktop)] }
        }
        (ArchivedChanged, ArchivedUnchanged) => {
            if same { vec![Archive(Device)] } else { vec![Archive(Device), Archive(Desktop)] }
        }
        (ArchivedChanged, Deleted) => vec![Archive(Device)],
        (ArchivedChanged, Changed) => {
            if same {
                vec![Archive(Device), DeleteOnDesktop(Desktop)]
            } else {
                vec![AddOnDeviceNewId(Device), AddOnDevice(Desktop), AddOnDesktop(Device)]
            }
        }
        (ArchivedChanged, Unchanged) => vec![Archive(Device), DeleteOnDesktop(Desktop)],

        (ArchivedUnchanged, NotFound) => return impossible(),
        (ArchivedUnchanged, ArchivedChanged) => {
            if same { vec![Archive(Device)] } else { vec![Archive(Device), Archive(Desktop)] }
        }
        (ArchivedUnchanged, ArchivedUnchanged) => vec![Archive(Device)],
        (ArchivedUnchanged, Deleted) => vec![Archive(Device)],
        (ArchivedUnchanged, Changed) => vec![AddOnDevice(Desktop)],
        (ArchivedUnchanged, Unchanged) => vec![Archive(Device), DeleteOnDesktop(Desktop)],

        (Deleted, NotFound) => vec![],
        (Deleted, ArchivedChanged) => vec![Archive(Desktop)],
        (Deleted, ArchivedUnchanged) => vec![Archive(Desktop)],
        (Deleted, Deleted) => vec![],
        (Deleted, Changed) => vec![AddOnDevice(Desktop)],
        (Deleted, Unchanged) => vec![DeleteOnDesktop(Desktop)],

        (Changed, NotFound) => vec![AddOnDesktop(Device)],
        (Changed, ArchivedChanged) => {
            if same {
                vec![Archive(Desktop), DeleteOnDevice(Device)]
            } else {
                vec![AddOnDeviceNewId(Desktop), AddOnDesktop(Desktop), AddOnDesktop(Device)]
            }
        }
        (Changed, ArchivedUnchanged) => vec![AddOnDesktop(Device)],
        (Changed, Deleted) => vec![AddOnDesktop(Device)],
        (Changed, Changed) => {
            if same {
                vec![]
            } else {
                vec![AddOnDeviceNewId(Desktop), AddOnDesktop(Desktop), AddOnDesktop(Device)]
            }
        }
        (Changed, Unchanged) => vec![AddOnDesktop(Device)],

        (Unchanged, NotFound) => return impossible(),
        (Unchanged, ArchivedChanged) => vec![Archive(Desktop), DeleteOnDevice(Device)],
        (Unchanged, ArchivedUnchanged) => vec![Archive(Desktop), DeleteOnDevice(Device)],
        (Unchanged, Deleted) => vec![DeleteOnDevice(Device)],
        (Unchanged, Changed) => vec![AddOnDevice(Desktop)],
        (Unchanged, Unchanged) => vec![],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use SyncState::*;

    #[test]
    fn unchanged_not_found_is_impossible() {
        assert!(transition(Unchanged, NotFound, false).is_err());
        assert!(transition(NotFound, Unchanged, false).is_err());
        assert!(transition(NotFound, ArchivedUnchanged, false).is_err());
        assert!(transition(ArchivedUnchanged, NotFound, false).is_err());
    }

    #[test]
    fn matching_changed_pair_is_idempotent() {
        assert_eq!(transition(Changed, Changed, true).unwrap(), vec![]);
        assert_eq!(transition(Unchanged, Unchanged, false).unwrap(), vec![]);
    }

    #[test]
    fn device_new_record_lands_on_desktop() {
        assert_eq!(transition(Changed, NotFound, false).unwrap(), vec![AddOnDesktop(Device)]);
    }

    #[test]
    fn conflicting_changes_duplicate_onto_both_sides() {
        let actions = transition(Changed, Changed, false).unwrap();
        assert_eq!(actions, vec![AddOnDeviceNewId(Desktop), AddOnDesktop(Desktop), AddOnDesktop(Device)]);
    }
}
