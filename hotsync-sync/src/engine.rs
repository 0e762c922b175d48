//! Drives fast and slow sync over two [`DbSync`] collaborators using the
//! transition table in [`crate::transition`].

use std::collections::HashSet;

use crate::action::DbSync;
use crate::archive::ArchiveAccumulator;
use crate::error::{Result, SyncError};
use crate::record::{Record, SyncState};
use crate::transition::{transition, RawAction, Side};

/// A [`RawAction`] with its source records resolved, ready to execute.
/// Kept separate from execution so every pair's actions can be computed
/// against a pre-mutation snapshot of both sides before any of them run.
struct ResolvedAction {
    action: RawAction,
    device_record: Option<Record>,
    desktop_record: Option<Record>,
}

/// Outcome of a completed sync pass.
#[derive(Debug)]
pub struct SyncReport<DE, PE> {
    pub archive: ArchiveAccumulator,
    /// Actions that failed to apply. A single record's action failing
    /// doesn't abort the rest of the sync pass — it's recorded here and
    /// the remaining planned actions still run.
    pub failures: Vec<(u32, SyncError<DE, PE>)>,
}

pub struct SyncEngine {
    archive: ArchiveAccumulator,
}

impl Default for SyncEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncEngine {
    pub fn new() -> Self {
        Self { archive: ArchiveAccumulator::new() }
    }

    /// Fast sync: reconciles records either side reports as modified,
    /// trusting their dirty/delete/archive flags.
    pub fn fast_sync<D: DbSync, P: DbSync>(self, device: &mut D, desktop: &mut P) -> Result<SyncReport<D::Error, P::Error>, D::Error, P::Error> {
        self.run(device, desktop, false)
    }

    /// Slow sync: reconciles every record on both sides, classifying
    /// CHANGED vs UNCHANGED by byte comparison instead of the dirty flag.
    ///
    /// A record present on only one side with no dirty bit set still
    /// classifies UNCHANGED (see [`crate::record::SyncState::classify`]),
    /// which pairs with its absent peer's NOT_FOUND state — a cell the
    /// transition table declares impossible. That's by design: a record
    /// can only go one-sided and UNCHANGED through a prior reconciliation
    /// bug, and the engine surfaces it as `INVALID_STATE_TRANSITION`
    /// rather than guessing at a resolution.
    pub fn slow_sync<D: DbSync, P: DbSync>(self, device: &mut D, desktop: &mut P) -> Result<SyncReport<D::Error, P::Error>, D::Error, P::Error> {
        self.run(device, desktop, true)
    }

    fn run<D: DbSync, P: DbSync>(mut self, device: &mut D, desktop: &mut P, slow: bool) -> Result<SyncReport<D::Error, P::Error>, D::Error, P::Error> {
        let mut handled: HashSet<u32> = HashSet::new();
        let mut planned = Vec::new();

        // Steps 1-2: classify every pair against a pre-mutation snapshot
        // of both sides and plan their actions, without executing any of
        // them yet.
        let device_set = if slow { device.read_all() } else { device.read_modified() }.map_err(SyncError::Device)?;
        for d in device_set {
            let peer = fetch(desktop, d.unique_id).map_err(SyncError::Desktop)?;
            if d.unique_id != 0 {
                handled.insert(d.unique_id);
            }
            self.plan(Some(d), peer, slow, &mut planned)?;
        }

        let desktop_set = if slow { desktop.read_all() } else { desktop.read_modified() }.map_err(SyncError::Desktop)?;
        for p in desktop_set {
            if p.unique_id != 0 && handled.contains(&p.unique_id) {
                continue;
            }
            let peer = fetch(device, p.unique_id).map_err(SyncError::Device)?;
            self.plan(peer, Some(p), slow, &mut planned)?;
        }

        // Step 3: execute the plan in order. A single action failing
        // doesn't abort the pass — it's recorded and the rest still run.
        let mut failures = Vec::new();
        for resolved in planned {
            let record_id = resolved.device_record.as_ref().or(resolved.desktop_record.as_ref()).map_or(0, |r| r.unique_id);
            if let Err(e) = self.apply(device, desktop, resolved) {
                failures.push((record_id, e));
            }
        }

        // Step 4.
        device.cleanup().map_err(SyncError::Device)?;
        desktop.cleanup().map_err(SyncError::Desktop)?;

        Ok(SyncReport { archive: self.archive, failures })
    }

    fn plan<DE, PE>(
        &mut self,
        device_record: Option<Record>,
        desktop_record: Option<Record>,
        slow: bool,
        planned: &mut Vec<ResolvedAction>,
    ) -> Result<(), DE, PE> {
        let same = matches!(
            (&device_record, &desktop_record),
            (Some(a), Some(b)) if a.attrs.category() == b.attrs.category() && a.data == b.data
        );
        let device_state = SyncState::classify(device_record.as_ref(), desktop_record.as_ref(), slow);
        let desktop_state = SyncState::classify(desktop_record.as_ref(), device_record.as_ref(), slow);

        let actions = transition(device_state, desktop_state, same).map_err(|impossible| SyncError::InvalidStateTransition {
            record_id: device_record.as_ref().or(desktop_record.as_ref()).map_or(0, |r| r.unique_id),
            device_state: impossible.device_state,
            desktop_state: impossible.desktop_state,
        })?;

        for action in actions {
            planned.push(ResolvedAction { action, device_record: device_record.clone(), desktop_record: desktop_record.clone() });
        }
        Ok(())
    }

    fn apply<D: DbSync, P: DbSync>(&mut self, device: &mut D, desktop: &mut P, resolved: ResolvedAction) -> Result<(), D::Error, P::Error> {
        let ResolvedAction { action, device_record, desktop_record } = resolved;
        let pick = |side: Side| match side {
            Side::Device => device_record.clone().expect("transition table referenced an absent device record"),
            Side::Desktop => desktop_record.clone().expect("transition table referenced an absent desktop record"),
        };
        match action {
            RawAction::Archive(side) => self.archive.push(pick(side)),
            RawAction::AddOnDevice(side) => {
                let mut record = pick(side);
                record.attrs = record.attrs.cleared_for_device_write();
                device.write(record).map_err(SyncError::Device)?;
            }
            RawAction::AddOnDeviceNewId(side) => {
                let mut record = pick(side).with_fresh_id();
                record.attrs = record.attrs.cleared_for_device_write();
                device.write(record).map_err(SyncError::Device)?;
            }
            RawAction::AddOnDesktop(side) => {
                desktop.write(pick(side)).map_err(SyncError::Desktop)?;
            }
            RawAction::DeleteOnDevice(side) => {
                device.delete(pick(side).unique_id).map_err(SyncError::Device)?;
            }
            RawAction::DeleteOnDesktop(side) => {
                desktop.delete(pick(side).unique_id).map_err(SyncError::Desktop)?;
            }
        }
        Ok(())
    }
}

fn fetch<T: DbSync>(side: &mut T, id: u32) -> core::result::Result<Option<Record>, T::Error> {
    if id == 0 {
        return Ok(None);
    }
    side.read(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordAttrs;
    use std::collections::HashMap;

    #[derive(Debug, Default)]
    struct MemDb {
        records: HashMap<u32, Record>,
        next_id: u32,
    }

    impl MemDb {
        fn new(next_id: u32) -> Self {
            Self { records: HashMap::new(), next_id }
        }

        fn insert(&mut self, record: Record) {
            self.records.insert(record.unique_id, record);
        }
    }

    impl DbSync for MemDb {
        type Error = core::convert::Infallible;

        fn read_modified(&mut self) -> core::result::Result<Vec<Record>, Self::Error> {
            Ok(self.records.values().filter(|r| r.attrs.dirty || r.attrs.delete || r.attrs.busy).cloned().collect())
        }

        fn read_all(&mut self) -> core::result::Result<Vec<Record>, Self::Error> {
            Ok(self.records.values().cloned().collect())
        }

        fn read(&mut self, id: u32) -> core::result::Result<Option<Record>, Self::Error> {
            Ok(self.records.get(&id).cloned())
        }

        fn write(&mut self, mut record: Record) -> core::result::Result<u32, Self::Error> {
            if record.unique_id == 0 {
                record.unique_id = self.next_id;
                self.next_id += 1;
            }
            let id = record.unique_id;
            self.records.insert(id, record);
            Ok(id)
        }

        fn delete(&mut self, id: u32) -> core::result::Result<(), Self::Error> {
            self.records.remove(&id);
            Ok(())
        }

        fn cleanup(&mut self) -> core::result::Result<(), Self::Error> {
            self.records.retain(|_, r| !r.attrs.delete);
            for r in self.records.values_mut() {
                r.attrs.dirty = false;
                r.attrs.busy = false;
            }
            Ok(())
        }
    }

    #[test]
    fn new_device_record_propagates_to_desktop() {
        let mut attrs = RecordAttrs::with_category(0);
        attrs.dirty = true;
        let mut device = MemDb::new(100);
        device.insert(Record::new(0, attrs, b"new".to_vec()));
        let mut desktop = MemDb::new(100);

        let report = SyncEngine::new().fast_sync(&mut device, &mut desktop).unwrap();
        assert!(report.archive.is_empty());
        assert_eq!(desktop.records.len(), 1);
        assert_eq!(desktop.records.values().next().unwrap().data, b"new");
    }

    #[test]
    fn fast_sync_is_idempotent_once_converged() {
        let attrs = RecordAttrs::with_category(0);
        let mut device = MemDb::new(10);
        let mut desktop = MemDb::new(10);
        device.insert(Record::new(1, attrs, b"same".to_vec()));
        desktop.insert(Record::new(1, attrs, b"same".to_vec()));

        let report = SyncEngine::new().fast_sync(&mut device, &mut desktop).unwrap();
        assert!(report.archive.is_empty());
        assert_eq!(device.records[&1].data, b"same");
        assert_eq!(desktop.records[&1].data, b"same");
    }

    #[test]
    fn slow_sync_detects_byte_level_change_without_dirty_bit() {
        let attrs = RecordAttrs::with_category(0);
        let mut device = MemDb::new(10);
        let mut desktop = MemDb::new(10);
        device.insert(Record::new(1, attrs, b"device-version".to_vec()));
        desktop.insert(Record::new(1, attrs, b"desktop-version".to_vec()));

        let report = SyncEngine::new().slow_sync(&mut device, &mut desktop).unwrap();
        assert!(report.failures.is_empty());
        // Conflicting change with no dirty bit to arbitrate: both copies survive.
        assert!(device.records.len() >= 1);
    }

    #[test]
    fn archived_delete_merges_into_the_accumulator() {
        let mut attrs = RecordAttrs::with_category(0);
        attrs.delete = true;
        attrs.set_archive(true);
        let mut device = MemDb::new(10);
        device.insert(Record::new(1, attrs, b"keepsake".to_vec()));
        let mut desktop = MemDb::new(10);

        let report = SyncEngine::new().fast_sync(&mut device, &mut desktop).unwrap();
        assert_eq!(report.archive.len(), 1);
        assert_eq!(report.archive.records()[0].data, b"keepsake");
    }

    #[test]
    fn slow_sync_one_sided_unchanged_record_is_an_invalid_transition() {
        let attrs = RecordAttrs::with_category(0);
        let mut device = MemDb::new(10);
        device.insert(Record::new(1, attrs, b"orphan".to_vec()));
        let mut desktop = MemDb::new(10);

        let err = SyncEngine::new().slow_sync(&mut device, &mut desktop).unwrap_err();
        assert!(matches!(
            err,
            SyncError::InvalidStateTransition { record_id: 1, device_state: SyncState::Unchanged, desktop_state: SyncState::NotFound }
        ));
    }
}
