//! The record model both `DbSync` collaborators exchange, and the
//! six-state classification the sync engine reasons about.

/// A record's attribute byte, unpacked. `category` and `archive` share the
/// low nibble: `archive` is only meaningful when `delete` or `busy` is
/// set, `category` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordAttrs {
    pub delete: bool,
    /// "Dirty" in the Palm sense: archived-pending, i.e. modified since the
    /// last sync and not yet reconciled.
    pub dirty: bool,
    pub busy: bool,
    pub secret: bool,
    low_nibble: u8,
}

impl RecordAttrs {
    const DELETE_BIT: u8 = 0x80;
    const DIRTY_BIT: u8 = 0x40;
    const BUSY_BIT: u8 = 0x20;
    const SECRET_BIT: u8 = 0x10;
    const LOW_NIBBLE_MASK: u8 = 0x0F;
    const ARCHIVE_BIT: u8 = 0x08;

    pub const fn with_category(category: u8) -> Self {
        Self { delete: false, dirty: false, busy: false, secret: false, low_nibble: category & Self::LOW_NIBBLE_MASK }
    }

    /// Whether the low nibble should be read as the archive flag (true
    /// when a delete or busy record should be preserved in the archive
    /// accumulator rather than dropped outright).
    pub const fn archive(&self) -> bool {
        (self.delete || self.busy) && (self.low_nibble & Self::ARCHIVE_BIT != 0)
    }

    pub const fn category(&self) -> u8 {
        if self.delete || self.busy {
            0
        } else {
            self.low_nibble & Self::LOW_NIBBLE_MASK
        }
    }

    pub fn set_archive(&mut self, archive: bool) {
        self.low_nibble = if archive { Self::ARCHIVE_BIT } else { 0 };
    }

    pub fn set_category(&mut self, category: u8) {
        self.low_nibble = category & Self::LOW_NIBBLE_MASK;
    }

    /// Clears every bit except `secret`, as required before any
    /// device-side write.
    pub fn cleared_for_device_write(&self) -> Self {
        Self { delete: false, dirty: false, busy: false, secret: self.secret, low_nibble: 0 }
    }

    pub const fn to_byte(self) -> u8 {
        (if self.delete { Self::DELETE_BIT } else { 0 })
            | (if self.dirty { Self::DIRTY_BIT } else { 0 })
            | (if self.busy { Self::BUSY_BIT } else { 0 })
            | (if self.secret { Self::SECRET_BIT } else { 0 })
            | (self.low_nibble & Self::LOW_NIBBLE_MASK)
    }

    pub const fn from_byte(byte: u8) -> Self {
        Self {
            delete: byte & Self::DELETE_BIT != 0,
            dirty: byte & Self::DIRTY_BIT != 0,
            busy: byte & Self::BUSY_BIT != 0,
            secret: byte & Self::SECRET_BIT != 0,
            low_nibble: byte & Self::LOW_NIBBLE_MASK,
        }
    }
}

/// `unique_id` is a 24-bit device-assigned identifier; an id of zero means
/// "not yet assigned" (the device allocates one on write).
pub const MAX_UNIQUE_ID: u32 = 0x00FF_FFFF;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub unique_id: u32,
    pub attrs: RecordAttrs,
    pub data: Vec<u8>,
}

impl Record {
    pub fn new(unique_id: u32, attrs: RecordAttrs, data: Vec<u8>) -> Self {
        Self { unique_id: unique_id & MAX_UNIQUE_ID, attrs, data }
    }

    /// A copy with the id cleared, `write`'s signal to allocate a fresh id.
    pub fn with_fresh_id(&self) -> Self {
        Self { unique_id: 0, attrs: self.attrs, data: self.data.clone() }
    }
}

/// The six states a record (on either side) can be classified into before
/// the transition table is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    NotFound,
    ArchivedChanged,
    ArchivedUnchanged,
    Deleted,
    Changed,
    Unchanged,
}

impl SyncState {
    /// Classifies a record that exists using its attribute flags (fast
    /// sync) or a byte comparison against its peer (slow sync, when
    /// `peer` is `Some`). When slow sync finds no peer at all, there's
    /// nothing to compare bytes against, so classification falls back to
    /// the record's own dirty bit — a record present on only one side can
    /// still land on UNCHANGED, which the transition table has no
    /// legitimate cell for.
    pub fn classify(record: Option<&Record>, peer: Option<&Record>, slow: bool) -> Self {
        let Some(record) = record else { return Self::NotFound };
        if record.attrs.delete {
            return if record.attrs.archive() { Self::classify_archived(record, peer, slow) } else { Self::Deleted };
        }
        if record.attrs.busy && record.attrs.archive() {
            return Self::classify_archived(record, peer, slow);
        }
        if slow {
            match peer {
                Some(p) if records_equal(record, p) => Self::Unchanged,
                Some(_) => Self::Changed,
                None if record.attrs.dirty => Self::Changed,
                None => Self::Unchanged,
            }
        } else if record.attrs.dirty {
            Self::Changed
        } else {
            Self::Unchanged
        }
    }

    /// An archived record is ARCHIVED_CHANGED unless a slow-sync byte
    /// comparison against its peer shows no change, in which case it's
    /// ARCHIVED_UNCHANGED. With no peer to compare, it falls back to the
    /// record's own dirty bit, same as [`classify`]'s non-archived branch.
    fn classify_archived(record: &Record, peer: Option<&Record>, slow: bool) -> Self {
        if slow {
            match peer {
                Some(p) if records_equal(record, p) => Self::ArchivedUnchanged,
                Some(_) => Self::ArchivedChanged,
                None if record.attrs.dirty => Self::ArchivedChanged,
                None => Self::ArchivedUnchanged,
            }
        } else {
            Self::ArchivedChanged
        }
    }
}

fn records_equal(a: &Record, b: &Record) -> bool {
    a.attrs.category() == b.attrs.category() && a.data == b.data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_and_archive_share_the_low_nibble() {
        let mut attrs = RecordAttrs::with_category(7);
        assert_eq!(attrs.category(), 7);
        assert!(!attrs.archive());

        attrs.delete = true;
        attrs.set_archive(true);
        assert!(attrs.archive());
        assert_eq!(attrs.category(), 0);
    }

    #[test]
    fn clearing_for_device_write_keeps_only_secret() {
        let mut attrs = RecordAttrs::with_category(3);
        attrs.delete = true;
        attrs.dirty = true;
        attrs.secret = true;
        let cleared = attrs.cleared_for_device_write();
        assert!(cleared.secret);
        assert!(!cleared.delete && !cleared.dirty && !cleared.busy);
        assert_eq!(cleared.category(), 0);
    }

    #[test]
    fn byte_round_trips() {
        let mut attrs = RecordAttrs::with_category(5);
        attrs.dirty = true;
        attrs.secret = true;
        let byte = attrs.to_byte();
        assert_eq!(RecordAttrs::from_byte(byte), attrs);
    }

    #[test]
    fn fast_sync_classification_trusts_the_dirty_flag() {
        let mut attrs = RecordAttrs::with_category(1);
        attrs.dirty = true;
        let record = Record::new(1, attrs, b"hi".to_vec());
        assert_eq!(SyncState::classify(Some(&record), None, false), SyncState::Changed);
    }

    #[test]
    fn slow_sync_classification_compares_bytes() {
        let attrs = RecordAttrs::with_category(1);
        let record = Record::new(1, attrs, b"hi".to_vec());
        let same_peer = Record::new(1, attrs, b"hi".to_vec());
        let diff_peer = Record::new(1, attrs, b"bye".to_vec());
        assert_eq!(SyncState::classify(Some(&record), Some(&same_peer), true), SyncState::Unchanged);
        assert_eq!(SyncState::classify(Some(&record), Some(&diff_peer), true), SyncState::Changed);
    }

    #[test]
    fn slow_sync_one_sided_record_falls_back_to_its_own_dirty_bit() {
        let attrs = RecordAttrs::with_category(1);
        let clean = Record::new(1, attrs, b"hi".to_vec());
        assert_eq!(SyncState::classify(Some(&clean), None, true), SyncState::Unchanged);

        let mut dirty_attrs = attrs;
        dirty_attrs.dirty = true;
        let dirty = Record::new(1, dirty_attrs, b"hi".to_vec());
        assert_eq!(SyncState::classify(Some(&dirty), None, true), SyncState::Changed);
    }
}
