//! Per-user persisted state: the small JSON record HotSync keeps between
//! syncs so it can recognize a returning device and track which desktop PC
//! it last synced with. Path conventions and the actual filesystem layout
//! belong to the collaborator that implements [`UserStore`] — this crate
//! only defines the record shape and the trait.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};

/// The per-user state persisted across syncs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: u32,
    pub user_name: String,
    pub last_sync_pc_id: u32,
}

/// Collaborator interface for loading and saving [`UserRecord`]s. The
/// session orchestrator never touches a path directly.
pub trait UserStore {
    fn load(&self, user_id: u32) -> Result<Option<UserRecord>>;
    fn save(&self, record: &UserRecord) -> Result<()>;
}

/// The straightforward `UserStore`: one JSON file per user, named by id,
/// under a root directory.
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, user_id: u32) -> PathBuf {
        self.root.join(format!("{user_id}.json"))
    }
}

impl UserStore for JsonFileStore {
    fn load(&self, user_id: u32) -> Result<Option<UserRecord>> {
        let path = self.path_for(user_id);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&path)?;
        let record = serde_json::from_slice(&bytes).map_err(|e| SessionError::Storage(e.to_string()))?;
        Ok(Some(record))
    }

    fn save(&self, record: &UserRecord) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.path_for(record.user_id);
        let bytes = serde_json::to_vec_pretty(record).map_err(|e| SessionError::Storage(e.to_string()))?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_a_temp_directory() {
        let dir = std::env::temp_dir().join(format!("hotsync-session-test-{}", std::process::id()));
        let store = JsonFileStore::new(&dir);
        let record = UserRecord { user_id: 42, user_name: "ripley".into(), last_sync_pc_id: 7 };
        store.save(&record).unwrap();
        let loaded = store.load(42).unwrap().unwrap();
        assert_eq!(loaded, record);
        assert!(store.load(999).unwrap().is_none());
        std::fs::remove_dir_all(&dir).ok();
    }
}
