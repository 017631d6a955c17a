//! services/client/src/adapters/snapshot_file.rs
//!
//! This module contains the file-backed implementation of the `SnapshotStore`
//! port: a single JSON file acting as the durable session slot.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use standards_desk_core::domain::SessionSnapshot;
use standards_desk_core::ports::{PortError, PortResult, SnapshotStore};
use tracing::warn;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A snapshot store that keeps the session in one JSON file.
#[derive(Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    /// Creates a new `FileSnapshotStore` for the given slot path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

//=========================================================================================
// `SnapshotStore` Trait Implementation
//=========================================================================================

impl SnapshotStore for FileSnapshotStore {
    /// Reads the slot. A missing file is an empty slot; a file that fails to
    /// parse is treated the same way, since a corrupt slot must never break
    /// rehydration.
    fn load(&self) -> PortResult<Option<SessionSnapshot>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(PortError::Unexpected(err.to_string())),
        };

        match serde_json::from_str::<SessionSnapshot>(&contents) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(err) => {
                warn!(path = %self.path.display(), "ignoring corrupt session slot: {err}");
                Ok(None)
            }
        }
    }

    /// Writes the snapshot through a sibling temp file and a rename, so a
    /// crash mid-write cannot leave a half-written slot behind.
    fn save(&self, snapshot: &SessionSnapshot) -> PortResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| PortError::Unexpected(e.to_string()))?;
        }

        let serialized = serde_json::to_string_pretty(snapshot)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, serialized).map_err(|e| PortError::Unexpected(e.to_string()))?;
        fs::rename(&staging, &self.path).map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use standards_desk_core::domain::User;

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot {
            user: Some(User {
                id: "1".to_string(),
                email: "user@example.com".to_string(),
                name: "U".to_string(),
            }),
            access_token: Some("A".to_string()),
            refresh_token: Some("R".to_string()),
            is_authenticated: true,
        }
    }

    #[test]
    fn save_then_load_round_trips_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("session.json"));

        store.save(&snapshot()).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, Some(snapshot()));
    }

    #[test]
    fn missing_file_loads_as_empty_slot() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("absent.json"));

        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn corrupt_file_loads_as_empty_slot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();
        let store = FileSnapshotStore::new(path);

        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("nested/slot/session.json"));

        store.save(&SessionSnapshot::default()).unwrap();

        assert_eq!(store.load().unwrap(), Some(SessionSnapshot::default()));
    }

    #[test]
    fn save_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("session.json"));

        store.save(&snapshot()).unwrap();
        store.save(&SessionSnapshot::default()).unwrap();

        assert_eq!(store.load().unwrap(), Some(SessionSnapshot::default()));
    }

    #[test]
    fn persisted_file_never_contains_transient_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileSnapshotStore::new(path.clone());

        store.save(&snapshot()).unwrap();
        let raw = fs::read_to_string(path).unwrap();

        assert!(!raw.contains("is_loading"));
        assert!(!raw.contains("error"));
    }
}
