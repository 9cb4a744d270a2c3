// src/infrastructure/json_store.rs
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use crate::application::record_store::{StorePersistence, StoreState};
use crate::domain::{BackupDocument, DomainError};

/// Store persisted as one backup-format JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorePersistence for JsonFileStore {
    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    fn load(&mut self) -> Result<Option<StoreState>, DomainError> {
        if !self.path.exists() {
            debug!("No store file yet, starting empty");
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)
            .map_err(|e| DomainError::Persistence(format!("reading {}: {e}", self.path.display())))?;
        let document = BackupDocument::from_json(&json)?;
        Ok(Some(StoreState::from_document(document)))
    }

    #[instrument(level = "debug", skip_all, fields(path = %self.path.display()))]
    fn save(&mut self, state: &StoreState) -> Result<(), DomainError> {
        write_document(&self.path, &state.to_document(Utc::now()))
    }
}

/// Pretty JSON written to a sibling temp file, then moved over `path`.
pub fn write_document(path: &Path, document: &BackupDocument) -> Result<(), DomainError> {
    let json = serde_json::to_string_pretty(document)
        .map_err(|e| DomainError::Persistence(format!("serializing store: {e}")))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)
        .map_err(|e| DomainError::Persistence(format!("creating {}: {e}", dir.display())))?;

    let mut file = NamedTempFile::new_in(&dir)
        .map_err(|e| DomainError::Persistence(format!("creating temp file: {e}")))?;
    file.write_all(json.as_bytes())
        .map_err(|e| DomainError::Persistence(format!("writing temp file: {e}")))?;
    file.persist(path)
        .map_err(|e| DomainError::Persistence(format!("replacing {}: {e}", path.display())))?;

    debug!(bytes = json.len(), "Store written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BACKUP_FORMAT_VERSION;
    use crate::util::testing::{note, question};
    use tempfile::TempDir;

    #[test]
    fn given_missing_file_when_loading_then_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = JsonFileStore::new(temp_dir.path().join("store.json"));

        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn given_state_when_saving_then_loads_back_equal() {
        // Arrange
        let temp_dir = TempDir::new().unwrap();
        let mut store = JsonFileStore::new(temp_dir.path().join("nested/dir/store.json"));
        let state = StoreState {
            questions: vec![question("q1")],
            notes: vec![note("n1", "Math", "Limits")],
            folders: vec!["Math".to_string()],
            settings: Some(serde_json::json!({"theme": "dark"})),
        };

        // Act
        store.save(&state).unwrap();
        let loaded = store.load().unwrap().unwrap();

        // Assert
        assert_eq!(loaded.folders, state.folders);
        assert_eq!(loaded.settings, state.settings);
        assert_eq!(loaded.notes[0].title, "Limits");
        assert_eq!(loaded.questions[0].id, "q1");
    }

    #[test]
    fn given_saved_store_when_reading_raw_json_then_uses_backup_format() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");
        let mut store = JsonFileStore::new(&path);

        store.save(&StoreState::default()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["version"], BACKUP_FORMAT_VERSION);
        assert!(raw["mistakes"].is_array());
        assert!(raw["timestamp"].is_i64());
    }

    #[test]
    fn given_garbage_file_when_loading_then_returns_invalid_backup() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");
        fs::write(&path, "not json").unwrap();

        let result = JsonFileStore::new(&path).load();

        assert!(matches!(result, Err(DomainError::InvalidBackup(_))));
    }
}
