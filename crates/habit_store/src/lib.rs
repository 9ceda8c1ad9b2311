use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use habit_core::store::{HabitStore, StoreError, StoreSnapshot};
use parking_lot::Mutex;

/// Persists habits and occurrences as one JSON document on disk.
///
/// A missing file reads as an empty store. Saves go to a sibling temp file that is renamed over
/// the target so a crash never leaves a half-written document behind.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    io_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            io_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "habits.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl HabitStore for JsonFileStore {
    fn load(&self) -> Result<StoreSnapshot, StoreError> {
        let _guard = self.io_lock.lock();
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "store file missing, starting empty");
                return Ok(StoreSnapshot::default());
            }
            Err(err) => return Err(err.into()),
        };
        if raw.trim().is_empty() {
            return Ok(StoreSnapshot::default());
        }
        let snapshot: StoreSnapshot = serde_json::from_str(&raw)?;
        tracing::debug!(
            path = %self.path.display(),
            habits = snapshot.habits.len(),
            occurrences = snapshot.occurrences.len(),
            "loaded store"
        );
        Ok(snapshot)
    }

    fn save(&self, snapshot: &StoreSnapshot) -> Result<(), StoreError> {
        let _guard = self.io_lock.lock();
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut payload = serde_json::to_string_pretty(snapshot)?;
        payload.push('\n');

        let temp = self.temp_path();
        fs::write(&temp, payload)?;
        fs::rename(&temp, &self.path)?;
        tracing::debug!(
            path = %self.path.display(),
            occurrences = snapshot.occurrences.len(),
            "saved store"
        );
        Ok(())
    }
}
