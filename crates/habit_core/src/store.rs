use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{HabitDefinition, Occurrence};

/// The whole persisted state: habit definitions plus the flat occurrence collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub habits: Vec<HabitDefinition>,
    #[serde(default)]
    pub occurrences: Vec<Occurrence>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store contents could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Read/write access to persisted habits and occurrences. The whole collection moves at once.
pub trait HabitStore: Send + Sync {
    fn load(&self) -> Result<StoreSnapshot, StoreError>;
    fn save(&self, snapshot: &StoreSnapshot) -> Result<(), StoreError>;
}

/// Keeps everything in memory. Useful for tests and for shells that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.state.read().clone()
    }
}

impl HabitStore for MemoryStore {
    fn load(&self) -> Result<StoreSnapshot, StoreError> {
        Ok(self.state.read().clone())
    }

    fn save(&self, snapshot: &StoreSnapshot) -> Result<(), StoreError> {
        *self.state.write() = snapshot.clone();
        Ok(())
    }
}
