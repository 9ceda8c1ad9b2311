use chrono::NaiveDate;
use thiserror::Error;

use crate::model::OccurrenceId;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum HabitError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("habit `{0}` does not exist")]
    UnknownHabit(String),
    #[error("habit `{0}` already exists")]
    DuplicateHabit(String),
    #[error("occurrence `{0}` does not exist")]
    UnknownOccurrence(OccurrenceId),
    #[error("occurrence `{occurrence}` has no subtask `{subtask}`")]
    UnknownSubtask {
        occurrence: OccurrenceId,
        subtask: String,
    },
    #[error("occurrence `{occurrence}` scheduled for {scheduled} is history and cannot change")]
    ImmutableHistory {
        occurrence: OccurrenceId,
        scheduled: NaiveDate,
    },
}

pub type Result<T, E = HabitError> = std::result::Result<T, E>;
