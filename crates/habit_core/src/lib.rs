pub mod completion;
pub mod error;
pub mod generator;
pub mod horizon;
pub mod lifecycle;
pub mod model;
pub mod rule;
pub mod service;
pub mod store;

pub use crate::error::HabitError;
pub use crate::generator::generate;
pub use crate::horizon::{candidate_dates, Candidate, DEFAULT_HORIZON_DAYS, MAX_HORIZON_DAYS};
pub use crate::lifecycle::{ensure_horizon, on_delete, on_edit, HorizonReport};
pub use crate::model::{HabitDefinition, Occurrence, OccurrenceId, Priority, Subtask};
pub use crate::rule::RecurrenceRule;
pub use crate::service::{HabitService, HabitServiceBuilder, LifecycleEvent, LifecycleOutcome};
pub use crate::store::{HabitStore, MemoryStore, StoreError, StoreSnapshot};
