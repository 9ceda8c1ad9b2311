use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::rule::RecurrenceRule;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subtask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

impl Subtask {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            completed: false,
        }
    }
}

/// The user-authored record. Exactly one exists per logical habit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HabitDefinition {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub xp_value: u32,
    pub anchor_date: NaiveDate,
    #[serde(default)]
    pub recurrence: RecurrenceRule,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub goal_id: Option<String>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

impl HabitDefinition {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        anchor_date: NaiveDate,
        recurrence: RecurrenceRule,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            category: String::new(),
            priority: Priority::default(),
            xp_value: 0,
            anchor_date,
            recurrence,
            project_id: None,
            goal_id: None,
            subtasks: Vec::new(),
        }
    }
}

/// Content-addressed key of an occurrence: the base habit id joined with the ISO date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OccurrenceId(String);

impl OccurrenceId {
    pub fn new(base_habit_id: &str, scheduled_date: NaiveDate) -> Self {
        Self(format!(
            "{}@{}",
            base_habit_id,
            scheduled_date.format("%Y-%m-%d")
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OccurrenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for OccurrenceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for OccurrenceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Descriptive fields copied from the base habit onto each occurrence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HabitSnapshot {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub xp_value: u32,
    #[serde(default)]
    pub recurrence: RecurrenceRule,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub goal_id: Option<String>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

impl HabitSnapshot {
    /// Copies the habit's descriptive fields with every subtask reset to incomplete.
    pub fn of(habit: &HabitDefinition) -> Self {
        Self {
            title: habit.title.clone(),
            description: habit.description.clone(),
            category: habit.category.clone(),
            priority: habit.priority,
            xp_value: habit.xp_value,
            recurrence: habit.recurrence.clone(),
            project_id: habit.project_id.clone(),
            goal_id: habit.goal_id.clone(),
            subtasks: habit
                .subtasks
                .iter()
                .map(|subtask| Subtask {
                    completed: false,
                    ..subtask.clone()
                })
                .collect(),
        }
    }
}

/// A calendar-bound, completable instance of a habit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Occurrence {
    pub id: OccurrenceId,
    pub base_habit_id: String,
    pub scheduled_date: NaiveDate,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_completion_count: Option<u32>,
    #[serde(flatten)]
    pub snapshot: HabitSnapshot,
}

impl Occurrence {
    /// History is anything scheduled strictly before `today`.
    pub fn is_history(&self, today: NaiveDate) -> bool {
        self.scheduled_date < today
    }

    pub fn title(&self) -> &str {
        &self.snapshot.title
    }
}
