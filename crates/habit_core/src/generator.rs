use chrono::NaiveDate;

use crate::horizon::candidate_dates;
use crate::model::{HabitDefinition, HabitSnapshot, Occurrence, OccurrenceId};

/// Builds the occurrences `habit` should have in `[range_start, range_end]`.
///
/// Pure: nothing is read from or written to a store. Merging is the lifecycle's job.
pub fn generate(
    habit: &HabitDefinition,
    range_start: NaiveDate,
    range_end: NaiveDate,
) -> Vec<Occurrence> {
    let candidates = candidate_dates(&habit.recurrence, habit.anchor_date, range_start, range_end);
    if candidates.is_empty() {
        return Vec::new();
    }

    let snapshot = HabitSnapshot::of(habit);
    candidates
        .into_iter()
        .map(|candidate| Occurrence {
            id: OccurrenceId::new(&habit.id, candidate.date),
            base_habit_id: habit.id.clone(),
            scheduled_date: candidate.date,
            completed: false,
            completed_at: None,
            week_start_date: candidate.week_start,
            weekly_completion_count: candidate.week_start.map(|_| 0),
            snapshot: snapshot.clone(),
        })
        .collect()
}
