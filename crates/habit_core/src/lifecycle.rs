use std::collections::{BTreeSet, HashSet};

use chrono::{Days, NaiveDate};
use tracing::debug;

use crate::completion::recount_week;
use crate::generator::generate;
use crate::horizon::MAX_HORIZON_DAYS;
use crate::model::{HabitDefinition, HabitSnapshot, Occurrence, OccurrenceId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HorizonReport {
    pub habits_considered: usize,
    pub added: usize,
}

/// Makes sure every recurring habit has its occurrences for `[today, today + horizon_days]`.
///
/// Only ids missing from `occurrences` are appended, so repeated calls converge. The window is
/// clamped to [`MAX_HORIZON_DAYS`]; a window running past the last representable date adds
/// nothing. Custom weeks that gain occurrences have their completion count rewritten on every
/// occurrence dated `today` or later.
pub fn ensure_horizon(
    occurrences: &mut Vec<Occurrence>,
    habits: &[HabitDefinition],
    today: NaiveDate,
    horizon_days: u32,
) -> HorizonReport {
    let days = horizon_days.min(MAX_HORIZON_DAYS);
    let mut report = HorizonReport::default();
    let Some(range_end) = today.checked_add_days(Days::new(u64::from(days))) else {
        debug!(%today, days, "horizon runs past the calendar");
        return report;
    };
    let mut known: HashSet<OccurrenceId> =
        occurrences.iter().map(|occurrence| occurrence.id.clone()).collect();
    let mut touched_weeks = BTreeSet::new();

    for habit in habits.iter().filter(|habit| habit.recurrence.is_recurring()) {
        report.habits_considered += 1;
        let before = occurrences.len();
        for occurrence in generate(habit, today, range_end) {
            if known.insert(occurrence.id.clone()) {
                if let Some(week) = occurrence.week_start_date {
                    touched_weeks.insert((habit.id.clone(), week));
                }
                occurrences.push(occurrence);
            }
        }
        let added = occurrences.len() - before;
        if added > 0 {
            debug!(habit_id = %habit.id, added, "extended habit horizon");
        }
        report.added += added;
    }
    for (habit_id, week) in touched_weeks {
        recount_week(occurrences, &habit_id, week, today);
    }
    report
}

/// Pushes the edited habit's descriptive fields onto its occurrences dated `today` or later.
///
/// Subtask progress on those occurrences is reset. Completion of the occurrence itself is
/// kept, including for an occurrence already completed today.
pub fn on_edit(
    updated: &HabitDefinition,
    occurrences: &mut [Occurrence],
    today: NaiveDate,
) -> usize {
    let snapshot = HabitSnapshot::of(updated);
    let mut touched = 0;
    for occurrence in occurrences
        .iter_mut()
        .filter(|occurrence| occurrence.base_habit_id == updated.id)
        .filter(|occurrence| !occurrence.is_history(today))
    {
        occurrence.snapshot = snapshot.clone();
        touched += 1;
    }
    touched
}

/// Drops the habit's occurrences dated `today` or later. Earlier ones stay as orphaned history.
pub fn on_delete(habit_id: &str, occurrences: &mut Vec<Occurrence>, today: NaiveDate) -> usize {
    let before = occurrences.len();
    occurrences
        .retain(|occurrence| occurrence.base_habit_id != habit_id || occurrence.is_history(today));
    before - occurrences.len()
}
