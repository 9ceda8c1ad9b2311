use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{HabitError, Result};
use crate::model::{Occurrence, OccurrenceId};

/// Marks an occurrence done. Completing twice keeps the first timestamp.
pub fn complete(
    occurrences: &mut [Occurrence],
    id: &OccurrenceId,
    at: DateTime<Utc>,
    today: NaiveDate,
) -> Result<()> {
    let occurrence = mutable_occurrence(occurrences, id, today)?;
    if !occurrence.completed {
        occurrence.completed = true;
        occurrence.completed_at = Some(at);
    }
    refresh_weekly_count(occurrences, id, today);
    Ok(())
}

pub fn reopen(occurrences: &mut [Occurrence], id: &OccurrenceId, today: NaiveDate) -> Result<()> {
    let occurrence = mutable_occurrence(occurrences, id, today)?;
    occurrence.completed = false;
    occurrence.completed_at = None;
    refresh_weekly_count(occurrences, id, today);
    Ok(())
}

/// Flips one subtask on an occurrence and returns its new state.
pub fn toggle_subtask(
    occurrences: &mut [Occurrence],
    id: &OccurrenceId,
    subtask_id: &str,
    today: NaiveDate,
) -> Result<bool> {
    let occurrence = mutable_occurrence(occurrences, id, today)?;
    let subtask = occurrence
        .snapshot
        .subtasks
        .iter_mut()
        .find(|subtask| subtask.id == subtask_id)
        .ok_or_else(|| HabitError::UnknownSubtask {
            occurrence: id.clone(),
            subtask: subtask_id.to_string(),
        })?;
    subtask.completed = !subtask.completed;
    Ok(subtask.completed)
}

fn mutable_occurrence<'a>(
    occurrences: &'a mut [Occurrence],
    id: &OccurrenceId,
    today: NaiveDate,
) -> Result<&'a mut Occurrence> {
    let occurrence = occurrences
        .iter_mut()
        .find(|occurrence| &occurrence.id == id)
        .ok_or_else(|| HabitError::UnknownOccurrence(id.clone()))?;
    if occurrence.is_history(today) {
        return Err(HabitError::ImmutableHistory {
            occurrence: id.clone(),
            scheduled: occurrence.scheduled_date,
        });
    }
    Ok(occurrence)
}

// Recounts completions across the Custom week the occurrence belongs to.
fn refresh_weekly_count(occurrences: &mut [Occurrence], id: &OccurrenceId, today: NaiveDate) {
    let Some((habit_id, week)) = occurrences
        .iter()
        .find(|occurrence| &occurrence.id == id)
        .and_then(|occurrence| {
            occurrence
                .week_start_date
                .map(|week| (occurrence.base_habit_id.clone(), week))
        })
    else {
        return;
    };
    recount_week(occurrences, &habit_id, week, today);
}

/// Writes the week's completion total onto its occurrences dated `today` or later.
///
/// Completions on history still count; history records themselves are left as they are.
pub(crate) fn recount_week(
    occurrences: &mut [Occurrence],
    habit_id: &str,
    week: NaiveDate,
    today: NaiveDate,
) {
    let in_week = |occurrence: &Occurrence| {
        occurrence.base_habit_id == habit_id && occurrence.week_start_date == Some(week)
    };
    let done = occurrences
        .iter()
        .filter(|occurrence| in_week(occurrence) && occurrence.completed)
        .count() as u32;
    for occurrence in occurrences
        .iter_mut()
        .filter(|occurrence| in_week(occurrence) && !occurrence.is_history(today))
    {
        occurrence.weekly_completion_count = Some(done);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate;
    use crate::model::{HabitDefinition, Subtask};
    use crate::rule::RecurrenceRule;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 20, 8, 30, 0).unwrap()
    }

    #[test]
    fn custom_week_tracks_completion_count() {
        let habit =
            HabitDefinition::new("read", "Read", date(2025, 10, 1), RecurrenceRule::custom(3));
        let mut occurrences = generate(&habit, date(2025, 10, 20), date(2025, 11, 2));
        let today = date(2025, 10, 20);

        complete(&mut occurrences, &"read@2025-10-20".into(), at(), today).unwrap();
        complete(&mut occurrences, &"read@2025-10-22".into(), at(), today).unwrap();
        complete(&mut occurrences, &"read@2025-10-22".into(), at(), today).unwrap();

        let this_week: Vec<_> = occurrences
            .iter()
            .filter(|o| o.week_start_date == Some(date(2025, 10, 20)))
            .collect();
        assert_eq!(this_week.len(), 3);
        assert!(this_week.iter().all(|o| o.weekly_completion_count == Some(2)));
        assert!(occurrences
            .iter()
            .filter(|o| o.week_start_date == Some(date(2025, 10, 27)))
            .all(|o| o.weekly_completion_count == Some(0)));

        reopen(&mut occurrences, &"read@2025-10-20".into(), today).unwrap();
        let first = occurrences.iter().find(|o| o.id.as_str() == "read@2025-10-20").unwrap();
        assert!(!first.completed);
        assert!(first.completed_at.is_none());
        assert_eq!(first.weekly_completion_count, Some(1));
    }

    #[test]
    fn history_cannot_be_completed() {
        let habit = HabitDefinition::new("walk", "Walk", date(2025, 10, 1), RecurrenceRule::Daily);
        let mut occurrences = generate(&habit, date(2025, 10, 18), date(2025, 10, 22));
        let err = complete(&mut occurrences, &"walk@2025-10-19".into(), at(), date(2025, 10, 20))
            .unwrap_err();
        assert!(matches!(err, HabitError::ImmutableHistory { .. }));
        let err = complete(&mut occurrences, &"walk@2030-01-01".into(), at(), date(2025, 10, 20))
            .unwrap_err();
        assert!(matches!(err, HabitError::UnknownOccurrence(_)));
    }

    #[test]
    fn toggles_subtasks_on_current_occurrence() {
        let mut habit =
            HabitDefinition::new("gym", "Gym", date(2025, 10, 1), RecurrenceRule::Daily);
        habit.subtasks.push(Subtask::new("warmup", "Warm up"));
        let mut occurrences = generate(&habit, date(2025, 10, 20), date(2025, 10, 21));
        let id: OccurrenceId = "gym@2025-10-20".into();
        let today = date(2025, 10, 20);

        assert!(toggle_subtask(&mut occurrences, &id, "warmup", today).unwrap());
        assert!(!toggle_subtask(&mut occurrences, &id, "warmup", today).unwrap());
        assert!(matches!(
            toggle_subtask(&mut occurrences, &id, "missing", today),
            Err(HabitError::UnknownSubtask { .. })
        ));
    }

    #[test]
    fn completing_later_in_the_week_leaves_history_untouched() {
        let habit =
            HabitDefinition::new("read", "Read", date(2025, 10, 1), RecurrenceRule::custom(3));
        let mut occurrences = generate(&habit, date(2025, 10, 20), date(2025, 10, 26));
        let today = date(2025, 10, 22);
        let monday_before = occurrences
            .iter()
            .find(|o| o.scheduled_date == date(2025, 10, 20))
            .cloned()
            .unwrap();

        complete(&mut occurrences, &"read@2025-10-22".into(), at(), today).unwrap();

        let monday_after = occurrences
            .iter()
            .find(|o| o.scheduled_date == date(2025, 10, 20))
            .unwrap();
        assert_eq!(&monday_before, monday_after);
        assert_eq!(
            serde_json::to_string(&monday_before).unwrap(),
            serde_json::to_string(monday_after).unwrap()
        );
        assert!(occurrences
            .iter()
            .filter(|o| o.scheduled_date >= today)
            .all(|o| o.weekly_completion_count == Some(1)));
    }
}
