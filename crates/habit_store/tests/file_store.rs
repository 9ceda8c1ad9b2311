use std::fs;

use chrono::NaiveDate;
use habit_core::{HabitDefinition, HabitService, HabitStore, RecurrenceRule, Subtask};
use habit_store::JsonFileStore;
use tempfile::tempdir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn service_state_survives_reopening_the_file() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("state/habits.json");
    let today = date(2025, 11, 7);

    {
        let service = HabitService::builder(JsonFileStore::new(&path))
            .with_fixed_today(today)
            .horizon_days(14)
            .build();
        let mut habit =
            HabitDefinition::new("water", "Drink water", today, RecurrenceRule::custom(3));
        habit.subtasks.push(Subtask::new("bottle", "Refill bottle"));
        let outcome = service.create_habit(habit).expect("create habit");
        assert!(outcome.added > 0);
        service
            .complete_occurrence(&"water@2025-11-10".into())
            .expect("complete monday slot");
    }

    let raw = fs::read_to_string(&path).expect("read store");
    assert!(raw.contains("\"water@2025-11-10\""));
    assert!(raw.contains("\"kind\": \"custom\""));
    assert!(!path.with_file_name("habits.json.tmp").exists());

    let reopened = HabitService::builder(JsonFileStore::new(&path))
        .with_fixed_today(today)
        .horizon_days(14)
        .build();
    assert_eq!(reopened.refresh_horizon().expect("refresh").added, 0);

    let occurrences = reopened.occurrences_for("water").expect("occurrences");
    let monday = occurrences
        .iter()
        .find(|o| o.scheduled_date == date(2025, 11, 10))
        .expect("monday occurrence");
    assert!(monday.completed);
    assert!(monday.completed_at.is_some());
    assert_eq!(monday.week_start_date, Some(date(2025, 11, 10)));
    assert_eq!(monday.weekly_completion_count, Some(1));
    assert_eq!(monday.snapshot.subtasks.len(), 1);
}

#[test]
fn raw_snapshot_round_trips() {
    let temp = tempdir().expect("tempdir");
    let store = JsonFileStore::new(temp.path().join("habits.json"));
    let today = date(2025, 11, 7);
    let habit = HabitDefinition::new("walk", "Walk", today, RecurrenceRule::weekly([0, 6]));
    let mut snapshot = habit_core::StoreSnapshot {
        habits: vec![habit.clone()],
        occurrences: Vec::new(),
    };
    habit_core::ensure_horizon(&mut snapshot.occurrences, &snapshot.habits, today, 30);

    store.save(&snapshot).expect("save");
    assert_eq!(store.load().expect("load"), snapshot);
}
