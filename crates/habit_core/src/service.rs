use chrono::{Local, NaiveDate, Utc};
use tracing::{debug, info, instrument};

use crate::{
    completion,
    error::{HabitError, Result},
    horizon::DEFAULT_HORIZON_DAYS,
    lifecycle::{self, HorizonReport},
    model::{HabitDefinition, Occurrence, OccurrenceId},
    store::{HabitStore, StoreSnapshot},
};

type Clock = Box<dyn Fn() -> NaiveDate + Send + Sync>;

/// Events that change which occurrences should exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    Created(HabitDefinition),
    Edited(HabitDefinition),
    Deleted(String),
    Refresh,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleOutcome {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
}

impl From<HorizonReport> for LifecycleOutcome {
    fn from(report: HorizonReport) -> Self {
        Self {
            added: report.added,
            ..Self::default()
        }
    }
}

/// Loads state from a [`HabitStore`], runs the lifecycle rules over it and writes it back.
pub struct HabitService<S> {
    store: S,
    horizon_days: u32,
    clock: Clock,
}

pub struct HabitServiceBuilder<S> {
    store: S,
    horizon_days: u32,
    clock: Option<Clock>,
}

impl<S: HabitStore> HabitServiceBuilder<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            horizon_days: DEFAULT_HORIZON_DAYS,
            clock: None,
        }
    }

    pub fn horizon_days(mut self, days: u32) -> Self {
        self.horizon_days = days;
        self
    }

    /// Replaces the local-calendar clock used to decide what "today" is.
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn with_fixed_today(self, today: NaiveDate) -> Self {
        self.with_clock(move || today)
    }

    pub fn build(self) -> HabitService<S> {
        HabitService {
            store: self.store,
            horizon_days: self.horizon_days,
            clock: self
                .clock
                .unwrap_or_else(|| Box::new(|| Local::now().date_naive())),
        }
    }
}

impl<S: HabitStore> HabitService<S> {
    pub fn builder(store: S) -> HabitServiceBuilder<S> {
        HabitServiceBuilder::new(store)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    pub fn habits(&self) -> Result<Vec<HabitDefinition>> {
        Ok(self.store.load()?.habits)
    }

    pub fn habit(&self, id: &str) -> Result<HabitDefinition> {
        self.store
            .load()?
            .habits
            .into_iter()
            .find(|habit| habit.id == id)
            .ok_or_else(|| HabitError::UnknownHabit(id.to_string()))
    }

    /// Occurrences scheduled in `[start, end]`, ordered by date and then title.
    pub fn occurrences_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Occurrence>> {
        let mut items: Vec<Occurrence> = self
            .store
            .load()?
            .occurrences
            .into_iter()
            .filter(|occurrence| {
                occurrence.scheduled_date >= start && occurrence.scheduled_date <= end
            })
            .collect();
        items.sort_by(|a, b| {
            a.scheduled_date
                .cmp(&b.scheduled_date)
                .then_with(|| a.title().cmp(b.title()))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(items)
    }

    pub fn occurrences_for(&self, habit_id: &str) -> Result<Vec<Occurrence>> {
        let mut items: Vec<Occurrence> = self
            .store
            .load()?
            .occurrences
            .into_iter()
            .filter(|occurrence| occurrence.base_habit_id == habit_id)
            .collect();
        items.sort_by_key(|occurrence| occurrence.scheduled_date);
        Ok(items)
    }

    pub fn create_habit(&self, habit: HabitDefinition) -> Result<LifecycleOutcome> {
        self.apply(LifecycleEvent::Created(habit))
    }

    pub fn edit_habit(&self, habit: HabitDefinition) -> Result<LifecycleOutcome> {
        self.apply(LifecycleEvent::Edited(habit))
    }

    pub fn delete_habit(&self, habit_id: &str) -> Result<LifecycleOutcome> {
        self.apply(LifecycleEvent::Deleted(habit_id.to_string()))
    }

    pub fn refresh_horizon(&self) -> Result<LifecycleOutcome> {
        self.apply(LifecycleEvent::Refresh)
    }

    #[instrument(skip(self, event), fields(event = event_name(&event)))]
    pub fn apply(&self, event: LifecycleEvent) -> Result<LifecycleOutcome> {
        let today = self.today();
        let mut state = self.store.load()?;
        let outcome = match event {
            LifecycleEvent::Created(habit) => {
                if state.habits.iter().any(|existing| existing.id == habit.id) {
                    return Err(HabitError::DuplicateHabit(habit.id));
                }
                info!(habit_id = %habit.id, rule = %habit.recurrence, "creating habit");
                state.habits.push(habit);
                LifecycleOutcome::from(self.extend_horizon(&mut state, today))
            }
            LifecycleEvent::Edited(habit) => {
                let slot = state
                    .habits
                    .iter_mut()
                    .find(|existing| existing.id == habit.id)
                    .ok_or_else(|| HabitError::UnknownHabit(habit.id.clone()))?;
                *slot = habit.clone();
                let updated = lifecycle::on_edit(&habit, &mut state.occurrences, today);
                info!(habit_id = %habit.id, updated, "propagated habit edit");
                LifecycleOutcome {
                    updated,
                    ..LifecycleOutcome::from(self.extend_horizon(&mut state, today))
                }
            }
            LifecycleEvent::Deleted(habit_id) => {
                let before = state.habits.len();
                state.habits.retain(|habit| habit.id != habit_id);
                if state.habits.len() == before {
                    return Err(HabitError::UnknownHabit(habit_id));
                }
                let removed = lifecycle::on_delete(&habit_id, &mut state.occurrences, today);
                info!(habit_id = %habit_id, removed, "deleted habit");
                LifecycleOutcome {
                    removed,
                    ..LifecycleOutcome::default()
                }
            }
            LifecycleEvent::Refresh => {
                LifecycleOutcome::from(self.extend_horizon(&mut state, today))
            }
        };
        self.store.save(&state)?;
        Ok(outcome)
    }

    #[instrument(skip(self))]
    pub fn complete_occurrence(&self, id: &OccurrenceId) -> Result<()> {
        let today = self.today();
        let mut state = self.store.load()?;
        completion::complete(&mut state.occurrences, id, Utc::now(), today)?;
        self.store.save(&state)?;
        debug!(occurrence = %id, "occurrence completed");
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn reopen_occurrence(&self, id: &OccurrenceId) -> Result<()> {
        let today = self.today();
        let mut state = self.store.load()?;
        completion::reopen(&mut state.occurrences, id, today)?;
        self.store.save(&state)?;
        debug!(occurrence = %id, "occurrence reopened");
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn toggle_subtask(&self, id: &OccurrenceId, subtask_id: &str) -> Result<bool> {
        let today = self.today();
        let mut state = self.store.load()?;
        let completed = completion::toggle_subtask(&mut state.occurrences, id, subtask_id, today)?;
        self.store.save(&state)?;
        Ok(completed)
    }
}

impl<S: HabitStore> HabitService<S> {
    fn extend_horizon(&self, state: &mut StoreSnapshot, today: NaiveDate) -> HorizonReport {
        let report = lifecycle::ensure_horizon(
            &mut state.occurrences,
            &state.habits,
            today,
            self.horizon_days,
        );
        debug!(
            %today,
            horizon_days = self.horizon_days,
            habits = report.habits_considered,
            added = report.added,
            "horizon ensured"
        );
        report
    }
}

fn event_name(event: &LifecycleEvent) -> &'static str {
    match event {
        LifecycleEvent::Created(_) => "created",
        LifecycleEvent::Edited(_) => "edited",
        LifecycleEvent::Deleted(_) => "deleted",
        LifecycleEvent::Refresh => "refresh",
    }
}
