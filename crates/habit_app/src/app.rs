use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use habit_core::{
    HabitDefinition, HabitService, Occurrence, OccurrenceId, Subtask, DEFAULT_HORIZON_DAYS,
    MAX_HORIZON_DAYS,
};
use habit_store::JsonFileStore;
use tracing::{debug, info, warn};

use crate::cli::{Cli, Command};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub(crate) store_path: PathBuf,
    pub(crate) horizon_days: u32,
    pub(crate) today: Option<NaiveDate>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(path) = lookup("HABITS_STORE") {
            if !path.trim().is_empty() {
                config.store_path = PathBuf::from(path.trim());
            }
        }
        if let Some(span) = lookup("HABITS_HORIZON_DAYS") {
            match span.trim().parse::<u32>() {
                Ok(value) if horizon_in_range(value) => config.horizon_days = value,
                _ => warn!(
                    value = %span,
                    max = MAX_HORIZON_DAYS,
                    "ignoring invalid HABITS_HORIZON_DAYS"
                ),
            }
        }
        if let Some(today) = lookup("HABITS_TODAY") {
            let date = NaiveDate::parse_from_str(today.trim(), "%Y-%m-%d")
                .with_context(|| format!("HABITS_TODAY `{today}` is not a YYYY-MM-DD date"))?;
            config.today = Some(date);
        }
        Ok(config)
    }

    /// Command-line flags win over the environment.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(path) = &cli.store {
            self.store_path = path.clone();
        }
        if let Some(days) = cli.horizon_days.filter(|days| horizon_in_range(*days)) {
            self.horizon_days = days;
        }
        if let Some(today) = cli.today {
            self.today = Some(today);
        }
    }
}

fn horizon_in_range(days: u32) -> bool {
    (1..=MAX_HORIZON_DAYS).contains(&days)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("habits.json"),
            horizon_days: DEFAULT_HORIZON_DAYS,
            today: None,
        }
    }
}

pub fn build_service(config: &AppConfig) -> HabitService<JsonFileStore> {
    info!(
        path = %config.store_path.display(),
        horizon_days = config.horizon_days,
        "opening habit store"
    );
    let mut builder = HabitService::builder(JsonFileStore::new(&config.store_path))
        .horizon_days(config.horizon_days);
    if let Some(today) = config.today {
        builder = builder.with_fixed_today(today);
    }
    builder.build()
}

/// Runs one command and returns the lines to print.
pub fn run(config: AppConfig, command: Command) -> Result<Vec<String>> {
    let service = build_service(&config);
    let today = service.today();
    let mut out = Vec::new();

    match command {
        Command::Refresh => {
            let outcome = service.refresh_horizon().context("horizon refresh failed")?;
            out.push(format!("added {} occurrence(s)", outcome.added));
        }
        Command::Add {
            title,
            id,
            rule,
            anchor,
            description,
            category,
            priority,
            xp,
            subtasks,
            project,
            goal,
        } => {
            let id = id.unwrap_or_else(|| slugify(&title));
            let mut habit = HabitDefinition::new(id, title, anchor.unwrap_or(today), rule);
            habit.description = description;
            habit.category = category;
            habit.priority = priority.into();
            habit.xp_value = xp;
            habit.subtasks = numbered_subtasks(subtasks);
            habit.project_id = project;
            habit.goal_id = goal;
            let habit_id = habit.id.clone();
            let outcome = service
                .create_habit(habit)
                .with_context(|| format!("unable to create habit `{habit_id}`"))?;
            out.push(format!(
                "created {habit_id} with {} occurrence(s)",
                outcome.added
            ));
        }
        Command::Edit {
            id,
            title,
            rule,
            description,
            category,
            priority,
            xp,
            subtasks,
        } => {
            let mut habit = service.habit(&id)?;
            if let Some(title) = title {
                habit.title = title;
            }
            if let Some(rule) = rule {
                habit.recurrence = rule;
            }
            if let Some(description) = description {
                habit.description = description;
            }
            if let Some(category) = category {
                habit.category = category;
            }
            if let Some(priority) = priority {
                habit.priority = priority.into();
            }
            if let Some(xp) = xp {
                habit.xp_value = xp;
            }
            if !subtasks.is_empty() {
                habit.subtasks = numbered_subtasks(subtasks);
            }
            let outcome = service
                .edit_habit(habit)
                .with_context(|| format!("unable to edit habit `{id}`"))?;
            out.push(format!(
                "updated {} occurrence(s), added {}",
                outcome.updated, outcome.added
            ));
        }
        Command::Delete { id } => {
            let outcome = service
                .delete_habit(&id)
                .with_context(|| format!("unable to delete habit `{id}`"))?;
            out.push(format!("removed {} upcoming occurrence(s)", outcome.removed));
        }
        Command::Habits => {
            for habit in service.habits()? {
                out.push(format!(
                    "{}\t{}\t{}\tsince {}",
                    habit.id, habit.title, habit.recurrence, habit.anchor_date
                ));
            }
        }
        Command::List { days, habit } => {
            let end = today
                .checked_add_days(Days::new(u64::from(days)))
                .with_context(|| {
                    format!("listing {days} days from {today} runs past the calendar")
                })?;
            let occurrences = service.occurrences_between(today, end)?;
            for occurrence in occurrences
                .iter()
                .filter(|o| habit.as_deref().map_or(true, |id| o.base_habit_id == id))
            {
                out.push(describe_occurrence(occurrence, today));
            }
        }
        Command::Complete { occurrence } => {
            let id = OccurrenceId::from(occurrence);
            service.complete_occurrence(&id)?;
            out.push(format!("completed {id}"));
        }
        Command::Reopen { occurrence } => {
            let id = OccurrenceId::from(occurrence);
            service.reopen_occurrence(&id)?;
            out.push(format!("reopened {id}"));
        }
        Command::ToggleSubtask {
            occurrence,
            subtask,
        } => {
            let id = OccurrenceId::from(occurrence);
            let done = service.toggle_subtask(&id, &subtask)?;
            out.push(format!(
                "{subtask} on {id} is now {}",
                if done { "done" } else { "open" }
            ));
        }
    }

    debug!(lines = out.len(), "command finished");
    Ok(out)
}

fn numbered_subtasks(titles: Vec<String>) -> Vec<Subtask> {
    titles
        .into_iter()
        .enumerate()
        .map(|(idx, title)| Subtask::new(format!("s{}", idx + 1), title))
        .collect()
}

fn slugify(title: &str) -> String {
    let mut slug = String::new();
    for ch in title.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let trimmed = slug.trim_end_matches('-');
    if trimmed.is_empty() {
        "habit".to_string()
    } else {
        trimmed.to_string()
    }
}

fn describe_occurrence(occurrence: &Occurrence, today: NaiveDate) -> String {
    let mark = if occurrence.completed { "x" } else { " " };
    let mut line = format!(
        "[{mark}] {} ({})  {}  {}",
        occurrence.scheduled_date,
        format_relative_label(occurrence.scheduled_date, today),
        occurrence.title(),
        occurrence.id
    );
    if let Some(count) = occurrence.weekly_completion_count {
        line.push_str(&format!("  week {count}"));
    }
    let subtasks = &occurrence.snapshot.subtasks;
    if !subtasks.is_empty() {
        let done = subtasks.iter().filter(|subtask| subtask.completed).count();
        line.push_str(&format!("  subtasks {done}/{}", subtasks.len()));
    }
    line
}

fn format_relative_label(date: NaiveDate, today: NaiveDate) -> String {
    let diff = date.signed_duration_since(today).num_days();
    match diff {
        -1 => "yesterday".to_string(),
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        d if d < 0 => format!("{} days ago", -d),
        d => format!("in {} days", d),
    }
}
