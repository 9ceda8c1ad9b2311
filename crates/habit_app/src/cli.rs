use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use habit_core::{Priority, RecurrenceRule, MAX_HORIZON_DAYS};

const RULE_HELP: &str = "none | daily | weekly:mon,wed,fri | custom:<times per week>";

#[derive(Debug, Parser)]
#[command(name = "habits")]
#[command(about = "Track recurring habits and their calendar occurrences")]
#[command(
    after_help = "Environment:\n  HABITS_STORE         JSON store path\n  HABITS_HORIZON_DAYS  Days of occurrences kept ahead of today\n  HABITS_TODAY         Override today's date (YYYY-MM-DD)\n  HABITS_LOG           Log filter, e.g. debug"
)]
pub struct Cli {
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_HORIZON_DAYS))
    )]
    pub horizon_days: Option<u32>,
    #[arg(long, global = true)]
    pub today: Option<NaiveDate>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate any missing occurrences inside the horizon.
    Refresh,
    /// Create a habit and fill its first horizon.
    Add {
        title: String,
        #[arg(long)]
        id: Option<String>,
        #[arg(long, default_value = "daily", help = RULE_HELP)]
        rule: RecurrenceRule,
        /// Creation date; occurrences start the day after. Defaults to today.
        #[arg(long)]
        anchor: Option<NaiveDate>,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long, value_enum, default_value_t = PriorityArg::Medium)]
        priority: PriorityArg,
        #[arg(long, default_value_t = 10)]
        xp: u32,
        #[arg(long = "subtask")]
        subtasks: Vec<String>,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        goal: Option<String>,
    },
    /// Change a habit; occurrences from today on pick up the new details.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, help = RULE_HELP)]
        rule: Option<RecurrenceRule>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, value_enum)]
        priority: Option<PriorityArg>,
        #[arg(long)]
        xp: Option<u32>,
        /// Replaces the subtask list when given at least once.
        #[arg(long = "subtask")]
        subtasks: Vec<String>,
    },
    /// Remove a habit and its upcoming occurrences. Past occurrences are kept.
    Delete { id: String },
    /// List habit definitions.
    Habits,
    /// Show occurrences from today onwards.
    List {
        #[arg(long, default_value_t = 7)]
        days: u32,
        #[arg(long)]
        habit: Option<String>,
    },
    Complete { occurrence: String },
    Reopen { occurrence: String },
    ToggleSubtask { occurrence: String, subtask: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PriorityArg {
    Low,
    Medium,
    High,
}

impl From<PriorityArg> for Priority {
    fn from(value: PriorityArg) -> Self {
        match value {
            PriorityArg::Low => Priority::Low,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::High => Priority::High,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_with_rule() {
        let cli = Cli::try_parse_from([
            "habits",
            "--today",
            "2025-10-20",
            "add",
            "Gym",
            "--rule",
            "weekly:mon,wed,fri",
            "--subtask",
            "Warm up",
            "--subtask",
            "Lift",
        ])
        .unwrap();
        assert_eq!(cli.today, NaiveDate::from_ymd_opt(2025, 10, 20));
        match cli.command {
            Some(Command::Add { rule, subtasks, .. }) => {
                assert_eq!(rule, RecurrenceRule::weekly([1, 3, 5]));
                assert_eq!(subtasks, vec!["Warm up", "Lift"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_rule() {
        assert!(Cli::try_parse_from(["habits", "add", "Gym", "--rule", "monthly"]).is_err());
    }

    #[test]
    fn rejects_horizon_outside_range() {
        assert!(Cli::try_parse_from(["habits", "--horizon-days", "10000", "refresh"]).is_err());
        assert!(Cli::try_parse_from(["habits", "--horizon-days", "0", "refresh"]).is_err());
        let cli = Cli::try_parse_from(["habits", "--horizon-days", "366", "refresh"]).unwrap();
        assert_eq!(cli.horizon_days, Some(MAX_HORIZON_DAYS));
    }
}
