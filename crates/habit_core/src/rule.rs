use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Declarative shape of a recurrence. Weekdays are numbered 0 = Sunday through 6 = Saturday.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecurrenceRule {
    #[default]
    None,
    Daily,
    Weekly {
        weekdays: BTreeSet<u8>,
    },
    Custom {
        times_per_week: i32,
    },
}

impl RecurrenceRule {
    pub fn weekly(days: impl IntoIterator<Item = u8>) -> Self {
        Self::Weekly {
            weekdays: days.into_iter().collect(),
        }
    }

    pub fn custom(times_per_week: i32) -> Self {
        Self::Custom { times_per_week }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Day-of-week index with Sunday as 0.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Monday of the calendar week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as i64;
    date - chrono::Duration::days(offset)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleParseError {
    #[error("unknown recurrence kind `{0}`")]
    UnknownKind(String),
    #[error("invalid weekday `{0}` (expected 0-6 or a day name)")]
    InvalidWeekday(String),
    #[error("invalid weekly frequency `{0}`")]
    InvalidFrequency(String),
}

impl FromStr for RecurrenceRule {
    type Err = RuleParseError;

    /// Accepts `none`, `daily`, `weekly:1,3,5` (or `weekly:mon,wed,fri`) and `custom:3`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let (kind, rest) = match trimmed.split_once(':') {
            Some((kind, rest)) => (kind.trim(), Some(rest.trim())),
            None => (trimmed, None),
        };
        match kind.to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "daily" => Ok(Self::Daily),
            "weekly" => {
                let mut weekdays = BTreeSet::new();
                for token in rest.unwrap_or("").split(',') {
                    let token = token.trim();
                    if token.is_empty() {
                        continue;
                    }
                    weekdays.insert(parse_weekday(token)?);
                }
                Ok(Self::Weekly { weekdays })
            }
            "custom" => {
                let raw = rest.unwrap_or("");
                let times_per_week = raw
                    .parse::<i32>()
                    .map_err(|_| RuleParseError::InvalidFrequency(raw.to_string()))?;
                Ok(Self::Custom { times_per_week })
            }
            other => Err(RuleParseError::UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Daily => f.write_str("daily"),
            Self::Weekly { weekdays } => {
                let days: Vec<String> = weekdays.iter().map(|d| d.to_string()).collect();
                write!(f, "weekly:{}", days.join(","))
            }
            Self::Custom { times_per_week } => write!(f, "custom:{times_per_week}"),
        }
    }
}

fn parse_weekday(token: &str) -> Result<u8, RuleParseError> {
    if let Ok(value) = token.parse::<u8>() {
        if value <= 6 {
            return Ok(value);
        }
        return Err(RuleParseError::InvalidWeekday(token.to_string()));
    }
    let lower = token.to_ascii_lowercase();
    let index = match lower.get(..3) {
        Some("sun") => 0,
        Some("mon") => 1,
        Some("tue") => 2,
        Some("wed") => 3,
        Some("thu") => 4,
        Some("fri") => 5,
        Some("sat") => 6,
        _ => return Err(RuleParseError::InvalidWeekday(token.to_string())),
    };
    Ok(index)
}
