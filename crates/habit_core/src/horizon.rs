use chrono::{Days, NaiveDate};

use crate::rule::{week_start, weekday_index, RecurrenceRule};

/// Default rolling window, in days, kept pre-generated ahead of today.
pub const DEFAULT_HORIZON_DAYS: u32 = 30;

/// Largest window accepted; longer requests are clamped to it.
pub const MAX_HORIZON_DAYS: u32 = 366;

/// A date selected by a rule. Custom rules also carry the Monday of the week the date belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Candidate {
    pub date: NaiveDate,
    pub week_start: Option<NaiveDate>,
}

impl Candidate {
    fn plain(date: NaiveDate) -> Self {
        Self {
            date,
            week_start: None,
        }
    }
}

/// Dates in the inclusive range `[range_start, range_end]` selected by `rule`, sorted and unique.
///
/// Nothing is ever produced on or before `anchor`; the window effectively starts the day after
/// the habit was created. Degenerate rules (no weekdays, non-positive frequency) select nothing.
pub fn candidate_dates(
    rule: &RecurrenceRule,
    anchor: NaiveDate,
    range_start: NaiveDate,
    range_end: NaiveDate,
) -> Vec<Candidate> {
    let Some(day_after_anchor) = anchor.checked_add_days(Days::new(1)) else {
        return Vec::new();
    };
    let effective_start = range_start.max(day_after_anchor);
    if range_end < effective_start {
        return Vec::new();
    }

    match rule {
        RecurrenceRule::None => Vec::new(),
        RecurrenceRule::Daily => days_between(effective_start, range_end)
            .map(Candidate::plain)
            .collect(),
        RecurrenceRule::Weekly { weekdays } => {
            if weekdays.is_empty() {
                return Vec::new();
            }
            days_between(effective_start, range_end)
                .filter(|date| weekdays.contains(&weekday_index(*date)))
                .map(Candidate::plain)
                .collect()
        }
        RecurrenceRule::Custom { times_per_week } => {
            custom_dates(*times_per_week, effective_start, range_end)
        }
    }
}

fn custom_dates(times_per_week: i32, start: NaiveDate, end: NaiveDate) -> Vec<Candidate> {
    if times_per_week <= 0 {
        return Vec::new();
    }
    let count = times_per_week.min(7) as u64;
    let spacing = 7 / count;

    let mut out = Vec::new();
    let mut monday = week_start(start);
    while monday <= end {
        for slot in 0..count {
            let Some(date) = monday.checked_add_days(Days::new(slot * spacing)) else {
                break;
            };
            if date >= start && date <= end {
                out.push(Candidate {
                    date,
                    week_start: Some(monday),
                });
            }
        }
        match monday.checked_add_days(Days::new(7)) {
            Some(next) => monday = next,
            None => break,
        }
    }
    out
}

fn days_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |date| *date <= end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn daily_starts_the_day_after_anchor() {
        let anchor = date(2025, 10, 20);
        let dates = candidate_dates(&RecurrenceRule::Daily, anchor, anchor, date(2025, 10, 25));
        assert_eq!(dates.len(), 5);
        assert_eq!(dates[0].date, date(2025, 10, 21));
        assert!(dates.iter().all(|c| c.week_start.is_none()));
    }

    #[test]
    fn weekly_skips_anchor_even_when_weekday_matches() {
        // 2025-10-20 is a Monday.
        let anchor = date(2025, 10, 20);
        let rule = RecurrenceRule::weekly([1]);
        let dates = candidate_dates(&rule, anchor, anchor, date(2025, 11, 3));
        let picked: Vec<_> = dates.iter().map(|c| c.date).collect();
        assert_eq!(picked, vec![date(2025, 10, 27), date(2025, 11, 3)]);
    }

    #[test]
    fn degenerate_rules_select_nothing() {
        let anchor = date(2025, 1, 1);
        let end = date(2025, 3, 1);
        assert!(candidate_dates(&RecurrenceRule::None, anchor, anchor, end).is_empty());
        assert!(candidate_dates(&RecurrenceRule::weekly([]), anchor, anchor, end).is_empty());
        assert!(candidate_dates(&RecurrenceRule::custom(0), anchor, anchor, end).is_empty());
        assert!(candidate_dates(&RecurrenceRule::custom(-2), anchor, anchor, end).is_empty());
        assert!(candidate_dates(&RecurrenceRule::Daily, anchor, end, anchor).is_empty());
    }

    #[test]
    fn custom_pattern_is_anchored_on_monday() {
        let anchor = date(2025, 9, 1);
        let rule = RecurrenceRule::custom(3);
        // Window opening on a Thursday still sees the Mon/Wed/Fri pattern, clipped to Fri.
        let dates = candidate_dates(&rule, anchor, date(2025, 10, 23), date(2025, 10, 29));
        let picked: Vec<_> = dates.iter().map(|c| c.date).collect();
        assert_eq!(
            picked,
            vec![date(2025, 10, 24), date(2025, 10, 27), date(2025, 10, 29)]
        );
        assert_eq!(dates[0].week_start, Some(date(2025, 10, 20)));
        assert_eq!(dates[1].week_start, Some(date(2025, 10, 27)));
    }

    #[test]
    fn custom_frequency_caps_at_seven() {
        let anchor = date(2025, 9, 1);
        let dates = candidate_dates(
            &RecurrenceRule::custom(12),
            anchor,
            date(2025, 10, 20),
            date(2025, 10, 26),
        );
        assert_eq!(dates.len(), 7);
    }

    #[test]
    fn custom_respects_creation_day() {
        // Created Monday 2025-10-20; the Monday slot of that week must not be produced.
        let anchor = date(2025, 10, 20);
        let dates = candidate_dates(
            &RecurrenceRule::custom(3),
            anchor,
            anchor,
            date(2025, 10, 26),
        );
        let picked: Vec<_> = dates.iter().map(|c| c.date).collect();
        assert_eq!(picked, vec![date(2025, 10, 22), date(2025, 10, 24)]);
    }
}
