//! Calendar-day arithmetic: day normalization, streaks and the weekly view.
//!
//! All comparisons here are calendar-day comparisons in UTC. A completion
//! recorded at any instant during a day matches that whole day.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashSet;

/// Storage format for normalized days.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Normalize an ISO-8601 date or datetime to its UTC calendar day,
/// discarding any time-of-day component.
pub fn normalize_day(input: &str) -> Result<NaiveDate, String> {
    if let Ok(date) = NaiveDate::parse_from_str(input, DAY_FORMAT) {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc).date_naive());
    }
    Err(format!(
        "Invalid date '{}': expected YYYY-MM-DD or an ISO-8601 datetime",
        input
    ))
}

/// Today's calendar day in UTC.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// The Monday of the week containing `day`.
pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.weekday().num_days_from_monday() as i64)
}

/// The seven days Monday through Sunday of the week containing `day`.
pub fn week_days(day: NaiveDate) -> Vec<NaiveDate> {
    let monday = week_start(day);
    (0..7).map(|i| monday + Duration::days(i)).collect()
}

/// Count of consecutive completed days ending at `reference`, walking
/// backward. Zero when `reference` itself has no completion.
pub fn current_streak(completed: &HashSet<NaiveDate>, reference: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut day = reference;
    while completed.contains(&day) {
        streak += 1;
        day -= Duration::days(1);
    }
    streak
}

/// Longest run of consecutive completed days anywhere in the history.
pub fn longest_streak(completed: &HashSet<NaiveDate>) -> u32 {
    let mut longest = 0;
    for &day in completed {
        // Only start counting at the beginning of a run.
        if completed.contains(&(day - Duration::days(1))) {
            continue;
        }
        let mut run = 1;
        let mut next = day + Duration::days(1);
        while completed.contains(&next) {
            run += 1;
            next += Duration::days(1);
        }
        longest = longest.max(run);
    }
    longest
}

/// One cell of the weekly grid.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeekDay {
    pub date: NaiveDate,
    pub completed: bool,
}

/// Monday-through-Sunday of the week containing `reference`, each day
/// paired with whether the habit was completed on it.
pub fn weekly_view(completed: &HashSet<NaiveDate>, reference: NaiveDate) -> Vec<WeekDay> {
    week_days(reference)
        .into_iter()
        .map(|date| WeekDay {
            completed: completed.contains(&date),
            date,
        })
        .collect()
}

/// Completions within the week containing `reference`.
pub fn weekly_count(completed: &HashSet<NaiveDate>, reference: NaiveDate) -> u32 {
    week_days(reference)
        .into_iter()
        .filter(|day| completed.contains(day))
        .count() as u32
}

/// Completions within the calendar month containing `reference`.
pub fn monthly_count(completed: &HashSet<NaiveDate>, reference: NaiveDate) -> u32 {
    completed
        .iter()
        .filter(|day| day.year() == reference.year() && day.month() == reference.month())
        .count() as u32
}
