// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parses the friendly schedule grammar into a standard 5-field cron
//! expression.

use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::error::ScheduleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    fn from_token(token: &str) -> Option<Self> {
        let token = token.trim().to_ascii_lowercase();
        Some(match token.as_str() {
            "mon" | "monday" => Weekday::Mon,
            "tue" | "tues" | "tuesday" => Weekday::Tue,
            "wed" | "weds" | "wednesday" => Weekday::Wed,
            "thu" | "thur" | "thurs" | "thursday" => Weekday::Thu,
            "fri" | "friday" => Weekday::Fri,
            "sat" | "saturday" => Weekday::Sat,
            "sun" | "sunday" => Weekday::Sun,
            _ => return None,
        })
    }

    fn abbrev(self) -> &'static str {
        match self {
            Weekday::Mon => "mon",
            Weekday::Tue => "tue",
            Weekday::Wed => "wed",
            Weekday::Thu => "thu",
            Weekday::Fri => "fri",
            Weekday::Sat => "sat",
            Weekday::Sun => "sun",
        }
    }

    fn matches_chrono(self, day: chrono::Weekday) -> bool {
        matches!(
            (self, day),
            (Weekday::Mon, chrono::Weekday::Mon)
                | (Weekday::Tue, chrono::Weekday::Tue)
                | (Weekday::Wed, chrono::Weekday::Wed)
                | (Weekday::Thu, chrono::Weekday::Thu)
                | (Weekday::Fri, chrono::Weekday::Fri)
                | (Weekday::Sat, chrono::Weekday::Sat)
                | (Weekday::Sun, chrono::Weekday::Sun)
        )
    }
}

/// A parsed friendly schedule, reduced to the standard 5-field cron
/// grammar `minute hour day-of-month month day-of-week` (spec.md §4.3).
/// `day-of-month` and `month` are always `*` — the grammar never
/// constrains them.
#[derive(Debug, Clone, PartialEq)]
pub enum CronExpr {
    EveryMinutes(u32),
    EveryHours(u32),
    DailyAt { hour: u32, minute: u32, second: u32 },
    WeeklyOn { days: Vec<Weekday>, hour: u32, minute: u32, second: u32 },
}

impl CronExpr {
    /// Render as `minute hour dom month dow`, matching the table in
    /// spec.md §4.3 (seconds, when present, are not part of the 5-field
    /// form and are only honored by [`CronExpr::matches`]).
    pub fn to_cron_string(&self) -> String {
        match self {
            CronExpr::EveryMinutes(n) => format!("*/{n} * * * *"),
            CronExpr::EveryHours(n) => format!("0 */{n} * * *"),
            CronExpr::DailyAt { hour, minute, .. } => format!("{minute} {hour} * * *"),
            CronExpr::WeeklyOn { days, hour, minute, .. } => {
                let day_list = days.iter().map(|d| d.abbrev()).collect::<Vec<_>>().join(",");
                format!("{minute} {hour} * * {day_list}")
            }
        }
    }

    /// Whether `dt` is a fire instant for this schedule, at the
    /// granularity the variant cares about (minute for the interval
    /// forms, second for the absolute-time forms).
    pub fn matches(&self, dt: DateTime<Utc>) -> bool {
        match self {
            CronExpr::EveryMinutes(n) => *n > 0 && dt.minute() % n == 0 && dt.second() == 0,
            CronExpr::EveryHours(n) => {
                *n > 0 && dt.hour() % n == 0 && dt.minute() == 0 && dt.second() == 0
            }
            CronExpr::DailyAt { hour, minute, second } => {
                dt.hour() == *hour && dt.minute() == *minute && dt.second() == *second
            }
            CronExpr::WeeklyOn { days, hour, minute, second } => {
                dt.hour() == *hour
                    && dt.minute() == *minute
                    && dt.second() == *second
                    && days.iter().any(|d| d.matches_chrono(dt.weekday()))
            }
        }
    }
}

fn parse_time(token: &str) -> Option<(u32, u32, u32)> {
    let parts: Vec<&str> = token.split(':').collect();
    match parts.as_slice() {
        [h, m] => Some((h.parse().ok()?, m.parse().ok()?, 0)),
        [h, m, s] => Some((h.parse().ok()?, m.parse().ok()?, s.parse().ok()?)),
        _ => None,
    }
}

fn valid_time(hour: u32, minute: u32, second: u32) -> bool {
    hour < 24 && minute < 60 && second < 60
}

/// Parses one of the four recognized friendly forms (all
/// case-insensitive): `every N minutes`, `every N hours`,
/// `daily at HH:MM[:SS]`, `weekly on DAY[,DAY...] at HH:MM[:SS]`.
pub fn parse_friendly(input: &str) -> Result<CronExpr, ScheduleError> {
    let normalized = input.trim().to_ascii_lowercase();
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    let invalid = || ScheduleError::InvalidSchedule(input.to_string());

    match tokens.as_slice() {
        ["every", n, unit] if *unit == "minutes" || *unit == "minute" => {
            let n: u32 = n.parse().map_err(|_| invalid())?;
            if n == 0 {
                return Err(invalid());
            }
            Ok(CronExpr::EveryMinutes(n))
        }
        ["every", n, unit] if *unit == "hours" || *unit == "hour" => {
            let n: u32 = n.parse().map_err(|_| invalid())?;
            if n == 0 {
                return Err(invalid());
            }
            Ok(CronExpr::EveryHours(n))
        }
        ["daily", "at", time] => {
            let (hour, minute, second) = parse_time(time).ok_or_else(invalid)?;
            if !valid_time(hour, minute, second) {
                return Err(invalid());
            }
            Ok(CronExpr::DailyAt { hour, minute, second })
        }
        ["weekly", "on", day_list, "at", time] => {
            let days: Vec<Weekday> = day_list
                .split(',')
                .map(Weekday::from_token)
                .collect::<Option<_>>()
                .ok_or_else(invalid)?;
            if days.is_empty() {
                return Err(invalid());
            }
            let (hour, minute, second) = parse_time(time).ok_or_else(invalid)?;
            if !valid_time(hour, minute, second) {
                return Err(invalid());
            }
            Ok(CronExpr::WeeklyOn { days, hour, minute, second })
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
#[path = "friendly_tests.rs"]
mod tests;
