// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cron expression parsing and next-fire evaluation
//!
//! Standard 5-field expressions: minute (0-59), hour (0-23), day of month
//! (1-31), month (1-12), day of week (0-6, 0 = Sunday). Fields accept `*`,
//! literal values, ranges (`a-b`), steps (`*/n`, `a-b/n`), and
//! comma-separated lists.
//!
//! This is the single evaluator in the system: the same parse validates
//! schedules at the API boundary and computes the fire times the scheduler
//! arms, so "what the API accepts" and "what actually fires" cannot diverge.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing a cron expression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CronParseError {
    #[error("expected 5 fields, got {0}")]
    FieldCount(usize),
    #[error("{field}: invalid value '{value}'")]
    InvalidValue { field: &'static str, value: String },
    #[error("{field}: {value} out of range {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
    #[error("{field}: step must be greater than zero")]
    ZeroStep { field: &'static str },
    #[error("{field}: inverted range {start}-{end}")]
    InvertedRange {
        field: &'static str,
        start: u32,
        end: u32,
    },
}

/// One parsed field: the set of values it admits
#[derive(Debug, Clone, PartialEq, Eq)]
struct CronField {
    values: BTreeSet<u32>,
    /// False only for a bare `*`. Drives the standard day-of-month /
    /// day-of-week OR rule.
    restricted: bool,
}

impl CronField {
    fn parse(text: &str, field: &'static str, min: u32, max: u32) -> Result<Self, CronParseError> {
        let mut values = BTreeSet::new();
        for part in text.split(',') {
            Self::parse_part(part.trim(), field, min, max, &mut values)?;
        }
        Ok(Self {
            values,
            restricted: text != "*",
        })
    }

    fn parse_part(
        part: &str,
        field: &'static str,
        min: u32,
        max: u32,
        values: &mut BTreeSet<u32>,
    ) -> Result<(), CronParseError> {
        let (range, step) = match part.split_once('/') {
            Some((range, step_str)) => {
                let step = step_str
                    .parse::<u32>()
                    .map_err(|_| CronParseError::InvalidValue {
                        field,
                        value: part.to_string(),
                    })?;
                if step == 0 {
                    return Err(CronParseError::ZeroStep { field });
                }
                (range, Some(step))
            }
            None => (part, None),
        };

        let parse_value = |text: &str| {
            text.parse::<u32>().map_err(|_| CronParseError::InvalidValue {
                field,
                value: part.to_string(),
            })
        };

        let (start, end) = if range == "*" {
            (min, max)
        } else if let Some((lo, hi)) = range.split_once('-') {
            let start = parse_value(lo)?;
            let end = parse_value(hi)?;
            if start > end {
                return Err(CronParseError::InvertedRange { field, start, end });
            }
            (start, end)
        } else {
            let value = parse_value(range)?;
            // a step on a bare value runs to the top of the field,
            // so "5/15" is shorthand for "5-59/15" in the minute field
            if step.is_some() {
                (value, max)
            } else {
                (value, value)
            }
        };

        if start < min || end > max {
            let value = if start < min { start } else { end };
            return Err(CronParseError::OutOfRange {
                field,
                value,
                min,
                max,
            });
        }

        let step = step.unwrap_or(1);
        let mut value = start;
        while value <= end {
            values.insert(value);
            value += step;
        }
        Ok(())
    }

    fn matches(&self, value: u32) -> bool {
        self.values.contains(&value)
    }
}

/// A validated cron expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronExpr {
    source: String,
    minute: CronField,
    hour: CronField,
    day_of_month: CronField,
    month: CronField,
    day_of_week: CronField,
}

impl CronExpr {
    /// Parse and validate a 5-field cron expression
    pub fn parse(expr: &str) -> Result<Self, CronParseError> {
        let parts: Vec<&str> = expr.split_whitespace().collect();
        if parts.len() != 5 {
            return Err(CronParseError::FieldCount(parts.len()));
        }

        Ok(Self {
            source: expr.to_string(),
            minute: CronField::parse(parts[0], "minute", 0, 59)?,
            hour: CronField::parse(parts[1], "hour", 0, 23)?,
            day_of_month: CronField::parse(parts[2], "day-of-month", 1, 31)?,
            month: CronField::parse(parts[3], "month", 1, 12)?,
            day_of_week: CronField::parse(parts[4], "day-of-week", 0, 6)?,
        })
    }

    /// The original expression text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether a given instant (at minute resolution) matches
    pub fn matches(&self, at: DateTime<Utc>) -> bool {
        self.month.matches(at.month())
            && self.day_matches(at.date_naive())
            && self.hour.matches(at.hour())
            && self.minute.matches(at.minute())
    }

    /// Standard cron day rule: when both day-of-month and day-of-week are
    /// restricted, a date matches if either does.
    fn day_matches(&self, date: NaiveDate) -> bool {
        let dom = self.day_of_month.matches(date.day());
        let dow = self
            .day_of_week
            .matches(date.weekday().num_days_from_sunday());
        match (self.day_of_month.restricted, self.day_of_week.restricted) {
            (true, true) => dom || dow,
            (true, false) => dom,
            (false, true) => dow,
            (false, false) => true,
        }
    }

    /// Next fire time strictly after `after`, at minute resolution.
    ///
    /// Deterministic and side-effect free; call repeatedly with the returned
    /// value to enumerate successive fires. Returns `None` for expressions
    /// with no upcoming date within four years (e.g. `0 0 30 2 *`).
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut candidate = (after + Duration::minutes(1))
            .with_second(0)?
            .with_nanosecond(0)?;
        let limit = after + Duration::days(4 * 366);

        while candidate <= limit {
            if !self.month.matches(candidate.month()) {
                candidate = first_of_next_month(candidate)?;
                continue;
            }
            if !self.day_matches(candidate.date_naive()) {
                candidate = candidate.date_naive().succ_opt()?.and_hms_opt(0, 0, 0)?.and_utc();
                continue;
            }
            if !self.hour.matches(candidate.hour()) {
                candidate = (candidate + Duration::hours(1)).with_minute(0)?;
                continue;
            }
            if !self.minute.matches(candidate.minute()) {
                candidate += Duration::minutes(1);
                continue;
            }
            return Some(candidate);
        }
        None
    }

    /// `next_after` evaluated in a fixed-offset local timezone.
    ///
    /// The expression is interpreted against local wall-clock time
    /// (`utc + offset`); the result is converted back to UTC.
    pub fn next_after_in_offset(
        &self,
        after: DateTime<Utc>,
        offset_minutes: i32,
    ) -> Option<DateTime<Utc>> {
        let shift = Duration::minutes(i64::from(offset_minutes));
        self.next_after(after + shift).map(|t| t - shift)
    }
}

fn first_of_next_month(at: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let (year, month) = if at.month() == 12 {
        (at.year() + 1, 1)
    } else {
        (at.year(), at.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)?
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
}

impl FromStr for CronExpr {
    type Err = CronParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CronExpr::parse(s)
    }
}

impl fmt::Display for CronExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

#[cfg(test)]
#[path = "cron_tests.rs"]
mod tests;
