//! Cron schedule evaluation.
//!
//! Schedules use the classic 5-field cron syntax (minute, hour,
//! day-of-month, month, day-of-week) and are evaluated in UTC.

use chrono::{DateTime, Utc};
use cron::Schedule;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while parsing a cron expression.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error(
        "cron expression '{0}' must have 5 fields: minute hour day-of-month month day-of-week"
    )]
    FieldCount(String),
    #[error("invalid cron expression '{expression}': {reason}")]
    Invalid { expression: String, reason: String },
}

/// A parsed 5-field cron expression, evaluated in UTC.
///
/// Classic cron combines a restricted day-of-month with a restricted
/// day-of-week using OR, while the `cron` crate matches every field with
/// AND. When both day fields are restricted this holds two derived
/// schedules, each with one of the day fields wildcarded, and the next
/// occurrence is the earlier of the two candidates.
#[derive(Debug, Clone)]
pub struct CronSchedule {
    expression: String,
    schedules: Vec<Schedule>,
}

impl CronSchedule {
    /// Parse a 5-field cron expression.
    pub fn parse(expression: &str) -> Result<Self, ScheduleError> {
        let fields: Vec<&str> = expression.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(ScheduleError::FieldCount(expression.to_string()));
        }

        let day_of_week = quartz_day_of_week(fields[4]);
        let compile = |day_of_month: &str, day_of_week: &str| {
            // The cron crate wants a leading seconds field; pin it to zero
            // so each schedule fires on whole minutes.
            let normalized = format!(
                "0 {} {} {} {} {}",
                fields[0], fields[1], day_of_month, fields[3], day_of_week
            );
            Schedule::from_str(&normalized).map_err(|e| ScheduleError::Invalid {
                expression: expression.to_string(),
                reason: e.to_string(),
            })
        };

        let dom_restricted = fields[2] != "*" && fields[2] != "?";
        let dow_restricted = fields[4] != "*" && fields[4] != "?";

        let schedules = if dom_restricted && dow_restricted {
            vec![compile(fields[2], "*")?, compile("*", &day_of_week)?]
        } else {
            vec![compile(fields[2], &day_of_week)?]
        };

        Ok(Self {
            expression: expression.to_string(),
            schedules,
        })
    }

    /// The earliest matching instant strictly after `after`, if any.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedules
            .iter()
            .filter_map(|schedule| schedule.after(&after).next())
            .min()
    }

    /// The expression this schedule was parsed from.
    pub fn expression(&self) -> &str {
        &self.expression
    }
}

impl std::fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.expression)
    }
}

/// Rewrite a classic cron day-of-week field for the `cron` crate.
///
/// Classic cron numbers days 0-7 with both 0 and 7 meaning Sunday; the
/// crate follows Quartz ordinals, 1 (Sunday) through 7 (Saturday). Names
/// (`MON`, `MON-FRI`) and `*/n` steps mean the same thing in both and
/// pass through untouched.
fn quartz_day_of_week(field: &str) -> String {
    field
        .split(',')
        .map(translate_dow_item)
        .collect::<Vec<_>>()
        .join(",")
}

fn translate_dow_item(item: &str) -> String {
    let (range, step) = match item.split_once('/') {
        Some((range, step)) => (range, Some(step)),
        None => (item, None),
    };

    if range == "*" || range == "?" {
        return item.to_string();
    }

    if let Some((start, end)) = range.split_once('-') {
        if let (Ok(start), Ok(end)) = (start.parse::<u8>(), end.parse::<u8>()) {
            if start <= 7 && end <= 7 {
                // Expand the range so wrap-arounds like 6-7 (Sat,Sun)
                // survive the renumbering.
                let step = step
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(1)
                    .max(1);
                let values: Vec<u8> = if start <= end {
                    (start..=end).collect()
                } else {
                    (start..=7).chain(0..=end).collect()
                };
                let mut days: Vec<String> = Vec::new();
                for value in values.into_iter().step_by(step) {
                    let day = ((value % 7) + 1).to_string();
                    if !days.contains(&day) {
                        days.push(day);
                    }
                }
                return days.join(",");
            }
        }
        return item.to_string();
    }

    let mapped = match range.parse::<u8>() {
        Ok(value) if value <= 7 => ((value % 7) + 1).to_string(),
        _ => range.to_string(),
    };

    match step {
        Some(step) => format!("{}/{}", mapped, step),
        None => mapped,
    }
}
