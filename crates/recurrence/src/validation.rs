//! Recurrence rule validation with path-addressed errors.
//!
//! Checks the field/frequency compatibility matrix and value ranges of a
//! [`RecurrenceRule`]. Returns a [`ValidationResult`] with errors (rule is
//! rejected) and warnings (advisory, e.g. day-of-month clamping).

use std::collections::HashSet;

use chores_core::{InvalidRuleError, RuleViolation};
use serde::{Deserialize, Serialize};

use crate::rule::{Frequency, RecurrenceRule};

// ── Result types ────────────────────────────────────────────────────

/// Overall validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<RuleViolation>,
    pub warnings: Vec<ValidationWarning>,
}

/// A non-blocking advisory warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationResult {
    pub(crate) fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(RuleViolation {
            path: path.into(),
            message: message.into(),
        });
    }

    pub(crate) fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
        });
    }

    /// Convert into `Err` when any blocking error was recorded.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, InvalidRuleError> {
        if self.valid {
            Ok(self.warnings)
        } else {
            Err(InvalidRuleError {
                violations: self.errors,
            })
        }
    }
}

// ── Public API ──────────────────────────────────────────────────────

/// Validate a parsed [`RecurrenceRule`].
pub fn validate_rule(rule: &RecurrenceRule) -> ValidationResult {
    let mut result = ValidationResult::new();
    validate_interval(rule, &mut result);
    validate_exclusivity(rule, &mut result);
    validate_days_of_week(rule, &mut result);
    validate_day_of_month(rule, &mut result);
    validate_nth_weekday(rule, &mut result);
    result
}

/// `true` when the rule can be expanded.
pub fn is_valid(rule: &RecurrenceRule) -> bool {
    validate_rule(rule).valid
}

/// Parse a raw JSON rule and validate. Parse errors are reported as a
/// single root-level error.
pub fn validate_json(json: &str) -> ValidationResult {
    match serde_json::from_str::<RecurrenceRule>(json) {
        Ok(rule) => validate_rule(&rule),
        Err(e) => {
            let mut result = ValidationResult::new();
            result.error("", format!("JSON parse error: {e}"));
            result
        }
    }
}

// ── Checks ──────────────────────────────────────────────────────────

fn validate_interval(rule: &RecurrenceRule, result: &mut ValidationResult) {
    if rule.interval < 1 {
        result.error("interval", "must be at least 1");
    }
}

fn validate_exclusivity(rule: &RecurrenceRule, result: &mut ValidationResult) {
    let populated = [
        rule.weekdays().is_some(),
        rule.day_of_month.is_some(),
        rule.nth_weekday.is_some(),
    ]
    .iter()
    .filter(|set| **set)
    .count();

    if populated > 1 {
        result.error(
            "",
            "at most one of daysOfWeek, dayOfMonth, nthWeekday may be set",
        );
    }
}

fn validate_days_of_week(rule: &RecurrenceRule, result: &mut ValidationResult) {
    if rule.frequency != Frequency::Weekly
        && rule.days_of_week.as_ref().is_some_and(|days| days.is_empty())
    {
        result.warn(
            "daysOfWeek",
            format!("empty list ignored; only meaningful with WEEKLY, got {}", rule.frequency),
        );
    }

    let Some(days) = rule.weekdays() else {
        return;
    };

    if rule.frequency != Frequency::Weekly {
        result.error(
            "daysOfWeek",
            format!("only valid with WEEKLY frequency, got {}", rule.frequency),
        );
    }

    let mut seen = HashSet::new();
    for (i, day) in days.iter().enumerate() {
        if *day > 6 {
            result.error(
                format!("daysOfWeek[{i}]"),
                format!("weekday index {day} out of range 0..=6"),
            );
        } else if !seen.insert(*day) {
            result.warn(
                format!("daysOfWeek[{i}]"),
                format!("weekday {day} listed more than once"),
            );
        }
    }
}

fn validate_day_of_month(rule: &RecurrenceRule, result: &mut ValidationResult) {
    let Some(day) = rule.day_of_month else {
        return;
    };

    if rule.frequency != Frequency::Monthly {
        result.error(
            "dayOfMonth",
            format!("only valid with MONTHLY frequency, got {}", rule.frequency),
        );
    }

    if !(1..=31).contains(&day) {
        result.error("dayOfMonth", format!("day {day} out of range 1..=31"));
    } else if day > 28 {
        result.warn(
            "dayOfMonth",
            format!("day {day} falls on the last day in shorter months"),
        );
    }
}

fn validate_nth_weekday(rule: &RecurrenceRule, result: &mut ValidationResult) {
    let Some(nth) = rule.nth_weekday else {
        return;
    };

    if rule.frequency != Frequency::Monthly {
        result.error(
            "nthWeekday",
            format!("only valid with MONTHLY frequency, got {}", rule.frequency),
        );
    }

    if !(1..=5).contains(&nth.week) {
        result.error(
            "nthWeekday.week",
            format!("week {} out of range 1..=5", nth.week),
        );
    } else if nth.week == 5 {
        result.warn(
            "nthWeekday.week",
            "months without a fifth occurrence use the last one",
        );
    }

    if nth.day > 6 {
        result.error(
            "nthWeekday.day",
            format!("weekday index {} out of range 0..=6", nth.day),
        );
    }
}
