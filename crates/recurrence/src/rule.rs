//! Recurrence rule value types.
//!
//! A [`RecurrenceRule`] is the author-supplied description of how often a
//! chore repeats. It is stored as JSON by the persistence layer, so field
//! names follow the camelCase shape of that payload. Rules are plain data;
//! [`ValidRule`] is the checked form the expander accepts.

use std::fmt;
use std::str::FromStr;

use chores_core::InvalidRuleError;
use serde::{Deserialize, Serialize};

use crate::validation;

/// Recurrence frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Daily => write!(f, "DAILY"),
            Frequency::Weekly => write!(f, "WEEKLY"),
            Frequency::Monthly => write!(f, "MONTHLY"),
            Frequency::Yearly => write!(f, "YEARLY"),
        }
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            "YEARLY" => Ok(Frequency::Yearly),
            other => Err(format!("unknown frequency: '{}'", other)),
        }
    }
}

/// "The `week`-th `day` of the month", e.g. `{week: 2, day: 2}` is the
/// second Tuesday. `day` uses 0=Sunday..6=Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NthWeekday {
    pub week: u8,
    pub day: u8,
}

fn default_interval() -> u32 {
    1
}

/// Author-supplied recurrence rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    /// "Every N units". Must be at least 1.
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// Weekday indices (0=Sunday..6=Saturday). WEEKLY only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<Vec<u8>>,
    /// Day of month 1..=31, clamped in shorter months. MONTHLY only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u8>,
    /// Nth weekday of the month. MONTHLY only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nth_weekday: Option<NthWeekday>,
}

impl RecurrenceRule {
    fn bare(frequency: Frequency, interval: u32) -> Self {
        Self {
            frequency,
            interval,
            days_of_week: None,
            day_of_month: None,
            nth_weekday: None,
        }
    }

    pub fn daily(interval: u32) -> Self {
        Self::bare(Frequency::Daily, interval)
    }

    pub fn weekly(interval: u32) -> Self {
        Self::bare(Frequency::Weekly, interval)
    }

    pub fn weekly_on(interval: u32, days: impl IntoIterator<Item = u8>) -> Self {
        Self {
            days_of_week: Some(days.into_iter().collect()),
            ..Self::bare(Frequency::Weekly, interval)
        }
    }

    pub fn monthly(interval: u32) -> Self {
        Self::bare(Frequency::Monthly, interval)
    }

    pub fn monthly_on_day(interval: u32, day_of_month: u8) -> Self {
        Self {
            day_of_month: Some(day_of_month),
            ..Self::bare(Frequency::Monthly, interval)
        }
    }

    pub fn monthly_on_nth(interval: u32, week: u8, day: u8) -> Self {
        Self {
            nth_weekday: Some(NthWeekday { week, day }),
            ..Self::bare(Frequency::Monthly, interval)
        }
    }

    pub fn yearly(interval: u32) -> Self {
        Self::bare(Frequency::Yearly, interval)
    }

    /// Weekday list with an empty list treated as absent.
    pub fn weekdays(&self) -> Option<&[u8]> {
        self.days_of_week.as_deref().filter(|days| !days.is_empty())
    }

    /// Check the rule and return its expandable form.
    pub fn validate(self) -> Result<ValidRule, InvalidRuleError> {
        ValidRule::try_from(self)
    }

    pub fn is_valid(&self) -> bool {
        validation::validate_rule(self).valid
    }
}

/// A [`RecurrenceRule`] that passed validation. Only obtainable through
/// [`RecurrenceRule::validate`] / `TryFrom`, so the expander never sees a
/// malformed rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidRule(RecurrenceRule);

impl ValidRule {
    pub fn rule(&self) -> &RecurrenceRule {
        &self.0
    }

    pub fn into_inner(self) -> RecurrenceRule {
        self.0
    }

    pub fn frequency(&self) -> Frequency {
        self.0.frequency
    }

    pub fn interval(&self) -> u32 {
        self.0.interval
    }
}

impl TryFrom<RecurrenceRule> for ValidRule {
    type Error = InvalidRuleError;

    fn try_from(rule: RecurrenceRule) -> Result<Self, Self::Error> {
        validation::validate_rule(&rule).into_result()?;
        Ok(ValidRule(rule))
    }
}

impl<'de> Deserialize<'de> for ValidRule {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let rule = RecurrenceRule::deserialize(deserializer)?;
        ValidRule::try_from(rule).map_err(serde::de::Error::custom)
    }
}
