//! Recurrence engine for household chores.
//!
//! This crate provides:
//! - `RecurrenceRule` value types with JSON (camelCase) serialization
//! - Rule validation with path-addressed errors and advisory warnings
//! - Epoch-relative calendar helpers (week/month indices, clamping, nth weekday)
//! - Pure expansion of a rule over an inclusive date window

pub mod calendar;
pub mod expand;
pub mod rule;
pub mod validation;

pub use calendar::nth_weekday_of_month;
pub use expand::{expand, expand_anchored, expand_datetimes, expand_rule};
pub use rule::{Frequency, NthWeekday, RecurrenceRule, ValidRule};
pub use validation::{is_valid, validate_json, validate_rule, ValidationResult, ValidationWarning};
