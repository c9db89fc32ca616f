use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Household member identifier as stored by the persistence layer.
pub type UserId = String;

/// Recurring chore definition identifier.
pub type DefinitionId = Uuid;

/// Lifecycle status of a single chore occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OccurrenceStatus {
    Pending,
    Completed,
    Skipped,
}

impl fmt::Display for OccurrenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OccurrenceStatus::Pending => write!(f, "PENDING"),
            OccurrenceStatus::Completed => write!(f, "COMPLETED"),
            OccurrenceStatus::Skipped => write!(f, "SKIPPED"),
        }
    }
}

/// Actions that move an occurrence between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionAction {
    Complete,
    Skip,
    Unskip,
}

impl fmt::Display for TransitionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionAction::Complete => write!(f, "complete"),
            TransitionAction::Skip => write!(f, "skip"),
            TransitionAction::Unskip => write!(f, "unskip"),
        }
    }
}

/// Where the rotation resumes after a recurrence rule edit regenerates the
/// pending occurrences of a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleChangePolicy {
    /// New occurrences continue after the highest retained position.
    #[default]
    ContinueSequence,
    /// New occurrences restart at position 0.
    ResetToZero,
}

impl fmt::Display for RuleChangePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleChangePolicy::ContinueSequence => write!(f, "continue"),
            RuleChangePolicy::ResetToZero => write!(f, "reset"),
        }
    }
}

impl FromStr for RuleChangePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "continue" | "continue_sequence" => Ok(RuleChangePolicy::ContinueSequence),
            "reset" | "reset_to_zero" => Ok(RuleChangePolicy::ResetToZero),
            other => Err(format!("unknown rule change policy: '{}'", other)),
        }
    }
}
