use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entity::{DefinitionId, OccurrenceStatus, TransitionAction};

/// A single reason a recurrence rule was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleViolation {
    /// Field path within the rule, e.g. `"nthWeekday.week"`.
    pub path: String,
    pub message: String,
}

/// Structurally malformed or semantically incompatible recurrence rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid recurrence rule: {}", describe(.violations))]
pub struct InvalidRuleError {
    pub violations: Vec<RuleViolation>,
}

impl InvalidRuleError {
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violations: vec![RuleViolation {
                path: path.into(),
                message: message.into(),
            }],
        }
    }
}

fn describe(violations: &[RuleViolation]) -> String {
    if violations.is_empty() {
        return "no details".to_string();
    }
    violations
        .iter()
        .map(|v| {
            if v.path.is_empty() {
                v.message.clone()
            } else {
                format!("{}: {}", v.path, v.message)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Occurrence status change not permitted from its current status.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot {action} an occurrence that is {from}")]
pub struct InvalidTransitionError {
    pub action: TransitionAction,
    pub from: OccurrenceStatus,
}

#[derive(Error, Debug)]
pub enum ChoreError {
    #[error(transparent)]
    InvalidRule(#[from] InvalidRuleError),

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransitionError),

    #[error("Definition not found: {0}")]
    DefinitionNotFound(DefinitionId),

    #[error("Definition already registered: {0}")]
    DuplicateDefinition(DefinitionId),

    #[error("Occurrence not found: definition {definition_id}, position {position}")]
    OccurrenceNotFound {
        definition_id: DefinitionId,
        position: u64,
    },

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

pub type Result<T> = std::result::Result<T, ChoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_rule_lists_every_violation() {
        let err = InvalidRuleError {
            violations: vec![
                RuleViolation {
                    path: "interval".into(),
                    message: "must be at least 1".into(),
                },
                RuleViolation {
                    path: String::new(),
                    message: "dayOfMonth and nthWeekday are mutually exclusive".into(),
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "invalid recurrence rule: interval: must be at least 1; \
             dayOfMonth and nthWeekday are mutually exclusive"
        );
    }

    #[test]
    fn invalid_transition_message() {
        let err = InvalidTransitionError {
            action: TransitionAction::Skip,
            from: OccurrenceStatus::Completed,
        };
        assert_eq!(err.to_string(), "cannot skip an occurrence that is COMPLETED");
    }

    #[test]
    fn chore_error_wraps_transparently() {
        let err: ChoreError = InvalidRuleError::single("frequency", "unknown").into();
        assert!(matches!(err, ChoreError::InvalidRule(_)));
        assert_eq!(err.to_string(), "invalid recurrence rule: frequency: unknown");
    }
}
