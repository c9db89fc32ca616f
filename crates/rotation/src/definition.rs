//! Recurring chore definitions: the minimal shape needed to drive generation.

use chrono::NaiveDate;
use chores_core::{DefinitionId, InvalidRuleError};
use chores_recurrence::{RecurrenceRule, ValidRule};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assignment::{AssigneeSet, Assignment};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoreDefinition {
    #[serde(default = "Uuid::new_v4")]
    pub id: DefinitionId,
    pub title: String,
    pub recurrence: RecurrenceRule,
    /// Anchor of the series; nothing is generated before it.
    pub starts_on: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_on: Option<NaiveDate>,
    pub assignment: Assignment,
    /// Position that takes the rotation's first slot. Moved forward when a
    /// rule edit restarts the rotation.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub rotation_offset: u64,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

impl ChoreDefinition {
    pub fn new(
        title: impl Into<String>,
        recurrence: RecurrenceRule,
        starts_on: NaiveDate,
        assignment: Assignment,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            recurrence,
            starts_on,
            ends_on: None,
            assignment,
            rotation_offset: 0,
        }
    }

    pub fn ending_on(mut self, ends_on: NaiveDate) -> Self {
        self.ends_on = Some(ends_on);
        self
    }

    pub fn valid_rule(&self) -> Result<ValidRule, InvalidRuleError> {
        ValidRule::try_from(self.recurrence.clone())
    }

    /// Assignees of the occurrence at `position` under the current rotation.
    pub fn assignees_at(&self, position: u64) -> AssigneeSet {
        self.assignment
            .assignees_at_offset(position, self.rotation_offset)
    }
}
