//! Occurrence records and their status state machine.
//!
//! ```text
//! PENDING --complete--> COMPLETED   (terminal)
//! PENDING --skip------> SKIPPED
//! SKIPPED --unskip----> PENDING
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use chores_core::{
    DefinitionId, InvalidTransitionError, OccurrenceStatus, TransitionAction, UserId,
};
use serde::{Deserialize, Serialize};

use crate::assignment::AssigneeSet;

/// One materialized date of a recurring chore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub definition_id: DefinitionId,
    /// Zero-based rank among the definition's occurrences, by due date.
    pub sequence_position: u64,
    pub due_date: NaiveDate,
    pub assigned_user_ids: Vec<UserId>,
    pub rotation_index: Option<usize>,
    pub status: OccurrenceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Occurrence {
    pub fn pending(
        definition_id: DefinitionId,
        sequence_position: u64,
        due_date: NaiveDate,
        assignees: AssigneeSet,
    ) -> Self {
        Self {
            definition_id,
            sequence_position,
            due_date,
            assigned_user_ids: assignees.assigned_user_ids,
            rotation_index: assignees.rotation_index,
            status: OccurrenceStatus::Pending,
            completed_by: None,
            completed_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == OccurrenceStatus::Pending
    }

    pub fn assignees(&self) -> AssigneeSet {
        AssigneeSet {
            assigned_user_ids: self.assigned_user_ids.clone(),
            rotation_index: self.rotation_index,
        }
    }

    /// Overwrite the assignee fields. Returns `true` if anything changed.
    pub fn apply_assignees(&mut self, assignees: AssigneeSet) -> bool {
        let changed = self.assigned_user_ids != assignees.assigned_user_ids
            || self.rotation_index != assignees.rotation_index;
        self.assigned_user_ids = assignees.assigned_user_ids;
        self.rotation_index = assignees.rotation_index;
        changed
    }

    pub fn complete(
        &mut self,
        by: impl Into<UserId>,
        at: DateTime<Utc>,
    ) -> Result<(), InvalidTransitionError> {
        self.status = next_status(self.status, TransitionAction::Complete)?;
        self.completed_by = Some(by.into());
        self.completed_at = Some(at);
        Ok(())
    }

    pub fn skip(&mut self) -> Result<(), InvalidTransitionError> {
        self.status = next_status(self.status, TransitionAction::Skip)?;
        Ok(())
    }

    pub fn unskip(&mut self) -> Result<(), InvalidTransitionError> {
        self.status = next_status(self.status, TransitionAction::Unskip)?;
        Ok(())
    }
}

/// Status reached by applying `action` in status `from`.
pub fn next_status(
    from: OccurrenceStatus,
    action: TransitionAction,
) -> Result<OccurrenceStatus, InvalidTransitionError> {
    use OccurrenceStatus::*;
    use TransitionAction::*;

    match (from, action) {
        (Pending, Complete) => Ok(Completed),
        (Pending, Skip) => Ok(Skipped),
        (Skipped, Unskip) => Ok(Pending),
        _ => Err(InvalidTransitionError { action, from }),
    }
}
