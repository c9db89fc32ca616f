//! Recompute assignees of pending occurrences after the sequence was perturbed.
//!
//! Because the assignee at a position is a pure function of that position,
//! reflowing is just re-evaluating the formula for every pending occurrence in
//! scope. Running it twice with the same inputs changes nothing the second time.
//!
//! Callers must hold the definition's critical section across
//! read-pending → reflow → write-back.

use chores_core::UserId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::definition::ChoreDefinition;
use crate::occurrence::Occurrence;

/// Which pending occurrences a reflow touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflowFrom {
    /// Every pending occurrence (roster edits).
    Start,
    /// Pending occurrences strictly after a position (completions).
    After(u64),
}

impl ReflowFrom {
    fn includes(self, position: u64) -> bool {
        match self {
            ReflowFrom::Start => true,
            ReflowFrom::After(from) => position > from,
        }
    }
}

/// An assignee change produced by a reflow, ready for write-back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentChange {
    pub sequence_position: u64,
    pub previous_user_ids: Vec<UserId>,
    pub assigned_user_ids: Vec<UserId>,
    pub rotation_index: Option<usize>,
}

/// Overwrite the assignees of every pending occurrence in scope and return the
/// ones that actually changed. Completed and skipped occurrences are history
/// and are left alone.
pub fn reflow(
    definition: &ChoreDefinition,
    occurrences: &mut [Occurrence],
    from: ReflowFrom,
) -> Vec<AssignmentChange> {
    let mut changes = Vec::new();
    let mut touched = 0usize;

    for occ in occurrences
        .iter_mut()
        .filter(|o| o.is_pending() && from.includes(o.sequence_position))
    {
        touched += 1;
        let previous = occ.assigned_user_ids.clone();
        let next = definition.assignees_at(occ.sequence_position);
        if occ.apply_assignees(next) {
            changes.push(AssignmentChange {
                sequence_position: occ.sequence_position,
                previous_user_ids: previous,
                assigned_user_ids: occ.assigned_user_ids.clone(),
                rotation_index: occ.rotation_index,
            });
        }
    }

    debug!(
        definition_id = %definition.id,
        mode = %definition.assignment.mode(),
        ?from,
        touched,
        changed = changes.len(),
        "reflowed pending occurrences"
    );
    changes
}
