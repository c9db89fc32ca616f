//! In-memory occurrence store with per-definition critical sections.
//!
//! Each definition lives behind its own mutex. Every operation that reads
//! pending occurrences, reflows them and writes them back does so while
//! holding that one lock, so two completions on the same definition can never
//! reflow from a stale snapshot. Different definitions never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use chrono::{DateTime, NaiveDate, Utc};
use chores_core::config::ScheduleConfig;
use chores_core::{ChoreError, DefinitionId, Result, RuleChangePolicy, UserId};
use chores_recurrence::RecurrenceRule;
use tracing::{debug, info};

use crate::assignment::Assignment;
use crate::definition::ChoreDefinition;
use crate::occurrence::Occurrence;
use crate::planner::{self, Regeneration};
use crate::reflow::{reflow, AssignmentChange, ReflowFrom};

struct DefinitionEntry {
    definition: ChoreDefinition,
    /// Kept sorted by (due date, position).
    occurrences: Vec<Occurrence>,
}

impl DefinitionEntry {
    fn find_mut(&mut self, position: u64) -> Result<&mut Occurrence> {
        let definition_id = self.definition.id;
        self.occurrences
            .iter_mut()
            .find(|o| o.sequence_position == position)
            .ok_or(ChoreError::OccurrenceNotFound {
                definition_id,
                position,
            })
    }

    fn sort(&mut self) {
        self.occurrences
            .sort_by_key(|o| (o.due_date, o.sequence_position));
    }
}

pub struct OccurrenceLedger {
    horizon_days: u32,
    policy: RuleChangePolicy,
    entries: RwLock<HashMap<DefinitionId, Arc<Mutex<DefinitionEntry>>>>,
}

impl OccurrenceLedger {
    pub fn new(config: &ScheduleConfig) -> Self {
        Self::with_settings(config.horizon_days, config.rule_change_policy)
    }

    pub fn with_settings(horizon_days: u32, policy: RuleChangePolicy) -> Self {
        Self {
            horizon_days,
            policy,
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn entry(&self, id: DefinitionId) -> Result<Arc<Mutex<DefinitionEntry>>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| ChoreError::LockPoisoned(format!("ledger read lock: {}", e)))?;
        entries
            .get(&id)
            .cloned()
            .ok_or(ChoreError::DefinitionNotFound(id))
    }

    fn lock<'a>(
        id: DefinitionId,
        entry: &'a Mutex<DefinitionEntry>,
    ) -> Result<MutexGuard<'a, DefinitionEntry>> {
        entry
            .lock()
            .map_err(|e| ChoreError::LockPoisoned(format!("definition {} lock: {}", id, e)))
    }

    // ── Definitions ─────────────────────────────────────────────────

    /// Add a definition. Its rule must be valid; nothing is generated yet.
    pub fn register(&self, definition: ChoreDefinition) -> Result<()> {
        definition.valid_rule()?;
        let id = definition.id;

        let mut entries = self
            .entries
            .write()
            .map_err(|e| ChoreError::LockPoisoned(format!("ledger write lock: {}", e)))?;
        if entries.contains_key(&id) {
            return Err(ChoreError::DuplicateDefinition(id));
        }
        entries.insert(
            id,
            Arc::new(Mutex::new(DefinitionEntry {
                definition,
                occurrences: Vec::new(),
            })),
        );
        info!(definition_id = %id, "registered chore definition");
        Ok(())
    }

    pub fn definition(&self, id: DefinitionId) -> Result<ChoreDefinition> {
        let entry = self.entry(id)?;
        let guard = Self::lock(id, &entry)?;
        Ok(guard.definition.clone())
    }

    /// Remove a definition. Pending occurrences are dropped; the completed and
    /// skipped history is returned.
    pub fn remove(&self, id: DefinitionId) -> Result<Vec<Occurrence>> {
        let entry = {
            let mut entries = self
                .entries
                .write()
                .map_err(|e| ChoreError::LockPoisoned(format!("ledger write lock: {}", e)))?;
            entries.remove(&id).ok_or(ChoreError::DefinitionNotFound(id))?
        };
        let mut guard = Self::lock(id, &entry)?;
        let (kept, removed) = planner::retain_history(std::mem::take(&mut guard.occurrences));
        info!(
            definition_id = %id,
            kept = kept.len(),
            removed = removed.len(),
            "removed chore definition"
        );
        Ok(kept)
    }

    // ── Occurrences ─────────────────────────────────────────────────

    /// Materialize occurrences up to the horizon. Returns the new ones.
    pub fn generate(&self, id: DefinitionId, today: NaiveDate) -> Result<Vec<Occurrence>> {
        let entry = self.entry(id)?;
        let mut guard = Self::lock(id, &entry)?;

        let plan = planner::plan_generation(
            &guard.definition,
            &guard.occurrences,
            today,
            self.horizon_days,
        )?;
        guard.occurrences.extend(plan.occurrences.iter().cloned());
        guard.sort();
        Ok(plan.occurrences)
    }

    /// Complete the occurrence at `position`, then reflow pending occurrences
    /// after it.
    pub fn complete(
        &self,
        id: DefinitionId,
        position: u64,
        by: impl Into<UserId>,
        at: DateTime<Utc>,
    ) -> Result<Vec<AssignmentChange>> {
        let entry = self.entry(id)?;
        let mut guard = Self::lock(id, &entry)?;

        guard.find_mut(position)?.complete(by, at)?;

        let DefinitionEntry {
            definition,
            occurrences,
        } = &mut *guard;
        let changes = reflow(definition, occurrences, ReflowFrom::After(position));
        debug!(definition_id = %id, position, changed = changes.len(), "completed occurrence");
        Ok(changes)
    }

    /// Skip the occurrence at `position`. Never reflows.
    pub fn skip(&self, id: DefinitionId, position: u64) -> Result<()> {
        let entry = self.entry(id)?;
        let mut guard = Self::lock(id, &entry)?;
        guard.find_mut(position)?.skip()?;
        debug!(definition_id = %id, position, "skipped occurrence");
        Ok(())
    }

    /// Return a skipped occurrence to pending. Its assignees are re-evaluated
    /// since roster edits made while it was skipped did not reach it.
    pub fn unskip(&self, id: DefinitionId, position: u64) -> Result<Occurrence> {
        let entry = self.entry(id)?;
        let mut guard = Self::lock(id, &entry)?;
        let assignees = guard.definition.assignees_at(position);

        let occ = guard.find_mut(position)?;
        occ.unskip()?;
        occ.apply_assignees(assignees);
        debug!(definition_id = %id, position, "unskipped occurrence");
        Ok(occ.clone())
    }

    /// Replace the fixed set / pool and reflow every pending occurrence.
    pub fn update_assignment(
        &self,
        id: DefinitionId,
        assignment: Assignment,
    ) -> Result<Vec<AssignmentChange>> {
        let entry = self.entry(id)?;
        let mut guard = Self::lock(id, &entry)?;

        let DefinitionEntry {
            definition,
            occurrences,
        } = &mut *guard;
        definition.assignment = assignment;
        let changes = reflow(definition, occurrences, ReflowFrom::Start);
        info!(
            definition_id = %id,
            mode = %definition.assignment.mode(),
            changed = changes.len(),
            "updated assignment"
        );
        Ok(changes)
    }

    /// Replace the recurrence rule (and optionally the anchor), discarding
    /// future pending occurrences and regenerating under the ledger's
    /// [`RuleChangePolicy`]. Completed or skipped occurrences due from `today`
    /// on may be renumbered. The definition is left untouched if the new rule
    /// is invalid.
    pub fn update_rule(
        &self,
        id: DefinitionId,
        recurrence: RecurrenceRule,
        starts_on: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Regeneration> {
        let entry = self.entry(id)?;
        let mut guard = Self::lock(id, &entry)?;

        let mut updated = guard.definition.clone();
        updated.recurrence = recurrence;
        if let Some(starts_on) = starts_on {
            updated.starts_on = starts_on;
        }

        let regen = planner::regenerate(
            &updated,
            &guard.occurrences,
            today,
            self.horizon_days,
            self.policy,
        )?;

        updated.rotation_offset = regen.rotation_offset;
        guard.definition = updated;
        guard.occurrences = regen.retained.clone();
        guard.occurrences.extend(regen.plan.occurrences.iter().cloned());
        guard.sort();
        Ok(regen)
    }

    /// All occurrences of a definition, chronological.
    pub fn occurrences(&self, id: DefinitionId) -> Result<Vec<Occurrence>> {
        let entry = self.entry(id)?;
        let guard = Self::lock(id, &entry)?;
        Ok(guard.occurrences.clone())
    }

    pub fn pending(&self, id: DefinitionId) -> Result<Vec<Occurrence>> {
        let entry = self.entry(id)?;
        let guard = Self::lock(id, &entry)?;
        Ok(guard
            .occurrences
            .iter()
            .filter(|o| o.is_pending())
            .cloned()
            .collect())
    }

    /// Number of registered definitions.
    pub fn len(&self) -> Result<usize> {
        let entries = self
            .entries
            .read()
            .map_err(|e| ChoreError::LockPoisoned(format!("ledger read lock: {}", e)))?;
        Ok(entries.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests;
