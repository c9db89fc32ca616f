//! Occurrence generation over a rolling horizon.
//!
//! Planning is pure: it reads a definition plus the occurrences already
//! materialized for it and returns what should be created (or discarded).
//! Persisting the plan, and holding the definition's lock while doing so, is
//! the caller's job.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use chores_core::{InvalidRuleError, RuleChangePolicy};
use chores_recurrence::{expand_anchored, ValidRule};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::definition::ChoreDefinition;
use crate::occurrence::Occurrence;

// ── Types ───────────────────────────────────────────────────────────

/// Inclusive date range that one generation run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Output of a generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationPlan {
    /// `None` when the definition has nothing left to generate (ended, or
    /// starts beyond the horizon).
    pub window: Option<GenerationWindow>,
    /// New pending occurrences, chronological, positions ascending.
    pub occurrences: Vec<Occurrence>,
    /// Dates in the window that already had an occurrence.
    pub already_materialized: usize,
    /// Dates with an empty assignee set; not materialized.
    pub skipped_unassigned: Vec<NaiveDate>,
}

/// Result of regenerating after a recurrence rule edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Regeneration {
    /// Occurrences kept: history and overdue pending ones. Completed or
    /// skipped occurrences due today or later are renumbered so positions
    /// stay in date order with the new ones.
    pub retained: Vec<Occurrence>,
    /// Pending occurrences due today or later, dropped.
    pub discarded: Vec<Occurrence>,
    /// Rotation offset the definition must carry from now on.
    pub rotation_offset: u64,
    pub plan: GenerationPlan,
}

// ── Public API ──────────────────────────────────────────────────────

/// Window covered by a run on `today`:
/// `[max(today, startsOn), min(today + horizon, endsOn)]`.
pub fn generation_window(
    definition: &ChoreDefinition,
    today: NaiveDate,
    horizon_days: u32,
) -> Option<GenerationWindow> {
    let start = today.max(definition.starts_on);
    let horizon_end = today
        .checked_add_signed(Duration::days(i64::from(horizon_days)))
        .unwrap_or(NaiveDate::MAX);
    let end = match definition.ends_on {
        Some(ends_on) => horizon_end.min(ends_on),
        None => horizon_end,
    };
    (start <= end).then_some(GenerationWindow { start, end })
}

/// Position the next generated occurrence takes.
pub fn next_position(existing: &[Occurrence]) -> u64 {
    existing
        .iter()
        .map(|o| o.sequence_position + 1)
        .max()
        .unwrap_or(0)
}

/// Plan the occurrences a run on `today` should create.
///
/// Dates already materialized are skipped, so running twice creates nothing
/// the second time. New positions continue after the highest existing one.
pub fn plan_generation(
    definition: &ChoreDefinition,
    existing: &[Occurrence],
    today: NaiveDate,
    horizon_days: u32,
) -> Result<GenerationPlan, InvalidRuleError> {
    let rule = definition.valid_rule()?;
    let (plan, _) = plan_from(
        definition,
        &rule,
        existing,
        Vec::new(),
        next_position(existing),
        today,
        horizon_days,
    );
    Ok(plan)
}

/// Discard future pending occurrences and plan replacements under the
/// definition's current rule.
///
/// Positions always resume after the last occurrence due before `today`, and
/// completed or skipped occurrences due later are renumbered in among the new
/// ones, so positions keep ranking occurrences by date. `policy` decides the
/// rotation: it either carries on, or restarts with the first resumed
/// position taking the pool's first slot.
pub fn regenerate(
    definition: &ChoreDefinition,
    existing: &[Occurrence],
    today: NaiveDate,
    horizon_days: u32,
    policy: RuleChangePolicy,
) -> Result<Regeneration, InvalidRuleError> {
    let rule = definition.valid_rule()?;

    let (discarded, kept): (Vec<Occurrence>, Vec<Occurrence>) = existing
        .iter()
        .cloned()
        .partition(|o| o.is_pending() && o.due_date >= today);
    let (past, ahead): (Vec<Occurrence>, Vec<Occurrence>) =
        kept.into_iter().partition(|o| o.due_date < today);

    let first_position = next_position(&past);
    let mut definition = definition.clone();
    if policy == RuleChangePolicy::ResetToZero {
        definition.rotation_offset = first_position;
    }

    let (plan, renumbered) = plan_from(
        &definition,
        &rule,
        &past,
        ahead,
        first_position,
        today,
        horizon_days,
    );
    let mut retained = past;
    retained.extend(renumbered);

    info!(
        definition_id = %definition.id,
        %policy,
        retained = retained.len(),
        discarded = discarded.len(),
        created = plan.occurrences.len(),
        first_position,
        rotation_offset = definition.rotation_offset,
        "regenerated occurrences after rule change"
    );

    Ok(Regeneration {
        retained,
        discarded,
        rotation_offset: definition.rotation_offset,
        plan,
    })
}

/// Split occurrences on definition removal into (kept history, removed).
/// Completed and skipped occurrences are kept; pending ones go.
pub fn retain_history(existing: Vec<Occurrence>) -> (Vec<Occurrence>, Vec<Occurrence>) {
    existing.into_iter().partition(|o| !o.is_pending())
}

// ── Internals ───────────────────────────────────────────────────────

/// Plan new occurrences from `first_position` on. `ahead` holds kept
/// occurrences that must be numbered in date order with the new ones; they
/// are returned renumbered. Dates in `existing` or `ahead` are not planned
/// again.
fn plan_from(
    definition: &ChoreDefinition,
    rule: &ValidRule,
    existing: &[Occurrence],
    mut ahead: Vec<Occurrence>,
    first_position: u64,
    today: NaiveDate,
    horizon_days: u32,
) -> (GenerationPlan, Vec<Occurrence>) {
    ahead.sort_by_key(|o| (o.due_date, o.sequence_position));
    let window = generation_window(definition, today, horizon_days);

    let mut materialized: HashSet<NaiveDate> = existing.iter().map(|o| o.due_date).collect();
    materialized.extend(ahead.iter().map(|o| o.due_date));

    let dates = match window {
        Some(w) => expand_anchored(rule, definition.starts_on, w.start, w.end),
        None => Vec::new(),
    };

    let mut plan = GenerationPlan {
        window,
        ..GenerationPlan::default()
    };
    let mut position = first_position;
    let mut renumbered = Vec::new();
    let mut kept = ahead.into_iter().peekable();

    for date in dates {
        while let Some(mut occ) = kept.next_if(|o| o.due_date <= date) {
            occ.sequence_position = position;
            position += 1;
            renumbered.push(occ);
        }
        if materialized.contains(&date) {
            plan.already_materialized += 1;
            continue;
        }
        let assignees = definition.assignees_at(position);
        if assignees.is_empty() {
            plan.skipped_unassigned.push(date);
            continue;
        }
        plan.occurrences
            .push(Occurrence::pending(definition.id, position, date, assignees));
        position += 1;
    }
    // Kept occurrences beyond the window follow everything planned.
    for mut occ in kept {
        occ.sequence_position = position;
        position += 1;
        renumbered.push(occ);
    }

    if !plan.skipped_unassigned.is_empty() {
        warn!(
            definition_id = %definition.id,
            mode = %definition.assignment.mode(),
            dates = plan.skipped_unassigned.len(),
            "no assignees available; occurrences not materialized"
        );
    }

    if let Some(window) = window {
        info!(
            definition_id = %definition.id,
            window_start = %window.start,
            window_end = %window.end,
            created = plan.occurrences.len(),
            already_materialized = plan.already_materialized,
            "planned occurrences"
        );
    }
    (plan, renumbered)
}
