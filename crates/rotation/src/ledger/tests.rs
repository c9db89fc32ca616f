//! Tests for the in-memory occurrence ledger.

use super::*;
use chores_core::OccurrenceStatus;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn ids(raw: &[&str]) -> Vec<UserId> {
    raw.iter().map(|s| s.to_string()).collect()
}

fn ledger() -> OccurrenceLedger {
    OccurrenceLedger::with_settings(6, RuleChangePolicy::ContinueSequence)
}

/// Daily round-robin chore starting 2024-01-01, registered and generated
/// for a week (positions 0..=6).
fn seeded(ledger: &OccurrenceLedger, pool: &[&str]) -> DefinitionId {
    let def = ChoreDefinition::new(
        "Dishes",
        RecurrenceRule::daily(1),
        d(2024, 1, 1),
        Assignment::RoundRobin { pool: ids(pool) },
    );
    let id = def.id;
    ledger.register(def).unwrap();
    ledger.generate(id, d(2024, 1, 1)).unwrap();
    id
}

fn assignees(ledger: &OccurrenceLedger, id: DefinitionId) -> Vec<String> {
    ledger
        .occurrences(id)
        .unwrap()
        .iter()
        .map(|o| o.assigned_user_ids.join("+"))
        .collect()
}

// ── Registration ────────────────────────────────────────────────────

#[test]
fn register_and_generate() {
    let ledger = ledger();
    let id = seeded(&ledger, &["ann", "ben"]);

    assert_eq!(ledger.len().unwrap(), 1);
    let occs = ledger.occurrences(id).unwrap();
    assert_eq!(occs.len(), 7);
    assert_eq!(occs[6].due_date, d(2024, 1, 7));
    assert_eq!(assignees(&ledger, id)[..3], ["ann", "ben", "ann"]);
}

#[test]
fn generate_twice_creates_nothing_new() {
    let ledger = ledger();
    let id = seeded(&ledger, &["ann"]);
    assert!(ledger.generate(id, d(2024, 1, 1)).unwrap().is_empty());
    assert_eq!(ledger.generate(id, d(2024, 1, 2)).unwrap().len(), 1);
}

#[test]
fn register_rejects_invalid_rule() {
    let ledger = ledger();
    let def = ChoreDefinition::new(
        "Broken",
        RecurrenceRule::monthly_on_day(1, 0),
        d(2024, 1, 1),
        Assignment::Fixed { fixed: ids(&["mum"]) },
    );
    let err = ledger.register(def).unwrap_err();
    assert!(matches!(err, ChoreError::InvalidRule(_)));
    assert!(ledger.is_empty().unwrap());
}

#[test]
fn register_rejects_duplicates() {
    let ledger = ledger();
    let def = ChoreDefinition::new(
        "Dishes",
        RecurrenceRule::daily(1),
        d(2024, 1, 1),
        Assignment::Fixed { fixed: ids(&["mum"]) },
    );
    ledger.register(def.clone()).unwrap();
    assert!(matches!(
        ledger.register(def),
        Err(ChoreError::DuplicateDefinition(_))
    ));
}

#[test]
fn unknown_definition_and_position() {
    let ledger = ledger();
    let id = seeded(&ledger, &["ann"]);

    assert!(matches!(
        ledger.occurrences(uuid::Uuid::new_v4()),
        Err(ChoreError::DefinitionNotFound(_))
    ));
    assert!(matches!(
        ledger.skip(id, 99),
        Err(ChoreError::OccurrenceNotFound { position: 99, .. })
    ));
}

// ── Transitions ─────────────────────────────────────────────────────

#[test]
fn complete_is_terminal_and_isolated() {
    let ledger = ledger();
    let id = seeded(&ledger, &["ann", "ben"]);

    ledger.complete(id, 0, "ann", Utc::now()).unwrap();
    let err = ledger.complete(id, 0, "ben", Utc::now()).unwrap_err();
    assert!(matches!(err, ChoreError::InvalidTransition(_)));

    let occs = ledger.occurrences(id).unwrap();
    assert_eq!(occs[0].status, OccurrenceStatus::Completed);
    assert_eq!(occs[0].completed_by.as_deref(), Some("ann"));
    assert!(occs[1..].iter().all(|o| o.is_pending()));
}

#[test]
fn out_of_order_completion_keeps_rotation() {
    let ledger = ledger();
    let id = seeded(&ledger, &["ann", "ben", "cat"]);
    let before = assignees(&ledger, id);

    let changes = ledger.complete(id, 4, "ben", Utc::now()).unwrap();
    assert!(changes.is_empty());
    ledger.complete(id, 1, "ben", Utc::now()).unwrap();

    assert_eq!(assignees(&ledger, id), before);
    assert_eq!(ledger.pending(id).unwrap().len(), 5);
}

#[test]
fn skip_never_moves_the_rotation() {
    let ledger = ledger();
    let id = seeded(&ledger, &["A", "B"]);

    ledger.skip(id, 0).unwrap();
    let occs = ledger.occurrences(id).unwrap();
    assert_eq!(occs[0].status, OccurrenceStatus::Skipped);
    assert_eq!(occs[1].assigned_user_ids, ids(&["B"]));
    assert!(ledger.skip(id, 0).is_err());
}

#[test]
fn unskip_picks_up_roster_changes() {
    let ledger = ledger();
    let id = seeded(&ledger, &["ann", "ben"]);

    ledger.skip(id, 1).unwrap();
    ledger
        .update_assignment(id, Assignment::RoundRobin { pool: ids(&["cat"]) })
        .unwrap();
    // Skipped occurrences are not reflowed...
    assert_eq!(ledger.occurrences(id).unwrap()[1].assigned_user_ids, ids(&["ben"]));

    // ...until they come back.
    let occ = ledger.unskip(id, 1).unwrap();
    assert!(occ.is_pending());
    assert_eq!(occ.assigned_user_ids, ids(&["cat"]));
}

// ── Roster and rule edits ───────────────────────────────────────────

#[test]
fn assignment_edit_reflows_pending_only() {
    let ledger = ledger();
    let id = seeded(&ledger, &["ann", "ben"]);
    ledger.complete(id, 0, "ann", Utc::now()).unwrap();

    let changes = ledger
        .update_assignment(
            id,
            Assignment::Mixed {
                fixed: ids(&["mum"]),
                pool: ids(&["ann", "ben"]),
            },
        )
        .unwrap();

    assert_eq!(changes.len(), 6);
    let all = assignees(&ledger, id);
    assert_eq!(all[0], "ann");
    assert_eq!(all[1], "mum+ben");
    assert_eq!(all[2], "mum+ann");
    assert_eq!(
        ledger.definition(id).unwrap().assignment.fixed_ids(),
        ids(&["mum"]).as_slice()
    );
}

#[test]
fn rule_edit_regenerates_with_continuing_positions() {
    let ledger = ledger();
    let id = seeded(&ledger, &["ann", "ben", "cat"]);
    ledger.complete(id, 0, "ann", Utc::now()).unwrap();
    ledger.complete(id, 1, "ben", Utc::now()).unwrap();

    let regen = ledger
        .update_rule(id, RecurrenceRule::daily(2), None, d(2024, 1, 3))
        .unwrap();
    assert_eq!(regen.discarded.len(), 5);

    let occs = ledger.occurrences(id).unwrap();
    let summary: Vec<(NaiveDate, u64)> = occs
        .iter()
        .map(|o| (o.due_date, o.sequence_position))
        .collect();
    assert_eq!(
        summary,
        vec![
            (d(2024, 1, 1), 0),
            (d(2024, 1, 2), 1),
            (d(2024, 1, 3), 2),
            (d(2024, 1, 5), 3),
            (d(2024, 1, 7), 4),
            (d(2024, 1, 9), 5),
        ]
    );
    assert_eq!(ledger.definition(id).unwrap().recurrence, RecurrenceRule::daily(2));
}

#[test]
fn rule_edit_with_reset_policy() {
    let ledger = OccurrenceLedger::with_settings(6, RuleChangePolicy::ResetToZero);
    let id = seeded(&ledger, &["ann", "ben", "cat"]);
    ledger.complete(id, 0, "ann", Utc::now()).unwrap();

    let regen = ledger
        .update_rule(id, RecurrenceRule::weekly(1), Some(d(2024, 1, 8)), d(2024, 1, 2))
        .unwrap();
    assert_eq!(regen.rotation_offset, 1);
    let created: Vec<(NaiveDate, u64, &str)> = regen
        .plan
        .occurrences
        .iter()
        .map(|o| (o.due_date, o.sequence_position, o.assigned_user_ids[0].as_str()))
        .collect();
    // Positions keep counting; the rotation starts over at the pool's head.
    assert_eq!(created, vec![(d(2024, 1, 8), 1, "ann")]);
    let def = ledger.definition(id).unwrap();
    assert_eq!(def.starts_on, d(2024, 1, 8));
    assert_eq!(def.rotation_offset, 1);

    // The regenerated occurrence is addressable and completes.
    ledger.complete(id, 1, "ann", Utc::now()).unwrap();
    let occs = ledger.occurrences(id).unwrap();
    let rows: Vec<(NaiveDate, u64, OccurrenceStatus)> = occs
        .iter()
        .map(|o| (o.due_date, o.sequence_position, o.status))
        .collect();
    assert_eq!(
        rows,
        vec![
            (d(2024, 1, 1), 0, OccurrenceStatus::Completed),
            (d(2024, 1, 8), 1, OccurrenceStatus::Completed),
        ]
    );

    // Later generation keeps the restarted rotation.
    let next = ledger.generate(id, d(2024, 1, 9)).unwrap();
    assert_eq!(next.len(), 1);
    assert_eq!(next[0].due_date, d(2024, 1, 15));
    assert_eq!(next[0].sequence_position, 2);
    assert_eq!(next[0].assigned_user_ids, ids(&["ben"]));

    ledger.skip(id, 2).unwrap();
    let back = ledger.unskip(id, 2).unwrap();
    assert_eq!(back.assigned_user_ids, ids(&["ben"]));
}

#[test]
fn rule_edit_renumbers_early_completions() {
    let ledger = ledger();
    let id = seeded(&ledger, &["ann", "ben"]);
    // Jan 5 done ahead of time.
    ledger.complete(id, 4, "ben", Utc::now()).unwrap();

    ledger
        .update_rule(id, RecurrenceRule::daily(1), None, d(2024, 1, 3))
        .unwrap();

    let occs = ledger.occurrences(id).unwrap();
    for (rank, occ) in occs.iter().enumerate() {
        assert_eq!(occ.sequence_position, rank as u64, "{}", occ.due_date);
    }
    assert_eq!(occs[4].due_date, d(2024, 1, 5));
    assert_eq!(occs[4].status, OccurrenceStatus::Completed);
    ledger.complete(id, 3, "ben", Utc::now()).unwrap();
    assert!(ledger.complete(id, 4, "ann", Utc::now()).is_err());
}

#[test]
fn invalid_rule_edit_changes_nothing() {
    let ledger = ledger();
    let id = seeded(&ledger, &["ann"]);
    let before = ledger.occurrences(id).unwrap();

    let err = ledger
        .update_rule(id, RecurrenceRule::weekly_on(1, [9]), None, d(2024, 1, 2))
        .unwrap_err();
    assert!(matches!(err, ChoreError::InvalidRule(_)));
    assert_eq!(ledger.occurrences(id).unwrap(), before);
    assert_eq!(ledger.definition(id).unwrap().recurrence, RecurrenceRule::daily(1));
}

#[test]
fn remove_returns_history() {
    let ledger = ledger();
    let id = seeded(&ledger, &["ann", "ben"]);
    ledger.complete(id, 0, "ann", Utc::now()).unwrap();
    ledger.skip(id, 1).unwrap();

    let history = ledger.remove(id).unwrap();
    assert_eq!(history.len(), 2);
    assert!(ledger.is_empty().unwrap());
    assert!(matches!(
        ledger.remove(id),
        Err(ChoreError::DefinitionNotFound(_))
    ));
}

// ── Concurrency ─────────────────────────────────────────────────────

#[test]
fn poisoned_ledger_reports_an_error() {
    let ledger = ledger();
    std::thread::scope(|s| {
        let result = s
            .spawn(|| {
                let _entries = ledger.entries.write().unwrap();
                panic!("writer died holding the lock");
            })
            .join();
        assert!(result.is_err());
    });

    assert!(matches!(ledger.len(), Err(ChoreError::LockPoisoned(_))));
    assert!(ledger.is_empty().is_err());
}

#[test]
fn concurrent_completions_on_one_definition() {
    let ledger = ledger();
    let id = seeded(&ledger, &["ann", "ben", "cat"]);
    let before = assignees(&ledger, id);

    std::thread::scope(|s| {
        for position in 0..7u64 {
            let ledger = &ledger;
            s.spawn(move || {
                ledger
                    .complete(id, position, "ann", Utc::now())
                    .unwrap();
            });
        }
    });

    assert!(ledger.pending(id).unwrap().is_empty());
    assert_eq!(assignees(&ledger, id), before);
}
