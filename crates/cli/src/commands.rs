//! Subcommand implementations. Each returns a serializable value; printing is
//! left to `main`.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use chores_recurrence::{expand_rule, validate_json, RecurrenceRule, ValidationResult};
use chores_rotation::{plan_generation, ChoreDefinition, GenerationPlan};
use tracing::{info, warn};

use crate::files;

pub fn validate(rule_path: &Path) -> Result<ValidationResult> {
    let json = files::load_json_text(rule_path)?;
    let result = validate_json(&json);
    if !result.valid {
        warn!(
            path = %rule_path.display(),
            errors = result.errors.len(),
            "rule rejected"
        );
    }
    Ok(result)
}

pub fn expand(rule_path: &Path, from: NaiveDate, to: NaiveDate) -> Result<Vec<NaiveDate>> {
    let rule: RecurrenceRule = files::load(rule_path)?;
    let dates = expand_rule(&rule, from, to)
        .with_context(|| format!("cannot expand {}", rule_path.display()))?;
    info!(%from, %to, count = dates.len(), "expanded rule");
    Ok(dates)
}

/// Plan a first generation run for a definition with no existing occurrences.
pub fn plan(definition_path: &Path, today: NaiveDate, horizon_days: u32) -> Result<GenerationPlan> {
    let definition: ChoreDefinition = files::load(definition_path)?;
    plan_generation(&definition, &[], today, horizon_days)
        .with_context(|| format!("cannot plan '{}'", definition.title))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn validate_reports_path_addressed_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "bad.yml", "frequency: DAILY\ndayOfMonth: 3\n");

        let result = validate(&path).unwrap();
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.path == "dayOfMonth"));
    }

    #[test]
    fn validate_reports_parse_errors_as_results() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "bad.json", r#"{"frequency":"HOURLY"}"#);

        let result = validate(&path).unwrap();
        assert!(!result.valid);
        assert_eq!(result.errors[0].path, "");
    }

    #[test]
    fn expand_prints_weekday_dates() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "mwf.json",
            r#"{"frequency":"WEEKLY","interval":1,"daysOfWeek":[1,3,5]}"#,
        );

        let dates = expand(&path, d(2024, 1, 1), d(2024, 1, 7)).unwrap();
        assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 1, 3), d(2024, 1, 5)]);
    }

    #[test]
    fn expand_rejects_invalid_rules() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "zero.json", r#"{"frequency":"DAILY","interval":0}"#);
        let err = expand(&path, d(2024, 1, 1), d(2024, 1, 7)).unwrap_err();
        assert!(format!("{:#}", err).contains("interval"));
    }

    #[test]
    fn plan_previews_rotation() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "bins.yml",
            r#"
title: Bins
startsOn: 2024-01-01
recurrence:
  frequency: WEEKLY
  daysOfWeek: [1, 4]
assignment:
  mode: ROUND_ROBIN
  roundRobinPoolIds: [ann, ben, cat]
"#,
        );

        let plan = plan(&path, d(2024, 1, 1), 7).unwrap();
        let rows: Vec<(NaiveDate, u64, &str)> = plan
            .occurrences
            .iter()
            .map(|o| (o.due_date, o.sequence_position, o.assigned_user_ids[0].as_str()))
            .collect();
        assert_eq!(
            rows,
            vec![
                (d(2024, 1, 1), 0, "ann"),
                (d(2024, 1, 4), 1, "ben"),
                (d(2024, 1, 8), 2, "cat"),
            ]
        );
    }
}
