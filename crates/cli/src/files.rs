//! Rule and definition file loading (JSON or YAML, by extension).

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yml") | Some("yaml") => Ok(Self::Yaml),
            _ => bail!(
                "unsupported file type: {} (expected .json, .yml or .yaml)",
                path.display()
            ),
        }
    }
}

fn read(path: &Path) -> Result<(FileFormat, String)> {
    let format = FileFormat::from_path(path)?;
    debug!(path = %path.display(), ?format, "reading file");
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok((format, content))
}

/// Load a file as JSON text. YAML is converted so the result can go through
/// the JSON rule validator unchanged.
pub fn load_json_text(path: &Path) -> Result<String> {
    let (format, content) = read(path)?;
    match format {
        FileFormat::Json => Ok(content),
        FileFormat::Yaml => {
            let value: serde_json::Value = serde_yaml::from_str(&content)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            serde_json::to_string(&value)
                .with_context(|| format!("failed to convert {} to JSON", path.display()))
        }
    }
}

/// Deserialize a file into `T`.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let (format, content) = read(path)?;
    let parsed = match format {
        FileFormat::Json => serde_json::from_str(&content).map_err(anyhow::Error::from),
        FileFormat::Yaml => serde_yaml::from_str(&content).map_err(anyhow::Error::from),
    };
    parsed.with_context(|| format!("failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chores_recurrence::RecurrenceRule;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(FileFormat::from_path(Path::new("a.json")).unwrap(), FileFormat::Json);
        assert_eq!(FileFormat::from_path(Path::new("a.YML")).unwrap(), FileFormat::Yaml);
        assert_eq!(FileFormat::from_path(Path::new("a.yaml")).unwrap(), FileFormat::Yaml);
        assert!(FileFormat::from_path(Path::new("a.toml")).is_err());
        assert!(FileFormat::from_path(Path::new("rule")).is_err());
    }

    #[test]
    fn json_and_yaml_load_the_same_rule() {
        let dir = tempfile::tempdir().unwrap();
        let json = write_file(
            &dir,
            "rule.json",
            r#"{"frequency":"WEEKLY","interval":2,"daysOfWeek":[1,3]}"#,
        );
        let yaml = write_file(
            &dir,
            "rule.yml",
            "frequency: WEEKLY\ninterval: 2\ndaysOfWeek: [1, 3]\n",
        );

        let a: RecurrenceRule = load(&json).unwrap();
        let b: RecurrenceRule = load(&yaml).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, RecurrenceRule::weekly_on(2, [1, 3]));
    }

    #[test]
    fn yaml_converts_to_json_text() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = write_file(&dir, "rule.yaml", "frequency: MONTHLY\ndayOfMonth: 31\n");
        let text = load_json_text(&yaml).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["frequency"], "MONTHLY");
        assert_eq!(value["dayOfMonth"], 31);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load::<RecurrenceRule>(Path::new("/nonexistent/rule.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/rule.json"));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "rule.json", "{ not json");
        let err = load::<RecurrenceRule>(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to parse"));
    }
}
