//! core::checkpoints
//!
//! Read-only view of installer checkpoints.
//!
//! Installers record each configuration change as a checkpoint directory
//! under `backup_dir`:
//!
//! ```text
//! <backup_dir>/<unix timestamp>/
//!     CHANGES_SINCE    title and description of the change
//!     FILEPATHS        one changed file per line
//! ```
//!
//! This module only lists them; creating and reverting checkpoints is the
//! installer's business.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::debug;

const CHANGES_FILE: &str = "CHANGES_SINCE";
const FILEPATHS_FILE: &str = "FILEPATHS";

/// One saved configuration checkpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    /// Directory name (the timestamp as written by the installer)
    pub name: String,
    /// Parsed timestamp, if the name is one
    pub timestamp: Option<DateTime<Utc>>,
    /// Contents of `CHANGES_SINCE`
    pub changes: String,
    /// Files recorded in `FILEPATHS`
    pub files: Vec<PathBuf>,
}

fn parse_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let secs: f64 = name.parse().ok()?;
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    DateTime::from_timestamp(secs.trunc() as i64, 0)
}

fn read_checkpoint(dir: &Path, name: String) -> io::Result<Checkpoint> {
    let changes = match fs::read_to_string(dir.join(CHANGES_FILE)) {
        Ok(text) => text.trim_end().to_string(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e),
    };
    let files = match fs::read_to_string(dir.join(FILEPATHS_FILE)) {
        Ok(text) => text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(PathBuf::from)
            .collect(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(e),
    };

    Ok(Checkpoint {
        timestamp: parse_timestamp(&name),
        name,
        changes,
        files,
    })
}

/// List the checkpoints under `backup_dir`, newest first.
///
/// A missing `backup_dir` simply has no checkpoints.
pub fn list_checkpoints(backup_dir: &Path) -> io::Result<Vec<Checkpoint>> {
    if !backup_dir.is_dir() {
        debug!(dir = %backup_dir.display(), "No backup directory");
        return Ok(Vec::new());
    }

    let mut checkpoints = Vec::new();
    for entry in fs::read_dir(backup_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        checkpoints.push(read_checkpoint(&path, name)?);
    }

    // Undated directories sort after dated ones
    checkpoints.sort_by(|a, b| match (a.timestamp, b.timestamp) {
        (Some(x), Some(y)) => y.cmp(&x).then_with(|| b.name.cmp(&a.name)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.name.cmp(&b.name),
    });
    Ok(checkpoints)
}

/// Render checkpoints for the operator.
pub fn format_checkpoints(checkpoints: &[Checkpoint]) -> String {
    if checkpoints.is_empty() {
        return "No configuration changes have been recorded.".to_string();
    }

    let mut out = String::new();
    for checkpoint in checkpoints {
        let when = checkpoint
            .timestamp
            .map(|t| t.format("%a %b %e %H:%M:%S %Y").to_string())
            .unwrap_or_else(|| checkpoint.name.clone());
        out.push_str(&format!("-- {} --\n", when));
        if !checkpoint.changes.is_empty() {
            out.push_str(&checkpoint.changes);
            out.push('\n');
        }
        out.push_str("Files changed:\n");
        for file in &checkpoint.files {
            out.push_str(&format!("  {}\n", file.display()));
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_checkpoint(root: &Path, name: &str, changes: &str, files: &[&str]) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(CHANGES_FILE), changes).unwrap();
        fs::write(dir.join(FILEPATHS_FILE), files.join("\n")).unwrap();
    }

    #[test]
    fn missing_backup_dir_is_empty() {
        let temp = TempDir::new().unwrap();
        let list = list_checkpoints(&temp.path().join("missing")).unwrap();
        assert!(list.is_empty());
        assert_eq!(
            format_checkpoints(&list),
            "No configuration changes have been recorded."
        );
    }

    #[test]
    fn newest_first() {
        let temp = TempDir::new().unwrap();
        write_checkpoint(temp.path(), "1436899262.64", "older", &["/etc/a.conf"]);
        write_checkpoint(temp.path(), "1436899300.10", "newer", &["/etc/b.conf"]);
        write_checkpoint(temp.path(), "scratch", "undated", &[]);

        let names: Vec<_> = list_checkpoints(temp.path())
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["1436899300.10", "1436899262.64", "scratch"]);
    }

    #[test]
    fn reads_changes_and_files() {
        let temp = TempDir::new().unwrap();
        write_checkpoint(
            temp.path(),
            "1436899262",
            "Deployed certificate\n",
            &["/etc/a.conf", "", "/etc/b.conf"],
        );

        let list = list_checkpoints(temp.path()).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].changes, "Deployed certificate");
        assert_eq!(
            list[0].files,
            vec![PathBuf::from("/etc/a.conf"), PathBuf::from("/etc/b.conf")]
        );
        assert!(list[0].timestamp.is_some());
    }

    #[test]
    fn format_lists_files() {
        let checkpoint = Checkpoint {
            name: "1436899262".to_string(),
            timestamp: parse_timestamp("1436899262"),
            changes: "Enabled redirect".to_string(),
            files: vec![PathBuf::from("/etc/nginx/site.conf")],
        };
        let text = format_checkpoints(&[checkpoint]);
        assert!(text.starts_with("-- "));
        assert!(text.contains("Enabled redirect"));
        assert!(text.contains("Files changed:\n  /etc/nginx/site.conf"));
    }

    #[test]
    fn timestamp_parsing() {
        assert!(parse_timestamp("1436899262.64").is_some());
        assert!(parse_timestamp("-5").is_none());
        assert!(parse_timestamp("notes").is_none());
    }
}
