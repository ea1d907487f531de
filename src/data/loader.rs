// ============================================================
// Layer 4 — JSON-lines Loader
// ============================================================
// Corpus files hold one JSON object per line:
//
//   dataset/
//     train.txt          ← RelationRecord per line
//     train_0.1.txt      ← sampled subsets (sampler.rs)
//     type2id.json       ← type vocabulary (type_vocab.rs)
//
// Blank lines are skipped. A line that doesn't parse fails the
// whole read with its line number, since a corrupt corpus file
// is not something to silently train on.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs::{self, File},
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

/// Read every non-blank line of `path` as a `T`.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path)
        .with_context(|| format!("Cannot open '{}'", path.display()))?;

    let mut records = Vec::new();
    for (n, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("Cannot read '{}'", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line)
            .with_context(|| format!("Bad JSON on line {} of '{}'", n + 1, path.display()))?;
        records.push(record);
    }

    tracing::debug!("Read {} records from '{}'", records.len(), path.display());
    Ok(records)
}

/// Write `records` to `path`, one JSON object per line.
/// Parent directories are created if missing.
pub fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create '{}'", parent.display()))?;
    }

    let file = File::create(path)
        .with_context(|| format!("Cannot create '{}'", path.display()))?;
    let mut out = BufWriter::new(file);
    for record in records {
        serde_json::to_writer(&mut out, record)?;
        out.write_all(b"\n")?;
    }
    out.flush()
        .with_context(|| format!("Cannot write '{}'", path.display()))?;

    tracing::debug!("Wrote {} records to '{}'", records.len(), path.display());
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::RelationRecord;

    #[test]
    fn test_skips_blank_lines() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.txt");
        fs::write(
            &path,
            "{\"token\": [\"a\", \"b\"], \"h\": {\"pos\": [0, 1]}, \"t\": {\"pos\": [1, 2]}, \"relation\": \"r\"}\n\n",
        )
        .unwrap();

        let records: Vec<RelationRecord> = read_jsonl(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].relation, "r");
    }

    #[test]
    fn test_reports_bad_line_number() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.txt");
        fs::write(&path, "{\"relation\": 1}\nnot json\n").unwrap();

        let err = read_jsonl::<serde_json::Value>(&path).unwrap_err();
        assert!(format!("{err}").contains("line 2"));
    }

    #[test]
    fn test_write_then_read_back() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.txt");
        let rows = vec![serde_json::json!({"a": 1}), serde_json::json!({"b": [2, 3]})];

        write_jsonl(&path, &rows).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert_eq!(read_jsonl::<serde_json::Value>(&path).unwrap(), rows);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_jsonl::<serde_json::Value>(&dir.path().join("nope.txt")).is_err());
    }
}
