//! Durable knowledge store with atomic full-rewrite persistence

use parking_lot::Mutex;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::types::KnowledgeRecord;

/// Single source of truth for learned (questions, answer) records.
///
/// Records only ever get appended; the whole collection is rewritten on
/// every append, which is acceptable for the expected corpus size
/// (hundreds to low thousands of records). The append lock is held across
/// the entire merge-and-rewrite, so two concurrent learning events cannot
/// lose each other's update.
pub struct KnowledgeStore {
    path: PathBuf,
    records: Mutex<Vec<KnowledgeRecord>>,
}

impl KnowledgeStore {
    /// Open the store at `path`. A missing file is a cold start and yields
    /// an empty store; a malformed file or a record without variants fails
    /// fast with [`Error::InvalidRecord`].
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = load_records(&path)?;
        tracing::info!(
            "Knowledge store loaded: {} records from {}",
            records.len(),
            path.display()
        );
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    /// Append one record and rewrite the whole file atomically.
    ///
    /// The in-memory collection is updated even when the durable write
    /// fails, so the session stays consistent and queryable; the write
    /// error is surfaced to the caller.
    pub fn append(&self, variants: &[String], answer: &str) -> Result<()> {
        if variants.is_empty() {
            return Err(Error::invalid_record(
                "a record needs at least one question variant",
            ));
        }

        let mut records = self.records.lock();
        records.push(KnowledgeRecord {
            questions: variants.to_vec(),
            answer: answer.to_string(),
        });

        let json = serde_json::to_string_pretty(&*records)?;
        write_atomic(&self.path, &json)
    }

    /// Snapshot of every record, in insertion order
    pub fn records(&self) -> Vec<KnowledgeRecord> {
        self.records.lock().clone()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// True when nothing has been learned yet
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Total variant count across all records. The semantic index must
    /// hold exactly this many entries after any completed update.
    pub fn variant_count(&self) -> usize {
        self.records.lock().iter().map(|r| r.questions.len()).sum()
    }
}

fn load_records(path: &Path) -> Result<Vec<KnowledgeRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let data = fs::read_to_string(path)?;
    let records: Vec<KnowledgeRecord> = serde_json::from_str(&data).map_err(|e| {
        Error::invalid_record(format!("malformed knowledge base {}: {}", path.display(), e))
    })?;

    for (i, record) in records.iter().enumerate() {
        if record.questions.is_empty() {
            return Err(Error::invalid_record(format!(
                "record {} has no question variants",
                i
            )));
        }
    }

    Ok(records)
}

/// Write `contents` to `path` through a temp file in the same directory,
/// then atomically replace the target. A crash mid-write leaves the old
/// file intact, never a truncated one.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.persist(path).map_err(|e| {
        Error::persistence(format!("atomic replace of {} failed: {}", path.display(), e))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn variants(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn missing_file_is_a_cold_start() {
        let dir = TempDir::new().unwrap();
        let store = KnowledgeStore::open(dir.path().join("botbase.json")).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.variant_count(), 0);
    }

    #[test]
    fn append_then_reload_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("botbase.json");

        let store = KnowledgeStore::open(&path).unwrap();
        store
            .append(&variants(&["bonjour", "salut toi"]), "salut")
            .unwrap();
        store.append(&variants(&["quelle heure"]), "midi").unwrap();

        let reloaded = KnowledgeStore::open(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        let records = reloaded.records();
        assert_eq!(records[0].questions, variants(&["bonjour", "salut toi"]));
        assert_eq!(records[0].answer, "salut");
        assert_eq!(records[1].answer, "midi");
        assert_eq!(reloaded.variant_count(), 3);
    }

    #[test]
    fn empty_variants_are_rejected_before_any_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("botbase.json");
        let store = KnowledgeStore::open(&path).unwrap();

        let err = store.append(&[], "salut").unwrap_err();
        assert!(matches!(err, Error::InvalidRecord(_)));
        assert!(!path.exists());
        assert!(store.is_empty());
    }

    #[test]
    fn malformed_file_fails_fast() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("botbase.json");
        fs::write(&path, "{ not json ]").unwrap();

        assert!(matches!(
            KnowledgeStore::open(&path),
            Err(Error::InvalidRecord(_))
        ));
    }

    #[test]
    fn record_without_variants_fails_fast_on_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("botbase.json");
        fs::write(&path, r#"[{"questions": [], "answer": "salut"}]"#).unwrap();

        assert!(matches!(
            KnowledgeStore::open(&path),
            Err(Error::InvalidRecord(_))
        ));
    }

    #[test]
    fn failed_write_surfaces_error_but_keeps_the_record_in_memory() {
        let dir = TempDir::new().unwrap();
        // a regular file where the store expects its parent directory,
        // so every durable write fails
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let path = blocker.join("botbase.json");

        let store = KnowledgeStore::open(&path).unwrap();
        let err = store
            .append(&variants(&["bonjour"]), "salut")
            .unwrap_err();
        assert!(err.is_persistence());

        // the session keeps the record and stays queryable
        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].answer, "salut");
        assert_eq!(store.variant_count(), 1);
    }

    #[test]
    fn persisted_file_is_valid_json_with_unicode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("botbase.json");
        let store = KnowledgeStore::open(&path).unwrap();
        store
            .append(&variants(&["où es-tu ?"]), "à Paris")
            .unwrap();

        let data = fs::read_to_string(&path).unwrap();
        assert!(data.contains("où es-tu ?"));
        let parsed: Vec<KnowledgeRecord> = serde_json::from_str(&data).unwrap();
        assert_eq!(parsed[0].answer, "à Paris");
    }
}
