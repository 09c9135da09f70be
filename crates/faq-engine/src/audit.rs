//! Append-only journal of learning events
//!
//! The audit log is persisted independently from the knowledge base so a
//! corrupted or rolled-back store never loses the learning trail. The core
//! only ever writes it; it is read by humans and analytics tooling.

use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::store::write_atomic;
use crate::types::AuditEntry;

/// Write-only sink recording what was learned, from which source, when.
pub struct AuditLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl AuditLog {
    /// Create an audit log backed by `path`; the file is created on the
    /// first recorded event.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Append one learning event. Existing entries are never rewritten; a
    /// malformed existing file is surfaced instead of being clobbered.
    pub fn record(&self, question: Vec<String>, answer: &str, source: &str) -> Result<()> {
        let _guard = self.lock.lock();

        let mut entries = load_entries(&self.path)?;
        entries.push(AuditEntry::now(
            question,
            answer.to_string(),
            source.to_string(),
        ));

        let json = serde_json::to_string_pretty(&entries)?;
        write_atomic(&self.path, &json)?;
        tracing::debug!("Audit entry recorded (source: {})", source);
        Ok(())
    }
}

fn load_entries(path: &Path) -> Result<Vec<AuditEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data)
        .map_err(|e| Error::persistence(format!("malformed audit log {}: {}", path.display(), e)))
}
