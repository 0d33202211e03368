//! Best-effort, per-session persistence under a temp directory.
//!
//! Every public operation degrades to "no history" instead of failing: a
//! lost auto-save must never interrupt the conversation. The `try_*`
//! variants expose the underlying [`PersistenceError`].

use crate::error::PersistenceError;
use crate::session::{SessionId, StoreDiagnostics};
use crate::timestamps;
use crate::types::ChatMessage;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const RECORD_EXTENSION: &str = "pkl";

/// What gets written for a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub messages: Vec<ChatMessage>,
    pub timestamp: String,
}

impl SessionRecord {
    /// Snapshot of `messages` stamped with the current local time.
    pub fn snapshot(session_id: &SessionId, messages: &[ChatMessage]) -> Self {
        Self {
            session_id: session_id.as_str().to_string(),
            messages: messages.to_vec(),
            timestamp: timestamps::rfc3339(timestamps::local_now()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct EphemeralStore {
    root: PathBuf,
}

impl EphemeralStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn record_path(&self, session_id: &str) -> PathBuf {
        self.root
            .join(format!("{}.{RECORD_EXTENSION}", sanitize_session_id(session_id)))
    }

    /// Writes `record`, skipping empty histories so a valid earlier save is
    /// never clobbered. Returns `false` on failure and records why in
    /// `diagnostics`.
    pub fn save(&self, record: &SessionRecord, diagnostics: &mut StoreDiagnostics) -> bool {
        if record.messages.is_empty() {
            return true;
        }

        match self.try_save(record) {
            Ok(path) => {
                tracing::debug!(
                    session_id = %record.session_id,
                    messages = record.messages.len(),
                    path = %path.display(),
                    "session saved"
                );
                diagnostics.last_save_time = Some(timestamps::clock(timestamps::local_now()));
                diagnostics.save_file_path = Some(path.display().to_string());
                diagnostics.save_error = None;
                true
            }
            Err(err) => {
                tracing::warn!(session_id = %record.session_id, error = %err, "session save failed");
                diagnostics.save_error = Some(format!("Save failed: {err}"));
                false
            }
        }
    }

    /// Reads the record for `session_id`. Absent, unreadable and corrupt
    /// records all come back as an empty history.
    pub fn load(
        &self,
        session_id: &str,
        diagnostics: &mut StoreDiagnostics,
    ) -> (Vec<ChatMessage>, usize) {
        match self.try_load(session_id) {
            Ok(Some(record)) if !record.messages.is_empty() => {
                let count = record.messages.len();
                tracing::debug!(session_id, count, "session restored");
                (record.messages, count)
            }
            Ok(_) => (Vec::new(), 0),
            Err(err) => {
                tracing::warn!(session_id, error = %err, "session load failed");
                diagnostics.load_error = Some(format!("Load failed: {err}"));
                (Vec::new(), 0)
            }
        }
    }

    /// Removes the record for `session_id` if there is one.
    pub fn cleanup(&self, session_id: &str) -> bool {
        match self.try_remove(session_id) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(session_id, error = %err, "session cleanup failed");
                false
            }
        }
    }

    pub fn try_save(&self, record: &SessionRecord) -> Result<PathBuf, PersistenceError> {
        fs::create_dir_all(&self.root)?;
        let path = self.record_path(&record.session_id);
        let bytes = rmp_serde::to_vec_named(record)?;

        // Write to temp, then rename
        let temp_path = path.with_extension(format!("{RECORD_EXTENSION}.tmp"));
        let written = fs::write(&temp_path, bytes).and_then(|()| fs::rename(&temp_path, &path));
        if let Err(err) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(err.into());
        }
        Ok(path)
    }

    pub fn try_load(&self, session_id: &str) -> Result<Option<SessionRecord>, PersistenceError> {
        let path = self.record_path(session_id);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        let record = rmp_serde::from_slice(&bytes)?;
        Ok(Some(record))
    }

    pub fn try_remove(&self, session_id: &str) -> Result<(), PersistenceError> {
        let path = self.record_path(session_id);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// Keeps the id usable as a single file name.
fn sanitize_session_id(session_id: &str) -> String {
    session_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
