//! Session identity and the per-session state bag.

use crate::history::ChatHistory;
use crate::types::ModelOption;
use once_cell::sync::OnceCell;
use sha2::{Digest, Sha256};
use std::fmt;

const SESSION_PREFIX: &str = "paird_chat_";
const SESSION_MODULUS: u64 = 1_000_000;

static PROCESS_SESSION: OnceCell<SessionId> = OnceCell::new();

/// Opaque key naming a session's ephemeral record.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Derives `paird_chat_<n>` from a seed: `n` is the first eight bytes
    /// of the seed's SHA-256, big-endian, modulo one million. The same seed
    /// gives the same id on every build; different seeds may collide.
    pub fn derive(seed: &str) -> Self {
        let digest = Sha256::digest(seed.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        Self(format!(
            "{SESSION_PREFIX}{}",
            u64::from_be_bytes(prefix) % SESSION_MODULUS
        ))
    }

    /// Wraps an existing id verbatim.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The id for this process, fixed on first call. Later seeds are ignored.
    pub fn current(seed: Option<&str>) -> &'static SessionId {
        PROCESS_SESSION.get_or_init(|| {
            let seed = seed.map(str::to_string).unwrap_or_else(default_seed);
            let id = SessionId::derive(&seed);
            tracing::debug!(session_id = %id, "session identity resolved");
            id
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// User name and working directory: stable across restarts of the same
/// user's session in the same place.
fn default_seed() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_default();
    let cwd = std::env::current_dir()
        .map(|dir| dir.display().to_string())
        .unwrap_or_default();
    format!("{user}@{cwd}")
}

/// A file produced for download.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub contents: String,
}

/// Diagnostics left behind by the ephemeral store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreDiagnostics {
    pub last_save_time: Option<String>,
    pub save_file_path: Option<String>,
    pub save_error: Option<String>,
    pub load_error: Option<String>,
}

/// Everything the conversation controller tracks for one session.
///
/// Created by `ConversationController::open_session` at session start and
/// dropped when the session ends.
#[derive(Clone, Debug)]
pub struct SessionContext {
    pub session_id: SessionId,
    pub history: ChatHistory,
    pub selected_model: ModelOption,
    pub(crate) stream_pending: bool,
    pub download: Option<ExportArtifact>,
    pub export_text: Option<ExportArtifact>,
    pub(crate) conversation_loaded: bool,
    pub(crate) restored_count: Option<usize>,
    pub diagnostics: StoreDiagnostics,
}

impl SessionContext {
    pub fn new(session_id: SessionId, selected_model: ModelOption) -> Self {
        Self {
            session_id,
            history: ChatHistory::new(),
            selected_model,
            stream_pending: false,
            download: None,
            export_text: None,
            conversation_loaded: false,
            restored_count: None,
            diagnostics: StoreDiagnostics::default(),
        }
    }

    /// True while a completion stream is open.
    pub fn is_awaiting_completion(&self) -> bool {
        self.stream_pending
    }
}
