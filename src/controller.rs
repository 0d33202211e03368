//! Conversation controller: turns user events into history, persistence and
//! completion-stream transitions over an explicit [`SessionContext`].
//!
//! A session is `Idle` until [`ConversationController::start_turn`] marks a
//! stream as pending, and returns to `Idle` in
//! [`ConversationController::finish_turn`]. [`ConversationController::submit`]
//! runs the whole cycle for callers that can hold the context across the
//! stream.

use crate::ai::{CompletionClient, CompletionRequest};
use crate::config::Settings;
use crate::error::{AppError, CompletionError, ConfigurationError};
use crate::history::ChatHistory;
use crate::session::{ExportArtifact, SessionContext, SessionId};
use crate::store::{EphemeralStore, SessionRecord};
use crate::timestamps;
use crate::types::{ChatMessage, ModelOption};
use futures::StreamExt;

pub use crate::error::TurnError;

/// Receives response fragments as they arrive.
pub trait FragmentSink {
    fn on_fragment(&mut self, fragment: &str);
}

impl<F> FragmentSink for F
where
    F: FnMut(&str),
{
    fn on_fragment(&mut self, fragment: &str) {
        self(fragment)
    }
}

/// A user message that has been recorded and is waiting for its response.
#[derive(Debug)]
pub struct PendingTurn {
    request: CompletionRequest,
}

/// How a response stream ended.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamOutcome {
    Completed(String),
    Failed {
        partial: String,
        error: CompletionError,
    },
}

impl StreamOutcome {
    /// Text of the assistant message that closes the turn.
    pub fn into_reply(self) -> String {
        match self {
            StreamOutcome::Completed(text) => text,
            StreamOutcome::Failed { partial, error } => {
                let notice = format!("❌ **Error generating response:** {error}");
                if partial.is_empty() {
                    notice
                } else {
                    format!("{partial}\n\n{notice}")
                }
            }
        }
    }
}

pub struct ConversationController {
    store: EphemeralStore,
    client: CompletionClient,
    default_model: ModelOption,
}

impl ConversationController {
    pub fn new(store: EphemeralStore, client: CompletionClient, default_model: ModelOption) -> Self {
        Self {
            store,
            client,
            default_model,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigurationError> {
        Ok(Self::new(
            EphemeralStore::new(&settings.store_dir),
            CompletionClient::from_settings(settings)?,
            settings.default_model,
        ))
    }

    pub fn store(&self) -> &EphemeralStore {
        &self.store
    }

    /// Starts a session, restoring any history saved under `session_id`.
    pub fn open_session(&self, session_id: SessionId) -> SessionContext {
        let mut ctx = SessionContext::new(session_id, self.default_model);
        let (messages, count) = self
            .store
            .load(ctx.session_id.as_str(), &mut ctx.diagnostics);
        if count > 0 {
            tracing::info!(session_id = %ctx.session_id, count, "restored previous conversation");
            ctx.history.replace(messages);
            ctx.restored_count = Some(count);
        }
        ctx
    }

    /// Records the user message, persists it and moves the session to
    /// awaiting-completion.
    pub fn start_turn(&self, ctx: &mut SessionContext, text: &str) -> Result<PendingTurn, TurnError> {
        if ctx.stream_pending {
            return Err(TurnError::StreamPending);
        }
        if text.trim().is_empty() {
            return Err(TurnError::EmptyInput);
        }

        ctx.history.append(ChatMessage::user(text));
        self.persist(ctx);
        ctx.stream_pending = true;

        let request = CompletionRequest::new(
            ctx.history.messages(),
            ctx.selected_model,
            timestamps::local_now(),
        );
        Ok(PendingTurn { request })
    }

    /// Consumes the response stream, forwarding each fragment to `sink`
    /// before the next one is awaited.
    pub async fn stream_turn(&self, turn: PendingTurn, sink: &mut impl FragmentSink) -> StreamOutcome {
        let mut fragments = self.client.open_stream(turn.request);
        let mut text = String::new();
        let mut count = 0usize;

        while let Some(item) = fragments.next().await {
            match item {
                Ok(piece) => {
                    sink.on_fragment(&piece);
                    text.push_str(&piece);
                    count += 1;
                }
                Err(error) => {
                    tracing::warn!(%error, fragments = count, "response stream ended with an error");
                    return StreamOutcome::Failed {
                        partial: text,
                        error,
                    };
                }
            }
        }

        tracing::debug!(fragments = count, chars = text.len(), "response stream complete");
        StreamOutcome::Completed(text)
    }

    /// Appends the assistant message for `outcome`, persists, and returns the
    /// session to idle.
    pub fn finish_turn(&self, ctx: &mut SessionContext, outcome: StreamOutcome) -> ChatMessage {
        let reply = ChatMessage::assistant(outcome.into_reply());
        ctx.history.append(reply.clone());
        ctx.stream_pending = false;
        self.persist(ctx);
        reply
    }

    /// Full submit cycle: record, stream into `sink`, record the reply.
    pub async fn submit(
        &self,
        ctx: &mut SessionContext,
        text: &str,
        sink: &mut impl FragmentSink,
    ) -> Result<ChatMessage, TurnError> {
        let turn = self.start_turn(ctx, text)?;
        let outcome = self.stream_turn(turn, sink).await;
        Ok(self.finish_turn(ctx, outcome))
    }

    /// Selects the model for subsequent turns. History is untouched.
    pub fn change_model(&self, ctx: &mut SessionContext, model: ModelOption) {
        if ctx.selected_model != model {
            tracing::info!(from = %ctx.selected_model, to = %model, "model changed");
            ctx.selected_model = model;
        }
    }

    /// Empties the conversation, drops pending downloads and removes the
    /// stored record. Returns whether the record removal succeeded.
    /// Refused while a response is streaming.
    pub fn clear(&self, ctx: &mut SessionContext) -> Result<bool, TurnError> {
        if ctx.stream_pending {
            return Err(TurnError::StreamPending);
        }
        ctx.history.clear();
        ctx.download = None;
        ctx.export_text = None;
        ctx.conversation_loaded = false;
        ctx.restored_count = None;
        Ok(self.store.cleanup(ctx.session_id.as_str()))
    }

    /// Replaces the history with an uploaded export document. A rejected
    /// document, or one arriving while a response streams, leaves the
    /// session as it was.
    pub fn import(&self, ctx: &mut SessionContext, bytes: &[u8]) -> Result<String, AppError> {
        if ctx.stream_pending {
            return Err(TurnError::StreamPending.into());
        }
        let imported = ChatHistory::from_export_document(bytes)?;
        let summary = imported.summary();
        ctx.history.replace(imported.messages);
        ctx.conversation_loaded = true;
        if ctx.history.is_empty() {
            // An empty save is skipped, so the old record must go explicitly
            self.store.cleanup(ctx.session_id.as_str());
        } else {
            self.persist(ctx);
        }
        tracing::info!(session_id = %ctx.session_id, messages = ctx.history.len(), "conversation imported");
        Ok(summary)
    }

    /// JSON export of the conversation, kept as the session's pending
    /// download. `None` when there is nothing to export.
    pub fn export(&self, ctx: &mut SessionContext) -> Option<ExportArtifact> {
        let document = ctx
            .history
            .to_export_document(ctx.selected_model.label(), timestamps::local_now())?;
        let artifact = ExportArtifact {
            file_name: document.file_name(),
            contents: document.to_json(),
        };
        ctx.download = Some(artifact.clone());
        Some(artifact)
    }

    /// Plain-text transcript of the conversation.
    pub fn export_text(&self, ctx: &mut SessionContext) -> Option<ExportArtifact> {
        let now = timestamps::local_now();
        let contents = ctx
            .history
            .to_display_text(ctx.selected_model.label(), now)?;
        let artifact = ExportArtifact {
            file_name: format!("chat_history_{}.txt", timestamps::export_stamp(now)),
            contents,
        };
        ctx.export_text = Some(artifact.clone());
        Some(artifact)
    }

    /// True once after a successful import.
    pub fn take_loaded_notice(ctx: &mut SessionContext) -> bool {
        std::mem::take(&mut ctx.conversation_loaded)
    }

    /// Message count once after a restore from the store.
    pub fn take_restored_notice(ctx: &mut SessionContext) -> Option<usize> {
        ctx.restored_count.take()
    }

    fn persist(&self, ctx: &mut SessionContext) -> bool {
        let record = SessionRecord::snapshot(&ctx.session_id, ctx.history.messages());
        self.store.save(&record, &mut ctx.diagnostics)
    }
}
