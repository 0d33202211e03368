//! Integration tests for the conversation controller
//!
//! Drives full turns against a scripted completion backend and a store in a
//! temporary directory.

use async_trait::async_trait;
use paird::ai::{
    CompletionBackend, CompletionClient, CompletionRequest, CompletionResult, StreamHandle,
};
use paird::controller::{ConversationController, TurnError};
use paird::error::{AppError, CompletionError, ImportValidationError};
use paird::session::{SessionContext, SessionId};
use paird::store::EphemeralStore;
use paird::types::{ChatMessage, ModelOption, Role};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

struct Scripted {
    pieces: Vec<&'static str>,
    failure: Option<&'static str>,
    seen_models: Mutex<Vec<ModelOption>>,
}

impl Scripted {
    fn replying(pieces: Vec<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            pieces,
            failure: None,
            seen_models: Mutex::new(Vec::new()),
        })
    }

    fn failing_after(pieces: Vec<&'static str>, failure: &'static str) -> Arc<Self> {
        Arc::new(Self {
            pieces,
            failure: Some(failure),
            seen_models: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl CompletionBackend for Scripted {
    async fn stream(&self, request: &CompletionRequest, handle: StreamHandle) -> CompletionResult<()> {
        self.seen_models.lock().unwrap().push(request.model);
        for piece in &self.pieces {
            handle.append(piece).await;
        }
        match self.failure {
            Some(err) => Err(CompletionError::Stream(err.to_string())),
            None => Ok(()),
        }
    }
}

fn controller_with(dir: &TempDir, backend: Arc<Scripted>) -> ConversationController {
    ConversationController::new(
        EphemeralStore::new(dir.path()),
        CompletionClient::new(backend),
        ModelOption::Gpt4o,
    )
}

fn stored_messages(controller: &ConversationController, ctx: &mut SessionContext) -> Vec<ChatMessage> {
    controller
        .store()
        .load(ctx.session_id.as_str(), &mut ctx.diagnostics)
        .0
}

mod submit_tests {
    use super::*;

    #[tokio::test]
    async fn test_streamed_reply_is_recorded_and_persisted() {
        let dir = TempDir::new().unwrap();
        let controller = controller_with(&dir, Scripted::replying(vec!["Hi", " there!"]));
        let mut ctx = controller.open_session(SessionId::from_raw("stream-ok"));

        let mut seen = Vec::new();
        let mut sink = |piece: &str| seen.push(piece.to_string());
        let reply = controller.submit(&mut ctx, "Hello", &mut sink).await.unwrap();

        assert_eq!(seen, vec!["Hi".to_string(), " there!".to_string()]);
        assert_eq!(reply, ChatMessage::assistant("Hi there!"));
        assert_eq!(
            ctx.history.messages(),
            &[ChatMessage::user("Hello"), ChatMessage::assistant("Hi there!")]
        );
        assert!(!ctx.is_awaiting_completion());
        assert_eq!(stored_messages(&controller, &mut ctx), ctx.history.messages());
        assert!(ctx.diagnostics.last_save_time.is_some());
        assert!(ctx.diagnostics.save_error.is_none());
    }

    #[tokio::test]
    async fn test_mid_stream_failure_becomes_reply_text() {
        let dir = TempDir::new().unwrap();
        let controller =
            controller_with(&dir, Scripted::failing_after(vec!["Partial"], "connection reset"));
        let mut ctx = controller.open_session(SessionId::from_raw("stream-fail"));

        let mut sink = |_: &str| {};
        let reply = controller.submit(&mut ctx, "Hello", &mut sink).await.unwrap();

        assert_eq!(reply.role, Role::Assistant);
        assert!(reply.content.starts_with("Partial"));
        assert!(reply.content.contains("Error generating response"));
        assert!(reply.content.contains("connection reset"));
        assert_eq!(ctx.history.len(), 2);
        assert!(!ctx.is_awaiting_completion());
    }

    #[tokio::test]
    async fn test_blank_input_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let controller = controller_with(&dir, Scripted::replying(vec!["unused"]));
        let mut ctx = controller.open_session(SessionId::from_raw("blank"));

        let mut sink = |_: &str| {};
        let result = controller.submit(&mut ctx, "   \n", &mut sink).await;

        assert_eq!(result, Err(TurnError::EmptyInput));
        assert!(ctx.history.is_empty());
        assert!(!controller.store().record_path("blank").exists());
    }

    #[tokio::test]
    async fn test_second_submit_is_refused_while_streaming() {
        let dir = TempDir::new().unwrap();
        let controller = controller_with(&dir, Scripted::replying(vec!["ok"]));
        let mut ctx = controller.open_session(SessionId::from_raw("busy"));

        let turn = controller.start_turn(&mut ctx, "first").unwrap();
        assert!(ctx.is_awaiting_completion());
        assert_eq!(
            controller.start_turn(&mut ctx, "second").err(),
            Some(TurnError::StreamPending)
        );

        let mut sink = |_: &str| {};
        let outcome = controller.stream_turn(turn, &mut sink).await;
        controller.finish_turn(&mut ctx, outcome);
        assert_eq!(ctx.history.len(), 2);
        assert!(controller.start_turn(&mut ctx, "third").is_ok());
    }

    #[tokio::test]
    async fn test_clear_and_import_wait_for_the_stream() {
        let dir = TempDir::new().unwrap();
        let controller = controller_with(&dir, Scripted::replying(vec!["late reply"]));
        let id = SessionId::from_raw("mid-stream");
        let mut ctx = controller.open_session(id.clone());

        let turn = controller.start_turn(&mut ctx, "Hello").unwrap();
        assert_eq!(controller.clear(&mut ctx), Err(TurnError::StreamPending));
        let export = br#"{"messages": [{"role": "user", "content": "other"}]}"#;
        assert!(matches!(
            controller.import(&mut ctx, export),
            Err(AppError::Turn(TurnError::StreamPending))
        ));
        assert_eq!(ctx.history.messages(), &[ChatMessage::user("Hello")]);

        let mut sink = |_: &str| {};
        let outcome = controller.stream_turn(turn, &mut sink).await;
        controller.finish_turn(&mut ctx, outcome);
        let expected = vec![ChatMessage::user("Hello"), ChatMessage::assistant("late reply")];
        assert_eq!(ctx.history.messages(), expected.as_slice());

        assert_eq!(controller.clear(&mut ctx), Ok(true));
        let reopened = controller.open_session(id);
        assert!(reopened.history.is_empty());
    }

    #[tokio::test]
    async fn test_user_message_is_saved_before_reply() {
        let dir = TempDir::new().unwrap();
        let controller = controller_with(&dir, Scripted::replying(vec!["later"]));
        let mut ctx = controller.open_session(SessionId::from_raw("early-save"));

        let _turn = controller.start_turn(&mut ctx, "Hello").unwrap();
        assert_eq!(stored_messages(&controller, &mut ctx), vec![ChatMessage::user("Hello")]);
    }

    #[tokio::test]
    async fn test_model_change_applies_to_next_turn() {
        let dir = TempDir::new().unwrap();
        let backend = Scripted::replying(vec!["ok"]);
        let controller = controller_with(&dir, backend.clone());
        let mut ctx = controller.open_session(SessionId::from_raw("models"));
        let mut sink = |_: &str| {};

        controller.submit(&mut ctx, "one", &mut sink).await.unwrap();
        controller.change_model(&mut ctx, ModelOption::O4Mini);
        controller.submit(&mut ctx, "two", &mut sink).await.unwrap();

        assert_eq!(
            *backend.seen_models.lock().unwrap(),
            vec![ModelOption::Gpt4o, ModelOption::O4Mini]
        );
        assert_eq!(ctx.history.len(), 4);
    }
}

mod session_tests {
    use super::*;

    #[tokio::test]
    async fn test_reopened_session_restores_history() {
        let dir = TempDir::new().unwrap();
        let controller = controller_with(&dir, Scripted::replying(vec!["Hi"]));
        let id = SessionId::from_raw("restore");

        let mut first = controller.open_session(id.clone());
        let mut sink = |_: &str| {};
        controller.submit(&mut first, "Hello", &mut sink).await.unwrap();

        let mut second = controller.open_session(id);
        assert_eq!(second.history.messages(), first.history.messages());
        assert_eq!(ConversationController::take_restored_notice(&mut second), Some(2));
        assert_eq!(ConversationController::take_restored_notice(&mut second), None);
    }

    #[tokio::test]
    async fn test_clear_empties_history_and_store() {
        let dir = TempDir::new().unwrap();
        let controller = controller_with(&dir, Scripted::replying(vec!["Hi"]));
        let id = SessionId::from_raw("clear");
        let mut ctx = controller.open_session(id.clone());
        let mut sink = |_: &str| {};
        controller.submit(&mut ctx, "Hello", &mut sink).await.unwrap();
        controller.export(&mut ctx).unwrap();

        assert_eq!(controller.clear(&mut ctx), Ok(true));
        assert!(ctx.history.is_empty());
        assert!(ctx.download.is_none());
        assert!(!controller.store().record_path(id.as_str()).exists());

        let reopened = controller.open_session(id);
        assert!(reopened.history.is_empty());
        assert_eq!(controller.clear(&mut ctx), Ok(true));
    }
}

mod export_import_tests {
    use super::*;

    #[tokio::test]
    async fn test_export_then_import_restores_conversation() {
        let dir = TempDir::new().unwrap();
        let controller = controller_with(&dir, Scripted::replying(vec!["4"]));
        let mut source = controller.open_session(SessionId::from_raw("export-src"));
        let mut sink = |_: &str| {};
        controller.submit(&mut source, "2+2?", &mut sink).await.unwrap();

        let artifact = controller.export(&mut source).unwrap();
        assert!(artifact.file_name.starts_with("chat_history_"));
        assert!(artifact.file_name.ends_with(".json"));
        assert_eq!(source.download.as_ref(), Some(&artifact));

        let mut target = controller.open_session(SessionId::from_raw("export-dst"));
        let summary = controller
            .import(&mut target, artifact.contents.as_bytes())
            .unwrap();
        assert!(summary.starts_with("✅ Loaded 2 messages from "));
        assert_eq!(target.history.messages(), source.history.messages());
        assert!(ConversationController::take_loaded_notice(&mut target));
        assert!(!ConversationController::take_loaded_notice(&mut target));
        assert_eq!(stored_messages(&controller, &mut target).len(), 2);
    }

    #[tokio::test]
    async fn test_rejected_import_keeps_history() {
        let dir = TempDir::new().unwrap();
        let controller = controller_with(&dir, Scripted::replying(vec!["Hi"]));
        let mut ctx = controller.open_session(SessionId::from_raw("bad-import"));
        let mut sink = |_: &str| {};
        controller.submit(&mut ctx, "Hello", &mut sink).await.unwrap();

        let err = controller.import(&mut ctx, b"{\"foo\": 1}").unwrap_err();
        assert!(err.to_string().starts_with("❌"));
        assert_eq!(ctx.history.len(), 2);
        assert!(!ConversationController::take_loaded_notice(&mut ctx));
    }

    #[tokio::test]
    async fn test_non_list_messages_keeps_history() {
        let dir = TempDir::new().unwrap();
        let controller = controller_with(&dir, Scripted::replying(vec!["Hi"]));
        let mut ctx = controller.open_session(SessionId::from_raw("not-a-list"));
        let mut sink = |_: &str| {};
        controller.submit(&mut ctx, "Hello", &mut sink).await.unwrap();
        let before = ctx.history.clone();

        let err = controller
            .import(&mut ctx, br#"{"messages": "hi"}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::ImportValidation(ImportValidationError::MessagesNotSequence)
        ));
        assert_eq!(ctx.history.messages(), before.messages());
        assert_eq!(stored_messages(&controller, &mut ctx), before.messages());
        assert!(!ConversationController::take_loaded_notice(&mut ctx));
    }

    #[tokio::test]
    async fn test_empty_import_removes_stored_record() {
        let dir = TempDir::new().unwrap();
        let controller = controller_with(&dir, Scripted::replying(vec!["Hi"]));
        let id = SessionId::from_raw("empty-import");
        let mut ctx = controller.open_session(id.clone());
        let mut sink = |_: &str| {};
        controller.submit(&mut ctx, "old", &mut sink).await.unwrap();

        let summary = controller.import(&mut ctx, br#"{"messages": []}"#).unwrap();
        assert_eq!(summary, "✅ Loaded 0 messages from Unknown date");
        assert!(ctx.history.is_empty());
        assert!(!controller.store().record_path(id.as_str()).exists());

        let reopened = controller.open_session(id);
        assert!(reopened.history.is_empty());
    }

    #[test]
    fn test_empty_history_has_nothing_to_export() {
        let dir = TempDir::new().unwrap();
        let controller = controller_with(&dir, Scripted::replying(vec![]));
        let mut ctx = controller.open_session(SessionId::from_raw("empty-export"));

        assert!(controller.export(&mut ctx).is_none());
        assert!(controller.export_text(&mut ctx).is_none());
        assert!(ctx.download.is_none());
    }

    #[tokio::test]
    async fn test_text_export_lists_every_message() {
        let dir = TempDir::new().unwrap();
        let controller = controller_with(&dir, Scripted::replying(vec!["Hi there!"]));
        let mut ctx = controller.open_session(SessionId::from_raw("text-export"));
        let mut sink = |_: &str| {};
        controller.submit(&mut ctx, "Hello", &mut sink).await.unwrap();

        let artifact = controller.export_text(&mut ctx).unwrap();
        assert!(artifact.file_name.ends_with(".txt"));
        assert!(artifact.contents.contains("[1] You:\nHello"));
        assert!(artifact.contents.contains("[2] AI Assistant:\nHi there!"));
    }
}
