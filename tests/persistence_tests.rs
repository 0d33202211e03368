//! Integration tests for the ephemeral store and export documents

use paird::history::ChatHistory;
use paird::session::{SessionId, StoreDiagnostics};
use paird::store::{EphemeralStore, SessionRecord};
use paird::types::{ChatMessage, Role};
use tempfile::TempDir;

fn conversation() -> Vec<ChatMessage> {
    vec![
        ChatMessage::user("Hello"),
        ChatMessage::assistant("Hi there!"),
        ChatMessage::user("Ünïcödé 👋"),
    ]
}

mod store_tests {
    use super::*;

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = EphemeralStore::new(dir.path());
        let id = SessionId::from_raw("paird_chat_1");
        let mut diagnostics = StoreDiagnostics::default();

        let record = SessionRecord::snapshot(&id, &conversation());
        assert!(store.save(&record, &mut diagnostics));
        assert!(diagnostics.save_file_path.is_some());

        let (messages, count) = store.load(id.as_str(), &mut diagnostics);
        assert_eq!(count, 3);
        assert_eq!(messages, conversation());
        assert!(diagnostics.load_error.is_none());
    }

    #[test]
    fn test_empty_save_keeps_previous_record() {
        let dir = TempDir::new().unwrap();
        let store = EphemeralStore::new(dir.path());
        let id = SessionId::from_raw("paird_chat_2");
        let mut diagnostics = StoreDiagnostics::default();

        store.save(&SessionRecord::snapshot(&id, &conversation()), &mut diagnostics);
        assert!(store.save(&SessionRecord::snapshot(&id, &[]), &mut diagnostics));

        let (messages, _) = store.load(id.as_str(), &mut diagnostics);
        assert_eq!(messages, conversation());
    }

    #[test]
    fn test_missing_record_loads_empty_without_error() {
        let dir = TempDir::new().unwrap();
        let store = EphemeralStore::new(dir.path().join("not-created-yet"));
        let mut diagnostics = StoreDiagnostics::default();

        let (messages, count) = store.load("paird_chat_3", &mut diagnostics);
        assert!(messages.is_empty());
        assert_eq!(count, 0);
        assert!(diagnostics.load_error.is_none());
    }

    #[test]
    fn test_cleanup_removes_record() {
        let dir = TempDir::new().unwrap();
        let store = EphemeralStore::new(dir.path());
        let id = SessionId::from_raw("paird_chat_4");
        let mut diagnostics = StoreDiagnostics::default();

        store.save(&SessionRecord::snapshot(&id, &conversation()), &mut diagnostics);
        assert!(store.record_path(id.as_str()).exists());
        assert!(store.cleanup(id.as_str()));
        assert!(!store.record_path(id.as_str()).exists());
        assert!(store.cleanup(id.as_str()));

        let (messages, _) = store.load(id.as_str(), &mut diagnostics);
        assert!(messages.is_empty());
    }

    #[test]
    fn test_sessions_do_not_share_records() {
        let dir = TempDir::new().unwrap();
        let store = EphemeralStore::new(dir.path());
        let mut diagnostics = StoreDiagnostics::default();
        let a = SessionId::from_raw("paird_chat_5");
        let b = SessionId::from_raw("paird_chat_6");

        store.save(&SessionRecord::snapshot(&a, &conversation()), &mut diagnostics);
        let (messages, _) = store.load(b.as_str(), &mut diagnostics);
        assert!(messages.is_empty());
    }
}

mod document_tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_export_document_imports_back() {
        let history = ChatHistory::from_messages(conversation());
        let document = history
            .to_export_document("GPT 4o", datetime!(2025-03-04 05:06:07 UTC))
            .unwrap();

        let imported = ChatHistory::from_export_document(document.to_json().as_bytes()).unwrap();
        assert_eq!(imported.messages, conversation());
        assert_eq!(imported.exported_at.as_deref(), Some("20250304_050607"));
    }

    #[test]
    fn test_import_ignores_unknown_fields() {
        let json = r#"{
            "timestamp": "20250101_120000",
            "app": "something else",
            "messages": [
                {"role": "user", "content": "Hello", "id": 7},
                {"role": "assistant", "content": "Hi", "tokens": 2}
            ]
        }"#;

        let imported = ChatHistory::from_export_document(json.as_bytes()).unwrap();
        assert_eq!(imported.messages.len(), 2);
        assert_eq!(imported.messages[0].role, Role::User);
        assert_eq!(imported.messages[1].content, "Hi");
        assert_eq!(imported.summary(), "✅ Loaded 2 messages from 20250101_120000");
    }
}
