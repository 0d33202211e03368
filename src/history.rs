//! The in-memory conversation and its portable forms: the JSON export
//! document and the plain-text transcript.

use crate::error::ImportValidationError;
use crate::timestamps;
use crate::types::ChatMessage;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

const TRANSCRIPT_RULE_WIDTH: usize = 50;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
}

/// Snapshot written by "download" and accepted by "upload".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatExportDocument {
    pub timestamp: String,
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub total_messages: usize,
}

impl ChatExportDocument {
    pub fn file_name(&self) -> String {
        format!("chat_history_{}.json", self.timestamp)
    }

    /// Two-space indented JSON; non-ASCII text is written as-is.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Result of a successful upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportedHistory {
    pub messages: Vec<ChatMessage>,
    pub exported_at: Option<String>,
}

impl ImportedHistory {
    pub fn summary(&self) -> String {
        format!(
            "✅ Loaded {} messages from {}",
            self.messages.len(),
            self.exported_at.as_deref().unwrap_or("Unknown date")
        )
    }
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }

    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Swaps in a whole new sequence, as done by restore and import.
    pub fn replace(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Labelled transcript, or `None` for an empty conversation.
    pub fn to_display_text(&self, model_label: &str, now: OffsetDateTime) -> Option<String> {
        if self.messages.is_empty() {
            return None;
        }

        let mut text = String::from("Chat History Export\n");
        text.push_str(&format!(
            "Exported on: {}\n",
            timestamps::transcript_stamp(now)
        ));
        text.push_str(&format!("Model: {model_label}\n"));
        text.push_str(&format!("Total Messages: {}\n", self.messages.len()));
        text.push_str(&"=".repeat(TRANSCRIPT_RULE_WIDTH));
        text.push_str("\n\n");

        for (i, message) in self.messages.iter().enumerate() {
            text.push_str(&format!(
                "[{}] {}:\n{}\n\n",
                i + 1,
                message.role.transcript_label(),
                message.content
            ));
        }

        Some(text)
    }

    pub fn to_export_document(
        &self,
        model_label: &str,
        now: OffsetDateTime,
    ) -> Option<ChatExportDocument> {
        if self.messages.is_empty() {
            return None;
        }
        Some(ChatExportDocument {
            timestamp: timestamps::export_stamp(now),
            messages: self.messages.clone(),
            model: model_label.to_string(),
            total_messages: self.messages.len(),
        })
    }

    /// Validates an uploaded export document. Only `messages` is required;
    /// each entry needs `role` and `content`, and everything else is ignored.
    pub fn from_export_document(bytes: &[u8]) -> Result<ImportedHistory, ImportValidationError> {
        let text = std::str::from_utf8(bytes).map_err(|_| ImportValidationError::NotUtf8)?;
        let document: Value =
            serde_json::from_str(text).map_err(|_| ImportValidationError::InvalidJson)?;

        let entries = match document.get("messages") {
            None => return Err(ImportValidationError::MissingMessages),
            Some(Value::Array(entries)) => entries,
            Some(_) => return Err(ImportValidationError::MessagesNotSequence),
        };

        let messages = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                ChatMessage::deserialize(entry).map_err(|err| {
                    ImportValidationError::InvalidMessage {
                        index: index + 1,
                        reason: err.to_string(),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let exported_at = document
            .get("timestamp")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(ImportedHistory {
            messages,
            exported_at,
        })
    }
}
