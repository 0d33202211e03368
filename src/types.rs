use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Label used in plain-text transcripts.
    pub fn transcript_label(self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant => "AI Assistant",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The fixed set of selectable deployments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ModelOption {
    #[default]
    Gpt4o,
    Gpt41,
    Gpt35,
    O4Mini,
}

impl ModelOption {
    pub const ALL: [ModelOption; 4] = [
        ModelOption::Gpt4o,
        ModelOption::Gpt41,
        ModelOption::Gpt35,
        ModelOption::O4Mini,
    ];

    /// Human-readable name shown in the selector and written into exports.
    pub fn label(self) -> &'static str {
        match self {
            ModelOption::Gpt4o => "GPT 4o",
            ModelOption::Gpt41 => "GPT 4.1",
            ModelOption::Gpt35 => "GPT 3.5",
            ModelOption::O4Mini => "o4 mini",
        }
    }

    /// Deployment name on the completion service.
    pub fn deployment(self) -> &'static str {
        match self {
            ModelOption::Gpt4o => "gpt-4o",
            ModelOption::Gpt41 => "gpt-4.1",
            ModelOption::Gpt35 => "gpt-35-turbo",
            ModelOption::O4Mini => "o4-mini",
        }
    }

    /// Looks a model up by label, case-insensitively.
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim();
        Self::ALL
            .into_iter()
            .find(|model| model.label().eq_ignore_ascii_case(wanted))
    }
}

impl fmt::Display for ModelOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
