//! Error kinds for PairD.
//!
//! Only [`ConfigurationError`] is fatal. The others are caught where they
//! happen and turned into diagnostics or user-visible text; front-ends
//! decide which case they are in through [`AppError::is_fatal`].

use thiserror::Error;

/// Failure while saving, loading or removing the ephemeral session record.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("{0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

/// Failure talking to the completion service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    #[error("{0}")]
    Request(String),

    #[error("Error code: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("{0}")]
    Stream(String),
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        CompletionError::Request(err.to_string())
    }
}

/// Reasons an uploaded export document is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportValidationError {
    #[error("❌ File is not valid UTF-8 text")]
    NotUtf8,

    #[error("❌ Invalid JSON file")]
    InvalidJson,

    #[error("❌ Invalid chat history file format: no \"messages\" field")]
    MissingMessages,

    #[error("❌ Invalid chat history file format: \"messages\" is not a list")]
    MessagesNotSequence,

    #[error("❌ Invalid chat history file format: message {index} {reason}")]
    InvalidMessage { index: usize, reason: String },
}

/// Missing credential or a client that could not be built.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("🔑 Azure API Key not found! Please set the AZURE_API_KEY environment variable.")]
    MissingApiKey,

    #[error("Azure endpoint not configured. Please set the AZURE_ENDPOINT environment variable.")]
    MissingEndpoint,

    #[error("❌ Failed to initialize OpenAI client: {0}")]
    ClientInit(String),
}

/// A user action the session cannot take in its current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnError {
    #[error("message is empty")]
    EmptyInput,

    #[error("⏳ Please wait for the current response to finish")]
    StreamPending,
}

/// Tagged union over every error kind, for callers that branch on kind.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    ImportValidation(#[from] ImportValidationError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Turn(#[from] TurnError),
}

impl AppError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Configuration(_))
    }
}
