pub mod azure;

use super::client::CompletionClient;
use crate::config::Settings;
use crate::error::ConfigurationError;
use std::sync::Arc;

pub use azure::AzureOpenAIBackend;

impl CompletionClient {
    /// Builds the client for the configured Azure OpenAI resource.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigurationError> {
        let backend = AzureOpenAIBackend::from_settings(settings)?;
        Ok(Self::new(Arc::new(backend)))
    }
}
