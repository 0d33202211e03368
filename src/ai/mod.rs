//! Completion client adapter for PairD
//!
//! Wraps the hosted chat-completions service behind a channel: a spawned
//! producer pushes response fragments, and the caller consumes them as a
//! [`FragmentStream`] in arrival order.
//!
//! # Architecture
//!
//! - `client` - request building, the fragment channel and the backend trait
//! - `prompts` - the system instruction template
//! - `providers` - the Azure OpenAI streaming backend
//!
//! # Usage
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use paird::ai::{CompletionClient, CompletionRequest};
//! use paird::config::Settings;
//! use paird::types::{ChatMessage, ModelOption};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = CompletionClient::from_settings(&Settings::from_env()?)?;
//! let history = vec![ChatMessage::user("Hello!")];
//! let request = CompletionRequest::new(&history, ModelOption::Gpt4o, paird::timestamps::local_now());
//! let mut fragments = client.open_stream(request);
//! while let Some(piece) = fragments.next().await {
//!     print!("{}", piece?);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
pub mod prompts;
pub mod providers;

// Re-export main types
pub use client::{
    CompletionBackend, CompletionClient, CompletionRequest, CompletionResult, FragmentStream,
    RequestMessage, StreamHandle,
};
