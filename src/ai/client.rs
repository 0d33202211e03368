use super::prompts;
use crate::error::CompletionError;
use crate::types::{ChatMessage, ModelOption};
use async_trait::async_trait;
use futures::Stream;
use serde::Serialize;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use time::OffsetDateTime;
use tokio::sync::mpsc;

pub type CompletionResult<T> = Result<T, CompletionError>;

/// Fragments buffered between the producer task and the display.
const FRAGMENT_BUFFER: usize = 64;

// ============================================
// Request
// ============================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RequestMessage {
    pub role: &'static str,
    pub content: String,
}

/// One streaming completion: the deployment plus the full message list,
/// system instruction first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: ModelOption,
    pub messages: Vec<RequestMessage>,
}

impl CompletionRequest {
    pub fn new(history: &[ChatMessage], model: ModelOption, now: OffsetDateTime) -> Self {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(RequestMessage {
            role: "system",
            content: prompts::system_prompt(model, now),
        });
        messages.extend(history.iter().map(|msg| RequestMessage {
            role: msg.role.as_str(),
            content: msg.content.clone(),
        }));
        Self { model, messages }
    }
}

// ============================================
// Streaming channel
// ============================================

enum StreamEvent {
    Fragment(String),
    Failed(CompletionError),
}

/// Producer side of a [`FragmentStream`].
#[derive(Clone)]
pub struct StreamHandle {
    tx: mpsc::Sender<StreamEvent>,
}

impl StreamHandle {
    /// Sends one fragment. Returns `false` once the consumer has gone away.
    pub async fn append(&self, piece: &str) -> bool {
        if piece.is_empty() {
            return true;
        }
        self.tx
            .send(StreamEvent::Fragment(piece.to_string()))
            .await
            .is_ok()
    }

    /// Ends the stream with an error item.
    pub async fn fail(&self, err: CompletionError) {
        let _ = self.tx.send(StreamEvent::Failed(err)).await;
    }
}

/// Lazily produced, finite, single-use sequence of response fragments in
/// arrival order. Ends after the last fragment or after one error item.
pub struct FragmentStream {
    rx: mpsc::Receiver<StreamEvent>,
    failed: bool,
}

impl FragmentStream {
    pub fn channel() -> (StreamHandle, FragmentStream) {
        let (tx, rx) = mpsc::channel(FRAGMENT_BUFFER);
        (StreamHandle { tx }, FragmentStream { rx, failed: false })
    }
}

impl Stream for FragmentStream {
    type Item = CompletionResult<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.failed {
            return Poll::Ready(None);
        }
        match this.rx.poll_recv(cx) {
            Poll::Ready(Some(StreamEvent::Fragment(piece))) => Poll::Ready(Some(Ok(piece))),
            Poll::Ready(Some(StreamEvent::Failed(err))) => {
                this.failed = true;
                this.rx.close();
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

// ============================================
// Backends
// ============================================

/// A completion service that can push response fragments into a handle.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Streams the response for `request` into `handle`, returning once the
    /// service signals the end of the response.
    async fn stream(&self, request: &CompletionRequest, handle: StreamHandle)
    -> CompletionResult<()>;
}

/// Completion client adapter used by the conversation controller.
#[derive(Clone)]
pub struct CompletionClient {
    backend: Arc<dyn CompletionBackend>,
}

impl CompletionClient {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    /// Spawns the request on the runtime and hands back the consumer end.
    /// Any failure surfaces as the final item of the stream.
    pub fn open_stream(&self, request: CompletionRequest) -> FragmentStream {
        let (handle, stream) = FragmentStream::channel();
        let backend = Arc::clone(&self.backend);

        tokio::spawn(async move {
            tracing::debug!(
                model = request.model.deployment(),
                messages = request.messages.len(),
                "opening completion stream"
            );
            if let Err(err) = backend.stream(&request, handle.clone()).await {
                tracing::warn!(error = %err, "completion stream failed");
                handle.fail(err).await;
            }
        });

        stream
    }
}
