use crate::ai::client::{
    CompletionBackend, CompletionRequest, CompletionResult, RequestMessage, StreamHandle,
};
use crate::config::Settings;
use crate::error::{CompletionError, ConfigurationError};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;

/// Azure OpenAI chat-completions deployment client.
pub struct AzureOpenAIBackend {
    client: Client,
    endpoint: String,
    api_key: String,
    api_version: String,
}

impl AzureOpenAIBackend {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Result<Self, ConfigurationError> {
        let client = Client::builder()
            .build()
            .map_err(|err| ConfigurationError::ClientInit(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            api_version: api_version.into(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigurationError> {
        Self::new(
            settings.endpoint.clone(),
            settings.api_key.clone(),
            settings.api_version.clone(),
        )
    }

    fn deployment_url(&self, deployment: &str) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            self.endpoint.trim_end_matches('/'),
            deployment
        )
    }
}

#[derive(serde::Serialize)]
struct ChatCompletionsRequest<'a> {
    messages: &'a [RequestMessage],
    stream: bool,
}

#[derive(Deserialize)]
pub struct OAIDelta {
    pub content: Option<String>,
}

#[derive(Deserialize)]
pub struct OAIChoice {
    #[serde(default)]
    pub delta: Option<OAIDelta>,
}

#[derive(Deserialize)]
pub struct OAIChunk {
    #[serde(default)]
    pub choices: Vec<OAIChoice>,
}

/// Parses one SSE `data:` payload into `(fragment, done)`.
///
/// Chunks without choices (content-filter preambles) yield an empty
/// fragment; payloads that are not chat chunks yield `None`.
pub fn parse_sse_data(data: &str) -> Option<(String, bool)> {
    let trimmed = data.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed == "[DONE]" {
        return Some((String::new(), true));
    }

    let parsed = serde_json::from_str::<OAIChunk>(trimmed).ok()?;
    let piece = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta)
        .and_then(|delta| delta.content)
        .unwrap_or_default();
    Some((piece, false))
}

/// Splits a byte stream into SSE events and collects their `data:` lines.
///
/// Bytes are buffered until a full line is available so multi-byte
/// characters split across network chunks decode intact.
#[derive(Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data: Option<String>,
}

impl SseDecoder {
    /// Feeds a chunk and returns the payloads of every event it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&raw[..pos]);
            let line = text.strip_suffix('\r').unwrap_or(&text);

            if line.is_empty() {
                if let Some(data) = self.data.take() {
                    events.push(data);
                }
                continue;
            }

            if let Some(rest) = line.strip_prefix("data:") {
                let fragment = rest.trim_start();
                match &mut self.data {
                    Some(existing) => {
                        existing.push('\n');
                        existing.push_str(fragment);
                    }
                    None => self.data = Some(fragment.to_string()),
                }
            }
        }
        events
    }

    /// Payload of a trailing event that was never terminated by a blank line.
    pub fn finish(&mut self) -> Option<String> {
        self.data.take()
    }
}

#[async_trait]
impl CompletionBackend for AzureOpenAIBackend {
    async fn stream(
        &self,
        request: &CompletionRequest,
        handle: StreamHandle,
    ) -> CompletionResult<()> {
        let response = self
            .client
            .post(self.deployment_url(request.model.deployment()))
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", self.api_key.as_str())
            .header("accept", "text/event-stream")
            .json(&ChatCompletionsRequest {
                messages: &request.messages,
                stream: true,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let mut decoder = SseDecoder::default();
        let mut stream = response.bytes_stream();
        while let Some(item) = stream.next().await {
            let bytes = item.map_err(|err| CompletionError::Stream(err.to_string()))?;
            for data in decoder.push(&bytes) {
                if let Some((piece, done)) = parse_sse_data(&data) {
                    if !handle.append(&piece).await || done {
                        return Ok(());
                    }
                }
            }
        }

        if let Some((piece, _)) = decoder.finish().as_deref().and_then(parse_sse_data) {
            handle.append(&piece).await;
        }
        Ok(())
    }
}
