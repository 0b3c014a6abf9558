#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;

use async_trait::async_trait;
use futures::stream::TryStreamExt;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tokio_util::io::StreamReader;

use super::FunctionsClient;
use crate::domain::models::ChatRequest;
use crate::domain::models::ChatService;
use crate::domain::models::Event;
use crate::domain::models::ServiceError;
use crate::domain::models::ServiceName;

fn convert_err(err: reqwest::Error) -> std::io::Error {
    let err_msg = err.to_string();
    return std::io::Error::new(std::io::ErrorKind::Interrupted, err_msg);
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ReplyResponse {
    reply: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ChunkResponse {
    text: String,
}

/// The `chat` function. It answers either with a single JSON `{reply}` or
/// with an event stream of `data: {"text": ...}` lines ending in
/// `data: [DONE]`.
#[derive(Default)]
pub struct FunctionsChat {
    client: FunctionsClient,
}

impl FunctionsChat {
    pub fn new(client: FunctionsClient) -> FunctionsChat {
        return FunctionsChat { client };
    }
}

#[async_trait]
impl ChatService for FunctionsChat {
    #[allow(clippy::implicit_return)]
    async fn get_reply<'a>(
        &self,
        request: ChatRequest,
        tx: &'a mpsc::UnboundedSender<Event>,
    ) -> Result<String, ServiceError> {
        let res = self.client.post(ServiceName::Chat, &request).await?;

        let is_stream = res
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|e| return e.to_str().ok())
            .map(|e| return e.contains("text/event-stream"))
            .unwrap_or(false);

        if !is_stream {
            let body = res
                .json::<ReplyResponse>()
                .await
                .map_err(|err| return ServiceError::failed(ServiceName::Chat, err))?;
            return Ok(body.reply);
        }

        let stream = res.bytes_stream().map_err(convert_err);
        let mut lines_reader = StreamReader::new(stream).lines();

        let mut reply = "".to_string();
        let mut done = false;
        loop {
            let line = match lines_reader.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(err) => {
                    tracing::error!(error = ?err, "Chat stream was interrupted");
                    return Err(ServiceError::failed(ServiceName::Chat, err));
                }
            };

            let mut cleaned_line = line.trim().to_string();
            if cleaned_line.starts_with("data:") {
                cleaned_line = cleaned_line.split_off(5).trim().to_string();
            }
            if cleaned_line.is_empty() {
                continue;
            }
            if cleaned_line == "[DONE]" {
                done = true;
                break;
            }

            let chunk = match serde_json::from_str::<ChunkResponse>(&cleaned_line) {
                Ok(chunk) => chunk,
                Err(err) => {
                    tracing::warn!(error = ?err, line = cleaned_line, "Skipping malformed chat chunk");
                    continue;
                }
            };

            reply += &chunk.text;
            if tx.send(Event::ReplyChunk(chunk.text)).is_err() {
                tracing::debug!("Event receiver dropped");
            }
        }

        if !done {
            tracing::error!(received = reply.len(), "Chat stream ended before [DONE]");
            return Err(ServiceError::failed(
                ServiceName::Chat,
                "stream ended before [DONE]",
            ));
        }

        return Ok(reply);
    }
}
