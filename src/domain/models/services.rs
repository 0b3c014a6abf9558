use async_trait::async_trait;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use tokio::sync::mpsc;

use super::Event;
use super::Message;
use super::ServiceError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ServiceName {
    Chat,
    Search,
    News,
    SpeechToText,
    TextToSpeech,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub conversation_history: Vec<Message>,
}

#[async_trait]
pub trait ChatService {
    /// Requests a reply for `request.message` given the prior history.
    /// Services that stream send each partial chunk through `tx` as an
    /// `Event::ReplyChunk`. The full reply is always returned.
    async fn get_reply<'a>(
        &self,
        request: ChatRequest,
        tx: &'a mpsc::UnboundedSender<Event>,
    ) -> Result<String, ServiceError>;
}

#[async_trait]
pub trait SearchService {
    async fn search(&self, query: &str) -> Result<String, ServiceError>;
}

#[async_trait]
pub trait NewsService {
    async fn headlines(&self, category: &str) -> Result<String, ServiceError>;
}

#[async_trait]
pub trait Transcriber {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, ServiceError>;
}

#[async_trait]
pub trait Synthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ServiceError>;
}

pub type ChatBox = Box<dyn ChatService + Send + Sync>;
pub type SearchBox = Box<dyn SearchService + Send + Sync>;
pub type NewsBox = Box<dyn NewsService + Send + Sync>;
pub type TranscriberBox = Box<dyn Transcriber + Send + Sync>;
pub type SynthesizerBox = Box<dyn Synthesizer + Send + Sync>;
