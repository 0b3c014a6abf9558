use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::Notify;

use super::store::MemoryStore;
use crate::domain::models::ChatRequest;
use crate::domain::models::ChatService;
use crate::domain::models::Event;
use crate::domain::models::Launcher;
use crate::domain::models::NewsService;
use crate::domain::models::PersistenceError;
use crate::domain::models::PlatformError;
use crate::domain::models::SearchService;
use crate::domain::models::ServiceError;
use crate::domain::models::ServiceName;
use crate::domain::models::SpeechCapture;
use crate::domain::models::SpeechOutput;
use crate::domain::models::Store;
use crate::domain::models::Synthesizer;
use crate::domain::models::Transcriber;

/// Memory store whose writes can be switched to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    pub fail_writes: AtomicBool,
    pub writes: AtomicUsize,
}

impl FlakyStore {
    pub fn failing(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl Store for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        return self.inner.get(key);
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::Write {
                key: key.to_string(),
                reason: "quota exceeded".to_string(),
            });
        }

        self.writes.fetch_add(1, Ordering::SeqCst);
        return self.inner.set(key, value);
    }
}

#[derive(Default)]
pub struct FakeChat {
    pub replies: Mutex<Vec<Result<String, ServiceError>>>,
    pub requests: Mutex<Vec<ChatRequest>>,
    pub calls: AtomicUsize,
    pub chunks: Vec<String>,
    pub gate: Option<Arc<Notify>>,
}

impl FakeChat {
    pub fn replying(replies: Vec<Result<String, ServiceError>>) -> FakeChat {
        return FakeChat {
            replies: Mutex::new(replies),
            ..FakeChat::default()
        };
    }
}

#[async_trait]
impl ChatService for Arc<FakeChat> {
    async fn get_reply<'a>(
        &self,
        request: ChatRequest,
        tx: &'a mpsc::UnboundedSender<Event>,
    ) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        for chunk in &self.chunks {
            tx.send(Event::ReplyChunk(chunk.to_string())).unwrap();
        }

        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Ok("Hello from the model".to_string());
        }
        return replies.remove(0);
    }
}

#[derive(Default)]
pub struct FakeKnowledge {
    pub queries: Mutex<Vec<String>>,
    pub fail: bool,
}

#[async_trait]
impl SearchService for Arc<FakeKnowledge> {
    async fn search(&self, query: &str) -> Result<String, ServiceError> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.fail {
            return Err(ServiceError::RateLimited(ServiceName::Search));
        }
        return Ok(format!("Results for {query}"));
    }
}

#[async_trait]
impl NewsService for Arc<FakeKnowledge> {
    async fn headlines(&self, category: &str) -> Result<String, ServiceError> {
        self.queries.lock().unwrap().push(category.to_string());
        if self.fail {
            return Err(ServiceError::RateLimited(ServiceName::News));
        }
        return Ok(format!("Top {category} headlines"));
    }
}

#[derive(Default)]
pub struct FakeLauncher {
    pub launched: Mutex<Vec<String>>,
    pub fail: bool,
}

impl Launcher for Arc<FakeLauncher> {
    fn launch(&self, url: &str) -> Result<(), PlatformError> {
        if self.fail {
            return Err(PlatformError::failed("launcher", "no opener"));
        }
        self.launched.lock().unwrap().push(url.to_string());
        return Ok(());
    }
}

#[derive(Default)]
pub struct FakeSpeech {
    pub available: bool,
    pub fail: bool,
    pub spoken: Mutex<Vec<String>>,
    pub transcript: String,
    pub captures: AtomicUsize,
}

impl FakeSpeech {
    pub fn working() -> FakeSpeech {
        return FakeSpeech {
            available: true,
            ..FakeSpeech::default()
        };
    }
}

#[async_trait]
impl SpeechOutput for Arc<FakeSpeech> {
    fn available(&self) -> bool {
        return self.available;
    }

    async fn speak(&self, text: &str) -> Result<(), PlatformError> {
        self.spoken.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(PlatformError::failed("speech output", "device lost"));
        }
        return Ok(());
    }
}

#[async_trait]
impl SpeechCapture for Arc<FakeSpeech> {
    fn available(&self) -> bool {
        return self.available;
    }

    async fn capture(&self) -> Result<String, PlatformError> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(PlatformError::PermissionDenied("microphone"));
        }
        return Ok(self.transcript.to_string());
    }
}

#[derive(Default)]
pub struct FakeAudio {
    pub received: Mutex<Vec<Vec<u8>>>,
}

#[async_trait]
impl Transcriber for Arc<FakeAudio> {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, ServiceError> {
        self.received.lock().unwrap().push(audio.to_vec());
        return Ok("open youtube".to_string());
    }
}

#[async_trait]
impl Synthesizer for Arc<FakeAudio> {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ServiceError> {
        return Ok(text.as_bytes().to_vec());
    }
}
