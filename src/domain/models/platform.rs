use std::sync::Arc;

use async_trait::async_trait;

use super::PersistenceError;
use super::PlatformError;

/// Durable key/value storage. Values are opaque serialized blobs, callers
/// own (de)serialization.
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

pub type StoreBox = Arc<dyn Store>;

pub trait Launcher {
    /// Opens a URL or deep link with whatever the system has registered for it.
    fn launch(&self, url: &str) -> Result<(), PlatformError>;
}

#[async_trait]
pub trait SpeechOutput {
    /// Probed once when the Session Controller is built. When false, replies
    /// are never handed to `speak`.
    fn available(&self) -> bool;

    /// Reads `text` aloud and resolves once playback ends or fails.
    async fn speak(&self, text: &str) -> Result<(), PlatformError>;
}

#[async_trait]
pub trait SpeechCapture {
    fn available(&self) -> bool;

    /// Captures one utterance and returns its transcript.
    async fn capture(&self) -> Result<String, PlatformError>;
}

pub type LauncherBox = Box<dyn Launcher + Send + Sync>;
pub type SpeechOutputBox = Box<dyn SpeechOutput + Send + Sync>;
pub type SpeechCaptureBox = Box<dyn SpeechCapture + Send + Sync>;
