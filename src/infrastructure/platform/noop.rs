#[cfg(test)]
#[path = "noop_test.rs"]
mod tests;

use async_trait::async_trait;

use crate::domain::models::PlatformError;
use crate::domain::models::SpeechCapture;
use crate::domain::models::SpeechOutput;

/// Stands in for speech output or capture when nothing is configured.
#[derive(Default)]
pub struct NoopSpeech {}

#[async_trait]
impl SpeechOutput for NoopSpeech {
    fn available(&self) -> bool {
        return false;
    }

    #[allow(clippy::implicit_return)]
    async fn speak(&self, _text: &str) -> Result<(), PlatformError> {
        return Err(PlatformError::Unavailable("speech output"));
    }
}

#[async_trait]
impl SpeechCapture for NoopSpeech {
    fn available(&self) -> bool {
        return false;
    }

    #[allow(clippy::implicit_return)]
    async fn capture(&self) -> Result<String, PlatformError> {
        return Err(PlatformError::Unavailable("speech capture"));
    }
}
