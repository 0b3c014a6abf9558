#[cfg(test)]
#[path = "speech_test.rs"]
mod tests;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::FunctionsClient;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ServiceError;
use crate::domain::models::ServiceName;
use crate::domain::models::Synthesizer;
use crate::domain::models::Transcriber;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct TranscribeRequest {
    audio: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct TranscribeResponse {
    text: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SynthesizeRequest {
    text: String,
    voice: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

/// The `speech-to-text` and `text-to-speech` functions. Audio travels as
/// base64 in both directions.
pub struct FunctionsSpeech {
    client: FunctionsClient,
    voice: String,
}

impl Default for FunctionsSpeech {
    fn default() -> FunctionsSpeech {
        return FunctionsSpeech::new(FunctionsClient::default(), &Config::get(ConfigKey::Voice));
    }
}

impl FunctionsSpeech {
    pub fn new(client: FunctionsClient, voice: &str) -> FunctionsSpeech {
        return FunctionsSpeech {
            client,
            voice: voice.to_string(),
        };
    }
}

#[async_trait]
impl Transcriber for FunctionsSpeech {
    #[allow(clippy::implicit_return)]
    async fn transcribe(&self, audio: &[u8]) -> Result<String, ServiceError> {
        let req = TranscribeRequest {
            audio: STANDARD.encode(audio),
        };
        let res = self.client.post(ServiceName::SpeechToText, &req).await?;
        let body = res
            .json::<TranscribeResponse>()
            .await
            .map_err(|err| return ServiceError::failed(ServiceName::SpeechToText, err))?;

        return Ok(body.text);
    }
}

#[async_trait]
impl Synthesizer for FunctionsSpeech {
    #[allow(clippy::implicit_return)]
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ServiceError> {
        let req = SynthesizeRequest {
            text: text.to_string(),
            voice: self.voice.to_string(),
        };
        let res = self.client.post(ServiceName::TextToSpeech, &req).await?;
        let body = res
            .json::<SynthesizeResponse>()
            .await
            .map_err(|err| return ServiceError::failed(ServiceName::TextToSpeech, err))?;

        let audio = STANDARD
            .decode(body.audio_content.trim())
            .map_err(|err| return ServiceError::failed(ServiceName::TextToSpeech, err))?;
        if audio.is_empty() {
            return Err(ServiceError::failed(ServiceName::TextToSpeech, "no audio returned"));
        }

        return Ok(audio);
    }
}
