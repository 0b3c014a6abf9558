#[cfg(test)]
#[path = "recorder_test.rs"]
mod tests;

use std::io;
use std::path;
use std::process;

use async_trait::async_trait;
use tokio::fs;

use super::CommandTemplate;
use crate::domain::models::PlatformError;
use crate::domain::models::SpeechCapture;
use crate::domain::models::TranscriberBox;

const CAPABILITY: &str = "speech capture";

/// Records one utterance with the configured `recorder-command` and
/// transcribes it through the speech-to-text service. The command is
/// expected to stop on its own, e.g. `arecord -d 5 -f cd {file}`.
pub struct RecorderCapture {
    transcriber: TranscriberBox,
    command: Option<CommandTemplate>,
    dir: path::PathBuf,
}

impl RecorderCapture {
    pub fn new(transcriber: TranscriberBox, command: &str, dir: path::PathBuf) -> RecorderCapture {
        return RecorderCapture {
            transcriber,
            command: CommandTemplate::parse(command),
            dir,
        };
    }

    async fn record(&self, command: &CommandTemplate, file: &path::Path) -> Result<Vec<u8>, PlatformError> {
        let status = tokio::process::Command::new(&command.program)
            .args(command.args_for(file))
            .stdin(process::Stdio::null())
            .stdout(process::Stdio::null())
            .stderr(process::Stdio::null())
            .status()
            .await
            .map_err(|err| {
                return match err.kind() {
                    io::ErrorKind::NotFound => PlatformError::Unavailable(CAPABILITY),
                    io::ErrorKind::PermissionDenied => PlatformError::PermissionDenied("microphone"),
                    _ => PlatformError::failed(CAPABILITY, err),
                };
            })?;

        if !status.success() {
            return Err(PlatformError::failed(
                CAPABILITY,
                format!("{} exited with {status}", command.program),
            ));
        }

        let audio = fs::read(file)
            .await
            .map_err(|err| return PlatformError::failed(CAPABILITY, err))?;
        if audio.is_empty() {
            return Err(PlatformError::failed(CAPABILITY, "no audio was recorded"));
        }

        return Ok(audio);
    }
}

#[async_trait]
impl SpeechCapture for RecorderCapture {
    fn available(&self) -> bool {
        return self.command.is_some();
    }

    #[allow(clippy::implicit_return)]
    async fn capture(&self) -> Result<String, PlatformError> {
        let command = self
            .command
            .as_ref()
            .ok_or(PlatformError::Unavailable(CAPABILITY))?;

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|err| return PlatformError::failed(CAPABILITY, err))?;
        let file = self.dir.join("recording.wav");
        if fs::metadata(&file).await.is_ok() {
            fs::remove_file(&file)
                .await
                .map_err(|err| return PlatformError::failed(CAPABILITY, err))?;
        }

        let audio = self.record(command, &file).await;
        if let Err(err) = fs::remove_file(&file).await {
            tracing::debug!(error = ?err, "Failed to remove recording");
        }

        let text = self
            .transcriber
            .transcribe(&audio?)
            .await
            .map_err(|err| return PlatformError::failed(CAPABILITY, err))?;

        return Ok(text);
    }
}
