#[cfg(test)]
#[path = "player_test.rs"]
mod tests;

use std::io;
use std::path;
use std::process;

use async_trait::async_trait;
use tokio::fs;

use super::CommandTemplate;
use crate::domain::models::PlatformError;
use crate::domain::models::SpeechOutput;
use crate::domain::models::SynthesizerBox;

const CAPABILITY: &str = "speech output";

/// Speaks by synthesizing audio through the text-to-speech service and
/// playing the file with the configured `player-command`.
pub struct PlayerSpeechOutput {
    synthesizer: SynthesizerBox,
    command: Option<CommandTemplate>,
    dir: path::PathBuf,
}

impl PlayerSpeechOutput {
    pub fn new(
        synthesizer: SynthesizerBox,
        command: &str,
        dir: path::PathBuf,
    ) -> PlayerSpeechOutput {
        return PlayerSpeechOutput {
            synthesizer,
            command: CommandTemplate::parse(command),
            dir,
        };
    }
}

#[async_trait]
impl SpeechOutput for PlayerSpeechOutput {
    fn available(&self) -> bool {
        return self.command.is_some();
    }

    #[allow(clippy::implicit_return)]
    async fn speak(&self, text: &str) -> Result<(), PlatformError> {
        let command = self
            .command
            .as_ref()
            .ok_or(PlatformError::Unavailable(CAPABILITY))?;

        let audio = self
            .synthesizer
            .synthesize(text)
            .await
            .map_err(|err| return PlatformError::failed(CAPABILITY, err))?;

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|err| return PlatformError::failed(CAPABILITY, err))?;
        let file = self.dir.join("speech.mp3");
        fs::write(&file, audio)
            .await
            .map_err(|err| return PlatformError::failed(CAPABILITY, err))?;

        let status = tokio::process::Command::new(&command.program)
            .args(command.args_for(&file))
            .stdin(process::Stdio::null())
            .stdout(process::Stdio::null())
            .stderr(process::Stdio::null())
            .status()
            .await;

        if let Err(err) = fs::remove_file(&file).await {
            tracing::debug!(error = ?err, "Failed to remove speech file");
        }

        let status = status.map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                return PlatformError::Unavailable(CAPABILITY);
            }
            return PlatformError::failed(CAPABILITY, err);
        })?;
        if !status.success() {
            return Err(PlatformError::failed(
                CAPABILITY,
                format!("{} exited with {status}", command.program),
            ));
        }

        return Ok(());
    }
}
