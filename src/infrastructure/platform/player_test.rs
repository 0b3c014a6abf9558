use std::sync::Arc;

use anyhow::Result;

use super::PlayerSpeechOutput;
use crate::domain::models::PlatformError;
use crate::domain::models::SpeechOutput;
use crate::infrastructure::fakes::FakeAudio;

#[test]
fn it_is_unavailable_without_a_command() {
    let player = PlayerSpeechOutput::new(
        Box::new(Arc::new(FakeAudio::default())),
        "  ",
        std::env::temp_dir(),
    );
    assert!(!player.available());
}

#[tokio::test]
async fn it_refuses_to_speak_without_a_command() {
    let player = PlayerSpeechOutput::new(
        Box::new(Arc::new(FakeAudio::default())),
        "",
        std::env::temp_dir(),
    );
    let res = player.speak("Hello").await;
    assert_eq!(res, Err(PlatformError::Unavailable("speech output")));
}

#[cfg(unix)]
#[tokio::test]
async fn it_plays_synthesized_audio() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let played = dir.path().join("played.mp3");
    let command = format!("cp {{file}} {}", played.to_string_lossy());

    let player = PlayerSpeechOutput::new(
        Box::new(Arc::new(FakeAudio::default())),
        &command,
        dir.path().join("audio"),
    );
    assert!(player.available());
    player.speak("Hello there").await?;

    assert_eq!(std::fs::read_to_string(played)?, "Hello there");
    assert!(!dir.path().join("audio/speech.mp3").exists());
    return Ok(());
}

#[cfg(unix)]
#[tokio::test]
async fn it_reports_player_failures() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let player = PlayerSpeechOutput::new(
        Box::new(Arc::new(FakeAudio::default())),
        "false",
        dir.path().to_path_buf(),
    );

    let res = player.speak("Hello").await;
    assert!(matches!(
        res,
        Err(PlatformError::Failed {
            capability: "speech output",
            ..
        })
    ));
    return Ok(());
}

#[tokio::test]
async fn it_reports_missing_players() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let player = PlayerSpeechOutput::new(
        Box::new(Arc::new(FakeAudio::default())),
        "jarvis-missing-player {file}",
        dir.path().to_path_buf(),
    );

    let res = player.speak("Hello").await;
    assert_eq!(res, Err(PlatformError::Unavailable("speech output")));
    return Ok(());
}
