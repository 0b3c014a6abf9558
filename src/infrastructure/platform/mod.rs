mod command;
pub mod launcher;
pub mod noop;
pub mod player;
pub mod recorder;

use std::path;

pub use command::CommandTemplate;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::LauncherBox;
use crate::domain::models::SpeechCaptureBox;
use crate::domain::models::SpeechOutputBox;
use crate::infrastructure::services::speech::FunctionsSpeech;

fn audio_dir() -> path::PathBuf {
    return path::PathBuf::from(Config::get(ConfigKey::DataDir)).join("audio");
}

pub struct PlatformManager {}

impl PlatformManager {
    pub fn launcher() -> LauncherBox {
        return Box::<launcher::SystemLauncher>::default();
    }

    pub fn speech_output() -> SpeechOutputBox {
        let command = Config::get(ConfigKey::PlayerCommand);
        if CommandTemplate::parse(&command).is_none() {
            return Box::<noop::NoopSpeech>::default();
        }

        return Box::new(player::PlayerSpeechOutput::new(
            Box::<FunctionsSpeech>::default(),
            &command,
            audio_dir(),
        ));
    }

    pub fn speech_capture() -> SpeechCaptureBox {
        let command = Config::get(ConfigKey::RecorderCommand);
        if CommandTemplate::parse(&command).is_none() {
            return Box::<noop::NoopSpeech>::default();
        }

        return Box::new(recorder::RecorderCapture::new(
            Box::<FunctionsSpeech>::default(),
            &command,
            audio_dir(),
        ));
    }
}
