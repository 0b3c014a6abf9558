#[cfg(test)]
pub mod fakes;
pub mod platform;
pub mod services;
pub mod store;

use crate::domain::services::Capabilities;
use platform::PlatformManager;
use services::chat::FunctionsChat;
use services::knowledge::FunctionsKnowledge;

/// Production capabilities, built from the loaded config.
pub fn capabilities() -> Capabilities {
    return Capabilities {
        chat: Box::<FunctionsChat>::default(),
        search: Box::<FunctionsKnowledge>::default(),
        news: Box::<FunctionsKnowledge>::default(),
        launcher: PlatformManager::launcher(),
        speech_output: PlatformManager::speech_output(),
        speech_capture: PlatformManager::speech_capture(),
    };
}
