mod conversation;
mod errors;
mod event;
mod intent;
mod message;
mod platform;
mod saved_app;
mod services;
mod slash_commands;

pub use conversation::*;
pub use errors::*;
pub use event::*;
pub use intent::*;
pub use message::*;
pub use platform::*;
pub use saved_app::*;
pub use services::*;
pub use slash_commands::*;
use uuid::Uuid;

/// Short random id with a readable prefix, e.g. `conv_1b9d6bcd-bbfd`.
pub fn create_id(prefix: &str) -> String {
    let id = Uuid::new_v4()
        .to_string()
        .split('-')
        .enumerate()
        .filter_map(|(idx, str)| {
            if idx > 1 {
                return None;
            }
            return Some(str);
        })
        .collect::<Vec<&str>>()
        .join("-");

    return format!("{prefix}_{id}");
}
