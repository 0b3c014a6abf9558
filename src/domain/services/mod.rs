mod app_directory;
mod conversations;
mod intents;
mod session;

pub use app_directory::*;
pub use conversations::*;
pub use intents::*;
pub use session::*;
