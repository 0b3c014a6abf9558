#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::process;
use std::sync::Arc;

use anyhow::Error;
use anyhow::Result;
use tokio::sync::mpsc;
use tokio::sync::Mutex;
use yansi::Paint;

use crate::application::cli;
use crate::application::repl;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Event;
use crate::domain::models::StoreBox;
use crate::domain::services::AppDirectory;
use crate::domain::services::ConversationRepository;
use crate::domain::services::RepositoryOptions;
use crate::domain::services::SessionController;
use crate::infrastructure::store::FileStore;

fn handle_error(err: Error) {
    eprintln!(
            "{}",
            Paint::red(format!(
                "Oh no! Jarvis has failed with the following app version and error.\n\nVersion: {}\nCommit: {}\nError: {}",
                env!("CARGO_PKG_VERSION"),
                env!("VERGEN_GIT_DESCRIBE"),
                err
            ))
        );

    let backtrace = err.backtrace();
    if backtrace.to_string() == "disabled backtrace" {
        let args = env::args().collect::<Vec<String>>().join(" ");
        eprintln!("\nRunning the following can help explain further what the issue is:");
        eprintln!("\nRUST_BACKTRACE=1 {args}");
    } else {
        eprintln!("\n{}", backtrace);
    }

    process::exit(1);
}

async fn start_chat() -> Result<()> {
    let store: StoreBox = Arc::new(FileStore::default());
    let conversations = ConversationRepository::load(store.clone(), RepositoryOptions::from_config());
    let apps = Arc::new(Mutex::new(AppDirectory::load(store)));

    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();
    let controller = SessionController::new(
        conversations,
        apps,
        infrastructure::capabilities(),
        event_tx,
    );

    let conversation_id = Config::get(ConfigKey::ConversationID);
    if !conversation_id.is_empty() {
        controller.switch_conversation(&conversation_id).await?;
    }

    return repl::start(controller, event_rx).await;
}

#[tokio::main]
async fn main() {
    better_panic::install();

    let debug_log_dir = env::var("JARVIS_LOG_DIR").unwrap_or_else(|_| {
        return dirs::cache_dir()
            .unwrap_or_else(env::temp_dir)
            .join("jarvis")
            .to_string_lossy()
            .to_string();
    });

    let file_appender = tracing_appender::rolling::never(debug_log_dir, "debug.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    if env::var("RUST_LOG")
        .unwrap_or_else(|_| return "".to_string())
        .contains("jarvis")
    {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(writer)
            .init();
    }

    let ready = match cli::parse().await {
        Ok(ready) => ready,
        Err(err) => {
            handle_error(err);
            return;
        }
    };
    if !ready {
        process::exit(0);
    }

    if let Err(err) = start_chat().await {
        handle_error(err);
    }

    process::exit(0);
}
