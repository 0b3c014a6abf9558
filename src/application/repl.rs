#[cfg(test)]
#[path = "repl_test.rs"]
mod tests;

use std::io::Write;

use anyhow::Result;
use chrono::Local;
use chrono::TimeZone;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use yansi::Paint;

use crate::domain::models::Conversation;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::NotificationLevel;
use crate::domain::models::SavedApp;
use crate::domain::models::SessionError;
use crate::domain::models::SessionStatus;
use crate::domain::models::SlashCommand;
use crate::domain::services::SessionController;
use crate::domain::services::TurnOutcome;

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /new (/n) - Starts a new conversation.
- /list (/ls) - Lists all conversations, the active one is marked with *.
- /switch (/s) [CONVERSATION_ID] - Makes a conversation active and prints its history.
- /delete (/d) [CONVERSATION_ID] - Deletes a conversation.
- /listen (/l) - Records one utterance with the configured recorder and sends it.
- /apps (/a) - Lists saved apps available to call, message and open intents.
- /quit /exit (/q) - Exit Jarvis.
- /help (/h) - Provides this help menu.

INTENTS:
Utterances are checked against local intents before being sent to the model.
- call Mom / Mom को कॉल करो - Dials a saved app with a tel: link.
- message Mom saying hi - Opens WhatsApp or SMS for a saved contact.
- open Spotify / Spotify खोलो - Opens a saved app by name or alias.
- open youtube - Opens a built-in shortcut.
- search for rust / google search rust - Searches the web or opens Google.
- sports news - Reads the latest headlines for a category.
        "#;

    return text.trim().to_string();
}

pub fn format_timestamp(millis: i64) -> String {
    return Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|e| return e.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();
}

pub fn format_conversation(conversation: &Conversation, active: bool) -> String {
    let marker = if active { "*" } else { "-" };
    return format!(
        "{marker} (ID: {}) {}, {}, Messages: {}",
        conversation.id,
        format_timestamp(conversation.updated_at),
        conversation.title,
        conversation.messages.len()
    );
}

pub fn format_app(app: &SavedApp) -> String {
    let mut res = format!("- (ID: {}) {}, {}", app.id, app.display_name, app.url);
    if !app.aliases.is_empty() {
        res = format!("{res}, Aliases: {}", app.aliases.join(", "));
    }

    return res;
}

pub fn format_message(message: &Message) -> String {
    if message.is_user() {
        return format!("{} {}", Paint::green("You:").bold(), message.content);
    }
    return format!("{} {}", Paint::cyan("Jarvis:").bold(), message.content);
}

/// Turns session events into terminal output. Streamed chunks are written
/// inline, so the final assistant message is only printed in full when
/// nothing was streamed for it.
#[derive(Default)]
pub struct EventPrinter {
    streaming: bool,
    pub echo_user: bool,
}

impl EventPrinter {
    pub fn format(&mut self, event: &Event) -> Option<String> {
        match event {
            Event::ReplyChunk(text) => {
                if self.streaming {
                    return Some(text.to_string());
                }
                self.streaming = true;
                return Some(format!("{} {text}", Paint::cyan("Jarvis:").bold()));
            }
            Event::MessageAppended(message) => {
                if message.is_user() {
                    if self.echo_user {
                        return Some(format!("{}\n", format_message(message)));
                    }
                    return None;
                }
                if self.streaming {
                    self.streaming = false;
                    return Some("\n".to_string());
                }
                return Some(format!("{}\n", format_message(message)));
            }
            Event::StatusChanged(SessionStatus::Listening) => {
                return Some(format!("{}\n", Paint::new("Listening...").dimmed()));
            }
            Event::StatusChanged(SessionStatus::Speaking) => {
                return Some(format!("{}\n", Paint::new("Speaking...").dimmed()));
            }
            Event::StatusChanged(_) => {
                return None;
            }
            Event::Notification(notification) => {
                let mut res = "".to_string();
                if self.streaming {
                    self.streaming = false;
                    res = "\n".to_string();
                }
                let text = match notification.level {
                    NotificationLevel::Info => Paint::yellow(&notification.text).to_string(),
                    NotificationLevel::Error => Paint::red(&notification.text).to_string(),
                };
                return Some(format!("{res}{text}\n"));
            }
        }
    }

    fn print(&mut self, event: &Event) {
        self.write(event, &mut std::io::stdout().lock());
    }

    fn write(&mut self, event: &Event, out: &mut impl Write) {
        let text = match self.format(event) {
            Some(text) => text,
            None => return,
        };

        if let Err(err) = out.write_all(text.as_bytes()).and_then(|_| return out.flush()) {
            tracing::debug!(error = ?err, "Failed to write session event");
        }
    }
}

fn print_history(messages: &[Message]) {
    for message in messages {
        println!("{}", format_message(message));
    }
}

async fn print_conversations(controller: &SessionController) {
    let conversations = controller.list_conversations().await;
    if conversations.is_empty() {
        println!("There are no conversations yet. Say something to start one!");
        return;
    }

    let active_id = controller.active_conversation_id().await;
    for conversation in conversations {
        let active = active_id.as_deref() == Some(conversation.id.as_str());
        println!("{}", format_conversation(&conversation, active));
    }
}

async fn print_apps(controller: &SessionController) {
    let apps = controller.apps();
    let apps = apps.lock().await;
    if apps.list().is_empty() {
        println!("There are no saved apps. Add one with `jarvis apps add`.");
        return;
    }

    for app in apps.list() {
        println!("{}", format_app(app));
    }
}

fn print_session_error(err: SessionError) {
    match err {
        SessionError::Busy => println!("{}", Paint::yellow("Still working on the last request.")),
        // Everything else has already been reported as a notification.
        _ => tracing::debug!(error = ?err, "Turn ended with an error"),
    }
}

fn log_outcome(outcome: &TurnOutcome) {
    tracing::debug!(
        source = ?outcome.source,
        spoken = outcome.spoken,
        reply_chars = outcome.reply.chars().count(),
        "Turn finished"
    );
}

/// Runs one REPL line. Returns false when the user asked to quit.
async fn handle_line(controller: &SessionController, line: &str) -> bool {
    let cmd = match SlashCommand::parse(line) {
        Some(cmd) => cmd,
        None => {
            match controller.process_utterance(line).await {
                Ok(outcome) => log_outcome(&outcome),
                Err(err) => print_session_error(err),
            }
            return true;
        }
    };

    if cmd.is_quit() {
        return false;
    }

    if cmd.is_help() {
        println!("{}", help_text());
    } else if cmd.is_new() {
        if let Err(err) = controller.new_conversation().await {
            print_session_error(err);
        }
    } else if cmd.is_list() {
        print_conversations(controller).await;
    } else if cmd.is_switch() {
        match cmd.id_arg() {
            Some(id) => match controller.switch_conversation(id).await {
                Ok(_) => print_history(&controller.messages().await),
                Err(err) => print_session_error(err),
            },
            None => println!("Usage: /switch [CONVERSATION_ID]"),
        }
    } else if cmd.is_delete() {
        match cmd.id_arg() {
            Some(id) => {
                if let Err(err) = controller.delete_conversation(id).await {
                    print_session_error(err);
                }
            }
            None => println!("Usage: /delete [CONVERSATION_ID]"),
        }
    } else if cmd.is_listen() {
        match controller.listen().await {
            Ok(outcome) => log_outcome(&outcome),
            Err(err) => print_session_error(err),
        }
    } else if cmd.is_apps() {
        print_apps(controller).await;
    }

    return true;
}

fn print_banner(controller: &SessionController) {
    let on_off = |available: bool| {
        if available {
            return Paint::green("on");
        }
        return Paint::red("off");
    };

    println!(
        "{} Type a message, or /help for commands.",
        Paint::cyan("Jarvis").bold()
    );
    println!(
        "{}",
        Paint::new(format!(
            "Speech output: {}, Microphone: {}",
            on_off(controller.output_available()),
            on_off(controller.capture_available())
        ))
        .dimmed()
    );
}

/// Line oriented front-end. Events are printed while each line is being
/// handled so streamed replies show up as they arrive.
pub async fn start(
    controller: SessionController,
    mut rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    print_banner(&controller);
    print_history(&controller.messages().await);

    let mut printer = EventPrinter::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{} ", Paint::green(">").bold());
        std::io::stdout().flush()?;

        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        printer.echo_user = SlashCommand::parse(line)
            .map(|cmd| return cmd.is_listen())
            .unwrap_or(false);

        let handled = handle_line(&controller, line);
        tokio::pin!(handled);
        let keep_going = loop {
            tokio::select! {
                keep_going = &mut handled => break keep_going,
                Some(event) = rx.recv() => printer.print(&event),
            }
        };

        while let Ok(event) = rx.try_recv() {
            printer.print(&event);
        }

        if !keep_going {
            break;
        }
    }

    return Ok(());
}
