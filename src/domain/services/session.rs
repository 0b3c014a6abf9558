#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::Mutex;

use super::AppDirectory;
use super::ConversationRepository;
use super::IntentResolver;
use crate::domain::models::ActionDescriptor;
use crate::domain::models::ChatBox;
use crate::domain::models::ChatRequest;
use crate::domain::models::Conversation;
use crate::domain::models::Event;
use crate::domain::models::IntentKind;
use crate::domain::models::LauncherBox;
use crate::domain::models::Message;
use crate::domain::models::NewsBox;
use crate::domain::models::Notification;
use crate::domain::models::PlatformError;
use crate::domain::models::Resolution;
use crate::domain::models::SearchBox;
use crate::domain::models::ServiceError;
use crate::domain::models::ServiceName;
use crate::domain::models::SessionError;
use crate::domain::models::SessionStatus;
use crate::domain::models::SideEffect;
use crate::domain::models::SpeechCaptureBox;
use crate::domain::models::SpeechOutputBox;
use crate::domain::models::ValidationError;

/// Everything the controller talks to outside of its own state.
pub struct Capabilities {
    pub chat: ChatBox,
    pub search: SearchBox,
    pub news: NewsBox,
    pub launcher: LauncherBox,
    pub speech_output: SpeechOutputBox,
    pub speech_capture: SpeechCaptureBox,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReplySource {
    Local(IntentKind),
    Remote,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnOutcome {
    pub reply: String,
    pub source: ReplySource,
    pub spoken: bool,
}

struct SessionState {
    conversations: ConversationRepository,
    /// Mirror of the active conversation's messages.
    messages: Vec<Message>,
}

/// Raises a flag for as long as it lives. Dropping it lowers the flag on
/// every exit path, including early returns and errors.
struct FlagGuard<'a> {
    controller: &'a SessionController,
    flag: &'a AtomicBool,
}

impl<'a> FlagGuard<'a> {
    fn acquire(controller: &'a SessionController, flag: &'a AtomicBool) -> Option<FlagGuard<'a>> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        controller.emit_status();

        return Some(FlagGuard { controller, flag });
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
        self.controller.emit_status();
    }
}

fn non_empty_or(text: String, fallback: &str) -> String {
    if text.trim().is_empty() {
        return fallback.to_string();
    }
    return text;
}

/// Coordinates one assistant session: utterance intake, local intents or the
/// remote model, message persistence and speech output.
///
/// Only one turn runs at a time. `processing` is the gate, a second turn or a
/// conversation switch attempted while it is raised is refused with
/// `SessionError::Busy`.
pub struct SessionController {
    state: Mutex<SessionState>,
    apps: Arc<Mutex<AppDirectory>>,
    resolver: IntentResolver,
    capabilities: Capabilities,
    processing: AtomicBool,
    capture_active: AtomicBool,
    output_active: AtomicBool,
    output_available: bool,
    capture_available: bool,
    last_status: std::sync::Mutex<SessionStatus>,
    tx: mpsc::UnboundedSender<Event>,
}

impl SessionController {
    pub fn new(
        conversations: ConversationRepository,
        apps: Arc<Mutex<AppDirectory>>,
        capabilities: Capabilities,
        tx: mpsc::UnboundedSender<Event>,
    ) -> SessionController {
        let messages = conversations
            .active()
            .map(|e| return e.messages.clone())
            .unwrap_or_default();
        let output_available = capabilities.speech_output.available();
        let capture_available = capabilities.speech_capture.available();
        tracing::debug!(output_available, capture_available, "Probed speech capabilities");

        return SessionController {
            state: Mutex::new(SessionState {
                conversations,
                messages,
            }),
            apps,
            resolver: IntentResolver::default(),
            capabilities,
            processing: AtomicBool::new(false),
            capture_active: AtomicBool::new(false),
            output_active: AtomicBool::new(false),
            output_available,
            capture_available,
            last_status: std::sync::Mutex::new(SessionStatus::Idle),
            tx,
        };
    }

    pub fn apps(&self) -> Arc<Mutex<AppDirectory>> {
        return self.apps.clone();
    }

    pub fn is_processing(&self) -> bool {
        return self.processing.load(Ordering::SeqCst);
    }

    pub fn capture_active(&self) -> bool {
        return self.capture_active.load(Ordering::SeqCst);
    }

    pub fn output_active(&self) -> bool {
        return self.output_active.load(Ordering::SeqCst);
    }

    pub fn output_available(&self) -> bool {
        return self.output_available;
    }

    pub fn capture_available(&self) -> bool {
        return self.capture_available;
    }

    pub fn status(&self) -> SessionStatus {
        if self.output_active() {
            return SessionStatus::Speaking;
        }
        if self.capture_active() {
            return SessionStatus::Listening;
        }
        if self.is_processing() {
            return SessionStatus::Processing;
        }
        return SessionStatus::Idle;
    }

    pub async fn messages(&self) -> Vec<Message> {
        return self.state.lock().await.messages.clone();
    }

    pub async fn active_conversation_id(&self) -> Option<String> {
        return self
            .state
            .lock()
            .await
            .conversations
            .active_id()
            .map(|e| return e.to_string());
    }

    pub async fn list_conversations(&self) -> Vec<Conversation> {
        return self
            .state
            .lock()
            .await
            .conversations
            .list()
            .into_iter()
            .cloned()
            .collect();
    }

    pub async fn new_conversation(&self) -> Result<String, SessionError> {
        let _busy = FlagGuard::acquire(self, &self.processing).ok_or(SessionError::Busy)?;
        let mut state = self.state.lock().await;

        let id = state.conversations.create().map_err(|err| return self.fail(err))?;
        state.messages = vec![];
        self.notify(Notification::info("Started a new conversation"));

        return Ok(id);
    }

    pub async fn switch_conversation(&self, id: &str) -> Result<(), SessionError> {
        let _busy = FlagGuard::acquire(self, &self.processing).ok_or(SessionError::Busy)?;
        let mut state = self.state.lock().await;

        if !state.conversations.switch_active(id) {
            return Err(self.fail(ValidationError::UnknownConversation(id.to_string())));
        }
        state.messages = state
            .conversations
            .active()
            .map(|e| return e.messages.clone())
            .unwrap_or_default();

        return Ok(());
    }

    pub async fn delete_conversation(&self, id: &str) -> Result<(), SessionError> {
        let _busy = FlagGuard::acquire(self, &self.processing).ok_or(SessionError::Busy)?;
        let mut state = self.state.lock().await;

        state.conversations.delete(id).map_err(|err| return self.fail(err))?;
        state.messages = state
            .conversations
            .active()
            .map(|e| return e.messages.clone())
            .unwrap_or_default();
        self.notify(Notification::info(&format!("Deleted conversation {id}")));

        return Ok(());
    }

    /// Runs one turn for a typed or transcribed utterance.
    pub async fn process_utterance(&self, utterance: &str) -> Result<TurnOutcome, SessionError> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(SessionError::EmptyUtterance);
        }

        let _busy = FlagGuard::acquire(self, &self.processing).ok_or(SessionError::Busy)?;
        return self.run_turn(utterance).await;
    }

    /// Captures one utterance from the microphone and runs it as a turn. The
    /// capture flag is lowered before the turn starts so capture and output
    /// never overlap.
    pub async fn listen(&self) -> Result<TurnOutcome, SessionError> {
        if !self.capture_available {
            return Err(self.fail(PlatformError::Unavailable("speech capture")));
        }

        let _busy = FlagGuard::acquire(self, &self.processing).ok_or(SessionError::Busy)?;
        let transcript = {
            let _capture =
                FlagGuard::acquire(self, &self.capture_active).ok_or(SessionError::Busy)?;
            self.capabilities
                .speech_capture
                .capture()
                .await
                .map_err(|err| return self.fail(err))?
        };

        let utterance = transcript.trim();
        if utterance.is_empty() {
            return Err(SessionError::EmptyUtterance);
        }

        return self.run_turn(utterance).await;
    }

    async fn run_turn(&self, utterance: &str) -> Result<TurnOutcome, SessionError> {
        let mut state = self.state.lock().await;

        let id = match state.conversations.active_id() {
            Some(id) => id.to_string(),
            None => {
                let id = state.conversations.create().map_err(|err| return self.fail(err))?;
                state.messages = vec![];
                id
            }
        };

        let resolution = {
            let apps = self.apps.lock().await;
            self.resolver.resolve(utterance, &apps)
        };

        match resolution {
            Resolution::Matched(descriptor) => {
                return self.run_local(&mut state, &id, utterance, descriptor).await;
            }
            Resolution::NoMatch => {
                return self.run_remote(&mut state, &id, utterance).await;
            }
        }
    }

    async fn run_local(
        &self,
        state: &mut SessionState,
        id: &str,
        utterance: &str,
        descriptor: ActionDescriptor,
    ) -> Result<TurnOutcome, SessionError> {
        let fallback = descriptor.response_text.as_str();
        let reply: Result<String, SessionError> = match &descriptor.side_effect {
            SideEffect::LaunchUrl(url) => self
                .capabilities
                .launcher
                .launch(url)
                .map(|_| return fallback.to_string())
                .map_err(SessionError::from),
            SideEffect::InvokeSearch { query } => self
                .capabilities
                .search
                .search(query)
                .await
                .map(|res| return non_empty_or(res, fallback))
                .map_err(SessionError::from),
            SideEffect::InvokeNews { category } => self
                .capabilities
                .news
                .headlines(category)
                .await
                .map(|res| return non_empty_or(res, fallback))
                .map_err(SessionError::from),
            SideEffect::None => Ok(fallback.to_string()),
        };

        let reply = match reply {
            Ok(reply) => reply,
            Err(err) => {
                let err = self.fail(err);
                if let Err(persist_err) = self.commit(state, id, vec![Message::user(utterance)]) {
                    tracing::warn!(error = ?persist_err, "Failed to keep the user message after a failed action");
                }
                return Err(err);
            }
        };

        self.commit(
            state,
            id,
            vec![Message::user(utterance), Message::assistant(&reply)],
        )?;

        return Ok(TurnOutcome {
            reply,
            source: ReplySource::Local(descriptor.kind),
            spoken: false,
        });
    }

    async fn run_remote(
        &self,
        state: &mut SessionState,
        id: &str,
        utterance: &str,
    ) -> Result<TurnOutcome, SessionError> {
        let history = state.messages.clone();
        self.commit(state, id, vec![Message::user(utterance)])?;

        let request = ChatRequest {
            message: utterance.to_string(),
            conversation_history: history,
        };
        let reply = match self.capabilities.chat.get_reply(request, &self.tx).await {
            Ok(reply) if !reply.trim().is_empty() => reply,
            Ok(_) => {
                return Err(self.fail(ServiceError::failed(ServiceName::Chat, "empty reply")));
            }
            Err(err) => return Err(self.fail(err)),
        };

        self.commit(state, id, vec![Message::assistant(&reply)])?;
        let spoken = self.speak(&reply).await;

        return Ok(TurnOutcome {
            reply,
            source: ReplySource::Remote,
            spoken,
        });
    }

    /// Persists the buffer plus `appended`, then updates the buffer. A failed
    /// write leaves both untouched.
    fn commit(
        &self,
        state: &mut SessionState,
        id: &str,
        appended: Vec<Message>,
    ) -> Result<(), SessionError> {
        let mut next = state.messages.clone();
        next.extend(appended.iter().cloned());

        state
            .conversations
            .append_messages(id, next.clone())
            .map_err(|err| return self.fail(err))?;
        state.messages = next;

        for message in appended {
            self.emit(Event::MessageAppended(message));
        }

        return Ok(());
    }

    async fn speak(&self, text: &str) -> bool {
        if !self.output_available {
            return false;
        }

        let _output = match FlagGuard::acquire(self, &self.output_active) {
            Some(guard) => guard,
            None => return false,
        };

        match self.capabilities.speech_output.speak(text).await {
            Ok(()) => return true,
            Err(err) => {
                tracing::warn!(error = ?err, "Speech output failed");
                self.notify(Notification::error(&err.to_string()));
                return false;
            }
        }
    }

    /// Logs and reports an error to the user, handing it back for the caller
    /// to return.
    fn fail<E: Into<SessionError>>(&self, err: E) -> SessionError {
        let err = err.into();
        if !err.is_refusal() {
            tracing::error!(error = ?err, "Session operation failed");
            self.notify(Notification::error(&err.to_string()));
        }

        return err;
    }

    fn notify(&self, notification: Notification) {
        self.emit(Event::Notification(notification));
    }

    fn emit_status(&self) {
        let status = self.status();
        let changed = match self.last_status.lock() {
            Ok(mut last) => {
                let changed = *last != status;
                *last = status;
                changed
            }
            Err(_) => true,
        };

        if changed {
            self.emit(Event::StatusChanged(status));
        }
    }

    fn emit(&self, event: Event) {
        if self.tx.send(event).is_err() {
            tracing::debug!("Event receiver dropped");
        }
    }
}
