use super::Message;

#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Listening,
    Processing,
    Speaking,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub text: String,
}

impl Notification {
    pub fn info(text: &str) -> Notification {
        return Notification {
            level: NotificationLevel::Info,
            text: text.to_string(),
        };
    }

    pub fn error(text: &str) -> Notification {
        return Notification {
            level: NotificationLevel::Error,
            text: text.to_string(),
        };
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    MessageAppended(Message),
    ReplyChunk(String),
    StatusChanged(SessionStatus),
    Notification(Notification),
}
