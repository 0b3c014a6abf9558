#[cfg(test)]
#[path = "errors_test.rs"]
mod tests;

use thiserror::Error;

use super::ServiceName;

/// Malformed input to a directory or repository mutation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("'{0}' is not a valid URL or deep link")]
    UrlScheme(String),

    #[error("No conversation found for id {0}")]
    UnknownConversation(String),

    #[error("No saved app found for id {0}")]
    UnknownApp(String),
}

/// The store rejected a read or write. In-memory state is left untouched
/// whenever one of these is returned from a mutation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize {key}: {reason}")]
    Serialize { key: String, reason: String },

    #[error("Failed to read {key}: {reason}")]
    Read { key: String, reason: String },

    #[error("Failed to write {key}: {reason}")]
    Write { key: String, reason: String },
}

#[derive(Debug, Error)]
pub enum MutationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("The {0} service is rate limited, please try again in a moment")]
    RateLimited(ServiceName),

    #[error("The {0} service requires payment, please add credits to continue")]
    PaymentRequired(ServiceName),

    #[error("The {0} service quota has been exceeded")]
    QuotaExceeded(ServiceName),

    #[error("The {service} service failed: {reason}")]
    Failed { service: ServiceName, reason: String },
}

impl ServiceError {
    pub fn failed(service: ServiceName, reason: impl ToString) -> ServiceError {
        return ServiceError::Failed {
            service,
            reason: reason.to_string(),
        };
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("{0} is not available on this system")]
    Unavailable(&'static str),

    #[error("Permission denied for {0}")]
    PermissionDenied(&'static str),

    #[error("{capability} failed: {reason}")]
    Failed {
        capability: &'static str,
        reason: String,
    },
}

impl PlatformError {
    pub fn failed(capability: &'static str, reason: impl ToString) -> PlatformError {
        return PlatformError::Failed {
            capability,
            reason: reason.to_string(),
        };
    }
}

/// Errors returned by Session Controller operations. Everything except
/// `Busy` and `EmptyUtterance` has already been reported as a notification
/// by the time the caller sees it.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("A request is already in progress")]
    Busy,

    #[error("Nothing was said")]
    EmptyUtterance,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl From<MutationError> for SessionError {
    fn from(err: MutationError) -> SessionError {
        match err {
            MutationError::Validation(err) => return SessionError::Validation(err),
            MutationError::Persistence(err) => return SessionError::Persistence(err),
        }
    }
}

impl SessionError {
    /// Busy and empty input are refusals rather than failures, the UI is
    /// expected to prevent them so they are not surfaced as notifications.
    pub fn is_refusal(&self) -> bool {
        return matches!(self, SessionError::Busy | SessionError::EmptyUtterance);
    }
}
