#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum IntentKind {
    Call,
    Message,
    OpenApp,
    Shortcut,
    Search,
    News,
}

/// What the Session Controller must do to fulfil a matched intent. The
/// resolver only describes it, execution happens in the controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SideEffect {
    LaunchUrl(String),
    InvokeSearch { query: String },
    InvokeNews { category: String },
    /// Matched, but a lookup failed. Only the response text is delivered.
    None,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub kind: IntentKind,
    pub side_effect: SideEffect,
    pub response_text: String,
}

impl ActionDescriptor {
    pub fn new(kind: IntentKind, side_effect: SideEffect, response_text: &str) -> ActionDescriptor {
        return ActionDescriptor {
            kind,
            side_effect,
            response_text: response_text.to_string(),
        };
    }

    pub fn not_found(kind: IntentKind, response_text: &str) -> ActionDescriptor {
        return ActionDescriptor::new(kind, SideEffect::None, response_text);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Matched(ActionDescriptor),
    /// Forward the utterance to the remote model.
    NoMatch,
}

impl Resolution {
    pub fn descriptor(&self) -> Option<&ActionDescriptor> {
        match self {
            Resolution::Matched(descriptor) => return Some(descriptor),
            Resolution::NoMatch => return None,
        }
    }
}
