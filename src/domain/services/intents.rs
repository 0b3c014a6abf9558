#[cfg(test)]
#[path = "intents_test.rs"]
mod tests;

use super::AppDirectory;
use crate::domain::models::ActionDescriptor;
use crate::domain::models::IntentKind;
use crate::domain::models::Resolution;
use crate::domain::models::SavedApp;
use crate::domain::models::SideEffect;

/// How a trigger phrase has to appear in a normalized utterance. Triggers are
/// written in lowercase.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Trigger {
    Prefix(&'static str),
    Suffix(&'static str),
    /// Anywhere in the utterance, on word boundaries.
    Phrase(&'static str),
}

fn is_boundary(c: Option<char>) -> bool {
    return c.map_or(true, |c| return !c.is_alphanumeric());
}

fn collapse_whitespace(text: &str) -> String {
    return text.split_whitespace().collect::<Vec<&str>>().join(" ");
}

impl Trigger {
    /// Returns what is left of the utterance once the trigger is removed.
    /// `lower` must be the ASCII lowercase form of `utterance` so byte offsets
    /// line up between the two.
    fn capture(&self, utterance: &str, lower: &str) -> Option<String> {
        match self {
            Trigger::Prefix(prefix) => {
                if !lower.starts_with(prefix) {
                    return None;
                }
                let rest = &utterance[prefix.len()..];
                if !is_boundary(rest.chars().next()) {
                    return None;
                }
                return Some(rest.trim().to_string());
            }
            Trigger::Suffix(suffix) => {
                if !lower.ends_with(suffix) {
                    return None;
                }
                let rest = &utterance[..utterance.len() - suffix.len()];
                if !is_boundary(rest.chars().next_back()) {
                    return None;
                }
                return Some(rest.trim().to_string());
            }
            Trigger::Phrase(phrase) => {
                for (idx, _) in lower.match_indices(phrase) {
                    let end = idx + phrase.len();
                    if is_boundary(lower[..idx].chars().next_back())
                        && is_boundary(lower[end..].chars().next())
                    {
                        let rest = format!("{} {}", &utterance[..idx], &utterance[end..]);
                        return Some(collapse_whitespace(&rest));
                    }
                }
                return None;
            }
        }
    }
}

/// Trims, collapses whitespace and drops trailing sentence punctuation. Case
/// is preserved so captured names and message bodies keep their spelling.
pub fn normalize_utterance(utterance: &str) -> String {
    let collapsed = collapse_whitespace(utterance);
    return collapsed
        .trim_end_matches(|c: char| return matches!(c, '.' | '?' | '!' | '।'))
        .trim()
        .to_string();
}

/// What a trigger matched: the whole normalized utterance and the part left
/// after the trigger was removed.
pub struct Capture<'a> {
    pub utterance: &'a str,
    pub remainder: String,
}

type Builder = Box<dyn Fn(&Capture, &AppDirectory) -> Option<ActionDescriptor> + Send + Sync>;

/// One entry of the resolver table. Only the first matching trigger of a rule
/// is handed to the builder. A builder returning `None` means the rule
/// declines, and resolution moves on to the next rule.
pub struct Rule {
    pub kind: IntentKind,
    pub triggers: Vec<Trigger>,
    build: Builder,
}

impl Rule {
    fn new<F>(kind: IntentKind, triggers: &[Trigger], build: F) -> Rule
    where
        F: Fn(&Capture, &AppDirectory) -> Option<ActionDescriptor> + Send + Sync + 'static,
    {
        return Rule {
            kind,
            triggers: triggers.to_vec(),
            build: Box::new(build),
        };
    }
}

const CALL_TRIGGERS: &[Trigger] = &[
    Trigger::Prefix("call"),
    Trigger::Prefix("phone"),
    Trigger::Prefix("dial"),
    Trigger::Suffix("को कॉल करो"),
    Trigger::Suffix("को फोन करो"),
];

const MESSAGE_TRIGGERS: &[Trigger] = &[
    Trigger::Prefix("send a message to"),
    Trigger::Prefix("send message to"),
    Trigger::Prefix("message"),
    Trigger::Prefix("text"),
    Trigger::Prefix("whatsapp"),
];

const MESSAGE_DELIMITERS: &[&str] = &[" saying ", " that ", ":", " कि "];

const OPEN_APP_TRIGGERS: &[Trigger] = &[
    Trigger::Prefix("open"),
    Trigger::Prefix("launch"),
    Trigger::Prefix("start"),
    Trigger::Suffix("खोलो"),
    Trigger::Suffix("खोल"),
    Trigger::Suffix("open"),
    Trigger::Suffix("चलाओ"),
];

const GOOGLE_TRIGGERS: &[Trigger] = &[
    Trigger::Phrase("google search"),
    Trigger::Phrase("search on google"),
    Trigger::Phrase("गूगल सर्च"),
    Trigger::Phrase("गूगल पर सर्च"),
];

const SEARCH_TRIGGERS: &[Trigger] = &[
    Trigger::Prefix("search for"),
    Trigger::Prefix("search"),
    Trigger::Prefix("look up"),
    Trigger::Suffix("खोजो"),
];

const NEWS_TRIGGERS: &[Trigger] = &[
    Trigger::Phrase("news"),
    Trigger::Phrase("headlines"),
    Trigger::Phrase("समाचार"),
    Trigger::Phrase("खबर"),
];

const NEWS_CATEGORIES: &[(&str, &str)] = &[
    ("sports", "sports"),
    ("business", "business"),
    ("technology", "technology"),
    ("tech", "technology"),
    ("entertainment", "entertainment"),
    ("health", "health"),
    ("science", "science"),
    ("politics", "politics"),
    ("world", "world"),
];

/// Well known destinations with their English and Hindi trigger phrases.
pub struct Shortcut {
    pub label: &'static str,
    pub url: &'static str,
    pub phrases: &'static [&'static str],
}

pub const SHORTCUTS: &[Shortcut] = &[
    Shortcut {
        label: "YouTube",
        url: "https://www.youtube.com",
        phrases: &["open youtube", "youtube खोलो", "youtube खोल", "youtube open"],
    },
    Shortcut {
        label: "WhatsApp Web",
        url: "https://web.whatsapp.com",
        phrases: &["open whatsapp", "whatsapp खोलो", "whatsapp खोल", "whatsapp open"],
    },
    Shortcut {
        label: "Instagram",
        url: "https://www.instagram.com",
        phrases: &["open instagram", "instagram खोलो", "instagram खोल", "instagram open"],
    },
    Shortcut {
        label: "ChatGPT",
        url: "https://chat.openai.com",
        phrases: &["open chatgpt", "chatgpt खोलो", "chatgpt खोल", "chat gpt"],
    },
    Shortcut {
        label: "Canva",
        url: "https://www.canva.com",
        phrases: &["open canva", "canva खोलो", "canva खोल"],
    },
    Shortcut {
        label: "VS Code Web",
        url: "https://vscode.dev",
        phrases: &["open vscode", "visual studio code", "vs code", "वीएस कोड"],
    },
    Shortcut {
        label: "Gmail",
        url: "https://mail.google.com",
        phrases: &["open gmail", "gmail खोलो", "gmail खोल"],
    },
    Shortcut {
        label: "Facebook",
        url: "https://www.facebook.com",
        phrases: &["open facebook", "facebook खोलो", "facebook खोल"],
    },
    Shortcut {
        label: "Twitter/X",
        url: "https://x.com",
        phrases: &["open twitter", "twitter खोलो", "open x", "twitter खोल"],
    },
    Shortcut {
        label: "LinkedIn",
        url: "https://www.linkedin.com",
        phrases: &["open linkedin", "linkedin खोलो", "linkedin खोल"],
    },
    Shortcut {
        label: "GitHub",
        url: "https://github.com",
        phrases: &["open github", "github खोलो", "github खोल"],
    },
];

fn build_call(capture: &Capture, apps: &AppDirectory) -> Option<ActionDescriptor> {
    let name = capture.remainder.as_str();
    if name.is_empty() {
        return None;
    }

    match apps.find_by_name_where(name, SavedApp::is_phone) {
        Some(app) => {
            return Some(ActionDescriptor::new(
                IntentKind::Call,
                SideEffect::LaunchUrl(app.url.to_string()),
                &format!("Calling {}...", app.display_name),
            ));
        }
        None => {
            return Some(ActionDescriptor::not_found(
                IntentKind::Call,
                &format!("No phone number saved for {name}. Add a saved app with a tel: link first."),
            ));
        }
    }
}

fn split_message(remainder: &str) -> Option<(String, String)> {
    let lower = remainder.to_ascii_lowercase();
    let (idx, delimiter) = MESSAGE_DELIMITERS
        .iter()
        .filter_map(|delimiter| return lower.find(delimiter).map(|idx| return (idx, *delimiter)))
        .min_by_key(|(idx, _)| return *idx)?;

    let recipient = remainder[..idx].trim();
    let body = remainder[idx + delimiter.len()..].trim();
    if recipient.is_empty() || body.is_empty() {
        return None;
    }

    return Some((recipient.to_string(), body.to_string()));
}

fn build_message(capture: &Capture, apps: &AppDirectory) -> Option<ActionDescriptor> {
    let (recipient, body) = split_message(&capture.remainder)?;

    let found = apps
        .find_by_name_where(&recipient, |app| return app.is_phone() || app.is_whatsapp())
        .and_then(|app| return app.phone_number().map(|number| return (app, number)));

    let (app, number) = match found {
        Some(res) => res,
        None => {
            return Some(ActionDescriptor::not_found(
                IntentKind::Message,
                &format!("No phone number saved for {recipient}. Add a saved app with a tel: or wa.me link first."),
            ));
        }
    };

    let encoded = urlencoding::encode(&body);
    let url = if app.is_whatsapp() {
        let digits = number
            .chars()
            .filter(|c| return c.is_ascii_digit())
            .collect::<String>();
        format!("https://wa.me/{digits}?text={encoded}")
    } else {
        format!("sms:{number}?body={encoded}")
    };

    return Some(ActionDescriptor::new(
        IntentKind::Message,
        SideEffect::LaunchUrl(url),
        &format!("Sending a message to {}...", app.display_name),
    ));
}

fn build_open_app(capture: &Capture, apps: &AppDirectory) -> Option<ActionDescriptor> {
    let app = apps.find_by_name(&capture.remainder)?;

    return Some(ActionDescriptor::new(
        IntentKind::OpenApp,
        SideEffect::LaunchUrl(app.url.to_string()),
        &format!("Opening {}...", app.display_name),
    ));
}

fn build_google_search(capture: &Capture, _apps: &AppDirectory) -> Option<ActionDescriptor> {
    let query = capture.remainder.as_str();
    if query.is_empty() {
        return None;
    }

    return Some(ActionDescriptor::new(
        IntentKind::Search,
        SideEffect::LaunchUrl(format!(
            "https://www.google.com/search?q={}",
            urlencoding::encode(query)
        )),
        &format!("Google search खोल रहा हूं: {query}"),
    ));
}

fn build_search(capture: &Capture, _apps: &AppDirectory) -> Option<ActionDescriptor> {
    let query = capture.remainder.as_str();
    if query.is_empty() {
        return None;
    }

    return Some(ActionDescriptor::new(
        IntentKind::Search,
        SideEffect::InvokeSearch {
            query: query.to_string(),
        },
        &format!("Searching for {query}..."),
    ));
}

fn news_category(utterance: &str) -> &'static str {
    let lower = utterance.to_lowercase();
    for word in lower.split(|c: char| return !c.is_alphanumeric()) {
        if let Some((_, category)) = NEWS_CATEGORIES.iter().find(|(e, _)| return *e == word) {
            return *category;
        }
    }

    return "general";
}

fn build_news(capture: &Capture, _apps: &AppDirectory) -> Option<ActionDescriptor> {
    let category = news_category(capture.utterance);

    return Some(ActionDescriptor::new(
        IntentKind::News,
        SideEffect::InvokeNews {
            category: category.to_string(),
        },
        &format!("Fetching the latest {category} news..."),
    ));
}

/// Prioritized table of local intents. The first rule whose trigger matches
/// and whose builder accepts the utterance wins, anything else goes to the
/// remote model.
pub struct IntentResolver {
    rules: Vec<Rule>,
}

impl Default for IntentResolver {
    fn default() -> IntentResolver {
        let mut rules = vec![
            Rule::new(IntentKind::Call, CALL_TRIGGERS, build_call),
            Rule::new(IntentKind::Message, MESSAGE_TRIGGERS, build_message),
            Rule::new(IntentKind::OpenApp, OPEN_APP_TRIGGERS, build_open_app),
        ];

        for shortcut in SHORTCUTS {
            let triggers = shortcut
                .phrases
                .iter()
                .map(|phrase| return Trigger::Phrase(*phrase))
                .collect::<Vec<Trigger>>();

            rules.push(Rule::new(IntentKind::Shortcut, &triggers, move |_, _| {
                return Some(ActionDescriptor::new(
                    IntentKind::Shortcut,
                    SideEffect::LaunchUrl(shortcut.url.to_string()),
                    &format!("{} खोल रहा हूं...", shortcut.label),
                ));
            }));
        }

        rules.push(Rule::new(IntentKind::Search, GOOGLE_TRIGGERS, build_google_search));
        rules.push(Rule::new(IntentKind::Search, SEARCH_TRIGGERS, build_search));
        rules.push(Rule::new(IntentKind::News, NEWS_TRIGGERS, build_news));

        return IntentResolver { rules };
    }
}

impl IntentResolver {
    pub fn rules(&self) -> &[Rule] {
        return &self.rules;
    }

    pub fn resolve(&self, utterance: &str, apps: &AppDirectory) -> Resolution {
        let normalized = normalize_utterance(utterance);
        if normalized.is_empty() {
            return Resolution::NoMatch;
        }
        let lower = normalized.to_ascii_lowercase();

        for rule in &self.rules {
            for trigger in &rule.triggers {
                let remainder = match trigger.capture(&normalized, &lower) {
                    Some(remainder) => remainder,
                    None => continue,
                };

                let capture = Capture {
                    utterance: &normalized,
                    remainder,
                };
                if let Some(descriptor) = (rule.build)(&capture, apps) {
                    tracing::debug!(kind = %descriptor.kind, trigger = ?trigger, "Resolved local intent");
                    return Resolution::Matched(descriptor);
                }

                // Shorter triggers of the same rule must not re-capture the words of a longer one.
                break;
            }
        }

        tracing::debug!("No local intent matched");
        return Resolution::NoMatch;
    }
}
