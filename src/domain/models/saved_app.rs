#[cfg(test)]
#[path = "saved_app_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::create_id;
use super::ValidationError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedApp {
    pub id: String,
    pub display_name: String,
    pub url: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub created_at: i64,
}

impl SavedApp {
    pub fn new(
        display_name: &str,
        url: &str,
        aliases: &[String],
        now: i64,
    ) -> Result<SavedApp, ValidationError> {
        let display_name = validate_display_name(display_name)?;
        let url = validate_url(url)?;

        return Ok(SavedApp {
            id: create_id("app"),
            display_name,
            url,
            aliases: normalize_aliases(aliases),
            created_at: now,
        });
    }

    pub fn is_phone(&self) -> bool {
        return self.url.to_lowercase().starts_with("tel:");
    }

    pub fn is_whatsapp(&self) -> bool {
        return self.url.to_lowercase().contains("wa.me");
    }

    /// The dialable part of a `tel:` or `wa.me` link.
    pub fn phone_number(&self) -> Option<String> {
        let lower = self.url.to_ascii_lowercase();
        let raw = if lower.starts_with("tel:") {
            &self.url[4..]
        } else if let Some(idx) = lower.find("wa.me/") {
            &self.url[idx + 6..]
        } else {
            return None;
        };

        let number = raw
            .split(|c: char| return c == '?' || c == '/')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        if number.is_empty() {
            return None;
        }

        return Some(number);
    }
}

pub fn validate_display_name(display_name: &str) -> Result<String, ValidationError> {
    let trimmed = display_name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty("display name"));
    }

    return Ok(trimmed.to_string());
}

/// Accepts `http(s)://`, `tel:`, `mailto:`, `wa.me` and any `scheme://`
/// deep link, case-insensitively.
pub fn validate_url(url: &str) -> Result<String, ValidationError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty("url"));
    }

    let lower = trimmed.to_lowercase();
    if lower.starts_with("tel:") || lower.starts_with("mailto:") || lower.starts_with("wa.me") {
        return Ok(trimmed.to_string());
    }

    if let Some((scheme, _)) = lower.split_once("://") {
        if !scheme.is_empty() && scheme.chars().all(|c| return c.is_ascii_lowercase()) {
            return Ok(trimmed.to_string());
        }
    }

    return Err(ValidationError::UrlScheme(trimmed.to_string()));
}

pub fn normalize_aliases(aliases: &[String]) -> Vec<String> {
    let mut res: Vec<String> = vec![];
    for alias in aliases {
        let trimmed = alias.trim();
        if trimmed.is_empty() {
            continue;
        }
        if res.iter().any(|e| return e.to_lowercase() == trimmed.to_lowercase()) {
            continue;
        }
        res.push(trimmed.to_string());
    }

    return res;
}
