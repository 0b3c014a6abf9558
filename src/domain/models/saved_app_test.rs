use anyhow::Result;

use super::normalize_aliases;
use super::validate_url;
use super::SavedApp;
use crate::domain::models::ValidationError;

#[test]
fn it_accepts_recognized_schemes() {
    for url in [
        "https://mail.google.com",
        "http://localhost:3000",
        "tel:+15551234567",
        "mailto:me@example.com",
        "wa.me/919876543210",
        "spotify://track/123",
        "HTTPS://YOUTUBE.COM",
    ] {
        assert!(validate_url(url).is_ok(), "{url} should be valid");
    }
}

#[test]
fn it_rejects_unrecognized_schemes() {
    assert_eq!(
        validate_url("not-a-url"),
        Err(ValidationError::UrlScheme("not-a-url".to_string()))
    );
    assert!(validate_url("://missing-scheme").is_err());
    assert!(validate_url("www.google.com").is_err());
    assert!(validate_url("sp0tify://x").is_err());
}

#[test]
fn it_rejects_blank_fields() {
    assert_eq!(validate_url("  "), Err(ValidationError::Empty("url")));
    let res = SavedApp::new(" ", "https://example.com", &[], 0);
    assert_eq!(res, Err(ValidationError::Empty("display name")));
}

#[test]
fn it_trims_name_and_url() -> Result<()> {
    let app = SavedApp::new("  Gmail ", " https://mail.google.com ", &[], 7)?;
    assert!(app.id.starts_with("app_"));
    assert_eq!(app.display_name, "Gmail");
    assert_eq!(app.url, "https://mail.google.com");
    assert_eq!(app.created_at, 7);
    return Ok(());
}

#[test]
fn it_normalizes_aliases() {
    let aliases = normalize_aliases(&[
        " Mom ".to_string(),
        "".to_string(),
        "mom".to_string(),
        "Maa".to_string(),
    ]);
    assert_eq!(aliases, vec!["Mom".to_string(), "Maa".to_string()]);
}

#[test]
fn it_extracts_phone_numbers() -> Result<()> {
    let phone = SavedApp::new("Mom", "tel:+15551234567", &[], 0)?;
    assert!(phone.is_phone());
    assert_eq!(phone.phone_number(), Some("+15551234567".to_string()));

    let whatsapp = SavedApp::new("Ramesh", "https://wa.me/919876543210", &[], 0)?;
    assert!(whatsapp.is_whatsapp());
    assert_eq!(whatsapp.phone_number(), Some("919876543210".to_string()));

    let site = SavedApp::new("GitHub", "https://github.com", &[], 0)?;
    assert_eq!(site.phone_number(), None);
    return Ok(());
}

#[test]
fn it_loads_apps_without_aliases() -> Result<()> {
    let app: SavedApp = serde_json::from_str(
        r#"{"id":"app_1","displayName":"Canva","url":"https://www.canva.com","createdAt":1}"#,
    )?;
    assert!(app.aliases.is_empty());
    return Ok(());
}
