use anyhow::Result;

use super::Config;
use super::ConfigKey;
use crate::application::cli;

#[test]
fn it_serializes_to_valid_toml() -> Result<()> {
    let res = Config::serialize_default(cli::build());
    let doc = res.parse::<toml_edit::Document>()?;

    assert_eq!(doc["placeholder-title"].as_str(), Some("New Chat"));
    assert_eq!(doc["title-max-length"].as_integer(), Some(50));
    assert_eq!(doc["service-timeout"].as_integer(), Some(30000));
    assert!(doc.get("conversation-id").is_none());
    assert!(doc.get("config-file").is_none());
    assert!(res.contains("# Voice used by the text-to-speech function.\nvoice = \"Aria\""));
    assert!(res.contains("# functions-token = \"\""));
    return Ok(());
}

#[test]
fn it_uses_built_in_defaults() {
    assert_eq!(Config::default(ConfigKey::TitleMaxLength), "50");
    assert_eq!(Config::default(ConfigKey::PlaceholderTitle), "New Chat");
    assert_eq!(
        Config::default(ConfigKey::FunctionsURL),
        "http://localhost:54321/functions/v1"
    );
    assert!(Config::default(ConfigKey::DataDir).ends_with("jarvis"));
}

#[tokio::test]
async fn it_loads_config_from_file() -> Result<()> {
    let matches = cli::build().try_get_matches_from(vec!["jarvis", "-c", "./config.example.toml"])?;
    Config::load(cli::build(), vec![&matches]).await?;
    return Ok(());
}

#[tokio::test]
async fn it_fails_to_loads_config_from_file() -> Result<()> {
    let matches =
        cli::build().try_get_matches_from(vec!["jarvis", "-c", "./test/bad-config.toml"])?;
    let res = Config::load(cli::build(), vec![&matches]).await;
    assert!(res.is_err());
    return Ok(());
}
