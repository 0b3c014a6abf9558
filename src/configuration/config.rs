#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::env;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    ConfigFile,
    ConversationID,
    DataDir,
    FunctionsToken,
    FunctionsURL,
    PlaceholderTitle,
    PlayerCommand,
    RecorderCommand,
    ServiceTimeout,
    TitleMaxLength,
    Voice,
}

impl ConfigKey {
    fn is_numeric(&self) -> bool {
        return matches!(self, ConfigKey::ServiceTimeout | ConfigKey::TitleMaxLength);
    }
}

fn home_dir() -> path::PathBuf {
    return dirs::home_dir().unwrap_or_else(env::temp_dir);
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    pub fn default(key: ConfigKey) -> String {
        #[cfg(not(target_os = "macos"))]
        let config_path = dirs::config_dir()
            .unwrap_or_else(|| return home_dir().join(".config"))
            .join("jarvis/config.toml");
        #[cfg(target_os = "macos")]
        let config_path = home_dir().join(".config/jarvis/config.toml");

        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| return home_dir().join(".local/share"))
            .join("jarvis");

        #[cfg(target_os = "macos")]
        let player_command = "afplay {file}";
        #[cfg(not(target_os = "macos"))]
        let player_command = "";

        let res = match key {
            ConfigKey::DataDir => data_dir.to_string_lossy().to_string(),
            ConfigKey::FunctionsToken => "".to_string(),
            ConfigKey::FunctionsURL => "http://localhost:54321/functions/v1".to_string(),
            ConfigKey::PlaceholderTitle => "New Chat".to_string(),
            ConfigKey::PlayerCommand => player_command.to_string(),
            ConfigKey::RecorderCommand => "".to_string(),
            ConfigKey::ServiceTimeout => "30000".to_string(),
            ConfigKey::TitleMaxLength => "50".to_string(),
            ConfigKey::Voice => "Aria".to_string(),

            // Special
            ConfigKey::ConfigFile => config_path.to_string_lossy().to_string(),
            ConfigKey::ConversationID => "".to_string(),
        };

        return res;
    }

    pub async fn load(cmd: Command, clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key))
        }

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(config_path).await?;
            let doc = toml_str.parse::<toml_edit::Document>()?;

            // Only keys that are also exposed as flags can be set from the file.
            let settable = cmd
                .get_arguments()
                .filter_map(|e| return e.get_long())
                .filter(|e| return *e != ConfigKey::ConfigFile.to_string())
                .filter(|e| return ConfigKey::iter().any(|key| return key.to_string() == *e))
                .collect::<Vec<&str>>();
            for (name, _) in doc.iter() {
                if !settable.contains(&name) {
                    bail!(format!("config.toml has an unknown key '{name}'"));
                }
            }

            for key in ConfigKey::iter() {
                if let Some(val) = doc.get(&key.to_string()) {
                    if let Some(val_int) = val.as_integer() {
                        if val_int < 0 {
                            bail!(format!("config.toml has a negative value for key '{key}'"));
                        }
                        Config::set(key, &val_int.to_string());
                    } else if let Some(val_str) = val.as_str() {
                        if val_str.is_empty() {
                            continue;
                        }
                        if key.is_numeric() && val_str.parse::<u64>().is_err() {
                            bail!(format!(
                                "config.toml has an invalid value for key '{key}': {val_str}\nExpected a whole number"
                            ));
                        }
                        Config::set(key, val_str);
                    } else {
                        bail!(format!("config.toml has an invalid value for key '{key}'"));
                    }
                }
            }
        }

        for key in ConfigKey::iter() {
            if key == ConfigKey::ConfigFile {
                continue;
            }
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    if key.is_numeric() && val.parse::<u64>().is_err() {
                        bail!(format!("Invalid value for '--{key}': {val}\nExpected a whole number"));
                    }
                    Config::set(key, val)
                }
            }
        }

        tracing::debug!(
            data_dir = Config::get(ConfigKey::DataDir),
            functions_url = Config::get(ConfigKey::FunctionsURL),
            voice = Config::get(ConfigKey::Voice),
            player_command = Config::get(ConfigKey::PlayerCommand),
            recorder_command = Config::get(ConfigKey::RecorderCommand),
            "config"
        );

        return Ok(());
    }

    pub fn serialize_default(cmd: Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::ConversationID || key == ConfigKey::ConfigFile {
                    return None;
                }

                let description = cmd
                    .get_arguments()
                    .find(|e| return e.get_long() == Some(key.to_string().as_str()))
                    .and_then(|arg| return arg.get_help())
                    .map(|help| {
                        return help
                            .to_string()
                            .split("[default:")
                            .next()
                            .unwrap_or_default()
                            .trim()
                            .to_string();
                    })
                    .unwrap_or_default();

                let mut val = Config::default(key);
                if val.is_empty() {
                    val = format!("# {key} = \"\"");
                } else if key.is_numeric() {
                    val = format!("{key} = {val}");
                } else {
                    val = format!("{key} = \"{val}\"");
                }

                return Some(format!("# {description}\n{val}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}
