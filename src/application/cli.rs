#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::io;
use std::path;
use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgGroup;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use super::repl::format_app;
use super::repl::format_conversation;
use super::repl::format_message;
use super::repl::help_text;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ActionDescriptor;
use crate::domain::models::SideEffect;
use crate::domain::models::StoreBox;
use crate::domain::services::AppDirectory;
use crate::domain::services::AppUpdate;
use crate::domain::services::ConversationRepository;
use crate::domain::services::IntentResolver;
use crate::domain::services::RepositoryOptions;
use crate::domain::services::Trigger;
use crate::infrastructure::store::FileStore;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

fn store() -> StoreBox {
    return Arc::new(FileStore::default());
}

fn conversations() -> ConversationRepository {
    return ConversationRepository::load(store(), RepositoryOptions::from_config());
}

fn apps() -> AppDirectory {
    return AppDirectory::load(store());
}

fn print_conversations_list() {
    let repository = conversations();
    let list = repository.list();
    if list.is_empty() {
        println!("There are no conversations available. You should start your first one!");
        return;
    }

    let res = list
        .iter()
        .map(|conversation| {
            return format_conversation(
                conversation,
                repository.active_id() == Some(conversation.id.as_str()),
            );
        })
        .collect::<Vec<String>>();
    println!("{}", res.join("\n"));
}

fn print_conversation(id: &str) -> Result<()> {
    let repository = conversations();
    let conversation = match repository.get(id) {
        Some(conversation) => conversation,
        None => bail!(format!("No conversation found for id {id}")),
    };

    println!("{}", Paint::new(&conversation.title).bold());
    for message in &conversation.messages {
        println!("{}", format_message(message));
    }

    return Ok(());
}

fn select_conversation_interactive() -> Result<Option<String>> {
    let repository = conversations();
    let list = repository.list();
    if list.is_empty() {
        println!("There are no conversations available. You should start your first one!");
        return Ok(None);
    }

    let options = list
        .iter()
        .map(|conversation| return format_conversation(conversation, false))
        .collect::<Vec<String>>();

    let idx = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Which conversation would you like to open?")
        .default(0)
        .items(&options)
        .interact_opt()?;

    return Ok(idx.map(|idx| return list[idx].id.to_string()));
}

fn print_apps_list() {
    let directory = apps();
    if directory.list().is_empty() {
        println!("There are no saved apps. Add one with `jarvis apps add --name NAME --url URL`.");
        return;
    }

    let res = directory
        .list()
        .iter()
        .map(format_app)
        .collect::<Vec<String>>();
    println!("{}", res.join("\n"));
}

fn aliases_arg(matches: &ArgMatches) -> Option<Vec<String>> {
    return matches
        .get_many::<String>("alias")
        .map(|aliases| return aliases.map(|e| return e.to_string()).collect());
}

pub fn format_descriptor(descriptor: &ActionDescriptor) -> String {
    let side_effect = match &descriptor.side_effect {
        SideEffect::LaunchUrl(url) => format!("launch {url}"),
        SideEffect::InvokeSearch { query } => format!("search \"{query}\""),
        SideEffect::InvokeNews { category } => format!("news {category}"),
        SideEffect::None => "none".to_string(),
    };

    return format!(
        "Intent: {}\nAction: {side_effect}\nResponse: {}",
        descriptor.kind, descriptor.response_text
    );
}

pub fn format_rules(resolver: &IntentResolver) -> String {
    return resolver
        .rules()
        .iter()
        .map(|rule| {
            let triggers = rule
                .triggers
                .iter()
                .map(|trigger| {
                    return match trigger {
                        Trigger::Prefix(text) => format!("{text} ..."),
                        Trigger::Suffix(text) => format!("... {text}"),
                        Trigger::Phrase(text) => format!("... {text} ..."),
                    };
                })
                .collect::<Vec<String>>()
                .join(", ");
            return format!("- {}: {triggers}", rule.kind);
        })
        .collect::<Vec<String>>()
        .join("\n");
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    return Command::new("debug")
        .about("Debug helpers for Jarvis")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running Jarvis with environment variable RUST_LOG=jarvis")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        )
        .subcommand(
            Command::new("intents").about("List local intent rules and their triggers in matching order.")
        );
}

fn subcommand_conversations_delete() -> Command {
    return Command::new("delete")
        .about("Delete one or all conversations.")
        .arg(
            clap::Arg::new("conversation-id")
                .short('i')
                .long("id")
                .help("Conversation ID")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("all")
                .long("all")
                .help("Delete all conversations.")
                .action(ArgAction::SetTrue),
        )
        .group(
            ArgGroup::new("delete-args")
                .args(["conversation-id", "all"])
                .required(true),
        );
}

fn subcommand_conversations() -> Command {
    return Command::new("conversations")
        .about("Manage past conversations.")
        .arg_required_else_help(true)
        .subcommand(Command::new("dir").about("Print the data directory conversations are stored in."))
        .subcommand(Command::new("list").about("List all conversations, most recently updated first."))
        .subcommand(
            Command::new("show")
                .about("Print every message of a conversation.")
                .arg(
                    clap::Arg::new("conversation-id")
                        .short('i')
                        .long("id")
                        .help("Conversation ID")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("open")
                .about("Open a previous conversation by ID. Omit passing any conversation ID to load an interactive selection.")
                .arg(
                    clap::Arg::new(ConfigKey::ConversationID.to_string())
                        .short('i')
                        .long("id")
                        .help("Conversation ID")
                        .required(false),
                ),
        )
        .subcommand(subcommand_conversations_delete());
}

fn arg_alias() -> Arg {
    return Arg::new("alias")
        .short('a')
        .long("alias")
        .help("Another name the app answers to. Can be repeated.")
        .action(ArgAction::Append);
}

fn subcommand_apps() -> Command {
    return Command::new("apps")
        .about("Manage saved apps used by call, message and open intents.")
        .arg_required_else_help(true)
        .subcommand(Command::new("list").about("List all saved apps in the order they were added."))
        .subcommand(
            Command::new("add")
                .about("Save an app, website or contact link. Accepts http(s)://, tel:, mailto:, wa.me and any scheme:// deep link.")
                .arg(
                    clap::Arg::new("name")
                        .short('n')
                        .long("name")
                        .help("Display name, e.g. Spotify or Mom")
                        .required(true),
                )
                .arg(
                    clap::Arg::new("url")
                        .short('u')
                        .long("url")
                        .help("Link to open, e.g. spotify:// or tel:+15551234567")
                        .required(true),
                )
                .arg(arg_alias()),
        )
        .subcommand(
            Command::new("update")
                .about("Change a saved app. Passing --alias replaces every alias.")
                .arg(
                    clap::Arg::new("app-id")
                        .short('i')
                        .long("id")
                        .help("Saved app ID")
                        .required(true),
                )
                .arg(clap::Arg::new("name").short('n').long("name").help("New display name"))
                .arg(clap::Arg::new("url").short('u').long("url").help("New link"))
                .arg(arg_alias()),
        )
        .subcommand(
            Command::new("remove")
                .about("Remove a saved app.")
                .arg(
                    clap::Arg::new("app-id")
                        .short('i')
                        .long("id")
                        .help("Saved app ID")
                        .required(true),
                ),
        );
}

fn subcommand_resolve() -> Command {
    return Command::new("resolve")
        .about("Show which local intent an utterance resolves to, without running it.")
        .arg(
            clap::Arg::new("text")
                .short('t')
                .long("text")
                .help("Utterance to resolve")
                .required(true),
        );
}

fn subcommand_chat() -> Command {
    return Command::new("chat").about("Start an interactive session with the assistant.");
}

fn arg_config(key: ConfigKey, env: &'static str, help: &str) -> Arg {
    let default = Config::default(key);
    let help = if default.is_empty() || key == ConfigKey::FunctionsToken {
        help.to_string()
    } else {
        format!("{help} [default: {default}]")
    };

    return Arg::new(key.to_string())
        .long(key.to_string())
        .env(env)
        .num_args(1)
        .help(help)
        .global(true);
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("COMMANDS:") || line.starts_with("INTENTS:") {
                return Paint::new(format!("CHAT {line}"))
                    .underline()
                    .bold()
                    .to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("jarvis")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(subcommand_chat())
        .subcommand(subcommand_apps())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_conversations())
        .subcommand(subcommand_debug())
        .subcommand(Command::new("manpages").about("Generates manpages and outputs to stdout."))
        .subcommand(subcommand_resolve())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("JARVIS_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(arg_config(
            ConfigKey::DataDir,
            "JARVIS_DATA_DIR",
            "Directory conversations, saved apps and audio files are stored in.",
        ))
        .arg(arg_config(
            ConfigKey::FunctionsURL,
            "JARVIS_FUNCTIONS_URL",
            "Base URL of the chat, search, news and speech functions.",
        ))
        .arg(arg_config(
            ConfigKey::FunctionsToken,
            "JARVIS_FUNCTIONS_TOKEN",
            "Token sent as a bearer token and apikey header to the functions.",
        ))
        .arg(arg_config(
            ConfigKey::ServiceTimeout,
            "JARVIS_SERVICE_TIMEOUT",
            "Time to wait in milliseconds before a function request times out.",
        ))
        .arg(arg_config(
            ConfigKey::Voice,
            "JARVIS_VOICE",
            "Voice used by the text-to-speech function.",
        ))
        .arg(arg_config(
            ConfigKey::PlayerCommand,
            "JARVIS_PLAYER_COMMAND",
            "Command that plays an audio file, {file} is replaced with its path. Speech output is off when empty.",
        ))
        .arg(arg_config(
            ConfigKey::RecorderCommand,
            "JARVIS_RECORDER_COMMAND",
            "Command that records one utterance to {file} and exits, e.g. arecord -d 5 -f cd {file}. The microphone is off when empty.",
        ))
        .arg(arg_config(
            ConfigKey::TitleMaxLength,
            "JARVIS_TITLE_MAX_LENGTH",
            "Number of characters of the first message kept as a conversation title.",
        ))
        .arg(arg_config(
            ConfigKey::PlaceholderTitle,
            "JARVIS_PLACEHOLDER_TITLE",
            "Title given to conversations before their first message.",
        ));
}

pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    let log_path = dirs::cache_dir()
                        .unwrap_or_else(std::env::temp_dir)
                        .join("jarvis/debug.log");
                    println!("{}", log_path.to_string_lossy());
                }
                Some(("enum-config", _)) => {
                    let res = ConfigKey::VARIANTS.join("\n");
                    println!("{}", res);
                }
                Some(("intents", _)) => {
                    println!("{}", format_rules(&IntentResolver::default()));
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(false);
        }
        Some(("chat", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(false);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(false);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(false);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(false);
            }
        },
        Some(("manpages", _)) => {
            clap_mangen::Man::new(build()).render(&mut io::stdout())?;
            return Ok(false);
        }
        Some(("conversations", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            match subcmd_matches.subcommand() {
                Some(("dir", _)) => {
                    println!("{}", Config::get(ConfigKey::DataDir));
                    return Ok(false);
                }
                Some(("list", _)) => {
                    print_conversations_list();
                    return Ok(false);
                }
                Some(("show", show_matches)) => {
                    if let Some(id) = show_matches.get_one::<String>("conversation-id") {
                        print_conversation(id)?;
                    }
                    return Ok(false);
                }
                Some(("open", open_matches)) => {
                    Config::load(build(), vec![&matches, subcmd_matches, open_matches]).await?;
                    if Config::get(ConfigKey::ConversationID).is_empty() {
                        match select_conversation_interactive()? {
                            Some(id) => Config::set(ConfigKey::ConversationID, &id),
                            None => return Ok(false),
                        }
                    }
                }
                Some(("delete", delete_matches)) => {
                    let mut repository = conversations();
                    if let Some(id) = delete_matches.get_one::<String>("conversation-id") {
                        if repository.get(id).is_none() {
                            bail!(format!("No conversation found for id {id}"));
                        }
                        repository.delete(id)?;
                        println!("Deleted conversation {id}");
                    } else if delete_matches.get_flag("all") {
                        repository.clear()?;
                        println!("Deleted all conversations");
                    } else {
                        subcommand_conversations_delete().print_long_help()?;
                    }
                    return Ok(false);
                }
                _ => {
                    subcommand_conversations().print_long_help()?;
                    return Ok(false);
                }
            }
        }
        Some(("apps", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            match subcmd_matches.subcommand() {
                Some(("list", _)) => {
                    print_apps_list();
                }
                Some(("add", add_matches)) => {
                    let name = add_matches.get_one::<String>("name").cloned().unwrap_or_default();
                    let url = add_matches.get_one::<String>("url").cloned().unwrap_or_default();
                    let aliases = aliases_arg(add_matches).unwrap_or_default();

                    let app = apps().add(&name, &url, &aliases)?;
                    println!("Saved {}", format_app(&app));
                }
                Some(("update", update_matches)) => {
                    let id = update_matches.get_one::<String>("app-id").cloned().unwrap_or_default();
                    let changes = AppUpdate {
                        display_name: update_matches.get_one::<String>("name").cloned(),
                        url: update_matches.get_one::<String>("url").cloned(),
                        aliases: aliases_arg(update_matches),
                    };

                    let app = apps().update(&id, changes)?;
                    println!("Updated {}", format_app(&app));
                }
                Some(("remove", remove_matches)) => {
                    let id = remove_matches.get_one::<String>("app-id").cloned().unwrap_or_default();
                    let mut directory = apps();
                    if directory.get(&id).is_none() {
                        bail!(format!("No saved app found for id {id}"));
                    }
                    directory.remove(&id)?;
                    println!("Removed saved app {id}");
                }
                _ => {
                    subcommand_apps().print_long_help()?;
                }
            }
            return Ok(false);
        }
        Some(("resolve", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            let text = subcmd_matches.get_one::<String>("text").cloned().unwrap_or_default();
            let resolution = IntentResolver::default().resolve(&text, &apps());
            match resolution.descriptor() {
                Some(descriptor) => println!("{}", format_descriptor(descriptor)),
                None => println!("No local intent matched, this would be sent to the model."),
            }
            return Ok(false);
        }
        _ => {
            Config::load(build(), vec![&matches]).await?;
        }
    }

    return Ok(true);
}
