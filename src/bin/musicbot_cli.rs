//! musicbot-cli: browse and organise a music bot's file library
//!
//! Usage:
//!   musicbot-cli tree                       Print the folder tree
//!   musicbot-cli rm <uuid>                  Delete a file or folder
//!   musicbot-cli edit <uuid> key=value...   Change file attributes
//!   musicbot-cli mv <uuid> [parent]         Move an entry (no parent = root)
//!   musicbot-cli mkdir [name] [--parent]    Create a folder
//!   musicbot-cli rename <folder> <name>     Rename a folder
//!   musicbot-cli login [--save]             Log in and optionally store the token

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use musicbot_files::bot::remote;
use musicbot_files::config::{self, BotConfig};
use musicbot_files::{BotError, Forest, HttpTransport, Node};

#[derive(Parser)]
#[command(
    name = "musicbot-cli",
    about = "musicbot-cli: browse and organise a music bot's file library",
    version
)]
struct Cli {
    /// Config file (default: <config dir>/musicbot-files/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Bot web interface URL (e.g., http://127.0.0.1:8087)
    #[arg(long, global = true)]
    url: Option<String>,

    #[arg(short, long, global = true)]
    user: Option<String>,

    #[arg(short, long, global = true)]
    password: Option<String>,

    /// Bearer token from a previous login
    #[arg(long, global = true)]
    token: Option<String>,

    #[arg(long, global = true, default_value = "WARN")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the folder tree
    Tree,
    /// Delete a file or folder
    Rm { uuid: String },
    /// Change file attributes (title, artist, album, ...)
    Edit {
        uuid: String,
        /// Attributes as key=value
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// Move an entry below another folder
    Mv {
        uuid: String,
        /// Target folder UUID (default: root)
        parent: Option<String>,
    },
    /// Create a folder
    Mkdir {
        name: Option<String>,
        /// Parent folder UUID (default: root)
        #[arg(long)]
        parent: Option<String>,
    },
    /// Rename a folder
    Rename { folder_uuid: String, name: String },
    /// Log in with username/password
    Login {
        /// Store the token in the config file
        #[arg(long)]
        save: bool,
    },
}

impl Cli {
    fn bot_config(&self) -> BotConfig {
        let path = self.config.clone().unwrap_or_else(config::config_path);
        let mut config = config::load_bot_config_from(&path).with_env_overrides();

        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        if let Some(user) = &self.user {
            config.username = Some(user.clone());
        }
        if let Some(password) = &self.password {
            config.password = Some(password.clone());
        }
        if let Some(token) = &self.token {
            config.token = Some(token.clone());
        }
        config
    }
}

/// Parse `key=value` pairs into a JSON object
fn parse_fields(fields: &[String]) -> Result<serde_json::Value, BotError> {
    let mut map = serde_json::Map::new();
    for field in fields {
        let (key, value) = field
            .split_once('=')
            .filter(|(key, _)| !key.is_empty())
            .ok_or_else(|| BotError::Other(format!("Expected key=value, got '{}'", field)))?;
        map.insert(key.to_string(), serde_json::Value::String(value.to_string()));
    }
    Ok(serde_json::Value::Object(map))
}

fn node_label(node: &Node) -> String {
    let marker = if node.is_folder() { "+" } else { "-" };
    let name = if node.title().is_empty() { node.uuid() } else { node.title() };
    format!("{} {} [{}]", marker, name, node.uuid())
}

fn print_forest(forest: &Forest) {
    for (depth, node) in forest.walk() {
        println!("{}{}", "  ".repeat(depth), node_label(node));
    }
    if !forest.is_complete() {
        println!();
        println!("Unplaced ({}):", forest.orphans().len());
        for node in forest.orphans() {
            println!("  {} (parent {})", node_label(node), node.parent_uuid());
        }
    }
}

/// Config written by `login --save`: the merged settings with the new token.
/// The password is only kept when the file already stored it.
fn config_to_save(stored: &BotConfig, merged: &BotConfig, token: Option<&str>) -> BotConfig {
    BotConfig {
        token: token.map(str::to_string),
        password: stored.password.clone(),
        ..merged.clone()
    }
}

fn print_result(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{}", value),
    }
}

async fn run(cli: &Cli) -> Result<(), BotError> {
    let bot_config = cli.bot_config();
    config::validate_config(&bot_config)?;
    let has_token = bot_config.token.as_deref().is_some_and(|t| !t.is_empty());
    let transport = match cli.command {
        Commands::Login { .. } => HttpTransport::login(&bot_config).await?,
        _ if has_token => HttpTransport::from_config(&bot_config)?,
        _ => HttpTransport::login(&bot_config).await?,
    };

    match &cli.command {
        Commands::Tree => {
            let forest = Forest::fetch(&transport).await?;
            print_forest(&forest);
        }
        Commands::Rm { uuid } => print_result(&remote::delete(&transport, uuid).await?),
        Commands::Edit { uuid, fields } => {
            let options = parse_fields(fields)?;
            print_result(&remote::edit(&transport, uuid, options).await?);
        }
        Commands::Mv { uuid, parent } => {
            print_result(&remote::move_entry(&transport, uuid, parent.as_deref()).await?)
        }
        Commands::Mkdir { name, parent } => print_result(
            &remote::add_folder(&transport, name.as_deref(), parent.as_deref()).await?,
        ),
        Commands::Rename { folder_uuid, name } => {
            print_result(&remote::rename_folder(&transport, name, folder_uuid).await?)
        }
        Commands::Login { save } => {
            println!("Logged in to {}", bot_config.url);
            if *save {
                let path = cli.config.clone().unwrap_or_else(config::config_path);
                let stored = config::load_bot_config_from(&path);
                let saved = config_to_save(&stored, &bot_config, transport.token());
                config::save_bot_config_to(&saved, &path)?;
                println!("Token saved to {}", path.display());
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fields() {
        let fields = vec!["title=Song".to_string(), "artist=A=B".to_string()];
        let value = parse_fields(&fields).unwrap();
        assert_eq!(value, serde_json::json!({"title": "Song", "artist": "A=B"}));

        assert!(parse_fields(&["novalue".to_string()]).is_err());
        assert!(parse_fields(&["=x".to_string()]).is_err());
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli =
            Cli::try_parse_from(["musicbot-cli", "mv", "f1", "--url", "http://bot:8087"]).unwrap();
        assert!(matches!(&cli.command, Commands::Mv { uuid, parent: None } if uuid == "f1"));
        assert_eq!(cli.url.as_deref(), Some("http://bot:8087"));

        let cli = Cli::try_parse_from(["musicbot-cli", "mkdir", "--parent", "A"]).unwrap();
        assert!(matches!(
            &cli.command,
            Commands::Mkdir { name: None, parent: Some(p) } if p == "A"
        ));
    }

    #[test]
    fn test_saved_config_drops_command_line_password() {
        let stored = BotConfig {
            url: "http://bot:8087".to_string(),
            username: Some("admin".to_string()),
            ..BotConfig::default()
        };
        let merged = BotConfig {
            password: Some("secret".to_string()),
            token: Some("stale".to_string()),
            ..stored.clone()
        };

        let saved = config_to_save(&stored, &merged, Some("fresh"));
        assert_eq!(saved.password, None);
        assert_eq!(saved.token.as_deref(), Some("fresh"));
        assert_eq!(saved.username.as_deref(), Some("admin"));
    }

    #[test]
    fn test_saved_config_keeps_file_password() {
        let stored = BotConfig {
            url: "http://bot:8087".to_string(),
            password: Some("from-file".to_string()),
            ..BotConfig::default()
        };
        let merged = BotConfig {
            password: Some("from-flag".to_string()),
            ..stored.clone()
        };

        let saved = config_to_save(&stored, &merged, Some("fresh"));
        assert_eq!(saved.password.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_login_save_round_trip_leaves_no_flag_password() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let cli = Cli::try_parse_from([
            "musicbot-cli",
            "login",
            "--save",
            "--config",
            path.to_str().unwrap(),
            "--url",
            "http://bot:8087",
            "--user",
            "admin",
            "--password",
            "secret",
        ])
        .unwrap();

        let merged = cli.bot_config();
        assert_eq!(merged.password.as_deref(), Some("secret"));
        let stored = config::load_bot_config_from(&path);
        config::save_bot_config_to(&config_to_save(&stored, &merged, Some("fresh")), &path)
            .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("secret"));
        let reloaded = config::load_bot_config_from(&path);
        assert_eq!(reloaded.token.as_deref(), Some("fresh"));
        assert_eq!(reloaded.username.as_deref(), Some("admin"));
    }
}
