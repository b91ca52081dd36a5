mod logging;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use auth_session::{
    get_user, get_user_error, get_user_is_loading, mask_token, AuthStore, Config, Credentials,
    FilePart, Notifier, Registration, Session, UserChanges,
};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "auth-cli")]
#[command(about = "Manage the persisted authentication session")]
#[command(version)]
struct Cli {
    /// Backend base URL (overrides config.toml and AUTH_API_BASE)
    #[arg(long)]
    api_base: Option<String>,

    /// Directory holding the persisted session
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and sign in
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: Option<String>,
        /// Extra profile field, as key=value
        #[arg(long = "field", value_parser = parse_key_val)]
        fields: Vec<(String, String)>,
    },
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Show the persisted session
    Whoami,
    /// Refresh a user from the backend
    Fetch {
        id: String,
    },
    /// Update a user's profile
    Update {
        id: String,
        /// Changed field, as key=value
        #[arg(long = "field", value_parser = parse_key_val)]
        fields: Vec<(String, String)>,
        /// Profile image to upload
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Forget the persisted session
    Logout,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {s:?}"))?;
    if key.is_empty() {
        return Err(format!("empty key in {s:?}"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn mime_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn confirm(&self, message: &str) {
        eprintln!("{}", message.green());
    }

    fn error(&self, title: &str, message: &str) {
        eprintln!("{} {}", title.red().bold(), message);
    }
}

#[derive(Serialize)]
struct SessionView<'a> {
    user: Option<&'a serde_json::Map<String, serde_json::Value>>,
    token: Option<String>,
    expires_at: Option<String>,
    expired: bool,
    loading: bool,
    error: Option<&'a str>,
}

impl<'a> SessionView<'a> {
    fn from_session(session: &'a Session, now: DateTime<Utc>) -> Self {
        let user = get_user(session);
        SessionView {
            user: user.map(|claims| claims.as_map()),
            token: session.token.as_deref().map(mask_token),
            expires_at: user
                .and_then(|claims| claims.expires_at())
                .map(|exp| exp.to_rfc3339()),
            expired: user.map(|claims| claims.is_expired(now)).unwrap_or(false),
            loading: get_user_is_loading(session),
            error: get_user_error(session),
        }
    }
}

fn build_config(cli: &Cli) -> Config {
    let mut config = Config::new();
    if let Some(api_base) = &cli.api_base {
        config = config.with_api_base(api_base.clone());
    }
    if let Some(dir) = &cli.data_dir {
        config = config.with_app_data_dir(dir.clone());
    }
    config
}

async fn run(store: &AuthStore, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Register {
            email,
            password,
            name,
            fields,
        } => {
            let extra = fields
                .into_iter()
                .map(|(key, value)| (key, serde_json::Value::String(value)))
                .collect();
            let registration = Registration {
                email,
                password,
                name,
                extra,
            };
            store.user_register(&registration).await?;
        }
        Commands::Login { email, password } => {
            store.user_login(&Credentials { email, password }).await?;
        }
        Commands::Whoami => {}
        Commands::Fetch { id } => {
            store.get_user_by_id(&id).await?;
        }
        Commands::Update { id, fields, image } => {
            let mut changes = UserChanges::new();
            for (key, value) in fields {
                changes = changes.field(key, value);
            }
            if let Some(path) = image {
                let bytes = tokio::fs::read(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let file_name = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .unwrap_or("image")
                    .to_string();
                changes = changes.file(FilePart {
                    field: "image".to_string(),
                    file_name,
                    mime: Some(mime_for(&path).to_string()),
                    bytes,
                });
            }
            if changes.is_empty() {
                anyhow::bail!("nothing to update: pass --field or --image");
            }
            store.update_user(&id, changes).await?;
        }
        Commands::Logout => {
            store.logout().await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.debug);

    let config = build_config(&cli);
    log::debug!("Using config: {config:?}");
    let store = AuthStore::from_config_with_notifier(&config, Arc::new(ConsoleNotifier))?;

    if let Some(user) = store.restore_from_storage().await? {
        log::info!("Restored session for {}", user.id().unwrap_or_default());
    }

    let outcome = run(&store, cli.command).await;

    let session = store.snapshot().await;
    println!(
        "{}",
        serde_json::to_string_pretty(&SessionView::from_session(&session, Utc::now()))?
    );

    outcome
}
