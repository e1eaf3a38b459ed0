use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use htmltutor::auth::AuthFlow;
use htmltutor::backend::SupabaseClient;
use htmltutor::commands;
use htmltutor::config::Config;
use htmltutor::conversation::{ConversationController, ReplyEngine};
use htmltutor::events::ModelChoice;
use htmltutor::llm::DeepSeekClient;
use htmltutor::recovery::RecoveryLink;
use htmltutor::session::SessionState;
use htmltutor::storage::SessionStore;
use htmltutor::ui::App;

#[derive(Parser)]
#[command(name = "htmltutor")]
#[command(version)]
#[command(about = "Chat with a friendly tutor while learning HTML", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Reply strategy: local or deepseek
    #[arg(long)]
    model: Option<ModelChoice>,

    /// Password-recovery link from the reset email
    #[arg(long)]
    recovery_link: Option<String>,

    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the stored conversation of the signed-in account
    History,
    /// Sign out and forget the saved session
    Logout,
    /// Create an account with email and password
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Show the resolved configuration
    Config {
        /// Write a config file with defaults if none exists
        #[arg(long)]
        init: bool,
    },
}

/// The TUI owns stdout, so logs go to a daily file under the app home
fn init_logging(config: &Config, verbose: u8) -> WorkerGuard {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let appender = tracing_appender::rolling::daily(config.log_dir(), "htmltutor.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .init();

    guard
}

async fn launch_tui(
    config: Config,
    model: Option<ModelChoice>,
    recovery_link: Option<String>,
) -> Result<()> {
    let store = SessionStore::new(config.session_path());
    let restored = store.load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring unreadable session file");
        None
    });
    let sessions = SessionState::new(restored);
    let persister = store.spawn_persister(sessions.handle());

    let supabase = Arc::new(SupabaseClient::new(&config.supabase, sessions.clone())?);

    let mut recovery = false;
    if let Some(link) = recovery_link {
        match RecoveryLink::parse(&link)? {
            Some(parsed) => {
                tracing::info!(address = %parsed.address, "opened from recovery link");
                if let Some(token) = &parsed.access_token {
                    if let Err(e) = supabase
                        .restore_from_tokens(token, parsed.refresh_token.clone())
                        .await
                    {
                        tracing::warn!(error = %e, "recovery link session rejected");
                    }
                }
                recovery = true;
            }
            None => tracing::warn!("link carries no recovery data"),
        }
    }

    let completion = Arc::new(DeepSeekClient::new(
        config.deepseek.clone(),
        config.deepseek_api_key.clone(),
    ));
    let conversation = ConversationController::new(
        sessions.handle(),
        supabase.clone(),
        ReplyEngine::new(completion),
        model.unwrap_or(config.default_model),
    );
    let auth = AuthFlow::new(supabase.clone());

    let mut app = App::new(conversation, auth, sessions.handle(), config.has_api_key());
    if recovery {
        app.open_recovery();
    }
    if !config.has_backend() {
        app.notify("未配置 Supabase，登录和历史记录不可用（运行 htmltutor config 查看）");
    }

    let result = app.run().await;

    // Let the last session change reach disk
    drop(app);
    drop(supabase);
    drop(sessions);
    let _ = tokio::time::timeout(Duration::from_secs(2), persister).await;

    result
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    let _guard = init_logging(&config, cli.verbose);
    tracing::debug!(
        path = %config.config_path().display(),
        backend = config.has_backend(),
        api_key = config.has_api_key(),
        "configuration loaded"
    );

    match cli.command {
        None => launch_tui(config, cli.model, cli.recovery_link).await,
        Some(Commands::History) => commands::show_history(&config).await,
        Some(Commands::Logout) => commands::logout(&config).await,
        Some(Commands::Signup { email, password }) => {
            commands::signup(&config, &email, &password).await
        }
        Some(Commands::Config { init }) => commands::show_config(&config, init),
    }
}
