use anyhow::{Context, Result};
use clap::Parser;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io::Stdout, path::PathBuf, sync::Arc};
use tcord::{
    app::{App, AppContext},
    client::discord::DiscordClient,
    utils::storage::{get_app_data_path, FileStorage},
};
use tokio_util::sync::CancellationToken;

const TOKEN_ENV: &str = "TOKEN";

/// A terminal client for reading Discord.
#[derive(Parser)]
#[command(author, version)]
pub struct Args {
    /// Read config from this file instead of the default location
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Don't load guild icons or avatars
    #[arg(long)]
    no_images: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    tracing::info!(
        "Started {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    );

    let args = Args::parse();

    let token = std::env::var(TOKEN_ENV)
        .ok()
        .filter(|token| !token.trim().is_empty())
        .with_context(|| format!("Set {TOKEN_ENV} to your Discord token"))?;

    let storage = FileStorage::init(args.config)?;
    let mut config = storage.read_config().with_context(|| {
        format!("Loading config from {}", storage.config_file().display())
    })?;
    if args.no_images {
        config.images.enabled = false;
    }

    let shutdown = CancellationToken::new();
    let client = DiscordClient::connect(token, &config.client, &shutdown)
        .await
        .context("Connecting to Discord")?;
    tracing::info!("Connected");

    let context = AppContext::new(Arc::new(client), config, shutdown);
    let mut app = App::new(context);

    let mut terminal = setup_terminal()?;
    let res = app.run(&mut terminal);
    restore_terminal(terminal)?;

    app.shutdown().await;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

#[tracing::instrument(skip())]
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    tracing::debug!("Setting up terminal");

    let mut stdout = std::io::stdout();
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(
        stdout,
        crossterm::terminal::EnterAlternateScreen,
        crossterm::event::EnableFocusChange
    )?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok(terminal)
}

#[tracing::instrument(skip(terminal))]
fn restore_terminal(mut terminal: Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::event::DisableFocusChange
    )?;
    terminal.show_cursor()?;

    tracing::debug!("Terminal restored");

    Ok(())
}

/// Initializes the `tracing` system for logging.
fn init_tracing() -> Result<()> {
    let log_env = format!("{}_LOGLEVEL", env!("CARGO_PKG_NAME").to_uppercase());
    let log_filename = format!("{}.log", env!("CARGO_PKG_NAME"));

    let log_file_path = if let Ok(dir) = get_app_data_path() {
        dir.join(log_filename)
    } else {
        PathBuf::from(".").join(log_filename)
    };

    let log_file = std::fs::File::create(log_file_path)?;

    let filter = std::env::var("RUST_LOG")
        .or_else(|_| std::env::var(log_env))
        .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")));

    let subscriber = tracing_subscriber::fmt()
        .with_line_number(true)
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(log_file)
        .with_ansi(false)
        .pretty()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}
