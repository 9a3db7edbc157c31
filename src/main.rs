// ABOUTME: Entry point for parley — a terminal chat with replay or checkpointed history.
// ABOUTME: Loads env and config, applies CLI overrides, sets up logging, and runs the app.

use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use parley::app::App;
use parley::cli::Cli;
use parley::config::{Config, MODEL_ENV_VAR};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr so they never interleave with the chat.
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load local .env if present, then user-level secrets.
    let _ = dotenvy::dotenv();
    let _ = dotenvy::from_path(Config::secrets_env_path());

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_env_model(std::env::var(MODEL_ENV_VAR).ok().as_deref())?;
    cli.apply(&mut config)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(App::new(config, cli.thread.clone()).run())
}
