use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use popword_config::Config;
use tokio::signal;
use tracing_subscriber::EnvFilter;

pub mod bridge;
pub mod controller;
pub mod messages;
pub mod state;

use self::controller::AppController;
use self::state::AppState;

/// Translation host for the popword browser extension.
///
/// Reads one JSON request per line on stdin and writes replies and
/// notifications one per line on stdout. Logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "popword", version)]
struct Args {
    /// Preferences file shared with the options page
    #[arg(long, default_value = "popword-prefs.json")]
    prefs: PathBuf,

    /// Log as JSON instead of plain text
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    init_tracing(args.log_json);

    let state = Arc::new(AppState::new(Config::new(), &args.prefs)?);
    let config = &state.config;
    tracing::info!(
        "starting: translate via {}, dictionary {} ({}), overlap policy {}, prefs {}",
        config.translator.api_url,
        if config.dictionary.enabled { "on" } else { "off" },
        config.dictionary.api_url,
        config.router.overlap_policy,
        args.prefs.display()
    );

    let controller = AppController::new(state);
    let mut tasks = controller.spawn_tasks();

    tokio::select! {
        result = signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!("failed to listen for ctrl+c: {e}");
            }
            tracing::info!("Shutdown requested");
            controller.shutdown();
        }
        Some(joined) = tasks.join_next() => {
            match joined {
                Ok(Ok(())) => tracing::info!("bridge exited"),
                Ok(Err(e)) => tracing::error!("bridge exited: {e}"),
                Err(e) => tracing::error!("bridge task panicked: {e}"),
            }
            controller.shutdown();
        }
    }

    while let Some(joined) = tasks.join_next().await {
        if let Ok(Err(e)) = joined {
            tracing::warn!("task ended with error during shutdown: {e}");
        }
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.with_ansi(atty::is(atty::Stream::Stderr)).init();
    }
}
