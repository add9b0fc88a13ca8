//! FLOW8 Remote - console control surface for the Behringer FLOW 8

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use flow8_remote::cli::{self, Command};
use flow8_remote::clock::SystemClock;
use flow8_remote::config::AppConfig;
use flow8_remote::device::{DeviceSession, MidirBackend, OutputBackend};
use flow8_remote::panel::Panel;
use flow8_remote::paths::AppPaths;
use flow8_remote::state::SledStore;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// FLOW8 Remote - drive a Behringer FLOW 8 mixer over MIDI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (defaults to the app data directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// List available MIDI output ports and exit
    #[arg(long)]
    list_ports: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let paths = AppPaths::detect();
    paths.ensure_directories()?;
    let _log_guard = init_logging(&args.log_level, &paths.logs_dir)?;

    let config_path = args.config.clone().unwrap_or_else(|| paths.config.clone());
    let config = AppConfig::load_or_default(&config_path).await?;

    if args.list_ports {
        list_ports(&config);
        return Ok(());
    }

    info!("Starting FLOW8 Remote v{}...", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {} ({:?})", paths.base_dir().display(), paths.mode);
    info!("Configuration file: {}", config_path.display());

    run_app(config, &paths.scene_db_path()).await
}

async fn run_app(config: AppConfig, scene_db: &Path) -> Result<()> {
    let backend = MidirBackend::new(&config.midi.client_name);
    let mut session = DeviceSession::new(Box::new(backend), &config.midi.product_match);
    if let Some(port) = &config.midi.output_port {
        if let Err(e) = session.select(port) {
            warn!("Configured output '{}' unavailable: {}", port, e);
        }
    }

    let store = SledStore::open(scene_db)
        .with_context(|| format!("Failed to open scene store at {}", scene_db.display()))?;

    let mut panel = Panel::new(
        session,
        Box::new(store),
        Box::new(SystemClock),
        config.panel_settings(),
    );
    panel.subscribe(Box::new(cli::print_event));
    panel.start();

    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(32);
    let _repl = cli::spawn_repl(cmd_tx);

    let mut ticker = tokio::time::interval(config.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    info!("Ready, type 'help' for commands");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                panel.tick();
            }

            // Disabled once the console is gone; CTRL+C still works then
            Some(cmd) = cmd_rx.recv() => {
                if cmd == Command::Quit {
                    break;
                }
                if let Err(e) = cli::execute(&mut panel, cmd) {
                    println!("{}", e.to_string().red());
                }
            }

            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping event loop");
                break;
            }
        }
    }

    panel.flush();
    info!("FLOW8 Remote stopped");
    Ok(())
}

fn list_ports(config: &AppConfig) {
    let backend = MidirBackend::new(&config.midi.client_name);
    match backend.port_names() {
        Ok(ports) => {
            let choice = DeviceSession::auto_choice(&ports, &config.midi.product_match);
            cli::print_ports(&ports, choice.map(String::as_str));
        }
        Err(e) => error!("MIDI failed: {}", e),
    }
}

/// Console output plus a daily log file. The returned guard flushes the
/// file writer when dropped.
fn init_logging(level: &str, logs_dir: &Path) -> Result<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let file_appender = tracing_appender::rolling::daily(logs_dir, "flow8-remote.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for CTRL+C: {}", e);
        std::future::pending::<()>().await;
    }
}
