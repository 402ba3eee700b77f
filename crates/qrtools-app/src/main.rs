mod cli;
mod controller;
mod events;
mod io;
mod present;
mod state;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use qrtools_core::OutputFormat;
use qrtools_types::TriggerSource;
use tokio::signal;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use self::cli::{Cli, Command};
use self::controller::AppController;
use self::events::generate::{GenerateRequest, run_generate};
use self::events::options::run_options;
use self::events::scan::{decode_file, handle_scan_trigger};
use self::state::AppState;

fn init_tracing(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config_path = cli
        .config
        .unwrap_or_else(qrtools_config::default_config_path);
    let state = Arc::new(AppState::load(config_path));

    // Hotkey messages and capture all stay on this thread
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    rt.block_on(run(state, cli.command))
}

async fn run(state: Arc<AppState>, command: Command) -> Result<()> {
    match command {
        Command::Generate { text, svg, output } => {
            let format = if svg {
                OutputFormat::Svg
            } else {
                OutputFormat::Png
            };
            let request = GenerateRequest {
                text,
                format,
                output,
            };
            if let Some(path) = run_generate(&state, request).await? {
                println!("{}", path.display());
            }
        }
        Command::Scan { mode, result } => {
            handle_scan_trigger(
                &state,
                TriggerSource::Command,
                mode.map(Into::into),
                &result.into(),
            )
            .await?;
        }
        Command::Decode { image, result } => {
            decode_file(&image, &result.into())?;
        }
        Command::Listen { result } => {
            let controller = AppController::new(Arc::clone(&state), result.into());

            let shutdown = async {
                if let Err(e) = signal::ctrl_c().await {
                    tracing::error!("Failed to listen for Ctrl+C: {}", e);
                    std::future::pending::<()>().await;
                }
            };

            if let Err(e) = controller.run(shutdown).await {
                tracing::error!("Listener stopped: {:#}", e);
                eprintln!("{e:#}");
                eprintln!("Scanning is still available with `qrtools scan`");
            }
        }
        Command::Options { set, json } => {
            let rendered = run_options(&state, &set, json).await?;
            print!("{rendered}");
            if json {
                println!();
            }
        }
    }

    Ok(())
}
