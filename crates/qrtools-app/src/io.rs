use std::sync::Arc;
use std::time::{Duration, SystemTime};

use kanal::AsyncSender;
use qrtools_capture::{HotkeyBinding, HotkeyError, HotkeyRegistrar};
use qrtools_config::ScannerConfig;
use qrtools_types::{AppEvent, TriggerSource};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

/// The parts of the hotkey registrar the watcher drives
pub trait ScanHotkey {
    fn active(&self) -> Option<&HotkeyBinding>;

    /// Replace the live binding. The old one is released first.
    fn register(&mut self, binding: HotkeyBinding) -> Result<u32, HotkeyError>;

    /// True if the live binding was pressed since the last call
    fn poll(&self) -> bool;
}

impl ScanHotkey for HotkeyRegistrar {
    fn active(&self) -> Option<&HotkeyBinding> {
        HotkeyRegistrar::active(self)
    }

    fn register(&mut self, binding: HotkeyBinding) -> Result<u32, HotkeyError> {
        HotkeyRegistrar::register(self, binding)
    }

    fn poll(&self) -> bool {
        HotkeyRegistrar::poll(self)
    }
}

/// Binding to register after the scanner config changed, if any.
///
/// An invalid binding keeps whatever is live, and so does an unchanged one.
pub fn rebind_target(
    active: Option<&HotkeyBinding>,
    scanner: &ScannerConfig,
) -> Option<HotkeyBinding> {
    match HotkeyBinding::from_config(scanner) {
        Ok(binding) if active == Some(&binding) => None,
        Ok(binding) => Some(binding),
        Err(e) => {
            tracing::error!("Keeping the current hotkey: {}", e);
            eprintln!("{e}, keeping the current hotkey");
            None
        }
    }
}

/// Register `binding` and tell the user how to scan, or why they can't
fn register(hotkey: &mut impl ScanHotkey, binding: HotkeyBinding, state: &AppState) {
    match hotkey.register(binding) {
        Ok(_) => eprintln!("Press {} to scan, Ctrl+C to quit", binding.display_name()),
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{e}");
            eprintln!(
                "Pick another hotkey in {} or press Ctrl+C to quit",
                state.config_path().display()
            );
        }
    }
}

/// One watcher pass: forward a hotkey press, then pick up config edits.
///
/// A changed config file is reloaded into `state`, the hotkey is moved to the
/// new binding if it differs, and `ConfigChanged` is sent.
pub async fn watch_step(
    state: &AppState,
    hotkey: &mut impl ScanHotkey,
    config_stamp: &mut Option<SystemTime>,
    event_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    if hotkey.poll() {
        tracing::info!("Scan hotkey pressed");
        event_tx
            .send(AppEvent::TriggerScan(TriggerSource::Hotkey))
            .await?;
    }

    let stamp = state.config_modified();
    if stamp != *config_stamp {
        *config_stamp = stamp;
        let config = state.reload().await;
        if let Some(binding) = rebind_target(hotkey.active(), &config.scanner) {
            register(hotkey, binding, state);
        }
        event_tx.send(AppEvent::ConfigChanged).await?;
    }

    Ok(())
}

/// Register the configured hotkey, then run [`watch_step`] every
/// `poll_interval` until `cancel` fires.
///
/// A hotkey that cannot be registered is reported and the watch goes on, so
/// fixing the config file brings scanning back.
pub async fn watch(
    state: &AppState,
    hotkey: &mut impl ScanHotkey,
    poll_interval: Duration,
    cancel: CancellationToken,
    event_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let scanner = state.config.read().await.scanner.clone();
    match HotkeyBinding::from_config(&scanner) {
        Ok(binding) => register(hotkey, binding, state),
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{e}");
        }
    }

    let mut config_stamp = state.config_modified();
    let mut interval = tokio::time::interval(poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("Hotkey watcher stopping");
                break;
            }
            _ = interval.tick() => {}
        }

        watch_step(state, hotkey, &mut config_stamp, event_tx).await?;
    }

    Ok(())
}

/// Watches the scan hotkey and the config file.
///
/// Fails only if the OS hotkey manager cannot be created.
pub async fn watcher_io(
    state: Arc<AppState>,
    poll_interval: Duration,
    cancel: CancellationToken,
    event_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let mut registrar = HotkeyRegistrar::new()?;
    watch(&state, &mut registrar, poll_interval, cancel, &event_tx).await
}
