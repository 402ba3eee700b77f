use std::sync::Arc;

use kanal::AsyncReceiver;
use qrtools_types::AppEvent;

use crate::present::ResultRequest;
use crate::state::AppState;

pub mod generate;
pub mod options;
pub mod scan;

use scan::handle_scan_trigger;

/// Listener's main loop. Returns once a `Shutdown` event arrives.
pub async fn event_loop(
    state: Arc<AppState>,
    rx: AsyncReceiver<AppEvent>,
    request: &ResultRequest,
) -> anyhow::Result<()> {
    tracing::debug!("[EVENT_LOOP] Waiting for events");
    loop {
        let event = rx.recv().await?;
        tracing::debug!("[EVENT_LOOP] Received {:?}", event);

        if !handle_events(&state, request, event).await {
            tracing::info!("[EVENT_LOOP] Stopping");
            return Ok(());
        }
    }
}

/// Per-action failures are reported here and never end the loop
async fn handle_events(state: &AppState, request: &ResultRequest, event: AppEvent) -> bool {
    match event {
        AppEvent::TriggerScan(source) => {
            if let Err(e) = handle_scan_trigger(state, source, None, request).await {
                tracing::error!("Scan failed: {:#}", e);
                eprintln!("Scan failed: {e:#}");
            }
        }
        AppEvent::ConfigChanged => {
            let config = state.config.read().await;
            tracing::info!(
                "Config reloaded, scanner mode is now {:?}",
                config.scanner.mode
            );
        }
        AppEvent::Shutdown => return false,
    }

    true
}
