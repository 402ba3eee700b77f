use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use kanal::{AsyncReceiver, AsyncSender};
use qrtools_types::AppEvent;
use tokio_util::sync::CancellationToken;

use crate::events::event_loop;
use crate::io::watcher_io;
use crate::present::ResultRequest;
use crate::state::AppState;

/// How often the hotkey queue and the config file are checked
pub const WATCH_INTERVAL: Duration = Duration::from_millis(50);

/// Drives the hotkey listener: watcher and event loop share one thread
pub struct AppController {
    channel: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    state: Arc<AppState>,
    request: ResultRequest,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>, request: ResultRequest) -> Self {
        Self {
            channel: kanal::bounded_async(16),
            state,
            request,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Run until the watcher fails or `shutdown` resolves.
    ///
    /// On shutdown a `Shutdown` event is queued behind anything already
    /// pending, and the event loop drains up to it before returning.
    pub async fn run(&self, shutdown: impl Future<Output = ()>) -> anyhow::Result<()> {
        let watcher = watcher_io(
            self.state.clone(),
            WATCH_INTERVAL,
            self.cancel_token.child_token(),
            self.channel.0.clone(),
        );
        let events = event_loop(self.state.clone(), self.channel.1.clone(), &self.request);
        let stop = async {
            shutdown.await;
            tracing::info!("Shutdown requested");
            self.channel.0.send(AppEvent::Shutdown).await
        };
        tokio::pin!(watcher, events, stop);

        let result = tokio::select! {
            biased;
            sent = &mut stop => match sent {
                Ok(()) => events.await,
                Err(e) => Err(e.into()),
            },
            result = &mut events => result,
            result = &mut watcher => {
                if result.is_ok() {
                    tracing::warn!("watcher exited");
                }
                result
            }
        };

        self.shutdown();
        result
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
