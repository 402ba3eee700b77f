use std::sync::Arc;
use std::time::Duration;

use qrtools_config::ScannerMode;
use qrtools_types::{AppEvent, TriggerSource};
use tokio::time::timeout;

use super::state_with_config;
use crate::events::event_loop;
use crate::present::ResultRequest;

#[tokio::test]
async fn test_event_loop_stops_on_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let state = Arc::new(state_with_config(dir.path(), "ScannerMode=2\n"));
    let (tx, rx) = kanal::bounded_async(16);

    tx.send(AppEvent::ConfigChanged).await.unwrap();
    tx.send(AppEvent::Shutdown).await.unwrap();

    let request = ResultRequest::default();
    let result = timeout(Duration::from_secs(2), event_loop(state, rx, &request)).await;
    assert!(matches!(result, Ok(Ok(()))));
}

#[tokio::test]
async fn test_event_loop_ends_when_senders_drop() {
    let dir = tempfile::tempdir().unwrap();
    let state = Arc::new(state_with_config(dir.path(), ""));
    let (tx, rx) = kanal::bounded_async::<AppEvent>(16);
    drop(tx);

    let request = ResultRequest::default();
    let result = timeout(Duration::from_secs(2), event_loop(state, rx, &request)).await;
    assert!(matches!(result, Ok(Err(_))));
}

#[cfg(not(windows))]
#[tokio::test]
async fn test_failed_scan_does_not_stop_loop() {
    let dir = tempfile::tempdir().unwrap();
    let state = Arc::new(state_with_config(dir.path(), "ScannerMode=2\n"));
    assert_eq!(
        state.config.read().await.scanner.mode,
        ScannerMode::AutomaticDetection
    );

    let (tx, rx) = kanal::bounded_async(16);
    // No capture backend off Windows, so the scan errors out
    tx.send(AppEvent::TriggerScan(TriggerSource::Hotkey))
        .await
        .unwrap();
    tx.send(AppEvent::Shutdown).await.unwrap();

    let request = ResultRequest::default();
    let result = timeout(Duration::from_secs(2), event_loop(state, rx, &request)).await;
    assert!(matches!(result, Ok(Ok(()))));
}
