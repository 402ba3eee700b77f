use std::cell::Cell;
use std::path::Path;
use std::time::{Duration, SystemTime};

use qrtools_capture::{HotkeyBinding, HotkeyError};
use qrtools_config::{ModifierKey, ScannerConfig, ScannerMode};
use qrtools_types::{AppEvent, TriggerSource};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use super::state_with_config;
use crate::io::{ScanHotkey, rebind_target, watch, watch_step};

/// Stands in for the OS registrar and records every registration
#[derive(Default)]
struct FakeHotkey {
    active: Option<HotkeyBinding>,
    registered: Vec<HotkeyBinding>,
    refuse: bool,
    pressed: Cell<bool>,
}

impl ScanHotkey for FakeHotkey {
    fn active(&self) -> Option<&HotkeyBinding> {
        self.active.as_ref()
    }

    fn register(&mut self, binding: HotkeyBinding) -> Result<u32, HotkeyError> {
        self.active = None;
        self.registered.push(binding);
        if self.refuse {
            return Err(HotkeyError::RegistrationFailed {
                binding: binding.display_name(),
                reason: "already taken".to_string(),
            });
        }
        self.active = Some(binding);
        Ok(binding.id())
    }

    fn poll(&self) -> bool {
        self.pressed.replace(false)
    }
}

fn default_binding() -> HotkeyBinding {
    HotkeyBinding::from_config(&ScannerConfig::default()).unwrap()
}

/// Rewrite the config and push its mtime forward so the edit is always seen
fn edit_config(path: &Path, contents: &str) {
    std::fs::write(path, contents).unwrap();
    std::fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(SystemTime::now() + Duration::from_secs(10))
        .unwrap();
}

#[test]
fn test_rebind_target_same_binding_is_noop() {
    let active = default_binding();
    assert_eq!(rebind_target(Some(&active), &ScannerConfig::default()), None);
}

#[test]
fn test_rebind_target_invalid_binding_keeps_current() {
    let active = default_binding();
    let scanner = ScannerConfig {
        hotkey: "NotAKey".to_string(),
        ..Default::default()
    };
    assert_eq!(rebind_target(Some(&active), &scanner), None);
    assert_eq!(rebind_target(None, &scanner), None);
}

#[test]
fn test_rebind_target_new_or_missing_binding() {
    let active = default_binding();
    let scanner = ScannerConfig {
        hotkey: "F9".to_string(),
        hotkey_modifiers: vec![ModifierKey::Shift],
        ..Default::default()
    };
    let expected = HotkeyBinding::new("F9", &[ModifierKey::Shift]).unwrap();

    assert_eq!(rebind_target(Some(&active), &scanner), Some(expected));
    // Nothing live yet, e.g. the first registration failed
    assert_eq!(
        rebind_target(None, &ScannerConfig::default()),
        Some(active)
    );
}

#[tokio::test]
async fn test_hotkey_press_triggers_scan() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_with_config(dir.path(), "");
    let (tx, rx) = kanal::bounded_async(16);
    let mut hotkey = FakeHotkey {
        active: Some(default_binding()),
        ..Default::default()
    };
    let mut stamp = state.config_modified();

    hotkey.pressed.set(true);
    watch_step(&state, &mut hotkey, &mut stamp, &tx).await.unwrap();
    assert!(matches!(
        rx.recv().await.unwrap(),
        AppEvent::TriggerScan(TriggerSource::Hotkey)
    ));

    watch_step(&state, &mut hotkey, &mut stamp, &tx).await.unwrap();
    assert!(rx.is_empty());
}

#[tokio::test]
async fn test_config_edit_reloads_and_rebinds() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_with_config(dir.path(), "ScannerMode=0\n");
    let (tx, rx) = kanal::bounded_async(16);
    let mut hotkey = FakeHotkey {
        active: Some(default_binding()),
        ..Default::default()
    };
    let mut stamp = state.config_modified();

    watch_step(&state, &mut hotkey, &mut stamp, &tx).await.unwrap();
    assert!(rx.is_empty());
    assert!(hotkey.registered.is_empty());

    edit_config(
        state.config_path(),
        "ScannerMode=1\nScanHotkey=F9\nScanHotkeyModifiers=Shift\n",
    );
    watch_step(&state, &mut hotkey, &mut stamp, &tx).await.unwrap();

    assert_eq!(
        state.config.read().await.scanner.mode,
        ScannerMode::TargetingRectangle
    );
    let expected = HotkeyBinding::new("F9", &[ModifierKey::Shift]).unwrap();
    assert_eq!(hotkey.registered, vec![expected]);
    assert_eq!(hotkey.active, Some(expected));
    assert!(matches!(rx.recv().await.unwrap(), AppEvent::ConfigChanged));
    assert_eq!(stamp, state.config_modified());

    // Unchanged file, nothing new
    watch_step(&state, &mut hotkey, &mut stamp, &tx).await.unwrap();
    assert!(rx.is_empty());
    assert_eq!(hotkey.registered.len(), 1);
}

#[tokio::test]
async fn test_config_edit_with_bad_hotkey_keeps_binding() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_with_config(dir.path(), "");
    let (tx, rx) = kanal::bounded_async(16);
    let mut hotkey = FakeHotkey {
        active: Some(default_binding()),
        ..Default::default()
    };
    let mut stamp = state.config_modified();

    edit_config(state.config_path(), "ScannerMode=2\nScanHotkey=NotAKey\n");
    watch_step(&state, &mut hotkey, &mut stamp, &tx).await.unwrap();

    assert!(hotkey.registered.is_empty());
    assert_eq!(hotkey.active, Some(default_binding()));
    assert!(matches!(rx.recv().await.unwrap(), AppEvent::ConfigChanged));
}

#[tokio::test]
async fn test_watch_registers_then_stops_on_cancel() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_with_config(dir.path(), "");
    let (tx, _rx) = kanal::bounded_async(16);
    let mut hotkey = FakeHotkey::default();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = timeout(
        Duration::from_secs(2),
        watch(&state, &mut hotkey, Duration::from_millis(5), cancel, &tx),
    )
    .await;

    assert!(matches!(result, Ok(Ok(()))));
    assert_eq!(hotkey.registered, vec![default_binding()]);
    assert_eq!(hotkey.active, Some(default_binding()));
}

#[tokio::test]
async fn test_watch_keeps_running_when_hotkey_is_taken() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_with_config(dir.path(), "");
    let (tx, rx) = kanal::bounded_async(16);
    let mut hotkey = FakeHotkey {
        refuse: true,
        ..Default::default()
    };

    let cancel = CancellationToken::new();
    let stopper = cancel.clone();
    let config_path = state.config_path().to_path_buf();

    let edit_then_stop = async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        edit_config(&config_path, "ScanHotkey=F9\n");
        // The edit is picked up as a config change, so the watcher is alive
        let event = timeout(Duration::from_secs(2), rx.recv()).await;
        stopper.cancel();
        event
    };

    let (watched, event) = tokio::join!(
        watch(&state, &mut hotkey, Duration::from_millis(5), cancel, &tx),
        edit_then_stop
    );

    assert!(watched.is_ok());
    assert!(matches!(event, Ok(Ok(AppEvent::ConfigChanged))));
    // First attempt refused, second attempt after the edit
    assert_eq!(hotkey.registered.len(), 2);
    assert!(hotkey.active.is_none());
}
