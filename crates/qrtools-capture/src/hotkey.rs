use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState, hotkey::HotKey};
use qrtools_config::{ModifierKey, ScannerConfig};

use crate::error::HotkeyError;

/// `RegisterHotKey` modifier flags
pub const MOD_ALT: u32 = 0x0001;
pub const MOD_CONTROL: u32 = 0x0002;
pub const MOD_SHIFT: u32 = 0x0004;
pub const MOD_WIN: u32 = 0x0008;

/// OS modifier bitmask for a set of modifier keys
pub fn modifiers_to_bits(modifiers: &[ModifierKey]) -> u32 {
    modifiers.iter().fold(0, |bits, modifier| {
        bits | match modifier {
            ModifierKey::Alt => MOD_ALT,
            ModifierKey::Control => MOD_CONTROL,
            ModifierKey::Shift => MOD_SHIFT,
            ModifierKey::Windows => MOD_WIN,
        }
    })
}

/// A key plus modifiers, as configured for the scan hotkey
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyBinding {
    hotkey: HotKey,
    modifier_bits: u32,
}

impl HotkeyBinding {
    /// Build from a key name (`Q`, `KeyQ`, `F9`, `Space`, ...) and modifiers
    pub fn new(key: &str, modifiers: &[ModifierKey]) -> Result<Self, HotkeyError> {
        let key = key.trim();
        if key.is_empty() || key.contains('+') {
            return Err(HotkeyError::InvalidBinding(key.to_string()));
        }

        let mut parts: Vec<&str> = modifiers
            .iter()
            .map(|modifier| match modifier {
                ModifierKey::Alt => "alt",
                ModifierKey::Control => "control",
                ModifierKey::Shift => "shift",
                ModifierKey::Windows => "super",
            })
            .collect();
        parts.push(key);

        let accelerator = parts.join("+");
        let hotkey: HotKey = accelerator
            .parse()
            .map_err(|_| HotkeyError::InvalidBinding(accelerator.clone()))?;

        Ok(Self {
            hotkey,
            modifier_bits: modifiers_to_bits(modifiers),
        })
    }

    pub fn from_config(config: &ScannerConfig) -> Result<Self, HotkeyError> {
        Self::new(&config.hotkey, &config.hotkey_modifiers)
    }

    pub fn id(&self) -> u32 {
        self.hotkey.id()
    }

    pub fn modifier_bits(&self) -> u32 {
        self.modifier_bits
    }

    /// Human-readable form, e.g. `Control+Alt+KeyQ`
    pub fn display_name(&self) -> String {
        let mut parts = Vec::new();
        if self.modifier_bits & MOD_CONTROL != 0 {
            parts.push("Control".to_string());
        }
        if self.modifier_bits & MOD_ALT != 0 {
            parts.push("Alt".to_string());
        }
        if self.modifier_bits & MOD_SHIFT != 0 {
            parts.push("Shift".to_string());
        }
        if self.modifier_bits & MOD_WIN != 0 {
            parts.push("Windows".to_string());
        }
        parts.push(format!("{:?}", self.hotkey.key));
        parts.join("+")
    }
}

/// Owns the process-wide scan hotkey registration.
///
/// At most one binding is live at a time. Dropping the registrar releases it.
pub struct HotkeyRegistrar {
    manager: GlobalHotKeyManager,
    active: Option<HotkeyBinding>,
}

impl HotkeyRegistrar {
    pub fn new() -> Result<Self, HotkeyError> {
        let manager =
            GlobalHotKeyManager::new().map_err(|e| HotkeyError::Manager(e.to_string()))?;
        Ok(Self {
            manager,
            active: None,
        })
    }

    /// Bind `binding`, releasing any previous binding first
    pub fn register(&mut self, binding: HotkeyBinding) -> Result<u32, HotkeyError> {
        self.unregister();

        self.manager
            .register(binding.hotkey)
            .map_err(|e| HotkeyError::RegistrationFailed {
                binding: binding.display_name(),
                reason: e.to_string(),
            })?;

        tracing::info!("Scan hotkey registered ({})", binding.display_name());
        self.active = Some(binding);
        Ok(binding.id())
    }

    /// Release the live binding; a no-op when nothing is registered
    pub fn unregister(&mut self) {
        if let Some(binding) = self.active.take() {
            match self.manager.unregister(binding.hotkey) {
                Ok(()) => tracing::debug!("Scan hotkey released ({})", binding.display_name()),
                Err(e) => tracing::warn!("Failed to release hotkey: {}", e),
            }
        }
    }

    pub fn active(&self) -> Option<&HotkeyBinding> {
        self.active.as_ref()
    }

    /// Drain pending hotkey events (non-blocking).
    ///
    /// Returns true if the live binding was pressed since the last poll.
    pub fn poll(&self) -> bool {
        pump_messages();

        let Some(binding) = self.active else {
            return false;
        };

        let receiver = GlobalHotKeyEvent::receiver();
        let mut pressed = false;
        while let Ok(event) = receiver.try_recv() {
            if event.id != binding.id() {
                tracing::debug!("Hotkey event for foreign id {}", event.id);
                continue;
            }
            if event.state == HotKeyState::Pressed {
                pressed = true;
            }
        }
        pressed
    }
}

impl Drop for HotkeyRegistrar {
    fn drop(&mut self) {
        self.unregister();
    }
}

/// Hotkey messages are posted to this thread's queue and must be dispatched
#[cfg(windows)]
fn pump_messages() {
    use windows::Win32::UI::WindowsAndMessaging::{
        DispatchMessageW, MSG, PM_REMOVE, PeekMessageW, TranslateMessage,
    };

    let mut msg = MSG::default();
    unsafe {
        while PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }
}

#[cfg(not(windows))]
fn pump_messages() {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers_to_bits() {
        assert_eq!(modifiers_to_bits(&[ModifierKey::Alt]), 0x0001);
        assert_eq!(modifiers_to_bits(&[ModifierKey::Control]), 0x0002);
        assert_eq!(modifiers_to_bits(&[ModifierKey::Shift]), 0x0004);
        assert_eq!(modifiers_to_bits(&[ModifierKey::Windows]), 0x0008);
        assert_eq!(
            modifiers_to_bits(&[ModifierKey::Alt, ModifierKey::Control]),
            0x0003
        );
        assert_eq!(
            modifiers_to_bits(&[
                ModifierKey::Alt,
                ModifierKey::Control,
                ModifierKey::Shift,
                ModifierKey::Windows
            ]),
            0x000F
        );
        assert_eq!(modifiers_to_bits(&[]), 0);
    }

    #[test]
    fn test_binding_from_default_config() {
        let binding = HotkeyBinding::from_config(&ScannerConfig::default()).unwrap();
        assert_eq!(binding.modifier_bits(), MOD_CONTROL | MOD_ALT);
        assert_eq!(binding.display_name(), "Control+Alt+KeyQ");
    }

    #[test]
    fn test_binding_key_name_forms() {
        let short = HotkeyBinding::new("S", &[ModifierKey::Control]).unwrap();
        let long = HotkeyBinding::new("KeyS", &[ModifierKey::Control]).unwrap();
        assert_eq!(short.id(), long.id());

        assert!(HotkeyBinding::new("F9", &[]).is_ok());
    }

    #[test]
    fn test_binding_rejects_garbage() {
        assert!(HotkeyBinding::new("", &[ModifierKey::Alt]).is_err());
        assert!(HotkeyBinding::new("NotAKey", &[ModifierKey::Alt]).is_err());
        assert!(HotkeyBinding::new("ctrl+Q", &[]).is_err());
    }

    #[test]
    fn test_same_combination_same_id() {
        let a = HotkeyBinding::new("Q", &[ModifierKey::Control, ModifierKey::Alt]).unwrap();
        let b = HotkeyBinding::new("q", &[ModifierKey::Alt, ModifierKey::Control]).unwrap();
        assert_eq!(a.id(), b.id());
        assert_eq!(a, b);
    }
}
