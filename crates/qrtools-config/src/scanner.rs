use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a scan session picks the screen region to decode
///
/// Persisted as its ordinal so existing `config.ini` files stay readable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScannerMode {
    DrawBox,
    #[default]
    TargetingRectangle,
    AutomaticDetection,
}

impl ScannerMode {
    pub fn ordinal(self) -> u8 {
        match self {
            ScannerMode::DrawBox => 0,
            ScannerMode::TargetingRectangle => 1,
            ScannerMode::AutomaticDetection => 2,
        }
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            0 => Some(ScannerMode::DrawBox),
            1 => Some(ScannerMode::TargetingRectangle),
            2 => Some(ScannerMode::AutomaticDetection),
            _ => None,
        }
    }
}

impl FromStr for ScannerMode {
    type Err = ();

    /// Accepts the ordinal or the variant name, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(ordinal) = s.parse::<u8>() {
            return Self::from_ordinal(ordinal).ok_or(());
        }

        match s.to_ascii_lowercase().as_str() {
            "drawbox" | "draw-box" => Ok(ScannerMode::DrawBox),
            "targetingrectangle" | "targeting" => Ok(ScannerMode::TargetingRectangle),
            "automaticdetection" | "automatic" => Ok(ScannerMode::AutomaticDetection),
            _ => Err(()),
        }
    }
}

/// Modifier names accepted in `ScanHotkeyModifiers`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierKey {
    Alt,
    Control,
    Shift,
    Windows,
}

impl FromStr for ModifierKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alt" => Ok(ModifierKey::Alt),
            "control" | "ctrl" => Ok(ModifierKey::Control),
            "shift" => Ok(ModifierKey::Shift),
            "windows" | "win" | "super" | "meta" => Ok(ModifierKey::Windows),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ModifierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModifierKey::Alt => "Alt",
            ModifierKey::Control => "Control",
            ModifierKey::Shift => "Shift",
            ModifierKey::Windows => "Windows",
        };
        f.write_str(name)
    }
}

/// Split a modifier list on commas, plus signs or whitespace.
///
/// Returns `None` when any token is not a modifier name. Duplicates collapse.
pub fn parse_modifiers(value: &str) -> Option<Vec<ModifierKey>> {
    let mut modifiers = Vec::new();
    for token in value
        .split(|c: char| c == ',' || c == '+' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        let modifier = token.parse::<ModifierKey>().ok()?;
        if !modifiers.contains(&modifier) {
            modifiers.push(modifier);
        }
    }
    Some(modifiers)
}

pub fn format_modifiers(modifiers: &[ModifierKey]) -> String {
    modifiers
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn default_mode() -> ScannerMode {
    ScannerMode::default()
}

fn default_hotkey() -> String {
    "Q".to_string()
}

fn default_hotkey_modifiers() -> Vec<ModifierKey> {
    vec![ModifierKey::Control, ModifierKey::Alt]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerConfig {
    pub mode: ScannerMode,
    /// Key name of the global scan hotkey (`Q`, `F9`, `KeyQ`, ...)
    pub hotkey: String,
    pub hotkey_modifiers: Vec<ModifierKey>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            hotkey: default_hotkey(),
            hotkey_modifiers: default_hotkey_modifiers(),
        }
    }
}
