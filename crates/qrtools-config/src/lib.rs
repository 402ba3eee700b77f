//! Flat `Key=Value` configuration store backing `config.ini`.
//!
//! Reads are fail-soft: anything missing or malformed falls back to the
//! defaults. Writes replace the whole file, one line per option in the order
//! of [`KEYS`].

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use self::error::ConfigError;
pub use self::generator::GeneratorConfig;
pub use self::scanner::{ModifierKey, ScannerConfig, ScannerMode};

mod error;
pub mod generator;
pub mod scanner;

pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "QRTOOLS_CONFIG";

pub const AUTO_SAVE_QR_CODE_NAME: &str = "AutoSaveQRCodeName";
pub const SKIP_SAVE_DIALOG: &str = "SkipSaveDialog";
pub const AUTO_SAVE_DIRECTORY: &str = "AutoSaveDirectory";
pub const APPEND_DATE: &str = "AppendDate";
pub const APPEND_TIME: &str = "AppendTime";
pub const SCANNER_MODE: &str = "ScannerMode";
pub const SCAN_HOTKEY: &str = "ScanHotkey";
pub const SCAN_HOTKEY_MODIFIERS: &str = "ScanHotkeyModifiers";

/// Recognized options in file order
pub const KEYS: [&str; 8] = [
    AUTO_SAVE_QR_CODE_NAME,
    SKIP_SAVE_DIALOG,
    AUTO_SAVE_DIRECTORY,
    APPEND_DATE,
    APPEND_TIME,
    SCANNER_MODE,
    SCAN_HOTKEY,
    SCAN_HOTKEY_MODIFIERS,
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub generator: GeneratorConfig,
    pub scanner: ScannerConfig,
}

impl Config {
    /// Parse config text, skipping malformed lines, unknown keys and bad values
    pub fn parse(text: &str) -> Self {
        let mut config = Config::default();

        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                tracing::warn!("config line {}: missing '=', skipped", number + 1);
                continue;
            };

            match config.set(key.trim(), value.trim()) {
                Ok(()) => {}
                Err(ConfigError::UnknownKey(key)) => {
                    tracing::debug!("config line {}: unknown option {key}", number + 1);
                }
                Err(e) => {
                    tracing::warn!("config line {}: {e}, keeping default", number + 1);
                }
            }
        }

        config
    }

    /// Render one `Key=Value` line per option, in [`KEYS`] order
    pub fn to_ini(&self) -> String {
        let mut out = String::new();
        for key in KEYS {
            // Every entry in KEYS is recognized by `get`
            if let Some(value) = self.get(key) {
                out.push_str(key);
                out.push('=');
                out.push_str(&value);
                out.push('\n');
            }
        }
        out
    }

    /// Current value of a recognized option, formatted as it is persisted
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            AUTO_SAVE_QR_CODE_NAME => self.generator.auto_save_name.clone(),
            SKIP_SAVE_DIALOG => self.generator.skip_save_dialog.to_string(),
            AUTO_SAVE_DIRECTORY => self.generator.auto_save_directory.display().to_string(),
            APPEND_DATE => self.generator.append_date.to_string(),
            APPEND_TIME => self.generator.append_time.to_string(),
            SCANNER_MODE => self.scanner.mode.ordinal().to_string(),
            SCAN_HOTKEY => self.scanner.hotkey.clone(),
            SCAN_HOTKEY_MODIFIERS => scanner::format_modifiers(&self.scanner.hotkey_modifiers),
            _ => return None,
        };
        Some(value)
    }

    /// Update one option from its persisted string form
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };

        match key {
            AUTO_SAVE_QR_CODE_NAME => {
                if value.is_empty() {
                    return Err(invalid());
                }
                self.generator.auto_save_name = value.to_string();
            }
            SKIP_SAVE_DIALOG => {
                self.generator.skip_save_dialog = parse_bool(value).ok_or_else(invalid)?;
            }
            AUTO_SAVE_DIRECTORY => {
                if value.is_empty() {
                    return Err(invalid());
                }
                self.generator.auto_save_directory = PathBuf::from(value);
            }
            APPEND_DATE => {
                self.generator.append_date = parse_bool(value).ok_or_else(invalid)?;
            }
            APPEND_TIME => {
                self.generator.append_time = parse_bool(value).ok_or_else(invalid)?;
            }
            SCANNER_MODE => {
                self.scanner.mode = value.parse().map_err(|_| invalid())?;
            }
            SCAN_HOTKEY => {
                if value.is_empty() {
                    return Err(invalid());
                }
                self.scanner.hotkey = value.to_string();
            }
            SCAN_HOTKEY_MODIFIERS => {
                self.scanner.hotkey_modifiers =
                    scanner::parse_modifiers(value).ok_or_else(invalid)?;
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }

        Ok(())
    }

    /// Apply a `Key=Value` assignment as typed on the command line
    pub fn apply_assignment(&mut self, assignment: &str) -> Result<(), ConfigError> {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| ConfigError::MalformedAssignment(assignment.to_string()))?;
        self.set(key.trim(), value.trim())
    }
}

/// `true`/`false` in any case, as well as `1`/`0`
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Load the config at `path`; never fails, defaults fill in anything missing
pub fn load(path: &Path) -> Config {
    match fs::read_to_string(path) {
        Ok(text) => Config::parse(&text),
        Err(e) => {
            tracing::warn!("Could not read config {}: {e}, using defaults", path.display());
            Config::default()
        }
    }
}

/// Write `defaults` to `path` when no file exists yet.
///
/// Returns whether a file was created.
pub fn ensure_exists(path: &Path, defaults: &Config) -> Result<bool, ConfigError> {
    if path.exists() {
        return Ok(false);
    }

    try_save(path, defaults)?;
    tracing::info!("Created default config at {}", path.display());
    Ok(true)
}

/// Overwrite `path` with `config`. Not atomic.
pub fn try_save(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, config.to_ini())?;
    Ok(())
}

/// [`try_save`] that logs failures and reports them as `false`
pub fn save(path: &Path, config: &Config) -> bool {
    match try_save(path, config) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Failed to save config {}: {e}", path.display());
            false
        }
    }
}

/// `$QRTOOLS_CONFIG`, else `<config dir>/qrtools/config.ini`
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV)
        && !path.is_empty()
    {
        return PathBuf::from(path);
    }

    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("qrtools")
        .join(CONFIG_FILE_NAME)
}
