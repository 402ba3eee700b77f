use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_auto_save_name() -> String {
    "QRCode".to_string()
}

fn default_skip_save_dialog() -> bool {
    false
}

/// Falls back to the working directory when the OS reports no desktop folder
fn default_auto_save_directory() -> PathBuf {
    dirs::desktop_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn default_append() -> bool {
    true
}

/// Where and under which name generated codes are saved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Base file name, without extension or date/time suffixes
    pub auto_save_name: String,
    /// Save straight into `auto_save_directory` instead of asking for a path
    pub skip_save_dialog: bool,
    pub auto_save_directory: PathBuf,
    /// Append `-YYYYMMDD` to the file name
    pub append_date: bool,
    /// Append `-HHMMSS` to the file name
    pub append_time: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            auto_save_name: default_auto_save_name(),
            skip_save_dialog: default_skip_save_dialog(),
            auto_save_directory: default_auto_save_directory(),
            append_date: default_append(),
            append_time: default_append(),
        }
    }
}
