use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

/// `Name[-YYYYMMDD][-HHMMSS].ext`
pub fn auto_save_file_name(
    base: &str,
    append_date: bool,
    append_time: bool,
    now: NaiveDateTime,
    extension: &str,
) -> String {
    let mut name = base.to_string();
    if append_date {
        name.push_str(&now.format("-%Y%m%d").to_string());
    }
    if append_time {
        name.push_str(&now.format("-%H%M%S").to_string());
    }
    format!("{name}.{extension}")
}

/// First free path for `file_name` in `dir`, appending `_1`, `_2`, ... before
/// the extension while the name is taken
pub fn unique_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, extension) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (file_name, None),
    };

    let mut n = 1u32;
    loop {
        let name = match extension {
            Some(ext) => format!("{stem}_{n}.{ext}"),
            None => format!("{stem}_{n}"),
        };
        let candidate = dir.join(name);
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}
