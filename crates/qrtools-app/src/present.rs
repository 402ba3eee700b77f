use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use qrtools_core::{ResultKind, classify};

/// Things the user can do with a decoded result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultAction {
    OpenInBrowser,
    SaveAsText,
    CopyToClipboard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub text: String,
    pub kind: ResultKind,
}

impl ScanResult {
    pub fn new(text: String) -> Self {
        let kind = classify(&text);
        Self { text, kind }
    }

    /// Links can be opened, anything else can be saved. Copy is always offered.
    pub fn actions(&self) -> Vec<ResultAction> {
        let primary = match self.kind {
            ResultKind::Url => ResultAction::OpenInBrowser,
            ResultKind::PlainText => ResultAction::SaveAsText,
        };
        vec![primary, ResultAction::CopyToClipboard]
    }

    pub fn offers(&self, action: ResultAction) -> bool {
        self.actions().contains(&action)
    }
}

/// Actions requested on the command line for a decoded result
#[derive(Debug, Clone, Default)]
pub struct ResultRequest {
    pub open: bool,
    pub save: Option<PathBuf>,
    pub copy: bool,
}

pub fn open_in_browser(url: &str) -> anyhow::Result<()> {
    open::that(url).with_context(|| format!("Failed to open {url}"))?;
    tracing::info!("Opened {} in the default browser", url);
    Ok(())
}

/// Write the raw decoded text, replacing any existing file
pub fn save_as_text(text: &str, path: &Path) -> anyhow::Result<()> {
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Saved result to {}", path.display());
    Ok(())
}

pub fn copy_to_clipboard(text: &str) -> anyhow::Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("Clipboard unavailable")?;
    clipboard
        .set_text(text.to_string())
        .context("Failed to copy result to the clipboard")?;
    tracing::info!("Copied {} chars to the clipboard", text.len());
    Ok(())
}

/// Print the result and run whichever requested actions it offers
pub fn present(result: &ScanResult, request: &ResultRequest) -> anyhow::Result<()> {
    tracing::info!("Decoded {:?}: {} chars", result.kind, result.text.len());
    println!("{}", result.text);

    if request.open {
        if result.offers(ResultAction::OpenInBrowser) {
            open_in_browser(&result.text)?;
        } else {
            eprintln!("Result is not a web link, not opening it");
        }
    }

    if let Some(path) = &request.save {
        if result.offers(ResultAction::SaveAsText) {
            save_as_text(&result.text, path)?;
        } else {
            eprintln!("Result is a web link, use --open or --copy instead of --save");
        }
    }

    if request.copy {
        copy_to_clipboard(&result.text)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_actions() {
        let result = ScanResult::new("https://example.com/path?q=1".to_string());
        assert_eq!(result.kind, ResultKind::Url);
        assert!(result.offers(ResultAction::OpenInBrowser));
        assert!(!result.offers(ResultAction::SaveAsText));
        assert!(result.offers(ResultAction::CopyToClipboard));
    }

    #[test]
    fn test_plain_text_actions() {
        let result = ScanResult::new("WIFI:S:home;T:WPA;P:secret;;".to_string());
        assert_eq!(result.kind, ResultKind::PlainText);
        assert!(!result.offers(ResultAction::OpenInBrowser));
        assert!(result.offers(ResultAction::SaveAsText));
        assert!(result.offers(ResultAction::CopyToClipboard));
    }

    #[test]
    fn test_save_as_text_writes_raw() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.txt");
        std::fs::write(&path, "old contents that are longer").unwrap();

        save_as_text("line one\nline two", &path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "line one\nline two"
        );
    }

    #[test]
    fn test_present_skips_hidden_actions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("link.txt");
        let request = ResultRequest {
            open: false,
            save: Some(path.clone()),
            copy: false,
        };

        present(&ScanResult::new("http://example.org".to_string()), &request).unwrap();
        assert!(!path.exists());

        present(&ScanResult::new("just some words".to_string()), &request).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "just some words");
    }
}
