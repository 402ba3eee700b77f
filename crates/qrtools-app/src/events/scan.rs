use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use image::RgbaImage;
use qrtools_capture::{PointerInput, SelectionOverlay, SessionOutcome, run_session};
use qrtools_config::ScannerMode;
use qrtools_core::{DecodeOptions, decode, to_grayscale};
use qrtools_types::TriggerSource;

use crate::present::{ResultRequest, ScanResult, present};
use crate::state::AppState;

/// How long an interactive selection may sit idle before it is abandoned
pub const SESSION_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanReport {
    Found(ScanResult),
    NotFound,
    Cancelled,
}

/// Grayscale then decode a captured image
pub fn decode_capture(image: &RgbaImage) -> anyhow::Result<ScanReport> {
    let gray = to_grayscale(image);
    let text = decode(&gray, DecodeOptions::default()).context("Failed to decode image")?;

    Ok(match text {
        Some(text) => ScanReport::Found(ScanResult::new(text)),
        None => ScanReport::NotFound,
    })
}

/// Tell the user how a scan ended
pub fn report(scan: &ScanReport, request: &ResultRequest) -> anyhow::Result<()> {
    match scan {
        ScanReport::Found(result) => present(result, request)?,
        ScanReport::NotFound => eprintln!("No QR code found"),
        ScanReport::Cancelled => eprintln!("Scan cancelled"),
    }
    Ok(())
}

/// Select a region, capture it and decode whatever is there
pub async fn handle_scan_trigger(
    state: &AppState,
    source: TriggerSource,
    mode: Option<ScannerMode>,
    request: &ResultRequest,
) -> anyhow::Result<ScanReport> {
    let mode = match mode {
        Some(mode) => mode,
        None => state.config.read().await.scanner.mode,
    };
    tracing::info!("Scan triggered by {:?} ({:?})", source, mode);

    let mut overlay = if mode == ScannerMode::AutomaticDetection {
        None
    } else {
        SelectionOverlay::open(SESSION_TIMEOUT)
            .inspect_err(|e| tracing::warn!("No selection overlay: {}", e))
            .ok()
    };
    let input = overlay.as_mut().map(|o| o as &mut dyn PointerInput);

    let scan = match run_session(mode, input).context("Screen capture failed")? {
        SessionOutcome::Cancelled => ScanReport::Cancelled,
        SessionOutcome::Captured { region, image, .. } => {
            tracing::debug!("Decoding capture of {:?}", region);
            decode_capture(&image)?
        }
    };

    report(&scan, request)?;
    Ok(scan)
}

/// Run an image file through the same pipeline as a screen capture
pub fn decode_file(path: &Path, request: &ResultRequest) -> anyhow::Result<ScanReport> {
    let image = image::open(path)
        .with_context(|| format!("Failed to open image {}", path.display()))?
        .to_rgba8();
    tracing::debug!(
        "Loaded {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );

    let scan = decode_capture(&image)?;
    report(&scan, request)?;
    Ok(scan)
}
