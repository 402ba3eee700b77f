//! Capture and decode check - run with: cargo run -p qrtools-capture --bin test_capture

use anyhow::{Context, Result};
use qrtools_core::{DecodeOptions, decode, to_grayscale};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    tracing::info!("=== Capture check ===");

    let bounds = qrtools_capture::screen_bounds().context("Failed to query primary monitor")?;
    tracing::info!("Primary monitor: {:?}", bounds);

    let start = std::time::Instant::now();
    let image = qrtools_capture::capture_hidden(None).context("Full screen capture failed")?;
    tracing::info!(
        "Captured {}x{} in {:?}",
        image.width(),
        image.height(),
        start.elapsed()
    );

    image
        .save("test_capture.png")
        .context("Failed to write test_capture.png")?;
    tracing::info!("Saved to test_capture.png");

    let start = std::time::Instant::now();
    let gray = to_grayscale(&image);
    match decode(&gray, DecodeOptions::default())? {
        Some(text) => tracing::info!("Decoded in {:?}: {}", start.elapsed(), text),
        None => tracing::info!("No QR code on screen ({:?})", start.elapsed()),
    }

    tracing::info!("=== Done ===");
    Ok(())
}
