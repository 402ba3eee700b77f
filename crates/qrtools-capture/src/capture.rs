use std::time::Duration;

use image::RgbaImage;
use qrtools_types::CaptureRegion;

use crate::error::CaptureError;
use crate::visibility::HiddenWindowGuard;

/// Time given to the compositor to repaint after hiding our window
pub const HIDE_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Primary monitor pixels plus where the monitor sits in screen coordinates
pub struct ScreenImage {
    pub bounds: CaptureRegion,
    pub image: RgbaImage,
}

/// Cut `region` out of a monitor image.
///
/// The region is clipped to the monitor first; a region that misses the
/// monitor entirely is an error.
pub fn crop_region(screen: &ScreenImage, region: CaptureRegion) -> Result<RgbaImage, CaptureError> {
    if region.is_empty() {
        return Err(CaptureError::EmptyRegion(region));
    }

    let clipped = screen
        .bounds
        .intersect(&region)
        .ok_or(CaptureError::OutOfBounds {
            region,
            screen: screen.bounds,
        })?;

    if clipped != region {
        tracing::debug!("Clipped capture region {:?} to {:?}", region, clipped);
    }

    Ok(image::imageops::crop_imm(
        &screen.image,
        (clipped.x - screen.bounds.x) as u32,
        (clipped.y - screen.bounds.y) as u32,
        clipped.width,
        clipped.height,
    )
    .to_image())
}

#[cfg(windows)]
mod backend {
    use image::RgbaImage;
    use qrtools_types::CaptureRegion;
    use xcap::Monitor;

    use super::ScreenImage;
    use crate::error::CaptureError;

    fn primary_monitor() -> Result<Monitor, CaptureError> {
        let monitors = Monitor::all().map_err(|e| CaptureError::Backend(e.to_string()))?;
        let primary = monitors.iter().position(|m| m.is_primary()).unwrap_or(0);
        monitors
            .into_iter()
            .nth(primary)
            .ok_or(CaptureError::NoMonitor)
    }

    fn monitor_bounds(monitor: &Monitor) -> CaptureRegion {
        CaptureRegion::new(monitor.x(), monitor.y(), monitor.width(), monitor.height())
    }

    pub fn screen_bounds() -> Result<CaptureRegion, CaptureError> {
        Ok(monitor_bounds(&primary_monitor()?))
    }

    /// Monitor that fully contains `region`, else the primary one
    fn monitor_for(region: CaptureRegion) -> Result<Monitor, CaptureError> {
        let monitors = Monitor::all().map_err(|e| CaptureError::Backend(e.to_string()))?;
        match monitors
            .into_iter()
            .find(|m| monitor_bounds(m).contains(&region))
        {
            Some(monitor) => Ok(monitor),
            None => primary_monitor(),
        }
    }

    pub fn capture_screen(region: Option<CaptureRegion>) -> Result<ScreenImage, CaptureError> {
        let monitor = match region {
            Some(region) => monitor_for(region)?,
            None => primary_monitor()?,
        };
        let captured = monitor
            .capture_image()
            .map_err(|e| CaptureError::Backend(e.to_string()))?;

        // Rebuild through our own `image` types, xcap may pin a different release
        let (width, height) = (captured.width(), captured.height());
        let image = RgbaImage::from_raw(width, height, captured.into_raw()).ok_or_else(|| {
            CaptureError::Backend(format!("capture buffer does not match {width}x{height}"))
        })?;

        Ok(ScreenImage {
            bounds: monitor_bounds(&monitor),
            image,
        })
    }
}

#[cfg(not(windows))]
mod backend {
    use qrtools_types::CaptureRegion;

    use super::ScreenImage;
    use crate::error::CaptureError;

    pub fn screen_bounds() -> Result<CaptureRegion, CaptureError> {
        Err(CaptureError::Unsupported)
    }

    pub fn capture_screen(_region: Option<CaptureRegion>) -> Result<ScreenImage, CaptureError> {
        Err(CaptureError::Unsupported)
    }
}

/// Bounds of the primary monitor in screen coordinates
pub fn screen_bounds() -> Result<CaptureRegion, CaptureError> {
    backend::screen_bounds()
}

/// Capture the entire primary monitor
pub fn capture_full_screen() -> Result<RgbaImage, CaptureError> {
    let screen = backend::capture_screen(None)?;
    tracing::debug!(
        "Captured full screen {}x{}",
        screen.image.width(),
        screen.image.height()
    );
    Ok(screen.image)
}

/// Capture a region, cropped from the monitor that contains it
pub fn capture_region(region: CaptureRegion) -> Result<RgbaImage, CaptureError> {
    if region.is_empty() {
        return Err(CaptureError::EmptyRegion(region));
    }

    let screen = backend::capture_screen(Some(region))?;
    crop_region(&screen, region)
}

/// Capture with our own console window hidden.
///
/// The window is restored when this returns, whether or not the capture
/// worked. `None` captures the full screen.
pub fn capture_hidden(region: Option<CaptureRegion>) -> Result<RgbaImage, CaptureError> {
    let hidden = HiddenWindowGuard::hide_console();
    if hidden.is_hiding() {
        std::thread::sleep(HIDE_SETTLE_DELAY);
    }

    match region {
        Some(region) => capture_region(region),
        None => capture_full_screen(),
    }
}
