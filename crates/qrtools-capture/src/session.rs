use image::RgbaImage;
use qrtools_config::ScannerMode;
use qrtools_types::CaptureRegion;

use crate::capture::{capture_hidden, screen_bounds};
use crate::error::CaptureError;
use crate::input::PointerInput;
use crate::selector::{RegionSelector, SelectorState};

#[derive(Debug)]
pub enum SessionOutcome {
    Captured {
        mode: ScannerMode,
        region: CaptureRegion,
        image: RgbaImage,
    },
    Cancelled,
}

/// Mode actually used for a session given what input is available
pub fn effective_mode(requested: ScannerMode, has_input: bool) -> ScannerMode {
    if requested != ScannerMode::AutomaticDetection && !has_input {
        tracing::warn!(
            "No interactive pointer input, falling back from {:?} to automatic detection",
            requested
        );
        return ScannerMode::AutomaticDetection;
    }
    requested
}

/// Drive a selector to a terminal state.
///
/// The input is shown the live region after every event and closed once the
/// session ends. Returns `Ok(None)` when the user cancelled or the input ran dry.
pub fn select_region(
    mode: ScannerMode,
    bounds: CaptureRegion,
    input: Option<&mut dyn PointerInput>,
) -> Result<Option<CaptureRegion>, CaptureError> {
    let mode = effective_mode(mode, input.is_some());
    let mut selector = RegionSelector::new(mode, bounds);

    if let Some(input) = input {
        input.show_selection(selector.current_region());
        while !selector.state().is_terminal() {
            let Some(event) = input.next_event() else {
                tracing::debug!("Pointer input ended before a region was chosen");
                input.close();
                return Ok(None);
            };
            selector.handle(event);
            if !selector.state().is_terminal() {
                input.show_selection(selector.current_region());
            }
        }
        input.close();
    }

    match selector.state() {
        SelectorState::Committed(region) if region.is_empty() => {
            Err(CaptureError::EmptyRegion(region))
        }
        SelectorState::Committed(region) => Ok(Some(region)),
        _ => Ok(None),
    }
}

/// Choose a region on the primary screen and capture it
pub fn run_session(
    mode: ScannerMode,
    input: Option<&mut dyn PointerInput>,
) -> Result<SessionOutcome, CaptureError> {
    let bounds = screen_bounds()?;
    let mode = effective_mode(mode, input.is_some());

    let Some(region) = select_region(mode, bounds, input)? else {
        return Ok(SessionOutcome::Cancelled);
    };

    let image = if mode == ScannerMode::AutomaticDetection {
        capture_hidden(None)?
    } else {
        capture_hidden(Some(region))?
    };

    tracing::debug!(
        "Captured {}x{} from {:?}",
        image.width(),
        image.height(),
        region
    );

    Ok(SessionOutcome::Captured {
        mode,
        region,
        image,
    })
}
