use qrtools_types::CaptureRegion;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("No monitor found")]
    NoMonitor,

    #[error("Selected region is empty ({0:?})")]
    EmptyRegion(CaptureRegion),

    #[error("Region {region:?} lies outside the screen {screen:?}")]
    OutOfBounds {
        region: CaptureRegion,
        screen: CaptureRegion,
    },

    #[error("Screen capture failed: {0}")]
    Backend(String),

    #[error("Selection overlay failed: {0}")]
    Overlay(String),

    #[error("Screen capture is not supported on this platform")]
    Unsupported,
}

#[derive(Debug, thiserror::Error)]
pub enum HotkeyError {
    #[error("Invalid hotkey {0:?}")]
    InvalidBinding(String),

    #[error("Failed to create hotkey manager: {0}")]
    Manager(String),

    #[error("Couldn't register the hot key {binding}: {reason}")]
    RegistrationFailed { binding: String, reason: String },
}
