mod capture;
mod error;
mod hotkey;
mod input;
mod overlay;
mod selector;
mod session;
mod visibility;

pub use capture::{
    HIDE_SETTLE_DELAY, ScreenImage, capture_full_screen, capture_hidden, capture_region,
    crop_region, screen_bounds,
};
pub use error::{CaptureError, HotkeyError};
pub use hotkey::{
    HotkeyBinding, HotkeyRegistrar, MOD_ALT, MOD_CONTROL, MOD_SHIFT, MOD_WIN, modifiers_to_bits,
};
pub use input::{PointerInput, ScriptedInput};
pub use overlay::{OVERLAY_ALPHA, PUMP_INTERVAL, SelectionOverlay, translate_message};
pub use selector::{
    RegionSelector, SelectorEvent, SelectorState, TARGET_SIZE_DEFAULT, TARGET_SIZE_MAX,
    TARGET_SIZE_MIN, TARGET_SIZE_STEP,
};
pub use session::{SessionOutcome, effective_mode, run_session, select_region};
pub use visibility::HiddenWindowGuard;
