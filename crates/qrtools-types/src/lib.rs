pub mod types;

pub use types::{AppEvent, CaptureRegion, ScreenPoint, TriggerSource};
