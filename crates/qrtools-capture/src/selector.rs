use qrtools_config::ScannerMode;
use qrtools_types::{CaptureRegion, ScreenPoint};

pub const TARGET_SIZE_DEFAULT: u32 = 200;
pub const TARGET_SIZE_MIN: u32 = 50;
pub const TARGET_SIZE_MAX: u32 = 400;
pub const TARGET_SIZE_STEP: u32 = 10;

/// Input the selector reacts to, in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorEvent {
    PointerDown(ScreenPoint),
    PointerMove(ScreenPoint),
    PointerUp(ScreenPoint),
    /// Grow (positive) or shrink (negative) the targeting square by steps
    Resize(i32),
    /// Escape
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorState {
    Idle,
    Armed { anchor: ScreenPoint },
    Committed(CaptureRegion),
    Cancelled,
}

impl SelectorState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SelectorState::Committed(_) | SelectorState::Cancelled)
    }
}

/// One region-selection session. The mode is fixed when the session starts.
#[derive(Debug, Clone)]
pub struct RegionSelector {
    mode: ScannerMode,
    bounds: CaptureRegion,
    state: SelectorState,
    pointer: ScreenPoint,
    target_size: u32,
}

impl RegionSelector {
    pub fn new(mode: ScannerMode, bounds: CaptureRegion) -> Self {
        let pointer = ScreenPoint::new(
            bounds.x + (bounds.width / 2) as i32,
            bounds.y + (bounds.height / 2) as i32,
        );

        let state = match mode {
            ScannerMode::AutomaticDetection => SelectorState::Committed(bounds),
            _ => SelectorState::Idle,
        };

        tracing::debug!("Region selector started in {:?} mode", mode);

        Self {
            mode,
            bounds,
            state,
            pointer,
            target_size: TARGET_SIZE_DEFAULT,
        }
    }

    pub fn mode(&self) -> ScannerMode {
        self.mode
    }

    pub fn state(&self) -> SelectorState {
        self.state
    }

    pub fn target_size(&self) -> u32 {
        self.target_size
    }

    /// The region that would be captured right now, if any
    pub fn current_region(&self) -> Option<CaptureRegion> {
        match (self.mode, self.state) {
            (_, SelectorState::Committed(region)) => Some(region),
            (_, SelectorState::Cancelled) => None,
            (ScannerMode::DrawBox, SelectorState::Armed { anchor }) => {
                Some(CaptureRegion::from_corners(anchor, self.pointer))
            }
            (ScannerMode::DrawBox, _) => None,
            (ScannerMode::TargetingRectangle, _) => Some(self.target_region()),
            (ScannerMode::AutomaticDetection, _) => Some(self.bounds),
        }
    }

    /// Feed one event. Terminal states ignore everything.
    pub fn handle(&mut self, event: SelectorEvent) -> SelectorState {
        if self.state.is_terminal() {
            return self.state;
        }

        if event == SelectorEvent::Cancel {
            tracing::debug!("Region selection cancelled");
            self.state = SelectorState::Cancelled;
            return self.state;
        }

        match self.mode {
            ScannerMode::DrawBox => self.handle_draw_box(event),
            ScannerMode::TargetingRectangle => self.handle_targeting(event),
            ScannerMode::AutomaticDetection => {}
        }

        self.state
    }

    fn handle_draw_box(&mut self, event: SelectorEvent) {
        match (self.state, event) {
            (SelectorState::Idle, SelectorEvent::PointerDown(p)) => {
                self.pointer = p;
                self.state = SelectorState::Armed { anchor: p };
            }
            (SelectorState::Armed { .. }, SelectorEvent::PointerMove(p)) => {
                self.pointer = p;
            }
            (SelectorState::Armed { anchor }, SelectorEvent::PointerUp(p)) => {
                self.pointer = p;
                let region = CaptureRegion::from_corners(anchor, p);
                tracing::debug!("Box drawn: {:?}", region);
                self.state = SelectorState::Committed(region);
            }
            (_, SelectorEvent::PointerMove(p)) => self.pointer = p,
            _ => {}
        }
    }

    fn handle_targeting(&mut self, event: SelectorEvent) {
        match event {
            SelectorEvent::PointerMove(p) | SelectorEvent::PointerDown(p) => self.pointer = p,
            SelectorEvent::PointerUp(p) => {
                self.pointer = p;
                self.state = SelectorState::Committed(self.target_region());
            }
            SelectorEvent::Resize(steps) => self.resize(steps),
            SelectorEvent::Cancel => {}
        }
    }

    fn resize(&mut self, steps: i32) {
        let delta = steps.saturating_mul(TARGET_SIZE_STEP as i32);
        let size = (self.target_size as i32)
            .saturating_add(delta)
            .clamp(TARGET_SIZE_MIN as i32, TARGET_SIZE_MAX as i32);
        self.target_size = size as u32;
        tracing::debug!("Targeting rectangle resized to {}", self.target_size);
    }

    /// Square centered on the pointer, pushed back inside the screen
    fn target_region(&self) -> CaptureRegion {
        let width = self.target_size.min(self.bounds.width);
        let height = self.target_size.min(self.bounds.height);

        let x = (self.pointer.x - (width / 2) as i32)
            .clamp(self.bounds.x, self.bounds.right() - width as i32);
        let y = (self.pointer.y - (height / 2) as i32)
            .clamp(self.bounds.y, self.bounds.bottom() - height as i32);

        CaptureRegion::new(x, y, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> CaptureRegion {
        CaptureRegion::new(0, 0, 1920, 1080)
    }

    fn pt(x: i32, y: i32) -> ScreenPoint {
        ScreenPoint::new(x, y)
    }

    #[test]
    fn test_draw_box_flow() {
        let mut selector = RegionSelector::new(ScannerMode::DrawBox, screen());
        assert_eq!(selector.state(), SelectorState::Idle);
        assert_eq!(selector.current_region(), None);

        selector.handle(SelectorEvent::PointerDown(pt(300, 400)));
        assert_eq!(
            selector.state(),
            SelectorState::Armed {
                anchor: pt(300, 400)
            }
        );

        selector.handle(SelectorEvent::PointerMove(pt(250, 350)));
        assert_eq!(
            selector.current_region(),
            Some(CaptureRegion::new(250, 350, 50, 50))
        );

        let state = selector.handle(SelectorEvent::PointerUp(pt(100, 200)));
        assert_eq!(
            state,
            SelectorState::Committed(CaptureRegion::new(100, 200, 200, 200))
        );
    }

    #[test]
    fn test_draw_box_ignores_up_without_down() {
        let mut selector = RegionSelector::new(ScannerMode::DrawBox, screen());
        selector.handle(SelectorEvent::PointerUp(pt(10, 10)));
        assert_eq!(selector.state(), SelectorState::Idle);
    }

    #[test]
    fn test_draw_box_click_gives_empty_region() {
        let mut selector = RegionSelector::new(ScannerMode::DrawBox, screen());
        selector.handle(SelectorEvent::PointerDown(pt(10, 10)));
        match selector.handle(SelectorEvent::PointerUp(pt(10, 10))) {
            SelectorState::Committed(region) => assert!(region.is_empty()),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn test_targeting_follows_pointer() {
        let mut selector = RegionSelector::new(ScannerMode::TargetingRectangle, screen());
        assert_eq!(selector.target_size(), TARGET_SIZE_DEFAULT);

        selector.handle(SelectorEvent::PointerMove(pt(500, 500)));
        assert_eq!(
            selector.current_region(),
            Some(CaptureRegion::new(400, 400, 200, 200))
        );

        let state = selector.handle(SelectorEvent::PointerUp(pt(600, 300)));
        assert_eq!(
            state,
            SelectorState::Committed(CaptureRegion::new(500, 200, 200, 200))
        );
    }

    #[test]
    fn test_targeting_clamped_to_screen() {
        let mut selector = RegionSelector::new(ScannerMode::TargetingRectangle, screen());

        selector.handle(SelectorEvent::PointerMove(pt(5, 5)));
        assert_eq!(
            selector.current_region(),
            Some(CaptureRegion::new(0, 0, 200, 200))
        );

        selector.handle(SelectorEvent::PointerMove(pt(1919, 1079)));
        assert_eq!(
            selector.current_region(),
            Some(CaptureRegion::new(1720, 880, 200, 200))
        );
    }

    #[test]
    fn test_targeting_resize_bounds() {
        let mut selector = RegionSelector::new(ScannerMode::TargetingRectangle, screen());

        selector.handle(SelectorEvent::Resize(1));
        assert_eq!(selector.target_size(), 210);
        selector.handle(SelectorEvent::Resize(-3));
        assert_eq!(selector.target_size(), 180);

        selector.handle(SelectorEvent::Resize(100));
        assert_eq!(selector.target_size(), TARGET_SIZE_MAX);
        selector.handle(SelectorEvent::Resize(-100));
        assert_eq!(selector.target_size(), TARGET_SIZE_MIN);
        selector.handle(SelectorEvent::Resize(i32::MIN));
        assert_eq!(selector.target_size(), TARGET_SIZE_MIN);
    }

    #[test]
    fn test_targeting_larger_than_small_screen() {
        let small = CaptureRegion::new(0, 0, 120, 90);
        let mut selector = RegionSelector::new(ScannerMode::TargetingRectangle, small);
        selector.handle(SelectorEvent::PointerMove(pt(60, 45)));
        assert_eq!(selector.current_region(), Some(small));
    }

    #[test]
    fn test_automatic_commits_immediately() {
        let selector = RegionSelector::new(ScannerMode::AutomaticDetection, screen());
        assert_eq!(selector.state(), SelectorState::Committed(screen()));
    }

    #[test]
    fn test_cancel_is_terminal() {
        let mut selector = RegionSelector::new(ScannerMode::DrawBox, screen());
        selector.handle(SelectorEvent::PointerDown(pt(1, 1)));
        assert_eq!(
            selector.handle(SelectorEvent::Cancel),
            SelectorState::Cancelled
        );

        selector.handle(SelectorEvent::PointerUp(pt(50, 50)));
        assert_eq!(selector.state(), SelectorState::Cancelled);
        assert_eq!(selector.current_region(), None);
    }

    #[test]
    fn test_committed_ignores_further_events() {
        let mut selector = RegionSelector::new(ScannerMode::AutomaticDetection, screen());
        selector.handle(SelectorEvent::Cancel);
        assert_eq!(selector.state(), SelectorState::Committed(screen()));
    }
}
