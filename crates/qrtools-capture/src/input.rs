use std::collections::VecDeque;

use qrtools_types::CaptureRegion;

use crate::selector::SelectorEvent;

/// Source of pointer and keyboard events for a selection session
pub trait PointerInput {
    /// Block until the next event. `None` means the input has gone away.
    fn next_event(&mut self) -> Option<SelectorEvent>;

    /// Draw the region that would be captured right now
    fn show_selection(&mut self, _region: Option<CaptureRegion>) {}

    /// The session is over; take any on-screen surface down before capture
    fn close(&mut self) {}
}

/// Replays a fixed list of events and remembers what it was asked to show
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    events: VecDeque<SelectorEvent>,
    shown: Vec<Option<CaptureRegion>>,
    closed: bool,
}

impl ScriptedInput {
    pub fn new(events: impl IntoIterator<Item = SelectorEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn shown(&self) -> &[Option<CaptureRegion>] {
        &self.shown
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl PointerInput for ScriptedInput {
    fn next_event(&mut self) -> Option<SelectorEvent> {
        self.events.pop_front()
    }

    fn show_selection(&mut self, region: Option<CaptureRegion>) {
        self.shown.push(region);
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
