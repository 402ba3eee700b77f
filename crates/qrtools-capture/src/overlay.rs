//! Full-screen selection overlay.
//!
//! A borderless, topmost, translucent window covers the primary monitor for
//! the length of a DrawBox or TargetingRectangle session. It owns the mouse
//! while it is up, so clicks and drags never reach the windows underneath,
//! and it paints the region the selector would capture.
//!
//! Window messages are translated into [`SelectorEvent`]s and queued; every
//! message dispatched by one pump lands in the queue, none are coalesced.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use qrtools_types::{CaptureRegion, ScreenPoint};

use crate::capture::{HIDE_SETTLE_DELAY, screen_bounds};
use crate::error::CaptureError;
use crate::input::PointerInput;
use crate::selector::SelectorEvent;

/// How long to wait between message pumps when the queue is empty
pub const PUMP_INTERVAL: Duration = Duration::from_millis(15);

/// Opacity of the shaded overlay, out of 255
pub const OVERLAY_ALPHA: u8 = 110;

// Win32 message and virtual-key codes the overlay reacts to
const WM_CLOSE: u32 = 0x0010;
const WM_KEYDOWN: u32 = 0x0100;
const WM_MOUSEMOVE: u32 = 0x0200;
const WM_LBUTTONDOWN: u32 = 0x0201;
const WM_LBUTTONUP: u32 = 0x0202;
const WM_MOUSEWHEEL: u32 = 0x020A;

const VK_ESCAPE: usize = 0x1B;
const VK_ADD: usize = 0x6B;
const VK_SUBTRACT: usize = 0x6D;
const VK_OEM_PLUS: usize = 0xBB;
const VK_OEM_MINUS: usize = 0xBD;

/// Signed client coordinates packed into a mouse message's `lParam`
fn client_point(lparam: isize) -> (i32, i32) {
    let x = (lparam & 0xffff) as u16 as i16 as i32;
    let y = ((lparam >> 16) & 0xffff) as u16 as i16 as i32;
    (x, y)
}

/// Translate one window message into a selector event.
///
/// `origin` is the screen position of the overlay's top-left corner.
pub fn translate_message(
    origin: ScreenPoint,
    msg: u32,
    wparam: usize,
    lparam: isize,
) -> Option<SelectorEvent> {
    let screen_point = || {
        let (x, y) = client_point(lparam);
        ScreenPoint::new(origin.x + x, origin.y + y)
    };

    match msg {
        WM_LBUTTONDOWN => Some(SelectorEvent::PointerDown(screen_point())),
        WM_MOUSEMOVE => Some(SelectorEvent::PointerMove(screen_point())),
        WM_LBUTTONUP => Some(SelectorEvent::PointerUp(screen_point())),
        WM_KEYDOWN => match wparam {
            VK_ESCAPE => Some(SelectorEvent::Cancel),
            VK_ADD | VK_OEM_PLUS => Some(SelectorEvent::Resize(1)),
            VK_SUBTRACT | VK_OEM_MINUS => Some(SelectorEvent::Resize(-1)),
            _ => None,
        },
        WM_MOUSEWHEEL => {
            let delta = ((wparam >> 16) & 0xffff) as u16 as i16;
            match delta.signum() {
                0 => None,
                step => Some(SelectorEvent::Resize(step as i32)),
            }
        }
        WM_CLOSE => Some(SelectorEvent::Cancel),
        _ => None,
    }
}

/// What the overlay window procedure reads and writes
#[derive(Debug)]
pub(crate) struct OverlayState {
    origin: ScreenPoint,
    pending: VecDeque<SelectorEvent>,
    selection: Option<CaptureRegion>,
}

#[cfg_attr(not(windows), allow(dead_code))]
impl OverlayState {
    pub(crate) fn new(bounds: CaptureRegion) -> Self {
        Self {
            origin: ScreenPoint::new(bounds.x, bounds.y),
            pending: VecDeque::new(),
            selection: None,
        }
    }

    /// Queue the event for `msg`, if it maps to one. Returns whether it did.
    pub(crate) fn on_message(&mut self, msg: u32, wparam: usize, lparam: isize) -> bool {
        match translate_message(self.origin, msg, wparam, lparam) {
            Some(event) => {
                self.pending.push_back(event);
                true
            }
            None => false,
        }
    }

    pub(crate) fn pop_event(&mut self) -> Option<SelectorEvent> {
        self.pending.pop_front()
    }

    /// Returns true when the selection changed and needs repainting
    pub(crate) fn set_selection(&mut self, region: Option<CaptureRegion>) -> bool {
        let changed = self.selection != region;
        self.selection = region;
        changed
    }

    /// The selection relative to the overlay's client area
    pub(crate) fn client_selection(&self) -> Option<CaptureRegion> {
        self.selection.map(|region| {
            CaptureRegion::new(
                region.x - self.origin.x,
                region.y - self.origin.y,
                region.width,
                region.height,
            )
        })
    }
}

/// Interactive pointer input backed by the on-screen overlay
pub struct SelectionOverlay {
    timeout: Duration,
    bounds: CaptureRegion,
    window: Option<platform::OverlayWindow>,
}

impl SelectionOverlay {
    /// Cover the primary monitor. Gives up on a session idle for `timeout`.
    pub fn open(timeout: Duration) -> Result<Self, CaptureError> {
        let bounds = screen_bounds()?;
        let window = platform::OverlayWindow::create(bounds)?;
        tracing::debug!("Selection overlay up over {:?}", bounds);

        Ok(Self {
            timeout,
            bounds,
            window: Some(window),
        })
    }

    pub fn bounds(&self) -> CaptureRegion {
        self.bounds
    }
}

impl PointerInput for SelectionOverlay {
    fn next_event(&mut self) -> Option<SelectorEvent> {
        let window = self.window.as_ref()?;
        let started = Instant::now();

        while started.elapsed() < self.timeout {
            window.pump();
            if let Some(event) = window.pop_event() {
                return Some(event);
            }
            std::thread::sleep(PUMP_INTERVAL);
        }

        tracing::warn!("No pointer input for {:?}, giving up", self.timeout);
        None
    }

    fn show_selection(&mut self, region: Option<CaptureRegion>) {
        if let Some(window) = &self.window {
            window.set_selection(region);
        }
    }

    fn close(&mut self) {
        if self.window.take().is_some() {
            // Let the compositor drop the overlay before anything is captured
            std::thread::sleep(HIDE_SETTLE_DELAY);
        }
    }
}

#[cfg(windows)]
mod platform {
    use std::cell::RefCell;

    use qrtools_types::CaptureRegion;
    use windows::Win32::Foundation::{COLORREF, HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM};
    use windows::Win32::Graphics::Gdi::{
        BeginPaint, CreateSolidBrush, DeleteObject, EndPaint, FillRect, FrameRect, HBRUSH,
        InvalidateRect, PAINTSTRUCT,
    };
    use windows::Win32::System::LibraryLoader::GetModuleHandleW;
    use windows::Win32::UI::HiDpi::{
        DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2, SetProcessDpiAwarenessContext,
    };
    use windows::Win32::UI::Input::KeyboardAndMouse::{ReleaseCapture, SetCapture, SetFocus};
    use windows::Win32::UI::WindowsAndMessaging::{
        CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetClientRect,
        IDC_CROSS, LWA_ALPHA, LoadCursorW, MSG, PM_REMOVE, PeekMessageW, RegisterClassW,
        SW_SHOW, SetForegroundWindow, SetLayeredWindowAttributes, ShowWindow, TranslateMessage,
        UnregisterClassW, WM_ERASEBKGND, WM_LBUTTONDOWN, WM_LBUTTONUP, WM_PAINT, WNDCLASSW,
        WS_EX_LAYERED, WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_POPUP,
    };
    use windows::core::{PCWSTR, w};

    use super::{OVERLAY_ALPHA, OverlayState};
    use crate::error::CaptureError;
    use crate::selector::SelectorEvent;

    const CLASS_NAME: PCWSTR = w!("QrToolsSelectionOverlay");

    const SHADE: COLORREF = COLORREF(0x0020_2020);
    const HIGHLIGHT: COLORREF = COLORREF(0x00F0_F0F0);
    const BORDER: COLORREF = COLORREF(0x0000_30FF);
    const BORDER_WIDTH: i32 = 2;

    thread_local! {
        static STATE: RefCell<Option<OverlayState>> = const { RefCell::new(None) };
    }

    pub(super) struct OverlayWindow {
        hwnd: HWND,
        instance: HINSTANCE,
    }

    impl OverlayWindow {
        pub(super) fn create(bounds: CaptureRegion) -> Result<Self, CaptureError> {
            let failed = |e: windows::core::Error| CaptureError::Overlay(e.to_string());

            // Monitor bounds are in physical pixels
            if let Err(e) =
                unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) }
            {
                tracing::debug!("DPI awareness unchanged: {}", e);
            }

            let instance: HINSTANCE = unsafe { GetModuleHandleW(None) }.map_err(failed)?.into();
            let cursor = unsafe { LoadCursorW(None, IDC_CROSS) }.map_err(failed)?;

            let class = WNDCLASSW {
                lpfnWndProc: Some(overlay_wndproc),
                hInstance: instance,
                hCursor: cursor,
                lpszClassName: CLASS_NAME,
                ..Default::default()
            };
            if unsafe { RegisterClassW(&class) } == 0 {
                tracing::debug!("Overlay window class already registered");
            }

            STATE.with(|state| *state.borrow_mut() = Some(OverlayState::new(bounds)));

            let hwnd = unsafe {
                CreateWindowExW(
                    WS_EX_LAYERED | WS_EX_TOPMOST | WS_EX_TOOLWINDOW,
                    CLASS_NAME,
                    w!("Select a QR code"),
                    WS_POPUP,
                    bounds.x,
                    bounds.y,
                    bounds.width as i32,
                    bounds.height as i32,
                    None,
                    None,
                    Some(instance),
                    None,
                )
            }
            .map_err(|e| {
                STATE.with(|state| state.borrow_mut().take());
                failed(e)
            })?;

            let window = Self { hwnd, instance };

            unsafe { SetLayeredWindowAttributes(hwnd, COLORREF(0), OVERLAY_ALPHA, LWA_ALPHA) }
                .map_err(failed)?;
            unsafe {
                let _ = ShowWindow(hwnd, SW_SHOW);
                let _ = SetForegroundWindow(hwnd);
                let _ = SetFocus(Some(hwnd));
            }

            Ok(window)
        }

        /// Dispatch everything waiting in this thread's message queue
        pub(super) fn pump(&self) {
            let mut msg = MSG::default();
            unsafe {
                while PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                }
            }
        }

        pub(super) fn pop_event(&self) -> Option<SelectorEvent> {
            STATE.with(|state| state.borrow_mut().as_mut()?.pop_event())
        }

        pub(super) fn set_selection(&self, region: Option<CaptureRegion>) {
            let changed = STATE.with(|state| {
                state
                    .borrow_mut()
                    .as_mut()
                    .is_some_and(|s| s.set_selection(region))
            });
            if changed {
                unsafe {
                    let _ = InvalidateRect(Some(self.hwnd), None, false);
                }
            }
        }
    }

    impl Drop for OverlayWindow {
        fn drop(&mut self) {
            unsafe {
                if let Err(e) = DestroyWindow(self.hwnd) {
                    tracing::warn!("Failed to destroy selection overlay: {}", e);
                }
                let _ = UnregisterClassW(CLASS_NAME, Some(self.instance));
            }
            STATE.with(|state| state.borrow_mut().take());
            tracing::debug!("Selection overlay closed");
        }
    }

    fn client_rect(region: CaptureRegion, inset: i32) -> RECT {
        RECT {
            left: region.x + inset,
            top: region.y + inset,
            right: region.right() - inset,
            bottom: region.bottom() - inset,
        }
    }

    fn paint(hwnd: HWND) {
        let selection =
            STATE.with(|state| state.borrow().as_ref().and_then(|s| s.client_selection()));

        let mut ps = PAINTSTRUCT::default();
        unsafe {
            let hdc = BeginPaint(hwnd, &mut ps);

            let mut client = RECT::default();
            let _ = GetClientRect(hwnd, &mut client);
            let shade: HBRUSH = CreateSolidBrush(SHADE);
            FillRect(hdc, &client, shade);

            if let Some(region) = selection {
                let highlight = CreateSolidBrush(HIGHLIGHT);
                let border = CreateSolidBrush(BORDER);
                FillRect(hdc, &client_rect(region, 0), highlight);
                for inset in 0..BORDER_WIDTH {
                    FrameRect(hdc, &client_rect(region, inset), border);
                }
                let _ = DeleteObject(highlight.into());
                let _ = DeleteObject(border.into());
            }

            let _ = DeleteObject(shade.into());
            let _ = EndPaint(hwnd, &ps);
        }
    }

    unsafe extern "system" fn overlay_wndproc(
        hwnd: HWND,
        msg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        match msg {
            WM_ERASEBKGND => return LRESULT(1),
            WM_PAINT => {
                paint(hwnd);
                return LRESULT(0);
            }
            WM_LBUTTONDOWN => unsafe {
                let _ = SetCapture(hwnd);
            },
            WM_LBUTTONUP => unsafe {
                let _ = ReleaseCapture();
            },
            _ => {}
        }

        let queued = STATE.with(|state| {
            state
                .borrow_mut()
                .as_mut()
                .is_some_and(|s| s.on_message(msg, wparam.0, lparam.0))
        });

        if queued {
            LRESULT(0)
        } else {
            unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
        }
    }
}

#[cfg(not(windows))]
mod platform {
    use std::convert::Infallible;

    use qrtools_types::CaptureRegion;

    use crate::error::CaptureError;
    use crate::selector::SelectorEvent;

    pub(super) struct OverlayWindow(Infallible);

    impl OverlayWindow {
        pub(super) fn create(_bounds: CaptureRegion) -> Result<Self, CaptureError> {
            Err(CaptureError::Unsupported)
        }

        pub(super) fn pump(&self) {
            match self.0 {}
        }

        pub(super) fn pop_event(&self) -> Option<SelectorEvent> {
            match self.0 {}
        }

        pub(super) fn set_selection(&self, _region: Option<CaptureRegion>) {
            match self.0 {}
        }
    }
}
