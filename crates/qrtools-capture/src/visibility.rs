#[cfg(windows)]
use windows::Win32::Foundation::HWND;

/// RAII guard that keeps our console window out of screen captures
///
/// The window is hidden on creation and shown again when the guard is
/// dropped, even in case of panic or early return.
pub struct HiddenWindowGuard {
    #[cfg(windows)]
    hwnd: Option<HWND>,
}

impl HiddenWindowGuard {
    /// Hide the console window attached to this process, if there is one
    #[cfg(windows)]
    pub fn hide_console() -> Self {
        use windows::Win32::System::Console::GetConsoleWindow;
        use windows::Win32::UI::WindowsAndMessaging::{SW_HIDE, ShowWindow};

        let hwnd = unsafe { GetConsoleWindow() };
        if hwnd.is_invalid() {
            tracing::debug!("No console window to hide");
            return Self { hwnd: None };
        }

        unsafe {
            let _ = ShowWindow(hwnd, SW_HIDE);
        }
        Self { hwnd: Some(hwnd) }
    }

    #[cfg(not(windows))]
    pub fn hide_console() -> Self {
        Self {}
    }

    pub fn is_hiding(&self) -> bool {
        #[cfg(windows)]
        {
            self.hwnd.is_some()
        }
        #[cfg(not(windows))]
        {
            false
        }
    }
}

impl Drop for HiddenWindowGuard {
    fn drop(&mut self) {
        self.restore();
    }
}

impl HiddenWindowGuard {
    #[cfg(windows)]
    fn restore(&mut self) {
        use windows::Win32::UI::WindowsAndMessaging::{SW_SHOW, ShowWindow};

        if let Some(hwnd) = self.hwnd.take() {
            unsafe {
                let _ = ShowWindow(hwnd, SW_SHOW);
            }
        }
    }

    #[cfg(not(windows))]
    fn restore(&mut self) {}
}
