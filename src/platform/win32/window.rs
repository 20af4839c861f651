// ── Hidden window & message loop ──────────────────────────────────────────────
//
// Responsibilities in this file (unsafe confined here):
//   • Register the window class and create the single hidden window.
//   • Keep the handle → `App` table and route WndProc messages through
//     `App::handle`, then carry out the returned `Effect`.
//   • Register / unregister the global hotkey.
//   • Run the Win32 message loop.

#![allow(unsafe_code)]

use std::{cell::RefCell, collections::HashMap};

use tracing::{debug, warn};
use windows::{
    core::PCWSTR,
    Win32::{
        Foundation::{
            GetLastError, SetLastError, HINSTANCE, HWND, LPARAM, LRESULT, WIN32_ERROR, WPARAM,
        },
        System::LibraryLoader::GetModuleHandleW,
        UI::{
            Input::KeyboardAndMouse::{RegisterHotKey, UnregisterHotKey, HOT_KEY_MODIFIERS},
            WindowsAndMessaging::{
                CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW,
                GetWindowLongW, PostQuitMessage, RegisterClassExW, SetWindowLongW, ShowWindow,
                TranslateMessage, CW_USEDEFAULT, GWL_EXSTYLE, HMENU, MSG, SW_SHOW,
                WINDOW_EX_STYLE, WM_CLOSE, WM_CREATE, WM_DESTROY, WM_HOTKEY, WNDCLASSEXW,
                WS_SYSMENU,
            },
        },
    },
};

use super::dialogs::to_wide;
use crate::{
    app::{App, Effect, Message},
    config::Config,
    error::{AppError, Result},
    event_loop::Desktop,
    report,
    toggle,
};

// ── Handle → state table ──────────────────────────────────────────────────────

thread_local! {
    /// State waiting for its window's `WM_CREATE`.
    static PENDING: RefCell<Option<App>> = const { RefCell::new(None) };

    /// State of every live window created on this thread.
    static WINDOWS: RefCell<HashMap<isize, App>> = RefCell::new(HashMap::new());
}

fn key(hwnd: HWND) -> isize {
    hwnd.0 as isize
}

/// Move the pending state under `hwnd`.
fn attach(hwnd: HWND) {
    if let Some(app) = PENDING.with(|p| p.borrow_mut().take()) {
        WINDOWS.with(|w| w.borrow_mut().insert(key(hwnd), app));
    }
}

fn detach(hwnd: HWND) {
    if let Some(app) = WINDOWS.with(|w| w.borrow_mut().remove(&key(hwnd))) {
        debug!(event = "window.detached", active = app.active);
    }
}

// ── Desktop backend ───────────────────────────────────────────────────────────

/// The real Win32 window system.
pub(crate) struct Win32Desktop {
    hinstance: HINSTANCE,
}

impl Win32Desktop {
    pub(crate) fn new() -> Result<Self> {
        // SAFETY: GetModuleHandleW(None) returns the .exe's own HMODULE, which is
        // always valid for the process lifetime and never fails in practice.
        let hmodule = unsafe { GetModuleHandleW(None) }
            .map_err(|e| AppError::from_hresult("GetModuleHandleW", e.code().0))?;

        // HINSTANCE and HMODULE are the same value on Windows.
        Ok(Self {
            hinstance: HINSTANCE(hmodule.0),
        })
    }

    fn register_class(&self, class_name: PCWSTR) -> Result<()> {
        let wndclass = WNDCLASSEXW {
            // WNDCLASSEXW is ~72 bytes; the cast to u32 is always lossless.
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            lpfnWndProc: Some(wnd_proc),
            hInstance: self.hinstance,
            lpszClassName: class_name,
            ..Default::default()
        };

        // SAFETY: wndclass is fully initialised; class_name points to a
        // null-terminated UTF-16 string owned by the caller for this call.
        let atom = unsafe { RegisterClassExW(&wndclass) };
        if atom == 0 {
            return Err(last_error("RegisterClassExW"));
        }
        Ok(())
    }
}

impl Desktop for Win32Desktop {
    type Window = HWND;

    fn create_window(&mut self, title: &str, app: App) -> Result<HWND> {
        let title_wide = to_wide(title);
        let name = PCWSTR(title_wide.as_ptr());
        self.register_class(name)?;

        let ex_style = WINDOW_EX_STYLE(app.initial_ex_style());
        PENDING.with(|p| *p.borrow_mut() = Some(app));

        // SAFETY: the class was just registered under `name`, which stays
        // alive until this function returns.  Null parent makes a top-level
        // window; null menu because the window has no content.  WM_CREATE is
        // delivered to wnd_proc on this thread before CreateWindowExW returns.
        let created = unsafe {
            CreateWindowExW(
                ex_style,
                name,
                name,
                WS_SYSMENU,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                HWND::default(),
                HMENU::default(),
                self.hinstance,
                None,
            )
        };

        // Never leave state parked if WM_CREATE did not consume it.
        PENDING.with(|p| p.borrow_mut().take());

        let hwnd = created.map_err(|e| AppError::from_hresult("CreateWindowExW", e.code().0))?;
        debug!(event = "window.created", title, ex_style = ex_style.0);
        Ok(hwnd)
    }

    fn register_hotkey(&mut self, window: HWND, config: &Config) -> Result<()> {
        let hotkey = &config.hotkey;

        // SAFETY: window is the live window created above on this thread;
        // WM_HOTKEY will be posted to its queue.
        unsafe {
            RegisterHotKey(
                window,
                hotkey.id,
                HOT_KEY_MODIFIERS(hotkey.modifier_bits()),
                hotkey.key.0,
            )
        }
        .map_err(|e| AppError::from_hresult("RegisterHotKey", e.code().0))
    }

    fn show(&mut self, window: HWND) {
        // SAFETY: window is valid; the return value is the previous visibility
        // state and is intentionally ignored.
        unsafe {
            let _ = ShowWindow(window, SW_SHOW);
        }
    }

    fn pump(&mut self) -> Result<i32> {
        let mut msg = MSG::default();

        loop {
            // SAFETY: &mut msg is a valid MSG pointer; HWND::default() retrieves
            // messages for all windows on this thread; 0,0 filter accepts all.
            let ret = unsafe { GetMessageW(&mut msg, HWND::default(), 0, 0) };

            match ret.0 {
                // GetMessage returns -1 on error.
                -1 => return Err(last_error("GetMessageW")),
                // Returns 0 when WM_QUIT is retrieved; wParam is the exit code.
                0 => return Ok(msg.wParam.0 as i32),
                _ => unsafe {
                    // SAFETY: msg was populated by a successful GetMessage call.
                    let _ = TranslateMessage(&msg);
                    let _ = DispatchMessageW(&msg);
                },
            }
        }
    }

    fn unregister_hotkey(&mut self, window: HWND, id: i32) -> Result<()> {
        // SAFETY: unregistering an id is harmless even if the window is gone;
        // the call then simply fails.
        unsafe { UnregisterHotKey(window, id) }
            .map_err(|e| AppError::from_hresult("UnregisterHotKey", e.code().0))
    }
}

// ── Window procedure ──────────────────────────────────────────────────────────

fn translate(msg: u32, wparam: WPARAM) -> Message {
    match msg {
        WM_CREATE => Message::Create,
        WM_CLOSE => Message::Close,
        WM_DESTROY => Message::Destroy,
        WM_HOTKEY => Message::Hotkey(wparam.0 as i32),
        _ => Message::Other,
    }
}

// SAFETY: wnd_proc is registered as lpfnWndProc in WNDCLASSEXW.
// Windows guarantees that hwnd, msg, wparam, and lparam are valid for the
// lifetime of this call; we must not store hwnd beyond the message handler.
unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let message = translate(msg, wparam);
    if message == Message::Create {
        attach(hwnd);
    }

    // The borrow ends before any effect runs: DestroyWindow re-enters here.
    let effect = WINDOWS.with(|w| {
        w.borrow_mut()
            .get_mut(&key(hwnd))
            .map(|app| app.handle(message))
    });

    match effect {
        Some(Effect::Handled) => LRESULT(0),
        Some(Effect::DestroyWindow) => {
            // SAFETY: hwnd is the window being closed; DestroyWindow sends
            // WM_DESTROY, which posts WM_QUIT.
            if let Err(e) = DestroyWindow(hwnd) {
                warn!(event = "window.destroy_failed", error = %e);
            }
            LRESULT(0)
        }
        Some(Effect::Quit(code)) => {
            detach(hwnd);
            // SAFETY: PostQuitMessage is always safe to call from WM_DESTROY.
            PostQuitMessage(code);
            LRESULT(0)
        }
        Some(Effect::ApplyStyle { active }) => {
            apply_style(hwnd, active);
            LRESULT(0)
        }
        // Default processing for unhandled messages and for messages that
        // arrive before WM_CREATE attached any state.
        // SAFETY: hwnd and message parameters are valid — provided by Windows.
        Some(Effect::Default) | None => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

// ── Click-through toggle ──────────────────────────────────────────────────────

/// Rewrite the extended style so its click-through bits match `active`.
///
/// A failed update is logged and otherwise ignored; the next hotkey press
/// tries again.
fn apply_style(hwnd: HWND, active: bool) {
    // SAFETY: hwnd is valid for the duration of the WndProc call.
    let current = unsafe { GetWindowLongW(hwnd, GWL_EXSTYLE) } as u32;
    let next = toggle::next_ex_style(current, active);

    // SetWindowLongW returns the previous value, which may legitimately be 0;
    // clear the last error first so a 0 return can be told apart.
    // SAFETY: both calls only touch thread-local error state and hwnd's style.
    let (previous, code) = unsafe {
        SetLastError(WIN32_ERROR(0));
        let previous = SetWindowLongW(hwnd, GWL_EXSTYLE, next as i32);
        (previous, GetLastError().0)
    };

    if previous == 0 && code != 0 {
        warn!(
            event = "window.style_update_failed",
            active,
            code,
            message = %report::message_for(&AppError::Win32 {
                function: "SetWindowLongW",
                code,
            })
        );
        return;
    }

    debug!(
        event = "window.style_applied",
        active,
        click_through = toggle::is_click_through(next),
        from = current,
        to = next
    );
}

// ── Error helpers ─────────────────────────────────────────────────────────────

/// Capture the current Win32 last-error code and wrap it in an `AppError`.
///
/// Call immediately after a Win32 function that signals failure — `GetLastError`
/// reads thread-local state that can be overwritten by any subsequent API call.
fn last_error(function: &'static str) -> AppError {
    // SAFETY: GetLastError reads thread-local state set by the last Win32 call.
    // It is always safe to call and never fails.
    let code = unsafe { GetLastError() };
    AppError::Win32 {
        function,
        code: code.0,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_lifecycle_messages() {
        assert_eq!(translate(WM_CREATE, WPARAM(0)), Message::Create);
        assert_eq!(translate(WM_CLOSE, WPARAM(0)), Message::Close);
        assert_eq!(translate(WM_DESTROY, WPARAM(0)), Message::Destroy);
    }

    #[test]
    fn translate_hotkey_carries_id() {
        assert_eq!(translate(WM_HOTKEY, WPARAM(1)), Message::Hotkey(1));
    }

    #[test]
    fn translate_everything_else_is_other() {
        // WM_PAINT
        assert_eq!(translate(0x000F, WPARAM(0)), Message::Other);
    }

    #[test]
    fn shared_bit_values_match_the_sdk() {
        use windows::Win32::UI::WindowsAndMessaging::{WS_EX_LAYERED, WS_EX_TRANSPARENT};
        assert_eq!(toggle::WS_EX_LAYERED, WS_EX_LAYERED.0);
        assert_eq!(toggle::WS_EX_TRANSPARENT, WS_EX_TRANSPARENT.0);
    }
}
