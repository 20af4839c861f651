// ── Error dialog & system error text ──────────────────────────────────────────
//
// This is inside `platform::win32` so `unsafe` is permitted per crate policy.

#![allow(unsafe_code)]

use windows::{
    core::{PCWSTR, PWSTR},
    Win32::{
        Foundation::HWND,
        System::Diagnostics::Debug::{
            FormatMessageW, FORMAT_MESSAGE_FROM_SYSTEM, FORMAT_MESSAGE_IGNORE_INSERTS,
        },
        UI::WindowsAndMessaging::{MessageBoxW, MB_ICONERROR, MB_OK},
    },
};

/// Buffer size in `WCHAR`s for `FormatMessageW`.  System messages are well
/// under this; longer ones are truncated by the API, not overrun.
const MESSAGE_BUF_LEN: usize = 512;

/// `MAKELANGID(LANG_NEUTRAL, SUBLANG_DEFAULT)`.
const LANG_NEUTRAL_DEFAULT: u32 = 0x0400;

/// Show a modal OK dialog with the error icon.  Blocks until dismissed.
pub(crate) fn show_error_dialog(title: &str, message: &str) {
    let msg_wide = to_wide(message);
    let title_wide = to_wide(title);

    // SAFETY: msg_wide and title_wide are valid null-terminated UTF-16 strings
    // that remain allocated for the duration of the MessageBoxW call.
    // HWND::default() (null) means the dialog has no owner window.
    // Return value (button pressed) is intentionally unused for an error dialog.
    unsafe {
        let _ = MessageBoxW(
            HWND::default(),
            PCWSTR(msg_wide.as_ptr()),
            PCWSTR(title_wide.as_ptr()),
            MB_OK | MB_ICONERROR,
        );
    }
}

/// The system's description of a Win32 error code, or `None` if it has none.
pub(crate) fn system_message(code: u32) -> Option<String> {
    let mut buf = [0u16; MESSAGE_BUF_LEN];

    // SAFETY: buf is a writable array of MESSAGE_BUF_LEN WCHARs and nSize
    // matches it.  FORMAT_MESSAGE_IGNORE_INSERTS means no argument array is
    // read; FROM_SYSTEM means no source module is read.
    let len = unsafe {
        FormatMessageW(
            FORMAT_MESSAGE_FROM_SYSTEM | FORMAT_MESSAGE_IGNORE_INSERTS,
            None,
            code,
            LANG_NEUTRAL_DEFAULT,
            PWSTR(buf.as_mut_ptr()),
            MESSAGE_BUF_LEN as u32,
            None,
        )
    };

    if len == 0 {
        return None;
    }
    Some(String::from_utf16_lossy(&buf[..len as usize]))
}

/// UTF-16 copy of `s` with a trailing null.
pub(crate) fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_wide_is_null_terminated() {
        assert_eq!(to_wide("ab"), vec![0x61, 0x62, 0]);
        assert_eq!(to_wide(""), vec![0]);
    }

    #[test]
    fn access_denied_has_a_description() {
        let text = system_message(5).expect("ERROR_ACCESS_DENIED is a system message");
        assert!(!text.trim().is_empty());
    }
}
