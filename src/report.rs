// ── Error reporting ───────────────────────────────────────────────────────────
//
// Turns an `AppError` into the one-line text shown to the user,
// `[<code>] <operation>: <description>`, logs it, and puts it in a modal
// dialog.  Whether the process then exits is the caller's decision.

use tracing::{error, warn};

use crate::error::AppError;

/// Dialog title for every report.
pub(crate) const DIALOG_TITLE: &str = "Error";

/// Used when the OS has no text for a code.
const UNKNOWN_ERROR: &str = "Unknown error";

/// How bad a reported error is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Severity {
    /// The process will exit after the dialog is dismissed.
    Fatal,
    /// The process carries on.
    Recoverable,
}

/// Format a report line.
///
/// System messages end in `".\r\n"`; that tail is dropped so the line reads
/// cleanly in a dialog and in logs.
pub(crate) fn format_report(code: u32, operation: &str, description: &str) -> String {
    let description = description.trim_end().trim_end_matches('.');
    let description = if description.is_empty() {
        UNKNOWN_ERROR
    } else {
        description
    };
    format!("[{code}] {operation}: {description}")
}

/// The user-facing text for `err`.
pub(crate) fn message_for(err: &AppError) -> String {
    match err {
        AppError::Win32 { function, code } => {
            format_report(*code, function, &describe(*code))
        }
        other => other.to_string(),
    }
}

/// Log `err` and show it in a blocking modal dialog.
pub(crate) fn report(err: &AppError, severity: Severity) {
    let text = message_for(err);
    match severity {
        Severity::Fatal => error!(event = "report.fatal", message = %text),
        Severity::Recoverable => warn!(event = "report.recoverable", message = %text),
    }
    show(&text);
}

#[cfg(windows)]
fn describe(code: u32) -> String {
    crate::platform::win32::dialogs::system_message(code).unwrap_or_default()
}

#[cfg(not(windows))]
fn describe(code: u32) -> String {
    std::io::Error::from_raw_os_error(code as i32).to_string()
}

#[cfg(windows)]
fn show(text: &str) {
    crate::platform::win32::dialogs::show_error_dialog(DIALOG_TITLE, text);
}

// No dialog without a window system; the log line above is the report.
#[cfg(not(windows))]
fn show(_text: &str) {}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_access_denied() {
        assert_eq!(
            format_report(5, "CreateWindowEx", "Access is denied.\r\n"),
            "[5] CreateWindowEx: Access is denied"
        );
    }

    #[test]
    fn keeps_description_without_trailing_punctuation() {
        assert_eq!(
            format_report(1410, "RegisterClass", "Class already exists"),
            "[1410] RegisterClass: Class already exists"
        );
    }

    #[test]
    fn empty_description_falls_back() {
        assert_eq!(
            format_report(0xDEAD, "GetMessage", " \r\n"),
            "[57005] GetMessage: Unknown error"
        );
    }

    #[test]
    fn non_win32_errors_use_display() {
        assert_eq!(
            message_for(&AppError::Unsupported),
            "clickthru only runs on Windows"
        );
    }

    #[test]
    fn win32_errors_carry_code_and_function() {
        let text = message_for(&AppError::Win32 {
            function: "CreateWindowExW",
            code: 5,
        });
        assert!(text.starts_with("[5] CreateWindowExW: "), "{text}");
    }
}
