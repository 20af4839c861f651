// ── Central error type ────────────────────────────────────────────────────────
//
// All fallible operations in clickthru return `error::Result<T>`.  No panics
// in production paths; fatal errors travel back to `main`, which reports them
// (see `report::report`) and picks the process exit status.

use std::path::PathBuf;

use thiserror::Error;

/// Every error that clickthru can produce.
#[derive(Debug, Error)]
pub enum AppError {
    /// A Win32 API call returned a failure code.
    #[error("{function} failed (error {code})")]
    Win32 {
        /// The name of the failing function, for display purposes.
        function: &'static str,
        /// The raw Win32 error code (`GetLastError()` value).
        code: u32,
    },

    /// The config file exists but is not valid.
    #[error("invalid config file {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The config file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// This host has no Win32 window system.
    #[error("clickthru only runs on Windows")]
    Unsupported,
}

impl AppError {
    /// Build a `Win32` error from a `windows::core::Error`.
    ///
    /// HRESULTs with facility WIN32 (`0x8007xxxx`) carry the underlying
    /// `GetLastError` code in their low word; unwrap it so reports show the
    /// same number the OS documents.
    pub(crate) fn from_hresult(function: &'static str, hresult: i32) -> Self {
        let bits = hresult as u32;
        let code = if bits & 0xFFFF_0000 == 0x8007_0000 {
            bits & 0xFFFF
        } else {
            bits
        };
        Self::Win32 { function, code }
    }

    /// Process exit status for a fatal error.
    ///
    /// Win32 failures exit with the raw error code; everything else exits 1.
    pub(crate) fn exit_code(&self) -> i32 {
        match self {
            Self::Win32 { code, .. } => *code as i32,
            _ => 1,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AppError>;

// ── Tests ─────────────────────────────────────────────────────────────────────
