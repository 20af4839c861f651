// ── Platform abstraction layer ────────────────────────────────────────────────
//
// This module defines the public interface that the rest of the codebase uses
// to talk to the OS.  No `unsafe` lives here; all Win32 FFI is confined to the
// `win32` sub-module and never leaks outward.

use crate::{config::Config, error::Result};

#[cfg(windows)]
pub mod win32;

/// Drive the event loop on the native window system.
#[cfg(windows)]
pub(crate) fn run(config: &Config) -> Result<i32> {
    let mut desktop = win32::window::Win32Desktop::new()?;
    crate::event_loop::run(&mut desktop, config)
}

#[cfg(not(windows))]
pub(crate) fn run(_config: &Config) -> Result<i32> {
    Err(crate::error::AppError::Unsupported)
}
