// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except `platform::win32` (Win32 FFI).
// Each unsafe block there MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]
// The event loop and style code are only driven by the Win32 backend; other
// hosts build them for the unit tests.
#![cfg_attr(not(windows), allow(dead_code))]

// Release builds run as a GUI application (no console window).
// Debug builds keep the console so that log output is visible.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod config;
mod error;
mod event_loop;
mod logging;
mod platform;
mod report;
mod toggle;

use tracing::info;

use crate::report::Severity;

fn main() {
    logging::init();
    info!(event = "main.started", version = env!("CARGO_PKG_VERSION"));

    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            // Startup failed before or during the message loop.
            report::report(&e, Severity::Fatal);
            std::process::exit(e.exit_code());
        }
    }
}

fn run() -> error::Result<i32> {
    let config = config::load()?;
    platform::run(&config)
}
