// ── Event loop orchestration ──────────────────────────────────────────────────
//
// The startup → pump → shutdown sequence, written against the `Desktop` trait
// so that the ordering rules (hotkey registered after the window exists,
// unregistered once after the loop ends) hold for every backend.

use tracing::{info, warn};

use crate::{
    app::App,
    config::Config,
    error::{AppError, Result},
    report::{self, Severity},
};

/// Everything the loop needs from a window system.
pub(crate) trait Desktop {
    /// Opaque window handle.
    type Window: Copy;

    /// Register a window class named `title`, create one window of it, and
    /// attach `app` to it.
    fn create_window(&mut self, title: &str, app: App) -> Result<Self::Window>;

    /// Register the global hotkey against `window`.
    fn register_hotkey(&mut self, window: Self::Window, config: &Config) -> Result<()>;

    fn show(&mut self, window: Self::Window);

    /// Pump messages until the quit signal; returns its exit code.
    fn pump(&mut self) -> Result<i32>;

    fn unregister_hotkey(&mut self, window: Self::Window, id: i32) -> Result<()>;

    /// Tell the user about an error the loop survives.
    fn notify(&mut self, err: &AppError) {
        report::report(err, Severity::Recoverable);
    }
}

/// Run the tool to completion and return the process exit code.
pub(crate) fn run<D: Desktop>(desktop: &mut D, config: &Config) -> Result<i32> {
    let app = App::new(config.start_active, config.hotkey.id);
    let window = desktop.create_window(&config.window_title, app)?;

    let registered = match desktop.register_hotkey(window, config) {
        Ok(()) => {
            info!(
                event = "hotkey.registered",
                id = config.hotkey.id,
                key = %config.hotkey.key,
                modifiers = config.hotkey.modifier_bits()
            );
            true
        }
        Err(e) => {
            // The window still works (it can be closed); the tool is just inert.
            desktop.notify(&e);
            false
        }
    };

    desktop.show(window);

    let code = desktop.pump()?;
    info!(event = "loop.exited", code);

    if registered {
        if let Err(e) = desktop.unregister_hotkey(window, config.hotkey.id) {
            warn!(event = "hotkey.unregister_failed", error = %e);
        }
    }

    Ok(code)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
