// ── Application state & message state machine ─────────────────────────────────
//
// A single `App` is created on startup and owned by the window controller for
// the lifetime of the window.  All mutations happen on the UI thread; there is
// no global mutable state.  The Win32 adapter translates raw window messages
// into `Message`, feeds them to `App::handle`, and carries out the returned
// `Effect`.

use tracing::{debug, info};

use crate::toggle;

// ── Messages ──────────────────────────────────────────────────────────────────

/// The window messages the controller cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Message {
    /// `WM_CREATE`: the window now exists and state has been attached.
    Create,
    /// `WM_CLOSE`: the user (or system) asked the window to close.
    Close,
    /// `WM_DESTROY`: the window is being torn down.
    Destroy,
    /// `WM_HOTKEY` carrying the registered hotkey id.
    Hotkey(i32),
    /// Anything else.
    Other,
}

/// What the adapter must do in response to a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Effect {
    /// Message consumed; return 0.
    Handled,
    /// Call `DestroyWindow`.
    DestroyWindow,
    /// Post `WM_QUIT` with this exit code.
    Quit(i32),
    /// Rewrite the extended style so that its click-through bits match `active`.
    ApplyStyle { active: bool },
    /// Hand the message to `DefWindowProcW`.
    Default,
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Top-level application state.
#[derive(Debug)]
pub(crate) struct App {
    /// `true` while the window carries the click-through style pair.
    pub(crate) active: bool,
    /// The hotkey id that toggles `active`.
    hotkey_id: i32,
    /// Number of toggles performed so far.
    toggles: u64,
}

impl App {
    pub(crate) fn new(active: bool, hotkey_id: i32) -> Self {
        Self {
            active,
            hotkey_id,
            toggles: 0,
        }
    }

    /// Extended style the window should be created with.
    pub(crate) fn initial_ex_style(&self) -> u32 {
        toggle::next_ex_style(0, self.active)
    }

    /// Advance the state machine by one message.
    pub(crate) fn handle(&mut self, msg: Message) -> Effect {
        match msg {
            Message::Create => {
                debug!(event = "app.attached", active = self.active);
                Effect::Handled
            }
            Message::Close => Effect::DestroyWindow,
            Message::Destroy => Effect::Quit(0),
            Message::Hotkey(id) if id == self.hotkey_id => self.on_hotkey(),
            Message::Hotkey(id) => {
                debug!(event = "app.hotkey_ignored", id);
                Effect::Handled
            }
            Message::Other => Effect::Default,
        }
    }

    fn on_hotkey(&mut self) -> Effect {
        self.active = !self.active;
        self.toggles += 1;
        info!(
            event = "app.toggle_completed",
            active = self.active,
            toggles = self.toggles
        );
        Effect::ApplyStyle {
            active: self.active,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_messages() {
        let mut app = App::new(true, 1);
        assert_eq!(app.handle(Message::Create), Effect::Handled);
        assert_eq!(app.handle(Message::Close), Effect::DestroyWindow);
        assert_eq!(app.handle(Message::Destroy), Effect::Quit(0));
        assert_eq!(app.handle(Message::Other), Effect::Default);
        assert!(app.active, "lifecycle messages must not toggle");
    }

    #[test]
    fn hotkey_flips_and_requests_style() {
        let mut app = App::new(true, 1);
        assert_eq!(
            app.handle(Message::Hotkey(1)),
            Effect::ApplyStyle { active: false }
        );
        assert_eq!(
            app.handle(Message::Hotkey(1)),
            Effect::ApplyStyle { active: true }
        );
    }

    #[test]
    fn active_tracks_parity_of_activations() {
        for n in 0..9u32 {
            let mut app = App::new(true, 1);
            for _ in 0..n {
                app.handle(Message::Hotkey(1));
            }
            assert_eq!(app.active, n % 2 == 0, "after {n} activations");
        }
    }

    #[test]
    fn foreign_hotkey_id_is_ignored() {
        let mut app = App::new(true, 1);
        assert_eq!(app.handle(Message::Hotkey(2)), Effect::Handled);
        assert!(app.active);
    }

    #[test]
    fn initial_style_honours_start_state() {
        assert_eq!(App::new(true, 1).initial_ex_style(), toggle::CLICK_THROUGH);
        assert_eq!(App::new(false, 1).initial_ex_style(), 0);
    }
}
