// ── Click-through style arithmetic ────────────────────────────────────────────
//
// Pure bit manipulation on the window's extended style.  The Win32 adapter
// reads the current style, asks `next_ex_style` for the new one, and writes it
// back; nothing here touches the OS.

/// `WS_EX_TRANSPARENT`: hit-testing passes through to windows underneath.
pub(crate) const WS_EX_TRANSPARENT: u32 = 0x0000_0020;

/// `WS_EX_LAYERED`: the window is composited as a layered window.
pub(crate) const WS_EX_LAYERED: u32 = 0x0008_0000;

/// The pair of bits that together make the window click-through.
pub(crate) const CLICK_THROUGH: u32 = WS_EX_TRANSPARENT | WS_EX_LAYERED;

/// Compute the extended style for the given `active` state.
///
/// Active adds both click-through bits; inactive clears exactly those two and
/// leaves every other bit as it was.
pub(crate) fn next_ex_style(current: u32, active: bool) -> u32 {
    if active {
        current | CLICK_THROUGH
    } else {
        current & !CLICK_THROUGH
    }
}

/// `true` when `style` carries both click-through bits.
pub(crate) fn is_click_through(style: u32) -> bool {
    style & CLICK_THROUGH == CLICK_THROUGH
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const WS_EX_TOPMOST: u32 = 0x0000_0008;
    const WS_EX_TOOLWINDOW: u32 = 0x0000_0080;

    #[test]
    fn activate_adds_both_bits() {
        let s = next_ex_style(0, true);
        assert_eq!(s, WS_EX_TRANSPARENT | WS_EX_LAYERED);
        assert!(is_click_through(s));
    }

    #[test]
    fn activate_keeps_existing_bits() {
        let s = next_ex_style(WS_EX_TOPMOST | WS_EX_TOOLWINDOW, true);
        assert_eq!(s, WS_EX_TOPMOST | WS_EX_TOOLWINDOW | CLICK_THROUGH);
    }

    #[test]
    fn deactivate_clears_only_the_pair() {
        let before = WS_EX_TOPMOST | CLICK_THROUGH;
        assert_eq!(next_ex_style(before, false), WS_EX_TOPMOST);
    }

    #[test]
    fn deactivate_does_not_zero_the_style() {
        // `cur & !(a | b)` in C evaluates to 0; the bitwise form must not.
        let s = next_ex_style(WS_EX_TOOLWINDOW | WS_EX_LAYERED, false);
        assert_eq!(s, WS_EX_TOOLWINDOW);
        assert_ne!(s, 0);
    }

    #[test]
    fn half_set_pair_is_not_click_through() {
        assert!(!is_click_through(WS_EX_LAYERED));
        assert!(!is_click_through(WS_EX_TRANSPARENT));
    }

    #[test]
    fn activation_is_idempotent() {
        let once = next_ex_style(WS_EX_TOPMOST, true);
        assert_eq!(next_ex_style(once, true), once);
    }
}
