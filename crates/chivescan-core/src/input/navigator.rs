//! Keyboard-driven cursor navigation.

use std::time::Duration;

use super::Navigate;
use super::keyboard::{GameKey, send_key_press};
use crate::config::timing;
use crate::error::Result;

/// Drives the achievement list with simulated key presses.
///
/// Settle delays between steps are the scan controller's responsibility; this
/// type only owns the key press mechanics and the wake gesture.
pub struct KeyNavigator {
    key_hold: Duration,
    wake_wait: Duration,
}

impl KeyNavigator {
    pub fn new() -> Self {
        Self {
            key_hold: Duration::from_millis(timing::KEY_HOLD_MS),
            wake_wait: Duration::from_millis(timing::WAKE_WAIT_MS),
        }
    }
}

impl Default for KeyNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigate for KeyNavigator {
    fn wake(&mut self) -> Result<()> {
        // A long Up press nudges the UI out of any idle/screensaver state
        // without moving the cursor off the first row.
        send_key_press(GameKey::Up, self.wake_wait)?;
        std::thread::sleep(self.wake_wait);
        Ok(())
    }

    fn advance_row(&mut self) -> Result<()> {
        send_key_press(GameKey::Down, self.key_hold)
    }

    fn advance_page(&mut self) -> Result<()> {
        send_key_press(GameKey::NextTab, self.key_hold)
    }

    fn reset_row_cursor(&mut self) -> Result<()> {
        // Switching tabs snaps the list back to the top; no input needed.
        Ok(())
    }

    fn is_focused(&self) -> bool {
        game_window_focused()
    }
}

/// Check whether the foreground window is the game.
#[cfg(target_os = "windows")]
fn game_window_focused() -> bool {
    use windows::Win32::UI::WindowsAndMessaging::{GetForegroundWindow, GetWindowTextW};

    use crate::capture::WINDOW_TITLES;

    // SAFETY: GetForegroundWindow is always safe to call; GetWindowTextW
    // writes at most buf.len() - 1 UTF-16 units into the buffer.
    let hwnd = unsafe { GetForegroundWindow() };
    if hwnd.is_invalid() {
        return false;
    }
    let mut buf = [0u16; 256];
    let len = unsafe { GetWindowTextW(hwnd, &mut buf) } as usize;
    let title = String::from_utf16_lossy(&buf[..len.min(buf.len())]);
    WINDOW_TITLES.contains(&title.as_str())
}

#[cfg(not(target_os = "windows"))]
fn game_window_focused() -> bool {
    // Focus tracking is only available on Windows; rely on the cancellation
    // flag elsewhere.
    true
}
