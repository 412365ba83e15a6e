//! Keyboard input simulation via SendInput.
//!
//! Uses scan codes with `KEYEVENTF_SCANCODE` so the game's input layer
//! recognizes the presses the same way it would physical keys.

use std::time::Duration;

use crate::error::Result;

/// Keys the scanner needs to drive the achievement list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameKey {
    Up,
    Down,
    /// Cycles to the next achievement tab.
    NextTab,
}

impl GameKey {
    /// Virtual key code for `MapVirtualKeyW` lookup.
    #[cfg(target_os = "windows")]
    fn virtual_key(self) -> u16 {
        use windows::Win32::UI::Input::KeyboardAndMouse::{VK_DOWN, VK_UP};
        match self {
            Self::Up => VK_UP.0,
            Self::Down => VK_DOWN.0,
            // 'E' cycles the achievement tabs.
            Self::NextTab => 0x45,
        }
    }
}

/// Send a key press (down + hold + up) for the given key.
///
/// Arrow keys carry the `KEYEVENTF_EXTENDEDKEY` flag so their scan codes are
/// not confused with the numpad.
#[cfg(target_os = "windows")]
pub fn send_key_press(key: GameKey, hold: Duration) -> Result<()> {
    use windows::Win32::UI::Input::KeyboardAndMouse::{
        INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP,
        KEYEVENTF_SCANCODE, MAPVK_VK_TO_VSC, MapVirtualKeyW, SendInput, VIRTUAL_KEY,
    };

    use crate::error::Error;

    let scan = unsafe { MapVirtualKeyW(key.virtual_key() as u32, MAPVK_VK_TO_VSC) } as u16;

    let is_extended = matches!(key, GameKey::Up | GameKey::Down);

    let mut flags_down = KEYEVENTF_SCANCODE;
    let mut flags_up = KEYEVENTF_SCANCODE | KEYEVENTF_KEYUP;
    if is_extended {
        flags_down |= KEYEVENTF_EXTENDEDKEY;
        flags_up |= KEYEVENTF_EXTENDEDKEY;
    }

    let down = INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(0),
                wScan: scan,
                dwFlags: flags_down,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    };

    let up = INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(0),
                wScan: scan,
                dwFlags: flags_up,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    };

    // SAFETY: SendInput is called with properly initialized INPUT structs.
    let sent = unsafe { SendInput(&[down], std::mem::size_of::<INPUT>() as i32) };
    if sent == 0 {
        return Err(Error::Input(format!(
            "SendInput (key down) failed: {}",
            std::io::Error::last_os_error()
        )));
    }

    std::thread::sleep(hold);

    let sent = unsafe { SendInput(&[up], std::mem::size_of::<INPUT>() as i32) };
    if sent == 0 {
        return Err(Error::Input(format!(
            "SendInput (key up) failed: {}",
            std::io::Error::last_os_error()
        )));
    }

    Ok(())
}

#[cfg(not(target_os = "windows"))]
pub fn send_key_press(_key: GameKey, _hold: Duration) -> Result<()> {
    Err(crate::error::Error::Input(
        "key input is only supported on Windows".to_string(),
    ))
}
