// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The window and input event vocabulary shared with the platform layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A window or input event produced by the platform layer.
///
/// Events are small `Copy` values: they are copied into the [`EventQueue`] and
/// copied back out, with no ownership transfer beyond that.
///
/// [`EventQueue`]: super::EventQueue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    /// The window was closed or the application was asked to quit.
    Quit,
    /// A key went down.
    KeyDown {
        /// The virtual-key code of the key.
        key: KeyCode,
    },
    /// A key went up.
    KeyUp {
        /// The virtual-key code of the key.
        key: KeyCode,
    },
    /// A mouse button was pressed.
    ButtonDown {
        /// The button that was pressed.
        button: MouseButton,
    },
    /// A mouse button was released.
    ButtonUp {
        /// The button that was released.
        button: MouseButton,
    },
    /// The cursor moved, in client-area coordinates.
    MouseMove {
        /// The new x-coordinate of the cursor.
        x: i32,
        /// The new y-coordinate of the cursor.
        y: i32,
    },
    /// The mouse wheel was scrolled.
    MouseWheel {
        /// The horizontal component reported with the scroll.
        x: i32,
        /// The vertical component reported with the scroll.
        y: i32,
    },
    /// A character was typed.
    Char {
        /// The translated character.
        character: char,
    },
    /// The window gained keyboard focus.
    SetFocus,
    /// The window lost keyboard focus.
    LostFocus,
    /// The client area changed size.
    Resized {
        /// The new client width, in pixels.
        width: i32,
        /// The new client height, in pixels.
        height: i32,
    },
    /// The window was minimized.
    Minimized,
    /// The window was maximized.
    Maximized,
}

/// The payload-free discriminant of an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum EventKind {
    Quit,
    KeyDown,
    KeyUp,
    ButtonDown,
    ButtonUp,
    MouseMove,
    MouseWheel,
    Char,
    SetFocus,
    LostFocus,
    Resized,
    Minimized,
    Maximized,
}

impl Event {
    /// Returns the discriminant of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Quit => EventKind::Quit,
            Event::KeyDown { .. } => EventKind::KeyDown,
            Event::KeyUp { .. } => EventKind::KeyUp,
            Event::ButtonDown { .. } => EventKind::ButtonDown,
            Event::ButtonUp { .. } => EventKind::ButtonUp,
            Event::MouseMove { .. } => EventKind::MouseMove,
            Event::MouseWheel { .. } => EventKind::MouseWheel,
            Event::Char { .. } => EventKind::Char,
            Event::SetFocus => EventKind::SetFocus,
            Event::LostFocus => EventKind::LostFocus,
            Event::Resized { .. } => EventKind::Resized,
            Event::Minimized => EventKind::Minimized,
            Event::Maximized => EventKind::Maximized,
        }
    }

    /// Returns `true` for keyboard, mouse and text events.
    pub fn is_input(&self) -> bool {
        matches!(
            self.kind(),
            EventKind::KeyDown
                | EventKind::KeyUp
                | EventKind::ButtonDown
                | EventKind::ButtonUp
                | EventKind::MouseMove
                | EventKind::MouseWheel
                | EventKind::Char
        )
    }
}

/// A virtual-key code, in the `0..=255` range of the platform key table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyCode(pub u8);

#[allow(missing_docs)]
impl KeyCode {
    pub const BACKSPACE: Self = Self(0x08);
    pub const TAB: Self = Self(0x09);
    pub const CLEAR: Self = Self(0x0C);
    pub const RETURN: Self = Self(0x0D);
    pub const SHIFT: Self = Self(0x10);
    pub const CONTROL: Self = Self(0x11);
    pub const ALT: Self = Self(0x12);
    pub const PAUSE: Self = Self(0x13);
    pub const CAPSLOCK: Self = Self(0x14);
    pub const ESCAPE: Self = Self(0x1B);
    pub const SPACE: Self = Self(0x20);
    pub const PAGE_UP: Self = Self(0x21);
    pub const PAGE_DOWN: Self = Self(0x22);
    pub const END: Self = Self(0x23);
    pub const HOME: Self = Self(0x24);
    pub const LEFT: Self = Self(0x25);
    pub const UP: Self = Self(0x26);
    pub const RIGHT: Self = Self(0x27);
    pub const DOWN: Self = Self(0x28);
    pub const PRINT_SCREEN: Self = Self(0x2C);
    pub const INSERT: Self = Self(0x2D);
    pub const DELETE: Self = Self(0x2E);
    pub const NUMPAD0: Self = Self(0x60);
    pub const MULTIPLY: Self = Self(0x6A);
    pub const ADD: Self = Self(0x6B);
    pub const SUBTRACT: Self = Self(0x6D);
    pub const DECIMAL: Self = Self(0x6E);
    pub const DIVIDE: Self = Self(0x6F);
    pub const F1: Self = Self(0x70);
    pub const NUMLOCK: Self = Self(0x90);
    pub const SCROLL: Self = Self(0x91);
    pub const LEFT_SHIFT: Self = Self(0xA0);
    pub const RIGHT_SHIFT: Self = Self(0xA1);
    pub const LEFT_CONTROL: Self = Self(0xA2);
    pub const RIGHT_CONTROL: Self = Self(0xA3);
    pub const LEFT_ALT: Self = Self(0xA4);
    pub const RIGHT_ALT: Self = Self(0xA5);
}

impl KeyCode {
    /// The key code of an ASCII letter or digit, case-insensitive.
    ///
    /// Returns `None` for any other character.
    pub const fn from_char(character: char) -> Option<Self> {
        match character {
            'a'..='z' => Some(Self(character as u8 - b'a' + b'A')),
            'A'..='Z' | '0'..='9' => Some(Self(character as u8)),
            _ => None,
        }
    }

    /// The key code of numeric keypad key `digit` (`0..=9`).
    pub const fn numpad(digit: u8) -> Option<Self> {
        if digit <= 9 {
            Some(Self(Self::NUMPAD0.0 + digit))
        } else {
            None
        }
    }

    /// The key code of function key `F{n}` (`1..=24`).
    pub const fn function(n: u8) -> Option<Self> {
        if n >= 1 && n <= 24 {
            Some(Self(Self::F1.0 + n - 1))
        } else {
            None
        }
    }

    /// The raw virtual-key value, usable as an index into 256-entry key tables.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

/// A mouse button.
///
/// Buttons compare and hash by their platform [`code`](Self::code), so
/// `Other(0x01)` equals `Left`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum MouseButton {
    /// The left (primary) button.
    Left,
    /// The right (secondary) button.
    Right,
    /// The middle button or wheel click.
    Middle,
    /// Another button, identified by its platform code.
    ///
    /// Codes `0x01`, `0x02` and `0x04` denote the named buttons:
    /// [`from_code`](Self::from_code) returns `Left`, `Right` or `Middle` for them.
    Other(u8),
}

impl PartialEq for MouseButton {
    fn eq(&self, other: &Self) -> bool {
        self.code() == other.code()
    }
}

impl Eq for MouseButton {}

impl Hash for MouseButton {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code().hash(state);
    }
}

impl MouseButton {
    /// The platform button code (`Left = 0x01`, `Right = 0x02`, `Middle = 0x04`).
    pub const fn code(self) -> u8 {
        match self {
            MouseButton::Left => 0x01,
            MouseButton::Right => 0x02,
            MouseButton::Middle => 0x04,
            MouseButton::Other(code) => code,
        }
    }

    /// Maps a platform button code back to a [`MouseButton`].
    pub const fn from_code(code: u8) -> Self {
        match code {
            0x01 => MouseButton::Left,
            0x02 => MouseButton::Right,
            0x04 => MouseButton::Middle,
            other => MouseButton::Other(other),
        }
    }
}
