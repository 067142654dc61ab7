//! Keyboard event mapping.
//!
//! The device receives the host's native scan code and modifier state
//! unchanged, plus the ASCII character the key produced (0 when none).

use vlcd_protocol::InputEvent;

/// A key transition captured from the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub keycode: u16,
    pub pressed: bool,
    pub repeat: bool,
    /// Host modifier state; only the low 16 bits reach the device.
    pub modifiers: u32,
    /// Text produced by the key, if any.
    pub text: String,
}

impl KeyInput {
    pub fn new(keycode: u16, pressed: bool) -> Self {
        Self {
            keycode,
            pressed,
            repeat: false,
            modifiers: 0,
            text: String::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_modifiers(mut self, modifiers: u32) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }

    /// Builds the wire event.
    pub fn to_event(&self) -> InputEvent {
        InputEvent::keyboard(
            self.pressed,
            self.repeat,
            self.keycode,
            self.modifiers,
            ascii_of(&self.text),
        )
    }
}

/// First ASCII character in `text`, skipping non-ASCII ones; 0 if none.
pub fn ascii_of(text: &str) -> u8 {
    text.chars()
        .find(char::is_ascii)
        .map(|c| c as u8)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_of() {
        assert_eq!(ascii_of("a"), b'a');
        assert_eq!(ascii_of(""), 0);
        assert_eq!(ascii_of("é"), 0);
        assert_eq!(ascii_of("éx"), b'x');
        assert_eq!(ascii_of("\r"), b'\r');
    }

    #[test]
    fn test_to_event() {
        let ev = KeyInput::new(30, true)
            .with_text("a")
            .with_modifiers(0x1_0001)
            .repeated()
            .to_event();
        assert_eq!(
            ev,
            InputEvent::Keyboard {
                pressed: true,
                repeat: true,
                keycode: 30,
                modifiers: 0x0001,
                ascii: b'a',
            }
        );
    }
}
