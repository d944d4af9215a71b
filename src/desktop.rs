use crate::chord::{Key, KeyChord, Modifier};
use crate::host::Host;
use anyhow::{Context, Result, anyhow};
use arboard::Clipboard;
use async_trait::async_trait;
use enigo::{Direction, Enigo, Keyboard, Settings};
use tracing::debug;

/// [`Host`] backed by the real desktop: `enigo` for simulated input and
/// `arboard` for clipboard reads.
///
/// Keystrokes go to whichever window has focus. Nothing checks that it is
/// the intended application.
pub struct DesktopHost {
    enigo: Enigo,
    clipboard: Clipboard,
}

impl DesktopHost {
    /// Connect to the input system and the clipboard.
    pub fn new() -> Result<Self> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| anyhow!("Failed to initialize input simulation: {}", e))?;
        let clipboard = Clipboard::new().context("Failed to open clipboard")?;
        Ok(Self { enigo, clipboard })
    }

    fn key(&mut self, key: enigo::Key, direction: Direction) -> Result<()> {
        self.enigo
            .key(key, direction)
            .map_err(|e| anyhow!("Failed to send {:?} {:?}: {}", key, direction, e))
    }
}

#[async_trait(?Send)]
impl Host for DesktopHost {
    async fn press(&mut self, chord: &KeyChord) -> Result<()> {
        debug!(%chord, "Pressing chord");

        for m in &chord.modifiers {
            self.key(modifier_key(*m), Direction::Press)?;
        }

        let clicked = self.key(enigo_key(chord.key), Direction::Click);

        // Release everything even if the click failed so no modifier stays stuck.
        let mut released = Ok(());
        for m in chord.modifiers.iter().rev() {
            if let Err(e) = self.key(modifier_key(*m), Direction::Release) {
                released = Err(e);
            }
        }

        clicked
            .and(released)
            .with_context(|| format!("Failed to press {}", chord))
    }

    async fn read_clipboard(&mut self) -> Result<String> {
        clipboard_text(self.clipboard.get_text())
    }
}

/// An empty clipboard, or one holding no text, reads as an empty name.
fn clipboard_text(result: Result<String, arboard::Error>) -> Result<String> {
    match result {
        Ok(text) => Ok(text),
        Err(arboard::Error::ContentNotAvailable) => {
            debug!("Clipboard holds no text");
            Ok(String::new())
        }
        Err(e) => Err(e).context("Failed to read text from clipboard"),
    }
}

fn modifier_key(m: Modifier) -> enigo::Key {
    match m {
        Modifier::Ctrl => enigo::Key::Control,
        Modifier::Alt => enigo::Key::Alt,
        Modifier::Shift => enigo::Key::Shift,
        Modifier::Meta => enigo::Key::Meta,
    }
}

fn enigo_key(key: Key) -> enigo::Key {
    match key {
        // Shift is an explicit modifier, so letters are always sent unshifted.
        Key::Char(ch) => enigo::Key::Unicode(ch.to_ascii_lowercase()),
        Key::F(n) => function_key(n),
        Key::Escape => enigo::Key::Escape,
        Key::Enter => enigo::Key::Return,
        Key::Tab => enigo::Key::Tab,
        Key::Space => enigo::Key::Space,
        Key::Backspace => enigo::Key::Backspace,
        Key::Delete => enigo::Key::Delete,
        Key::Up => enigo::Key::UpArrow,
        Key::Down => enigo::Key::DownArrow,
        Key::Left => enigo::Key::LeftArrow,
        Key::Right => enigo::Key::RightArrow,
        Key::Home => enigo::Key::Home,
        Key::End => enigo::Key::End,
        Key::PageUp => enigo::Key::PageUp,
        Key::PageDown => enigo::Key::PageDown,
    }
}

fn function_key(n: u8) -> enigo::Key {
    match n {
        1 => enigo::Key::F1,
        2 => enigo::Key::F2,
        3 => enigo::Key::F3,
        4 => enigo::Key::F4,
        5 => enigo::Key::F5,
        6 => enigo::Key::F6,
        7 => enigo::Key::F7,
        8 => enigo::Key::F8,
        9 => enigo::Key::F9,
        10 => enigo::Key::F10,
        11 => enigo::Key::F11,
        // KeyChord parsing only admits F1-F12.
        _ => enigo::Key::F12,
    }
}
