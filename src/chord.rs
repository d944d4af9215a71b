//! [`KeyChord`] — a set of modifiers plus one key, pressed together.
//!
//! Chord syntax: `F2`, `Escape`, `Alt+[`, `Ctrl+C`, `Shift+Alt+E`.
//! Modifier and named-key names are case-insensitive. A trailing `++`
//! means the `+` key itself (`Ctrl++`).

use anyhow::{Result, anyhow};
use std::fmt;
use std::str::FromStr;

/// A modifier held down while the chord's key is clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Ctrl,
    Alt,
    Shift,
    Meta,
}

impl Modifier {
    fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => Ok(Self::Ctrl),
            "alt" | "option" => Ok(Self::Alt),
            "shift" => Ok(Self::Shift),
            "meta" | "cmd" | "super" | "win" => Ok(Self::Meta),
            _ => Err(anyhow!("Unknown modifier: {}", name)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ctrl => "Ctrl",
            Self::Alt => "Alt",
            Self::Shift => "Shift",
            Self::Meta => "Meta",
        }
    }
}

/// The non-modifier key of a chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    F(u8),
    Escape,
    Enter,
    Tab,
    Space,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

impl Key {
    fn parse(name: &str) -> Result<Self> {
        let mut chars = name.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            // `Ctrl+C` and `Ctrl+c` press the same key; Shift is spelled out.
            return Ok(Self::Char(ch.to_ascii_lowercase()));
        }

        let lower = name.to_ascii_lowercase();
        if let Some(n) = lower.strip_prefix('f') {
            if let Ok(n) = n.parse::<u8>() {
                if (1..=12).contains(&n) {
                    return Ok(Self::F(n));
                }
                return Err(anyhow!("Function key out of range (F1-F12): {}", name));
            }
        }

        match lower.as_str() {
            "escape" | "esc" => Ok(Self::Escape),
            "enter" | "return" => Ok(Self::Enter),
            "tab" => Ok(Self::Tab),
            "space" => Ok(Self::Space),
            "backspace" => Ok(Self::Backspace),
            "delete" | "del" => Ok(Self::Delete),
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "home" => Ok(Self::Home),
            "end" => Ok(Self::End),
            "pageup" => Ok(Self::PageUp),
            "pagedown" => Ok(Self::PageDown),
            "" => Err(anyhow!("Missing key in chord")),
            _ => Err(anyhow!("Unknown key: {}", name)),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(' ') => f.write_str("Space"),
            Self::Char(ch) => write!(f, "{}", ch.to_uppercase()),
            Self::F(n) => write!(f, "F{}", n),
            Self::Escape => f.write_str("Escape"),
            Self::Enter => f.write_str("Enter"),
            Self::Tab => f.write_str("Tab"),
            Self::Space => f.write_str("Space"),
            Self::Backspace => f.write_str("Backspace"),
            Self::Delete => f.write_str("Delete"),
            Self::Up => f.write_str("Up"),
            Self::Down => f.write_str("Down"),
            Self::Left => f.write_str("Left"),
            Self::Right => f.write_str("Right"),
            Self::Home => f.write_str("Home"),
            Self::End => f.write_str("End"),
            Self::PageUp => f.write_str("PageUp"),
            Self::PageDown => f.write_str("PageDown"),
        }
    }
}

/// Modifiers plus a key, pressed in order and released in reverse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyChord {
    pub modifiers: Vec<Modifier>,
    pub key: Key,
}

impl KeyChord {
    /// A chord with no modifiers.
    pub fn key(key: Key) -> Self {
        Self {
            modifiers: Vec::new(),
            key,
        }
    }

    pub fn with_modifiers(modifiers: impl Into<Vec<Modifier>>, key: Key) -> Self {
        Self {
            modifiers: modifiers.into(),
            key,
        }
    }
}

impl FromStr for KeyChord {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow!("Empty key chord"));
        }
        if s == "+" {
            return Ok(Self::key(Key::Char('+')));
        }

        let (mods, key) = match s.strip_suffix("++") {
            Some(rest) => (rest, "+"),
            None => s.rsplit_once('+').unwrap_or(("", s)),
        };

        let modifiers = if mods.is_empty() {
            Vec::new()
        } else {
            mods.split('+')
                .map(|m| Modifier::parse(m.trim()))
                .collect::<Result<Vec<_>>>()?
        };

        Ok(Self {
            modifiers,
            key: Key::parse(key.trim())?,
        })
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in &self.modifiers {
            write!(f, "{}+", m.as_str())?;
        }
        write!(f, "{}", self.key)
    }
}
