//! The [`Host`] trait: what the layer walker needs from the desktop.
//!
//! The walker only ever presses key chords and reads clipboard text, so that
//! is the whole surface. [`crate::DesktopHost`] drives the real desktop;
//! tests script a fake.

use crate::chord::KeyChord;
use anyhow::Result;
use async_trait::async_trait;

/// Input and clipboard capabilities of the machine running the host application.
///
/// Implementations must not wait for the application to react; the walker
/// inserts its own settle pauses between calls.
#[async_trait(?Send)]
pub trait Host {
    /// Press `chord` once: modifiers down in order, key click, modifiers up.
    async fn press(&mut self, chord: &KeyChord) -> Result<()>;

    /// Read the current text content of the system clipboard.
    async fn read_clipboard(&mut self) -> Result<String>;
}
