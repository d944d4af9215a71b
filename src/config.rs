//! [`WalkConfig`] — shortcut bindings and names the layer walker runs with.
//!
//! Defaults match CLIP STUDIO PAINT's stock shortcuts and its Japanese UI,
//! where the bottom paper layer is called `用紙`.

use crate::chord::{Key, KeyChord, Modifier};
use std::time::Duration;

pub const DEFAULT_APP_NAME: &str = "CLIP STUDIO PAINT";
pub const DEFAULT_MARKER: &str = "#";
pub const DEFAULT_BOTTOM_LAYER: &str = "用紙";

/// Everything the layer walk depends on besides the [`crate::Host`].
#[derive(Debug, Clone, PartialEq)]
pub struct WalkConfig {
    /// Window title shown in the focus prompt.
    pub app_name: String,
    /// Opens the layer rename field, pre-filled with the current name.
    pub rename: KeyChord,
    /// Copies the rename field's text to the clipboard.
    pub copy: KeyChord,
    /// Dismisses the rename field without committing.
    pub cancel: KeyChord,
    /// "Merge selected layers".
    pub merge: KeyChord,
    /// Moves the active layer one position down.
    pub down: KeyChord,
    /// Layers whose name contains this are merged.
    pub marker: String,
    /// The walk stops after reading a layer with exactly this name.
    pub bottom: String,
    /// Pause after each simulated input so the UI can catch up.
    pub settle_delay: Duration,
    /// Time the operator gets to focus the application before the walk.
    pub focus_delay: Duration,
    /// Fail after reading this many layers without reaching `bottom`.
    pub limit: Option<usize>,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            rename: KeyChord::key(Key::F(2)),
            copy: KeyChord::with_modifiers([Modifier::Ctrl], Key::Char('c')),
            cancel: KeyChord::key(Key::Escape),
            merge: KeyChord::with_modifiers([Modifier::Shift, Modifier::Alt], Key::Char('e')),
            down: KeyChord::with_modifiers([Modifier::Alt], Key::Char('[')),
            marker: DEFAULT_MARKER.to_string(),
            bottom: DEFAULT_BOTTOM_LAYER.to_string(),
            settle_delay: Duration::from_millis(50),
            focus_delay: Duration::from_secs(3),
            limit: None,
        }
    }
}

impl WalkConfig {
    /// Default bindings with no pauses, for driving a fake host.
    pub fn immediate() -> Self {
        Self {
            settle_delay: Duration::ZERO,
            focus_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}
