//! # Paintkeys
//!
//! Keyboard automation for painting applications, plus a version switcher
//! for Siv3D project files.
//!
//! ## Merging marked layers
//!
//! [`walk`] steps through the layer stack of a painting application (CLIP
//! STUDIO PAINT by default) using nothing but keyboard shortcuts and the
//! clipboard. For every layer it opens the rename field, copies the name,
//! cancels, merges the layer if its name contains the marker, and moves one
//! layer down until it reads the bottom layer's name.
//!
//! ```no_run
//! use paintkeys::{DesktopHost, WalkConfig, walk};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let mut host = DesktopHost::new()?;
//!     let report = walk(&mut host, &WalkConfig::default()).await?;
//!     println!("merged {} of {} layers", report.merged.len(), report.layers.len());
//!     Ok(())
//! }
//! ```
//!
//! The merge shortcut acts on whatever the application currently has
//! selected. Paintkeys does not track or check that selection.
//!
//! ## Configuration files
//!
//! Use [`parse_str`] or [`parse_file`] to load a [`WalkConfig`]. Every
//! directive is optional and overrides the default:
//!
//! | Directive | Default | Description |
//! |-----------|---------|-------------|
//! | `app "name"` | `"CLIP STUDIO PAINT"` | Application named in the focus prompt |
//! | `rename F2` | `F2` | Opens the layer rename field |
//! | `copy Ctrl+C` | `Ctrl+C` | Copies the field's text |
//! | `cancel Escape` | `Escape` | Closes the field without renaming |
//! | `merge Shift+Alt+E` | `Shift+Alt+E` | Merges the selected layers |
//! | `down Alt+[` | `Alt+[` | Selects the layer below |
//! | `marker "#"` | `"#"` | Layers whose name contains this get merged |
//! | `bottom "用紙"` | `"用紙"` | Layer name that ends the walk |
//! | `delay 50ms` | `50ms` | Pause after every simulated input |
//! | `focus 3s` | `3s` | Time to focus the application before starting |
//! | `limit 500` | none | Give up after this many layers |
//! | `# comment` | | Full-line or inline comment |
//!
//! ## Testing against a fake application
//!
//! Implement [`Host`] to replace the desktop:
//!
//! ```
//! use paintkeys::{Host, KeyChord, WalkConfig, walk};
//! use async_trait::async_trait;
//! use anyhow::Result;
//!
//! struct OneLayer;
//!
//! #[async_trait(?Send)]
//! impl Host for OneLayer {
//!     async fn press(&mut self, _chord: &KeyChord) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     async fn read_clipboard(&mut self) -> Result<String> {
//!         Ok("用紙".to_string())
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<()> {
//! let report = walk(&mut OneLayer, &WalkConfig::immediate()).await?;
//! assert_eq!(report.layers, vec!["用紙"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Listing PSD layers
//!
//! [`psd::read_file`] reads the layer names, folders and visibility flags of
//! a Photoshop document without decoding pixels, which shows what a walk
//! over the same stack would merge:
//!
//! ```no_run
//! let doc = paintkeys::psd::read_file("illustration.psd")?;
//! for line in doc.describe("#") {
//!     println!("{}", line);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Switching Siv3D versions
//!
//! [`patch_file`] rewrites every `$(SIV3D_x_y_z)` macro in a project file:
//!
//! ```
//! let patched = paintkeys::patch_str("$(SIV3D_0_6_10)\\include", "0_6_12");
//! assert_eq!(patched.text, "$(SIV3D_0_6_12)\\include");
//! ```

pub mod chord;
pub mod config;
pub mod desktop;
pub mod focus;
pub mod host;
pub mod parser;
pub mod patcher;
pub mod psd;
pub mod walker;

pub use chord::{Key, KeyChord, Modifier};
pub use config::WalkConfig;
pub use desktop::DesktopHost;
pub use focus::wait_for_focus;
pub use host::Host;
pub use parser::{parse_file, parse_str};
pub use patcher::{Patched, VersionPatch, patch_file, patch_str};
pub use psd::{PsdDocument, PsdLayer};
pub use walker::{LayerWalker, WalkReport, walk};
