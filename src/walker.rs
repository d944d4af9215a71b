//! The layer walk: read each layer's name through the rename field, merge
//! the marked ones, stop at the bottom layer.

use crate::chord::KeyChord;
use crate::config::WalkConfig;
use crate::host::Host;
use anyhow::{Context, Result, anyhow};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// What a finished walk saw and did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkReport {
    /// Every layer name read, top to bottom, ending with the bottom layer.
    pub layers: Vec<String>,
    /// Names of the layers that triggered a merge.
    pub merged: Vec<String>,
}

/// Walks the host application's layer stack from the active layer down.
///
/// Runs open-loop: the only feedback is the clipboard text, so nothing
/// verifies that a keystroke reached the application or that the merge
/// touched the intended layers.
pub struct LayerWalker<'a, H: Host> {
    host: &'a mut H,
    config: &'a WalkConfig,
}

impl<'a, H: Host> LayerWalker<'a, H> {
    pub fn new(host: &'a mut H, config: &'a WalkConfig) -> Self {
        Self { host, config }
    }

    /// Run the walk until the bottom layer is read.
    ///
    /// # Errors
    ///
    /// Fails as soon as the host fails to press a chord or read the
    /// clipboard, or when `limit` layers were read without reaching the
    /// bottom layer.
    pub async fn run(mut self) -> Result<WalkReport> {
        let config = self.config;
        warn!(
            merge = %config.merge,
            "Merges act on the application's current layer selection, which is not checked"
        );

        let mut report = WalkReport::default();
        loop {
            let name = self
                .read_layer_name()
                .await
                .with_context(|| format!("Failed to read layer {}", report.layers.len() + 1))?;
            info!(layer = %name, "Read layer");

            if name.contains(&config.marker) {
                self.press(&config.merge).await?;
                self.settle().await;
                info!(layer = %name, "Merged");
                report.merged.push(name.clone());
            }

            let at_bottom = name == config.bottom;
            report.layers.push(name);
            if at_bottom {
                break;
            }

            // Give up before moving the selection any further.
            if let Some(limit) = config.limit {
                if report.layers.len() >= limit {
                    return Err(anyhow!(
                        "Read {} layers without reaching bottom layer '{}'",
                        limit,
                        config.bottom
                    ));
                }
            }

            self.press(&config.down).await?;
            self.settle().await;
        }

        info!(
            layers = report.layers.len(),
            merged = report.merged.len(),
            "Reached bottom layer"
        );
        Ok(report)
    }

    /// Open the rename field, copy its text, read it back, then dismiss the
    /// field without committing.
    async fn read_layer_name(&mut self) -> Result<String> {
        let config = self.config;
        self.press(&config.rename).await?;
        self.settle().await;

        self.press(&config.copy).await?;
        self.settle().await;

        let name = self.host.read_clipboard().await?;

        self.press(&config.cancel).await?;
        self.settle().await;

        Ok(name)
    }

    async fn press(&mut self, chord: &KeyChord) -> Result<()> {
        self.host.press(chord).await
    }

    async fn settle(&self) {
        pause(self.config.settle_delay).await;
    }
}

/// Walk `host`'s layers with `config`. See [`LayerWalker::run`].
pub async fn walk<H: Host>(host: &mut H, config: &WalkConfig) -> Result<WalkReport> {
    LayerWalker::new(host, config).run().await
}

/// Sleep for `duration`, skipping the timer entirely for zero.
pub(crate) async fn pause(duration: Duration) {
    if !duration.is_zero() {
        sleep(duration).await;
    }
}
