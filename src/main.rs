use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use paintkeys::config::WalkConfig;
use paintkeys::parser::{parse_duration, parse_limit};
use paintkeys::config::DEFAULT_MARKER;
use paintkeys::patcher::{DEFAULT_PROJECT_FILE, DEFAULT_VERSION};
use paintkeys::psd;
use paintkeys::{DesktopHost, VersionPatch, parse_file, wait_for_focus, walk};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "paintkeys",
    about = "Merge marked layers in a painting app, list PSD layers and switch Siv3D project versions",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk the layer stack top to bottom and merge layers whose name contains the marker
    MergeLayers {
        /// Walk configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Merge layers whose name contains this text
        #[arg(short, long)]
        marker: Option<String>,

        /// Name of the bottom layer that ends the walk
        #[arg(short, long)]
        bottom: Option<String>,

        /// Pause after each simulated input (e.g. 50ms)
        #[arg(short, long, value_parser = parse_duration)]
        delay: Option<Duration>,

        /// Time to focus the application before starting (e.g. 3s)
        #[arg(short, long, value_parser = parse_duration)]
        focus: Option<Duration>,

        /// Give up after reading this many layers
        #[arg(short, long, value_parser = parse_limit)]
        limit: Option<usize>,
    },

    /// List the layers of a PSD file top to bottom, flagging the ones merge-layers would merge
    Layers {
        /// Photoshop document to read
        file: PathBuf,

        /// Flag layers whose name contains this text
        #[arg(short, long, default_value = DEFAULT_MARKER)]
        marker: String,
    },

    /// Point every $(SIV3D_x_y_z) macro in a project file at another version
    SwitchVersion {
        /// Version to switch to, written as x_y_z
        #[arg(default_value = DEFAULT_VERSION)]
        version: String,

        /// Project file to rewrite
        #[arg(long, default_value = DEFAULT_PROJECT_FILE)]
        file: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match Args::parse().command {
        Command::MergeLayers {
            config,
            marker,
            bottom,
            delay,
            focus,
            limit,
        } => {
            let mut walk_config = match &config {
                Some(path) => parse_file(path)
                    .with_context(|| format!("Failed to load config file: {}", path.display()))?,
                None => WalkConfig::default(),
            };
            if let Some(marker) = marker {
                walk_config.marker = marker;
            }
            if let Some(bottom) = bottom {
                walk_config.bottom = bottom;
            }
            if let Some(delay) = delay {
                walk_config.settle_delay = delay;
            }
            if let Some(focus) = focus {
                walk_config.focus_delay = focus;
            }
            if limit.is_some() {
                walk_config.limit = limit;
            }

            let mut host = DesktopHost::new().context("Failed to set up desktop input")?;
            wait_for_focus(&walk_config).await;
            let report = walk(&mut host, &walk_config)
                .await
                .context("Layer walk failed")?;
            info!(
                layers = report.layers.len(),
                merged = report.merged.len(),
                "Done"
            );
        }

        Command::Layers { file, marker } => {
            let doc = psd::read_file(&file)?;
            println!(
                "{} ({}x{}, {} layers)",
                file.display(),
                doc.width,
                doc.height,
                doc.layers.len()
            );
            for line in doc.describe(&marker) {
                println!("{}", line);
            }
            info!(marked = doc.marked(&marker).count(), "Listed layers");
        }

        Command::SwitchVersion { version, file } => {
            VersionPatch::new(version)
                .apply_to_file(&file)
                .context("Failed to switch version")?;
        }
    }

    Ok(())
}
