mod cli;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use seam_core::codec::{decoder, encoder};
use seam_core::compositor::{self, Layout};
use seam_core::debug::DebugRenderer;
use seam_core::frame::TotalDuration;
use seam_core::{reconcile, FrameSequence, MergeConfig, Merged};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Merge {
            images,
            vertical,
            horizontal: _,
            output,
            show,
            cross_size,
            filter,
            debug_frames,
            debug_font,
        } => {
            let config = MergeConfig {
                layout: Layout {
                    axis: cli::axis(vertical),
                    cross_size: cross_size.into(),
                    filter: filter.into(),
                },
            };
            info!(?images, ?output, "starting merge");

            let inputs = read_inputs(&images)?;
            let panels = if debug_frames.is_some() {
                let firsts: Vec<_> = inputs.iter().map(FrameSequence::first).collect();
                compositor::plan_layout(&firsts, &config.layout)?
            } else {
                Vec::new()
            };

            let merged = seam_core::merge(inputs, &config).context("merge failed")?;

            if let Some(dir) = &debug_frames {
                DebugRenderer::new(debug_font.as_deref()).save_frames(merged.frames(), &panels, dir)?;
            }

            let destination = if show {
                Destination::Viewer
            } else if output == Path::new("-") {
                Destination::Stdout
            } else {
                Destination::File(output)
            };
            write_merged(&merged, &destination)?;

            let (width, height) = merged.dimensions();
            info!(width, height, animated = merged.is_animation(), "merge complete");
            Ok(())
        }
        cli::Command::Inspect { images } => {
            let inputs = read_inputs(&images)?;
            for (path, sequence) in images.iter().zip(&inputs) {
                print_summary(path, sequence);
            }

            if inputs.iter().any(|s| !s.is_still()) {
                let cycle = reconcile::cycle_duration(&inputs).context("cannot reconcile inputs")?;
                println!("merged cycle: {} ms", cycle.as_millis());
            }
            Ok(())
        }
    }
}

fn read_inputs(paths: &[PathBuf]) -> Result<Vec<FrameSequence>> {
    paths.iter().map(|path| decoder::open(path)).collect()
}

/// Where the merged image goes.
#[derive(Debug)]
enum Destination {
    Stdout,
    File(PathBuf),
    /// A temporary file opened in the system image viewer.
    Viewer,
}

/// Animations are written as GIF, stills in the format implied by the extension.
fn write_merged(merged: &Merged, destination: &Destination) -> Result<()> {
    let path = match destination {
        Destination::File(path) => Some(path.as_path()),
        Destination::Stdout | Destination::Viewer => None,
    };

    let (bytes, extension) = match merged {
        Merged::Animation(sequence) => {
            if path.is_some_and(|p| !p.extension().is_some_and(|e| e.eq_ignore_ascii_case("gif"))) {
                warn!(?path, "writing an animation to a path without a .gif extension");
            }
            let mut bytes = Vec::new();
            encoder::encode_gif(sequence, &mut bytes)?;
            (bytes, "gif")
        }
        Merged::Still(frame) => {
            let format = encoder::still_format(path);
            let extension = format.extensions_str().first().copied().unwrap_or("png");
            (encoder::encode_still(&frame.image, format)?, extension)
        }
    };

    match destination {
        Destination::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).context("failed to create output directory")?;
            }
            std::fs::write(path, &bytes)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        Destination::Stdout => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes).context("failed to write to stdout")?;
            stdout.flush()?;
        }
        Destination::Viewer => show_image(&bytes, extension)?,
    }

    info!(?destination, bytes = bytes.len(), "output written");
    Ok(())
}

/// Open the result in the system viewer. Missing viewers only warn.
fn show_image(bytes: &[u8], extension: &str) -> Result<()> {
    let mut file = tempfile::Builder::new()
        .prefix("seam-")
        .suffix(&format!(".{extension}"))
        .tempfile()
        .context("failed to create temporary file")?;
    file.write_all(bytes).context("failed to write temporary file")?;

    // Left on disk for the viewer process.
    let (_, path) = file.keep().context("failed to keep temporary file")?;

    match opener::open(&path) {
        Ok(()) => info!(?path, "opened result in image viewer"),
        Err(e) => warn!(?path, error = %e, "no image viewer available, can't show resulting image"),
    }
    Ok(())
}

fn print_summary(path: &Path, sequence: &FrameSequence) {
    let durations: Vec<String> = sequence
        .frames()
        .iter()
        .map(|f| f.duration.map_or_else(|| "?".to_string(), |d| d.as_millis().to_string()))
        .collect();
    let pass = sequence
        .animation_duration()
        .map_or_else(|| "unknown".to_string(), |d| format!("{} ms", d.as_millis()));
    let total = match sequence.total_duration() {
        Some(TotalDuration::Finite(d)) => format!("{} ms", d.as_millis()),
        Some(TotalDuration::Infinite) => "infinite".to_string(),
        None => "unknown".to_string(),
    };

    println!("{}", path.display());
    println!("  frames: {}", sequence.len());
    println!("  durations (ms): {}", durations.join(", "));
    let raw_loops = sequence
        .loop_count()
        .to_raw()
        .map_or_else(|| "none".to_string(), |n| n.to_string());
    println!("  loop count: {:?} (GIF value: {raw_loops})", sequence.loop_count());
    println!("  one pass: {pass}");
    println!("  total: {total}");
}
