use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use seam_core::{Axis, CrossSizePolicy, Resample};

#[derive(Parser)]
#[command(name = "seam", version, about = "Merge images and animated GIFs side by side")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge images along one axis into a single image or animation.
    Merge {
        /// Input images, merged in the given order.
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Stack the inputs top to bottom.
        #[arg(long, conflicts_with = "horizontal")]
        vertical: bool,

        /// Place the inputs left to right (default).
        #[arg(long, visible_alias = "horz")]
        horizontal: bool,

        /// Output path, or "-" for stdout.
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Open the result in the system image viewer instead of writing it.
        #[arg(short, long, conflicts_with = "output")]
        show: bool,

        /// Which cross-axis size the inputs are scaled to.
        #[arg(long, value_enum, default_value_t = CrossSize::Smallest)]
        cross_size: CrossSize,

        /// Resampling filter used when scaling.
        #[arg(long, value_enum, default_value_t = Filter::Bilinear)]
        filter: Filter,

        /// Directory to save every merged frame with panel outlines.
        #[arg(long)]
        debug_frames: Option<PathBuf>,

        /// TrueType/OpenType font for the debug frame text overlay.
        #[arg(long, requires = "debug_frames")]
        debug_font: Option<PathBuf>,
    },
    /// Print frame timing and loop information for each image.
    Inspect {
        /// Images to describe.
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CrossSize {
    Smallest,
    Largest,
}

impl From<CrossSize> for CrossSizePolicy {
    fn from(value: CrossSize) -> Self {
        match value {
            CrossSize::Smallest => CrossSizePolicy::Smallest,
            CrossSize::Largest => CrossSizePolicy::Largest,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Filter {
    Nearest,
    Bilinear,
    CatmullRom,
    Lanczos3,
}

impl From<Filter> for Resample {
    fn from(value: Filter) -> Self {
        match value {
            Filter::Nearest => Resample::Nearest,
            Filter::Bilinear => Resample::Bilinear,
            Filter::CatmullRom => Resample::CatmullRom,
            Filter::Lanczos3 => Resample::Lanczos3,
        }
    }
}

/// Axis selected by the `--vertical`/`--horizontal` flags.
pub fn axis(vertical: bool) -> Axis {
    if vertical {
        Axis::Vertical
    } else {
        Axis::Horizontal
    }
}
