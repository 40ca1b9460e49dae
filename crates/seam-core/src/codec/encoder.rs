use std::io::{Cursor, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, ImageFormat, RgbaImage};
use tracing::{debug, info};

use crate::frame::{FrameSequence, LoopCount};

/// Delay written for frames whose duration is unknown.
pub const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(100);

/// GIF delays are stored in centiseconds; viewers treat 0 as "as fast as
/// possible" and substitute their own delay.
const MIN_FRAME_DELAY: Duration = Duration::from_millis(10);

/// Write a sequence as an animated GIF.
///
/// Infinite sequences get a NETSCAPE looping extension. Sequences that play
/// once (or whose loop count is unknown) are written without one.
pub fn encode_gif<W: Write>(sequence: &FrameSequence, writer: W) -> Result<()> {
    let mut encoder = GifEncoder::new(writer);

    match sequence.loop_count() {
        LoopCount::Infinite => encoder.set_repeat(Repeat::Infinite)?,
        LoopCount::Finite(n) if n.get() > 1 => {
            let count = u16::try_from(n.get()).unwrap_or(u16::MAX);
            encoder.set_repeat(Repeat::Finite(count))?;
        }
        LoopCount::Finite(_) | LoopCount::Unknown => {}
    }

    for (index, frame) in sequence.frames().iter().enumerate() {
        let duration = frame.duration.unwrap_or(DEFAULT_FRAME_DELAY).max(MIN_FRAME_DELAY);
        let delay = Delay::from_saturating_duration(duration);
        encoder
            .encode_frame(image::Frame::from_parts(frame.image.clone(), 0, 0, delay))
            .with_context(|| format!("failed to encode frame {index}"))?;
    }

    info!(
        frames = sequence.len(),
        loop_count = ?sequence.loop_count(),
        "encoded GIF"
    );
    Ok(())
}

/// Pick the still image format for an output path. Stdout and unknown or
/// read-only extensions fall back to PNG.
pub fn still_format(path: Option<&Path>) -> ImageFormat {
    path.and_then(|p| ImageFormat::from_path(p).ok())
        .filter(|format| format.writing_enabled())
        .unwrap_or(ImageFormat::Png)
}

/// Encode a still image in memory.
pub fn encode_still(image: &RgbaImage, format: ImageFormat) -> Result<Vec<u8>> {
    let dynamic = DynamicImage::ImageRgba8(image.clone());
    // JPEG has no alpha channel.
    let dynamic = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(dynamic.to_rgb8()),
        _ => dynamic,
    };

    let mut bytes = Cursor::new(Vec::new());
    dynamic
        .write_to(&mut bytes, format)
        .with_context(|| format!("failed to encode {format:?} image"))?;
    debug!(?format, bytes = bytes.get_ref().len(), "encoded still image");
    Ok(bytes.into_inner())
}
