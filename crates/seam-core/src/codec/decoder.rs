use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, ImageFormat};
use tracing::{debug, info, warn};

use crate::frame::{Frame, FrameSequence, LoopCount};

/// Read and decode an image file.
pub fn open(path: &Path) -> Result<FrameSequence> {
    info!(?path, "reading source image");
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    decode(&bytes).with_context(|| format!("failed to decode {}", path.display()))
}

/// Decode an in-memory image. GIFs keep all frames, delays and loop count;
/// any other format becomes a single still frame.
pub fn decode(bytes: &[u8]) -> Result<FrameSequence> {
    let format = image::guess_format(bytes).context("unrecognized image format")?;
    debug!(?format, bytes = bytes.len(), "guessed image format");

    if format == ImageFormat::Gif {
        return decode_gif(bytes);
    }

    let image = image::load_from_memory_with_format(bytes, format)
        .context("failed to decode image")?
        .into_rgba8();
    info!(width = image.width(), height = image.height(), "decoded still image");
    Ok(FrameSequence::still(image))
}

fn decode_gif(bytes: &[u8]) -> Result<FrameSequence> {
    let decoder = GifDecoder::new(Cursor::new(bytes)).context("failed to read GIF header")?;
    let frames: Vec<Frame> = decoder
        .into_frames()
        .collect_frames()
        .context("failed to decode GIF frames")?
        .into_iter()
        .map(|frame| {
            let duration = Duration::from(frame.delay());
            Frame::new(frame.into_buffer(), Some(duration))
        })
        .collect();

    if frames.len() == 1 {
        info!("GIF has a single frame, treating it as a still");
        return Ok(FrameSequence::new(frames, LoopCount::ONCE)?);
    }

    let loop_count = read_loop_count(bytes)?;
    if frames.iter().any(|f| f.duration.is_some_and(|d| d.is_zero())) {
        warn!("GIF contains frames with zero delay");
    }

    info!(frame_count = frames.len(), ?loop_count, "decoded GIF animation");
    Ok(FrameSequence::new(frames, loop_count)?)
}

/// Read the NETSCAPE looping extension. A missing extension reads as `Finite(0)`
/// in the gif crate, which is reported here as unknown.
///
/// Only frame headers are walked; image data is skipped, not decoded.
fn read_loop_count(bytes: &[u8]) -> Result<LoopCount> {
    let mut decoder = gif::DecodeOptions::new()
        .read_info(bytes)
        .context("failed to read GIF header")?;
    let mut frames = 0usize;
    while decoder
        .next_frame_info()
        .context("failed to scan GIF frames")?
        .is_some()
    {
        frames += 1;
    }

    let loop_count = match decoder.repeat() {
        gif::Repeat::Infinite => LoopCount::Infinite,
        gif::Repeat::Finite(0) => LoopCount::Unknown,
        gif::Repeat::Finite(n) => LoopCount::from_raw(Some(u32::from(n))),
    };
    debug!(?loop_count, frames, "read GIF loop count");
    Ok(loop_count)
}
