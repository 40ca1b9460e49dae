use std::num::NonZeroU32;
use std::time::Duration;

use image::RgbaImage;

use crate::error::MergeError;

/// A single raster frame with its display duration, if known.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// The frame's image data.
    pub image: RgbaImage,
    /// How long the frame is shown, or None when the source did not say.
    pub duration: Option<Duration>,
}

impl Frame {
    pub fn new(image: RgbaImage, duration: Option<Duration>) -> Self {
        Self { image, duration }
    }

    /// A frame without timing information.
    pub fn still(image: RgbaImage) -> Self {
        Self { image, duration: None }
    }
}

/// How many times an animation plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopCount {
    /// The source carried no loop information.
    #[default]
    Unknown,
    /// Repeat forever.
    Infinite,
    /// Play the given number of full passes (1 = play once).
    Finite(NonZeroU32),
}

impl LoopCount {
    /// Play exactly once.
    pub const ONCE: LoopCount = LoopCount::Finite(NonZeroU32::MIN);

    /// Convert from the GIF-style raw value: 0 repeats forever, absent is unknown.
    pub fn from_raw(raw: Option<u32>) -> Self {
        match raw {
            None => LoopCount::Unknown,
            Some(n) => NonZeroU32::new(n).map_or(LoopCount::Infinite, LoopCount::Finite),
        }
    }

    pub fn to_raw(self) -> Option<u32> {
        match self {
            LoopCount::Unknown => None,
            LoopCount::Infinite => Some(0),
            LoopCount::Finite(n) => Some(n.get()),
        }
    }

    pub fn is_finite(self) -> bool {
        matches!(self, LoopCount::Finite(_))
    }

    /// Number of full passes allowed, or None when unbounded.
    pub fn budget(self) -> Option<u32> {
        match self {
            LoopCount::Finite(n) => Some(n.get()),
            LoopCount::Infinite | LoopCount::Unknown => None,
        }
    }
}

/// Playback length of a sequence including all its loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalDuration {
    Finite(Duration),
    Infinite,
}

/// Ordered, non-empty frames of one source sharing a loop count.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSequence {
    frames: Vec<Frame>,
    loop_count: LoopCount,
}

impl FrameSequence {
    pub fn new(frames: Vec<Frame>, loop_count: LoopCount) -> Result<Self, MergeError> {
        if frames.is_empty() {
            return Err(MergeError::EmptyInput);
        }
        Ok(Self { frames, loop_count })
    }

    /// Wrap a single still image as a one-frame sequence that plays once.
    pub fn still(image: RgbaImage) -> Self {
        Self {
            frames: vec![Frame::still(image)],
            loop_count: LoopCount::ONCE,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn is_still(&self) -> bool {
        self.frames.len() == 1
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> &Frame {
        &self.frames[index]
    }

    pub fn first(&self) -> &Frame {
        &self.frames[0]
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }

    pub fn loop_count(&self) -> LoopCount {
        self.loop_count
    }

    pub fn is_finite(&self) -> bool {
        self.loop_count.is_finite()
    }

    /// Duration of a single pass, or None if any frame's duration is unknown.
    pub fn animation_duration(&self) -> Option<Duration> {
        self.frames.iter().map(|f| f.duration).sum()
    }

    /// Duration of the whole playback including loops.
    pub fn total_duration(&self) -> Option<TotalDuration> {
        let pass = self.animation_duration()?;
        match self.loop_count {
            LoopCount::Unknown => None,
            LoopCount::Infinite => Some(TotalDuration::Infinite),
            LoopCount::Finite(n) => Some(TotalDuration::Finite(pass.saturating_mul(n.get()))),
        }
    }
}
