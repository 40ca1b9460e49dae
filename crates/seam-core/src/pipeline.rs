use tracing::{info, warn};

use crate::compositor::{self, check_sizes, Layout};
use crate::error::MergeError;
use crate::frame::{Frame, FrameSequence};
use crate::timeline;

/// Parameters for a merge run.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeConfig {
    /// Axis, cross-size policy and resampling filter.
    pub layout: Layout,
}

/// Result of a merge: a single image when every input was still.
#[derive(Debug, Clone, PartialEq)]
pub enum Merged {
    Still(Frame),
    Animation(FrameSequence),
}

impl Merged {
    pub fn is_animation(&self) -> bool {
        matches!(self, Merged::Animation(_))
    }

    pub fn frames(&self) -> &[Frame] {
        match self {
            Merged::Still(frame) => std::slice::from_ref(frame),
            Merged::Animation(sequence) => sequence.frames(),
        }
    }

    /// Size of the merged image, taken from the first frame of an animation.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Merged::Still(frame) => frame.image.dimensions(),
            Merged::Animation(sequence) => sequence.first().image.dimensions(),
        }
    }
}

impl From<FrameSequence> for Merged {
    fn from(sequence: FrameSequence) -> Self {
        if sequence.is_still() {
            let frame = sequence.into_frames().swap_remove(0);
            Merged::Still(frame)
        } else {
            Merged::Animation(sequence)
        }
    }
}

/// Merge the inputs side by side.
///
/// A single input is returned unchanged. Still inputs are composited once;
/// if any input is animated, all inputs are played on a shared timeline.
/// Every input is validated before any pixel work starts.
pub fn merge(inputs: Vec<FrameSequence>, config: &MergeConfig) -> Result<Merged, MergeError> {
    if inputs.is_empty() {
        return Err(MergeError::EmptyInput);
    }

    info!(
        inputs = inputs.len(),
        axis = %config.layout.axis,
        cross_size = ?config.layout.cross_size,
        filter = ?config.layout.filter,
        "merge starting"
    );

    if inputs.len() == 1 {
        info!("single input, returning it unchanged");
        return Ok(inputs.into_iter().next().ok_or(MergeError::EmptyInput)?.into());
    }

    for (index, sequence) in inputs.iter().enumerate() {
        check_sizes(sequence.frames()).map_err(|e| match e {
            MergeError::DegenerateImage { width, height, .. } => {
                MergeError::DegenerateImage { index, width, height }
            }
            other => other,
        })?;
    }

    if inputs.iter().all(FrameSequence::is_still) {
        let images: Vec<_> = inputs.iter().map(|s| &s.first().image).collect();
        let image = compositor::compose(&images, &config.layout)?;
        info!(width = image.width(), height = image.height(), "merged still images");
        return Ok(Merged::Still(Frame::still(image)));
    }

    if let Some(advisory) = timeline::loop_count_advisory(&inputs) {
        warn!(%advisory, "loop counts are ambiguous");
    }

    let sequence = timeline::synchronize(&inputs, &config.layout)?;
    Ok(Merged::Animation(sequence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use image::{Rgba, RgbaImage};
    use tracing_test::traced_test;

    use crate::axis::Axis;
    use crate::frame::LoopCount;

    fn solid(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]))
    }

    fn anim(size: (u32, u32), durations_ms: &[u64], loop_raw: Option<u32>) -> FrameSequence {
        let frames = durations_ms
            .iter()
            .map(|d| Frame::new(solid(size.0, size.1), Some(Duration::from_millis(*d))))
            .collect();
        FrameSequence::new(frames, LoopCount::from_raw(loop_raw)).unwrap()
    }

    #[test]
    fn empty_input_is_rejected() {
        let result = merge(Vec::new(), &MergeConfig::default());
        assert_eq!(result, Err(MergeError::EmptyInput));
    }

    #[test]
    fn single_still_is_returned_unchanged() {
        let image = solid(7, 3);
        let result = merge(vec![FrameSequence::still(image.clone())], &MergeConfig::default());
        assert_eq!(result, Ok(Merged::Still(Frame::still(image))));
    }

    #[test]
    fn single_animation_is_returned_unchanged() {
        let input = anim((4, 4), &[100, 200, 300], Some(3));
        let result = merge(vec![input.clone()], &MergeConfig::default()).unwrap();
        assert_eq!(result, Merged::Animation(input));
    }

    #[test]
    fn stills_are_composited() {
        let inputs = vec![FrameSequence::still(solid(100, 50)), FrameSequence::still(solid(60, 100))];
        let result = merge(inputs, &MergeConfig::default()).unwrap();
        assert!(!result.is_animation());
        assert_eq!(result.dimensions(), (130, 50));
    }

    #[test]
    fn vertical_stills() {
        let config = MergeConfig { layout: Layout::new(Axis::Vertical) };
        let inputs = vec![FrameSequence::still(solid(100, 50)), FrameSequence::still(solid(60, 100))];
        let result = merge(inputs, &config).unwrap();
        assert_eq!(result.dimensions(), (60, 130));
    }

    #[test]
    fn two_finite_animations_play_once() {
        let inputs = vec![
            anim((10, 10), &[500, 500], Some(2)),
            anim((10, 10), &[300, 300, 300], Some(1)),
        ];
        let Merged::Animation(merged) = merge(inputs, &MergeConfig::default()).unwrap() else {
            panic!("expected an animation");
        };
        assert_eq!(merged.loop_count(), LoopCount::ONCE);
        assert_eq!(merged.animation_duration(), Some(Duration::from_secs(18)));
        assert_eq!(merged.first().image.dimensions(), (20, 10));
    }

    #[test]
    #[traced_test]
    fn mixed_loops_warn_and_loop_forever() {
        let inputs = vec![
            anim((8, 8), &[500, 500], Some(0)),
            anim((8, 8), &[1000, 1000, 1000], Some(1)),
        ];
        let Merged::Animation(merged) = merge(inputs, &MergeConfig::default()).unwrap() else {
            panic!("expected an animation");
        };
        assert_eq!(merged.loop_count(), LoopCount::Infinite);
        assert_eq!(merged.animation_duration(), Some(Duration::from_secs(3)));
        assert!(logs_contain("loop counts are ambiguous"));
    }

    #[test]
    fn still_with_animation_is_animated() {
        let inputs = vec![FrameSequence::still(solid(20, 10)), anim((5, 5), &[100, 100], Some(0))];
        let Merged::Animation(merged) = merge(inputs, &MergeConfig::default()).unwrap() else {
            panic!("expected an animation");
        };
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.loop_count(), LoopCount::Infinite);
        assert_eq!(merged.first().image.dimensions(), (15, 5));
    }

    #[test]
    fn degenerate_frame_is_reported_with_input_index() {
        let frames = vec![
            Frame::new(solid(4, 4), Some(Duration::from_millis(100))),
            Frame::new(RgbaImage::new(0, 4), Some(Duration::from_millis(100))),
        ];
        let broken = FrameSequence::new(frames, LoopCount::Infinite).unwrap();
        let inputs = vec![FrameSequence::still(solid(4, 4)), broken];
        assert_eq!(
            merge(inputs, &MergeConfig::default()),
            Err(MergeError::DegenerateImage { index: 1, width: 0, height: 4 })
        );
    }
}
