use std::time::Duration;

use image::RgbaImage;
use tracing::{debug, info};

use crate::compositor::{self, Layout};
use crate::error::{Advisory, MergeError};
use crate::frame::{Frame, FrameSequence, LoopCount};
use crate::reconcile;

/// One merged output frame: which frame of every input is visible, and for how long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub start: Duration,
    pub duration: Duration,
    /// Current frame index of each input, in input order.
    pub frames: Vec<usize>,
}

impl Step {
    pub fn end(&self) -> Duration {
        self.start + self.duration
    }
}

/// Playback position of a single input.
#[derive(Debug, Clone)]
struct Track {
    /// Local time at which the current frame started.
    clock: Duration,
    frame: usize,
    /// Completed passes through the whole sequence.
    passes: u32,
    /// Holds its current frame for the rest of the cycle.
    held: bool,
}

/// Mutable state of one synchronization run. Never outlives `plan`.
#[derive(Debug)]
struct TimelineState {
    tracks: Vec<Track>,
    clock: Duration,
}

fn frame_duration(sequence: &FrameSequence, index: usize) -> Duration {
    sequence.frame(index).duration.unwrap_or_default()
}

/// Whether a sequence ever produces a frame change.
fn is_animated(sequence: &FrameSequence) -> bool {
    !sequence.is_still() && sequence.animation_duration().is_some_and(|d| !d.is_zero())
}

impl TimelineState {
    fn new(sequences: &[FrameSequence]) -> Self {
        let tracks = sequences
            .iter()
            .map(|sequence| Track {
                clock: Duration::ZERO,
                frame: 0,
                passes: 0,
                held: !is_animated(sequence),
            })
            .collect();
        Self { tracks, clock: Duration::ZERO }
    }

    fn frame_indices(&self) -> Vec<usize> {
        self.tracks.iter().map(|t| t.frame).collect()
    }

    /// The input whose current frame ends first, with that end time.
    /// Ties go to the lowest input index.
    fn next_event(&self, sequences: &[FrameSequence]) -> Option<(usize, Duration)> {
        self.tracks
            .iter()
            .zip(sequences)
            .enumerate()
            .filter(|(_, (track, _))| !track.held)
            .map(|(i, (track, sequence))| (i, track.clock + frame_duration(sequence, track.frame)))
            .min_by_key(|&(_, end)| end)
    }

    fn advance(&mut self, index: usize, sequence: &FrameSequence, end: Duration) {
        let track = &mut self.tracks[index];
        track.clock += frame_duration(sequence, track.frame);
        self.clock = end;

        track.frame += 1;
        if track.frame < sequence.len() {
            return;
        }

        track.passes = track.passes.saturating_add(1);
        match sequence.loop_count().budget() {
            Some(budget) if track.passes >= budget => {
                track.frame = sequence.len() - 1;
                track.held = true;
                debug!(index, passes = track.passes, at = ?end, "input exhausted its loops");
            }
            _ => track.frame = 0,
        }
    }
}

/// Walk all inputs' clocks in lockstep over one cycle.
///
/// A step is emitted whenever any input changes frame. Consecutive steps
/// showing the same frames are joined, zero-length steps are dropped, and the
/// last step is cut at the cycle end, so step durations always sum to `cycle`.
pub fn plan(sequences: &[FrameSequence], cycle: Duration) -> Vec<Step> {
    let mut state = TimelineState::new(sequences);
    let mut steps: Vec<Step> = Vec::new();

    while state.clock < cycle {
        let event = state.next_event(sequences);
        let until = event.map_or(cycle, |(_, end)| end.min(cycle));

        if until > state.clock {
            let frames = state.frame_indices();
            let duration = until - state.clock;
            match steps.last_mut() {
                Some(last) if last.frames == frames => last.duration += duration,
                _ => steps.push(Step { start: state.clock, duration, frames }),
            }
        }

        match event {
            Some((index, end)) => state.advance(index, &sequences[index], end),
            None => state.clock = cycle,
        }
    }

    steps
}

/// GIF-style containers only loop as a whole: play once if every input is
/// finite, otherwise loop the whole cycle forever.
pub fn merged_loop_count(sequences: &[FrameSequence]) -> LoopCount {
    if sequences.iter().all(FrameSequence::is_finite) {
        LoopCount::ONCE
    } else {
        LoopCount::Infinite
    }
}

/// Report when finite and non-finite animations are mixed.
pub fn loop_count_advisory(sequences: &[FrameSequence]) -> Option<Advisory> {
    let mut finite = Vec::new();
    let mut infinite = Vec::new();
    for (index, sequence) in sequences.iter().enumerate().filter(|(_, s)| !s.is_still()) {
        if sequence.is_finite() {
            finite.push(index);
        } else {
            infinite.push(index);
        }
    }

    if finite.is_empty() || infinite.is_empty() {
        None
    } else {
        Some(Advisory::LoopCountAmbiguous { finite, infinite })
    }
}

/// Merge animated sequences into one synchronized animation.
pub fn synchronize(sequences: &[FrameSequence], layout: &Layout) -> Result<FrameSequence, MergeError> {
    let cycle = reconcile::cycle_duration(sequences)?;
    let steps = plan(sequences, cycle);
    info!(?cycle, steps = steps.len(), inputs = sequences.len(), "timeline planned");

    let mut frames = Vec::with_capacity(steps.len());
    for step in &steps {
        let images: Vec<&RgbaImage> = step
            .frames
            .iter()
            .zip(sequences)
            .map(|(&index, sequence)| &sequence.frame(index).image)
            .collect();
        let image = compositor::compose(&images, layout)?;
        debug!(start = ?step.start, end = ?step.end(), frames = ?step.frames, "rendered step");
        frames.push(Frame::new(image, Some(step.duration)));
    }

    let loop_count = merged_loop_count(sequences);
    info!(frames = frames.len(), ?loop_count, "animation merged");
    FrameSequence::new(frames, loop_count)
}
