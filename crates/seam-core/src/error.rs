use std::fmt;

use thiserror::Error;

/// Why an animated input cannot take part in duration reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncFailure {
    /// At least one frame has no duration.
    UnknownDuration,
    /// The animation plays for zero time.
    ZeroDuration,
}

impl fmt::Display for SyncFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncFailure::UnknownDuration => write!(f, "frame durations are unknown"),
            SyncFailure::ZeroDuration => write!(f, "animation has zero duration"),
        }
    }
}

/// Fatal merge failures. All are raised before any output is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("no images to merge")]
    EmptyInput,
    #[error("input #{index} has degenerate size {width}x{height}")]
    DegenerateImage { index: usize, width: u32, height: u32 },
    #[error("input #{index} cannot be synchronized: {reason}")]
    UnsynchronizableSequence { index: usize, reason: SyncFailure },
    #[error("merged animation cycle is too long to represent")]
    CycleOverflow,
}

/// Non-fatal conditions a caller may want to surface to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    /// Finite and infinite animations were mixed, so the whole merged cycle
    /// loops forever and finite inputs restart along with it.
    LoopCountAmbiguous { finite: Vec<usize>, infinite: Vec<usize> },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::LoopCountAmbiguous { finite, infinite } => write!(
                f,
                "mixing finite inputs {finite:?} with infinite inputs {infinite:?}; \
                 the merged animation will loop forever"
            ),
        }
    }
}
