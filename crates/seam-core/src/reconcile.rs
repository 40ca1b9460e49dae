use std::time::Duration;

use tracing::{debug, info};

use crate::error::{MergeError, SyncFailure};
use crate::frame::{FrameSequence, TotalDuration};

/// Reconciliation resolution: durations are compared in tenths of a second.
pub const TICKS_PER_SECOND: u64 = 10;

pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Least common multiple, or None on overflow.
pub fn lcm(a: u64, b: u64) -> Option<u64> {
    if a == 0 || b == 0 {
        return Some(0);
    }
    (a / gcd(a, b)).checked_mul(b)
}

/// Round a duration to whole ticks. Anything positive counts as at least one tick.
pub fn quantize(duration: Duration) -> u64 {
    let ticks = (duration.as_secs_f64() * TICKS_PER_SECOND as f64).round() as u64;
    if ticks == 0 && !duration.is_zero() {
        1
    } else {
        ticks
    }
}

/// How long one input must run within the merged cycle.
///
/// Finite animations play out completely; infinite ones (and those with an
/// unknown loop count) only need whole passes, so a single pass is enough.
fn contribution(index: usize, sequence: &FrameSequence) -> Result<Duration, MergeError> {
    let unknown = MergeError::UnsynchronizableSequence {
        index,
        reason: SyncFailure::UnknownDuration,
    };
    let duration = match sequence.total_duration() {
        Some(TotalDuration::Finite(total)) => total,
        _ => sequence.animation_duration().ok_or(unknown)?,
    };
    if duration.is_zero() {
        return Err(MergeError::UnsynchronizableSequence {
            index,
            reason: SyncFailure::ZeroDuration,
        });
    }
    Ok(duration)
}

/// Length of one full cycle of the merged animation.
///
/// Stills never change and put no constraint on the cycle. Every animated
/// input's contribution is quantized to ticks and the cycle is their least
/// common multiple, so that every input's loop boundaries recur in phase.
pub fn cycle_duration(sequences: &[FrameSequence]) -> Result<Duration, MergeError> {
    let mut cycle: Option<u64> = None;

    for (index, sequence) in sequences.iter().enumerate() {
        if sequence.is_still() {
            continue;
        }
        let duration = contribution(index, sequence)?;
        let ticks = quantize(duration);
        debug!(index, ?duration, ticks, "duration contribution");

        cycle = Some(match cycle {
            None => ticks,
            Some(acc) => lcm(acc, ticks).ok_or(MergeError::CycleOverflow)?,
        });
    }

    let ticks = cycle.ok_or(MergeError::EmptyInput)?;
    let millis = ticks
        .checked_mul(1000 / TICKS_PER_SECOND)
        .ok_or(MergeError::CycleOverflow)?;
    let cycle = Duration::from_millis(millis);

    info!(?cycle, ticks, "reconciled cycle duration");
    Ok(cycle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Frame, LoopCount};
    use image::RgbaImage;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn anim(durations_ms: &[u64], loop_raw: Option<u32>) -> FrameSequence {
        let frames = durations_ms
            .iter()
            .map(|d| Frame::new(RgbaImage::new(2, 2), Some(ms(*d))))
            .collect();
        FrameSequence::new(frames, LoopCount::from_raw(loop_raw)).unwrap()
    }

    #[test]
    fn gcd_and_lcm_basics() {
        assert_eq!(gcd(20, 9), 1);
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(lcm(20, 9), Some(180));
        assert_eq!(lcm(10, 30), Some(30));
        assert_eq!(lcm(u64::MAX, u64::MAX - 1), None);
    }

    #[test]
    fn lcm_is_commutative_and_idempotent() {
        for a in 1..40u64 {
            assert_eq!(lcm(a, a), Some(a));
            for b in 1..40u64 {
                assert_eq!(lcm(a, b), lcm(b, a), "lcm({a}, {b})");
                let l = lcm(a, b).unwrap();
                assert_eq!(l % a, 0);
                assert_eq!(l % b, 0);
            }
        }
    }

    #[test]
    fn quantize_rounds_to_tenths() {
        assert_eq!(quantize(ms(900)), 9);
        assert_eq!(quantize(ms(2000)), 20);
        assert_eq!(quantize(ms(1240)), 12);
        assert_eq!(quantize(ms(1260)), 13);
        assert_eq!(quantize(ms(20)), 1);
        assert_eq!(quantize(Duration::ZERO), 0);
    }

    #[test]
    fn two_finite_animations() {
        let a = anim(&[500, 500], Some(2));
        let b = anim(&[300, 300, 300], Some(1));
        assert_eq!(cycle_duration(&[a, b]), Ok(Duration::from_secs(18)));
    }

    #[test]
    fn infinite_contributes_one_pass() {
        let infinite = anim(&[500, 500], Some(0));
        let finite = anim(&[1000, 1000, 1000], Some(1));
        assert_eq!(cycle_duration(&[infinite, finite]), Ok(Duration::from_secs(3)));
    }

    #[test]
    fn unknown_loop_count_contributes_one_pass() {
        let unknown = anim(&[400, 400], None);
        let other = anim(&[200, 200], None);
        assert_eq!(cycle_duration(&[unknown, other]), Ok(ms(800)));
    }

    #[test]
    fn order_does_not_matter() {
        let inputs = [
            anim(&[500, 500], Some(2)),
            anim(&[300, 300, 300], Some(1)),
            anim(&[350, 350], Some(0)),
            anim(&[250, 250], None),
        ];
        let forward = cycle_duration(&inputs).unwrap();

        let mut reversed = inputs.to_vec();
        reversed.reverse();
        assert_eq!(cycle_duration(&reversed).unwrap(), forward);

        let rotated = [inputs[2].clone(), inputs[0].clone(), inputs[3].clone(), inputs[1].clone()];
        assert_eq!(cycle_duration(&rotated).unwrap(), forward);
    }

    #[test]
    fn stills_are_ignored() {
        let still = FrameSequence::still(RgbaImage::new(3, 3));
        let a = anim(&[300, 300], Some(0));
        assert_eq!(cycle_duration(&[still.clone(), a]), Ok(ms(600)));
        assert_eq!(cycle_duration(&[still]), Err(MergeError::EmptyInput));
    }

    #[test]
    fn unknown_frame_duration_is_fatal() {
        let frames = vec![
            Frame::new(RgbaImage::new(2, 2), Some(ms(100))),
            Frame::new(RgbaImage::new(2, 2), None),
        ];
        let broken = FrameSequence::new(frames, LoopCount::Infinite).unwrap();
        let ok = anim(&[100, 100], Some(0));
        assert_eq!(
            cycle_duration(&[ok, broken]),
            Err(MergeError::UnsynchronizableSequence {
                index: 1,
                reason: SyncFailure::UnknownDuration
            })
        );
    }

    fn long_anim(frame_secs: &[u64]) -> FrameSequence {
        let frames = frame_secs
            .iter()
            .map(|s| Frame::new(RgbaImage::new(1, 1), Some(Duration::from_secs(*s))))
            .collect();
        FrameSequence::new(frames, LoopCount::Infinite).unwrap()
    }

    #[test]
    fn coprime_huge_cycles_overflow() {
        // 2^33 s and 2^33 + 1 s: the tick lcm needs more than 64 bits.
        let a = long_anim(&[1 << 32, 1 << 32]);
        let b = long_anim(&[1 << 32, (1 << 32) + 1]);
        assert_eq!(cycle_duration(&[a, b]), Err(MergeError::CycleOverflow));
    }

    #[test]
    fn cycle_too_long_for_milliseconds_overflows() {
        // 2^60 s is 10 * 2^60 ticks, which fits, but not in milliseconds.
        let a = long_anim(&[1 << 59, 1 << 59]);
        assert_eq!(cycle_duration(&[a]), Err(MergeError::CycleOverflow));
    }

    #[test]
    fn zero_duration_is_fatal() {
        let zero = anim(&[0, 0, 0], Some(0));
        assert_eq!(
            cycle_duration(&[zero]),
            Err(MergeError::UnsynchronizableSequence {
                index: 0,
                reason: SyncFailure::ZeroDuration
            })
        );
    }
}
