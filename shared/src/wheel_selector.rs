use rand::Rng;

use crate::error::WheelError;

/// Picks the segment the wheel will stop on, uniformly over `[0, segment_count)`.
///
/// Calls are independent of each other; the only state touched is the RNG.
pub fn select_winner<R: Rng + ?Sized>(rng: &mut R, segment_count: u32) -> Result<u32, WheelError> {
    if segment_count == 0 {
        return Err(WheelError::invalid_argument("segment count must be positive"));
    }
    Ok(rng.gen_range(0..segment_count))
}
