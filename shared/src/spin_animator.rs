use std::fmt;

use log::debug;

use crate::error::WheelError;

pub const FULL_TURN: f64 = 360.0;

/// The pointer sits at the top of the wheel. Segment angles are measured
/// clockwise from it, and so is wheel rotation.
pub const POINTER_ANGLE: f64 = 0.0;

/// Maps any finite angle into `[0, 360)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let normalized = angle.rem_euclid(FULL_TURN);
    // rem_euclid can round up to the modulus for tiny negative inputs
    if normalized >= FULL_TURN {
        0.0
    } else {
        normalized
    }
}

pub fn segment_span(segment_count: u32) -> Result<f64, WheelError> {
    if segment_count == 0 {
        return Err(WheelError::invalid_argument("segment count must be positive"));
    }
    Ok(FULL_TURN / segment_count as f64)
}

/// Angular center of a segment, clockwise from the top of the unrotated wheel.
pub fn segment_center(index: u32, segment_count: u32) -> Result<f64, WheelError> {
    let span = segment_span(segment_count)?;
    if index >= segment_count {
        return Err(WheelError::invalid_argument(format!(
            "segment index {} is out of range for {} segments",
            index, segment_count
        )));
    }
    Ok(index as f64 * span + span / 2.0)
}

/// Rotation in `[0, 360)` that brings the segment's center under the pointer.
pub fn base_target_angle(index: u32, segment_count: u32) -> Result<f64, WheelError> {
    let center = segment_center(index, segment_count)?;
    Ok(normalize_angle(POINTER_ANGLE - center))
}

/// Index of the segment under the pointer when the wheel is rotated by `rotation` degrees.
pub fn segment_under_pointer(rotation: f64, segment_count: u32) -> Result<u32, WheelError> {
    let span = segment_span(segment_count)?;
    if !rotation.is_finite() {
        return Err(WheelError::invalid_argument("rotation must be finite"));
    }
    let wheel_angle = normalize_angle(POINTER_ANGLE - rotation);
    let index = (wheel_angle / span).floor() as u32;
    Ok(index.min(segment_count - 1))
}

/// Easing function for smooth deceleration: fast start, slow finish.
pub fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinPlan {
    pub winning_index: u32,
    pub segment_count: u32,
    pub start_rotation: f64,
    pub target_rotation: f64,
}

/// Computes where the wheel has to stop so that `winning_index` lands under the
/// pointer after at least `min_extra_turns` full turns forward.
pub fn plan_spin(
    current_rotation: f64,
    winning_index: u32,
    segment_count: u32,
    min_extra_turns: f64,
) -> Result<SpinPlan, WheelError> {
    if !current_rotation.is_finite() {
        return Err(WheelError::invalid_argument("current rotation must be finite"));
    }
    if !min_extra_turns.is_finite() || min_extra_turns <= 0.0 {
        return Err(WheelError::invalid_argument(format!(
            "minimum extra turns must be a positive number, got {}",
            min_extra_turns
        )));
    }

    let base_target = base_target_angle(winning_index, segment_count)?;
    let rotation_floor = current_rotation + min_extra_turns * FULL_TURN;
    let adjustment = normalize_angle(base_target - normalize_angle(rotation_floor));

    Ok(SpinPlan {
        winning_index,
        segment_count,
        start_rotation: current_rotation,
        target_rotation: rotation_floor + adjustment,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatorState {
    Idle,
    Spinning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinStatus {
    Started,
    /// A spin was already in flight; nothing changed.
    Rejected,
}

/// What a single `tick` did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    Idle,
    Frame { rotation: f64, progress: f64 },
    Completed { rotation: f64 },
}

pub type FrameCallback = Box<dyn FnMut(f64, f64)>;
pub type CompleteCallback = Box<dyn FnOnce()>;

struct ActiveSpin {
    start_rotation: f64,
    target_rotation: f64,
    duration_ms: f64,
    started_at_ms: f64,
    on_frame: FrameCallback,
    on_complete: CompleteCallback,
}

/// Frame-driven ease-out animation toward a target rotation.
///
/// The animator never schedules anything itself: the host calls [`tick`](Self::tick)
/// from its frame clock with the current time in milliseconds. Dropping the
/// animator or calling [`cancel`](Self::cancel) discards the callbacks without
/// running them.
#[derive(Default)]
pub struct SpinAnimator {
    active: Option<ActiveSpin>,
}

impl SpinAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AnimatorState {
        if self.active.is_some() {
            AnimatorState::Spinning
        } else {
            AnimatorState::Idle
        }
    }

    pub fn is_spinning(&self) -> bool {
        self.active.is_some()
    }

    pub fn target_rotation(&self) -> Option<f64> {
        self.active.as_ref().map(|spin| spin.target_rotation)
    }

    pub fn animate<F, C>(
        &mut self,
        start_rotation: f64,
        target_rotation: f64,
        duration_ms: u32,
        now_ms: f64,
        on_frame: F,
        on_complete: C,
    ) -> Result<SpinStatus, WheelError>
    where
        F: FnMut(f64, f64) + 'static,
        C: FnOnce() + 'static,
    {
        if let Some(current) = &self.active {
            debug!(
                "Spin toward {:.1} rejected, still spinning toward {:.1}",
                target_rotation, current.target_rotation
            );
            return Ok(SpinStatus::Rejected);
        }

        if duration_ms == 0 {
            return Err(WheelError::invalid_argument("animation duration must be positive"));
        }
        if !start_rotation.is_finite() || !target_rotation.is_finite() {
            return Err(WheelError::invalid_argument("rotations must be finite"));
        }
        if !now_ms.is_finite() {
            return Err(WheelError::invalid_argument("frame time must be finite"));
        }

        debug!(
            "Spin started: {:.1} -> {:.1} over {}ms",
            start_rotation, target_rotation, duration_ms
        );
        self.active = Some(ActiveSpin {
            start_rotation,
            target_rotation,
            duration_ms: f64::from(duration_ms),
            started_at_ms: now_ms,
            on_frame: Box::new(on_frame),
            on_complete: Box::new(on_complete),
        });
        Ok(SpinStatus::Started)
    }

    /// Emits one frame for `now_ms`. The final frame is pinned to the exact
    /// target and is followed by the completion callback, after the animator
    /// is already back to `Idle`.
    pub fn tick(&mut self, now_ms: f64) -> Tick {
        let Some(spin) = self.active.as_mut() else {
            return Tick::Idle;
        };

        let elapsed = (now_ms - spin.started_at_ms).max(0.0);
        let progress = (elapsed / spin.duration_ms).min(1.0);
        if progress < 1.0 {
            let eased = ease_out_cubic(progress);
            let rotation =
                spin.start_rotation + (spin.target_rotation - spin.start_rotation) * eased;
            (spin.on_frame)(rotation, progress);
            return Tick::Frame { rotation, progress };
        }

        match self.active.take() {
            Some(ActiveSpin {
                target_rotation,
                mut on_frame,
                on_complete,
                ..
            }) => {
                on_frame(target_rotation, 1.0);
                debug!("Spin completed at {:.1}", target_rotation);
                on_complete();
                Tick::Completed {
                    rotation: target_rotation,
                }
            }
            None => Tick::Idle,
        }
    }

    /// Abandons the running animation. Returns whether there was one.
    pub fn cancel(&mut self) -> bool {
        match self.active.take() {
            Some(spin) => {
                debug!("Spin toward {:.1} cancelled", spin.target_rotation);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for SpinAnimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpinAnimator")
            .field("state", &self.state())
            .field("target_rotation", &self.target_rotation())
            .finish()
    }
}
