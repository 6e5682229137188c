use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::WheelError;
use crate::prize_catalog::{Prize, PrizeCatalog};
use crate::spin_animator::{plan_spin, SpinAnimator, SpinStatus, Tick};
use crate::wheel_selector::select_winner;

// Constants for frontend animation
pub const WHEEL_SEGMENTS: u32 = 12; // Fixed number of visual segments, catalog entries repeat to fill them
pub const SPIN_DURATION_MS: u32 = 4500; // Duration of spin animation in milliseconds
pub const MIN_SPINS: f64 = 5.0; // Minimum number of full rotations per spin
pub const SPINS_PER_VISITOR: u32 = 1; // A visitor gets one prize

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelConfig {
    pub segment_count: u32,
    pub min_extra_turns: f64,
    pub spin_duration_ms: u32,
    /// Completed spins allowed before the wheel locks. `None` never locks.
    pub max_spins: Option<u32>,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            segment_count: WHEEL_SEGMENTS,
            min_extra_turns: MIN_SPINS,
            spin_duration_ms: SPIN_DURATION_MS,
            max_spins: Some(SPINS_PER_VISITOR),
        }
    }
}

impl WheelConfig {
    pub fn validate(&self) -> Result<(), WheelError> {
        if self.segment_count == 0 {
            return Err(WheelError::invalid_argument("segment count must be positive"));
        }
        if !self.min_extra_turns.is_finite() || self.min_extra_turns <= 0.0 {
            return Err(WheelError::invalid_argument(
                "minimum extra turns must be a positive number",
            ));
        }
        if self.spin_duration_ms == 0 {
            return Err(WheelError::invalid_argument("spin duration must be positive"));
        }
        if self.max_spins == Some(0) {
            return Err(WheelError::invalid_argument("max spins must be positive when set"));
        }
        Ok(())
    }
}

/// Represents the current state of the wheel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelState {
    pub segment_count: u32,
    /// Total rotation in degrees since the wheel was created. Never decreases.
    pub cumulative_rotation: f64,
    pub spinning: bool,
    /// Spins that ran to completion and handed out a prize.
    pub completed_spins: u32,
}

impl WheelState {
    pub fn new(segment_count: u32) -> Self {
        Self {
            segment_count,
            cumulative_rotation: 0.0,
            spinning: false,
            completed_spins: 0,
        }
    }

    pub fn start_spin(&mut self) {
        self.spinning = true;
    }

    pub fn complete_spin(&mut self, final_rotation: f64) {
        self.stop_spin(final_rotation);
        self.completed_spins += 1;
    }

    /// Ends a spin that was cancelled before handing out a prize.
    pub fn stop_spin(&mut self, rotation: f64) {
        self.spinning = false;
        self.cumulative_rotation = self.cumulative_rotation.max(rotation);
    }
}

/// Represents the result of a wheel spin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinResult {
    pub winning_index: u32,
    pub final_rotation: f64,
}

/// Handed to the completion callback once the wheel has stopped.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinOutcome {
    pub result: SpinResult,
    pub prize: Prize,
}

/// Owns the wheel state and drives one spin at a time from the host's frame clock.
///
/// Rotation updates go out through the per-spin `on_frame` callback, so any
/// renderer can sit behind it.
#[derive(Debug)]
pub struct LuckyWheel {
    catalog: PrizeCatalog,
    config: WheelConfig,
    state: WheelState,
    rotation: f64,
    disabled: bool,
    animator: SpinAnimator,
}

impl LuckyWheel {
    pub fn new(catalog: PrizeCatalog, config: WheelConfig) -> Result<Self, WheelError> {
        config.validate()?;
        Ok(Self {
            catalog,
            state: WheelState::new(config.segment_count),
            config,
            rotation: 0.0,
            disabled: false,
            animator: SpinAnimator::new(),
        })
    }

    pub fn state(&self) -> WheelState {
        self.state
    }

    pub fn config(&self) -> &WheelConfig {
        &self.config
    }

    pub fn catalog(&self) -> &PrizeCatalog {
        &self.catalog
    }

    /// Rotation of the most recently emitted frame.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Locks or unlocks the wheel, e.g. while the winner fills in the claim form.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Whether a new spin would be accepted right now.
    pub fn can_spin(&self) -> bool {
        !self.disabled
            && !self.state.spinning
            && self
                .config
                .max_spins
                .map_or(true, |max| self.state.completed_spins < max)
    }

    pub fn display_segments(&self) -> Vec<&Prize> {
        self.catalog.display_segments(self.config.segment_count)
    }

    /// Spins to a uniformly random segment.
    pub fn spin<R, F, C>(
        &mut self,
        rng: &mut R,
        now_ms: f64,
        on_frame: F,
        on_complete: C,
    ) -> Result<SpinStatus, WheelError>
    where
        R: Rng + ?Sized,
        F: FnMut(f64, f64) + 'static,
        C: FnOnce(SpinOutcome) + 'static,
    {
        if !self.can_spin() {
            self.log_rejected_spin();
            return Ok(SpinStatus::Rejected);
        }
        let winning_index = select_winner(rng, self.config.segment_count)?;
        self.spin_to(winning_index, now_ms, on_frame, on_complete)
    }

    /// Spins so that `winning_index` ends under the pointer.
    pub fn spin_to<F, C>(
        &mut self,
        winning_index: u32,
        now_ms: f64,
        on_frame: F,
        on_complete: C,
    ) -> Result<SpinStatus, WheelError>
    where
        F: FnMut(f64, f64) + 'static,
        C: FnOnce(SpinOutcome) + 'static,
    {
        if !self.can_spin() {
            self.log_rejected_spin();
            return Ok(SpinStatus::Rejected);
        }

        let plan = plan_spin(
            self.state.cumulative_rotation,
            winning_index,
            self.config.segment_count,
            self.config.min_extra_turns,
        )?;
        let outcome = SpinOutcome {
            result: SpinResult {
                winning_index,
                final_rotation: plan.target_rotation,
            },
            prize: self.catalog.prize_for_segment(winning_index).clone(),
        };
        let prize_label = outcome.prize.label.clone();

        let status = self.animator.animate(
            plan.start_rotation,
            plan.target_rotation,
            self.config.spin_duration_ms,
            now_ms,
            on_frame,
            move || on_complete(outcome),
        )?;

        if status == SpinStatus::Started {
            self.state.start_spin();
            info!(
                "🎡 Wheel spinning to segment {} ({})",
                winning_index, prize_label
            );
        }
        Ok(status)
    }

    fn log_rejected_spin(&self) {
        if self.state.spinning {
            debug!("Spin requested while the wheel is still turning");
        } else if self.disabled {
            debug!("Spin requested while the wheel is disabled");
        } else {
            debug!(
                "Spin requested after {} completed spins, wheel is locked",
                self.state.completed_spins
            );
        }
    }

    /// Advances the running spin to `now_ms`.
    pub fn tick(&mut self, now_ms: f64) -> Tick {
        let tick = self.animator.tick(now_ms);
        match tick {
            Tick::Frame { rotation, .. } => self.rotation = rotation,
            Tick::Completed { rotation } => {
                self.rotation = rotation;
                self.state.complete_spin(rotation);
            }
            Tick::Idle => {}
        }
        tick
    }

    /// Stops the running spin without completing it. The wheel keeps the last
    /// rotation the viewer saw, so the next spin still moves forward from there.
    pub fn cancel(&mut self) -> bool {
        if !self.animator.cancel() {
            return false;
        }
        self.state.stop_spin(self.rotation);
        true
    }
}
