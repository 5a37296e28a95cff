#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Star pattern search strategy.
//!
//! Rays are driven out from the start point and back again, each rotated by a
//! fixed step from the previous one, until a full turn has been swept.

use fieldsweep_core::{
    bearing_degrees, ensure_positive, ConfigError, PathStrategy, Pose, PoseControl, StepOutcome,
    FULL_TURN_DEGREES,
};
use glam::DVec2;
use serde::Deserialize;

/// Tuning parameters of the star pattern.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StarPatternConfig {
    /// Length of each ray in meters.
    pub ray_length_m: f64,
    /// Rotation between consecutive rays in degrees.
    pub ray_step_deg: f64,
}

impl Default for StarPatternConfig {
    fn default() -> Self {
        Self {
            ray_length_m: 4.0,
            ray_step_deg: 45.0,
        }
    }
}

impl StarPatternConfig {
    /// Checks that rays have a length and that a full turn takes finitely many rays.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("ray_length_m", self.ray_length_m)?;
        ensure_positive("ray_step_deg", self.ray_step_deg)?;
        if self.ray_step_deg > FULL_TURN_DEGREES {
            return Err(ConfigError::AboveLimit {
                field: "ray_step_deg",
                limit: FULL_TURN_DEGREES,
                value: self.ray_step_deg,
            });
        }
        Ok(())
    }
}

/// Leg of the ray currently being driven.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RayLeg {
    /// Driving away from the hub.
    Outbound,
    /// Driving back to the hub.
    Returning,
}

/// Per-run state of the star pattern.
#[derive(Clone, Debug, PartialEq)]
pub struct StarPatternState {
    hub: DVec2,
    first_heading: f64,
    ray_index: u32,
    leg: RayLeg,
    ray_distance: f64,
    finished: bool,
}

impl StarPatternState {
    /// Point every ray starts from and returns to.
    #[must_use]
    pub const fn hub(&self) -> DVec2 {
        self.hub
    }

    /// Index of the ray currently being driven.
    #[must_use]
    pub const fn ray_index(&self) -> u32 {
        self.ray_index
    }

    /// Leg of the current ray.
    #[must_use]
    pub const fn leg(&self) -> RayLeg {
        self.leg
    }
}

/// Out-and-back rays around the start point.
#[derive(Clone, Debug, Default)]
pub struct StarPattern {
    config: StarPatternConfig,
}

impl StarPattern {
    /// Creates the strategy from its tuning parameters.
    #[must_use]
    pub const fn new(config: StarPatternConfig) -> Self {
        Self { config }
    }

    /// Number of rays needed to sweep a full turn.
    #[must_use]
    pub fn ray_count(&self) -> u32 {
        let step = self.config.ray_step_deg.abs();
        if step == 0.0 || !step.is_finite() {
            return 1;
        }
        ((FULL_TURN_DEGREES / step).ceil() as u32).max(1)
    }

    fn ray_heading(&self, state: &StarPatternState) -> f64 {
        state.first_heading + f64::from(state.ray_index) * self.config.ray_step_deg
    }
}

impl PathStrategy for StarPattern {
    type State = StarPatternState;

    fn name(&self) -> &'static str {
        "Star Pattern"
    }

    fn initial_state(&self, pose: &Pose) -> StarPatternState {
        StarPatternState {
            hub: pose.position(),
            first_heading: pose.heading(),
            ray_index: 0,
            leg: RayLeg::Outbound,
            ray_distance: 0.0,
            finished: false,
        }
    }

    fn step(
        &self,
        state: &mut StarPatternState,
        pose: &mut dyn PoseControl,
        elapsed: f64,
    ) -> StepOutcome {
        if state.finished {
            return StepOutcome::Done;
        }

        let reach = pose.max_speed() * elapsed;
        match state.leg {
            RayLeg::Outbound => {
                pose.set_heading(self.ray_heading(state));
                let remaining = self.config.ray_length_m - state.ray_distance;
                let stride = reach.min(remaining);
                pose.move_forward(stride);
                state.ray_distance += stride;
                if stride >= remaining {
                    state.leg = RayLeg::Returning;
                }
            }
            RayLeg::Returning => {
                let position = pose.pose().position();
                let remaining = position.distance(state.hub);
                if let Some(home) = bearing_degrees(position, state.hub) {
                    pose.set_heading(home);
                }
                let stride = reach.min(remaining);
                pose.move_forward(stride);
                if stride >= remaining {
                    state.ray_index += 1;
                    state.leg = RayLeg::Outbound;
                    state.ray_distance = 0.0;
                }
            }
        }

        if state.ray_index >= self.ray_count() {
            state.finished = true;
            log::debug!("star pattern complete after {} rays", state.ray_index);
            return StepOutcome::Done;
        }
        StepOutcome::Continue
    }
}
