#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Archimedean spiral search strategy.
//!
//! The robot chases a sequence of waypoints placed on an Archimedean spiral
//! around the search centre. Each waypoint is reached with bounded turning,
//! then the spiral angle advances by a fixed step and the radius grows with it.
//! The pattern finishes once the next waypoint would lie beyond the maximum
//! radius.

use fieldsweep_core::{
    bearing_degrees, compass_polar, ensure_finite, ensure_non_negative, ensure_positive,
    normalize_signed_degrees, ConfigError, PathStrategy, Pose, PoseControl, StepOutcome,
    FULL_TURN_DEGREES,
};
use glam::DVec2;
use serde::Deserialize;

/// Default radial growth per full turn of the spiral in meters.
pub const DEFAULT_RADIUS_STEP_M: f64 = 4.5;
/// Default spiral angle advanced per reached waypoint in degrees.
pub const DEFAULT_ANGLE_STEP_DEG: f64 = 5.0;
/// Default radius beyond which the spiral stops.
pub const DEFAULT_MAX_RADIUS_M: f64 = 10.0;
/// Default distance under which a waypoint counts as reached.
pub const DEFAULT_ARRIVAL_THRESHOLD_M: f64 = 0.3;
/// Default turn rate limit in degrees per second.
pub const DEFAULT_TURN_RATE_DEG_PER_S: f64 = 90.0;

/// Tuning parameters of the spiral pattern.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpiralConfig {
    /// Centre of the spiral. The pose at the first invocation when omitted.
    pub center: Option<DVec2>,
    /// Radial growth per full turn.
    pub radius_step_m: f64,
    /// Spiral angle advanced each time a waypoint is reached.
    pub angle_step_deg: f64,
    /// Radius beyond which the pattern is complete.
    pub max_radius_m: f64,
    /// Distance under which a waypoint counts as reached.
    pub arrival_threshold_m: f64,
    /// Maximum rotation rate while steering toward a waypoint.
    pub turn_rate_deg_per_s: f64,
}

impl Default for SpiralConfig {
    fn default() -> Self {
        Self {
            center: None,
            radius_step_m: DEFAULT_RADIUS_STEP_M,
            angle_step_deg: DEFAULT_ANGLE_STEP_DEG,
            max_radius_m: DEFAULT_MAX_RADIUS_M,
            arrival_threshold_m: DEFAULT_ARRIVAL_THRESHOLD_M,
            turn_rate_deg_per_s: DEFAULT_TURN_RATE_DEG_PER_S,
        }
    }
}

impl SpiralConfig {
    /// Checks that the spiral grows outward and eventually passes its maximum radius.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(center) = self.center {
            ensure_finite("center.x", center.x)?;
            ensure_finite("center.y", center.y)?;
        }
        ensure_positive("radius_step_m", self.radius_step_m)?;
        ensure_positive("angle_step_deg", self.angle_step_deg)?;
        ensure_non_negative("max_radius_m", self.max_radius_m)?;
        ensure_non_negative("arrival_threshold_m", self.arrival_threshold_m)?;
        ensure_positive("turn_rate_deg_per_s", self.turn_rate_deg_per_s)
    }
}

/// Lifecycle of a spiral run once it has been initialized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpiralPhase {
    /// Steering toward the current waypoint.
    Navigating,
    /// The spiral grew past its maximum radius. Terminal.
    Done,
}

/// Per-run state of the spiral strategy.
#[derive(Clone, Debug, PartialEq)]
pub struct SpiralState {
    phase: SpiralPhase,
    center: DVec2,
    current_angle: f64,
    target: DVec2,
}

impl SpiralState {
    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> SpiralPhase {
        self.phase
    }

    /// Accumulated spiral angle in degrees. Grows without wrapping.
    #[must_use]
    pub const fn current_angle(&self) -> f64 {
        self.current_angle
    }

    /// Waypoint the robot is currently steering toward.
    #[must_use]
    pub const fn target(&self) -> DVec2 {
        self.target
    }

    /// Centre the spiral grows around.
    #[must_use]
    pub const fn center(&self) -> DVec2 {
        self.center
    }
}

/// Waypoint-chasing Archimedean spiral.
#[derive(Clone, Debug, Default)]
pub struct Spiral {
    config: SpiralConfig,
}

impl Spiral {
    /// Creates the strategy from its tuning parameters.
    #[must_use]
    pub const fn new(config: SpiralConfig) -> Self {
        Self { config }
    }

    /// Tuning parameters in use.
    #[must_use]
    pub const fn config(&self) -> &SpiralConfig {
        &self.config
    }

    /// Radius of the spiral at `angle` degrees of accumulated rotation.
    #[must_use]
    pub fn radius_at(&self, angle: f64) -> f64 {
        angle / FULL_TURN_DEGREES * self.config.radius_step_m
    }

    /// Advances the spiral angle and places the next waypoint.
    ///
    /// Returns the radius of the new waypoint.
    fn advance(&self, state: &mut SpiralState) -> f64 {
        state.current_angle += self.config.angle_step_deg;
        let radius = self.radius_at(state.current_angle);
        state.target = state.center + compass_polar(radius, state.current_angle);
        radius
    }
}

impl PathStrategy for Spiral {
    type State = SpiralState;

    fn name(&self) -> &'static str {
        "Spiral Search"
    }

    fn initial_state(&self, pose: &Pose) -> SpiralState {
        let center = self.config.center.unwrap_or_else(|| pose.position());
        SpiralState {
            phase: SpiralPhase::Navigating,
            center,
            current_angle: 0.0,
            target: center,
        }
    }

    fn step(
        &self,
        state: &mut SpiralState,
        pose: &mut dyn PoseControl,
        elapsed: f64,
    ) -> StepOutcome {
        if state.phase == SpiralPhase::Done {
            return StepOutcome::Done;
        }

        let position = pose.pose().position();
        if position.distance(state.target) <= self.config.arrival_threshold_m {
            let radius = self.advance(state);
            if radius > self.config.max_radius_m {
                state.phase = SpiralPhase::Done;
                log::debug!(
                    "spiral complete at {:.1} degrees, radius {radius:.2} m",
                    state.current_angle
                );
                return StepOutcome::Done;
            }
        }

        if let Some(target_heading) = bearing_degrees(position, state.target) {
            let angle_diff = normalize_signed_degrees(target_heading - pose.heading());
            let max_turn = self.config.turn_rate_deg_per_s * elapsed;
            if angle_diff.abs() <= max_turn {
                pose.set_heading(target_heading);
            } else {
                pose.turn(angle_diff.signum() * max_turn);
            }
        }

        let distance_to_target = position.distance(state.target);
        pose.move_forward((pose.max_speed() * elapsed).min(distance_to_target));
        StepOutcome::Continue
    }
}
