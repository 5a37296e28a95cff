#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Expanding square search strategy.
//!
//! Legs are driven with a clockwise quarter turn between them. Every second leg
//! the leg length grows, so the path winds outward in a squared spiral.

use fieldsweep_core::{
    ensure_non_negative, ensure_positive, ConfigError, PathStrategy, Pose, PoseControl,
    StepOutcome,
};
use serde::Deserialize;

const QUARTER_TURN_DEGREES: f64 = 90.0;
const LEGS_PER_GROWTH: u32 = 2;

/// Tuning parameters of the expanding square pattern.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExpandingSquareConfig {
    /// Length of the first two legs in meters.
    pub initial_side_m: f64,
    /// Growth applied to the leg length after every second leg.
    pub growth_m: f64,
    /// Leg length beyond which the pattern is complete.
    pub max_side_m: f64,
}

impl Default for ExpandingSquareConfig {
    fn default() -> Self {
        Self {
            initial_side_m: 1.0,
            growth_m: 0.5,
            max_side_m: 20.0,
        }
    }
}

impl ExpandingSquareConfig {
    /// Checks that the square grows and eventually passes its maximum side.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("initial_side_m", self.initial_side_m)?;
        ensure_positive("growth_m", self.growth_m)?;
        ensure_non_negative("max_side_m", self.max_side_m)
    }
}

/// Per-run state of the expanding square strategy.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpandingSquareState {
    side_length: f64,
    leg_distance: f64,
    legs_completed: u32,
    finished: bool,
}

impl ExpandingSquareState {
    /// Length of the leg currently being driven.
    #[must_use]
    pub const fn side_length(&self) -> f64 {
        self.side_length
    }

    /// Number of legs driven to their end.
    #[must_use]
    pub const fn legs_completed(&self) -> u32 {
        self.legs_completed
    }
}

/// Squared spiral growing outward from the start point.
#[derive(Clone, Debug, Default)]
pub struct ExpandingSquare {
    config: ExpandingSquareConfig,
}

impl ExpandingSquare {
    /// Creates the strategy from its tuning parameters.
    #[must_use]
    pub const fn new(config: ExpandingSquareConfig) -> Self {
        Self { config }
    }
}

impl PathStrategy for ExpandingSquare {
    type State = ExpandingSquareState;

    fn name(&self) -> &'static str {
        "Expanding Square"
    }

    fn initial_state(&self, _pose: &Pose) -> ExpandingSquareState {
        ExpandingSquareState {
            side_length: self.config.initial_side_m,
            leg_distance: 0.0,
            legs_completed: 0,
            finished: false,
        }
    }

    fn step(
        &self,
        state: &mut ExpandingSquareState,
        pose: &mut dyn PoseControl,
        elapsed: f64,
    ) -> StepOutcome {
        if state.finished {
            return StepOutcome::Done;
        }

        let remaining = state.side_length - state.leg_distance;
        let stride = (pose.max_speed() * elapsed).min(remaining);
        pose.move_forward(stride);
        state.leg_distance += stride;

        if stride < remaining {
            return StepOutcome::Continue;
        }

        pose.turn(QUARTER_TURN_DEGREES);
        state.leg_distance = 0.0;
        state.legs_completed += 1;
        if state.legs_completed % LEGS_PER_GROWTH == 0 {
            state.side_length += self.config.growth_m;
        }

        if state.side_length > self.config.max_side_m {
            state.finished = true;
            log::debug!(
                "expanding square complete after {} legs",
                state.legs_completed
            );
            return StepOutcome::Done;
        }
        StepOutcome::Continue
    }
}
