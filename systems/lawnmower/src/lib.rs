#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Boustrophedon ("lawnmower") search strategy.
//!
//! The robot drives parallel rows of fixed length. At the end of each row it
//! turns a quarter circle, shifts sideways by the row spacing and turns again,
//! alternating the turn direction so successive rows march across the field
//! instead of folding back onto each other.

use fieldsweep_core::{ensure_positive, ConfigError, PathStrategy, Pose, PoseControl, StepOutcome};
use serde::Deserialize;

const QUARTER_TURN_DEGREES: f64 = 90.0;

/// Tuning parameters of the lawnmower pattern.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LawnmowerConfig {
    /// Length of each row in meters.
    pub row_length_m: f64,
    /// Sideways shift between neighbouring rows in meters.
    pub row_spacing_m: f64,
    /// Number of rows after which the pattern is complete. Unbounded when omitted.
    pub max_rows: Option<u32>,
}

impl Default for LawnmowerConfig {
    fn default() -> Self {
        Self {
            row_length_m: 8.0,
            row_spacing_m: 1.0,
            max_rows: None,
        }
    }
}

impl LawnmowerConfig {
    /// Checks that rows have a length and are spaced apart.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("row_length_m", self.row_length_m)?;
        ensure_positive("row_spacing_m", self.row_spacing_m)
    }
}

/// Per-run state of the lawnmower strategy.
#[derive(Clone, Debug, PartialEq)]
pub struct LawnmowerState {
    distance_in_row: f64,
    rows_completed: u32,
    turn_sign: f64,
    finished: bool,
}

impl LawnmowerState {
    /// Distance already driven along the current row.
    #[must_use]
    pub const fn distance_in_row(&self) -> f64 {
        self.distance_in_row
    }

    /// Number of rows driven to their end.
    #[must_use]
    pub const fn rows_completed(&self) -> u32 {
        self.rows_completed
    }
}

/// Back-and-forth row sweep.
#[derive(Clone, Debug, Default)]
pub struct Lawnmower {
    config: LawnmowerConfig,
}

impl Lawnmower {
    /// Creates the strategy from its tuning parameters.
    #[must_use]
    pub const fn new(config: LawnmowerConfig) -> Self {
        Self { config }
    }

    fn shift_to_next_row(&self, state: &mut LawnmowerState, pose: &mut dyn PoseControl) {
        pose.turn(state.turn_sign * QUARTER_TURN_DEGREES);
        pose.move_forward(self.config.row_spacing_m);
        pose.turn(state.turn_sign * QUARTER_TURN_DEGREES);
        state.turn_sign = -state.turn_sign;
        state.distance_in_row = 0.0;
    }
}

impl PathStrategy for Lawnmower {
    type State = LawnmowerState;

    fn name(&self) -> &'static str {
        "Lawnmower Search"
    }

    fn initial_state(&self, _pose: &Pose) -> LawnmowerState {
        LawnmowerState {
            distance_in_row: 0.0,
            rows_completed: 0,
            turn_sign: 1.0,
            finished: false,
        }
    }

    fn step(
        &self,
        state: &mut LawnmowerState,
        pose: &mut dyn PoseControl,
        elapsed: f64,
    ) -> StepOutcome {
        if state.finished {
            return StepOutcome::Done;
        }

        let remaining = self.config.row_length_m - state.distance_in_row;
        let stride = (pose.max_speed() * elapsed).min(remaining);
        pose.move_forward(stride);
        state.distance_in_row += stride;

        if stride < remaining {
            return StepOutcome::Continue;
        }

        state.rows_completed += 1;
        if self
            .config
            .max_rows
            .map_or(false, |max_rows| state.rows_completed >= max_rows)
        {
            state.finished = true;
            log::debug!("lawnmower complete after {} rows", state.rows_completed);
            return StepOutcome::Done;
        }

        self.shift_to_next_row(state, pose);
        StepOutcome::Continue
    }
}
