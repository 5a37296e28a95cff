#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded random walk search strategy.
//!
//! The robot drives straight for a random number of frames, then turns by a
//! random angle. Whenever it strays beyond the boundary radius it points back
//! at the origin before resuming the walk. Every draw comes from a ChaCha
//! generator seeded from the configuration, so runs replay exactly.

use fieldsweep_core::{
    bearing_degrees, ensure_non_negative, ConfigError, PathStrategy, Pose, PoseControl,
    StepOutcome,
};
use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

/// Seed used when the configuration does not name one.
pub const DEFAULT_SEED: u64 = 0x0f1e_1d5e_ed00_0001;

/// Tuning parameters of the random walk.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RandomWalkConfig {
    /// Seed of the random number generator.
    pub seed: u64,
    /// Fewest frames driven before picking a new direction.
    pub min_frames_per_leg: u32,
    /// Upper bound (exclusive) of frames driven before picking a new direction.
    pub max_frames_per_leg: u32,
    /// Largest absolute turn applied when picking a new direction.
    pub max_turn_deg: f64,
    /// Distance from the origin beyond which the robot heads back.
    pub boundary_radius_m: f64,
    /// Simulated seconds after which the walk is complete. Unbounded when omitted.
    pub duration_s: Option<f64>,
}

impl Default for RandomWalkConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            min_frames_per_leg: 10,
            max_frames_per_leg: 30,
            max_turn_deg: 180.0,
            boundary_radius_m: 10.0,
            duration_s: None,
        }
    }
}

impl RandomWalkConfig {
    /// Checks that every random draw has a finite, non-empty range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_frames_per_leg > self.max_frames_per_leg {
            return Err(ConfigError::Inverted {
                lower: "min_frames_per_leg",
                lower_value: f64::from(self.min_frames_per_leg),
                upper: "max_frames_per_leg",
                upper_value: f64::from(self.max_frames_per_leg),
            });
        }
        ensure_non_negative("max_turn_deg", self.max_turn_deg)?;
        ensure_non_negative("boundary_radius_m", self.boundary_radius_m)?;
        if let Some(duration) = self.duration_s {
            ensure_non_negative("duration_s", duration)?;
        }
        Ok(())
    }
}

/// Per-run state of the random walk.
#[derive(Clone, Debug)]
pub struct RandomWalkState {
    rng: ChaCha8Rng,
    frames_left_in_leg: u32,
    walked_for: f64,
    finished: bool,
}

impl RandomWalkState {
    /// Frames remaining before the next random turn.
    #[must_use]
    pub const fn frames_left_in_leg(&self) -> u32 {
        self.frames_left_in_leg
    }

    /// Simulated seconds spent walking so far.
    #[must_use]
    pub const fn walked_for(&self) -> f64 {
        self.walked_for
    }
}

/// Boundary-aware random walk.
#[derive(Clone, Debug, Default)]
pub struct RandomWalk {
    config: RandomWalkConfig,
}

impl RandomWalk {
    /// Creates the strategy from its tuning parameters.
    #[must_use]
    pub const fn new(config: RandomWalkConfig) -> Self {
        Self { config }
    }

    fn leg_length(&self, rng: &mut ChaCha8Rng) -> u32 {
        let min = self.config.min_frames_per_leg;
        let max = self.config.max_frames_per_leg.saturating_sub(1).max(min);
        rng.gen_range(min..=max)
    }

    fn turn_angle(&self, rng: &mut ChaCha8Rng) -> f64 {
        let limit = self.config.max_turn_deg.abs();
        if limit == 0.0 || !limit.is_finite() {
            return 0.0;
        }
        rng.gen_range(-limit..limit)
    }
}

impl PathStrategy for RandomWalk {
    type State = RandomWalkState;

    fn name(&self) -> &'static str {
        "Random Walk"
    }

    fn initial_state(&self, _pose: &Pose) -> RandomWalkState {
        RandomWalkState {
            rng: ChaCha8Rng::seed_from_u64(self.config.seed),
            frames_left_in_leg: 0,
            walked_for: 0.0,
            finished: false,
        }
    }

    fn step(
        &self,
        state: &mut RandomWalkState,
        pose: &mut dyn PoseControl,
        elapsed: f64,
    ) -> StepOutcome {
        if state.finished {
            return StepOutcome::Done;
        }
        if let Some(duration) = self.config.duration_s {
            if state.walked_for >= duration {
                state.finished = true;
                log::debug!("random walk complete after {:.1} s", state.walked_for);
                return StepOutcome::Done;
            }
        }

        if pose.distance_from_origin() > self.config.boundary_radius_m {
            if let Some(home) = bearing_degrees(pose.pose().position(), DVec2::ZERO) {
                pose.set_heading(home);
            }
            state.frames_left_in_leg = self.leg_length(&mut state.rng);
        } else if state.frames_left_in_leg == 0 {
            let angle = self.turn_angle(&mut state.rng);
            pose.turn(angle);
            state.frames_left_in_leg = self.leg_length(&mut state.rng);
        }

        pose.move_forward(pose.max_speed() * elapsed);
        state.frames_left_in_leg = state.frames_left_in_leg.saturating_sub(1);
        state.walked_for += elapsed;
        StepOutcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use fieldsweep_core::SimConfig;
    use fieldsweep_world::{query, PoseHandle, World};

    fn walk(strategy: &RandomWalk, frames: usize) -> Vec<DVec2> {
        let mut world = World::new(&SimConfig::default()).expect("default config is valid");
        let mut events = Vec::new();
        let mut handle = PoseHandle::new(&mut world, &mut events);
        let mut state = strategy.initial_state(&handle.pose());
        for _ in 0..frames {
            let _ = strategy.step(&mut state, &mut handle, 0.1);
        }
        query::path_history(&world).to_vec()
    }

    #[test]
    fn same_seed_replays_the_same_path() {
        let strategy = RandomWalk::default();
        assert_eq!(walk(&strategy, 500), walk(&strategy, 500));
    }

    #[test]
    fn different_seeds_diverge() {
        let first = RandomWalk::new(RandomWalkConfig {
            seed: 1,
            ..RandomWalkConfig::default()
        });
        let second = RandomWalk::new(RandomWalkConfig {
            seed: 2,
            ..RandomWalkConfig::default()
        });
        assert_ne!(walk(&first, 200), walk(&second, 200));
    }

    #[test]
    fn walk_stays_near_the_boundary() {
        let strategy = RandomWalk::new(RandomWalkConfig {
            boundary_radius_m: 3.0,
            ..RandomWalkConfig::default()
        });
        let path = walk(&strategy, 3_000);
        let farthest = path.iter().map(|point| point.length()).fold(0.0, f64::max);
        assert!(farthest <= 3.0 + 0.1 + 1e-9, "strayed to {farthest}");
    }

    #[test]
    fn leg_lengths_respect_bounds() {
        let strategy = RandomWalk::default();
        let mut state = strategy.initial_state(&Pose::new(0.0, 0.0, 0.0));
        for _ in 0..1_000 {
            let frames = strategy.leg_length(&mut state.rng);
            assert!((10..30).contains(&frames));
        }
    }

    #[test]
    fn duration_budget_finishes_the_walk() {
        let strategy = RandomWalk::new(RandomWalkConfig {
            duration_s: Some(1.0),
            ..RandomWalkConfig::default()
        });
        let mut world = World::new(&SimConfig::default()).expect("default config is valid");
        let mut events = Vec::new();
        let mut handle = PoseHandle::new(&mut world, &mut events);
        let mut state = strategy.initial_state(&handle.pose());

        let mut frames = 0;
        while strategy.step(&mut state, &mut handle, 0.25) == StepOutcome::Continue {
            frames += 1;
        }
        assert_eq!(frames, 4);
        assert_abs_diff_eq!(state.walked_for(), 1.0, epsilon = 1e-12);
        assert_eq!(strategy.step(&mut state, &mut handle, 0.25), StepOutcome::Done);
    }

    #[test]
    fn validate_rejects_unbounded_turns() {
        assert!(RandomWalkConfig::default().validate().is_ok());
        for max_turn_deg in [f64::INFINITY, f64::NAN] {
            assert!(matches!(
                RandomWalkConfig {
                    max_turn_deg,
                    ..RandomWalkConfig::default()
                }
                .validate(),
                Err(ConfigError::NonFinite {
                    field: "max_turn_deg",
                    ..
                })
            ));
        }
    }

    #[test]
    fn validate_rejects_inverted_leg_bounds() {
        assert_eq!(
            RandomWalkConfig {
                min_frames_per_leg: 40,
                ..RandomWalkConfig::default()
            }
            .validate(),
            Err(ConfigError::Inverted {
                lower: "min_frames_per_leg",
                lower_value: 40.0,
                upper: "max_frames_per_leg",
                upper_value: 30.0
            })
        );
        assert!(RandomWalkConfig {
            duration_s: Some(-1.0),
            ..RandomWalkConfig::default()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn unvalidated_infinite_turn_limit_never_panics() {
        let strategy = RandomWalk::new(RandomWalkConfig {
            max_turn_deg: f64::INFINITY,
            ..RandomWalkConfig::default()
        });
        let path = walk(&strategy, 50);
        assert_eq!(path.len(), 51);
    }
}
