#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame-synchronous simulation stepper.
//!
//! The stepper owns the world and the active strategy slot exclusively. Each
//! frame it lets the strategy move the robot, then observes coverage from the
//! post-move pose, so coverage always reflects where the robot ended up.

mod driver;
mod registry;

use fieldsweep_core::{
    Command, CommandError, ConfigError, Event, FrameSnapshot, SimConfig, StepOutcome,
};
use fieldsweep_world::{self as world, query, PoseHandle, World};
use serde::Serialize;

pub use driver::{boxed, Drive};
pub use registry::{Registry, RegistryEntry, StrategyFactory, StrategySettings};

/// Frames between two progress log lines.
const PROGRESS_INTERVAL_FRAMES: u64 = 50;

/// Failures that prevent a simulation from starting or continuing.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// The requested strategy key is not registered.
    #[error("unknown strategy `{key}`; expected one of: {}", .known.join(", "))]
    UnknownStrategy {
        /// Key that was requested.
        key: String,
        /// Keys that are registered.
        known: Vec<&'static str>,
    },
    /// The simulation configuration was rejected.
    #[error("invalid simulation configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    /// The tuning parameters of the selected strategy were rejected.
    #[error("invalid settings for strategy `{strategy}`")]
    InvalidStrategyConfig {
        /// Registry key of the strategy.
        strategy: &'static str,
        /// Reason the settings were rejected.
        #[source]
        source: ConfigError,
    },
    /// The supplied frame duration was negative or not finite.
    #[error("time step must be a finite, non-negative number of seconds, got {0}")]
    InvalidTimeStep(f64),
    /// The active strategy issued a command the world refused.
    #[error("strategy `{strategy}` issued an invalid command")]
    StrategyFault {
        /// Name of the faulting strategy.
        strategy: &'static str,
        /// Reason the command was refused.
        #[source]
        source: CommandError,
    },
    /// A previous strategy fault ended the run.
    #[error("simulation halted after a fault in strategy `{0}`")]
    Halted(&'static str),
}

/// Outcome of a complete or budget-limited run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    /// Name of the strategy that drove the run.
    pub strategy: &'static str,
    /// Frames simulated.
    pub frames: u64,
    /// Simulated seconds accumulated.
    pub simulated_seconds: f64,
    /// Fraction of the search disk observed, within `[0, 1]`.
    pub coverage_fraction: f64,
    /// Total length of the driven path in meters.
    pub distance_travelled: f64,
    /// Number of recorded path positions.
    pub path_points: usize,
    /// Whether the strategy reported completion.
    pub finished: bool,
}

/// Advances the world one frame at a time on behalf of a strategy.
#[derive(Debug)]
pub struct Stepper {
    world: World,
    driver: Box<dyn Drive>,
    frame: u64,
    elapsed: f64,
    substeps: u32,
    strategy_finished: bool,
    halted: bool,
    events: Vec<Event>,
}

impl Stepper {
    /// Creates a stepper for a fresh world driven by `driver`.
    pub fn new(config: &SimConfig, driver: Box<dyn Drive>) -> Result<Self, SimulationError> {
        let world = World::new(config)?;
        log::info!(
            "starting {} over a {} m search radius ({} cells)",
            driver.name(),
            config.search_radius_m,
            query::coverage_grid(&world).total_cells()
        );
        Ok(Self {
            world,
            driver,
            frame: 0,
            elapsed: 0.0,
            substeps: 1,
            strategy_finished: false,
            halted: false,
            events: Vec::new(),
        })
    }

    /// Creates a stepper driven by the strategy registered under `key`.
    pub fn from_registry(
        config: &SimConfig,
        registry: &Registry,
        key: &str,
        settings: &StrategySettings,
    ) -> Result<Self, SimulationError> {
        let driver = registry.create(key, settings)?;
        Self::new(config, driver)
    }

    /// Sets how many frames each call to [`Stepper::step`] simulates.
    ///
    /// Values below one are raised to one.
    pub fn set_substeps(&mut self, substeps: u32) {
        self.substeps = substeps.max(1);
    }

    /// Frames simulated per call to [`Stepper::step`].
    #[must_use]
    pub const fn substeps(&self) -> u32 {
        self.substeps
    }

    /// Simulates one tick of `substeps` frames and returns the resulting snapshot.
    pub fn step(&mut self, elapsed: f64) -> Result<FrameSnapshot, SimulationError> {
        self.events.clear();
        for _ in 0..self.substeps {
            self.advance_frame(elapsed)?;
        }
        Ok(self.snapshot())
    }

    /// Steps with `elapsed` until the strategy finishes or `max_frames` frames
    /// have been simulated in total.
    pub fn run(&mut self, elapsed: f64, max_frames: u64) -> Result<RunSummary, SimulationError> {
        while !self.strategy_finished && self.frame < max_frames {
            self.events.clear();
            self.advance_frame(elapsed)?;
        }
        let summary = self.summary();
        if summary.finished {
            log::info!(
                "{} finished after {} frames ({:.1} s) with {:.1}% coverage",
                summary.strategy,
                summary.frames,
                summary.simulated_seconds,
                summary.coverage_fraction * 100.0
            );
        } else {
            log::info!(
                "{} stopped at the {}-frame budget with {:.1}% coverage",
                summary.strategy,
                max_frames,
                summary.coverage_fraction * 100.0
            );
        }
        Ok(summary)
    }

    /// Replaces the active strategy, discarding the old strategy's run state.
    ///
    /// Coverage and path history are kept; the new strategy starts from the
    /// current pose on the next frame.
    pub fn swap_strategy(&mut self, driver: Box<dyn Drive>) {
        log::info!("switching from {} to {}", self.driver.name(), driver.name());
        self.driver = driver;
        self.strategy_finished = false;
    }

    /// Clears every seen cell and restarts the active strategy from the
    /// current pose.
    pub fn reset_coverage(&mut self) {
        world::apply(&mut self.world, Command::ResetCoverage, &mut self.events);
        self.driver.restart();
        self.strategy_finished = false;
    }

    /// Captures an owned snapshot of the current state for renderers.
    #[must_use]
    pub fn snapshot(&self) -> FrameSnapshot {
        query::frame_snapshot(
            &self.world,
            self.frame,
            self.elapsed,
            self.strategy_finished,
        )
    }

    /// Summarizes the run so far.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            strategy: self.driver.name(),
            frames: self.frame,
            simulated_seconds: self.elapsed,
            coverage_fraction: query::coverage_fraction(&self.world),
            distance_travelled: query::distance_travelled(&self.world),
            path_points: query::path_history(&self.world).len(),
            finished: self.strategy_finished,
        }
    }

    /// Read-only access to the simulated world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Events emitted by the world during the most recent tick.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Name of the active strategy.
    #[must_use]
    pub fn strategy_name(&self) -> &'static str {
        self.driver.name()
    }

    /// Whether the active strategy reported completion.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.strategy_finished
    }

    /// Whether a strategy fault ended the run.
    #[must_use]
    pub const fn is_halted(&self) -> bool {
        self.halted
    }

    /// Frames simulated so far.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Simulated seconds accumulated so far.
    #[must_use]
    pub const fn elapsed(&self) -> f64 {
        self.elapsed
    }

    fn advance_frame(&mut self, elapsed: f64) -> Result<(), SimulationError> {
        if self.halted {
            return Err(SimulationError::Halted(self.driver.name()));
        }
        if !elapsed.is_finite() || elapsed < 0.0 {
            return Err(SimulationError::InvalidTimeStep(elapsed));
        }

        if !self.strategy_finished {
            let mut handle = PoseHandle::new(&mut self.world, &mut self.events);
            let outcome = self.driver.step(&mut handle, elapsed);
            if let Some(source) = handle.fault() {
                self.halted = true;
                log::error!("{} issued an invalid command: {source}", self.driver.name());
                return Err(SimulationError::StrategyFault {
                    strategy: self.driver.name(),
                    source,
                });
            }
            if outcome == StepOutcome::Done {
                self.strategy_finished = true;
                log::info!("{} reported completion", self.driver.name());
            }
        }

        world::apply(&mut self.world, Command::ObserveCoverage, &mut self.events);
        self.frame += 1;
        self.elapsed += elapsed;

        log::trace!(
            "frame {}: pose {:?}, coverage {:.4}",
            self.frame,
            query::pose(&self.world),
            query::coverage_fraction(&self.world)
        );
        if self.frame % PROGRESS_INTERVAL_FRAMES == 0 {
            log::info!(
                "frame {}: coverage {:.1}%",
                self.frame,
                query::coverage_fraction(&self.world) * 100.0
            );
        }
        Ok(())
    }
}
