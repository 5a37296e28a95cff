#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the fieldsweep coverage simulator.
//!
//! The world owns the robot kinematics and the coverage grid. It is mutated
//! exclusively through [`apply`] and inspected through the [`query`] module.

mod coverage;
mod kinematics;

use fieldsweep_core::{
    Command, CommandError, ConfigError, Event, Pose, PoseControl, RobotProfile, SimConfig,
};

pub use coverage::CoverageGrid;
pub use kinematics::Kinematics;

/// Represents the authoritative simulation state.
#[derive(Clone, Debug)]
pub struct World {
    config: SimConfig,
    profile: RobotProfile,
    kinematics: Kinematics,
    coverage: CoverageGrid,
}

impl World {
    /// Creates a world from a validated configuration.
    ///
    /// The robot starts at the configured pose with an empty coverage grid.
    pub fn new(config: &SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let start = config.start_pose();
        log::debug!(
            "world created: radius {} m, cell {} m, start {:?}",
            config.search_radius_m,
            config.grid_cell_size_m,
            start
        );
        Ok(Self {
            config: config.clone(),
            profile: config.robot_profile(),
            kinematics: Kinematics::new(start),
            coverage: CoverageGrid::new(config.search_radius_m, config.grid_cell_size_m),
        })
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands carrying non-finite quantities are refused with
/// [`Event::CommandRejected`] and leave the world untouched.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if let Err(reason) = command.validate() {
        log::warn!("rejected {command:?}: {reason}");
        out_events.push(Event::CommandRejected { command, reason });
        return;
    }

    match command {
        Command::MoveForward { distance } => {
            let from = world.kinematics.pose().position();
            world.kinematics.move_forward(distance);
            out_events.push(Event::RobotMoved {
                from,
                to: world.kinematics.pose().position(),
            });
        }
        Command::Turn { degrees } => {
            let from = world.kinematics.pose().heading();
            world.kinematics.turn(degrees);
            out_events.push(Event::HeadingChanged {
                from,
                to: world.kinematics.pose().heading(),
            });
        }
        Command::SetHeading { degrees } => {
            let from = world.kinematics.pose().heading();
            world.kinematics.set_heading(degrees);
            out_events.push(Event::HeadingChanged {
                from,
                to: world.kinematics.pose().heading(),
            });
        }
        Command::ObserveCoverage => {
            let pose = world.kinematics.pose();
            let newly_seen = world.coverage.mark_seen(&pose, &world.profile);
            out_events.push(Event::CellsObserved {
                newly_seen,
                coverage_fraction: world.coverage.coverage_fraction(),
            });
        }
        Command::ResetCoverage => {
            world.coverage.reset();
            out_events.push(Event::CoverageReset);
        }
    }
}

/// [`PoseControl`] handle that routes strategy motion through [`apply`].
///
/// The first command refused by the world is remembered as a fault; every
/// motion requested after a fault is ignored so the pose stays where the
/// strategy left it before misbehaving.
#[derive(Debug)]
pub struct PoseHandle<'a> {
    world: &'a mut World,
    events: &'a mut Vec<Event>,
    fault: Option<CommandError>,
}

impl<'a> PoseHandle<'a> {
    /// Borrows the world for one strategy invocation.
    pub fn new(world: &'a mut World, events: &'a mut Vec<Event>) -> Self {
        Self {
            world,
            events,
            fault: None,
        }
    }

    /// First command error raised during this invocation, if any.
    #[must_use]
    pub const fn fault(&self) -> Option<CommandError> {
        self.fault
    }

    fn submit(&mut self, command: Command) {
        if self.fault.is_some() {
            return;
        }
        if let Err(reason) = command.validate() {
            self.fault = Some(reason);
        }
        apply(self.world, command, self.events);
    }
}

impl PoseControl for PoseHandle<'_> {
    fn pose(&self) -> Pose {
        self.world.kinematics.pose()
    }

    fn profile(&self) -> &RobotProfile {
        &self.world.profile
    }

    fn move_forward(&mut self, distance: f64) {
        self.submit(Command::MoveForward { distance });
    }

    fn turn(&mut self, degrees: f64) {
        self.submit(Command::Turn { degrees });
    }

    fn set_heading(&mut self, degrees: f64) {
        self.submit(Command::SetHeading { degrees });
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use fieldsweep_core::{CellState, FrameSnapshot, Pose, RobotProfile, SimConfig};
    use glam::DVec2;

    use super::{CoverageGrid, World};

    /// Current pose of the robot.
    #[must_use]
    pub fn pose(world: &World) -> Pose {
        world.kinematics.pose()
    }

    /// Sensor and motion constants of the robot.
    #[must_use]
    pub fn profile(world: &World) -> &RobotProfile {
        &world.profile
    }

    /// Configuration the world was created from.
    #[must_use]
    pub fn config(world: &World) -> &SimConfig {
        &world.config
    }

    /// Every position the robot visited, oldest first.
    #[must_use]
    pub fn path_history(world: &World) -> &[DVec2] {
        world.kinematics.path_history()
    }

    /// Total length of the path driven so far.
    #[must_use]
    pub fn distance_travelled(world: &World) -> f64 {
        world.kinematics.distance_travelled()
    }

    /// Fraction of the search disk observed so far.
    #[must_use]
    pub fn coverage_fraction(world: &World) -> f64 {
        world.coverage.coverage_fraction()
    }

    /// Provides read-only access to the coverage grid.
    #[must_use]
    pub fn coverage_grid(world: &World) -> &CoverageGrid {
        &world.coverage
    }

    /// Captures every materialized cell in row-major order.
    #[must_use]
    pub fn cell_states(world: &World) -> Vec<CellState> {
        world.coverage.cells().collect()
    }

    /// Captures an owned snapshot of the world for renderers.
    #[must_use]
    pub fn frame_snapshot(
        world: &World,
        frame: u64,
        elapsed: f64,
        strategy_finished: bool,
    ) -> FrameSnapshot {
        FrameSnapshot {
            frame,
            elapsed,
            pose: pose(world),
            coverage_fraction: coverage_fraction(world),
            path_history: path_history(world).to_vec(),
            cells: cell_states(world),
            strategy_finished,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use glam::DVec2;

    fn default_world() -> World {
        World::new(&SimConfig::default()).expect("default config is valid")
    }

    #[test]
    fn new_world_starts_at_configured_pose() {
        let config = SimConfig {
            start_x_m: 1.0,
            start_y_m: -2.0,
            start_heading_deg: 450.0,
            ..SimConfig::default()
        };
        let world = World::new(&config).expect("valid config");
        assert_eq!(query::pose(&world), Pose::new(1.0, -2.0, 90.0));
        assert_eq!(query::path_history(&world), &[DVec2::new(1.0, -2.0)]);
        assert_eq!(query::coverage_fraction(&world), 0.0);
    }

    #[test]
    fn invalid_config_is_refused() {
        let config = SimConfig {
            grid_cell_size_m: -1.0,
            ..SimConfig::default()
        };
        assert!(World::new(&config).is_err());
    }

    #[test]
    fn apply_moves_and_turns() {
        let mut world = default_world();
        let mut events = Vec::new();

        apply(&mut world, Command::MoveForward { distance: 2.0 }, &mut events);
        apply(&mut world, Command::Turn { degrees: -90.0 }, &mut events);
        apply(&mut world, Command::MoveForward { distance: 1.0 }, &mut events);

        let pose = query::pose(&world);
        assert_abs_diff_eq!(pose.x(), -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pose.y(), 2.0, epsilon = 1e-12);
        assert_eq!(pose.heading(), 270.0);
        assert_eq!(events.len(), 3);
        assert!(matches!(
            events[1],
            Event::HeadingChanged { from, to } if from == 0.0 && to == 270.0
        ));
        assert_abs_diff_eq!(query::distance_travelled(&world), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn non_finite_commands_are_rejected_without_mutation() {
        let mut world = default_world();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MoveForward { distance: f64::NAN },
            &mut events,
        );
        apply(
            &mut world,
            Command::SetHeading {
                degrees: f64::INFINITY,
            },
            &mut events,
        );

        assert_eq!(query::pose(&world), Pose::new(0.0, 0.0, 0.0));
        assert_eq!(query::path_history(&world).len(), 1);
        assert!(events
            .iter()
            .all(|event| matches!(event, Event::CommandRejected { .. })));
    }

    #[test]
    fn observation_reports_progress_and_reset_clears_it() {
        let mut world = default_world();
        let mut events = Vec::new();

        apply(&mut world, Command::ObserveCoverage, &mut events);
        let Some(Event::CellsObserved {
            newly_seen,
            coverage_fraction,
        }) = events.last().cloned()
        else {
            panic!("expected an observation event, got {events:?}");
        };
        assert!(newly_seen > 0);
        assert_eq!(coverage_fraction, query::coverage_fraction(&world));

        apply(&mut world, Command::ResetCoverage, &mut events);
        assert_eq!(events.last(), Some(&Event::CoverageReset));
        assert_eq!(query::coverage_fraction(&world), 0.0);
    }

    #[test]
    fn pose_handle_latches_first_fault() {
        let mut world = default_world();
        let mut events = Vec::new();
        let mut handle = PoseHandle::new(&mut world, &mut events);

        handle.move_forward(1.0);
        handle.turn(f64::NAN);
        handle.move_forward(5.0);

        assert!(matches!(handle.fault(), Some(CommandError::NonFiniteAngle(_))));
        assert_abs_diff_eq!(handle.y(), 1.0, epsilon = 1e-12);
        assert_eq!(query::path_history(&world).len(), 2);
    }

    #[test]
    fn frame_snapshot_copies_the_world() {
        let mut world = default_world();
        let mut events = Vec::new();
        apply(&mut world, Command::ObserveCoverage, &mut events);

        let snapshot = query::frame_snapshot(&world, 3, 0.3, false);
        assert_eq!(snapshot.frame, 3);
        assert_eq!(snapshot.pose, query::pose(&world));
        assert_eq!(snapshot.cells.len(), query::coverage_grid(&world).total_cells());
        assert_eq!(
            snapshot.cells.iter().filter(|cell| cell.seen).count(),
            query::coverage_grid(&world).seen_cells()
        );
        assert!(!snapshot.strategy_finished);
    }
}
