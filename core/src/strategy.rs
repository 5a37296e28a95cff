use std::fmt;

use crate::{Pose, RobotProfile};

/// Result of a single strategy invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// The strategy expects to be invoked again next frame.
    Continue,
    /// The strategy finished its pattern and will issue no further motion.
    Done,
}

/// Handle through which a strategy observes and moves the robot.
///
/// Implementations route the three mutators through the kinematics model; a
/// strategy never writes pose fields directly.
pub trait PoseControl {
    /// Current pose of the robot.
    fn pose(&self) -> Pose;

    /// Sensor and motion constants of the robot.
    fn profile(&self) -> &RobotProfile;

    /// Drives along the current heading. Negative distances drive backward.
    fn move_forward(&mut self, distance: f64);

    /// Rotates by `degrees`, positive clockwise.
    fn turn(&mut self, degrees: f64);

    /// Sets an absolute compass heading.
    fn set_heading(&mut self, degrees: f64);

    /// Current x coordinate.
    fn x(&self) -> f64 {
        self.pose().x()
    }

    /// Current y coordinate.
    fn y(&self) -> f64 {
        self.pose().y()
    }

    /// Current compass heading in `[0, 360)`.
    fn heading(&self) -> f64 {
        self.pose().heading()
    }

    /// Maximum forward speed in meters per second.
    fn max_speed(&self) -> f64 {
        self.profile().max_speed()
    }

    /// Camera range in meters.
    fn camera_range(&self) -> f64 {
        self.profile().camera_range()
    }

    /// Horizontal camera field of view in degrees.
    fn horizontal_fov(&self) -> f64 {
        self.profile().horizontal_fov()
    }

    /// Straight-line distance between the robot and the search origin.
    fn distance_from_origin(&self) -> f64 {
        self.pose().distance_from_origin()
    }
}

/// Search pattern that steers the robot one frame at a time.
///
/// A strategy value holds only its immutable parameters. Everything that
/// evolves during a run lives in [`PathStrategy::State`], which the caller
/// creates lazily on the first frame with [`PathStrategy::initial_state`] and
/// hands back by mutable reference on every later frame.
pub trait PathStrategy {
    /// Private per-run state.
    type State: fmt::Debug;

    /// Human-readable name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Creates the run state from the pose observed on the first invocation.
    fn initial_state(&self, pose: &Pose) -> Self::State;

    /// Advances the pattern by `elapsed` simulated seconds.
    fn step(
        &self,
        state: &mut Self::State,
        pose: &mut dyn PoseControl,
        elapsed: f64,
    ) -> StepOutcome;
}
