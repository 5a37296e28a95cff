#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the fieldsweep coverage simulator.
//!
//! This crate defines the message surface that connects strategies, the
//! authoritative world, and drivers. Strategies move the robot through a
//! [`PoseControl`] handle, the world turns each motion into a [`Command`]
//! executed by its `apply` entry point, and every accepted or rejected
//! mutation is broadcast as an [`Event`]. Drivers only ever observe the world
//! through immutable [`FrameSnapshot`] values.
//!
//! Positions are meters on a plane centred on the search origin. Headings are
//! compass degrees: 0° points along +y ("North") and angles grow clockwise, so
//! 90° points along +x.

mod angles;
mod config;
mod strategy;
mod visibility;

use glam::DVec2;
use serde::{Deserialize, Serialize};

pub use angles::{
    bearing_degrees, compass_polar, heading_vector, normalize_degrees, normalize_signed_degrees,
    FULL_TURN_DEGREES,
};
pub use config::{
    ensure_finite, ensure_non_negative, ensure_positive, ConfigError, SimConfig,
    DEFAULT_CAMERA_HORIZONTAL_FOV_DEG, DEFAULT_CAMERA_RANGE_M, DEFAULT_CAMERA_VERTICAL_FOV_DEG,
    DEFAULT_GRID_CELL_SIZE_M, DEFAULT_ROBOT_SPEED_MPS, DEFAULT_SEARCH_RADIUS_M,
    DEFAULT_TIME_STEP_S,
};
pub use strategy::{PathStrategy, PoseControl, StepOutcome};
pub use visibility::is_visible;

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Drives the robot along its current heading.
    MoveForward {
        /// Distance to travel in meters; negative values drive backward.
        distance: f64,
    },
    /// Rotates the robot relative to its current heading.
    Turn {
        /// Rotation in degrees, positive clockwise.
        degrees: f64,
    },
    /// Points the robot at an absolute compass heading.
    SetHeading {
        /// Target heading in degrees; wrapped into `[0, 360)`.
        degrees: f64,
    },
    /// Marks every cell inside the current camera footprint as seen.
    ObserveCoverage,
    /// Clears every seen flag so a fresh run can start on the same world.
    ResetCoverage,
}

impl Command {
    /// Checks that the command carries only finite quantities.
    pub fn validate(&self) -> Result<(), CommandError> {
        match *self {
            Self::MoveForward { distance } if !distance.is_finite() => {
                Err(CommandError::NonFiniteDistance(distance))
            }
            Self::Turn { degrees } | Self::SetHeading { degrees } if !degrees.is_finite() => {
                Err(CommandError::NonFiniteAngle(degrees))
            }
            _ => Ok(()),
        }
    }
}

/// Reasons a command can be refused by the world.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error, Serialize, Deserialize)]
pub enum CommandError {
    /// A move carried a NaN or infinite distance.
    #[error("move distance {0} is not a finite number")]
    NonFiniteDistance(f64),
    /// A rotation carried a NaN or infinite angle.
    #[error("heading change {0} is not a finite number")]
    NonFiniteAngle(f64),
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the robot changed position.
    RobotMoved {
        /// Position before the move.
        from: DVec2,
        /// Position after the move, already appended to the path history.
        to: DVec2,
    },
    /// Confirms that the robot heading changed.
    HeadingChanged {
        /// Heading before the change.
        from: f64,
        /// Heading after the change, in `[0, 360)`.
        to: f64,
    },
    /// Reports the outcome of a coverage observation.
    CellsObserved {
        /// Number of cells that flipped from unseen to seen.
        newly_seen: usize,
        /// Coverage fraction after the observation.
        coverage_fraction: f64,
    },
    /// Confirms that every seen flag was cleared.
    CoverageReset,
    /// Reports that a command was refused and left the world untouched.
    CommandRejected {
        /// Command that was refused.
        command: Command,
        /// Reason the command was refused.
        reason: CommandError,
    },
}

/// Position and compass heading of the robot.
///
/// The heading is wrapped into `[0, 360)` on construction, so a `Pose` value
/// can never hold an unnormalized heading.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPose")]
pub struct Pose {
    x: f64,
    y: f64,
    heading: f64,
}

impl Pose {
    /// Creates a pose, wrapping `heading` into `[0, 360)`.
    #[must_use]
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self {
            x,
            y,
            heading: normalize_degrees(heading),
        }
    }

    /// Creates a pose at `position` with the provided heading.
    #[must_use]
    pub fn at(position: DVec2, heading: f64) -> Self {
        Self::new(position.x, position.y, heading)
    }

    /// East-west coordinate in meters.
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.x
    }

    /// North-south coordinate in meters.
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.y
    }

    /// Compass heading in degrees, within `[0, 360)`.
    #[must_use]
    pub const fn heading(&self) -> f64 {
        self.heading
    }

    /// Position as a vector.
    #[must_use]
    pub const fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// Straight-line distance to the search origin.
    #[must_use]
    pub fn distance_from_origin(&self) -> f64 {
        self.position().length()
    }

    /// Straight-line distance to `point`.
    #[must_use]
    pub fn distance_to(&self, point: DVec2) -> f64 {
        self.position().distance(point)
    }
}

#[derive(Deserialize)]
struct RawPose {
    x: f64,
    y: f64,
    heading: f64,
}

impl From<RawPose> for Pose {
    fn from(raw: RawPose) -> Self {
        Self::new(raw.x, raw.y, raw.heading)
    }
}

/// Immutable sensor and motion constants of a robot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RobotProfile {
    max_speed: f64,
    camera_range: f64,
    horizontal_fov: f64,
    vertical_fov: f64,
    fov_tolerance: f64,
}

impl RobotProfile {
    /// Creates a profile with an exact (zero tolerance) FOV boundary.
    #[must_use]
    pub const fn new(
        max_speed: f64,
        camera_range: f64,
        horizontal_fov: f64,
        vertical_fov: f64,
    ) -> Self {
        Self {
            max_speed,
            camera_range,
            horizontal_fov,
            vertical_fov,
            fov_tolerance: 0.0,
        }
    }

    /// Returns a copy accepting `degrees` of slack on each FOV edge.
    #[must_use]
    pub const fn with_fov_tolerance(self, degrees: f64) -> Self {
        Self {
            fov_tolerance: degrees,
            ..self
        }
    }

    /// Maximum forward speed in meters per second.
    #[must_use]
    pub const fn max_speed(&self) -> f64 {
        self.max_speed
    }

    /// Maximum detection distance in meters.
    #[must_use]
    pub const fn camera_range(&self) -> f64 {
        self.camera_range
    }

    /// Horizontal field of view in degrees.
    #[must_use]
    pub const fn horizontal_fov(&self) -> f64 {
        self.horizontal_fov
    }

    /// Vertical field of view in degrees. Unused by the planar visibility test.
    #[must_use]
    pub const fn vertical_fov(&self) -> f64 {
        self.vertical_fov
    }

    /// Slack in degrees accepted on each FOV edge.
    #[must_use]
    pub const fn fov_tolerance(&self) -> f64 {
        self.fov_tolerance
    }

    /// Half of the horizontal field of view.
    #[must_use]
    pub fn half_horizontal_fov(&self) -> f64 {
        self.horizontal_fov / 2.0
    }
}

/// Index of a coverage cell. Cell `(c, r)` spans `[c·s, (c+1)·s) × [r·s, (r+1)·s)`
/// for cell size `s`, so the origin sits on a cell corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Column index; grows toward +x.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Row index; grows toward +y.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }
}

/// Immutable state of a single coverage cell used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellState {
    /// Index of the cell.
    pub cell: CellCoord,
    /// Centre of the cell in world coordinates.
    pub center: DVec2,
    /// Whether the camera has observed the cell centre.
    pub seen: bool,
}

/// Read-only picture of the simulation after a frame, handed to renderers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    /// Number of frames completed so far.
    pub frame: u64,
    /// Simulated seconds accumulated so far.
    pub elapsed: f64,
    /// Pose after this frame's motion.
    pub pose: Pose,
    /// Fraction of the search disk observed, within `[0, 1]`.
    pub coverage_fraction: f64,
    /// Every position visited, oldest first.
    pub path_history: Vec<DVec2>,
    /// Every materialized coverage cell in row-major order.
    pub cells: Vec<CellState>,
    /// Whether the active strategy has reported completion.
    pub strategy_finished: bool,
}
