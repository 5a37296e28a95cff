use serde::Deserialize;

use crate::{Pose, RobotProfile};

/// Default radius of the circular search area in meters.
pub const DEFAULT_SEARCH_RADIUS_M: f64 = 10.0;
/// Default side length of a coverage cell in meters.
pub const DEFAULT_GRID_CELL_SIZE_M: f64 = 0.5;
/// Default forward speed of the robot in meters per second.
pub const DEFAULT_ROBOT_SPEED_MPS: f64 = 1.0;
/// Default horizontal field of view (Intel RealSense D435).
pub const DEFAULT_CAMERA_HORIZONTAL_FOV_DEG: f64 = 87.0;
/// Default vertical field of view (Intel RealSense D435).
pub const DEFAULT_CAMERA_VERTICAL_FOV_DEG: f64 = 58.0;
/// Default usable camera range in meters.
pub const DEFAULT_CAMERA_RANGE_M: f64 = 3.0;
/// Default simulated seconds per frame when the driver does not supply one.
pub const DEFAULT_TIME_STEP_S: f64 = 0.1;

/// Immutable configuration used to construct a simulation.
///
/// Every field falls back to its default when omitted from a configuration
/// file. The value is validated once, when the world is created, and is never
/// consulted again afterwards.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Radius of the circular search area centred on the origin.
    pub search_radius_m: f64,
    /// Side length of each square coverage cell.
    pub grid_cell_size_m: f64,
    /// Maximum forward speed of the robot.
    pub robot_speed_mps: f64,
    /// Horizontal camera field of view in degrees.
    pub camera_horizontal_fov_deg: f64,
    /// Vertical camera field of view in degrees. Carried for completeness; the
    /// planar visibility test ignores it.
    pub camera_vertical_fov_deg: f64,
    /// Maximum distance at which the camera detects a point.
    pub camera_range_m: f64,
    /// Additional degrees accepted on each side of the horizontal FOV edge.
    pub fov_tolerance_deg: f64,
    /// Simulated seconds advanced per frame by drivers that use a fixed step.
    pub time_step_s: f64,
    /// Starting x coordinate of the robot.
    pub start_x_m: f64,
    /// Starting y coordinate of the robot.
    pub start_y_m: f64,
    /// Starting compass heading of the robot.
    pub start_heading_deg: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            search_radius_m: DEFAULT_SEARCH_RADIUS_M,
            grid_cell_size_m: DEFAULT_GRID_CELL_SIZE_M,
            robot_speed_mps: DEFAULT_ROBOT_SPEED_MPS,
            camera_horizontal_fov_deg: DEFAULT_CAMERA_HORIZONTAL_FOV_DEG,
            camera_vertical_fov_deg: DEFAULT_CAMERA_VERTICAL_FOV_DEG,
            camera_range_m: DEFAULT_CAMERA_RANGE_M,
            fov_tolerance_deg: 0.0,
            time_step_s: DEFAULT_TIME_STEP_S,
            start_x_m: 0.0,
            start_y_m: 0.0,
            start_heading_deg: 0.0,
        }
    }
}

impl SimConfig {
    /// Checks that every parameter describes a usable simulation.
    ///
    /// A zero search radius is accepted; it yields an empty coverage disk whose
    /// coverage fraction is reported as zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("search_radius_m", self.search_radius_m),
            ("grid_cell_size_m", self.grid_cell_size_m),
            ("robot_speed_mps", self.robot_speed_mps),
            ("camera_horizontal_fov_deg", self.camera_horizontal_fov_deg),
            ("camera_vertical_fov_deg", self.camera_vertical_fov_deg),
            ("camera_range_m", self.camera_range_m),
            ("fov_tolerance_deg", self.fov_tolerance_deg),
            ("time_step_s", self.time_step_s),
            ("start_x_m", self.start_x_m),
            ("start_y_m", self.start_y_m),
            ("start_heading_deg", self.start_heading_deg),
        ];
        for (field, value) in finite {
            ensure_finite(field, value)?;
        }

        let positive = [
            ("grid_cell_size_m", self.grid_cell_size_m),
            ("robot_speed_mps", self.robot_speed_mps),
            ("camera_range_m", self.camera_range_m),
        ];
        for (field, value) in positive {
            ensure_positive(field, value)?;
        }

        let non_negative = [
            ("search_radius_m", self.search_radius_m),
            ("fov_tolerance_deg", self.fov_tolerance_deg),
            ("time_step_s", self.time_step_s),
        ];
        for (field, value) in non_negative {
            ensure_non_negative(field, value)?;
        }

        let fov = self.camera_horizontal_fov_deg;
        if fov <= 0.0 || fov > 360.0 {
            return Err(ConfigError::FieldOfView(fov));
        }

        Ok(())
    }

    /// Sensor and motion constants derived from the configuration.
    #[must_use]
    pub fn robot_profile(&self) -> RobotProfile {
        RobotProfile::new(
            self.robot_speed_mps,
            self.camera_range_m,
            self.camera_horizontal_fov_deg,
            self.camera_vertical_fov_deg,
        )
        .with_fov_tolerance(self.fov_tolerance_deg)
    }

    /// Pose the robot occupies before the first frame.
    #[must_use]
    pub fn start_pose(&self) -> Pose {
        Pose::new(self.start_x_m, self.start_y_m, self.start_heading_deg)
    }
}

/// Rejects NaN and infinite values of the parameter `field`.
pub fn ensure_finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field, value })
    }
}

/// Requires the parameter `field` to be finite and strictly positive.
pub fn ensure_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    ensure_finite(field, value)?;
    if value <= 0.0 {
        return Err(ConfigError::NotPositive { field, value });
    }
    Ok(())
}

/// Requires the parameter `field` to be finite and not negative.
pub fn ensure_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    ensure_finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}

/// Reasons a [`SimConfig`] or a strategy configuration can be rejected.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A parameter was NaN or infinite.
    #[error("{field} must be a finite number, got {value}")]
    NonFinite {
        /// Name of the offending parameter.
        field: &'static str,
        /// Value supplied for the parameter.
        value: f64,
    },
    /// A parameter that must be strictly positive was zero or negative.
    #[error("{field} must be greater than zero, got {value}")]
    NotPositive {
        /// Name of the offending parameter.
        field: &'static str,
        /// Value supplied for the parameter.
        value: f64,
    },
    /// A parameter that must not be negative was negative.
    #[error("{field} must not be negative, got {value}")]
    Negative {
        /// Name of the offending parameter.
        field: &'static str,
        /// Value supplied for the parameter.
        value: f64,
    },
    /// The horizontal field of view was outside `(0, 360]` degrees.
    #[error("horizontal field of view must lie within (0, 360] degrees, got {0}")]
    FieldOfView(f64),
    /// A parameter exceeded the upper limit it is allowed to reach.
    #[error("{field} must not exceed {limit}, got {value}")]
    AboveLimit {
        /// Name of the offending parameter.
        field: &'static str,
        /// Largest accepted value.
        limit: f64,
        /// Value supplied for the parameter.
        value: f64,
    },
    /// The lower bound of a range was larger than its upper bound.
    #[error("{lower} ({lower_value}) must not exceed {upper} ({upper_value})")]
    Inverted {
        /// Name of the lower bound.
        lower: &'static str,
        /// Value supplied for the lower bound.
        lower_value: f64,
        /// Name of the upper bound.
        upper: &'static str,
        /// Value supplied for the upper bound.
        upper_value: f64,
    },
}
