use fieldsweep_core::{heading_vector, normalize_degrees, Pose};
use glam::DVec2;

/// Pose of the robot together with the motion primitives that change it.
///
/// The three mutators are the only way to change the pose; every forward move
/// appends the resulting position to the path history. No bounds are enforced,
/// the model knows nothing about the search radius.
#[derive(Clone, Debug)]
pub struct Kinematics {
    pose: Pose,
    path: Vec<DVec2>,
}

impl Kinematics {
    /// Places the robot at `start`, seeding the path history with its position.
    #[must_use]
    pub fn new(start: Pose) -> Self {
        Self {
            pose: start,
            path: vec![start.position()],
        }
    }

    /// Current pose.
    #[must_use]
    pub const fn pose(&self) -> Pose {
        self.pose
    }

    /// Every position visited, oldest first.
    #[must_use]
    pub fn path_history(&self) -> &[DVec2] {
        &self.path
    }

    /// Total length of the path driven so far.
    #[must_use]
    pub fn distance_travelled(&self) -> f64 {
        self.path
            .windows(2)
            .map(|segment| segment[0].distance(segment[1]))
            .sum()
    }

    /// Drives `distance` meters along the current heading.
    pub fn move_forward(&mut self, distance: f64) {
        let position = self.pose.position() + heading_vector(self.pose.heading()) * distance;
        self.pose = Pose::at(position, self.pose.heading());
        self.path.push(position);
    }

    /// Rotates by `degrees`, positive clockwise.
    pub fn turn(&mut self, degrees: f64) {
        self.set_heading(self.pose.heading() + degrees);
    }

    /// Points the robot at an absolute compass heading.
    pub fn set_heading(&mut self, degrees: f64) {
        self.pose = Pose::at(self.pose.position(), normalize_degrees(degrees));
    }
}
