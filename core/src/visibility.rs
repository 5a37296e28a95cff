use glam::DVec2;

use crate::{normalize_degrees, normalize_signed_degrees, Pose, RobotProfile};

/// Reports whether `point` falls inside the camera footprint of a robot at `pose`.
///
/// The footprint is the horizontal field-of-view sector centred on the heading,
/// truncated at the camera range. Both the range and the sector edges are
/// inclusive; the profile's FOV tolerance widens the sector on each side.
/// A point at the robot's own position is visible whatever the heading.
/// Occlusion is not modelled.
#[must_use]
pub fn is_visible(point: DVec2, pose: &Pose, profile: &RobotProfile) -> bool {
    let delta = point - pose.position();
    let distance = delta.length();
    if distance > profile.camera_range() {
        return false;
    }
    // the robot always sees the spot it stands on
    if distance == 0.0 {
        return true;
    }

    let bearing = normalize_degrees(delta.x.atan2(delta.y).to_degrees());
    let angle_off = normalize_signed_degrees(bearing - pose.heading());

    angle_off.abs() <= profile.half_horizontal_fov() + profile.fov_tolerance()
}
