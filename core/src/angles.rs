use glam::DVec2;

/// Degrees in a full revolution.
pub const FULL_TURN_DEGREES: f64 = 360.0;

const HALF_TURN_DEGREES: f64 = 180.0;

/// Wraps an angle in degrees into `[0, 360)`.
///
/// Non-finite input is returned unchanged so callers can detect it.
#[inline]
#[must_use]
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(FULL_TURN_DEGREES);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if wrapped >= FULL_TURN_DEGREES {
        0.0
    } else {
        wrapped
    }
}

/// Wraps an angle in degrees into `(-180, 180]`.
#[inline]
#[must_use]
pub fn normalize_signed_degrees(angle: f64) -> f64 {
    let wrapped = normalize_degrees(angle);
    if wrapped > HALF_TURN_DEGREES {
        wrapped - FULL_TURN_DEGREES
    } else {
        wrapped
    }
}

/// Compass bearing from `from` to `to`: 0° along +y, increasing clockwise.
///
/// Returns `None` for coincident points, where no direction exists.
#[must_use]
pub fn bearing_degrees(from: DVec2, to: DVec2) -> Option<f64> {
    let delta = to - from;
    if delta == DVec2::ZERO {
        return None;
    }
    Some(normalize_degrees(delta.x.atan2(delta.y).to_degrees()))
}

/// Unit vector pointing along a compass heading.
#[inline]
#[must_use]
pub fn heading_vector(heading_degrees: f64) -> DVec2 {
    let radians = heading_degrees.to_radians();
    DVec2::new(radians.sin(), radians.cos())
}

/// Point at `radius` along the compass direction `angle_degrees` from the origin.
#[inline]
#[must_use]
pub fn compass_polar(radius: f64, angle_degrees: f64) -> DVec2 {
    heading_vector(angle_degrees) * radius
}
