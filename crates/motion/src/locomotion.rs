//! Pure movement math shared by every strategy.

use glam::{Vec2, Vec3};
use readingroom_input::MovementIntents;

/// Normalized input direction: `x` is strafe (right positive), `y` is
/// forward (forward positive).
///
/// Opposing intents cancel to zero on their axis; an idle or fully cancelled
/// input yields `Vec2::ZERO`, never NaN.
pub fn desired_direction(intents: MovementIntents) -> Vec2 {
    let x = intents.right as i8 - intents.left as i8;
    let y = intents.forward as i8 - intents.backward as i8;
    Vec2::new(x as f32, y as f32).normalize_or_zero()
}

/// Pin the camera to its eye height.
pub fn clamp_eye_height(position: Vec3, eye_height: f32) -> Vec3 {
    Vec3::new(position.x, eye_height, position.z)
}

/// Project a position back onto the boundary circle if it strayed outside.
///
/// Only the horizontal components are touched and the ray from the center
/// is preserved.
pub fn clamp_to_boundary(position: Vec3, radius: f32) -> Vec3 {
    let horizontal = Vec2::new(position.x, position.z);
    let distance = horizontal.length();
    if distance <= radius {
        return position;
    }
    let clamped = horizontal * (radius / distance);
    Vec3::new(clamped.x, position.y, clamped.y)
}
