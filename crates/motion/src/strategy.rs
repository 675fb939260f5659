use glam::{Vec2, Vec3};
use readingroom_input::Platform;

use crate::camera::FirstPersonCamera;

/// How a normalized input direction becomes a world-space displacement.
///
/// One strategy is chosen at session start from platform capabilities.
pub trait MovementStrategy: std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// World displacement for `direction` (x = strafe, y = forward) scaled by
    /// `distance` meters.
    fn displacement(&self, camera: &FirstPersonCamera, direction: Vec2, distance: f32) -> Vec3;
}

/// Desktop locomotion: forward is the horizontal projection of the view, so
/// looking up or down does not change walking speed.
#[derive(Debug, Default, Clone, Copy)]
pub struct ControllerRelative;

impl MovementStrategy for ControllerRelative {
    fn name(&self) -> &'static str {
        "controller-relative"
    }

    fn displacement(&self, camera: &FirstPersonCamera, direction: Vec2, distance: f32) -> Vec3 {
        let right = camera.right();
        let forward = Vec3::Y.cross(right);
        right * direction.x * distance + forward * direction.y * distance
    }
}

/// Touch locomotion: axes come straight from the camera orientation.
///
/// Forward keeps its pitch component; the eye-height clamp flattens the
/// result afterwards.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectCamera;

impl MovementStrategy for DirectCamera {
    fn name(&self) -> &'static str {
        "direct-camera"
    }

    fn displacement(&self, camera: &FirstPersonCamera, direction: Vec2, distance: f32) -> Vec3 {
        camera.forward() * direction.y * distance + camera.right() * direction.x * distance
    }
}

pub fn strategy_for(platform: Platform) -> Box<dyn MovementStrategy> {
    if platform.touch_primary {
        Box::new(DirectCamera)
    } else {
        Box::new(ControllerRelative)
    }
}
