use std::f32::consts::FRAC_PI_2;

use glam::{EulerRot, Quat, Vec3};
use readingroom_common::Pose;
use readingroom_common::constants::{EYE_HEIGHT, LOOK_SENSITIVITY};

/// First-person camera with position, yaw and pitch.
///
/// Looks down -Z at zero yaw. Orientation is yaw about +Y followed by pitch
/// about the local X axis; roll is always zero.
#[derive(Debug, Clone, PartialEq)]
pub struct FirstPersonCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub sensitivity: f32,
}

impl Default for FirstPersonCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, EYE_HEIGHT, 5.0),
            yaw: 0.0,
            pitch: 0.0,
            fov: 60.0_f32.to_radians(),
            sensitivity: LOOK_SENSITIVITY,
        }
    }
}

impl FirstPersonCamera {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// View direction, including pitch.
    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.orientation() * Vec3::X
    }

    /// Apply a look delta in pointer units.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * self.sensitivity;
        self.pitch -= dy * self.sensitivity;
        self.pitch = self.pitch.clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Current pose with rotation decomposed in XYZ Euler order.
    pub fn pose(&self) -> Pose {
        Pose::from_orientation(self.position, self.orientation())
    }
}
