use glam::Vec3;
use readingroom_common::RoomSettings;
use readingroom_input::{MovementIntents, Platform};

use crate::camera::FirstPersonCamera;
use crate::locomotion::{clamp_eye_height, clamp_to_boundary, desired_direction};
use crate::strategy::{MovementStrategy, strategy_for};

/// Integrates held intents into camera motion once per frame.
#[derive(Debug)]
pub struct MotionController {
    strategy: Box<dyn MovementStrategy>,
    touch_primary: bool,
    speed: f32,
    eye_height: f32,
    boundary_radius: f32,
}

impl MotionController {
    pub fn new(platform: Platform, settings: &RoomSettings) -> Self {
        let strategy = strategy_for(platform);
        tracing::info!(strategy = strategy.name(), "motion controller ready");
        Self {
            strategy,
            touch_primary: platform.touch_primary,
            speed: settings.move_speed,
            eye_height: settings.eye_height,
            boundary_radius: settings.boundary_radius,
        }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Whether input may drive the camera this frame.
    ///
    /// Pointer-capture platforms need the look lock; touch-primary platforms
    /// only need navigation mode.
    pub fn input_active(&self, look_locked: bool, navigating: bool) -> bool {
        if self.touch_primary {
            navigating
        } else {
            look_locked
        }
    }

    /// Apply a look delta if input is active. Returns whether it was applied.
    pub fn look(
        &self,
        camera: &mut FirstPersonCamera,
        dx: f32,
        dy: f32,
        look_locked: bool,
        navigating: bool,
    ) -> bool {
        if !self.input_active(look_locked, navigating) {
            return false;
        }
        camera.rotate(dx, dy);
        true
    }

    /// Advance the camera by `dt` seconds. Returns the displacement applied
    /// before clamping.
    pub fn update(
        &self,
        camera: &mut FirstPersonCamera,
        intents: MovementIntents,
        dt: f32,
        look_locked: bool,
        navigating: bool,
    ) -> Vec3 {
        let _span = tracing::info_span!("motion_update", dt).entered();

        let mut moved = Vec3::ZERO;
        if self.input_active(look_locked, navigating) {
            let direction = desired_direction(intents);
            if direction != glam::Vec2::ZERO {
                moved = self
                    .strategy
                    .displacement(camera, direction, self.speed * dt);
                camera.position += moved;
            }
        }

        camera.position = clamp_eye_height(camera.position, self.eye_height);
        camera.position = clamp_to_boundary(camera.position, self.boundary_radius);
        moved
    }
}
