//! Motion: the local first-person camera and how held intents move it.
//!
//! # Invariants
//! - Camera height is pinned to the eye height after every update.
//! - Horizontal distance from the room center never exceeds the boundary radius.
//! - The movement strategy is picked once per session and never swapped.

pub mod camera;
pub mod controller;
pub mod locomotion;
pub mod strategy;

pub use camera::FirstPersonCamera;
pub use controller::MotionController;
pub use strategy::{ControllerRelative, DirectCamera, MovementStrategy, strategy_for};
