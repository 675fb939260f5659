use std::fmt::Write;

use glam::Vec3;

use crate::avatar::AvatarSet;
use crate::nametag::NameTag;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Unit view direction.
    pub forward: Vec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 1.7, 5.0),
            forward: Vec3::NEG_Z,
            fov_degrees: 60.0,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer reads the displayed avatars and a view, then produces output.
/// It never touches presence state.
pub trait Renderer {
    type Output;

    fn render(&self, avatars: &AvatarSet, view: &RenderView) -> Self::Output;
}

/// Text backend: one line per avatar with its name tag.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, avatars: &AvatarSet, view: &RenderView) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Reading Room ({} remote) ===", avatars.len());
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) fwd=({:.2}, {:.2}, {:.2}) fov={:.0}",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.forward.x,
            view.forward.y,
            view.forward.z,
            view.fov_degrees
        );

        for (id, avatar) in avatars.iter() {
            let tag = NameTag::for_avatar(avatar, view.eye);
            let p = avatar.position;
            let _ = writeln!(
                out,
                "  [{}] {:<12} {} pos=({:.2}, {:.2}, {:.2}) yaw={:.2}",
                id.short(),
                tag.text,
                avatar.color,
                p.x,
                p.y,
                p.z,
                avatar.yaw
            );
        }

        out
    }
}
