use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of a participant, as handed out by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id, used for simulated and anonymous sessions.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, for log lines and debug output.
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(8)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position plus Euler rotation (XYZ order, radians).
///
/// Only the Y component of `rotation` carries meaning for body orientation;
/// pitch and roll ride along so the wire format stays a plain triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl Pose {
    pub fn new(position: Vec3, rotation: Vec3) -> Self {
        Self { position, rotation }
    }

    /// Build a pose from an orientation quaternion, decomposed in XYZ order.
    pub fn from_orientation(position: Vec3, orientation: Quat) -> Self {
        let (x, y, z) = orientation.to_euler(EulerRot::XYZ);
        Self {
            position,
            rotation: Vec3::new(x, y, z),
        }
    }

    pub fn yaw(&self) -> f32 {
        self.rotation.y
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = UserId::generate();
        let b = UserId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn short_id_truncates() {
        let id = UserId::from("0123456789abcdef");
        assert_eq!(id.short(), "01234567");
        let tiny = UserId::from("abc");
        assert_eq!(tiny.short(), "abc");
    }

    #[test]
    fn user_id_serializes_as_plain_string() {
        let id = UserId::from("user-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"user-1\"");
    }

    #[test]
    fn pose_default_is_origin() {
        let p = Pose::default();
        assert_eq!(p.position, Vec3::ZERO);
        assert_eq!(p.rotation, Vec3::ZERO);
    }

    #[test]
    fn yaw_only_orientation_decomposes_to_y() {
        let q = Quat::from_rotation_y(0.5);
        let p = Pose::from_orientation(Vec3::ZERO, q);
        assert!((p.yaw() - 0.5).abs() < 1e-5);
        assert!(p.rotation.x.abs() < 1e-5);
        assert!(p.rotation.z.abs() < 1e-5);
    }
}
