use glam::Vec3;
use readingroom_common::constants::{FALLBACK_DISPLAY_NAME, NAME_TAG_HEIGHT};

use crate::avatar::DisplayedAvatar;

/// Text shown above an avatar, falling back to the generic reader label.
pub fn display_label(name: &str) -> &str {
    if name.trim().is_empty() {
        FALLBACK_DISPLAY_NAME
    } else {
        name
    }
}

/// A billboarded label anchored above an avatar's head.
#[derive(Debug, Clone, PartialEq)]
pub struct NameTag {
    pub text: String,
    pub anchor: Vec3,
    /// Yaw that turns the tag's front (+Z) toward the viewer.
    pub facing_yaw: f32,
}

impl NameTag {
    pub fn for_avatar(avatar: &DisplayedAvatar, viewer: Vec3) -> Self {
        let anchor = avatar.position + Vec3::Y * NAME_TAG_HEIGHT;
        let to_viewer = viewer - anchor;
        Self {
            text: display_label(&avatar.name).to_owned(),
            anchor,
            facing_yaw: to_viewer.x.atan2(to_viewer.z),
        }
    }
}
