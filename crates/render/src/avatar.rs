use std::collections::BTreeMap;

use glam::Vec3;
use readingroom_common::UserId;
use readingroom_presence::{PresenceMessage, RemotePresenceStore};

/// One remote participant as currently drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedAvatar {
    pub position: Vec3,
    /// Body yaw in radians. Pitch and roll are never shown.
    pub yaw: f32,
    pub target_position: Vec3,
    pub target_yaw: f32,
    pub color: String,
    pub name: String,
}

impl DisplayedAvatar {
    /// New avatars appear directly at their target.
    fn spawn(state: &PresenceMessage) -> Self {
        Self {
            position: state.position(),
            yaw: state.yaw(),
            target_position: state.position(),
            target_yaw: state.yaw(),
            color: state.color.clone(),
            name: state.name.clone(),
        }
    }

    fn retarget(&mut self, state: &PresenceMessage) {
        self.target_position = state.position();
        self.target_yaw = state.yaw();
        self.color.clone_from(&state.color);
        self.name.clone_from(&state.name);
    }

    /// One frame of easing. Yaw is lerped as a plain number, so crossing the
    /// ±π seam takes the long way round.
    fn step(&mut self, factor: f32) {
        self.position = self.position.lerp(self.target_position, factor);
        self.yaw += (self.target_yaw - self.yaw) * factor;
    }
}

/// Persistent per-user smoothed transforms, kept across frames.
#[derive(Debug)]
pub struct AvatarSet {
    smoothing: f32,
    avatars: BTreeMap<UserId, DisplayedAvatar>,
}

impl AvatarSet {
    pub fn new(smoothing: f32) -> Self {
        Self {
            smoothing,
            avatars: BTreeMap::new(),
        }
    }

    /// Bring the set in line with the store: spawn newcomers, retarget known
    /// users, drop users the store no longer has.
    pub fn sync(&mut self, store: &RemotePresenceStore) {
        self.avatars
            .retain(|id, _| store.get(id).is_some() && id != store.local_id());
        for (id, state) in store.iter() {
            if id == store.local_id() {
                continue;
            }
            match self.avatars.get_mut(id) {
                Some(avatar) => avatar.retarget(state),
                None => {
                    tracing::debug!(user = id.short(), "spawning avatar");
                    self.avatars.insert(id.clone(), DisplayedAvatar::spawn(state));
                }
            }
        }
    }

    /// Advance every avatar by one rendered frame.
    pub fn step(&mut self) {
        for avatar in self.avatars.values_mut() {
            avatar.step(self.smoothing);
        }
    }

    pub fn get(&self, id: &UserId) -> Option<&DisplayedAvatar> {
        self.avatars.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UserId, &DisplayedAvatar)> {
        self.avatars.iter()
    }

    pub fn len(&self) -> usize {
        self.avatars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.avatars.is_empty()
    }
}
