use std::fmt;

use glam::Vec3;
use readingroom_input::LockState;

/// Snapshot of a session for status lines and the CLI.
#[derive(Debug, Clone)]
pub struct RoomSummary {
    /// Remote participants currently known, excluding ourselves.
    pub users_in_room: usize,
    pub position: Vec3,
    pub yaw: f32,
    pub lock: LockState,
    pub navigating: bool,
    pub connected: bool,
    pub broadcasts_sent: u64,
    pub strategy: &'static str,
}

impl RoomSummary {
    fn lock_label(&self) -> &'static str {
        match self.lock {
            LockState::Unlocked => "unlocked",
            LockState::PendingLock { .. } => "pending",
            LockState::Locked => "locked",
        }
    }
}

impl fmt::Display for RoomSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Room: users={} pos=({:.2}, {:.2}, {:.2}) yaw={:.2} lock={} nav={} online={} sent={} motion={}",
            self.users_in_room,
            self.position.x,
            self.position.y,
            self.position.z,
            self.yaw,
            self.lock_label(),
            self.navigating,
            self.connected,
            self.broadcasts_sent,
            self.strategy
        )
    }
}
