use std::time::{Duration, Instant};

use readingroom_common::{Pose, RoomSettings, SessionIdentity};

use crate::channel::RoomChannel;
use crate::message::{PresenceMessage, encode_frame};

/// What a broadcaster tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastOutcome {
    /// No live channel; nothing to do.
    Offline,
    /// Too soon since the last broadcast.
    Throttled,
    /// One frame went out on the channel.
    Sent,
    /// The send failed. Still counts as this interval's broadcast.
    Failed,
}

/// Publishes the local pose at a capped rate.
///
/// The cap is measured from the previous attempt, successful or not, so a
/// flaky channel never causes a burst of catch-up sends.
#[derive(Debug)]
pub struct PresenceBroadcaster {
    identity: SessionIdentity,
    eye_height: f32,
    interval: Duration,
    last_sent: Option<Instant>,
    sent: u64,
}

impl PresenceBroadcaster {
    /// Create a broadcaster for `identity`, taking the interval and eye
    /// height from `settings`. The first tick on a live channel sends.
    pub fn new(identity: SessionIdentity, settings: &RoomSettings) -> Self {
        Self {
            identity,
            eye_height: settings.eye_height,
            interval: settings.broadcast_interval(),
            last_sent: None,
            sent: 0,
        }
    }

    /// Forget the last broadcast time so the next tick sends immediately.
    /// Called when a channel connection is (re)established.
    pub fn reset(&mut self) {
        self.last_sent = None;
    }

    /// Frames successfully handed to the channel since creation.
    pub fn sent_count(&self) -> u64 {
        self.sent
    }

    /// The message for `pose` (camera pose at eye height).
    pub fn message_for(&self, pose: &Pose) -> PresenceMessage {
        let feet = pose.position - glam::Vec3::Y * self.eye_height;
        PresenceMessage {
            id: self.identity.user_id.clone(),
            pos: feet.to_array(),
            rot: pose.rotation.to_array(),
            color: self.identity.color.clone(),
            name: self.identity.display_name.clone(),
        }
    }

    /// Called once per rendered frame.
    ///
    /// Sends when the channel is live and at least one interval has passed
    /// since the last attempt. Delivery is fire-and-forget.
    pub fn tick(
        &mut self,
        now: Instant,
        pose: &Pose,
        channel: Option<&dyn RoomChannel>,
    ) -> BroadcastOutcome {
        let Some(channel) = channel else {
            return BroadcastOutcome::Offline;
        };
        if let Some(last) = self.last_sent {
            if now.saturating_duration_since(last) < self.interval {
                return BroadcastOutcome::Throttled;
            }
        }
        self.last_sent = Some(now);

        let result = encode_frame(&self.message_for(pose))
            .map_err(|e| e.to_string())
            .and_then(|frame| channel.send(&frame).map_err(|e| e.to_string()));
        match result {
            Ok(()) => {
                self.sent += 1;
                tracing::trace!(topic = channel.topic(), "pose broadcast");
                BroadcastOutcome::Sent
            }
            Err(e) => {
                tracing::debug!(topic = channel.topic(), "pose broadcast failed: {e}");
                BroadcastOutcome::Failed
            }
        }
    }
}
