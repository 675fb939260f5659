use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::constants;

/// Errors from loading room settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Tunables for a room session.
///
/// Every field defaults to the matching constant in [`crate::constants`], so
/// a settings file only needs the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomSettings {
    pub move_speed: f32,
    pub eye_height: f32,
    pub boundary_radius: f32,
    pub broadcast_interval_ms: u64,
    pub avatar_smoothing: f32,
    pub lock_settle_delay_ms: u64,
    pub look_sensitivity: f32,
    pub channel: String,
    /// Evict remote participants not heard from for this many seconds.
    /// `None` keeps them until the room is torn down.
    pub presence_expiry_secs: Option<u64>,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            move_speed: constants::MOVE_SPEED,
            eye_height: constants::EYE_HEIGHT,
            boundary_radius: constants::BOUNDARY_RADIUS,
            broadcast_interval_ms: constants::BROADCAST_INTERVAL.as_millis() as u64,
            avatar_smoothing: constants::AVATAR_SMOOTHING,
            lock_settle_delay_ms: constants::LOCK_SETTLE_DELAY.as_millis() as u64,
            look_sensitivity: constants::LOOK_SENSITIVITY,
            channel: constants::ROOM_CHANNEL.to_owned(),
            presence_expiry_secs: None,
        }
    }
}

impl RoomSettings {
    /// Load settings from a JSON file and validate them.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let file = std::fs::File::open(path.as_ref())?;
        let settings: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        settings.validate()?;
        tracing::debug!(path = %path.as_ref().display(), "loaded room settings");
        Ok(settings)
    }

    /// Reject values that would break room invariants. The broadcast
    /// interval may be slowed down but never made faster than the default
    /// cap of ten messages per second.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.avatar_smoothing > 0.0 && self.avatar_smoothing <= 1.0) {
            return Err(SettingsError::Invalid {
                field: "avatar_smoothing",
                reason: "must be in (0, 1]",
            });
        }
        if !(self.boundary_radius.is_finite() && self.boundary_radius > 0.0) {
            return Err(SettingsError::Invalid {
                field: "boundary_radius",
                reason: "must be positive",
            });
        }
        if self.move_speed < 0.0 || !self.move_speed.is_finite() {
            return Err(SettingsError::Invalid {
                field: "move_speed",
                reason: "must be a finite, non-negative number",
            });
        }
        if !(self.eye_height.is_finite() && self.eye_height > 0.0) {
            return Err(SettingsError::Invalid {
                field: "eye_height",
                reason: "must be a finite, positive number",
            });
        }
        if !(self.look_sensitivity.is_finite() && self.look_sensitivity > 0.0) {
            return Err(SettingsError::Invalid {
                field: "look_sensitivity",
                reason: "must be a finite, positive number",
            });
        }
        if self.broadcast_interval() < constants::BROADCAST_INTERVAL {
            return Err(SettingsError::Invalid {
                field: "broadcast_interval_ms",
                reason: "must be at least 100",
            });
        }
        if self.channel.is_empty() {
            return Err(SettingsError::Invalid {
                field: "channel",
                reason: "must not be empty",
            });
        }
        Ok(())
    }

    pub fn broadcast_interval(&self) -> Duration {
        Duration::from_millis(self.broadcast_interval_ms)
    }

    pub fn lock_settle_delay(&self) -> Duration {
        Duration::from_millis(self.lock_settle_delay_ms)
    }

    pub fn presence_expiry(&self) -> Option<Duration> {
        self.presence_expiry_secs.map(Duration::from_secs)
    }
}
