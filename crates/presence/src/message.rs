//! Wire format for presence frames on the room channel:
//! `{"type":"broadcast","event":"pos","payload":{id,pos,rot,color,name}}`.

use glam::Vec3;
use readingroom_common::UserId;
use serde::{Deserialize, Serialize};

pub const BROADCAST_TYPE: &str = "broadcast";
pub const POSE_EVENT: &str = "pos";

#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected frame type `{0}`")]
    UnexpectedType(String),
}

/// One participant's pose as published to the room.
///
/// `pos` is feet-level; `rot` is the XYZ Euler triple in radians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceMessage {
    pub id: UserId,
    pub pos: [f32; 3],
    pub rot: [f32; 3],
    pub color: String,
    #[serde(default)]
    pub name: String,
}

impl PresenceMessage {
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.pos)
    }

    pub fn rotation(&self) -> Vec3 {
        Vec3::from_array(self.rot)
    }

    pub fn yaw(&self) -> f32 {
        self.rot[1]
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Frame<P> {
    #[serde(rename = "type")]
    kind: String,
    event: String,
    payload: P,
}

pub fn encode_frame(message: &PresenceMessage) -> Result<String, MessageError> {
    let frame = Frame {
        kind: BROADCAST_TYPE.to_owned(),
        event: POSE_EVENT.to_owned(),
        payload: message,
    };
    Ok(serde_json::to_string(&frame)?)
}

/// Decode an inbound frame.
///
/// Returns `Ok(None)` for well-formed broadcasts of other events, which the
/// presence path ignores.
pub fn decode_frame(text: &str) -> Result<Option<PresenceMessage>, MessageError> {
    let frame: Frame<serde_json::Value> = serde_json::from_str(text)?;
    if frame.kind != BROADCAST_TYPE {
        return Err(MessageError::UnexpectedType(frame.kind));
    }
    if frame.event != POSE_EVENT {
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(frame.payload)?))
}
