use std::time::Duration;

/// Eye height of the local camera above the floor, in meters.
///
/// The camera never leaves this height; broadcast poses subtract it so remote
/// peers receive feet-level positions.
pub const EYE_HEIGHT: f32 = 1.7;

/// Walking speed in meters per second.
pub const MOVE_SPEED: f32 = 5.0;

/// Horizontal distance from the room center the player may reach.
///
/// The bookshelves stand at `BOOKSHELF_RADIUS`; this keeps the camera a
/// meter in front of them.
pub const BOUNDARY_RADIUS: f32 = 8.5;

/// Radius at which the bookshelf ring is placed.
pub const BOOKSHELF_RADIUS: f32 = 9.5;

/// Minimum spacing between two outbound presence messages.
pub const BROADCAST_INTERVAL: Duration = Duration::from_millis(100);

/// Per-frame lerp factor used to pull displayed avatars toward their target.
pub const AVATAR_SMOOTHING: f32 = 0.1;

/// Delay between a navigation request and the actual pointer capture attempt.
pub const LOCK_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Radians of look rotation per unit of pointer movement.
pub const LOOK_SENSITIVITY: f32 = 0.002;

/// Name of the shared broadcast channel every participant joins.
pub const ROOM_CHANNEL: &str = "room-1";

/// Height of the name tag above an avatar's feet.
pub const NAME_TAG_HEIGHT: f32 = 2.0;

/// Shown on a name tag when the participant has no display name.
pub const FALLBACK_DISPLAY_NAME: &str = "Lector";

/// Key under which the club configuration lives in the key-value store.
pub const CLUB_CONFIG_KEY: &str = "club-config";
