//! Shared vocabulary for the reading room: user ids, poses, the local
//! session identity and the room tunables.
//!
//! # Invariants
//! - A `UserId` is opaque; nothing in the workspace parses it.
//! - `RoomSettings::default()` carries the canonical room constants.

pub mod constants;
pub mod identity;
pub mod settings;
pub mod types;

pub use identity::{SessionIdentity, display_name_from_account, random_session_color};
pub use settings::{RoomSettings, SettingsError};
pub use types::{Pose, UserId};
