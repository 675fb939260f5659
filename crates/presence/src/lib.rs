//! Presence: sharing poses between participants of one room.
//!
//! Outbound poses go through a rate-capped broadcaster; inbound poses land in
//! a store keyed by user id. Delivery is fire-and-forget in both directions.
//!
//! # Invariants
//! - At most one outbound message per broadcast interval per participant.
//! - The local user's id is never a key in the remote store.
//! - An inbound message replaces the whole entry for its user.

pub mod broadcaster;
pub mod channel;
pub mod message;
pub mod store;

pub use broadcaster::{BroadcastOutcome, PresenceBroadcaster};
pub use channel::{ChannelError, ChannelStatus, MemoryChannel, MemoryHub, RoomChannel};
pub use message::{MessageError, PresenceMessage, decode_frame, encode_frame};
pub use store::{IngestOutcome, RemotePresenceStore};
