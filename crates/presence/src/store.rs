//! Latest known pose of every other participant in the room.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use readingroom_common::UserId;

use crate::message::{PresenceMessage, decode_frame};

/// Result of feeding one raw frame to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// A pose for this remote user was inserted or replaced.
    Stored(UserId),
    /// Our own pose echoed back.
    SelfEcho,
    /// Well-formed broadcast for some other event.
    Ignored,
    /// Not a broadcast frame, or a `pos` payload that failed to decode.
    Malformed,
}

#[derive(Debug, Clone)]
struct Entry {
    state: PresenceMessage,
    last_seen: Instant,
}

/// Remote presence map keyed by user id.
///
/// Messages replace entries wholesale. There is no ordering check, so a late
/// frame can overwrite a fresher one; the next broadcast repairs it.
#[derive(Debug)]
pub struct RemotePresenceStore {
    local: UserId,
    entries: BTreeMap<UserId, Entry>,
    expiry: Option<Duration>,
}

impl RemotePresenceStore {
    /// Empty store for the participant `local`, whose own frames are
    /// always filtered out. No expiry.
    pub fn new(local: UserId) -> Self {
        Self {
            local,
            entries: BTreeMap::new(),
            expiry: None,
        }
    }

    /// Evict participants not heard from within `expiry`.
    pub fn with_expiry(mut self, expiry: Option<Duration>) -> Self {
        self.expiry = expiry;
        self
    }

    /// Upsert a decoded message. Returns `false` for our own id.
    pub fn upsert(&mut self, message: PresenceMessage, now: Instant) -> bool {
        if message.id == self.local {
            return false;
        }
        let id = message.id.clone();
        let fresh = self
            .entries
            .insert(
                id.clone(),
                Entry {
                    state: message,
                    last_seen: now,
                },
            )
            .is_none();
        if fresh {
            tracing::info!(user = id.short(), "participant appeared");
        }
        true
    }

    /// Decode and store one raw frame from the room channel.
    pub fn ingest(&mut self, frame: &str, now: Instant) -> IngestOutcome {
        match decode_frame(frame) {
            Ok(Some(message)) => {
                let id = message.id.clone();
                if self.upsert(message, now) {
                    IngestOutcome::Stored(id)
                } else {
                    IngestOutcome::SelfEcho
                }
            }
            Ok(None) => {
                tracing::trace!("ignoring non-pose broadcast");
                IngestOutcome::Ignored
            }
            Err(e) => {
                tracing::debug!("dropping inbound frame: {e}");
                IngestOutcome::Malformed
            }
        }
    }

    /// Drop entries past the configured expiry. Returns the evicted ids.
    pub fn expire(&mut self, now: Instant) -> Vec<UserId> {
        let Some(expiry) = self.expiry else {
            return Vec::new();
        };
        let stale: Vec<UserId> = self
            .entries
            .iter()
            .filter(|(_, e)| now.saturating_duration_since(e.last_seen) >= expiry)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &stale {
            self.entries.remove(id);
            tracing::info!(user = id.short(), "participant expired");
        }
        stale
    }

    /// Forget everyone. Called when the room subscription is torn down.
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            tracing::debug!(count = self.entries.len(), "clearing remote presence");
        }
        self.entries.clear();
    }

    /// Last known pose of `id`, if they are in the room.
    pub fn get(&self, id: &UserId) -> Option<&PresenceMessage> {
        self.entries.get(id).map(|e| &e.state)
    }

    /// Remote participants in user-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&UserId, &PresenceMessage)> {
        self.entries.iter().map(|(id, e)| (id, &e.state))
    }

    /// Number of remote participants; never counts the local user.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The id filtered out of every upsert.
    pub fn local_id(&self) -> &UserId {
        &self.local
    }
}
