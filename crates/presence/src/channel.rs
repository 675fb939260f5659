//! Room channels: named broadcast topics carrying presence frames.
//!
//! `MemoryHub` is the in-process transport used by the CLI simulation and by
//! tests. A hosted realtime service plugs in behind the same `RoomChannel`
//! trait.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crossbeam_channel::{Receiver, Sender};

/// Lifecycle status reported by a channel subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStatus {
    /// Subscribe sent, no answer yet.
    Joining,
    Subscribed,
    ChannelError,
    TimedOut,
    Closed,
}

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("channel `{0}` is not subscribed")]
    NotSubscribed(String),
    #[error("channel hub is unavailable")]
    HubUnavailable,
}

/// One subscription to a named broadcast topic.
///
/// Broadcasts are delivered to every other subscriber of the topic, never
/// echoed back to the sender.
pub trait RoomChannel {
    fn topic(&self) -> &str;
    fn status(&self) -> ChannelStatus;
    /// Publish one frame. Fire-and-forget: `Ok` means handed to the
    /// transport, not delivered.
    fn send(&self, frame: &str) -> Result<(), ChannelError>;
    /// Take every frame received since the last drain. Never blocks.
    fn drain(&self) -> Vec<String>;
    fn unsubscribe(&mut self);
}

type Topics = HashMap<String, Vec<(u64, Sender<String>)>>;

/// In-process broadcast hub. Cloning shares the hub.
#[derive(Debug, Clone, Default)]
pub struct MemoryHub {
    topics: Arc<Mutex<Topics>>,
    next_id: Arc<AtomicU64>,
}

impl MemoryHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, topic: &str) -> MemoryChannel {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = crossbeam_channel::unbounded();
        let status = match self.topics.lock() {
            Ok(mut topics) => {
                topics.entry(topic.to_owned()).or_default().push((id, tx));
                tracing::info!(topic, subscriber = id, "subscribed to room channel");
                ChannelStatus::Subscribed
            }
            Err(_) => {
                tracing::warn!(topic, "channel hub poisoned; subscription failed");
                ChannelStatus::ChannelError
            }
        };
        MemoryChannel {
            hub: self.clone(),
            topic: topic.to_owned(),
            id,
            rx,
            status,
        }
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .lock()
            .map(|t| t.get(topic).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    fn publish(&self, topic: &str, from: u64, frame: &str) -> Result<(), ChannelError> {
        let topics = self.topics.lock().map_err(|_| ChannelError::HubUnavailable)?;
        if let Some(subs) = topics.get(topic) {
            for (id, tx) in subs.iter().filter(|(id, _)| *id != from) {
                if tx.send(frame.to_owned()).is_err() {
                    tracing::trace!(topic, subscriber = id, "dropped frame for gone subscriber");
                }
            }
        }
        Ok(())
    }

    fn remove(&self, topic: &str, id: u64) {
        if let Ok(mut topics) = self.topics.lock() {
            if let Some(subs) = topics.get_mut(topic) {
                subs.retain(|(sid, _)| *sid != id);
                if subs.is_empty() {
                    topics.remove(topic);
                }
            }
        }
    }
}

/// A subscription on a `MemoryHub`. Unsubscribes on drop.
#[derive(Debug)]
pub struct MemoryChannel {
    hub: MemoryHub,
    topic: String,
    id: u64,
    rx: Receiver<String>,
    status: ChannelStatus,
}

impl RoomChannel for MemoryChannel {
    fn topic(&self) -> &str {
        &self.topic
    }

    fn status(&self) -> ChannelStatus {
        self.status
    }

    fn send(&self, frame: &str) -> Result<(), ChannelError> {
        if self.status != ChannelStatus::Subscribed {
            return Err(ChannelError::NotSubscribed(self.topic.clone()));
        }
        self.hub.publish(&self.topic, self.id, frame)
    }

    fn drain(&self) -> Vec<String> {
        self.rx.try_iter().collect()
    }

    fn unsubscribe(&mut self) {
        if self.status == ChannelStatus::Closed {
            return;
        }
        self.hub.remove(&self.topic, self.id);
        self.status = ChannelStatus::Closed;
        tracing::info!(topic = %self.topic, subscriber = self.id, "left room channel");
    }
}

impl Drop for MemoryChannel {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_reaches_others_not_self() {
        let hub = MemoryHub::new();
        let a = hub.subscribe("room-1");
        let b = hub.subscribe("room-1");
        let c = hub.subscribe("room-1");

        a.send("hello").unwrap();
        assert!(a.drain().is_empty());
        assert_eq!(b.drain(), vec!["hello".to_string()]);
        assert_eq!(c.drain(), vec!["hello".to_string()]);
        assert!(b.drain().is_empty());
    }

    #[test]
    fn topics_are_isolated() {
        let hub = MemoryHub::new();
        let a = hub.subscribe("room-1");
        let other = hub.subscribe("room-2");
        a.send("x").unwrap();
        assert!(other.drain().is_empty());
    }

    #[test]
    fn unsubscribe_closes_and_removes() {
        let hub = MemoryHub::new();
        let mut a = hub.subscribe("room-1");
        let b = hub.subscribe("room-1");
        assert_eq!(hub.subscriber_count("room-1"), 2);

        a.unsubscribe();
        assert_eq!(a.status(), ChannelStatus::Closed);
        assert_eq!(hub.subscriber_count("room-1"), 1);
        assert!(matches!(a.send("late"), Err(ChannelError::NotSubscribed(_))));

        drop(b);
        assert_eq!(hub.subscriber_count("room-1"), 0);
    }

    #[test]
    fn hub_is_shareable_across_threads() {
        let hub = MemoryHub::new();
        let local = hub.subscribe("room-1");
        let remote_hub = hub.clone();
        std::thread::spawn(move || {
            let peer = remote_hub.subscribe("room-1");
            peer.send("from thread").unwrap();
        })
        .join()
        .unwrap();
        assert_eq!(local.drain(), vec!["from thread".to_string()]);
    }
}
