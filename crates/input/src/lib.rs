//! Input: keyboard and touch sources mapped to one shared set of movement
//! intents, platform capability detection, and the look-lock state machine.
//!
//! # Invariants
//! - Keyboard and touch drive the same `IntentHandle`; there is no global registry.
//! - Intents change only on discrete edge events, never by polling hardware.
//! - The look lock is in exactly one of Unlocked, PendingLock, Locked.

pub mod action;
pub mod intents;
pub mod keymap;
pub mod look_lock;
pub mod platform;

pub use action::{Action, MoveDirection};
pub use intents::{IntentHandle, IntentSink, MovementIntents};
pub use keymap::KeyBindings;
pub use look_lock::{CaptureError, LockEvent, LockState, LookLock, NavigationFlag, PointerCapture};
pub use platform::Platform;
