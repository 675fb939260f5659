//! The reading room session: one participant's view of the shared room.
//!
//! # Invariants
//! - All session state is touched from one thread, inside `frame` or an
//!   input handler that runs to completion between frames.
//! - Inbound presence is drained at the start of a frame, outbound at the end.
//! - Teardown closes the subscription, forgets remote users and cancels any
//!   pending look lock.

pub mod catalog;
pub mod session;
pub mod summary;
pub mod ui;

pub use catalog::{Book, BookFormat, CLASSICS, highlight_id, search};
pub use session::{FrameReport, RoomError, RoomSession};
pub use summary::RoomSummary;
pub use ui::{Modal, UiState};
