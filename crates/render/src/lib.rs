//! Rendering adapter: what the room looks like from the local camera.
//!
//! # Invariants
//! - Renderers read presence state; they never write it.
//! - Displayed avatars ease toward their latest target by a fixed fraction
//!   per rendered frame, independent of elapsed time.
//! - The local participant never gets an avatar.
//!
//! The `Renderer` trait is backend-agnostic; `DebugTextRenderer` is the
//! text backend used by the CLI and tests.

mod avatar;
mod nametag;
mod renderer;

pub use avatar::{AvatarSet, DisplayedAvatar};
pub use nametag::{NameTag, display_label};
pub use renderer::{DebugTextRenderer, RenderView, Renderer};
