//! Persistence: a small key-value API and the club configuration stored in it.
//!
//! # Invariants
//! - Values are arbitrary JSON; a missing key reads as `None`, not an error.
//! - Loading the club configuration never fails; any problem degrades to the
//!   default record.

pub mod club;
pub mod file;
pub mod http;
pub mod kv;

pub use club::{ClubConfig, load_club_config, save_club_config};
pub use file::FileKvStore;
pub use http::HttpKvStore;
pub use kv::{KvError, KvStore, MemoryKvStore};
