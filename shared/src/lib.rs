//! Shared types for the menu catalog server
//!
//! Wire models and the peer sync protocol, used by both instances of the
//! server and by any client talking to the HTTP boundary.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.

pub mod models;
pub mod sync;
pub mod util;

// Re-exports
pub use models::{Category, CategoryCreate, ItemCreate, ItemUpdate, MenuItem, ReorderEntry, Variant};
pub use serde::{Deserialize, Serialize};
pub use sync::{CategorySnapshot, SnapshotAck, SnapshotPush};
