//! Data models
//!
//! Shared between the two server instances and the frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! Item IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod category;
pub mod item;

// Re-exports
pub use category::*;
pub use item::*;
