//! Peer sync protocol types
//!
//! One instance pushes its full catalog snapshot to the peer after every
//! local mutation. The push carries the origin instance id and a
//! per-instance monotonic revision; the receiver uses both to drop
//! reflected or stale deliveries, so propagation depth is exactly one hop.

use serde::{Deserialize, Serialize};

use crate::models::MenuItem;

/// One category with its full ordered item list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySnapshot {
    pub name: String,
    #[serde(default)]
    pub sort_order: i64,
    pub items: Vec<MenuItem>,
}

/// A full catalog snapshot pushed to (or pulled by) the peer instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotPush {
    /// Instance id of the sender
    pub origin: String,
    /// Monotonically increasing per-instance revision
    pub revision: u64,
    /// Every category, in display order, with full item lists
    pub categories: Vec<CategorySnapshot>,
    /// Timestamp when the push was built (Unix millis)
    pub sent_at: i64,
}

/// Response after processing a pushed snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotAck {
    /// False when the push was dropped (own reflection or stale revision)
    pub applied: bool,
    /// Number of items written
    pub items: u32,
    /// Number of malformed items skipped
    pub skipped: u32,
    /// Why the push was not applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl SnapshotAck {
    pub fn dropped(reason: impl Into<String>) -> Self {
        Self {
            applied: false,
            items: 0,
            skipped: 0,
            reason: Some(reason.into()),
        }
    }
}
