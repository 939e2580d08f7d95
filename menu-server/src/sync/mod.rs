//! Peer sync transport
//!
//! HTTP client for the two-node pairing. Each propagation attempt is
//! Idle -> Sending -> Acknowledged | Failed; `Failed` is terminal for the
//! attempt; there is no retry queue and no persistence of failed pushes.

mod service;

pub use service::PeerSyncService;
