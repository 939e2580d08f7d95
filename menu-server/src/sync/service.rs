//! PeerSyncService: HTTP client for pushing snapshots to the peer instance

use reqwest::Client;
use shared::sync::{SnapshotAck, SnapshotPush};
use std::time::Duration;

use crate::utils::AppError;

/// HTTP client for the peer's sync API
///
/// The timeout bounds every attempt; an expired timeout is a failed
/// attempt like any other. Callers log failures and move on; a peer
/// outage must never fail the local write that triggered the push.
pub struct PeerSyncService {
    client: Client,
    peer_url: String,
}

impl PeerSyncService {
    /// `peer_url` is the peer's base URL (e.g. "http://cafe.example.com:5000")
    pub fn new(peer_url: String, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, peer_url })
    }

    /// Push a full catalog snapshot to the peer's sync endpoint
    pub async fn push_snapshot(&self, push: &SnapshotPush) -> Result<SnapshotAck, AppError> {
        let url = format!("{}/api/sync/snapshot", self.peer_url);

        let response = self
            .client
            .post(&url)
            .json(push)
            .send()
            .await
            .map_err(|e| AppError::internal(format!("Peer sync request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::internal(format!(
                "Peer sync failed with status {status}: {body}"
            )));
        }

        let ack: SnapshotAck = response
            .json()
            .await
            .map_err(|e| AppError::internal(format!("Failed to parse sync ack: {e}")))?;

        Ok(ack)
    }

    /// Pull the peer's full snapshot (explicit convergence path)
    pub async fn fetch_snapshot(&self) -> Result<SnapshotPush, AppError> {
        let url = format!("{}/api/sync/snapshot", self.peer_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::internal(format!("Peer snapshot fetch failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::internal(format!(
                "Peer snapshot fetch failed with status {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::internal(format!("Failed to parse peer snapshot: {e}")))
    }

    pub fn peer_url(&self) -> &str {
        &self.peer_url
    }
}
