//! Server state: shared handles for all services
//!
//! `ServerState` is cloned into every handler; all members are cheap
//! handles (pool clones or `Arc`s).

use std::sync::Arc;
use std::time::Duration;

use crate::catalog::CatalogService;
use crate::core::Config;
use crate::db::DbService;
use crate::sync::PeerSyncService;
use crate::utils::AppError;
use crate::vault::{ImageVault, DEFAULT_IMAGE_KEY};

#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub catalog: Arc<CatalogService>,
    pub vault: ImageVault,
}

impl ServerState {
    /// Open the store, wire up the services, and seed the default
    /// placeholder image
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        std::fs::create_dir_all(&config.work_dir)
            .map_err(|e| AppError::internal(format!("Failed to create work dir: {e}")))?;

        let db = DbService::new(&config.db_path).await?;

        let sync = match &config.peer_url {
            Some(url) => {
                tracing::info!(peer = %url, "Peer sync enabled");
                Some(Arc::new(PeerSyncService::new(
                    url.clone(),
                    Duration::from_millis(config.sync_timeout_ms),
                )?))
            }
            None => {
                tracing::info!("No peer configured, running standalone");
                None
            }
        };

        let catalog = Arc::new(CatalogService::new(
            db.pool.clone(),
            config.instance_id.clone(),
            sync,
        ));
        let vault = ImageVault::new(db.pool.clone());

        vault.ensure_default(DEFAULT_IMAGE_KEY).await?;

        Ok(Self {
            config: config.clone(),
            db,
            catalog,
            vault,
        })
    }

    /// Startup convergence: a mirror pulls the authoritative snapshot once.
    /// Best-effort; an unreachable peer leaves the last-known local state
    /// serving.
    pub async fn startup_sync(&self) {
        if self.config.is_mirror() && self.config.peer_url.is_some() {
            tracing::info!("Mirror instance pulling snapshot from peer");
            self.catalog.pull_from_peer().await;
        }
    }
}
