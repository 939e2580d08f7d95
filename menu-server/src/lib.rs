//! Menu Server - café menu catalog with two-node sync
//!
//! # Architecture overview
//!
//! - **Database** (`db`): embedded SQLite store (sqlx, WAL) with
//!   repositories for items and first-class categories
//! - **Catalog** (`catalog`): ordering reconciliation and the service
//!   orchestrating mutations + peer propagation
//! - **Vault** (`vault`): image blob storage with placeholder synthesis
//! - **Sync** (`sync`): best-effort snapshot push/pull between the two
//!   fixed-role instances
//! - **HTTP API** (`api`): thin axum routing layer
//!
//! # Module structure
//!
//! ```text
//! menu-server/src/
//! ├── core/     # config, state, server loop
//! ├── api/      # HTTP routes and handlers
//! ├── catalog/  # ordering engine, catalog service
//! ├── db/       # pool setup, repositories
//! ├── sync/     # peer sync transport
//! ├── vault/    # image blob vault
//! └── utils/    # errors, logging
//! ```

pub mod api;
pub mod catalog;
pub mod core;
pub mod db;
pub mod sync;
pub mod utils;
pub mod vault;

// Re-export public types
pub use catalog::CatalogService;
pub use core::{Config, InstanceRole, Server, ServerState};
pub use db::DbService;
pub use sync::PeerSyncService;
pub use utils::logger::init_logger_with_file;
pub use utils::{AppError, AppResult};
pub use vault::ImageVault;
