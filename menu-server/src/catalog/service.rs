//! Catalog service
//!
//! Orchestrates the item/category repositories and the ordering engine,
//! and propagates every successful local mutation to the peer instance as
//! a full snapshot. Propagation is inline and best-effort: it happens on
//! the task handling the originating write, bounded by the sync client's
//! timeout, and a failure is logged and swallowed, never surfaced to the
//! caller whose local write has already committed.

use dashmap::DashMap;
use shared::models::{Category, CategoryCreate, ItemCreate, ItemUpdate, MenuItem, ReorderEntry};
use shared::sync::{CategorySnapshot, SnapshotAck, SnapshotPush};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::catalog::ordering;
use crate::db::repository::{CategoryRepository, ItemRepository};
use crate::sync::PeerSyncService;
use crate::utils::AppResult;

pub struct CatalogService {
    items: ItemRepository,
    categories: CategoryRepository,
    sync: Option<Arc<PeerSyncService>>,
    instance_id: String,
    /// Monotonic revision attached to every outgoing snapshot
    push_revision: AtomicU64,
    /// Highest revision applied per origin; pushes at or below are dropped
    seen_revisions: DashMap<String, u64>,
}

impl CatalogService {
    pub fn new(pool: SqlitePool, instance_id: String, sync: Option<Arc<PeerSyncService>>) -> Self {
        Self {
            items: ItemRepository::new(pool.clone()),
            categories: CategoryRepository::new(pool),
            sync,
            instance_id,
            push_revision: AtomicU64::new(0),
            seen_revisions: DashMap::new(),
        }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    // ========== Reads ==========

    /// Full catalog: every category in display order, each with its
    /// ordered items. Empty categories appear with an empty list.
    pub async fn list_all(&self) -> AppResult<Vec<CategorySnapshot>> {
        let categories = self.categories.find_all().await?;
        let items = self.items.find_all().await?;

        let mut grouped: HashMap<String, Vec<MenuItem>> = HashMap::new();
        for item in items {
            grouped.entry(item.category.clone()).or_default().push(item);
        }

        Ok(categories
            .into_iter()
            .map(|category| CategorySnapshot {
                items: grouped.remove(&category.name).unwrap_or_default(),
                name: category.name,
                sort_order: category.sort_order,
            })
            .collect())
    }

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        Ok(self.categories.find_all().await?)
    }

    // ========== Item mutations ==========

    pub async fn create_item(&self, data: ItemCreate) -> AppResult<MenuItem> {
        let item = self.items.create(data).await?;
        self.propagate().await;
        Ok(item)
    }

    pub async fn update_item(
        &self,
        category: &str,
        id: i64,
        data: ItemUpdate,
    ) -> AppResult<MenuItem> {
        let item = self.items.update(category, id, data).await?;
        self.propagate().await;
        Ok(item)
    }

    pub async fn delete_item(&self, category: &str, id: i64) -> AppResult<()> {
        self.items.delete(category, id).await?;
        self.propagate().await;
        Ok(())
    }

    /// Apply a client-submitted full ordering of one category
    /// (replace semantics, see [`ordering::reconcile`])
    pub async fn reorder_items(
        &self,
        category: &str,
        entries: &[ReorderEntry],
    ) -> AppResult<Vec<MenuItem>> {
        let existing = self.items.find_by_category(category).await?;
        let reconciled = ordering::reconcile(category, &existing, entries);
        self.items
            .replace_category_snapshot(category, None, &reconciled)
            .await?;
        let result = self.items.find_by_category(category).await?;
        self.propagate().await;
        Ok(result)
    }

    // ========== Category mutations ==========

    pub async fn create_category(&self, data: CategoryCreate) -> AppResult<Category> {
        let category = self.categories.create(data).await?;
        self.propagate().await;
        Ok(category)
    }

    pub async fn rename_category(&self, old: &str, new: &str) -> AppResult<Category> {
        let category = self.categories.rename(old, new).await?;
        self.propagate().await;
        Ok(category)
    }

    pub async fn delete_category(&self, name: &str) -> AppResult<()> {
        self.categories.delete(name).await?;
        self.propagate().await;
        Ok(())
    }

    pub async fn reorder_categories(&self, names: &[String]) -> AppResult<usize> {
        let updated = self.categories.reorder(names).await?;
        self.propagate().await;
        Ok(updated)
    }

    // ========== Peer sync ==========

    /// Build a full-catalog push tagged with this instance's id and the
    /// next revision
    pub async fn build_push(&self) -> AppResult<SnapshotPush> {
        let categories = self.list_all().await?;
        let revision = self.push_revision.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(SnapshotPush {
            origin: self.instance_id.clone(),
            revision,
            categories,
            sent_at: shared::util::now_millis(),
        })
    }

    /// Ingest a snapshot pushed (or pulled) from the peer.
    ///
    /// Drops the push when it originated here (a reflection of our own
    /// write) or when its revision is not newer than the last one applied
    /// from that origin. An applied push is never re-forwarded:
    /// propagation depth is exactly one hop.
    pub async fn ingest(&self, push: SnapshotPush) -> AppResult<SnapshotAck> {
        if push.origin == self.instance_id {
            tracing::warn!(
                origin = %push.origin,
                revision = push.revision,
                "Dropping reflected snapshot from ourselves"
            );
            return Ok(SnapshotAck::dropped("own origin"));
        }

        let last_seen = self
            .seen_revisions
            .get(&push.origin)
            .map(|v| *v)
            .unwrap_or(0);
        if push.revision <= last_seen {
            tracing::debug!(
                origin = %push.origin,
                revision = push.revision,
                last_seen,
                "Dropping stale snapshot"
            );
            return Ok(SnapshotAck::dropped("stale revision"));
        }

        // One transaction across the whole push: a half-applied snapshot
        // is never acknowledged, and its revision is never recorded.
        let (items, skipped) = self.items.replace_snapshot(&push.categories).await?;

        self.seen_revisions.insert(push.origin.clone(), push.revision);
        tracing::info!(
            origin = %push.origin,
            revision = push.revision,
            items,
            skipped,
            "Applied peer snapshot"
        );

        Ok(SnapshotAck {
            applied: true,
            items,
            skipped,
            reason: None,
        })
    }

    /// Explicit pull: fetch the peer's snapshot and ingest it.
    /// Best-effort, used by a mirror instance at startup.
    pub async fn pull_from_peer(&self) {
        let Some(sync) = &self.sync else { return };

        match sync.fetch_snapshot().await {
            Ok(push) => {
                if let Err(e) = self.ingest(push).await {
                    tracing::warn!("Failed to apply pulled snapshot: {e}");
                }
            }
            Err(e) => {
                tracing::warn!(
                    peer = %sync.peer_url(),
                    "Peer pull failed, serving last-known local state: {e}"
                );
            }
        }
    }

    /// One best-effort push of the full catalog to the peer. Failure is
    /// terminal for the attempt and invisible to the mutating caller.
    async fn propagate(&self) {
        let Some(sync) = &self.sync else { return };

        let push = match self.build_push().await {
            Ok(push) => push,
            Err(e) => {
                tracing::warn!("Failed to build snapshot for peer push: {e}");
                return;
            }
        };

        match sync.push_snapshot(&push).await {
            Ok(ack) if ack.applied => {
                tracing::debug!(revision = push.revision, "Peer acknowledged snapshot");
            }
            Ok(ack) => {
                tracing::debug!(
                    revision = push.revision,
                    reason = ?ack.reason,
                    "Peer dropped snapshot"
                );
            }
            Err(e) => {
                tracing::warn!(
                    peer = %sync.peer_url(),
                    revision = push.revision,
                    "Peer push failed (no retry): {e}"
                );
            }
        }
    }
}
