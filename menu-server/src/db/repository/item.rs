//! Item Repository
//!
//! Item IDs are globally unique (`max + 1` assignment); `sort_order`
//! orders items within one category.

use super::{RepoError, RepoResult};
use shared::models::{ItemCreate, ItemUpdate, MenuItem};
use shared::sync::CategorySnapshot;
use sqlx::{Sqlite, SqlitePool, Transaction};

const ITEM_COLUMNS: &str = "id, category, name, price, image, variant, sort_order";

#[derive(Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find all items ordered by category, then position
    pub async fn find_all(&self) -> RepoResult<Vec<MenuItem>> {
        let items = sqlx::query_as::<_, MenuItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM item ORDER BY category, sort_order, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Find one category's items in display order
    pub async fn find_by_category(&self, category: &str) -> RepoResult<Vec<MenuItem>> {
        let items = sqlx::query_as::<_, MenuItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM item WHERE category = ?1 ORDER BY sort_order, id"
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Find item by (category, id)
    pub async fn find_by_id(&self, category: &str, id: i64) -> RepoResult<Option<MenuItem>> {
        let item = sqlx::query_as::<_, MenuItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM item WHERE category = ?1 AND id = ?2"
        ))
        .bind(category)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    /// Create a new item
    ///
    /// Assigns `id = max + 1` and appends to the category's order unless a
    /// sort_order is supplied. An unknown category is created on the fly at
    /// the end of the category order.
    pub async fn create(&self, data: ItemCreate) -> RepoResult<MenuItem> {
        if data.name.trim().is_empty() {
            return Err(RepoError::Validation("Item name is required".into()));
        }
        if data.price < 0 {
            return Err(RepoError::Validation("Item price must not be negative".into()));
        }
        if data.category.trim().is_empty() {
            return Err(RepoError::Validation("Category is required".into()));
        }

        let mut tx = self.pool.begin().await?;

        ensure_category(&mut tx, &data.category).await?;

        let id = sqlx::query_scalar::<_, i64>("SELECT COALESCE(MAX(id) + 1, 1) FROM item")
            .fetch_one(&mut *tx)
            .await?;

        let sort_order = match data.sort_order {
            Some(order) => order,
            None => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM item WHERE category = ?1",
                )
                .bind(&data.category)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        let item = MenuItem {
            id,
            category: data.category,
            name: data.name,
            price: data.price,
            image: data.image.unwrap_or_default(),
            variant: data.variant.unwrap_or_default(),
            sort_order,
        };

        sqlx::query(
            "INSERT INTO item (id, category, name, price, image, variant, sort_order)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(item.id)
        .bind(&item.category)
        .bind(&item.name)
        .bind(item.price)
        .bind(&item.image)
        .bind(item.variant)
        .bind(item.sort_order)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(item)
    }

    /// Partial update. Unspecified fields keep their stored value; a
    /// supplied image key replaces the reference
    pub async fn update(&self, category: &str, id: i64, data: ItemUpdate) -> RepoResult<MenuItem> {
        let existing = self
            .find_by_id(category, id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Item {id} not found in '{category}'")))?;

        if let Some(ref name) = data.name {
            if name.trim().is_empty() {
                return Err(RepoError::Validation("Item name must not be empty".into()));
            }
        }
        if let Some(price) = data.price {
            if price < 0 {
                return Err(RepoError::Validation("Item price must not be negative".into()));
            }
        }

        let item = MenuItem {
            name: data.name.unwrap_or(existing.name),
            price: data.price.unwrap_or(existing.price),
            image: data.image.unwrap_or(existing.image),
            variant: data.variant.unwrap_or(existing.variant),
            ..existing
        };

        sqlx::query(
            "UPDATE item SET name = ?1, price = ?2, image = ?3, variant = ?4
             WHERE category = ?5 AND id = ?6",
        )
        .bind(&item.name)
        .bind(item.price)
        .bind(&item.image)
        .bind(item.variant)
        .bind(category)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(item)
    }

    /// Delete an item. The category row persists, so an emptied category
    /// stays visible with an empty item list.
    pub async fn delete(&self, category: &str, id: i64) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM item WHERE category = ?1 AND id = ?2")
            .bind(category)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!(
                "Item {id} not found in '{category}'"
            )));
        }
        Ok(())
    }

    /// Destructive bulk replace of one category's items.
    ///
    /// The whole replace is one transaction: a structural store failure
    /// rolls everything back. Individually malformed items (empty name,
    /// negative price) are skipped with a warning and do not fail the
    /// batch. Positions are rewritten to the supplied order; items with
    /// `id <= 0`, or whose id collides with an item outside the replaced
    /// category, get fresh ids.
    ///
    /// Returns `(written, skipped)`.
    pub async fn replace_category_snapshot(
        &self,
        category: &str,
        sort_order: Option<i64>,
        items: &[MenuItem],
    ) -> RepoResult<(u32, u32)> {
        if category.trim().is_empty() {
            return Err(RepoError::Validation("Category is required".into()));
        }

        let mut tx = self.pool.begin().await?;

        match sort_order {
            Some(order) => upsert_category(&mut tx, category, order).await?,
            None => ensure_category(&mut tx, category).await?,
        }

        sqlx::query("DELETE FROM item WHERE category = ?1")
            .bind(category)
            .execute(&mut *tx)
            .await?;

        let mut next_id = sqlx::query_scalar::<_, i64>("SELECT COALESCE(MAX(id) + 1, 1) FROM item")
            .fetch_one(&mut *tx)
            .await?;

        let (written, skipped) =
            write_snapshot_items(&mut tx, category, items, &mut next_id).await?;

        tx.commit().await?;
        Ok((written, skipped))
    }

    /// Replace every category carried by a peer snapshot in one
    /// transaction, so a half-applied push can never be acknowledged. All
    /// pushed categories' items are deleted before any insert; an id that
    /// still collides afterwards belongs to a category outside the push
    /// and the incoming item is reassigned a fresh id.
    ///
    /// Returns `(written, skipped)` summed over all categories.
    pub async fn replace_snapshot(
        &self,
        categories: &[CategorySnapshot],
    ) -> RepoResult<(u32, u32)> {
        let mut tx = self.pool.begin().await?;

        for category in categories {
            if category.name.trim().is_empty() {
                return Err(RepoError::Validation("Category is required".into()));
            }
            upsert_category(&mut tx, &category.name, category.sort_order).await?;
            sqlx::query("DELETE FROM item WHERE category = ?1")
                .bind(&category.name)
                .execute(&mut *tx)
                .await?;
        }

        let mut next_id = sqlx::query_scalar::<_, i64>("SELECT COALESCE(MAX(id) + 1, 1) FROM item")
            .fetch_one(&mut *tx)
            .await?;

        let mut written = 0u32;
        let mut skipped = 0u32;
        for category in categories {
            let (w, s) =
                write_snapshot_items(&mut tx, &category.name, &category.items, &mut next_id)
                    .await?;
            written += w;
            skipped += s;
        }

        tx.commit().await?;
        Ok((written, skipped))
    }
}

/// Insert one category's snapshot items inside an open transaction,
/// rewriting positions to `0..n`. Malformed items (empty name, negative
/// price) are skipped. An id already taken by a surviving row belongs to
/// another category; both instances assign ids independently, so such a
/// collision is a normal state and the incoming item is kept under a
/// fresh id rather than dropped.
async fn write_snapshot_items(
    tx: &mut Transaction<'_, Sqlite>,
    category: &str,
    items: &[MenuItem],
    next_id: &mut i64,
) -> RepoResult<(u32, u32)> {
    let mut written = 0u32;
    let mut skipped = 0u32;
    let mut position = 0i64;

    for item in items {
        if item.name.trim().is_empty() || item.price < 0 {
            tracing::warn!(
                category = %category,
                id = item.id,
                "Skipping malformed item in snapshot"
            );
            skipped += 1;
            continue;
        }

        let mut id = if item.id > 0 { item.id } else { *next_id };

        let taken =
            sqlx::query_scalar::<_, i64>("SELECT EXISTS (SELECT 1 FROM item WHERE id = ?1)")
                .bind(id)
                .fetch_one(&mut **tx)
                .await?;
        if taken != 0 {
            tracing::warn!(
                category = %category,
                id,
                new_id = *next_id,
                "Reassigning conflicting item id in snapshot"
            );
            id = *next_id;
        }

        sqlx::query(
            "INSERT INTO item (id, category, name, price, image, variant, sort_order)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(id)
        .bind(category)
        .bind(&item.name)
        .bind(item.price)
        .bind(&item.image)
        .bind(item.variant)
        .bind(position)
        .execute(&mut **tx)
        .await?;

        if id >= *next_id {
            *next_id = id + 1;
        }
        position += 1;
        written += 1;
    }

    Ok((written, skipped))
}

/// Create the category row if absent, appended to the category order
async fn ensure_category(tx: &mut Transaction<'_, Sqlite>, name: &str) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO category (name, sort_order)
         SELECT ?1, COALESCE((SELECT MAX(sort_order) + 1 FROM category), 0)
         WHERE NOT EXISTS (SELECT 1 FROM category WHERE name = ?1)",
    )
    .bind(name)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Create or update the category row with an explicit sort order
async fn upsert_category(
    tx: &mut Transaction<'_, Sqlite>,
    name: &str,
    sort_order: i64,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO category (name, sort_order) VALUES (?1, ?2)
         ON CONFLICT(name) DO UPDATE SET sort_order = excluded.sort_order",
    )
    .bind(name)
    .bind(sort_order)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::Variant;

    async fn repo() -> ItemRepository {
        let db = DbService::new_in_memory().await.unwrap();
        ItemRepository::new(db.pool)
    }

    fn create(category: &str, name: &str, price: i64) -> ItemCreate {
        ItemCreate {
            category: category.into(),
            name: name.into(),
            price,
            image: None,
            variant: None,
            sort_order: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_next_id_and_position() {
        let repo = repo().await;
        let latte = repo.create(create("coffee", "Latte", 2500)).await.unwrap();
        assert_eq!(latte.id, 1);
        assert_eq!(latte.sort_order, 0);

        let mocha = repo.create(create("coffee", "Mocha", 3000)).await.unwrap();
        assert_eq!(mocha.id, 2);
        assert_eq!(mocha.sort_order, 1);

        let items = repo.find_by_category("coffee").await.unwrap();
        assert_eq!(
            items.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
            vec!["Latte", "Mocha"]
        );
    }

    #[tokio::test]
    async fn test_ids_are_global_across_categories() {
        let repo = repo().await;
        repo.create(create("coffee", "Latte", 2500)).await.unwrap();
        let cake = repo.create(create("dessert", "Croffle", 3500)).await.unwrap();
        assert_eq!(cake.id, 2);
        assert_eq!(cake.sort_order, 0);
    }

    #[tokio::test]
    async fn test_update_replaces_image_reference() {
        let repo = repo().await;
        let latte = repo.create(create("coffee", "Latte", 2500)).await.unwrap();
        assert_eq!(latte.image, "");

        let updated = repo
            .update(
                "coffee",
                latte.id,
                ItemUpdate {
                    image: Some("latte.jpg".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.image, "latte.jpg");
        assert_eq!(updated.name, "Latte");
        assert_eq!(updated.price, 2500);

        let stored = repo.find_by_id("coffee", latte.id).await.unwrap().unwrap();
        assert_eq!(stored.image, "latte.jpg");
    }

    #[tokio::test]
    async fn test_update_is_partial() {
        let repo = repo().await;
        let latte = repo.create(create("coffee", "Latte", 2500)).await.unwrap();

        let updated = repo
            .update(
                "coffee",
                latte.id,
                ItemUpdate {
                    price: Some(2800),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Latte");
        assert_eq!(updated.price, 2800);
        assert_eq!(updated.variant, Variant::None);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let repo = repo().await;
        let err = repo.delete("coffee", 42).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_last_item_keeps_category() {
        let repo = repo().await;
        let latte = repo.create(create("coffee", "Latte", 2500)).await.unwrap();
        let mocha = repo.create(create("coffee", "Mocha", 3000)).await.unwrap();

        repo.delete("coffee", latte.id).await.unwrap();
        repo.delete("coffee", mocha.id).await.unwrap();

        assert!(repo.find_by_category("coffee").await.unwrap().is_empty());

        // Category row survives item deletion
        let db_cat = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM category WHERE name = 'coffee'",
        )
        .fetch_one(&repo.pool)
        .await
        .unwrap();
        assert_eq!(db_cat, 1);
    }

    #[tokio::test]
    async fn test_replace_snapshot_rewrites_positions() {
        let repo = repo().await;
        let latte = repo.create(create("coffee", "Latte", 2500)).await.unwrap();
        let mocha = repo.create(create("coffee", "Mocha", 3000)).await.unwrap();

        // Reverse the order
        let snapshot = vec![
            MenuItem { sort_order: 99, ..mocha.clone() },
            MenuItem { sort_order: -5, ..latte.clone() },
        ];
        let (written, skipped) = repo
            .replace_category_snapshot("coffee", None, &snapshot)
            .await
            .unwrap();
        assert_eq!((written, skipped), (2, 0));

        let items = repo.find_by_category("coffee").await.unwrap();
        assert_eq!(items[0].name, "Mocha");
        assert_eq!(items[0].sort_order, 0);
        assert_eq!(items[1].name, "Latte");
        assert_eq!(items[1].sort_order, 1);
    }

    #[tokio::test]
    async fn test_replace_snapshot_skips_malformed_items() {
        let repo = repo().await;
        let latte = repo.create(create("coffee", "Latte", 2500)).await.unwrap();

        let snapshot = vec![
            MenuItem { name: "".into(), ..latte.clone() },
            MenuItem { id: 0, name: "Mocha".into(), price: 3000, ..latte.clone() },
        ];
        let (written, skipped) = repo
            .replace_category_snapshot("coffee", None, &snapshot)
            .await
            .unwrap();
        assert_eq!((written, skipped), (1, 1));

        let items = repo.find_by_category("coffee").await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Mocha");
    }

    #[tokio::test]
    async fn test_replace_snapshot_reassigns_id_taken_by_other_category() {
        let repo = repo().await;
        let sencha = repo.create(create("tea", "Sencha", 2000)).await.unwrap();
        assert_eq!(sencha.id, 1);

        // A peer assigned id 1 to its own coffee item independently
        let incoming = MenuItem {
            id: 1,
            category: "coffee".into(),
            name: "Latte".into(),
            price: 2500,
            image: String::new(),
            variant: Variant::None,
            sort_order: 0,
        };
        let (written, skipped) = repo
            .replace_category_snapshot("coffee", None, &[incoming])
            .await
            .unwrap();
        assert_eq!((written, skipped), (1, 0));

        let coffee = repo.find_by_category("coffee").await.unwrap();
        assert_eq!(coffee.len(), 1);
        assert_eq!(coffee[0].name, "Latte");
        assert_ne!(coffee[0].id, 1);

        let tea = repo.find_by_category("tea").await.unwrap();
        assert_eq!(tea[0].name, "Sencha");
        assert_eq!(tea[0].id, 1);
    }

    #[tokio::test]
    async fn test_replace_snapshot_covers_multiple_categories() {
        let repo = repo().await;
        repo.create(create("coffee", "Drip", 2000)).await.unwrap();

        let snapshot = vec![
            CategorySnapshot {
                name: "coffee".into(),
                sort_order: 1,
                items: vec![MenuItem {
                    id: 1,
                    category: "coffee".into(),
                    name: "Latte".into(),
                    price: 2500,
                    image: String::new(),
                    variant: Variant::Hot,
                    sort_order: 0,
                }],
            },
            CategorySnapshot {
                name: "dessert".into(),
                sort_order: 0,
                items: vec![MenuItem {
                    id: 2,
                    category: "dessert".into(),
                    name: "Croffle".into(),
                    price: 3500,
                    image: String::new(),
                    variant: Variant::None,
                    sort_order: 0,
                }],
            },
        ];
        let (written, skipped) = repo.replace_snapshot(&snapshot).await.unwrap();
        assert_eq!((written, skipped), (2, 0));

        let coffee = repo.find_by_category("coffee").await.unwrap();
        assert_eq!(coffee.len(), 1);
        assert_eq!(coffee[0].name, "Latte");
        assert_eq!(coffee[0].id, 1);

        let dessert = repo.find_by_category("dessert").await.unwrap();
        assert_eq!(dessert[0].name, "Croffle");

        let order = sqlx::query_scalar::<_, i64>(
            "SELECT sort_order FROM category WHERE name = 'dessert'",
        )
        .fetch_one(&repo.pool)
        .await
        .unwrap();
        assert_eq!(order, 0);
    }

    #[tokio::test]
    async fn test_replace_snapshot_creates_missing_category() {
        let repo = repo().await;
        let (written, _) = repo
            .replace_category_snapshot("tea", Some(3), &[])
            .await
            .unwrap();
        assert_eq!(written, 0);

        let order = sqlx::query_scalar::<_, i64>(
            "SELECT sort_order FROM category WHERE name = 'tea'",
        )
        .fetch_one(&repo.pool)
        .await
        .unwrap();
        assert_eq!(order, 3);
    }
}
