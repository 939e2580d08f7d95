//! Category Repository
//!
//! Categories are first-class rows: an empty category stays visible
//! because its row survives item deletion.

use super::{RepoError, RepoResult};
use shared::models::{Category, CategoryCreate};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find all categories ordered by sort_order, then name for stability
    pub async fn find_all(&self) -> RepoResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT name, sort_order FROM category ORDER BY sort_order, name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    /// Find category by name
    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT name, sort_order FROM category WHERE name = ?1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    /// Create a new category, appended to the display order unless a
    /// sort_order is supplied
    pub async fn create(&self, data: CategoryCreate) -> RepoResult<Category> {
        if data.name.trim().is_empty() {
            return Err(RepoError::Validation("Category name is required".into()));
        }
        if self.find_by_name(&data.name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Category '{}' already exists",
                data.name
            )));
        }

        let mut tx = self.pool.begin().await?;

        let sort_order = match data.sort_order {
            Some(order) => order,
            None => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM category",
                )
                .fetch_one(&mut *tx)
                .await?
            }
        };

        sqlx::query("INSERT INTO category (name, sort_order) VALUES (?1, ?2)")
            .bind(&data.name)
            .bind(sort_order)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Category {
            name: data.name,
            sort_order,
        })
    }

    /// Rename a category, rewriting the category row and every item row in
    /// one transaction. No-op when the name is unchanged.
    pub async fn rename(&self, old: &str, new: &str) -> RepoResult<Category> {
        if new.trim().is_empty() {
            return Err(RepoError::Validation("Category name is required".into()));
        }
        if old == new {
            return self
                .find_by_name(old)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Category '{old}' not found")));
        }
        if self.find_by_name(new).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Category '{new}' already exists"
            )));
        }

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE category SET name = ?1 WHERE name = ?2")
            .bind(new)
            .bind(old)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("Category '{old}' not found")));
        }

        sqlx::query("UPDATE item SET category = ?1 WHERE category = ?2")
            .bind(new)
            .bind(old)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.find_by_name(new)
            .await?
            .ok_or_else(|| RepoError::Database("Renamed category vanished".into()))
    }

    /// Delete a category and all its items in one transaction
    pub async fn delete(&self, name: &str) -> RepoResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM category WHERE name = ?1")
            .bind(name)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("Category '{name}' not found")));
        }

        sqlx::query("DELETE FROM item WHERE category = ?1")
            .bind(name)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Batch sort-order update: each listed name gets its index as the new
    /// sort_order. Unknown names are skipped with a warning.
    pub async fn reorder(&self, names: &[String]) -> RepoResult<usize> {
        let mut tx = self.pool.begin().await?;
        let mut updated = 0usize;

        for (index, name) in names.iter().enumerate() {
            let result = sqlx::query("UPDATE category SET sort_order = ?1 WHERE name = ?2")
                .bind(index as i64)
                .bind(name)
                .execute(&mut *tx)
                .await?;
            if result.rows_affected() == 0 {
                tracing::warn!(category = %name, "Skipping unknown category in reorder");
            } else {
                updated += 1;
            }
        }

        tx.commit().await?;
        Ok(updated)
    }
}
