//! Image blob vault
//!
//! Content-keyed binary storage for menu images, backed by the `image`
//! table. A lookup for an absent key never fails: a deterministic
//! placeholder is synthesized, persisted under that key, and returned, so
//! every image reference in the catalog resolves to *some* valid image.
//! Blobs are overwritten in place on re-upload and never garbage-collected.

use crate::db::repository::{RepoError, RepoResult};
use image::{ImageFormat, Rgb, RgbImage};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use std::io::Cursor;

/// Shared well-known placeholder key, seeded at startup
pub const DEFAULT_IMAGE_KEY: &str = "logo.png";

/// Placeholder edge length in pixels
const PLACEHOLDER_SIZE: u32 = 512;

#[derive(Clone)]
pub struct ImageVault {
    pool: SqlitePool,
}

struct BlobRow {
    bytes: Vec<u8>,
    content_type: String,
}

impl ImageVault {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a blob under a content-addressed key and return the key.
    /// Re-uploading identical bytes lands on the same key.
    pub async fn put(&self, bytes: &[u8], content_type: &str) -> RepoResult<String> {
        let ext = content_type.rsplit('/').next().unwrap_or("bin");
        let hash = hex::encode(Sha256::digest(bytes));
        let key = format!("{}.{ext}", &hash[..16]);
        self.write(&key, bytes, content_type, true).await?;
        Ok(key)
    }

    /// Fetch a blob. An absent key yields a synthesized placeholder which
    /// is persisted before returning, so repeated lookups are byte-stable.
    /// Fails only when the store itself is unreachable.
    pub async fn get(&self, key: &str) -> RepoResult<(Vec<u8>, String)> {
        if let Some(row) = self.fetch(key).await? {
            return Ok((row.bytes, row.content_type));
        }

        tracing::info!(key = %key, "Image missing, synthesizing placeholder");
        let bytes = synthesize_placeholder(key)?;
        // INSERT OR IGNORE + read-back: concurrent synthesizers converge on
        // whichever row landed first
        self.write(key, &bytes, "image/png", false).await?;

        let row = self
            .fetch(key)
            .await?
            .ok_or_else(|| RepoError::Database("Synthesized placeholder vanished".into()))?;
        Ok((row.bytes, row.content_type))
    }

    /// Idempotently seed the shared default placeholder key
    pub async fn ensure_default(&self, key: &str) -> RepoResult<()> {
        if self.fetch(key).await?.is_some() {
            return Ok(());
        }
        let bytes = synthesize_placeholder(key)?;
        self.write(key, &bytes, "image/png", false).await?;
        tracing::info!(key = %key, "Seeded default placeholder image");
        Ok(())
    }

    async fn fetch(&self, key: &str) -> RepoResult<Option<BlobRow>> {
        let row = sqlx::query_as::<_, (Vec<u8>, String)>(
            "SELECT bytes, content_type FROM image WHERE key = ?1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(bytes, content_type)| BlobRow {
            bytes,
            content_type,
        }))
    }

    async fn write(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
        replace: bool,
    ) -> RepoResult<()> {
        let sql = if replace {
            "INSERT OR REPLACE INTO image (key, bytes, content_type) VALUES (?1, ?2, ?3)"
        } else {
            "INSERT OR IGNORE INTO image (key, bytes, content_type) VALUES (?1, ?2, ?3)"
        };
        sqlx::query(sql)
            .bind(key)
            .bind(bytes)
            .bind(content_type)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Synthesize a deterministic placeholder: a solid muted tone derived from
/// the key's SHA-256, with a darker band across the middle.
fn synthesize_placeholder(key: &str) -> RepoResult<Vec<u8>> {
    let digest = Sha256::digest(key.as_bytes());
    let base = Rgb([
        96 + digest[0] % 96,
        96 + digest[1] % 96,
        96 + digest[2] % 96,
    ]);

    let mut img = RgbImage::from_pixel(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, base);

    let band_top = PLACEHOLDER_SIZE * 2 / 5;
    let band_bottom = PLACEHOLDER_SIZE * 3 / 5;
    for y in band_top..band_bottom {
        for x in 0..PLACEHOLDER_SIZE {
            let Rgb([r, g, b]) = base;
            img.put_pixel(x, y, Rgb([r / 2, g / 2, b / 2]));
        }
    }

    let mut buffer = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| RepoError::Database(format!("Failed to encode placeholder: {e}")))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    async fn vault() -> ImageVault {
        let db = DbService::new_in_memory().await.unwrap();
        ImageVault::new(db.pool)
    }

    #[tokio::test]
    async fn test_put_then_get_round_trips() {
        let vault = vault().await;
        let key = vault.put(b"fake-jpeg-bytes", "image/jpeg").await.unwrap();
        assert!(key.ends_with(".jpeg"));

        let (bytes, content_type) = vault.get(&key).await.unwrap();
        assert_eq!(bytes, b"fake-jpeg-bytes");
        assert_eq!(content_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_put_is_content_addressed() {
        let vault = vault().await;
        let first = vault.put(b"same-bytes", "image/jpeg").await.unwrap();
        let second = vault.put(b"same-bytes", "image/jpeg").await.unwrap();
        let other = vault.put(b"other-bytes", "image/jpeg").await.unwrap();
        assert_eq!(first, second);
        assert_ne!(first, other);
    }

    #[tokio::test]
    async fn test_missing_key_yields_decodable_placeholder() {
        let vault = vault().await;
        let (bytes, content_type) = vault.get("never-written.jpg").await.unwrap();
        assert_eq!(content_type, "image/png");

        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!(img.width(), PLACEHOLDER_SIZE);
        assert_eq!(img.height(), PLACEHOLDER_SIZE);
    }

    #[tokio::test]
    async fn test_placeholder_synthesis_is_idempotent() {
        let vault = vault().await;
        let (first, _) = vault.get("stable.jpg").await.unwrap();
        let (second, _) = vault.get("stable.jpg").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_distinct_keys_get_distinct_placeholders() {
        let vault = vault().await;
        let (a, _) = vault.get("a.jpg").await.unwrap();
        let (b, _) = vault.get("b.jpg").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_ensure_default_is_idempotent_and_kept() {
        let vault = vault().await;
        vault.ensure_default(DEFAULT_IMAGE_KEY).await.unwrap();
        let (first, _) = vault.get(DEFAULT_IMAGE_KEY).await.unwrap();

        vault.ensure_default(DEFAULT_IMAGE_KEY).await.unwrap();
        let (second, _) = vault.get(DEFAULT_IMAGE_KEY).await.unwrap();
        assert_eq!(first, second);
    }

}
