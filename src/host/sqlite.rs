//! SQLite-backed content host.
//!
//! Reference implementation of the host contract over the service database. It also
//! plays the commerce catalog: a product is variable when it carries the `variable`
//! term of the `product_type` taxonomy, and its variants are `product_variant`
//! children.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use super::{CommerceCatalog, ContentHost};
use crate::errors::AppError;
use crate::models::{
    ContentId, ContentObject, ContentStatus, MetaMap, NewContent, SupportedType, Term,
};

pub const PRODUCT_TYPE_TAXONOMY: &str = "product_type";
pub const VARIABLE_PRODUCT: &str = "variable";

/// Meta key prefix of derived caches dropped by `clear_derived_caches`.
const TRANSIENT_PREFIX: &str = "_transient_";

const DEFAULT_TAXONOMIES: &[(&str, SupportedType)] = &[
    ("category", SupportedType::Article),
    ("tag", SupportedType::Article),
    ("product_cat", SupportedType::Product),
    ("product_tag", SupportedType::Product),
    (PRODUCT_TYPE_TAXONOMY, SupportedType::Product),
];

#[derive(Clone)]
pub struct SqliteContentHost {
    pool: SqlitePool,
}

impl SqliteContentHost {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Register a taxonomy for a content type. Idempotent.
    pub async fn register_taxonomy(&self, name: &str, content_type: &str) -> Result<(), AppError> {
        sqlx::query("INSERT OR IGNORE INTO taxonomies (name, content_type) VALUES (?, ?)")
            .bind(name)
            .bind(content_type)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn register_default_taxonomies(&self) -> Result<(), AppError> {
        for (name, content_type) in DEFAULT_TAXONOMIES {
            self.register_taxonomy(name, content_type.as_str()).await?;
        }
        Ok(())
    }

    /// Attach terms by slug, registering the taxonomy and creating terms as needed.
    pub async fn assign_terms(
        &self,
        id: ContentId,
        content_type: &str,
        taxonomy: &str,
        slugs: &[String],
    ) -> Result<Vec<Term>, AppError> {
        self.register_taxonomy(taxonomy, content_type).await?;

        let mut terms = Vec::with_capacity(slugs.len());
        for slug in slugs {
            let slug = slug.trim();
            if slug.is_empty() {
                continue;
            }
            terms.push(self.ensure_term(taxonomy, slug, slug).await?);
        }

        let ids: Vec<i64> = terms.iter().map(|t| t.id).collect();
        self.set_object_terms(id, taxonomy, &ids).await?;
        Ok(terms)
    }

    /// Move an object to the trash. Returns false when it does not exist.
    pub async fn trash(&self, id: ContentId) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE content_objects SET status = ?, modified_at = ? WHERE id = ?")
                .bind(ContentStatus::Trash.as_str())
                .bind(Utc::now().to_rfc3339())
                .bind(id.get())
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete an object with its terms and metadata. Returns false when it does not exist.
    pub async fn delete(&self, id: ContentId) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM content_terms WHERE content_id = ?")
            .bind(id.get())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM content_meta WHERE content_id = ?")
            .bind(id.get())
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM content_objects WHERE id = ?")
            .bind(id.get())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ContentHost for SqliteContentHost {
    async fn fetch(&self, id: ContentId) -> Result<Option<ContentObject>, AppError> {
        let row = sqlx::query(
            "SELECT id, content_type, status, title, body, excerpt, parent_id, menu_order, author_id FROM content_objects WHERE id = ?",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().and_then(content_from_row))
    }

    async fn create(&self, content: &NewContent) -> Result<ContentId, AppError> {
        if content.content_type.trim().is_empty() {
            return Err(AppError::Host("Content type is required".to_string()));
        }

        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO content_objects (content_type, status, title, body, excerpt, parent_id, menu_order, author_id, created_at, modified_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&content.content_type)
        .bind(content.status.as_str())
        .bind(&content.title)
        .bind(&content.body)
        .bind(&content.excerpt)
        .bind(content.parent_id.map(ContentId::get))
        .bind(content.menu_order)
        .bind(content.author_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        ContentId::new(result.last_insert_rowid())
            .ok_or_else(|| AppError::Host("Insert returned no id".to_string()))
    }

    async fn taxonomies_for(&self, content_type: &str) -> Result<Vec<String>, AppError> {
        let rows = sqlx::query("SELECT name FROM taxonomies WHERE content_type = ? ORDER BY name")
            .bind(content_type)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|row| row.get("name")).collect())
    }

    async fn object_terms(&self, id: ContentId, taxonomy: &str) -> Result<Vec<Term>, AppError> {
        let rows = sqlx::query(
            r#"SELECT t.id, t.taxonomy, t.slug, t.name
               FROM terms t JOIN content_terms ct ON ct.term_id = t.id
               WHERE ct.content_id = ? AND t.taxonomy = ?
               ORDER BY t.id"#,
        )
        .bind(id.get())
        .bind(taxonomy)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(term_from_row).collect())
    }

    async fn set_object_terms(
        &self,
        id: ContentId,
        taxonomy: &str,
        term_ids: &[i64],
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM content_terms WHERE content_id = ? AND term_id IN (SELECT id FROM terms WHERE taxonomy = ?)",
        )
        .bind(id.get())
        .bind(taxonomy)
        .execute(&mut *tx)
        .await?;

        for term_id in term_ids {
            sqlx::query(
                "INSERT OR IGNORE INTO content_terms (content_id, term_id) SELECT ?, id FROM terms WHERE id = ? AND taxonomy = ?",
            )
            .bind(id.get())
            .bind(term_id)
            .bind(taxonomy)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn ensure_term(&self, taxonomy: &str, slug: &str, name: &str) -> Result<Term, AppError> {
        sqlx::query("INSERT OR IGNORE INTO terms (taxonomy, slug, name) VALUES (?, ?, ?)")
            .bind(taxonomy)
            .bind(slug)
            .bind(name)
            .execute(&self.pool)
            .await?;

        let row = sqlx::query("SELECT id, taxonomy, slug, name FROM terms WHERE taxonomy = ? AND slug = ?")
            .bind(taxonomy)
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;

        Ok(term_from_row(&row))
    }

    async fn metadata(&self, id: ContentId) -> Result<MetaMap, AppError> {
        let rows = sqlx::query(
            "SELECT meta_key, meta_value FROM content_meta WHERE content_id = ? ORDER BY id",
        )
        .bind(id.get())
        .fetch_all(&self.pool)
        .await?;

        let mut meta: MetaMap = BTreeMap::new();
        for row in rows {
            meta.entry(row.get("meta_key"))
                .or_default()
                .push(row.get("meta_value"));
        }
        Ok(meta)
    }

    async fn add_metadata(&self, id: ContentId, key: &str, value: &str) -> Result<(), AppError> {
        sqlx::query("INSERT INTO content_meta (content_id, meta_key, meta_value) VALUES (?, ?, ?)")
            .bind(id.get())
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_metadata(&self, id: ContentId, key: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM content_meta WHERE content_id = ? AND meta_key = ?")
            .bind(id.get())
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn featured_asset(&self, id: ContentId) -> Result<Option<i64>, AppError> {
        let row = sqlx::query("SELECT featured_asset_id FROM content_objects WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row
            .and_then(|row| row.get::<Option<i64>, _>("featured_asset_id"))
            .filter(|asset| *asset > 0))
    }

    async fn set_featured_asset(&self, id: ContentId, asset_id: i64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE content_objects SET featured_asset_id = ? WHERE id = ?")
            .bind(asset_id)
            .bind(id.get())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Content {} not found", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl CommerceCatalog for SqliteContentHost {
    async fn is_variable_product(&self, id: ContentId) -> Result<bool, AppError> {
        let is_product = self
            .fetch(id)
            .await?
            .is_some_and(|object| object.supported_type() == Some(SupportedType::Product));
        if !is_product {
            return Ok(false);
        }

        let terms = self.object_terms(id, PRODUCT_TYPE_TAXONOMY).await?;
        Ok(terms.iter().any(|t| t.slug == VARIABLE_PRODUCT))
    }

    async fn variant_ids(&self, id: ContentId) -> Result<Vec<ContentId>, AppError> {
        let rows = sqlx::query(
            "SELECT id FROM content_objects WHERE parent_id = ? AND content_type = ? AND status != ? ORDER BY menu_order, id",
        )
        .bind(id.get())
        .bind(SupportedType::ProductVariant.as_str())
        .bind(ContentStatus::Trash.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .filter_map(|row| ContentId::new(row.get("id")))
            .collect())
    }

    async fn clear_derived_caches(&self, id: ContentId) -> Result<(), AppError> {
        let result = sqlx::query(
            "DELETE FROM content_meta WHERE content_id = ? AND substr(meta_key, 1, ?) = ?",
        )
        .bind(id.get())
        .bind(TRANSIENT_PREFIX.len() as i64)
        .bind(TRANSIENT_PREFIX)
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            "Cleared {} derived cache entries of product {}",
            result.rows_affected(),
            id
        );
        Ok(())
    }
}

// Helper functions for row conversion

fn content_from_row(row: &sqlx::sqlite::SqliteRow) -> Option<ContentObject> {
    let status: String = row.get("status");
    let parent_id: Option<i64> = row.get("parent_id");

    Some(ContentObject {
        id: ContentId::new(row.get("id"))?,
        content_type: row.get("content_type"),
        status: ContentStatus::parse(&status).unwrap_or(ContentStatus::Draft),
        title: row.get("title"),
        body: row.get("body"),
        excerpt: row.get("excerpt"),
        parent_id: parent_id.and_then(ContentId::new),
        menu_order: row.get("menu_order"),
        author_id: row.get("author_id"),
    })
}

fn term_from_row(row: &sqlx::sqlite::SqliteRow) -> Term {
    Term {
        id: row.get("id"),
        taxonomy: row.get("taxonomy"),
        slug: row.get("slug"),
        name: row.get("name"),
    }
}
