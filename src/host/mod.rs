//! Content host collaborator contract.
//!
//! The translation core never touches content storage directly. Everything it needs
//! from the surrounding content system goes through these traits, so the store, the
//! tagger and the duplicator can be wired to any host.

mod sqlite;

pub use sqlite::SqliteContentHost;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::{ContentId, ContentObject, MetaMap, NewContent, Term};

/// Content storage, taxonomy and metadata operations.
#[async_trait]
pub trait ContentHost: Send + Sync {
    /// Fetch a content object, `None` when it does not exist.
    async fn fetch(&self, id: ContentId) -> Result<Option<ContentObject>, AppError>;

    /// Create a content object and return its id.
    async fn create(&self, content: &NewContent) -> Result<ContentId, AppError>;

    /// Taxonomies registered for a content type.
    async fn taxonomies_for(&self, content_type: &str) -> Result<Vec<String>, AppError>;

    /// Terms of one taxonomy attached to an object.
    async fn object_terms(&self, id: ContentId, taxonomy: &str) -> Result<Vec<Term>, AppError>;

    /// Replace the terms of one taxonomy attached to an object.
    async fn set_object_terms(
        &self,
        id: ContentId,
        taxonomy: &str,
        term_ids: &[i64],
    ) -> Result<(), AppError>;

    /// Look up a term by slug, creating it when absent.
    async fn ensure_term(&self, taxonomy: &str, slug: &str, name: &str) -> Result<Term, AppError>;

    /// All metadata of an object.
    async fn metadata(&self, id: ContentId) -> Result<MetaMap, AppError>;

    /// Append one value under `key`.
    async fn add_metadata(&self, id: ContentId, key: &str, value: &str) -> Result<(), AppError>;

    /// Remove every value stored under `key`.
    async fn delete_metadata(&self, id: ContentId, key: &str) -> Result<(), AppError>;

    async fn featured_asset(&self, id: ContentId) -> Result<Option<i64>, AppError>;

    async fn set_featured_asset(&self, id: ContentId, asset_id: i64) -> Result<(), AppError>;

    /// Whether `id` may stay in a translation group: it exists and is not trashed.
    async fn is_valid_translation(&self, id: ContentId) -> Result<bool, AppError> {
        Ok(matches!(self.fetch(id).await?, Some(object) if !object.status.is_removed()))
    }
}

/// Commerce catalog operations used when duplicating variable products.
#[async_trait]
pub trait CommerceCatalog: Send + Sync {
    /// Whether the product has child variants.
    async fn is_variable_product(&self, id: ContentId) -> Result<bool, AppError>;

    /// Variant ids of a product, in display order.
    async fn variant_ids(&self, id: ContentId) -> Result<Vec<ContentId>, AppError>;

    /// Drop derived state (price ranges, child caches) after the variant set changed.
    async fn clear_derived_caches(&self, id: ContentId) -> Result<(), AppError>;
}
