//! Variant cloning for variable products.

use super::metas::{copy_metadata, MetaPolicy};
use crate::errors::AppError;
use crate::host::{CommerceCatalog, ContentHost};
use crate::models::{ContentId, NewContent};

/// Counts of one variant cloning run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantCopy {
    pub cloned: usize,
    pub failed: usize,
    /// Cloned variants whose metadata could not be copied.
    pub meta_failed: usize,
    /// Set when the derived caches of the clone could not be cleared.
    pub cache_error: Option<String>,
}

/// Clone every variant of `from` under `to`, then clear `to`'s derived caches.
///
/// Only listing the variants is fatal. A variant that cannot be read or created is
/// counted as failed and skipped. A created variant whose metadata copy fails still
/// counts as cloned and is also counted in `meta_failed`. A failed cache clear is kept
/// in `cache_error` next to the counts.
pub async fn clone_variants(
    host: &dyn ContentHost,
    catalog: &dyn CommerceCatalog,
    from: ContentId,
    to: ContentId,
) -> Result<VariantCopy, AppError> {
    let mut outcome = VariantCopy::default();

    for variant_id in catalog.variant_ids(from).await? {
        let variant = match host.fetch(variant_id).await {
            Ok(Some(variant)) => variant,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!("Failed to read variant {}: {}", variant_id, e);
                outcome.failed += 1;
                continue;
            }
        };

        let mut copy = NewContent::draft_copy_of(&variant);
        copy.parent_id = Some(to);

        let clone_id = match host.create(&copy).await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Failed to clone variant {}: {}", variant_id, e);
                outcome.failed += 1;
                continue;
            }
        };

        if let Err(e) = copy_metadata(host, variant_id, clone_id, MetaPolicy::Variant).await {
            tracing::warn!(
                "Failed to copy metadata of variant {} to {}: {}",
                variant_id,
                clone_id,
                e
            );
            outcome.meta_failed += 1;
        }

        tracing::debug!("Cloned variant {} as {}", variant_id, clone_id);
        outcome.cloned += 1;
    }

    if outcome.cloned > 0 {
        if let Err(e) = catalog.clear_derived_caches(to).await {
            tracing::warn!("Failed to clear derived caches of {}: {}", to, e);
            outcome.cache_error = Some(e.to_string());
        }
    }

    Ok(outcome)
}
