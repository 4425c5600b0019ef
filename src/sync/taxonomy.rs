//! Taxonomy term propagation.

use crate::errors::AppError;
use crate::host::ContentHost;
use crate::models::ContentId;
use crate::translations::LANGUAGE_TAXONOMY;

/// Copy term assignments of every taxonomy registered for `content_type`, except the
/// language taxonomy. Taxonomies where the source has no terms are left alone.
/// Returns the number of taxonomies copied.
pub async fn copy_taxonomies(
    host: &dyn ContentHost,
    from: ContentId,
    to: ContentId,
    content_type: &str,
) -> Result<usize, AppError> {
    let mut copied = 0;

    for taxonomy in host.taxonomies_for(content_type).await? {
        if taxonomy.is_empty() || taxonomy == LANGUAGE_TAXONOMY {
            continue;
        }

        let term_ids: Vec<i64> = host
            .object_terms(from, &taxonomy)
            .await?
            .into_iter()
            .map(|term| term.id)
            .collect();
        if term_ids.is_empty() {
            continue;
        }

        host.set_object_terms(to, &taxonomy, &term_ids).await?;
        copied += 1;
    }

    Ok(copied)
}
