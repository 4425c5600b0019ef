//! Metadata propagation with deny-list filtering.

use crate::errors::AppError;
use crate::host::ContentHost;
use crate::models::ContentId;

/// Commerce unique identifier, cleared on every clone.
pub const SKU_KEY: &str = "_sku";

const CONTENT_DENYLIST: &[&str] = &[
    "_edit_lock",
    "_edit_last",
    SKU_KEY,
    "_wc_average_rating",
    "_wc_review_count",
    "total_sales",
];

const STOCK_KEYS: &[&str] = &["_stock", "_stock_status", "_manage_stock", "_backorders"];

const DENIED_PREFIXES: &[&str] = &["_transient_", "_oembed_", "_wp_old_slug"];

/// How metadata is carried from one object to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaPolicy {
    /// Content objects: values are appended to the clone.
    Content,
    /// Product variants: stock keys are denied too, and each copied key replaces
    /// whatever the clone already holds.
    Variant,
}

impl MetaPolicy {
    pub fn is_denied(&self, key: &str) -> bool {
        if key.is_empty() || CONTENT_DENYLIST.contains(&key) {
            return true;
        }
        if *self == MetaPolicy::Variant && STOCK_KEYS.contains(&key) {
            return true;
        }
        DENIED_PREFIXES.iter().any(|prefix| key.starts_with(prefix))
    }

    fn replaces_existing(&self) -> bool {
        matches!(self, MetaPolicy::Variant)
    }
}

/// Copy every allowed meta key of `from` onto `to`. Returns the number of keys copied.
pub async fn copy_metadata(
    host: &dyn ContentHost,
    from: ContentId,
    to: ContentId,
    policy: MetaPolicy,
) -> Result<usize, AppError> {
    let meta = host.metadata(from).await?;

    let mut copied = 0;
    for (key, values) in &meta {
        if policy.is_denied(key) {
            continue;
        }
        if policy.replaces_existing() {
            host.delete_metadata(to, key).await?;
        }
        for value in values {
            host.add_metadata(to, key, value).await?;
        }
        copied += 1;
    }

    if policy == MetaPolicy::Content {
        host.delete_metadata(to, SKU_KEY).await?;
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_denylist() {
        let policy = MetaPolicy::Content;
        for key in ["_edit_lock", "_sku", "total_sales", "_wc_review_count", ""] {
            assert!(policy.is_denied(key), "{key} should be denied");
        }
        for key in ["_price", "_stock", "color", "_thumbnail_id"] {
            assert!(!policy.is_denied(key), "{key} should be copied");
        }
    }

    #[test]
    fn test_denied_prefixes() {
        let policy = MetaPolicy::Content;
        assert!(policy.is_denied("_transient_wc_product_children_5"));
        assert!(policy.is_denied("_oembed_abc"));
        assert!(policy.is_denied("_wp_old_slug"));
        assert!(policy.is_denied("_wp_old_slugs"));
        assert!(!policy.is_denied("transient_"));
    }

    #[test]
    fn test_variant_policy_denies_stock_state() {
        let policy = MetaPolicy::Variant;
        for key in ["_stock", "_stock_status", "_manage_stock", "_backorders", "_sku"] {
            assert!(policy.is_denied(key), "{key} should be denied");
        }
        assert!(!policy.is_denied("attribute_color"));
        assert!(!policy.is_denied("_regular_price"));
    }
}
