//! Duplication of a content object into a new language.
//!
//! Creating the clone is the only fatal step: once it exists, taxonomy, metadata,
//! featured asset and variants are propagated best-effort, the clone is tagged and the
//! source's own language is linked, each outcome recorded in a `PropagationReport`.
//! Linking the clone into the group always follows.

mod locks;
mod metas;
mod taxonomy;
mod variants;

pub use locks::SourceLocks;
pub use metas::{copy_metadata, MetaPolicy, SKU_KEY};
pub use taxonomy::copy_taxonomies;
pub use variants::{clone_variants, VariantCopy};

use std::sync::Arc;

use serde::Serialize;

use crate::errors::AppError;
use crate::host::{CommerceCatalog, ContentHost};
use crate::languages::LanguageRegistry;
use crate::models::{
    Actor, ContentId, ContentObject, GroupId, LangSlug, NewContent, SupportedType,
};
use crate::translations::{ContentLanguageTagger, TranslationGroupStore};

/// Why a duplication request did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    InvalidSource,
    SourceMissing,
    SourceRemoved,
    PermissionDenied,
    UnknownLanguage,
    UnsupportedType,
    SameLanguage,
}

/// Result of one propagation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    /// The step ran and applied something to the clone or its group.
    Copied,
    NotApplicable,
    Failed { reason: String },
}

impl StepStatus {
    fn from_count(result: Result<usize, AppError>) -> Self {
        match result {
            Ok(0) => StepStatus::NotApplicable,
            Ok(_) => StepStatus::Copied,
            Err(e) => StepStatus::Failed {
                reason: e.to_string(),
            },
        }
    }

    fn failed(reason: impl Into<String>) -> Self {
        StepStatus::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StepStatus::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropagationReport {
    pub taxonomy: StepStatus,
    pub metadata: StepStatus,
    pub featured_asset: StepStatus,
    pub variants: StepStatus,
    pub variants_cloned: usize,
    pub variants_failed: usize,
    /// Cloned variants left without their metadata.
    pub variants_meta_failed: usize,
    pub language_tag: StepStatus,
    /// Linking the source's own language to itself.
    pub source_link: StepStatus,
}

impl PropagationReport {
    pub fn has_failures(&self) -> bool {
        self.taxonomy.is_failed()
            || self.metadata.is_failed()
            || self.featured_asset.is_failed()
            || self.variants.is_failed()
            || self.variants_failed > 0
            || self.variants_meta_failed > 0
            || self.language_tag.is_failed()
            || self.source_link.is_failed()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DuplicateOutcome {
    #[serde(rename_all = "camelCase")]
    Created {
        id: ContentId,
        group_id: Option<GroupId>,
        report: PropagationReport,
    },
    /// The group already had a translation for the target language.
    Existing { id: ContentId },
    Skipped { reason: SkipReason },
}

impl DuplicateOutcome {
    /// Id of the translation the caller should continue with, if any.
    pub fn target_id(&self) -> Option<ContentId> {
        match self {
            DuplicateOutcome::Created { id, .. } | DuplicateOutcome::Existing { id } => Some(*id),
            DuplicateOutcome::Skipped { .. } => None,
        }
    }
}

fn skipped(reason: SkipReason) -> Result<DuplicateOutcome, AppError> {
    Ok(DuplicateOutcome::Skipped { reason })
}

/// Clones content objects into new languages and links the clones into the source's
/// translation group.
pub struct Duplicator {
    host: Arc<dyn ContentHost>,
    catalog: Arc<dyn CommerceCatalog>,
    store: TranslationGroupStore,
    tagger: ContentLanguageTagger,
    languages: LanguageRegistry,
    locks: SourceLocks,
}

impl Duplicator {
    pub fn new(
        host: Arc<dyn ContentHost>,
        catalog: Arc<dyn CommerceCatalog>,
        store: TranslationGroupStore,
        tagger: ContentLanguageTagger,
        languages: LanguageRegistry,
    ) -> Self {
        Self {
            host,
            catalog,
            store,
            tagger,
            languages,
            locks: SourceLocks::new(),
        }
    }

    /// Duplicate `source` into `target_lang` on behalf of `actor`.
    pub async fn duplicate(
        &self,
        source: i64,
        target_lang: &str,
        actor: &Actor,
    ) -> Result<DuplicateOutcome, AppError> {
        let Some(source_id) = ContentId::new(source) else {
            return skipped(SkipReason::InvalidSource);
        };
        let object = match self.host.fetch(source_id).await? {
            None => return skipped(SkipReason::SourceMissing),
            Some(object) if object.status.is_removed() => {
                return skipped(SkipReason::SourceRemoved)
            }
            Some(object) => object,
        };
        if !actor.can_edit(&object) {
            return skipped(SkipReason::PermissionDenied);
        }
        let Some(target) = LangSlug::sanitize(target_lang) else {
            return skipped(SkipReason::UnknownLanguage);
        };
        if !self.languages.contains(target.as_str()).await? {
            return skipped(SkipReason::UnknownLanguage);
        }
        let Some(content_type) = object.supported_type() else {
            return skipped(SkipReason::UnsupportedType);
        };
        let current_lang = self.tagger.language_of(source_id).await?;
        if current_lang.as_deref() == Some(target.as_str()) {
            return skipped(SkipReason::SameLanguage);
        }

        let _guard = self.locks.acquire(source_id).await;

        if let Some(group_id) = self.store.group_id_for(source_id).await? {
            self.store.cleanup_orphans(&group_id).await?;
        }
        if let Some(existing) = self
            .store
            .translation_for(source_id, target.as_str())
            .await?
        {
            tracing::info!(
                "Content {} already has a {} translation: {}",
                source_id,
                target,
                existing
            );
            return Ok(DuplicateOutcome::Existing { id: existing });
        }

        let clone_id = self
            .host
            .create(&NewContent::draft_copy_of(&object))
            .await?;
        tracing::info!("Created {} translation {} of {}", target, clone_id, source_id);

        let mut report = self.propagate(&object, clone_id, content_type).await;

        report.language_tag = match self.tagger.set_language(clone_id, target.as_str()).await {
            Ok(Some(_)) => StepStatus::Copied,
            Ok(None) => StepStatus::failed(format!("content {} could not be tagged", clone_id)),
            Err(e) => StepStatus::failed(e.to_string()),
        };

        let content_type = object.content_type.as_str();
        report.source_link = match current_lang.as_deref() {
            None => StepStatus::NotApplicable,
            Some(current) => match self
                .store
                .link(source_id, current, source_id, content_type)
                .await
            {
                Ok(Some(_)) => StepStatus::Copied,
                Ok(None) => StepStatus::failed(format!(
                    "content {} could not join its translation group",
                    source_id
                )),
                Err(e) => StepStatus::failed(e.to_string()),
            },
        };

        if report.has_failures() {
            tracing::warn!(
                "Translation {} of {} was created with incomplete data: {:?}",
                clone_id,
                source_id,
                report
            );
        }

        let group_id = self
            .store
            .link(source_id, target.as_str(), clone_id, content_type)
            .await?;
        if group_id.is_none() {
            tracing::warn!(
                "Translation {} could not be linked to the group of {}",
                clone_id,
                source_id
            );
        }

        Ok(DuplicateOutcome::Created {
            id: clone_id,
            group_id,
            report,
        })
    }

    /// Best-effort copy of everything besides the object itself.
    async fn propagate(
        &self,
        source: &ContentObject,
        clone_id: ContentId,
        content_type: SupportedType,
    ) -> PropagationReport {
        let host = self.host.as_ref();

        let taxonomy = StepStatus::from_count(
            copy_taxonomies(host, source.id, clone_id, &source.content_type).await,
        );
        let metadata = StepStatus::from_count(
            copy_metadata(host, source.id, clone_id, MetaPolicy::Content).await,
        );
        let featured_asset =
            StepStatus::from_count(self.copy_featured_asset(source.id, clone_id).await);

        let (variants, counts) = if content_type == SupportedType::Product {
            match self.copy_variants(source.id, clone_id).await {
                Ok(counts) => {
                    let status = match &counts.cache_error {
                        Some(e) => StepStatus::failed(format!("derived caches not cleared: {}", e)),
                        None => StepStatus::from_count(Ok(counts.cloned)),
                    };
                    (status, counts)
                }
                Err(e) => (StepStatus::failed(e.to_string()), VariantCopy::default()),
            }
        } else {
            (StepStatus::NotApplicable, VariantCopy::default())
        };

        PropagationReport {
            taxonomy,
            metadata,
            featured_asset,
            variants,
            variants_cloned: counts.cloned,
            variants_failed: counts.failed,
            variants_meta_failed: counts.meta_failed,
            language_tag: StepStatus::NotApplicable,
            source_link: StepStatus::NotApplicable,
        }
    }

    async fn copy_featured_asset(&self, from: ContentId, to: ContentId) -> Result<usize, AppError> {
        match self.host.featured_asset(from).await? {
            Some(asset_id) => {
                self.host.set_featured_asset(to, asset_id).await?;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn copy_variants(&self, from: ContentId, to: ContentId) -> Result<VariantCopy, AppError> {
        if !self.catalog.is_variable_product(from).await? {
            return Ok(VariantCopy::default());
        }
        clone_variants(self.host.as_ref(), self.catalog.as_ref(), from, to).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_status_from_count() {
        assert_eq!(StepStatus::from_count(Ok(0)), StepStatus::NotApplicable);
        assert_eq!(StepStatus::from_count(Ok(3)), StepStatus::Copied);
        assert!(StepStatus::from_count(Err(AppError::Host("down".to_string()))).is_failed());
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = DuplicateOutcome::Skipped {
            reason: SkipReason::SameLanguage,
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["outcome"], "skipped");
        assert_eq!(value["reason"], "same_language");

        let existing = DuplicateOutcome::Existing {
            id: ContentId::new(4).unwrap(),
        };
        assert_eq!(existing.target_id().map(ContentId::get), Some(4));
        assert_eq!(serde_json::to_value(&existing).unwrap()["id"], 4);
    }

    #[test]
    fn test_report_failures() {
        let mut report = PropagationReport {
            taxonomy: StepStatus::Copied,
            metadata: StepStatus::NotApplicable,
            featured_asset: StepStatus::NotApplicable,
            variants: StepStatus::NotApplicable,
            variants_cloned: 0,
            variants_failed: 0,
            variants_meta_failed: 0,
            language_tag: StepStatus::Copied,
            source_link: StepStatus::NotApplicable,
        };
        assert!(!report.has_failures());

        report.variants_failed = 1;
        assert!(report.has_failures());

        report.variants_failed = 0;
        report.variants_meta_failed = 2;
        assert!(report.has_failures());

        report.variants_meta_failed = 0;
        report.language_tag = StepStatus::failed("refused");
        assert!(report.has_failures());
    }
}
