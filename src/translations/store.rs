//! Persisted translation group store.
//!
//! Every operation reads both records, applies a `TranslationGraph` mutation and writes
//! both records back with a version check. A concurrent writer makes the write fail with
//! a conflict, in which case the whole cycle is replayed on fresh state.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde_json::Value;

use super::graph::{LinkRejection, TranslationGraph};
use crate::config::StoreSettings;
use crate::db::{records, RecordWrite, Repository};
use crate::errors::AppError;
use crate::host::ContentHost;
use crate::models::{ContentId, GroupId, GroupsRecord, LangSlug, ObjectIndex, TranslationMap};

#[derive(Clone)]
pub struct TranslationGroupStore {
    repo: Arc<Repository>,
    host: Arc<dyn ContentHost>,
    settings: StoreSettings,
}

impl TranslationGroupStore {
    pub fn new(repo: Arc<Repository>, host: Arc<dyn ContentHost>, settings: StoreSettings) -> Self {
        Self {
            repo,
            host,
            settings,
        }
    }

    /// Current state of both records.
    pub async fn snapshot(&self) -> Result<TranslationGraph, AppError> {
        let (groups, index) = self
            .repo
            .read_pair::<GroupsRecord, ObjectIndex>(records::GROUPS, records::OBJECT_INDEX)
            .await?;
        Ok(TranslationGraph::new(groups.value, index.value))
    }

    pub async fn group_id_for(&self, id: ContentId) -> Result<Option<GroupId>, AppError> {
        Ok(self.snapshot().await?.group_id_for(id).cloned())
    }

    pub async fn translations_of(&self, id: ContentId) -> Result<TranslationMap, AppError> {
        Ok(self.snapshot().await?.translations_of(id))
    }

    /// The content id filling `lang` in `id`'s group.
    pub async fn translation_for(
        &self,
        id: ContentId,
        lang: &str,
    ) -> Result<Option<ContentId>, AppError> {
        let Some(lang) = LangSlug::sanitize(lang) else {
            return Ok(None);
        };
        Ok(self.translations_of(id).await?.get(&lang).copied())
    }

    pub async fn ensure_group(
        &self,
        id: ContentId,
        content_type: &str,
    ) -> Result<GroupId, AppError> {
        self.update(|graph| graph.ensure_group(id, content_type))
            .await
    }

    /// Point `lang` of `id`'s group at `target`. Returns `None` and leaves storage
    /// untouched when the language is invalid or the content type is rejected.
    pub async fn link(
        &self,
        id: ContentId,
        lang: &str,
        target: ContentId,
        content_type: &str,
    ) -> Result<Option<GroupId>, AppError> {
        let strict = self.settings.strict_content_types;
        let result = self
            .update(|graph| graph.link(id, lang, target, content_type, strict))
            .await?;

        Ok(accepted(result, id))
    }

    /// Replace the whole translation map of `id`'s group.
    pub async fn set_all(
        &self,
        id: ContentId,
        translations: &BTreeMap<String, Value>,
        content_type: &str,
    ) -> Result<Option<GroupId>, AppError> {
        let strict = self.settings.strict_content_types;
        let result = self
            .update(|graph| {
                graph.set_all(
                    id,
                    translations.iter().map(|(k, v)| (k.as_str(), v)),
                    content_type,
                    strict,
                )
            })
            .await?;

        Ok(accepted(result, id))
    }

    /// Forget `id` everywhere and clean up the group it belonged to.
    /// Returns false when `id` was not indexed.
    pub async fn cleanup_content_id(&self, id: ContentId) -> Result<bool, AppError> {
        let Some(group_id) = self.update(|graph| graph.remove_content_id(id)).await? else {
            return Ok(false);
        };

        tracing::debug!("Removed content {} from group {}", id, group_id);
        self.cleanup_orphans(&group_id).await?;
        Ok(true)
    }

    /// Drop members the host no longer considers valid and delete the group once no
    /// index entry references it. Returns true when the group was deleted.
    pub async fn cleanup_orphans(&self, group_id: &GroupId) -> Result<bool, AppError> {
        let members = self.snapshot().await?.members_of(group_id);

        let mut invalid = BTreeSet::new();
        for member in members {
            if !self.host.is_valid_translation(member).await? {
                invalid.insert(member);
            }
        }

        let report = self
            .update(|graph| graph.prune_group(group_id, &invalid))
            .await?;

        if !report.removed.is_empty() {
            tracing::warn!(
                "Pruned {} stale members from group {}: {:?}",
                report.removed.len(),
                group_id,
                report.removed
            );
        }
        if report.group_deleted {
            tracing::info!("Deleted orphan translation group {}", group_id);
        }

        Ok(report.group_deleted)
    }

    /// Run `apply` against fresh state until its result commits. Nothing is written
    /// when the graph is unchanged.
    async fn update<R, F>(&self, mut apply: F) -> Result<R, AppError>
    where
        F: FnMut(&mut TranslationGraph) -> R,
    {
        let mut attempt = 0;
        loop {
            let (groups, index) = self
                .repo
                .read_pair::<GroupsRecord, ObjectIndex>(records::GROUPS, records::OBJECT_INDEX)
                .await?;
            let original = TranslationGraph::new(groups.value, index.value);
            let mut graph = original.clone();
            let result = apply(&mut graph);

            if graph == original {
                return Ok(result);
            }

            let writes = [
                RecordWrite::new(records::GROUPS, &graph.groups, groups.version)?,
                RecordWrite::new(records::OBJECT_INDEX, &graph.index, index.version)?,
            ];

            match self.repo.write_records(&writes).await {
                Ok(_) => return Ok(result),
                Err(e) if e.is_conflict() && attempt < self.settings.max_write_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "Translation graph changed concurrently, retrying (attempt {})",
                        attempt
                    );
                    tokio::task::yield_now().await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn accepted(result: Result<GroupId, LinkRejection>, id: ContentId) -> Option<GroupId> {
    match result {
        Ok(group_id) => Some(group_id),
        Err(rejection) => {
            tracing::debug!("Ignored translation update for {}: {:?}", id, rejection);
            None
        }
    }
}
