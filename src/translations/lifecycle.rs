//! Host event hooks.

use std::sync::Arc;

use super::{ContentLanguageTagger, TranslationGroupStore};
use crate::errors::AppError;
use crate::host::ContentHost;
use crate::models::ContentId;

/// Keeps tags and translation groups in step with host-side saves, trashes and
/// deletions.
#[derive(Clone)]
pub struct ContentLifecycle {
    host: Arc<dyn ContentHost>,
    store: TranslationGroupStore,
    tagger: ContentLanguageTagger,
}

impl ContentLifecycle {
    pub fn new(
        host: Arc<dyn ContentHost>,
        store: TranslationGroupStore,
        tagger: ContentLanguageTagger,
    ) -> Self {
        Self {
            host,
            store,
            tagger,
        }
    }

    /// Give a freshly saved supported object the default language.
    pub async fn on_saved(&self, id: ContentId) -> Result<Option<String>, AppError> {
        let supported = self
            .host
            .fetch(id)
            .await?
            .is_some_and(|object| object.supported_type().is_some() && !object.status.is_removed());
        if !supported {
            return Ok(None);
        }

        self.tagger.assign_default_if_missing(id).await
    }

    pub async fn on_deleted(&self, id: ContentId) -> Result<bool, AppError> {
        self.store.cleanup_content_id(id).await
    }

    pub async fn on_trashed(&self, id: ContentId) -> Result<bool, AppError> {
        self.store.cleanup_content_id(id).await
    }
}
