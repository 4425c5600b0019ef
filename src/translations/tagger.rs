//! Per-object language tags.
//!
//! A content object's own language is a single term of the internal language taxonomy.
//! Tags live in the host and are independent of the translation group records.

use std::sync::Arc;

use crate::errors::AppError;
use crate::host::ContentHost;
use crate::languages::LanguageRegistry;
use crate::models::{ContentId, LangSlug};

/// Taxonomy holding language tags. Never copied between translations.
pub const LANGUAGE_TAXONOMY: &str = "content_language";

#[derive(Clone)]
pub struct ContentLanguageTagger {
    host: Arc<dyn ContentHost>,
    languages: LanguageRegistry,
}

impl ContentLanguageTagger {
    pub fn new(host: Arc<dyn ContentHost>, languages: LanguageRegistry) -> Self {
        Self { host, languages }
    }

    pub async fn language_of(&self, id: ContentId) -> Result<Option<String>, AppError> {
        let terms = self.host.object_terms(id, LANGUAGE_TAXONOMY).await?;
        Ok(terms.into_iter().next().map(|t| t.slug))
    }

    /// Attach exactly one language tag, replacing any previous one. Returns the applied
    /// slug, or `None` when the slug is unusable or the object does not exist.
    pub async fn set_language(
        &self,
        id: ContentId,
        lang: &str,
    ) -> Result<Option<String>, AppError> {
        let Some(slug) = LangSlug::sanitize(lang) else {
            return Ok(None);
        };
        if self.host.fetch(id).await?.is_none() {
            return Ok(None);
        }

        let name = match self.languages.get(slug.as_str()).await? {
            Some(language) => language.display_name().to_string(),
            None => slug.to_string(),
        };
        let term = self
            .host
            .ensure_term(LANGUAGE_TAXONOMY, slug.as_str(), &name)
            .await?;
        self.host
            .set_object_terms(id, LANGUAGE_TAXONOMY, &[term.id])
            .await?;

        tracing::debug!("Tagged content {} as {}", id, slug);
        Ok(Some(slug.to_string()))
    }

    /// Tag an untagged object with the default language. No-op when a tag exists or no
    /// default is configured.
    pub async fn assign_default_if_missing(
        &self,
        id: ContentId,
    ) -> Result<Option<String>, AppError> {
        if self.language_of(id).await?.is_some() {
            return Ok(None);
        }
        let Some(default) = self.languages.default_language().await? else {
            return Ok(None);
        };

        self.set_language(id, &default.slug).await
    }
}
