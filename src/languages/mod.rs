//! Language registry.
//!
//! Registered languages and the default language live in two records of the options
//! table. The translation core only consults the registry to check that a slug exists
//! and to resolve the default language.

mod presets;

pub use presets::Preset;

use std::sync::Arc;

use crate::db::{records, Repository};
use crate::errors::AppError;
use crate::models::{Language, LanguagesRecord};

#[derive(Clone)]
pub struct LanguageRegistry {
    repo: Arc<Repository>,
    max_retries: u32,
}

impl LanguageRegistry {
    pub fn new(repo: Arc<Repository>, max_retries: u32) -> Self {
        Self { repo, max_retries }
    }

    /// Registered languages in registration order. Invalid entries are skipped.
    pub async fn languages(&self) -> Result<Vec<Language>, AppError> {
        let record = self
            .repo
            .read_record::<LanguagesRecord>(records::LANGUAGES)
            .await?;
        Ok(record.value.languages)
    }

    pub async fn get(&self, slug: &str) -> Result<Option<Language>, AppError> {
        let slug = slug.trim().to_lowercase();
        let record = self
            .repo
            .read_record::<LanguagesRecord>(records::LANGUAGES)
            .await?;
        Ok(record.value.get(&slug).cloned())
    }

    pub async fn contains(&self, slug: &str) -> Result<bool, AppError> {
        Ok(self.get(slug).await?.is_some())
    }

    /// The configured default language; `None` when unset or no longer registered.
    pub async fn default_language(&self) -> Result<Option<Language>, AppError> {
        let slug = self.default_slug().await?;
        if slug.is_empty() {
            return Ok(None);
        }
        self.get(&slug).await
    }

    async fn default_slug(&self) -> Result<String, AppError> {
        Ok(self
            .repo
            .read_record::<String>(records::DEFAULT_LANGUAGE)
            .await?
            .value)
    }

    /// Add a language or replace the one with the same slug.
    pub async fn upsert(&self, language: Language) -> Result<Language, AppError> {
        let stored = language.clone();
        self.repo
            .update_record::<LanguagesRecord, _, _>(records::LANGUAGES, self.max_retries, |record| {
                record.upsert(language.clone());
                Ok(())
            })
            .await?;

        tracing::info!("Saved language {}", stored.slug);
        Ok(stored)
    }

    /// Remove a language. The default language cannot be deleted.
    /// Returns false when the slug was not registered.
    pub async fn delete(&self, slug: &str) -> Result<bool, AppError> {
        let slug = slug.trim().to_lowercase();
        if slug == self.default_slug().await? {
            return Err(AppError::Validation(
                "Default language cannot be deleted".to_string(),
            ));
        }

        let removed = self
            .repo
            .update_record::<LanguagesRecord, _, _>(records::LANGUAGES, self.max_retries, |record| {
                Ok(record.remove(&slug))
            })
            .await?;

        if removed {
            tracing::info!("Deleted language {}", slug);
        }
        Ok(removed)
    }

    /// Make a registered language the default.
    pub async fn set_default(&self, slug: &str) -> Result<Language, AppError> {
        let Some(language) = self.get(slug).await? else {
            return Err(AppError::Validation(format!(
                "Select a valid default language: {} is not registered",
                slug.trim()
            )));
        };

        let chosen = language.slug.clone();
        self.repo
            .update_record::<String, _, _>(records::DEFAULT_LANGUAGE, self.max_retries, |current| {
                *current = chosen.clone();
                Ok(())
            })
            .await?;

        tracing::info!("Default language set to {}", language.slug);
        Ok(language)
    }

    /// Pick the first registered language as default when none is set.
    pub async fn ensure_default(&self) -> Result<Option<Language>, AppError> {
        if let Some(existing) = self.default_language().await? {
            return Ok(Some(existing));
        }

        match self.languages().await?.into_iter().next() {
            Some(first) => self.set_default(&first.slug).await.map(Some),
            None => Ok(None),
        }
    }

    /// Register every language of a preset, then make sure a default exists.
    pub async fn apply_preset(&self, preset: Preset) -> Result<Vec<Language>, AppError> {
        let languages = preset.languages();
        self.repo
            .update_record::<LanguagesRecord, _, _>(records::LANGUAGES, self.max_retries, |record| {
                for language in &languages {
                    record.upsert(language.clone());
                }
                Ok(())
            })
            .await?;
        self.ensure_default().await?;

        tracing::info!("Applied language preset {} ({} languages)", preset, languages.len());
        self.languages().await
    }
}
