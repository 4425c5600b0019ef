//! Language registry endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{respond, ApiResult};
use crate::errors::AppError;
use crate::languages::Preset;
use crate::models::{Language, LanguageInput, LanguagesView, SetDefaultLanguageRequest};
use crate::AppState;

async fn languages_view(state: &AppState) -> Result<LanguagesView, AppError> {
    let languages = state.languages.languages().await?;
    let default_language = state.languages.default_language().await?.map(|l| l.slug);
    Ok(LanguagesView {
        languages,
        default_language,
    })
}

/// GET /api/languages - List registered languages.
pub async fn list_languages(State(state): State<AppState>) -> ApiResult<LanguagesView> {
    let result = languages_view(&state).await;
    respond(&state, result).await
}

/// POST /api/languages - Add or replace a language.
pub async fn upsert_language(
    State(state): State<AppState>,
    Json(input): Json<LanguageInput>,
) -> ApiResult<Language> {
    let result = match Language::from_input(input) {
        Some(language) => state.languages.upsert(language).await,
        None => Err(AppError::Validation(
            "Invalid language data: slug must be 2-10 letters or dashes".to_string(),
        )),
    };
    respond(&state, result).await
}

/// DELETE /api/languages/:slug - Remove a language.
pub async fn delete_language(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<()> {
    let result = match state.languages.delete(&slug).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(AppError::NotFound(format!("Language {} not found", slug))),
        Err(e) => Err(e),
    };
    respond(&state, result).await
}

/// PUT /api/languages/default - Choose the default language.
pub async fn set_default_language(
    State(state): State<AppState>,
    Json(request): Json<SetDefaultLanguageRequest>,
) -> ApiResult<Language> {
    let result = state.languages.set_default(&request.slug).await;
    respond(&state, result).await
}

/// POST /api/languages/presets/:preset - Register a built-in language set.
pub async fn apply_language_preset(
    State(state): State<AppState>,
    Path(preset): Path<String>,
) -> ApiResult<Vec<Language>> {
    let result = match Preset::parse(&preset) {
        Some(preset) => state.languages.apply_preset(preset).await,
        None => Err(AppError::NotFound(format!("Unknown preset {}", preset))),
    };
    respond(&state, result).await
}
