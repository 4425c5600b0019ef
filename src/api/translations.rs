//! Translation group endpoints and the duplication trigger.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{content_id, respond, ApiResult};
use crate::errors::AppError;
use crate::host::ContentHost;
use crate::models::{ContentId, DuplicateRequest, SetTranslationsRequest, TranslationsView};
use crate::sync::DuplicateOutcome;
use crate::AppState;

async fn translations_view(state: &AppState, id: ContentId) -> Result<TranslationsView, AppError> {
    let graph = state.store.snapshot().await?;
    Ok(TranslationsView {
        content_id: id,
        group_id: graph.group_id_for(id).cloned(),
        translations: graph.translations_of(id),
    })
}

async fn fetch_translations(state: &AppState, raw: i64) -> Result<TranslationsView, AppError> {
    translations_view(state, content_id(raw)?).await
}

/// GET /api/content/:id/translations - Translation group of a content object.
pub async fn get_translations(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<TranslationsView> {
    let result = fetch_translations(&state, id).await;
    respond(&state, result).await
}

async fn replace_translations(
    state: &AppState,
    raw: i64,
    request: SetTranslationsRequest,
) -> Result<TranslationsView, AppError> {
    let id = content_id(raw)?;
    let Some(object) = state.host.fetch(id).await? else {
        return Err(AppError::NotFound(format!("Content {} not found", id)));
    };

    let linked = state
        .store
        .set_all(id, &request.translations, &object.content_type)
        .await?;
    if linked.is_none() {
        return Err(AppError::Validation(format!(
            "Content {} cannot join a group of another content type",
            id
        )));
    }

    translations_view(state, id).await
}

/// PUT /api/content/:id/translations - Replace the whole translation map.
pub async fn set_translations(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<SetTranslationsRequest>,
) -> ApiResult<TranslationsView> {
    let result = replace_translations(&state, id, request).await;
    respond(&state, result).await
}

/// POST /api/content/:id/translations/:lang - Create (or find) the translation of a
/// content object in another language.
///
/// The acting user comes from the request body and is not verified here: any holder of
/// the API key may act as any user, administrators included. Callers are trusted to
/// forward the identity they authenticated themselves.
pub async fn duplicate_content(
    State(state): State<AppState>,
    Path((id, lang)): Path<(i64, String)>,
    Json(request): Json<DuplicateRequest>,
) -> ApiResult<DuplicateOutcome> {
    let result = state.duplicator.duplicate(id, &lang, &request.actor).await;
    respond(&state, result).await
}
