//! Content endpoints of the reference host.
//!
//! Saves, trashes and deletions go through the lifecycle hooks so language tags and
//! translation groups follow host-side changes.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{content_id, respond, ApiResult};
use crate::errors::AppError;
use crate::host::ContentHost;
use crate::models::{
    ContentObject, ContentStatus, ContentView, CreateContentRequest, NewContent,
    SetLanguageRequest,
};
use crate::AppState;

async fn content_view(state: &AppState, object: ContentObject) -> Result<ContentView, AppError> {
    let language = state.tagger.language_of(object.id).await?;
    Ok(ContentView { object, language })
}

async fn require_language(state: &AppState, slug: &str) -> Result<(), AppError> {
    if state.languages.contains(slug).await? {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Language {} is not registered",
            slug.trim()
        )))
    }
}

async fn create(state: &AppState, request: CreateContentRequest) -> Result<ContentView, AppError> {
    let content_type = request.content_type.trim().to_string();
    if content_type.is_empty() {
        return Err(AppError::Validation("Content type is required".to_string()));
    }
    if let Some(language) = &request.language {
        require_language(state, language).await?;
    }

    let id = state
        .host
        .create(&NewContent {
            content_type: content_type.clone(),
            status: request.status.unwrap_or(ContentStatus::Draft),
            title: request.title,
            body: request.body,
            excerpt: request.excerpt,
            parent_id: request.parent_id,
            menu_order: request.menu_order,
            author_id: request.author_id,
        })
        .await?;

    for (taxonomy, slugs) in &request.terms {
        state
            .host
            .assign_terms(id, &content_type, taxonomy, slugs)
            .await?;
    }
    for (key, values) in &request.meta {
        for value in values {
            state.host.add_metadata(id, key, value).await?;
        }
    }
    if let Some(asset_id) = request.featured_asset_id.filter(|a| *a > 0) {
        state.host.set_featured_asset(id, asset_id).await?;
    }

    match &request.language {
        Some(language) => {
            state.tagger.set_language(id, language).await?;
        }
        None => {
            state.lifecycle.on_saved(id).await?;
        }
    }

    let object = state
        .host
        .fetch(id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Content {} vanished after create", id)))?;
    content_view(state, object).await
}

/// POST /api/content - Create a content object.
pub async fn create_content(
    State(state): State<AppState>,
    Json(request): Json<CreateContentRequest>,
) -> ApiResult<ContentView> {
    let result = create(&state, request).await;
    respond(&state, result).await
}

async fn fetch(state: &AppState, raw: i64) -> Result<ContentView, AppError> {
    let id = content_id(raw)?;
    match state.host.fetch(id).await? {
        Some(object) => content_view(state, object).await,
        None => Err(AppError::NotFound(format!("Content {} not found", id))),
    }
}

/// GET /api/content/:id - Get a content object with its language.
pub async fn get_content(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<ContentView> {
    let result = fetch(&state, id).await;
    respond(&state, result).await
}

async fn delete(state: &AppState, raw: i64) -> Result<(), AppError> {
    let id = content_id(raw)?;
    if !state.host.delete(id).await? {
        return Err(AppError::NotFound(format!("Content {} not found", id)));
    }
    state.lifecycle.on_deleted(id).await?;
    Ok(())
}

/// DELETE /api/content/:id - Delete a content object.
pub async fn delete_content(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    let result = delete(&state, id).await;
    respond(&state, result).await
}

async fn trash(state: &AppState, raw: i64) -> Result<ContentView, AppError> {
    let id = content_id(raw)?;
    if !state.host.trash(id).await? {
        return Err(AppError::NotFound(format!("Content {} not found", id)));
    }
    state.lifecycle.on_trashed(id).await?;
    fetch(state, raw).await
}

/// POST /api/content/:id/trash - Move a content object to the trash.
pub async fn trash_content(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<ContentView> {
    let result = trash(&state, id).await;
    respond(&state, result).await
}

async fn set_language(
    state: &AppState,
    raw: i64,
    request: SetLanguageRequest,
) -> Result<ContentView, AppError> {
    let id = content_id(raw)?;
    require_language(state, &request.language).await?;
    if state.tagger.set_language(id, &request.language).await?.is_none() {
        return Err(AppError::NotFound(format!("Content {} not found", id)));
    }
    fetch(state, raw).await
}

/// PUT /api/content/:id/language - Set the language tag of a content object.
pub async fn set_content_language(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<SetLanguageRequest>,
) -> ApiResult<ContentView> {
    let result = set_language(&state, id, request).await;
    respond(&state, result).await
}
