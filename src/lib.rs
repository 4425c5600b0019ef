//! Translation Graph
//!
//! Translation group store and duplication service for multilingual content, served
//! over a REST API with SQLite persistence.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod host;
pub mod languages;
pub mod models;
pub mod sync;
pub mod translations;

use std::sync::Arc;

use axum::{
    extract::State,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use db::Repository;
use errors::AppError;
use host::{CommerceCatalog, ContentHost, SqliteContentHost};
use languages::LanguageRegistry;
use models::{RevisionInfo, SupportedType};
use sync::Duplicator;
use translations::{
    ContentLanguageTagger, ContentLifecycle, TranslationGroupStore, LANGUAGE_TAXONOMY,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub host: Arc<SqliteContentHost>,
    pub languages: LanguageRegistry,
    pub store: TranslationGroupStore,
    pub tagger: ContentLanguageTagger,
    pub lifecycle: ContentLifecycle,
    pub duplicator: Arc<Duplicator>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire every service over one database pool and register the host taxonomies.
    pub async fn build(pool: SqlitePool, config: Config) -> Result<Self, AppError> {
        let settings = config.store_settings();
        let repo = Arc::new(Repository::new(pool.clone()));

        let host = Arc::new(SqliteContentHost::new(pool));
        host.register_default_taxonomies().await?;
        for content_type in SupportedType::ALL {
            host.register_taxonomy(LANGUAGE_TAXONOMY, content_type.as_str())
                .await?;
        }
        let content_host: Arc<dyn ContentHost> = host.clone();
        let catalog: Arc<dyn CommerceCatalog> = host.clone();

        let languages = LanguageRegistry::new(repo.clone(), settings.max_write_retries);
        let store = TranslationGroupStore::new(repo.clone(), content_host.clone(), settings);
        let tagger = ContentLanguageTagger::new(content_host.clone(), languages.clone());
        let lifecycle = ContentLifecycle::new(content_host.clone(), store.clone(), tagger.clone());
        let duplicator = Arc::new(Duplicator::new(
            content_host,
            catalog,
            store.clone(),
            tagger.clone(),
            languages.clone(),
        ));

        Ok(Self {
            repo,
            host,
            languages,
            store,
            tagger,
            lifecycle,
            duplicator,
            config: Arc::new(config),
        })
    }
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();

    // API routes
    let api_routes = Router::new()
        .route("/revision", get(get_revision))
        // Languages
        .route("/languages", get(api::list_languages))
        .route("/languages", post(api::upsert_language))
        .route("/languages/default", put(api::set_default_language))
        .route("/languages/presets/{preset}", post(api::apply_language_preset))
        .route("/languages/{slug}", delete(api::delete_language))
        // Content
        .route("/content", post(api::create_content))
        .route("/content/{id}", get(api::get_content))
        .route("/content/{id}", delete(api::delete_content))
        .route("/content/{id}/trash", post(api::trash_content))
        .route("/content/{id}/language", put(api::set_content_language))
        // Translations
        .route("/content/{id}/translations", get(api::get_translations))
        .route("/content/{id}/translations", put(api::set_translations))
        .route(
            "/content/{id}/translations/{lang}",
            post(api::duplicate_content),
        )
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /api/revision - Current revision of the persisted records.
async fn get_revision(State(state): State<AppState>) -> api::ApiResult<RevisionInfo> {
    let result = state.repo.get_revision_info().await;
    api::respond(&state, result).await
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
