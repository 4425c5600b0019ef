//! Translation Graph server.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use translation_graph::config::Config;
use translation_graph::{create_router, db, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Translation Graph");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!(
        "Strict content types: {}, write retries: {}",
        config.strict_content_types,
        config.max_write_retries
    );

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (TGRAPH_API_PSK). Authentication is disabled!");
    }

    // Initialize database and services
    let pool = db::init_database(&config.db_path).await?;
    let state = AppState::build(pool, config.clone()).await?;

    match state.languages.ensure_default().await? {
        Some(language) => tracing::info!("Default language: {}", language.slug),
        None => tracing::warn!("No languages registered yet; new content stays untagged"),
    }

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
