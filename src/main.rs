//! PinShot Backend
//!
//! REST backend for the PinShot image annotation tool: projects of annotated
//! screenshots, share links with expiration, and a standalone image+comment
//! sharing flow backed by SQLite and local object storage.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod placement;
mod share;
mod store;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;
use store::ObjectStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub store: Arc<ObjectStore>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting PinShot Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Storage path: {:?}", config.storage_path);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!("Public origin: {}", config.public_origin);

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (PINSHOT_API_PSK). Editor API authentication is disabled!");
    }
    if config.enable_legacy_links {
        tracing::warn!("Legacy self-contained share links are enabled");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Initialize object storage
    let store = Arc::new(ObjectStore::new(config.storage_path.clone()));
    store.init().await?;

    // Create application state
    let state = AppState {
        repo,
        store,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
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

    // Editor API routes, behind the PSK layer
    let api_routes = Router::new()
        // Projects
        .route("/projects", get(api::list_projects))
        .route("/projects", post(api::create_project))
        .route("/projects/active", get(api::get_active_project))
        .route("/projects/{id}", get(api::get_project))
        .route("/projects/{id}", delete(api::delete_project))
        .route("/projects/{id}/activate", post(api::activate_project))
        // Pinshots and pins
        .route("/projects/{id}/pinshots", post(api::create_pinshot))
        .route(
            "/projects/{id}/pinshots/{pinshot_id}/pins",
            post(api::place_pin),
        )
        .route(
            "/projects/{id}/pinshots/{pinshot_id}/pins/{pin_id}/status",
            put(api::update_pin_status),
        )
        // Share links
        .route("/projects/{id}/share-links", post(api::create_share_link))
        .route("/projects/{id}/share-links", get(api::list_share_links))
        .route("/legacy-links", post(api::register_legacy_link))
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Public routes: read-only views and the image sharing flow
    let public_routes = Router::new()
        .route("/view/legacy", get(api::view_legacy_project))
        .route("/view/{short_id}", get(api::view_shared_project))
        .route("/images", post(api::upload_image))
        .route("/images/{short_id}", get(api::get_image))
        .route("/images/{short_id}/comments", post(api::create_image_comment))
        .route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(public_routes)
        .nest_service("/files", ServeDir::new(state.config.storage_path.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.config.request_timeout))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
