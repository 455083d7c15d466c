//! goty-rs server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{Router, middleware};
use goty_api::{middleware::AppState, router as api_router};
use goty_common::{
    Config, InMemoryPageCache, LocalStorage, PageCache, StorageBackend, UploadPolicy,
};
use goty_core::{
    CategoryService, GameService, NominationService, RevalidationService, UploadService,
    UserService, VoteService,
};
use goty_db::repositories::{
    CategoryRepository, GameRepository, NominationRepository, UserRepository, VoteRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// Wire repositories and services into the shared application state.
fn build_state(config: &Config, db: Arc<sea_orm::DatabaseConnection>) -> AppState {
    let user_repo = UserRepository::new(Arc::clone(&db));
    let category_repo = CategoryRepository::new(Arc::clone(&db));
    let game_repo = GameRepository::new(Arc::clone(&db));
    let nomination_repo = NominationRepository::new(Arc::clone(&db));
    let vote_repo = VoteRepository::new(db);

    let page_cache: Arc<dyn PageCache> = Arc::new(InMemoryPageCache::default());
    let storage: Arc<dyn StorageBackend> = Arc::new(LocalStorage::new(
        config.upload.dir.clone(),
        config.upload.base_url.clone(),
    ));

    AppState {
        user_service: UserService::new(user_repo),
        category_service: CategoryService::new(category_repo.clone(), Arc::clone(&page_cache)),
        nomination_service: NominationService::new(
            category_repo.clone(),
            game_repo.clone(),
            nomination_repo.clone(),
            Arc::clone(&page_cache),
            &config.voting,
        ),
        vote_service: VoteService::new(
            category_repo,
            game_repo.clone(),
            nomination_repo,
            vote_repo,
        ),
        game_service: GameService::new(game_repo, &config.voting),
        upload_service: UploadService::new(
            storage,
            UploadPolicy::images(config.upload.max_size_bytes),
        ),
        revalidation_service: RevalidationService::new(
            config.revalidation.secret.clone(),
            Arc::clone(&page_cache),
        ),
        page_cache,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "goty=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting goty-rs server...");

    // Load configuration
    let config = Config::load()?;
    if config.revalidation.secret.is_empty() {
        warn!("revalidation.secret is empty; revalidation requests will be rejected");
    }

    // Connect to database
    let db = goty_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    goty_db::migrate(&db).await?;
    info!("Migrations completed");

    tokio::fs::create_dir_all(&config.upload.dir)
        .await
        .with_context(|| format!("creating upload dir {}", config.upload.dir.display()))?;

    let state = build_state(&config, Arc::new(db));

    // Build router
    let app = Router::new()
        .nest("/api", api_router(&state))
        .nest_service("/uploads", ServeDir::new(&config.upload.dir))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            goty_api::middleware::page_cache_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            goty_api::middleware::auth_middleware,
        ))
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server.host / server.port")?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
