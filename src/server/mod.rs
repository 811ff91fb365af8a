use crate::config::Config;
use crate::convert::Converter;
use crate::storage::Store;
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

pub mod routes_api;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub store: Arc<Store>,
    pub converter: Arc<dyn Converter>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes_api::health,
        routes_api::upload,
        routes_api::bulk_upload,
        routes_api::download,
        routes_api::download_all,
    ),
    components(schemas(
        routes_api::HealthResponse,
        routes_api::UploadResponse,
        routes_api::BulkUploadResponse,
        routes_api::BulkResult,
        routes_api::BulkError,
        routes_api::DownloadAllRequest,
    ))
)]
struct ApiDoc;

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let max_upload_size = ctx.config.server.max_upload_size;

    let rapidoc: Router = RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi())
        .path("/docs")
        .into();

    let mut app = Router::new()
        .merge(routes_api::api_routes().with_state(ctx))
        .merge(rapidoc)
        .layer(DefaultBodyLimit::max(max_upload_size))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Serve the upload UI if a directory is provided
    if let Some(dir) = static_dir {
        if dir.exists() {
            tracing::info!("Serving static files from {:?}", dir);
            app = app.fallback_service(ServeDir::new(&dir).append_index_html_on_directories(true));
        }
    }

    app
}

/// Start the HTTP server
pub async fn start_server(config: Config, converter: Arc<dyn Converter>) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let store = Store::new(
        config.storage.upload_dir.clone(),
        config.storage.converted_dir.clone(),
    );
    store.ensure_dirs().context("Failed to create storage directories")?;

    // Anything in the upload area is residue from a crashed run.
    match store.sweep_uploads() {
        Ok(0) => {}
        Ok(n) => tracing::info!("Swept {} leftover uploads from previous session", n),
        Err(e) => tracing::warn!("Failed to sweep upload area: {}", e),
    }

    let static_dir = config.server.static_dir.clone();
    let ctx = AppContext {
        config: Arc::new(config),
        store: Arc::new(store),
        converter,
    };

    let app = create_router(ctx, static_dir);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
}
