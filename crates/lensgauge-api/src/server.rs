//! API server implementation

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use lensgauge_core::storage::UPLOADS_URL_PREFIX;
use lensgauge_core::{AnnotationStyle, GaugeConfig, UploadStore};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::routes::{health, upload};

/// Shared, read-only request state.
#[derive(Clone)]
pub struct AppState {
    /// Effective configuration.
    pub config: Arc<GaugeConfig>,
    /// Overlay style, with the font loaded once at startup.
    pub style: Arc<AnnotationStyle>,
    /// Upload slot allocator.
    pub store: UploadStore,
}

impl AppState {
    /// Build state from a validated configuration.
    ///
    /// Loads the annotation font named in the config, or probes system fonts.
    pub fn new(config: GaugeConfig) -> Result<Self> {
        let style = AnnotationStyle::from_font_setting(config.annotation.font.as_deref())?;
        Ok(Self::with_style(config, style))
    }

    /// Build state with an explicit overlay style.
    pub fn with_style(config: GaugeConfig, style: AnnotationStyle) -> Self {
        let store = UploadStore::new(config.storage.upload_dir.clone());
        Self {
            config: Arc::new(config),
            style: Arc::new(style),
            store,
        }
    }
}

/// Assemble the application router.
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.server.max_upload_bytes;
    let uploads = ServeDir::new(state.store.root());

    Router::new()
        .route("/", get(upload::index).post(upload::submit))
        .route("/health", get(health::health))
        .nest_service(UPLOADS_URL_PREFIX, uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Lensgauge HTTP server
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: GaugeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state: AppState::new(config)?,
        })
    }

    /// Address the server will bind.
    pub fn addr(&self) -> String {
        let server = &self.state.config.server;
        format!("{}:{}", server.host, server.port)
    }

    /// Bind and serve until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        let addr = self.addr();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let local: SocketAddr = listener.local_addr()?;
        tracing::info!(
            addr = %local,
            upload_dir = %self.state.store.root().display(),
            camera_matrix = %self.state.config.calibration.camera_matrix.display(),
            "Lensgauge listening"
        );

        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        tracing::info!("Lensgauge stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
