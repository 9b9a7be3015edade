use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    classify::ServerErrorsFailureClass, cors::CorsLayer, limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::Span;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod blobs;
pub mod config;
pub mod credentials;
pub mod domain;
pub mod error;
pub mod file_reply;
mod handlers;
mod json_file;
pub mod registry;
pub mod service;
pub mod sessions;

use crate::blobs::DiskBlobs;
use crate::config::Config;
use crate::credentials::JsonCredentials;
use crate::error::Result;
use crate::registry::JsonRegistry;
use crate::service::FileHost;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use handlers::SESSION_COOKIE;

/// File host wired to the JSON file stores and the blob directory.
pub type Host = FileHost<JsonCredentials, JsonRegistry, DiskBlobs>;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::status,
        handlers::signup,
        handlers::login,
        handlers::logout,
        handlers::upload,
        handlers::files,
        handlers::delete_file,
        handlers::download,
    ),
    components(schemas(
        kernel::Credentials,
        kernel::UploadRecord,
        kernel::Reply,
        kernel::Uploaded,
        kernel::Status,
        handlers::UploadForm,
    )),
    tags(
        (name = "auth", description = "Sign-up, login and sessions"),
        (name = "files", description = "Upload, list, delete and read stored files")
    )
)]
struct ApiDoc;

pub async fn run(config: Config) -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "filebox=debug,server=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .unwrap_or_default();

    let host = open_host(&config).await?;
    tracing::info!("data directory: {}", config.data_dir.display());

    let socket = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(socket).await?;
    tracing::debug!("listening on {socket}");

    let app = create_routes(Arc::new(host), config.max_upload);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Opens (bootstrapping when missing) the stores under the data directory.
pub async fn open_host(config: &Config) -> Result<Host> {
    tokio::fs::create_dir_all(&config.data_dir).await?;
    let credentials = JsonCredentials::open(config.users_file()).await?;
    let registry = JsonRegistry::open(config.uploads_file()).await?;
    let blobs = DiskBlobs::open(config.uploads_dir()).await?;
    Ok(FileHost::new(credentials, registry, blobs))
}

pub fn create_routes(host: Arc<Host>, max_upload: usize) -> Router {
    Router::new()
        .route("/status", get(handlers::status))
        .route("/signup", post(handlers::signup))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/upload", post(handlers::upload))
        .route("/files", get(handlers::files))
        .route("/delete/:filename", delete(handlers::delete_file))
        .route("/uploads/:filename", get(handlers::download))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().on_failure(
                    |error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                        tracing::error!("Server error: {error}");
                    },
                ))
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(max_upload))
                .layer(CorsLayer::permissive())
                .into_inner(),
        )
        .with_state(host)
}

pub async fn shutdown_signal() {
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
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("signal received, starting graceful shutdown");
}
