use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use file_depot::{
    api,
    config::{Config, StorageBackend},
    object_store as obj,
    service::FileService,
    storage::MetadataStore,
    AppState,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    match log_format.to_lowercase().as_str() {
        "gcp" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_stackdriver::layer())
                .init();
        }
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_list(false),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    info!(version = env!("CARGO_PKG_VERSION"), "file-depot starting");

    let config = Config::load()?;

    // Metadata index lives under the storage root for every backend
    let store = Arc::new(MetadataStore::open(&config.storage.root)?);
    info!(
        "Metadata index at: {}",
        store.index_path().display()
    );

    let objects: Arc<dyn obj::ObjectStore> = match config.storage.backend {
        StorageBackend::Local => {
            let store = obj::LocalStore::new(&config.storage.root, &config.storage.public_path)?;
            info!("Using local storage backend at: {}", config.storage.root);
            Arc::new(store)
        }
        StorageBackend::Blob => {
            let store = obj::BlobStore::new(
                &config.storage.blob_api_url,
                config.storage.blob_public_url.as_deref(),
                config.storage.blob_token.as_deref(),
            )?;
            info!(
                "Using blob storage backend, api: {}",
                config.storage.blob_api_url
            );
            Arc::new(store)
        }
    };

    let files = FileService::new(store, objects, config.upload.clone());
    let state = Arc::new(AppState {
        config: config.clone(),
        files,
    });

    // Build and start the HTTP server
    let app = api::create_router(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Listening on: {}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
