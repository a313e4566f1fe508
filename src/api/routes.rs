use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::config::StorageBackend;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.upload_body_limit();

    let mut router = Router::new()
        // Files
        .route("/files", get(handlers::list_files))
        .route(
            "/files",
            post(handlers::create_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/files", delete(handlers::delete_all_files))
        .route("/files/folder/:folder", get(handlers::list_folder))
        .route("/files/folder/:folder", delete(handlers::delete_folder))
        .route("/files/id/:id", get(handlers::get_file))
        .route("/files/id/:id", patch(handlers::update_file))
        .route("/files/id/:id", delete(handlers::delete_file))
        .route("/files/:id", get(handlers::get_file))
        .route("/files/:id", patch(handlers::update_file))
        .route("/files/:id", delete(handlers::delete_file))
        // Internal
        .route("/_internal/health", get(handlers::health));

    // Local payloads are served by us; blob URLs point at the blob store
    if state.config.storage.backend == StorageBackend::Local {
        let public_route = format!("{}/:folder/:filename", state.config.storage.public_path);
        router = router.route(&public_route, get(handlers::serve_payload));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
