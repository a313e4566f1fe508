use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::api::response::ApiError;
use crate::object_store::ObjectStoreError;
use crate::AppState;

/// Serve a stored payload by its public address.
/// Route: GET <public_path>/:folder/:filename
///
/// The address is resolved through the index, so only registered payloads are reachable.
pub async fn serve_payload(
    State(state): State<Arc<AppState>>,
    Path((folder, filename)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let file = state
        .files
        .store
        .find_by_location(&folder, &filename)
        .ok_or_else(|| ApiError::not_found("File not found"))?;

    let data = state
        .files
        .objects
        .get(&file.storage_key)
        .await
        .map_err(|e| match e {
            ObjectStoreError::NotFound(_) => ApiError::not_found("File content not found"),
            _ => ApiError::internal(format!("Failed to retrieve file: {e}")),
        })?;

    let mut response = (StatusCode::OK, data).into_response();
    let headers = response.headers_mut();

    headers.insert(
        header::CONTENT_TYPE,
        file.mimetype
            .parse()
            .unwrap_or(header::HeaderValue::from_static("application/octet-stream")),
    );

    if let Ok(value) = format!("inline; filename=\"{}\"", file.filename).parse() {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    // Filenames are unique per upload, but a relocation changes the address
    headers.insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("public, max-age=3600"),
    );

    Ok(response)
}
