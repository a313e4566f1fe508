use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::response::{ApiError, AppJson, AppQuery, JSend, JSendPaginated, Pagination};
use crate::service::naming::is_valid_folder;
use crate::service::{FileError, RelocateRequest, UploadRequest};
use crate::storage::FileRecord;
use crate::AppState;

/// Header consulted for the target folder when the form carries none
pub const UPLOAD_FOLDER_HEADER: &str = "x-upload-folder";

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct FileResponse {
    pub created_at: String,
    pub description: Option<String>,
    pub filename: String,
    pub folder: String,
    pub id: String,
    pub mimetype: String,
    pub original_name: String,
    pub size: u64,
    pub storage_key: String,
    pub url: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateFileRequest {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub folder: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListFilesParams {
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    #[serde(default)]
    pub folder: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeletedFile {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct DeletedFolder {
    pub count: usize,
    pub folder: String,
}

#[derive(Debug, Serialize)]
pub struct DeletedAll {
    pub count: usize,
}

fn default_limit() -> u32 {
    100
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn create_file(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    AppQuery(params): AppQuery<UploadParams>,
    mut multipart: Multipart,
) -> Result<Json<JSend<FileResponse>>, ApiError> {
    let max_upload_size = state.config.upload.max_upload_size;
    let mut request = UploadRequest::default();
    let mut file_name: Option<String> = None;
    let mut file_content_type: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_failure(e, max_upload_size))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                file_name = field.file_name().map(|s| s.to_string());
                file_content_type = field.content_type().map(|s| s.to_string());

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_failure(e, max_upload_size))?;
                request.data = Some(data);
            }
            "folder" => {
                request.folder = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("Invalid folder: {e}")))?,
                );
            }
            "description" => {
                request.description = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("Invalid description: {e}")))?,
                );
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    // Folder from the form, then the header, then the query string
    request.folder = request
        .folder
        .or_else(|| {
            headers
                .get(UPLOAD_FOLDER_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        })
        .or(params.folder);

    // MIME type: from multipart Content-Type, or guess from filename, or fallback
    request.mimetype = file_content_type
        .filter(|ct| ct != "application/octet-stream")
        .or_else(|| {
            file_name
                .as_deref()
                .and_then(|n| mime_guess::from_path(n).first())
                .map(|m| m.to_string())
        })
        .unwrap_or_else(|| "application/octet-stream".to_string());
    request.original_name = file_name.unwrap_or_default();

    let file = state.files.uploads.upload(request).await?;

    Ok(JSend::success_with(file_to_response(&file), "Upload succeeded"))
}

pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<FileResponse>>, ApiError> {
    let file = state.files.get_by_id(&id)?;
    Ok(JSend::success(file_to_response(&file)))
}

pub async fn list_files(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<ListFilesParams>,
) -> Result<Json<JSendPaginated<FileResponse>>, ApiError> {
    if params.limit == 0 {
        return Err(ApiError::bad_request("limit must be greater than 0"));
    }

    let files = match params.folder.as_deref() {
        Some(folder) => state.files.get_by_folder(folder),
        None => state.files.list(),
    };

    let total = files.len() as u64;
    let items: Vec<FileResponse> = files
        .iter()
        .skip(params.offset as usize)
        .take(params.limit as usize)
        .map(file_to_response)
        .collect();

    Ok(JSendPaginated::success(
        items,
        Pagination {
            limit: params.limit,
            offset: params.offset,
            total,
        },
    ))
}

pub async fn list_folder(
    State(state): State<Arc<AppState>>,
    Path(folder): Path<String>,
) -> Json<JSend<Vec<FileResponse>>> {
    let files = state.files.get_by_folder(&folder);
    JSend::success(files.iter().map(file_to_response).collect())
}

pub async fn update_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdateFileRequest>,
) -> Result<Json<JSend<FileResponse>>, ApiError> {
    if req.description.is_none() && req.folder.is_none() {
        return Err(ApiError::bad_request(
            "at least one field (description, folder) must be provided",
        ));
    }

    if let Some(ref folder) = req.folder {
        if !is_valid_folder(folder) {
            return Err(ApiError::bad_request(
                "folder must only contain letters, digits, '_' or '-'",
            ));
        }
    }

    let file = state
        .files
        .relocation
        .relocate(
            &id,
            RelocateRequest {
                folder: req.folder,
                description: req.description,
            },
        )
        .await?;

    Ok(JSend::success_with(file_to_response(&file), "File updated"))
}

pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<DeletedFile>>, ApiError> {
    let file = state.files.relocation.delete_by_id(&id).await?;
    Ok(JSend::success_with(
        DeletedFile { id: file.id },
        "Delete succeeded",
    ))
}

pub async fn delete_folder(
    State(state): State<Arc<AppState>>,
    Path(folder): Path<String>,
) -> Result<Json<JSend<DeletedFolder>>, ApiError> {
    let removal = state.files.relocation.delete_by_folder(&folder).await?;
    Ok(JSend::success_with(
        DeletedFolder {
            count: removal.files.len(),
            folder: removal.folder,
        },
        "Folder deleted",
    ))
}

pub async fn delete_all_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<DeletedAll>>, ApiError> {
    let files = state.files.relocation.delete_all().await?;
    tracing::warn!(count = files.len(), "Deleted all files");
    Ok(JSend::success_with(
        DeletedAll { count: files.len() },
        "All files deleted",
    ))
}

// ============================================================================
// Helpers
// ============================================================================

/// Bodies cut off at the router limit read as an oversized upload
fn multipart_failure(e: MultipartError, max_upload_size: u64) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return FileError::too_large(max_upload_size).into();
    }
    ApiError::bad_request(format!("Invalid multipart data: {}", e.body_text()))
}

fn file_to_response(file: &FileRecord) -> FileResponse {
    FileResponse {
        created_at: file.created_at.to_rfc3339(),
        description: file.description.clone(),
        filename: file.filename.clone(),
        folder: file.folder.clone(),
        id: file.id.clone(),
        mimetype: file.mimetype.clone(),
        original_name: file.original_name.clone(),
        size: file.size,
        storage_key: file.storage_key.clone(),
        url: file.url.clone(),
    }
}
