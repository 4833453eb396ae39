//! Document Handlers

use axum::{
    Json,
    extract::{
        Multipart, Path, State,
        multipart::MultipartRejection,
        rejection::PathRejection,
    },
    http::StatusCode,
};

use crate::{
    api::{error::ApiError, state::AppState},
    application::UploadedFile,
    domain::{CompanyDocument, CompanyId, DocumentId},
};

pub async fn list_documents(
    State(state): State<AppState>,
    path: Result<Path<CompanyId>, PathRejection>,
) -> Result<Json<Vec<CompanyDocument>>, ApiError> {
    let Path(company_id) = path?;
    Ok(Json(state.documents().list(company_id).await?))
}

pub async fn get_document(
    State(state): State<AppState>,
    path: Result<Path<(CompanyId, DocumentId)>, PathRejection>,
) -> Result<Json<CompanyDocument>, ApiError> {
    let Path((company_id, document_id)) = path?;
    Ok(Json(state.documents().get(company_id, document_id).await?))
}

/// Multipart upload: a `file` part carrying a filename, and an optional
/// `uploaded_by` text part. Other parts are ignored.
pub async fn upload_document(
    State(state): State<AppState>,
    path: Result<Path<CompanyId>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<CompanyDocument>), ApiError> {
    let Path(company_id) = path?;
    let mut multipart = multipart?;

    let mut file = None;
    let mut uploaded_by = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                file = Some(UploadedFile {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
            Some("uploaded_by") => uploaded_by = Some(field.text().await?),
            _ => {}
        }
    }

    let document = state
        .documents()
        .upload(company_id, file, uploaded_by)
        .await?;
    Ok((StatusCode::CREATED, Json(document)))
}

pub async fn delete_document(
    State(state): State<AppState>,
    path: Result<Path<(CompanyId, DocumentId)>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path((company_id, document_id)) = path?;
    state.documents().delete(company_id, document_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
