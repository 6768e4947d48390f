//! Document archive handlers

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use md_documents::{DocumentFilter, UploadParams};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extractors::AppState;
use crate::handlers::colors::SuccessResponse;

/// GET /documents
pub async fn list_documents(
    State(state): State<AppState>,
    Query(query): Query<DocumentQuery>,
) -> ApiResult<impl IntoResponse> {
    let filter = DocumentFilter {
        job_id: query.job_id,
        doc_type: query.doc_type,
    };
    Ok(Json(state.documents.list(&filter).await?))
}

/// GET /documents/:id
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.documents.get(&id).await?))
}

/// GET /documents/job/:job_id
pub async fn job_documents(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.documents.job_documents(&job_id).await?))
}

/// POST /documents/upload
///
/// Multipart fields: `file`, `jobId`, `docType`, optional `description`.
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let mut params = UploadParams::default();
    let mut data: Option<Bytes> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                params.original_name = field.file_name().unwrap_or_default().to_string();
                params.content_type = field.content_type().map(str::to_string);
                data = Some(field.bytes().await.map_err(multipart_error)?);
            }
            "jobId" => params.job_id = field.text().await.map_err(multipart_error)?,
            "docType" => params.doc_type = field.text().await.map_err(multipart_error)?,
            "description" => {
                params.description = Some(field.text().await.map_err(multipart_error)?)
            }
            _ => {}
        }
    }

    let data = data.ok_or_else(|| ApiError::bad_request("file is required"))?;
    let document = state.documents.upload(params, data).await?;
    Ok((StatusCode::CREATED, Json(document)))
}

/// GET /documents/:id/download
pub async fn download_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let download = state.documents.download(&id).await?;
    let headers = [
        (header::CONTENT_TYPE, download.content_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            content_disposition(download.filename()),
        ),
    ];
    Ok((headers, download.data))
}

/// DELETE /documents/:id
pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let removed = state.documents.delete(&id).await?;
    Ok(Json(SuccessResponse::with_id(removed.id)))
}

fn multipart_error(err: MultipartError) -> ApiError {
    ApiError::bad_request(err.body_text())
}

/// `attachment` disposition with an ASCII fallback name and the UTF-8 name
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let encoded = url::form_urlencoded::byte_serialize(filename.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
        .replace('*', "%2A");
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct DocumentQuery {
    pub job_id: Option<String>,
    pub doc_type: Option<String>,
}
