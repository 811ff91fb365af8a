use crate::archive::{self, ArchiveEntry};
use crate::error::{AppError, Error, Result};
use crate::probe;
use crate::server::AppContext;
use crate::storage;
use axum::{
    body::{Body, Bytes},
    extract::{Multipart, Path, State},
    http::header,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;
use utoipa::ToSchema;

pub fn api_routes() -> Router<AppContext> {
    Router::new()
        .route("/health", get(health))
        .route("/upload", post(upload))
        .route("/bulk-upload", post(bulk_upload))
        .route("/download/{filename}", get(download))
        .route("/download-all", post(download_all))
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// "healthy" when the conversion tool is installed, "degraded" otherwise.
    pub status: String,
    pub available: bool,
    pub message: String,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service health", body = HealthResponse))
)]
pub async fn health() -> std::result::Result<Json<HealthResponse>, AppError> {
    // Probing runs a --version subprocess; keep it off the async workers.
    let tool = tokio::task::spawn_blocking(probe::converter_status)
        .await
        .map_err(|e| Error::Internal(format!("probe task failed: {e}")))?;

    let message = if tool.available {
        "Ready to convert".to_string()
    } else {
        "LibreOffice not found on PATH; conversions will fail".to_string()
    };

    Ok(Json(HealthResponse {
        status: if tool.available { "healthy" } else { "degraded" }.to_string(),
        available: tool.available,
        message,
    }))
}

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub download_url: String,
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "convert",
    request_body(content = String, content_type = "multipart/form-data",
        description = "Single multipart field named 'file'"),
    responses(
        (status = 200, description = "Document converted", body = UploadResponse),
        (status = 400, description = "Missing file or disallowed extension"),
        (status = 502, description = "Conversion tool failed"),
        (status = 504, description = "Conversion timed out")
    )
)]
pub async fn upload(
    State(ctx): State<AppContext>,
    multipart: Multipart,
) -> std::result::Result<Json<UploadResponse>, AppError> {
    let file = extract_single_file(multipart).await?;
    let converted = store_and_convert(&ctx, &file.filename, &file.data).await?;

    Ok(Json(UploadResponse {
        success: true,
        message: "File converted successfully".to_string(),
        download_url: converted.download_url,
    }))
}

#[derive(Serialize, ToSchema)]
pub struct BulkResult {
    pub original_filename: String,
    pub pdf_filename: String,
    pub download_url: String,
    pub success: bool,
}

#[derive(Serialize, ToSchema)]
pub struct BulkError {
    pub filename: String,
    pub error: String,
}

#[derive(Serialize, ToSchema)]
pub struct BulkUploadResponse {
    pub success: bool,
    pub converted: usize,
    pub failed: usize,
    pub results: Vec<BulkResult>,
    pub errors: Vec<BulkError>,
}

#[utoipa::path(
    post,
    path = "/bulk-upload",
    tag = "convert",
    request_body(content = String, content_type = "multipart/form-data",
        description = "Repeated multipart field named 'files[]'"),
    responses(
        (status = 200, description = "Per-file results, including failures", body = BulkUploadResponse),
        (status = 400, description = "No files provided")
    )
)]
pub async fn bulk_upload(
    State(ctx): State<AppContext>,
    multipart: Multipart,
) -> std::result::Result<Json<BulkUploadResponse>, AppError> {
    let files = collect_batch_files(multipart).await?;
    if files.is_empty() {
        return Err(Error::validation("No files provided").into());
    }

    let mut results = Vec::new();
    let mut errors = Vec::new();

    for file in files {
        // Empty filenames are batch noise (unselected form slots), not errors.
        if file.filename.is_empty() {
            continue;
        }

        match store_and_convert(&ctx, &file.filename, &file.data).await {
            Ok(converted) => results.push(BulkResult {
                original_filename: converted.original_filename,
                pdf_filename: converted.pdf_filename,
                download_url: converted.download_url,
                success: true,
            }),
            Err(e) => {
                tracing::warn!(filename = %file.filename, error = %e, "Batch entry failed");
                errors.push(BulkError {
                    filename: file.filename,
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(Json(BulkUploadResponse {
        success: true,
        converted: results.len(),
        failed: errors.len(),
        results,
        errors,
    }))
}

#[utoipa::path(
    get,
    path = "/download/{filename}",
    tag = "download",
    params(("filename" = String, Path, description = "Artifact name returned by an upload")),
    responses(
        (status = 200, description = "PDF stream", content_type = "application/pdf"),
        (status = 404, description = "Artifact not found")
    )
)]
pub async fn download(
    State(ctx): State<AppContext>,
    Path(filename): Path<String>,
) -> std::result::Result<Response, AppError> {
    let path = ctx.store.artifact_path(&filename);

    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|_| Error::not_found("artifact", &filename))?;
    let size = file
        .metadata()
        .await
        .map_err(Error::from)?
        .len();

    let display = storage::display_name(&filename).to_string();
    let body = Body::from_stream(ReaderStream::new(file));

    Response::builder()
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(header::CONTENT_LENGTH, size.to_string())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", display),
        )
        .body(body)
        .map_err(|e| Error::Internal(format!("Failed to build response: {e}")).into())
}

#[derive(Deserialize, ToSchema)]
pub struct DownloadAllRequest {
    pub filenames: Vec<String>,
}

#[utoipa::path(
    post,
    path = "/download-all",
    tag = "download",
    request_body = DownloadAllRequest,
    responses(
        (status = 200, description = "ZIP of the existing artifacts", content_type = "application/zip"),
        (status = 400, description = "Empty filename list")
    )
)]
pub async fn download_all(
    State(ctx): State<AppContext>,
    Json(request): Json<DownloadAllRequest>,
) -> std::result::Result<Response, AppError> {
    if request.filenames.is_empty() {
        return Err(Error::validation("No files to download").into());
    }

    let entries: Vec<ArchiveEntry> = request
        .filenames
        .iter()
        .map(|name| ArchiveEntry {
            path: ctx.store.artifact_path(name),
            name: storage::display_name(name).to_string(),
        })
        .collect();

    let bytes = tokio::task::spawn_blocking(move || archive::build_zip(&entries))
        .await
        .map_err(|e| Error::Internal(format!("archive task failed: {e}")))??;

    Response::builder()
        .header(header::CONTENT_TYPE, "application/zip")
        .header(header::CONTENT_LENGTH, bytes.len().to_string())
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"converted_pdfs.zip\"",
        )
        .body(Body::from(bytes))
        .map_err(|e| Error::Internal(format!("Failed to build response: {e}")).into())
}

// ---------------------------------------------------------------------------
// Shared upload plumbing
// ---------------------------------------------------------------------------

struct UploadedFile {
    filename: String,
    data: Bytes,
}

struct ConvertedUpload {
    original_filename: String,
    pdf_filename: String,
    download_url: String,
}

/// Pull the single `file` field out of a multipart form.
async fn extract_single_file(mut multipart: Multipart) -> Result<UploadedFile> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::validation(format!("Failed to read multipart form: {e}")))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            if filename.is_empty() {
                return Err(Error::validation("No file selected"));
            }
            let data = field
                .bytes()
                .await
                .map_err(|e| Error::validation(format!("Failed to read file data: {e}")))?;
            return Ok(UploadedFile { filename, data });
        }
    }

    Err(Error::validation("No file provided"))
}

/// Collect every `files[]` field (bare `files` accepted) from a multipart form.
async fn collect_batch_files(mut multipart: Multipart) -> Result<Vec<UploadedFile>> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::validation(format!("Failed to read multipart form: {e}")))?
    {
        if !matches!(field.name(), Some("files[]") | Some("files")) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| Error::validation(format!("Failed to read file data: {e}")))?;
        files.push(UploadedFile { filename, data });
    }

    Ok(files)
}

/// Validate, persist, and convert one uploaded document.
///
/// Validation happens before any file is written or subprocess spawned. The
/// upload is removed afterwards whether conversion succeeded or not; the
/// converted directory is the only place results live.
async fn store_and_convert(
    ctx: &AppContext,
    filename: &str,
    data: &[u8],
) -> Result<ConvertedUpload> {
    let allowed = &ctx.config.conversion.allowed_extensions;
    let ext = storage::extension(filename).unwrap_or_default();
    if !allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext)) {
        return Err(Error::validation(format!(
            "Only {} files are allowed",
            allowed
                .iter()
                .map(|e| format!(".{e}"))
                .collect::<Vec<_>>()
                .join(" and ")
        )));
    }

    let sanitized = storage::sanitize_filename(filename)?;
    let stored_name = storage::unique_stored_name(&sanitized);

    let input_path = ctx.store.save_upload(&stored_name, data).await?;
    tracing::debug!("Saved upload to {:?}", input_path);

    let pdf_filename = storage::pdf_name(&stored_name);
    let output_path = ctx.store.artifact_path(&pdf_filename);

    let outcome = ctx.converter.convert(&input_path, &output_path).await;
    ctx.store.remove_upload(&input_path);
    outcome?;

    if !output_path.exists() {
        return Err(Error::conversion(
            ctx.converter.name(),
            "PDF file was not created",
        ));
    }

    Ok(ConvertedUpload {
        original_filename: sanitized,
        pdf_filename: pdf_filename.clone(),
        download_url: format!("/download/{}", pdf_filename),
    })
}
