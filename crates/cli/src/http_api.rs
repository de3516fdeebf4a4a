use crate::config::ServerConfig;
use crate::pipeline::process_files;
use crate::render::{render, OutputFormat};
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, DefaultBodyLimit, Multipart, Query, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tally_docx::{collect_uploads, unpack_archive, FileDescriptor};
use tally_protocol::{serialize_json, ErrorEnvelope};
use tally_report::Processor;

pub(crate) struct HttpState {
    pub processor: Processor,
    pub server: ServerConfig,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReportQuery {
    #[serde(default)]
    format: OutputFormat,

    /// `/archive` only: apply the early filter to every member
    #[serde(default)]
    early: bool,
}

pub(crate) fn router(state: Arc<HttpState>) -> Router {
    let limit = state.server.max_upload_bytes;
    Router::new()
        .route("/report", post(report_handler))
        .route("/archive", post(archive_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}

/// Multipart upload: every file field is a document or a `.zip` of documents.
/// Files sent under the early field name get the early filter; fields
/// without a filename are ignored.
pub(crate) async fn report_handler(
    State(state): State<Arc<HttpState>>,
    query: Result<Query<ReportQuery>, QueryRejection>,
    mut multipart: Multipart,
) -> Response {
    let query = match query {
        Ok(Query(query)) => query,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, "invalid_query", err.to_string()),
    };

    let mut uploads = Vec::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                return error_response(StatusCode::BAD_REQUEST, "invalid_multipart", err.to_string())
            }
        };

        let Some(name) = field.file_name().map(str::to_string) else {
            log::debug!(
                "ignoring multipart field {:?}: not a file",
                field.name().unwrap_or_default()
            );
            continue;
        };
        let filter_early = field.name() == Some(state.server.early_field.as_str());

        match field.bytes().await {
            Ok(bytes) => uploads.push(FileDescriptor::new(name, bytes.to_vec(), filter_early)),
            Err(err) => {
                return error_response(StatusCode::BAD_REQUEST, "invalid_multipart", err.to_string())
            }
        }
    }

    if uploads.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            "no files in the upload".to_string(),
        );
    }

    let files = match collect_uploads(uploads) {
        Ok(files) => files,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, "invalid_archive", err.to_string()),
    };

    run_report(state, files, query.format).await
}

/// Raw `.zip` request body holding the documents of one batch
pub(crate) async fn archive_handler(
    State(state): State<Arc<HttpState>>,
    query: Result<Query<ReportQuery>, QueryRejection>,
    body: Bytes,
) -> Response {
    let query = match query {
        Ok(Query(query)) => query,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, "invalid_query", err.to_string()),
    };

    match unpack_archive(&body, query.early) {
        Ok(files) => run_report(state, files, query.format).await,
        Err(err) => error_response(StatusCode::BAD_REQUEST, "invalid_archive", err.to_string()),
    }
}

pub(crate) async fn health_handler(State(state): State<Arc<HttpState>>) -> Response {
    let body = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "dictionary_groups": state.processor.dictionary().len(),
    });
    build_response(StatusCode::OK, OutputFormat::Json.content_type(), body.to_string())
}

async fn run_report(
    state: Arc<HttpState>,
    files: Vec<FileDescriptor>,
    format: OutputFormat,
) -> Response {
    let count = files.len();
    let job = tokio::task::spawn_blocking(move || {
        let data = process_files(&state.processor, &files);
        render(&data, format)
    });

    match job.await {
        Ok(Ok(body)) => {
            log::info!("report built from {count} file(s)");
            build_response(StatusCode::OK, format.content_type(), body)
        }
        Ok(Err(err)) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "render_failed",
            format!("{err:#}"),
        ),
        Err(err) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal",
            format!("report task failed: {err}"),
        ),
    }
}

pub(crate) fn error_response(status: StatusCode, code: &str, message: String) -> Response {
    log::warn!("{status}: {code}: {message}");

    let hint = match code {
        "invalid_multipart" => Some(
            "Send multipart/form-data with one file field per .docx or .zip upload.".to_string(),
        ),
        "invalid_archive" => {
            Some("Upload a valid .zip archive of .docx documents.".to_string())
        }
        "invalid_query" => Some("Supported query: ?format=text|markdown|html|json&early=true".to_string()),
        _ => None,
    };
    let envelope = ErrorEnvelope {
        code: code.to_string(),
        message,
        hint,
    };

    match serialize_json(&envelope) {
        Ok(body) => build_response(status, OutputFormat::Json.content_type(), body),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

pub(crate) fn build_response(status: StatusCode, content_type: &'static str, body: String) -> Response {
    (status, [(CONTENT_TYPE, content_type)], body).into_response()
}
