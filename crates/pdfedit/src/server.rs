use crate::prelude::{eprintln, *};
use crate::storage::{BlobStore, FsBlobStore};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use pdfedit_core::Hit;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

#[derive(Debug, clap::Args)]
pub struct ServeOptions {
    /// Port to listen on
    #[arg(short, long, env = "PDFEDIT_PORT", default_value = "8000")]
    port: u16,

    /// Host to bind to
    #[arg(long, env = "PDFEDIT_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Directory holding uploaded documents
    #[arg(long, env = "PDFEDIT_STORAGE_DIR", default_value = "pdf_storage")]
    storage_dir: PathBuf,

    /// Path prefix of every route
    #[arg(long, env = "PDFEDIT_API_PREFIX", default_value = "/api/v1")]
    prefix: String,

    /// Origins allowed to call the API
    #[arg(
        long = "cors-origin",
        env = "PDFEDIT_CORS_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:3000"
    )]
    cors_origins: Vec<String>,

    /// Name reported at start-up
    #[arg(long, env = "PDFEDIT_PROJECT_NAME", default_value = "PDF Editor")]
    project_name: String,
}

type SharedStore = Arc<dyn BlobStore>;

pub async fn run(options: ServeOptions, global: crate::Global) -> Result<()> {
    let store: SharedStore = Arc::new(
        FsBlobStore::new(&options.storage_dir)
            .map_err(|e| eyre!("Failed to open {}: {e}", options.storage_dir.display()))?,
    );

    let origins = options
        .cors_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin.trim())
                .map_err(|e| eyre!("Invalid CORS origin {origin:?}: {e}"))
        })
        .collect::<Result<Vec<_>>>()?;

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any);

    let prefix = normalize_prefix(&options.prefix);
    let app_router = router(store, &prefix).layer(cors);

    let addr = format!("{}:{}", options.host, options.port);

    if global.verbose {
        eprintln!("{} listening on http://{}{}", options.project_name, addr, prefix);
        eprintln!("Storage directory: {}", options.storage_dir.display());
    }
    log::info!("{} listening on {addr}", options.project_name);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| eyre!("Failed to bind to {}: {}", addr, e))?;

    axum::serve(listener, app_router)
        .await
        .map_err(|e| eyre!("Server error: {e}"))?;

    Ok(())
}

/// `/api/v1/` and `api/v1` both become `/api/v1`; an empty or `/` prefix
/// becomes the empty string.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// All routes, mounted under `prefix`.
pub fn router(store: SharedStore, prefix: &str) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/pdf/upload", post(upload))
        .route("/pdf/{file_id}/download", get(download))
        .route("/pdf/{file_id}/find", get(find))
        .route("/pdf/{file_id}/replace", post(replace))
        .with_state(store);

    if prefix.is_empty() {
        api
    } else {
        Router::new().nest(prefix, api)
    }
}

/// Run document work on the blocking pool.
async fn run_blocking<T, F>(f: F) -> Result<T, Error>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, Error> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Internal(f!("Task join error: {e}")))?
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct UploadQuery {
    filename: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct UploadResponse {
    file_id: String,
    filename: Option<String>,
}

fn is_pdf_upload(headers: &HeaderMap, filename: Option<&str>) -> bool {
    let pdf_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("application/pdf"));
    let pdf_name = filename.is_some_and(|n| n.to_lowercase().ends_with(".pdf"));
    pdf_type || pdf_name
}

async fn upload(
    State(store): State<SharedStore>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResponse>, Error> {
    if !is_pdf_upload(&headers, query.filename.as_deref()) {
        return Err(Error::BadRequest("Only PDF files are allowed".to_string()));
    }

    let size = body.len();
    let file_id = run_blocking(move || Ok(store.put(&body)?)).await?;
    log::info!("uploaded {file_id} ({size} bytes)");

    Ok(Json(UploadResponse {
        file_id,
        filename: query.filename,
    }))
}

async fn download(
    State(store): State<SharedStore>,
    Path(file_id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let id = file_id.clone();
    let bytes = run_blocking(move || Ok(store.get(&id)?)).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                f!("inline; filename=\"{file_id}.pdf\""),
            ),
        ],
        bytes,
    ))
}

#[derive(Debug, Deserialize)]
struct FindQuery {
    page_num: i64,
    query: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct FindResponse {
    hits: Vec<Hit>,
}

async fn find(
    State(store): State<SharedStore>,
    Path(file_id): Path<String>,
    Query(params): Query<FindQuery>,
) -> Result<Json<FindResponse>, Error> {
    let hits = run_blocking(move || {
        let bytes = store.get(&file_id)?;
        let page = u32::try_from(params.page_num)
            .ok()
            .filter(|p| *p >= 1)
            .ok_or_else(|| Error::BadRequest("page_num must be at least 1".to_string()))?;
        if params.query.is_empty() {
            return Err(Error::BadRequest("query must not be empty".to_string()));
        }
        Ok(pdf::find_text(&bytes, page, &params.query)?)
    })
    .await?;

    Ok(Json(FindResponse { hits }))
}

#[derive(Debug, Deserialize)]
struct ReplaceRequest {
    page_num: i64,
    hit_index: i64,
    old_text: String,
    new_text: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ReplaceResponse {
    success: bool,
}

async fn replace(
    State(store): State<SharedStore>,
    Path(file_id): Path<String>,
    Json(request): Json<ReplaceRequest>,
) -> Result<Json<ReplaceResponse>, Error> {
    run_blocking(move || {
        let bytes = store.get(&file_id)?;
        let page = u32::try_from(request.page_num)
            .map_err(|_| Error::BadRequest("Invalid page number".to_string()))?;
        let hit_index = usize::try_from(request.hit_index)
            .map_err(|_| Error::BadRequest("Invalid hit_index".to_string()))?;

        let out = pdf::replace_text(
            &bytes,
            page,
            hit_index,
            &request.old_text,
            &request.new_text,
        )?;
        store.put_with_id(&file_id, &out)?;
        log::info!(
            "replaced {:?} with {:?} on page {page} of {file_id}",
            request.old_text,
            request.new_text
        );
        Ok(())
    })
    .await?;

    Ok(Json(ReplaceResponse { success: true }))
}
