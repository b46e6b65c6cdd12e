use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::model::Palette;
use crate::store::{PaletteStore, StoreError};

pub const PALETTES_ROUTE: &str = "/api/palettes";

const READ_FAILED: &str = "Could not read palettes.json";
const WRITE_FAILED: &str = "Could not write palettes.json";
const INDEX_OUT_OF_RANGE: &str = "Index out of range";

/// Body of every failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Body of a successful mutation. `palette` is only set by POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessBody {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palette: Option<Palette>,
}

/// A failed request, rendered as `{"error": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Map a store failure, using `generic` for storage problems so file
    /// paths and OS errors stay in the server log.
    fn from_store(err: StoreError, generic: &str) -> Self {
        if err.is_storage_unavailable() {
            log::error!("{:#}", anyhow::Error::from(err));
            Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: generic.to_string(),
            }
        } else {
            log::warn!("{err}");
            Self::bad_request(INDEX_OUT_OF_RANGE)
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        log::warn!("rejected request body: {rejection}");
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

type Shared<S> = State<Arc<S>>;

/// Build the palette API router over `store`.
pub fn router<S: PaletteStore + 'static>(store: Arc<S>) -> Router {
    Router::new()
        .route(
            PALETTES_ROUTE,
            get(list_palettes::<S>)
                .post(append_palette::<S>)
                .put(replace_palettes::<S>),
        )
        .route("/api/palettes/{index}", delete(remove_palette::<S>))
        .layer(CorsLayer::permissive())
        .with_state(store)
}

/// Run a store operation on the blocking pool.
async fn blocking<S, T, F>(store: Arc<S>, op: F) -> Result<T, StoreError>
where
    S: PaletteStore + 'static,
    T: Send + 'static,
    F: FnOnce(&S) -> Result<T, StoreError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || op(&store))
        .await
        .map_err(StoreError::Task)?
}

async fn list_palettes<S: PaletteStore + 'static>(
    State(store): Shared<S>,
) -> Result<Json<Vec<Palette>>, ApiError> {
    let palettes = blocking(store, |s| s.load())
        .await
        .map_err(|e| ApiError::from_store(e, READ_FAILED))?;
    Ok(Json(palettes))
}

async fn append_palette<S: PaletteStore + 'static>(
    State(store): Shared<S>,
    body: Result<Json<Palette>, JsonRejection>,
) -> Result<Json<SuccessBody>, ApiError> {
    let Json(palette) = body?;
    let palette = blocking(store, move |s| s.append(palette))
        .await
        .map_err(|e| ApiError::from_store(e, WRITE_FAILED))?;
    log::info!("added palette {:?}", palette.name);
    Ok(Json(SuccessBody {
        success: true,
        palette: Some(palette),
    }))
}

async fn replace_palettes<S: PaletteStore + 'static>(
    State(store): Shared<S>,
    body: Result<Json<Vec<Palette>>, JsonRejection>,
) -> Result<Json<SuccessBody>, ApiError> {
    let Json(palettes) = body?;
    let count = palettes.len();
    blocking(store, move |s| s.replace(&palettes))
        .await
        .map_err(|e| ApiError::from_store(e, WRITE_FAILED))?;
    log::info!("replaced collection with {count} palettes");
    Ok(Json(SuccessBody {
        success: true,
        palette: None,
    }))
}

async fn remove_palette<S: PaletteStore + 'static>(
    State(store): Shared<S>,
    Path(index): Path<String>,
) -> Result<Json<SuccessBody>, ApiError> {
    let index: i64 = index
        .trim()
        .parse()
        .map_err(|_| ApiError::bad_request(INDEX_OUT_OF_RANGE))?;
    let removed = blocking(store, move |s| s.remove_at(index))
        .await
        .map_err(|e| ApiError::from_store(e, WRITE_FAILED))?;
    log::info!("removed palette {:?} at index {index}", removed.name);
    Ok(Json(SuccessBody {
        success: true,
        palette: None,
    }))
}
