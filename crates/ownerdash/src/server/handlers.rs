//! Request handlers and error responses.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{debug, error, warn};

use super::AppState;
use crate::dashboard::Dashboard;
use crate::dataset::load_dataset;
use crate::error::Error;
use crate::render::render_dashboard;
use crate::store::{EditMap, SaveRequest};

/// `{"ok": true}` acknowledgement.
#[derive(Debug, Serialize)]
pub struct Ack {
    ok: bool,
}

impl Ack {
    fn ok() -> Self {
        Self { ok: true }
    }
}

/// `{"ok": false, "error": "..."}` body.
#[derive(Debug, Serialize)]
struct Failure {
    ok: bool,
    error: String,
}

fn status_for(err: &Error) -> StatusCode {
    if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn log_failure(status: StatusCode, err: &Error) {
    if status.is_client_error() {
        warn!("Rejected request: {err}");
    } else {
        error!("Request failed: {err}");
    }
}

/// Error returned from the JSON endpoints.
#[derive(Debug)]
pub struct JsonError(Error);

impl From<Error> for JsonError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        log_failure(status, &self.0);
        let body = Failure {
            ok: false,
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Error returned from the HTML endpoint.
#[derive(Debug)]
pub struct PageError(Error);

impl From<Error> for PageError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        log_failure(status, &self.0);
        (status, format!("Dashboard unavailable: {}\n", self.0)).into_response()
    }
}

/// `GET /` and `GET /dashboard`.
pub async fn dashboard(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let records = load_dataset(state.config.dataset_path())?;
    let edits = state.store.load()?;
    let html = render_dashboard(&Dashboard::join(&records, &edits), &state.config);
    debug!(
        "Rendered dashboard: {} rows, {} RV edits, {} Packer edits",
        records.len(),
        edits.rv.len(),
        edits.packer.len()
    );
    Ok(Html(html))
}

/// `POST /saveall`.
pub async fn save_all(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Ack>, JsonError> {
    let request = SaveRequest::from_slice(&body)?;
    debug!(
        "Save request: {} RV, {} Packer, merge={}",
        request.rv.as_ref().map_or(0, EditMap::len),
        request.packer.as_ref().map_or(0, EditMap::len),
        request.is_merge()
    );
    state.store.save_all(request)?;
    Ok(Json(Ack::ok()))
}

/// `POST /clear`. Any body is ignored.
pub async fn clear(State(state): State<AppState>) -> Result<Json<Ack>, JsonError> {
    state.store.clear()?;
    Ok(Json(Ack::ok()))
}

/// Everything else.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found\n")
}
