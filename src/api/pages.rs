//! Page endpoints

use axum::{
    extract::{Query, State},
    http::Uri,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::PathKey,
    AppState,
};

/// Query parameters for the existence probe
#[derive(Debug, Deserialize)]
pub struct ExistsQuery {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct ExistsResponse {
    pub path: String,
    pub exists: bool,
}

/// Check whether anything serves a page
pub async fn page_exists(
    State(state): State<AppState>,
    Query(query): Query<ExistsQuery>,
) -> AppResult<Json<ExistsResponse>> {
    let path = PathKey::parse(query.path)?;
    let exists = state.services.pages.exists(&path).await?;
    Ok(Json(ExistsResponse {
        path: path.to_string(),
        exists,
    }))
}

/// Serve any path not claimed by the API
pub async fn serve_page(State(state): State<AppState>, uri: Uri) -> AppResult<Response> {
    let path = PathKey::parse(decode_path(uri.path())?)?;
    state.services.pages.dispatch(&path).await
}

/// Percent-decode a request path; the result must be valid UTF-8
fn decode_path(raw: &str) -> AppResult<String> {
    urlencoding::decode(raw)
        .map(|path| path.into_owned())
        .map_err(|_| AppError::BadRequest(format!("Path {} is not valid UTF-8", raw)))
}
