//! Fallback for every path other than `/scrape`.

use axum::{
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};

/// Plain-text 404
pub async fn not_found_handler() -> Response {
    (StatusCode::NOT_FOUND, [(CONTENT_TYPE, "text/plain")], "Not found").into_response()
}
