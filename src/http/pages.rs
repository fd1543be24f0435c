//! Page handlers.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

/// The home page, compiled into the binary.
pub const HOME_PAGE: &str = include_str!("../../templates/index.html");

/// `GET /`
pub async fn home() -> Html<&'static str> {
    Html(HOME_PAGE)
}

/// Every unmatched route.
pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}
