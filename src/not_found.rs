//! The page to display when the requested page or account does not exist.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

/// Renders as a 404 page.
pub struct NotFoundError;

impl NotFoundError {
    pub fn into_html(self) -> Html<String> {
        Html(
            error_view(
                "Not Found",
                "404",
                "Nothing to report here.",
                "That page or account does not exist. Check the address or pick a report from the home page.",
            )
            .into_string(),
        )
    }
}

impl IntoResponse for NotFoundError {
    fn into_response(self) -> Response {
        (StatusCode::NOT_FOUND, self.into_html()).into_response()
    }
}

pub async fn get_404_not_found() -> Response {
    NotFoundError.into_response()
}
