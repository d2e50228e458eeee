//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// The number of characters of a request or response body logged at the
/// `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_text = match body_to_text(body).await {
        Ok(text) => text,
        Err(error) => {
            tracing::error!("could not read request body: {error}");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };
    log_request(&parts, &body_text);

    let request = Request::from_parts(parts, body_text.into());
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_text = match body_to_text(body).await {
        Ok(text) => text,
        Err(error) => {
            tracing::error!("could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    log_response(&parts, &body_text);

    Response::from_parts(parts, body_text.into())
}

async fn body_to_text(body: Body) -> Result<String, axum::Error> {
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await?;

    Ok(String::from_utf8_lossy(&body_bytes).to_string())
}

/// The first [LOG_BODY_LENGTH_LIMIT] characters of `body`, or `None` if
/// `body` is no longer than that.
fn truncate_body(body: &str) -> Option<&str> {
    body.char_indices()
        .nth(LOG_BODY_LENGTH_LIMIT)
        .map(|(end, _)| &body[..end])
}

fn log_request(parts: &axum::http::request::Parts, body: &str) {
    match truncate_body(body) {
        Some(truncated) => {
            tracing::info!("Received request: {parts:#?}\nbody: {truncated}...");
            tracing::debug!("Full request body: {body:?}");
        }
        None => tracing::info!("Received request: {parts:#?}\nbody: {body:?}"),
    }
}

fn log_response(parts: &axum::http::response::Parts, body: &str) {
    match truncate_body(body) {
        Some(truncated) => {
            tracing::info!("Sending response: {parts:#?}\nbody: {truncated}...");
            tracing::debug!("Full response body: {body:?}");
        }
        None => tracing::info!("Sending response: {parts:#?}\nbody: {body:?}"),
    }
}
