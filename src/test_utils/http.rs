use axum::{
    body::Body,
    http::{StatusCode, header::CONTENT_TYPE},
    response::Response,
};

#[track_caller]
pub(crate) fn assert_status_ok(response: &Response<Body>) {
    assert_eq!(
        response.status(),
        StatusCode::OK,
        "want 200 OK, got {}",
        response.status()
    );
}

/// Assert the response has the `Content-Type` header `content_type`, e.g. "application/json".
#[track_caller]
pub(crate) fn assert_content_type(response: &Response<Body>, content_type: &str) {
    let got = response
        .headers()
        .get(CONTENT_TYPE)
        .expect("content-type header missing");

    assert_eq!(got, content_type);
}
