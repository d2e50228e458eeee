use axum::{body::Body, response::Response};
use scraper::Html;

/// Read the whole response body as text.
pub(crate) async fn read_body_text(response: Response<Body>) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not get response body");

    String::from_utf8_lossy(&body).to_string()
}

/// Read the response body as JSON.
pub(crate) async fn read_json(response: Response<Body>) -> serde_json::Value {
    let text = read_body_text(response).await;

    serde_json::from_str(&text).unwrap_or_else(|error| panic!("Invalid JSON {text:?}: {error}"))
}

pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    Html::parse_document(&read_body_text(response).await)
}

/// Parse a response that is an HTML fragment, e.g. a report swapped in by HTMX.
pub(crate) async fn parse_html_fragment(response: Response<Body>) -> Html {
    Html::parse_fragment(&read_body_text(response).await)
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}\n{}",
        html.errors,
        html.html()
    );
}
