// Public landing page

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Landing page with the pairing form.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
