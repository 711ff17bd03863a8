//! Shared utilities and helper functions for web UI.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use tera::Context;

use crate::web_ui::session::SessionHandle;
use crate::web_ui::templates;

/// Helper to render a template
pub fn render_template(name: &str, context: &Context) -> Response {
    match templates::render(name, context) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Template error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Template error: {}", e)).into_response()
        }
    }
}

/// Helper to render an error page
pub fn render_error(status: StatusCode, message: &str) -> Response {
    let mut context = Context::new();
    context.insert("message", message);

    match templates::render("error.html", &context) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(_) => (status, message.to_string()).into_response(),
    }
}

/// Redirect back to the grid after a form post
pub fn back_to_grid(handle: &SessionHandle) -> Response {
    handle.attach_cookie(Redirect::to("/").into_response())
}

/// Last path segment of a source file, for the grid column
pub fn display_filename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
