//! The request handler.
//!
//! Every request goes through one fallback handler; routing is just file
//! resolution under the site root.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{Method, StatusCode, Uri, header};
use axum::response::{Html, IntoResponse, Response};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::HomePage;

use super::mime::content_type;
use super::resolve::{ResolveError, resolve};

/// State shared by all request handlers.
#[derive(Debug)]
pub struct ServeState {
    pub root: PathBuf,
    pub home_page: HomePage,
    /// Cancelled when the server is stopping
    pub shutdown: CancellationToken,
}

pub type SharedState = Arc<ServeState>;

pub async fn serve_file(State(state): State<SharedState>, method: Method, uri: Uri) -> Response {
    if state.shutdown.is_cancelled() {
        return (StatusCode::SERVICE_UNAVAILABLE, "Server is shutting down").into_response();
    }
    if method != Method::GET {
        return not_found(uri.path());
    }

    // Resolution stats and canonicalizes, so keep it off the runtime threads
    let root = state.root.clone();
    let home_page = state.home_page;
    let requested = uri.path().to_string();
    let resolved = tokio::task::spawn_blocking(move || resolve(&root, home_page, &requested)).await;

    let path = match resolved {
        Ok(Ok(path)) => path,
        Ok(Err(ResolveError::NotFound(requested))) => return not_found(&requested),
        Ok(Err(ResolveError::Forbidden(requested))) => {
            warn!(path = %requested, "rejected path outside the site root");
            return forbidden(&requested);
        }
        Err(e) => {
            warn!(path = %uri.path(), error = %e, "path resolution task failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to resolve path").into_response();
        }
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            debug!(path = %path.display(), bytes = bytes.len(), "serving file");
            ([(header::CONTENT_TYPE, content_type(&path))], bytes).into_response()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read file");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read file").into_response()
        }
    }
}

fn not_found(requested: &str) -> Response {
    error_page(
        StatusCode::NOT_FOUND,
        "404 Not Found",
        &format!("The requested path <code>{}</code> was not found.", tera::escape_html(requested)),
    )
}

fn forbidden(requested: &str) -> Response {
    error_page(
        StatusCode::FORBIDDEN,
        "403 Forbidden",
        &format!("Access to <code>{}</code> is not allowed.", tera::escape_html(requested)),
    )
}

fn error_page(status: StatusCode, title: &str, message: &str) -> Response {
    let body = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"UTF-8\"><title>{title}</title></head>\n\
         <body><h1>{title}</h1><p>{message}</p></body>\n</html>\n"
    );
    (status, Html(body)).into_response()
}
