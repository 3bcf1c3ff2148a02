//! Request path resolution.
//!
//! Maps a request path onto a file under the site root, refusing anything
//! that could escape it.

use std::path::{Path, PathBuf};

use crate::build::paths::output_file;
use crate::config::HomePage;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ResolveError {
    #[error("access to '{0}' is forbidden")]
    Forbidden(String),

    #[error("'{0}' not found")]
    NotFound(String),
}

/// Resolve a request path (as sent by the client) to a file under `root`.
///
/// - the query string and fragment are ignored
/// - the path is percent-decoded before any check
/// - a `..` segment anywhere is forbidden
/// - `/` and paths ending in `/` map to that directory's `index.html`
/// - an extensionless path falls back to `<path>.html`
/// - the final file must lie inside `root` after resolving symlinks
pub fn resolve(root: &Path, home_page: HomePage, request_path: &str) -> Result<PathBuf, ResolveError> {
    let path = request_path
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let decoded = urlencoding::decode(path)
        .map_err(|_| ResolveError::NotFound(path.to_string()))?
        .into_owned();

    if decoded.split(['/', '\\']).any(|segment| segment == "..") || decoded.contains('\0') {
        return Err(ResolveError::Forbidden(decoded));
    }

    let relative = decoded.trim_start_matches('/');
    let relative = if relative.is_empty() {
        match home_page {
            HomePage::Landing => "index.html".to_string(),
            HomePage::Blog => "blog/index.html".to_string(),
        }
    } else if relative.ends_with('/') {
        format!("{relative}index.html")
    } else {
        relative.to_string()
    };

    let mut candidate = output_file(root, &relative);
    if candidate.is_dir() {
        candidate = candidate.join("index.html");
    }
    if !candidate.is_file() && candidate.extension().is_none() {
        candidate = candidate.with_extension("html");
    }
    if !candidate.is_file() {
        return Err(ResolveError::NotFound(decoded));
    }

    let not_found = || ResolveError::NotFound(decoded.clone());
    let canonical_root = root.canonicalize().map_err(|_| not_found())?;
    let canonical = candidate.canonicalize().map_err(|_| not_found())?;
    if !canonical.starts_with(&canonical_root) {
        return Err(ResolveError::Forbidden(decoded));
    }
    Ok(canonical)
}
