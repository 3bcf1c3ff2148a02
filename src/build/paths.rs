//! Output path conventions.
//!
//! Every generated file is addressed by a `/`-separated path relative to the
//! output root. This module maps records and index pages to those paths, and
//! paths to the URLs pages link with.
//!
//! ```text
//! index.html, about.html, css/style.css, images/<kind>-<id>.<ext>
//! blog/index.html, blog/page-2.html, blog/<slug>.html
//! portfolio/index.html, portfolio/<slug>.html
//! ```

use std::path::{Path, PathBuf};

use crate::content::{ContentKind, RecordId};
use crate::util::image_extension;

pub const HOME_PAGE: &str = "index.html";
pub const ABOUT_PAGE: &str = "about.html";
pub const STYLESHEET: &str = "css/style.css";
pub const IMAGES_DIR: &str = "images";

/// Relative path of a record's page.
///
/// # Examples
/// ```ignore
/// artifact_path(ContentKind::Post, "hello-world") => "blog/hello-world.html"
/// ```
pub fn artifact_path(kind: ContentKind, slug: &str) -> String {
    format!("{}/{}.html", kind.section_dir(), slug)
}

/// Relative path of page `page` (1-based) of a kind's index.
///
/// Page 1 is always `<section>/index.html`.
pub fn index_page_path(kind: ContentKind, page: usize) -> String {
    if page <= 1 {
        format!("{}/index.html", kind.section_dir())
    } else {
        format!("{}/page-{}.html", kind.section_dir(), page)
    }
}

/// Whether `path` is a secondary index page (`<section>/page-N.html`).
pub fn is_index_page(kind: ContentKind, path: &str) -> bool {
    path.strip_prefix(kind.section_dir())
        .and_then(|rest| rest.strip_prefix("/page-"))
        .and_then(|rest| rest.strip_suffix(".html"))
        .and_then(|n| n.parse::<usize>().ok())
        .is_some_and(|n| n >= 2)
}

/// Relative path of a record's image, if it has one.
pub fn image_path(kind: ContentKind, id: &RecordId, image: Option<&[u8]>) -> Option<String> {
    image.map(|bytes| {
        format!(
            "{}/{}-{}.{}",
            IMAGES_DIR,
            kind.image_prefix(),
            id,
            image_extension(bytes)
        )
    })
}

/// Site-absolute URL for a relative output path.
///
/// `<section>/index.html` links as the directory (`/blog/`).
pub fn url_for(path: &str) -> String {
    match path.strip_suffix("index.html") {
        Some(dir) if dir.is_empty() || dir.ends_with('/') => format!("/{dir}"),
        _ => format!("/{path}"),
    }
}

/// Join a relative output path onto the output root.
pub fn output_file(output_root: &Path, path: &str) -> PathBuf {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .fold(output_root.to_path_buf(), |acc, segment| acc.join(segment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_artifact_path() {
        assert_eq!(artifact_path(ContentKind::Post, "hello-world"), "blog/hello-world.html");
        assert_eq!(artifact_path(ContentKind::Project, "orrery"), "portfolio/orrery.html");
    }

    #[test]
    fn test_index_page_path() {
        assert_eq!(index_page_path(ContentKind::Post, 1), "blog/index.html");
        assert_eq!(index_page_path(ContentKind::Post, 3), "blog/page-3.html");
        assert_eq!(index_page_path(ContentKind::Project, 0), "portfolio/index.html");
    }

    #[test]
    fn test_is_index_page() {
        assert!(is_index_page(ContentKind::Post, "blog/page-2.html"));
        assert!(!is_index_page(ContentKind::Post, "blog/index.html"));
        assert!(!is_index_page(ContentKind::Post, "blog/page-two.html"));
        assert!(!is_index_page(ContentKind::Project, "blog/page-2.html"));
    }

    #[test]
    fn test_image_path() {
        let id = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!(image_path(ContentKind::Post, &id, None), None);
        assert_eq!(
            image_path(ContentKind::Post, &id, Some(b"GIF89a......")).as_deref(),
            Some("images/post-67e55044-10b1-426f-9247-bb680e5fe0c8.gif")
        );
    }

    #[test]
    fn test_url_for() {
        assert_eq!(url_for("blog/index.html"), "/blog/");
        assert_eq!(url_for("index.html"), "/");
        assert_eq!(url_for("blog/hello-world.html"), "/blog/hello-world.html");
        assert_eq!(url_for("blog/page-2.html"), "/blog/page-2.html");
    }

    #[test]
    fn test_output_file() {
        assert_eq!(
            output_file(Path::new("/site"), "blog/hello.html"),
            PathBuf::from("/site/blog/hello.html")
        );
    }
}
