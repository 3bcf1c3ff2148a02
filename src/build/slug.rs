//! Slug resolution.
//!
//! Turns a title into a URL-safe filename stem that is unique among the
//! published records of one kind.

use std::collections::HashSet;

/// Suffixes tried after the bare slug before giving up.
pub const MAX_ATTEMPTS: usize = 100;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SlugError {
    #[error("could not find a free slug for '{base}' after {attempts} attempts")]
    CollisionUnresolved { base: String, attempts: usize },
}

/// Normalize a title into `[a-z0-9-]`.
///
/// Lowercases, turns each whitespace run into one hyphen and drops every
/// other character. Leading and trailing hyphens are trimmed.
///
/// "Hello, World!" -> "hello-world"
/// "  Launch   Day " -> "launch-day"
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars() {
        if c.is_whitespace() {
            pending_hyphen = !slug.is_empty();
            continue;
        }

        let c = c.to_ascii_lowercase();
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            if pending_hyphen && !slug.ends_with('-') && c != '-' {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        }
    }

    slug.trim_matches('-').to_string()
}

/// Whether a slug would shadow a generated index page (`index`, `page-N`).
pub fn is_reserved(slug: &str) -> bool {
    if slug == "index" {
        return true;
    }
    slug.strip_prefix("page-")
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

/// Resolve a unique slug for `title`.
///
/// `taken` holds the frozen slugs of the other published records of the
/// same kind. `seed` is used when the title has no usable characters.
/// Collisions get `-2`, `-3`, ... appended.
pub fn resolve_slug(title: &str, taken: &HashSet<String>, seed: &str) -> Result<String, SlugError> {
    let mut base = slugify(title);
    if base.is_empty() {
        base = slugify(seed);
    }

    let free = |candidate: &String| !taken.contains(candidate) && !is_reserved(candidate);
    if free(&base) {
        return Ok(base);
    }

    for n in 2..MAX_ATTEMPTS + 2 {
        let candidate = format!("{base}-{n}");
        if free(&candidate) {
            return Ok(candidate);
        }
    }

    Err(SlugError::CollisionUnresolved {
        base,
        attempts: MAX_ATTEMPTS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taken(slugs: &[&str]) -> HashSet<String> {
        slugs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Launch \t Day  "), "launch-day");
        assert_eq!(slugify("Rust 2024: what's new?"), "rust-2024-whats-new");
        assert_eq!(slugify("already-slugged"), "already-slugged");
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_never_emits_foreign_characters() {
        for title in ["A/B\\C", "../etc/passwd", "tab\tand\nnewline", "émoji 🚀 launch"] {
            let slug = slugify(title);
            assert!(
                slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
                "{title} -> {slug}"
            );
        }
    }

    #[test]
    fn test_resolve_without_collision() {
        assert_eq!(resolve_slug("Launch Day", &taken(&[]), "abc").unwrap(), "launch-day");
    }

    #[test]
    fn test_resolve_appends_counter() {
        assert_eq!(
            resolve_slug("Launch Day", &taken(&["launch-day"]), "abc").unwrap(),
            "launch-day-2"
        );
        assert_eq!(
            resolve_slug("Launch Day", &taken(&["launch-day", "launch-day-2"]), "abc").unwrap(),
            "launch-day-3"
        );
    }

    #[test]
    fn test_resolve_falls_back_to_seed() {
        assert_eq!(resolve_slug("???", &taken(&[]), "67e55044").unwrap(), "67e55044");
    }

    #[test]
    fn test_resolve_avoids_index_page_names() {
        assert!(is_reserved("index"));
        assert!(is_reserved("page-12"));
        assert!(!is_reserved("page-"));
        assert!(!is_reserved("page-2-2"));
        assert_eq!(resolve_slug("Page 2", &taken(&[]), "abc").unwrap(), "page-2-2");
        assert_eq!(resolve_slug("Index", &taken(&[]), "abc").unwrap(), "index-2");
    }

    #[test]
    fn test_resolve_gives_up() {
        let mut all = taken(&["same"]);
        for n in 2..MAX_ATTEMPTS + 2 {
            all.insert(format!("same-{n}"));
        }
        assert_eq!(
            resolve_slug("Same", &all, "seed"),
            Err(SlugError::CollisionUnresolved {
                base: "same".to_string(),
                attempts: MAX_ATTEMPTS
            })
        );
    }
}
