//! Index composition.
//!
//! Filters one kind's records down to the published subset, orders them and
//! computes earlier/later adjacency and index pagination.

use std::collections::HashMap;
use std::ops::Range;

use serde::Serialize;

use crate::content::{Record, RecordId};

use super::paths::{artifact_path, index_page_path, url_for};

/// A link to another generated page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub title: String,
    pub url: String,
}

/// Neighbours of a record in its index order.
///
/// For a sorted sequence `S`, `earlier(S[i]) = S[i+1]` and
/// `later(S[i]) = S[i-1]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Adjacency {
    pub earlier: Option<NavLink>,
    pub later: Option<NavLink>,
}

/// Navigation between the pages of a paginated index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current: usize,
    pub total: usize,
    pub previous: Option<String>,
    pub next: Option<String>,
}

/// One page of an index: where it goes and which records it lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPage {
    pub path: String,
    pub range: Range<usize>,
    pub pagination: Pagination,
}

/// The published records of one kind, in index order.
pub struct Composition<'a, R> {
    ordered: Vec<&'a R>,
    adjacency: HashMap<RecordId, Adjacency>,
}

/// Filter, sort and link the published records of one kind.
pub fn compose<R: Record>(records: &[R]) -> Composition<'_, R> {
    let mut ordered: Vec<&R> = records.iter().filter(|r| r.is_published()).collect();
    ordered.sort_by(|a, b| a.index_order(b));

    let links: Vec<NavLink> = ordered.iter().map(|r| link_to(*r)).collect();
    let adjacency = ordered
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let adjacency = Adjacency {
                earlier: links.get(i + 1).cloned(),
                later: i.checked_sub(1).and_then(|j| links.get(j)).cloned(),
            };
            (record.id(), adjacency)
        })
        .collect();

    Composition { ordered, adjacency }
}

fn link_to<R: Record>(record: &R) -> NavLink {
    let slug = record.slug().unwrap_or_default();
    NavLink {
        title: record.title().to_string(),
        url: url_for(&artifact_path(R::KIND, slug)),
    }
}

impl<'a, R: Record> Composition<'a, R> {
    /// Published records, in index order.
    pub fn records(&self) -> &[&'a R] {
        &self.ordered
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.adjacency.contains_key(&id)
    }

    /// Adjacency of a record; empty for records not in the index.
    pub fn adjacency(&self, id: RecordId) -> Adjacency {
        self.adjacency.get(&id).cloned().unwrap_or_default()
    }

    /// Split the index into pages.
    ///
    /// There is always at least one page, so an empty collection still gets
    /// an index that can show a placeholder.
    pub fn pages(&self, page_size: Option<usize>) -> Vec<IndexPage> {
        let len = self.ordered.len();
        let size = match page_size {
            Some(size) if size > 0 => size,
            _ => len.max(1),
        };
        let total = len.div_ceil(size).max(1);

        (1..=total)
            .map(|current| {
                let start = (current - 1) * size;
                let end = (start + size).min(len);
                IndexPage {
                    path: index_page_path(R::KIND, current),
                    range: start.min(len)..end,
                    pagination: Pagination {
                        current,
                        total,
                        previous: (current > 1)
                            .then(|| url_for(&index_page_path(R::KIND, current - 1))),
                        next: (current < total)
                            .then(|| url_for(&index_page_path(R::KIND, current + 1))),
                    },
                }
            })
            .collect()
    }

    /// Records listed on one page.
    pub fn page_records(&self, page: &IndexPage) -> &[&'a R] {
        &self.ordered[page.range.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentKind, Post, Project};
    use chrono::{Duration, TimeZone, Utc};

    fn published_post(title: &str, slug: &str, days: i64) -> Post {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let mut post = Post::new(title, "Ana", base + Duration::days(days));
        post.draft = false;
        post.slug = Some(slug.to_string());
        post
    }

    #[test]
    fn test_compose_filters_drafts_and_sorts_newest_first() {
        let mut draft = published_post("Draft", "draft", 10);
        draft.draft = true;
        let posts = vec![
            published_post("Old", "old", 1),
            draft,
            published_post("New", "new", 5),
            published_post("Mid", "mid", 3),
        ];

        let comp = compose(&posts);
        let titles: Vec<_> = comp.records().iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["New", "Mid", "Old"]);
        assert!(!comp.contains(posts[1].id));
    }

    #[test]
    fn test_adjacency_links_neighbours() {
        let posts = vec![
            published_post("Old", "old", 1),
            published_post("New", "new", 5),
            published_post("Mid", "mid", 3),
        ];
        let comp = compose(&posts);
        let records = comp.records();

        // Each adjacent pair links to each other in both directions
        for pair in records.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let a_adj = comp.adjacency(a.id);
            let b_adj = comp.adjacency(b.id);
            assert_eq!(a_adj.earlier.unwrap().url, format!("/blog/{}.html", b.slug.as_ref().unwrap()));
            assert_eq!(b_adj.later.unwrap().url, format!("/blog/{}.html", a.slug.as_ref().unwrap()));
        }

        let newest = comp.adjacency(records[0].id);
        assert_eq!(newest.later, None);
        let oldest = comp.adjacency(records[2].id);
        assert_eq!(oldest.earlier, None);
    }

    #[test]
    fn test_pages_unpaginated_by_default() {
        let posts: Vec<Post> = (0..5)
            .map(|i| published_post(&format!("P{i}"), &format!("p{i}"), i))
            .collect();
        let comp = compose(&posts);
        let pages = comp.pages(None);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].path, "blog/index.html");
        assert_eq!(comp.page_records(&pages[0]).len(), 5);
        assert_eq!(pages[0].pagination.next, None);
    }

    #[test]
    fn test_pages_with_page_size() {
        let posts: Vec<Post> = (0..5)
            .map(|i| published_post(&format!("P{i}"), &format!("p{i}"), i))
            .collect();
        let comp = compose(&posts);
        let pages = comp.pages(Some(2));

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[1].path, "blog/page-2.html");
        assert_eq!(comp.page_records(&pages[2]).len(), 1);
        assert_eq!(pages[0].pagination.next.as_deref(), Some("/blog/page-2.html"));
        assert_eq!(pages[1].pagination.previous.as_deref(), Some("/blog/"));
        assert_eq!(pages[2].pagination.next, None);
    }

    #[test]
    fn test_empty_collection_still_has_one_page() {
        let posts: Vec<Post> = Vec::new();
        let comp = compose(&posts);
        let pages = comp.pages(Some(10));
        assert!(comp.records().is_empty());
        assert_eq!(pages.len(), 1);
        assert!(comp.page_records(&pages[0]).is_empty());
    }

    #[test]
    fn test_projects_use_display_order() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut projects: Vec<Project> = [("Second", 2), ("First", 1), ("Third", 3)]
            .into_iter()
            .map(|(title, order)| {
                let mut p = Project::new(title, order, now);
                p.draft = false;
                p.slug = Some(title.to_lowercase());
                p
            })
            .collect();
        projects[2].draft = true;

        let comp = compose(&projects);
        let titles: Vec<_> = comp.records().iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second"]);
        assert_eq!(
            comp.adjacency(comp.records()[0].id).earlier.unwrap().url,
            "/portfolio/second.html"
        );
        assert_eq!(comp.pages(None)[0].path, index_page_path(ContentKind::Project, 1));
    }
}
