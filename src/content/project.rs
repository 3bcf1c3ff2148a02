use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ContentKind, Record, RecordId};

/// A portfolio project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    /// Description as a markup fragment
    #[serde(default)]
    pub description: String,
    /// Technology tags, in display order
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip)]
    pub image: Option<Vec<u8>>,
    #[serde(default)]
    pub display_order: i64,
    pub draft: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a new draft project.
    pub fn new(title: impl Into<String>, display_order: i64, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            subtitle: String::new(),
            description: String::new(),
            technologies: Vec::new(),
            url: None,
            image: None,
            display_order,
            draft: true,
            slug: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The external link, only when it is an http(s) URL.
    pub fn external_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|url| url.starts_with("https://") || url.starts_with("http://"))
    }
}

impl Record for Project {
    const KIND: ContentKind = ContentKind::Project;

    fn id(&self) -> RecordId {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn slug(&self) -> Option<&str> {
        self.slug.as_deref()
    }

    fn set_slug(&mut self, slug: Option<String>) {
        self.slug = slug;
    }

    fn is_draft(&self) -> bool {
        self.draft
    }

    fn set_draft(&mut self, draft: bool) {
        self.draft = draft;
    }

    fn image(&self) -> Option<&[u8]> {
        self.image.as_deref()
    }

    /// Display order ascending, then creation time, then id.
    fn index_order(&self, other: &Self) -> Ordering {
        self.display_order
            .cmp(&other.display_order)
            .then_with(|| self.created_at.cmp(&other.created_at))
            .then_with(|| self.id.cmp(&other.id))
    }

    fn index_differs(&self, other: &Self) -> bool {
        self.title != other.title
            || self.subtitle != other.subtitle
            || self.technologies != other.technologies
            || self.display_order != other.display_order
            || self.created_at != other.created_at
            || self.image.is_some() != other.image.is_some()
            || self.slug != other.slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_order_then_creation() {
        let first = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();

        let a = Project::new("A", 1, second);
        let b = Project::new("B", 1, first);
        let c = Project::new("C", 0, second);

        let mut projects = vec![a.clone(), b.clone(), c.clone()];
        projects.sort_by(|x, y| x.index_order(y));
        let titles: Vec<_> = projects.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_external_url_requires_http() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut project = Project::new("A", 0, now);
        project.url = Some("javascript:alert(1)".to_string());
        assert_eq!(project.external_url(), None);
        project.url = Some(" https://example.com ".to_string());
        assert_eq!(project.external_url(), Some("https://example.com"));
    }
}
