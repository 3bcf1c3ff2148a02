use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ContentKind, Record, RecordId};

/// A blog post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    /// Body as a markup fragment, already converted from the editor's input
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub author: String,
    /// Featured image; stored beside the record, not inside it
    #[serde(skip)]
    pub image: Option<Vec<u8>>,
    pub published_at: DateTime<Utc>,
    pub draft: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new draft post.
    pub fn new(title: impl Into<String>, author: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            subtitle: String::new(),
            body: String::new(),
            author: author.into(),
            image: None,
            published_at: now,
            draft: true,
            slug: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Record for Post {
    const KIND: ContentKind = ContentKind::Post;

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

    /// Newest first; ties broken by id.
    fn index_order(&self, other: &Self) -> Ordering {
        other
            .published_at
            .cmp(&self.published_at)
            .then_with(|| self.id.cmp(&other.id))
    }

    fn index_differs(&self, other: &Self) -> bool {
        self.title != other.title
            || self.subtitle != other.subtitle
            || self.author != other.author
            || self.published_at != other.published_at
            || self.slug != other.slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_newest_first() {
        let early = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let old = Post::new("Old", "A", early);
        let new = Post::new("New", "A", late);

        assert_eq!(new.index_order(&old), Ordering::Less);
        assert_eq!(old.index_order(&new), Ordering::Greater);
    }

    #[test]
    fn test_body_change_is_not_index_visible() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let post = Post::new("Title", "A", now);
        let mut edited = post.clone();
        edited.body = "<p>changed</p>".to_string();
        assert!(!post.index_differs(&edited));

        edited.title = "Other".to_string();
        assert!(post.index_differs(&edited));
    }
}
