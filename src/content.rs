//! Content records consumed by the publish pipeline.
//!
//! Records come from an external content provider through the
//! [`ContentRepository`] trait; the pipeline only ever sees finalized field
//! values.

mod markup;
mod post;
mod project;
mod repository;

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use markup::{MarkupConverter, ParagraphConverter};
pub use post::Post;
pub use project::Project;
pub use repository::{ContentRepository, FileRepository, MemoryRepository, RepositoryError};

/// Stable, immutable identifier of a record.
pub type RecordId = Uuid;

/// The kinds of records that produce pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Post,
    Project,
}

impl ContentKind {
    /// Directory of the generated tree holding this kind's pages.
    pub fn section_dir(&self) -> &'static str {
        match self {
            ContentKind::Post => "blog",
            ContentKind::Project => "portfolio",
        }
    }

    /// Prefix used in image file names, e.g. `images/post-<id>.png`.
    pub fn image_prefix(&self) -> &'static str {
        match self {
            ContentKind::Post => "post",
            ContentKind::Project => "project",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.image_prefix())
    }
}

/// Behaviour shared by every publishable record kind.
pub trait Record: Clone + Send + Sync + 'static {
    const KIND: ContentKind;

    fn id(&self) -> RecordId;
    fn title(&self) -> &str;

    /// Frozen filename stem; only meaningful while published.
    fn slug(&self) -> Option<&str>;
    fn set_slug(&mut self, slug: Option<String>);

    fn is_draft(&self) -> bool;
    fn set_draft(&mut self, draft: bool);

    fn image(&self) -> Option<&[u8]>;

    /// Whether the record shows up in indices and may be linked to.
    fn is_published(&self) -> bool {
        !self.is_draft() && self.slug().is_some()
    }

    /// Index ordering for this kind. Must be total so output is deterministic.
    fn index_order(&self, other: &Self) -> Ordering;

    /// Whether any field rendered into (or sorting) the index differs.
    fn index_differs(&self, other: &Self) -> bool;
}

/// Short form of an id used as a slug fallback and disambiguator.
pub fn short_id(id: &RecordId) -> String {
    id.simple().to_string()[..8].to_string()
}
