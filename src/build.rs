mod index;
pub mod paths;
mod publisher;
mod render;
pub mod slug;
mod writer;

pub use index::{Adjacency, Composition, IndexPage, NavLink, Pagination, compose};
pub use publisher::{PublishError, Publishable, Publisher};
pub use render::{RenderError, Renderer};
pub use slug::{SlugError, resolve_slug, slugify};
pub use writer::{Batch, BatchReport, FailedItem, SiteWriter, WriteError};
