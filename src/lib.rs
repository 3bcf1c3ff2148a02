//! Publish a personal blog and portfolio as a static site, and preview it
//! with a small local file server.

pub mod build;
pub mod config;
pub mod content;
pub mod server;
pub mod theme;
pub mod util;

pub use build::{BatchReport, PublishError, Publisher};
pub use config::{HomePage, SiteSettings};
pub use content::{ContentKind, ContentRepository, FileRepository, MemoryRepository, Post, Project};
pub use server::{ServerConfig, SiteServer};
pub use theme::Theme;
