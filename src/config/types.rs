//! Site settings type definitions.
//!
//! These types are pure data - no I/O. Loading and saving lives in `load`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::theme::{Theme, ThemePalette};

// =============================================================================
// Site settings
// =============================================================================

/// The singleton settings record for a site.
///
/// Every field has a documented default so a partially written settings
/// file still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    pub site_name: String,
    pub tagline: String,
    pub author: String,
    pub theme: Theme,
    /// Accent colour as `#RGB` or `#RRGGBB`; invalid values fall back to the theme accent
    pub accent_color: String,

    pub home_title: String,
    pub home_tagline: String,
    /// Label of the call-to-action button on the home page
    pub home_cta: String,

    pub blog_title: String,
    pub blog_tagline: String,

    pub about_title: String,
    /// Plain text; blank lines separate paragraphs
    pub about_content: String,

    pub portfolio_title: String,
    pub portfolio_tagline: String,

    /// Optional footer line, defaults to "© <site name>"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer_text: Option<String>,

    /// Where the generated tree is written, relative to the workspace
    pub output_dir: PathBuf,

    /// Address the preview server binds to
    pub host: String,
    pub server_port: u16,

    /// Entries per index page; unset means a single unpaginated index
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,

    /// What `GET /` serves
    pub home_page: HomePage,
}

/// Which document the site root serves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HomePage {
    /// The generated landing page (`index.html`)
    #[default]
    Landing,
    /// The blog index (`blog/index.html`)
    Blog,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_name: "NG Web Portal".to_string(),
            tagline: "Welcome to my website".to_string(),
            author: "John Q Public".to_string(),
            theme: Theme::default(),
            accent_color: "#007AFF".to_string(),
            home_title: "Your Site, Your Way".to_string(),
            home_tagline: "Share your thoughts, stories, and ideas with the world.".to_string(),
            home_cta: "Read the Blog".to_string(),
            blog_title: "Blog".to_string(),
            blog_tagline: "Thoughts, stories, and ideas".to_string(),
            about_title: "About Me".to_string(),
            about_content: "This is your about page. Edit it to tell your story!".to_string(),
            portfolio_title: "Portfolio".to_string(),
            portfolio_tagline: "Selected work and projects".to_string(),
            footer_text: None,
            output_dir: default_output(),
            host: default_host(),
            server_port: 8080,
            page_size: None,
            home_page: HomePage::default(),
        }
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("_site")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

impl SiteSettings {
    /// Theme colours with the accent override applied.
    pub fn palette(&self) -> ThemePalette {
        self.theme.palette(&self.accent_color)
    }

    pub fn footer(&self) -> String {
        self.footer_text
            .clone()
            .unwrap_or_else(|| format!("© {}", self.site_name))
    }

    /// Page size for indices; zero is treated as unpaginated.
    pub fn effective_page_size(&self) -> Option<usize> {
        self.page_size.filter(|size| *size > 0)
    }

    /// The output directory, resolved against the workspace directory.
    pub fn output_root(&self, base_path: &Path) -> PathBuf {
        if self.output_dir.is_relative() {
            base_path.join(&self.output_dir)
        } else {
            self.output_dir.clone()
        }
    }
}
