//! Page rendering.
//!
//! One function per document kind, each turning records and settings into a
//! complete document. Templates are a closed set compiled into the binary;
//! rendering never touches the filesystem or the clock, so the same inputs
//! always give the same bytes.

use serde::Serialize;
use tera::{Context, Tera};

use crate::config::SiteSettings;
use crate::content::{Post, Project, Record};
use crate::theme::ThemePalette;
use crate::util::paragraphs;

use super::index::{Adjacency, Pagination};
use super::paths::{artifact_path, image_path, url_for};

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}

const TEMPLATES: [(&str, &str); 11] = [
    ("base.html", include_str!("templates/base.html")),
    ("pagination.html", include_str!("templates/pagination.html")),
    ("home.html", include_str!("templates/home.html")),
    ("about.html", include_str!("templates/about.html")),
    ("post.html", include_str!("templates/post.html")),
    ("post_entry.html", include_str!("templates/post_entry.html")),
    ("post_index.html", include_str!("templates/post_index.html")),
    ("project.html", include_str!("templates/project.html")),
    ("project_entry.html", include_str!("templates/project_entry.html")),
    ("project_index.html", include_str!("templates/project_index.html")),
    ("style.css", include_str!("templates/style.css")),
];

const DATE_FORMAT: &str = "%B %-d, %Y";

/// The page renderer, wrapping Tera.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Create a renderer with the built-in templates.
    pub fn new() -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)?;
        Ok(Self { tera })
    }

    pub fn render_home(&self, settings: &SiteSettings) -> Result<String, RenderError> {
        let mut context = base_context(settings, "home");
        context.insert(
            "home",
            &HomeView {
                title: &settings.home_title,
                tagline: &settings.home_tagline,
                cta: &settings.home_cta,
            },
        );
        Ok(self.tera.render("home.html", &context)?)
    }

    pub fn render_about(&self, settings: &SiteSettings) -> Result<String, RenderError> {
        let mut context = base_context(settings, "about");
        context.insert(
            "about",
            &AboutView {
                title: &settings.about_title,
                paragraphs: paragraphs(&settings.about_content),
            },
        );
        Ok(self.tera.render("about.html", &context)?)
    }

    /// The shared stylesheet with the theme's variables substituted.
    pub fn render_stylesheet(&self, settings: &SiteSettings) -> Result<String, RenderError> {
        let mut context = Context::new();
        let palette: ThemePalette = settings.palette();
        context.insert("theme", &palette);
        Ok(self.tera.render("style.css", &context)?)
    }

    pub fn render_post(
        &self,
        post: &Post,
        adjacency: &Adjacency,
        settings: &SiteSettings,
    ) -> Result<String, RenderError> {
        let mut context = base_context(settings, "blog");
        context.insert("post", &PostView::new(post));
        context.insert("adjacency", adjacency);
        Ok(self.tera.render("post.html", &context)?)
    }

    /// One entry of the blog index.
    pub fn render_post_entry(&self, post: &Post) -> Result<String, RenderError> {
        let mut context = Context::new();
        context.insert("post", &PostView::new(post));
        Ok(self.tera.render("post_entry.html", &context)?)
    }

    /// A page of the blog index from pre-rendered entries.
    pub fn render_post_index(
        &self,
        entries: &[String],
        pagination: &Pagination,
        settings: &SiteSettings,
    ) -> Result<String, RenderError> {
        let mut context = base_context(settings, "blog");
        context.insert("entries", entries);
        context.insert("pagination", pagination);
        Ok(self.tera.render("post_index.html", &context)?)
    }

    pub fn render_project(
        &self,
        project: &Project,
        adjacency: &Adjacency,
        settings: &SiteSettings,
    ) -> Result<String, RenderError> {
        let mut context = base_context(settings, "portfolio");
        context.insert("project", &ProjectView::new(project));
        context.insert("adjacency", adjacency);
        Ok(self.tera.render("project.html", &context)?)
    }

    /// One card of the portfolio index.
    pub fn render_project_entry(&self, project: &Project) -> Result<String, RenderError> {
        let mut context = Context::new();
        context.insert("project", &ProjectView::new(project));
        Ok(self.tera.render("project_entry.html", &context)?)
    }

    pub fn render_project_index(
        &self,
        entries: &[String],
        pagination: &Pagination,
        settings: &SiteSettings,
    ) -> Result<String, RenderError> {
        let mut context = base_context(settings, "portfolio");
        context.insert("entries", entries);
        context.insert("pagination", pagination);
        Ok(self.tera.render("project_index.html", &context)?)
    }
}

fn base_context(settings: &SiteSettings, active: &str) -> Context {
    let mut context = Context::new();
    context.insert("site", &SiteView::new(settings));
    context.insert("active", active);
    context
}

// =============================================================================
// Template views
// =============================================================================

/// Site-level information shared by every page.
#[derive(Debug, Serialize)]
struct SiteView<'a> {
    name: &'a str,
    tagline: &'a str,
    blog_title: &'a str,
    blog_tagline: &'a str,
    portfolio_title: &'a str,
    portfolio_tagline: &'a str,
    about_title: &'a str,
    footer: String,
}

impl<'a> SiteView<'a> {
    fn new(settings: &'a SiteSettings) -> Self {
        Self {
            name: &settings.site_name,
            tagline: &settings.tagline,
            blog_title: &settings.blog_title,
            blog_tagline: &settings.blog_tagline,
            portfolio_title: &settings.portfolio_title,
            portfolio_tagline: &settings.portfolio_tagline,
            about_title: &settings.about_title,
            footer: settings.footer(),
        }
    }
}

#[derive(Debug, Serialize)]
struct HomeView<'a> {
    title: &'a str,
    tagline: &'a str,
    cta: &'a str,
}

#[derive(Debug, Serialize)]
struct AboutView<'a> {
    title: &'a str,
    paragraphs: Vec<String>,
}

#[derive(Debug, Serialize)]
struct PostView<'a> {
    title: &'a str,
    subtitle: &'a str,
    author: &'a str,
    date: String,
    body: &'a str,
    url: String,
    image: Option<String>,
}

impl<'a> PostView<'a> {
    fn new(post: &'a Post) -> Self {
        Self {
            title: &post.title,
            subtitle: &post.subtitle,
            author: &post.author,
            date: post.published_at.format(DATE_FORMAT).to_string(),
            body: &post.body,
            url: page_url(post),
            image: image_url(post),
        }
    }
}

#[derive(Debug, Serialize)]
struct ProjectView<'a> {
    title: &'a str,
    subtitle: &'a str,
    description: &'a str,
    technologies: &'a [String],
    /// External link
    url: Option<&'a str>,
    /// This project's own page
    url_path: String,
    image: Option<String>,
}

impl<'a> ProjectView<'a> {
    fn new(project: &'a Project) -> Self {
        Self {
            title: &project.title,
            subtitle: &project.subtitle,
            description: &project.description,
            technologies: &project.technologies,
            url: project.external_url(),
            url_path: page_url(project),
            image: image_url(project),
        }
    }
}

fn page_url<R: Record>(record: &R) -> String {
    url_for(&artifact_path(R::KIND, record.slug().unwrap_or_default()))
}

fn image_url<R: Record>(record: &R) -> Option<String> {
    image_path(R::KIND, &record.id(), record.image()).map(|path| url_for(&path))
}
