//! Publish orchestration.
//!
//! Sequences slug resolution, rendering, index composition and tree writes
//! in response to content mutations. Operations on one record kind are
//! serialised through a per-kind lock, so a delete and a publish touching
//! the same index never interleave their writes.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::SiteSettings;
use crate::content::{
    ContentKind, ContentRepository, Post, Project, Record, RecordId, RepositoryError, short_id,
};

use super::index::{Adjacency, Composition, Pagination, compose};
use super::paths::{
    ABOUT_PAGE, HOME_PAGE, IMAGES_DIR, STYLESHEET, artifact_path, image_path, index_page_path,
    is_index_page,
};
use super::render::{RenderError, Renderer};
use super::slug::{SlugError, resolve_slug};
use super::writer::{Batch, BatchReport, FailedItem, SiteWriter};

#[derive(thiserror::Error, Debug)]
pub enum PublishError {
    #[error(transparent)]
    SlugCollisionUnresolved(#[from] SlugError),

    #[error("failed to update {} output file(s)", .report.failed.len())]
    FileSystem { report: BatchReport },

    #[error("{kind} {id} not found")]
    NotFound { kind: ContentKind, id: RecordId },

    #[error("{kind} {id} is already published")]
    NotDraft { kind: ContentKind, id: RecordId },

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("output task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A record kind the orchestrator can publish.
///
/// Bridges the generic pipeline to the kind-specific repository and
/// renderer calls.
pub trait Publishable: Record {
    fn load_all(repo: &dyn ContentRepository) -> Result<Vec<Self>, RepositoryError>;
    fn store(&self, repo: &dyn ContentRepository) -> Result<(), RepositoryError>;
    fn discard(id: RecordId, repo: &dyn ContentRepository) -> Result<bool, RepositoryError>;

    fn render_page(
        &self,
        renderer: &Renderer,
        adjacency: &Adjacency,
        settings: &SiteSettings,
    ) -> Result<String, RenderError>;

    fn render_entry(&self, renderer: &Renderer) -> Result<String, RenderError>;

    fn render_index(
        renderer: &Renderer,
        entries: &[String],
        pagination: &Pagination,
        settings: &SiteSettings,
    ) -> Result<String, RenderError>;
}

impl Publishable for Post {
    fn load_all(repo: &dyn ContentRepository) -> Result<Vec<Self>, RepositoryError> {
        repo.list_posts()
    }

    fn store(&self, repo: &dyn ContentRepository) -> Result<(), RepositoryError> {
        repo.save_post(self)
    }

    fn discard(id: RecordId, repo: &dyn ContentRepository) -> Result<bool, RepositoryError> {
        repo.remove_post(id)
    }

    fn render_page(
        &self,
        renderer: &Renderer,
        adjacency: &Adjacency,
        settings: &SiteSettings,
    ) -> Result<String, RenderError> {
        renderer.render_post(self, adjacency, settings)
    }

    fn render_entry(&self, renderer: &Renderer) -> Result<String, RenderError> {
        renderer.render_post_entry(self)
    }

    fn render_index(
        renderer: &Renderer,
        entries: &[String],
        pagination: &Pagination,
        settings: &SiteSettings,
    ) -> Result<String, RenderError> {
        renderer.render_post_index(entries, pagination, settings)
    }
}

impl Publishable for Project {
    fn load_all(repo: &dyn ContentRepository) -> Result<Vec<Self>, RepositoryError> {
        repo.list_projects()
    }

    fn store(&self, repo: &dyn ContentRepository) -> Result<(), RepositoryError> {
        repo.save_project(self)
    }

    fn discard(id: RecordId, repo: &dyn ContentRepository) -> Result<bool, RepositoryError> {
        repo.remove_project(id)
    }

    fn render_page(
        &self,
        renderer: &Renderer,
        adjacency: &Adjacency,
        settings: &SiteSettings,
    ) -> Result<String, RenderError> {
        renderer.render_project(self, adjacency, settings)
    }

    fn render_entry(&self, renderer: &Renderer) -> Result<String, RenderError> {
        renderer.render_project_entry(self)
    }

    fn render_index(
        renderer: &Renderer,
        entries: &[String],
        pagination: &Pagination,
        settings: &SiteSettings,
    ) -> Result<String, RenderError> {
        renderer.render_project_index(entries, pagination, settings)
    }
}

pub struct Publisher {
    repo: Arc<dyn ContentRepository>,
    renderer: Renderer,
    writer: SiteWriter,
    /// Guards the site-wide files (home, about, stylesheet)
    site_lock: Mutex<()>,
    posts_lock: Mutex<()>,
    projects_lock: Mutex<()>,
}

impl Publisher {
    pub fn new(
        repo: Arc<dyn ContentRepository>,
        output_root: impl Into<PathBuf>,
    ) -> Result<Self, PublishError> {
        Ok(Self {
            repo,
            renderer: Renderer::new()?,
            writer: SiteWriter::new(output_root),
            site_lock: Mutex::new(()),
            posts_lock: Mutex::new(()),
            projects_lock: Mutex::new(()),
        })
    }

    pub fn output_root(&self) -> &std::path::Path {
        self.writer.root()
    }

    pub fn repository(&self) -> &dyn ContentRepository {
        self.repo.as_ref()
    }

    /// Apply a batch on the blocking pool.
    async fn apply(&self, batch: Batch) -> Result<BatchReport, PublishError> {
        let writer = self.writer.clone();
        Ok(tokio::task::spawn_blocking(move || writer.apply(batch)).await?)
    }

    fn kind_lock(&self, kind: ContentKind) -> &Mutex<()> {
        match kind {
            ContentKind::Post => &self.posts_lock,
            ContentKind::Project => &self.projects_lock,
        }
    }

    /// Publish a draft.
    ///
    /// The record's own page is written first; if that fails the record
    /// stays a draft and nothing else is touched. Failures while updating
    /// the index or neighbouring pages are reported in the returned report.
    pub async fn publish<R: Publishable>(&self, id: RecordId) -> Result<BatchReport, PublishError> {
        let _guard = self.kind_lock(R::KIND).lock().await;
        let settings = self.repo.settings()?;
        let records = R::load_all(self.repo.as_ref())?;

        let mut record = find(&records, id)?.clone();
        if !record.is_draft() {
            return Err(PublishError::NotDraft { kind: R::KIND, id });
        }

        let taken: HashSet<String> = records
            .iter()
            .filter(|r| r.is_published() && r.id() != id)
            .filter_map(|r| r.slug().map(str::to_string))
            .collect();
        let slug = resolve_slug(record.title(), &taken, &short_id(&id))?;
        record.set_slug(Some(slug.clone()));
        record.set_draft(false);

        let after = replaced(&records, &record);
        let before_comp = compose(&records);
        let after_comp = compose(&after);

        let mut own = Batch::new();
        own.write(
            artifact_path(R::KIND, &slug),
            record.render_page(&self.renderer, &after_comp.adjacency(id), &settings)?,
        );
        if let (Some(path), Some(bytes)) = (image_path(R::KIND, &id, record.image()), record.image()) {
            own.write(path, bytes);
        }

        let mut report = self.apply(own.clone()).await?;
        if !report.is_complete() {
            warn!(kind = %R::KIND, %id, "publish aborted, record left as draft");
            return Err(PublishError::FileSystem { report });
        }

        if let Err(e) = record.store(self.repo.as_ref()) {
            // Don't leave a page behind for a record the store still calls a draft
            let mut undo = Batch::new();
            for path in own.writes() {
                undo.delete(path);
            }
            self.apply(undo).await?;
            return Err(e.into());
        }

        let mut batch = self.index_batch(&after_comp, &settings)?;
        batch.extend(self.neighbour_batch(&before_comp, &after_comp, Some(id), &settings)?);
        report.merge(self.apply(batch).await?);
        report.merge(self.scaffold(R::KIND, &settings).await?);

        info!(kind = %R::KIND, %id, slug = %slug, failed = report.failed.len(), "published");
        Ok(report)
    }

    /// Store an edited record and refresh whatever pages it affects.
    ///
    /// Drafts are only stored. For a published record the frozen slug and
    /// published state are kept whatever the incoming record says; the
    /// index and neighbouring pages are only re-rendered when an
    /// index-visible field changed.
    pub async fn update<R: Publishable>(&self, mut record: R) -> Result<BatchReport, PublishError> {
        let _guard = self.kind_lock(R::KIND).lock().await;
        let id = record.id();
        let records = R::load_all(self.repo.as_ref())?;
        let old = find(&records, id)?.clone();

        if !old.is_published() {
            record.set_draft(true);
            record.store(self.repo.as_ref())?;
            debug!(kind = %R::KIND, %id, "draft updated");
            return Ok(BatchReport::default());
        }

        record.set_slug(old.slug().map(str::to_string));
        record.set_draft(false);
        record.store(self.repo.as_ref())?;

        let settings = self.repo.settings()?;
        let after = replaced(&records, &record);
        let before_comp = compose(&records);
        let after_comp = compose(&after);

        let mut batch = Batch::new();
        batch.write(
            artifact_path(R::KIND, record.slug().unwrap_or_default()),
            record.render_page(&self.renderer, &after_comp.adjacency(id), &settings)?,
        );

        let old_image = image_path(R::KIND, &id, old.image());
        let new_image = image_path(R::KIND, &id, record.image());
        if let (Some(path), Some(bytes)) = (&new_image, record.image())
            && old.image() != record.image()
        {
            batch.write(path.clone(), bytes);
        }
        let image_moved = old_image != new_image;
        if let Some(path) = old_image.filter(|p| Some(p) != new_image.as_ref()) {
            batch.delete(path);
        }

        let index_missing = !self.writer.exists(&index_page_path(R::KIND, 1));
        if old.index_differs(&record) || image_moved || index_missing {
            batch.extend(self.index_batch(&after_comp, &settings)?);
            batch.extend(self.neighbour_batch(&before_comp, &after_comp, Some(id), &settings)?);
        }

        let report = self.apply(batch).await?;
        info!(kind = %R::KIND, %id, written = report.written.len(), "updated");
        Ok(report)
    }

    /// Take a published record off the site and return it to draft.
    ///
    /// The store is only changed once every file operation succeeded, so a
    /// failed unpublish can simply be retried.
    pub async fn unpublish<R: Publishable>(&self, id: RecordId) -> Result<BatchReport, PublishError> {
        let _guard = self.kind_lock(R::KIND).lock().await;
        let records = R::load_all(self.repo.as_ref())?;
        let old = find(&records, id)?.clone();
        if !old.is_published() {
            return Ok(BatchReport::default());
        }

        let mut record = old.clone();
        record.set_draft(true);
        let after = replaced(&records, &record);

        let report = self.withdraw(&old, &records, &after).await?;
        record.store(self.repo.as_ref())?;
        info!(kind = %R::KIND, %id, "unpublished");
        Ok(report)
    }

    /// Remove a record from the site and from the store.
    ///
    /// The record leaves the store first. If its files can't then be
    /// withdrawn it is stored again, so a failed delete never leaves a
    /// published record without its page.
    pub async fn delete<R: Publishable>(&self, id: RecordId) -> Result<BatchReport, PublishError> {
        let _guard = self.kind_lock(R::KIND).lock().await;
        let records = R::load_all(self.repo.as_ref())?;
        let old = find(&records, id)?.clone();

        R::discard(id, self.repo.as_ref())?;
        if !old.is_published() {
            info!(kind = %R::KIND, %id, "draft deleted");
            return Ok(BatchReport::default());
        }

        let after: Vec<R> = records.iter().filter(|r| r.id() != id).cloned().collect();
        match self.withdraw(&old, &records, &after).await {
            Ok(report) => {
                info!(kind = %R::KIND, %id, "deleted");
                Ok(report)
            }
            Err(e) => {
                if let Err(restore) = old.store(self.repo.as_ref()) {
                    warn!(kind = %R::KIND, %id, error = %restore, "could not restore record after failed delete");
                }
                Err(e)
            }
        }
    }

    /// Rebuild every page of the site from the current records.
    ///
    /// Best effort: individual failures end up in the report instead of
    /// aborting the sweep. Files in generated directories that are not part
    /// of the new output are removed.
    pub async fn regenerate_all(&self) -> Result<BatchReport, PublishError> {
        let _site = self.site_lock.lock().await;
        let _posts = self.posts_lock.lock().await;
        let _projects = self.projects_lock.lock().await;

        let settings = self.repo.settings()?;
        let mut batch = self.site_batch(&settings)?;
        batch.extend(self.kind_batch::<Post>(&settings)?);
        batch.extend(self.kind_batch::<Project>(&settings)?);

        let keep: HashSet<String> = batch.writes().map(str::to_string).collect();
        let mut report = BatchReport::default();
        for dir in [
            ContentKind::Post.section_dir(),
            ContentKind::Project.section_dir(),
            IMAGES_DIR,
        ] {
            match self.writer.stale_files(dir, &keep) {
                Ok(stale) => {
                    for path in stale {
                        batch.delete(path);
                    }
                }
                Err(e) => report.failed.push(FailedItem {
                    path: dir.to_string(),
                    error: e.to_string(),
                }),
            }
        }

        report.merge(self.apply(batch).await?);
        info!(
            written = report.written.len(),
            removed = report.removed.len(),
            failed = report.failed.len(),
            "site regenerated"
        );
        Ok(report)
    }

    /// Save new settings and rebuild the whole site with them.
    pub async fn update_settings(&self, settings: &SiteSettings) -> Result<BatchReport, PublishError> {
        self.repo.save_settings(settings)?;
        self.regenerate_all().await
    }

    /// Delete a record's files and refresh the index and neighbours.
    ///
    /// Fails with the report if any file operation failed.
    async fn withdraw<R: Publishable>(
        &self,
        old: &R,
        before: &[R],
        after: &[R],
    ) -> Result<BatchReport, PublishError> {
        let settings = self.repo.settings()?;
        let before_comp = compose(before);
        let after_comp = compose(after);

        let mut batch = self.index_batch(&after_comp, &settings)?;
        batch.extend(self.neighbour_batch(&before_comp, &after_comp, None, &settings)?);
        batch.delete(artifact_path(R::KIND, old.slug().unwrap_or_default()));
        if let Some(path) = image_path(R::KIND, &old.id(), old.image()) {
            batch.delete(path);
        }

        let report = self.apply(batch).await?;
        if !report.is_complete() {
            warn!(kind = %R::KIND, id = %old.id(), "withdraw incomplete");
            return Err(PublishError::FileSystem { report });
        }
        Ok(report)
    }

    /// All index pages of one kind, plus deletes for pages past the end.
    fn index_batch<R: Publishable>(
        &self,
        composition: &Composition<'_, R>,
        settings: &SiteSettings,
    ) -> Result<Batch, PublishError> {
        let mut batch = Batch::new();
        let pages = composition.pages(settings.effective_page_size());

        for page in &pages {
            let entries = composition
                .page_records(page)
                .iter()
                .map(|r| r.render_entry(&self.renderer))
                .collect::<Result<Vec<_>, _>>()?;
            let html = R::render_index(&self.renderer, &entries, &page.pagination, settings)?;
            batch.write(page.path.clone(), html);
        }

        let keep: HashSet<String> = pages.into_iter().map(|p| p.path).collect();
        match self.writer.stale_files(R::KIND.section_dir(), &keep) {
            Ok(stale) => {
                for path in stale.into_iter().filter(|p| is_index_page(R::KIND, p)) {
                    batch.delete(path);
                }
            }
            Err(e) => warn!(kind = %R::KIND, error = %e, "could not list old index pages"),
        }
        Ok(batch)
    }

    /// Pages whose earlier/later links changed between two compositions.
    fn neighbour_batch<R: Publishable>(
        &self,
        before: &Composition<'_, R>,
        after: &Composition<'_, R>,
        skip: Option<RecordId>,
        settings: &SiteSettings,
    ) -> Result<Batch, PublishError> {
        let mut batch = Batch::new();
        for record in after.records() {
            let id = record.id();
            if Some(id) == skip {
                continue;
            }
            let adjacency = after.adjacency(id);
            if before.contains(id) && before.adjacency(id) == adjacency {
                continue;
            }
            batch.write(
                artifact_path(R::KIND, record.slug().unwrap_or_default()),
                record.render_page(&self.renderer, &adjacency, settings)?,
            );
        }
        Ok(batch)
    }

    /// Every page, image and index page of one kind.
    fn kind_batch<R: Publishable>(&self, settings: &SiteSettings) -> Result<Batch, PublishError> {
        let records = R::load_all(self.repo.as_ref())?;
        let composition = compose(&records);

        let mut batch = Batch::new();
        for record in composition.records() {
            let id = record.id();
            batch.write(
                artifact_path(R::KIND, record.slug().unwrap_or_default()),
                record.render_page(&self.renderer, &composition.adjacency(id), settings)?,
            );
            if let (Some(path), Some(bytes)) = (image_path(R::KIND, &id, record.image()), record.image()) {
                batch.write(path, bytes);
            }
        }
        batch.extend(self.index_batch(&composition, settings)?);
        Ok(batch)
    }

    /// Home page, about page and stylesheet.
    fn site_batch(&self, settings: &SiteSettings) -> Result<Batch, PublishError> {
        let mut batch = Batch::new();
        batch.write(STYLESHEET, self.renderer.render_stylesheet(settings)?);
        batch.write(HOME_PAGE, self.renderer.render_home(settings)?);
        batch.write(ABOUT_PAGE, self.renderer.render_about(settings)?);
        Ok(batch)
    }

    /// Write site files missing from the output, so a first publish yields
    /// a navigable site.
    ///
    /// Only takes locks that are free right now; whoever holds a lock
    /// writes those files itself. Each lock is held until its files are on
    /// disk.
    async fn scaffold(&self, current: ContentKind, settings: &SiteSettings) -> Result<BatchReport, PublishError> {
        let mut report = BatchReport::default();

        let site_missing = [STYLESHEET, HOME_PAGE, ABOUT_PAGE]
            .iter()
            .any(|path| !self.writer.exists(path));
        if site_missing && let Ok(_site) = self.site_lock.try_lock() {
            report.merge(self.apply(self.site_batch(settings)?).await?);
        }

        let other = match current {
            ContentKind::Post => ContentKind::Project,
            ContentKind::Project => ContentKind::Post,
        };
        if !self.writer.exists(&index_page_path(other, 1))
            && let Ok(_other) = self.kind_lock(other).try_lock()
        {
            let other_batch = match other {
                ContentKind::Post => {
                    let posts = Post::load_all(self.repo.as_ref())?;
                    self.index_batch(&compose(&posts), settings)?
                }
                ContentKind::Project => {
                    let projects = Project::load_all(self.repo.as_ref())?;
                    self.index_batch(&compose(&projects), settings)?
                }
            };
            report.merge(self.apply(other_batch).await?);
        }
        Ok(report)
    }
}

fn find<R: Record>(records: &[R], id: RecordId) -> Result<&R, PublishError> {
    records
        .iter()
        .find(|r| r.id() == id)
        .ok_or(PublishError::NotFound { kind: R::KIND, id })
}

/// `records` with the entry sharing `record`'s id swapped for `record`.
fn replaced<R: Record>(records: &[R], record: &R) -> Vec<R> {
    records
        .iter()
        .map(|r| if r.id() == record.id() { record.clone() } else { r.clone() })
        .collect()
}
