//! Content repositories.
//!
//! The pipeline talks to the record store only through [`ContentRepository`].
//! [`MemoryRepository`] backs tests and embedders; [`FileRepository`] keeps one
//! JSON file per record inside a workspace directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::{SETTINGS_FILE, SettingsError, SiteSettings};

use super::{Post, Project, RecordId};

#[derive(thiserror::Error, Debug)]
pub enum RepositoryError {
    #[error("IO error on {0}: {1}")]
    Io(PathBuf, std::io::Error),

    #[error("failed to parse record {0}: {1}")]
    Parse(PathBuf, serde_json::Error),

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("repository lock poisoned")]
    Poisoned,
}

/// The capability set the publish pipeline needs from a record store.
pub trait ContentRepository: Send + Sync {
    fn list_posts(&self) -> Result<Vec<Post>, RepositoryError>;
    fn save_post(&self, post: &Post) -> Result<(), RepositoryError>;
    /// Returns whether a record was removed.
    fn remove_post(&self, id: RecordId) -> Result<bool, RepositoryError>;

    fn list_projects(&self) -> Result<Vec<Project>, RepositoryError>;
    fn save_project(&self, project: &Project) -> Result<(), RepositoryError>;
    fn remove_project(&self, id: RecordId) -> Result<bool, RepositoryError>;

    /// The settings singleton, created with defaults on first access.
    fn settings(&self) -> Result<SiteSettings, RepositoryError>;
    fn save_settings(&self, settings: &SiteSettings) -> Result<(), RepositoryError>;
}

// =============================================================================
// In-memory repository
// =============================================================================

#[derive(Debug, Default)]
struct MemoryState {
    posts: BTreeMap<RecordId, Post>,
    projects: BTreeMap<RecordId, Project>,
    settings: Option<SiteSettings>,
}

/// A repository that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: Mutex<MemoryState>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: SiteSettings) -> Self {
        let repo = Self::default();
        if let Ok(mut state) = repo.state.lock() {
            state.settings = Some(settings);
        }
        repo
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, RepositoryError> {
        self.state.lock().map_err(|_| RepositoryError::Poisoned)
    }
}

impl ContentRepository for MemoryRepository {
    fn list_posts(&self) -> Result<Vec<Post>, RepositoryError> {
        Ok(self.state()?.posts.values().cloned().collect())
    }

    fn save_post(&self, post: &Post) -> Result<(), RepositoryError> {
        self.state()?.posts.insert(post.id, post.clone());
        Ok(())
    }

    fn remove_post(&self, id: RecordId) -> Result<bool, RepositoryError> {
        Ok(self.state()?.posts.remove(&id).is_some())
    }

    fn list_projects(&self) -> Result<Vec<Project>, RepositoryError> {
        Ok(self.state()?.projects.values().cloned().collect())
    }

    fn save_project(&self, project: &Project) -> Result<(), RepositoryError> {
        self.state()?.projects.insert(project.id, project.clone());
        Ok(())
    }

    fn remove_project(&self, id: RecordId) -> Result<bool, RepositoryError> {
        Ok(self.state()?.projects.remove(&id).is_some())
    }

    fn settings(&self) -> Result<SiteSettings, RepositoryError> {
        let mut state = self.state()?;
        Ok(state.settings.get_or_insert_with(SiteSettings::default).clone())
    }

    fn save_settings(&self, settings: &SiteSettings) -> Result<(), RepositoryError> {
        self.state()?.settings = Some(settings.clone());
        Ok(())
    }
}

// =============================================================================
// File-backed repository
// =============================================================================

/// A repository storing records as JSON files inside a workspace.
///
/// Layout:
/// ```text
/// portal.json
/// content/posts/<id>.json      (+ <id>.image when the post has an image)
/// content/projects/<id>.json   (+ <id>.image)
/// ```
#[derive(Debug, Clone)]
pub struct FileRepository {
    base_path: PathBuf,
}

impl FileRepository {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Create the content directories if they don't exist yet.
    pub fn init(&self) -> Result<(), RepositoryError> {
        for dir in [self.posts_dir(), self.projects_dir()] {
            std::fs::create_dir_all(&dir).map_err(|e| RepositoryError::Io(dir.clone(), e))?;
        }
        Ok(())
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn settings_path(&self) -> PathBuf {
        self.base_path.join(SETTINGS_FILE)
    }

    fn posts_dir(&self) -> PathBuf {
        self.base_path.join("content/posts")
    }

    fn projects_dir(&self) -> PathBuf {
        self.base_path.join("content/projects")
    }
}

/// Read every `*.json` record in a directory, attaching sidecar images.
fn read_records<T, F>(dir: &Path, attach_image: F) -> Result<Vec<T>, RepositoryError>
where
    T: DeserializeOwned,
    F: Fn(&mut T, Vec<u8>),
{
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(dir).map_err(|e| RepositoryError::Io(dir.to_path_buf(), e))?;
    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|e| e == "json"))
        .collect();
    paths.sort();

    let mut records = Vec::with_capacity(paths.len());
    for path in paths {
        let content =
            std::fs::read_to_string(&path).map_err(|e| RepositoryError::Io(path.clone(), e))?;
        let mut record: T =
            serde_json::from_str(&content).map_err(|e| RepositoryError::Parse(path.clone(), e))?;

        let image_path = path.with_extension("image");
        if image_path.exists() {
            let bytes =
                std::fs::read(&image_path).map_err(|e| RepositoryError::Io(image_path.clone(), e))?;
            attach_image(&mut record, bytes);
        }
        records.push(record);
    }

    debug!(dir = %dir.display(), count = records.len(), "records loaded");
    Ok(records)
}

fn write_record<T: Serialize>(
    dir: &Path,
    id: RecordId,
    record: &T,
    image: Option<&[u8]>,
) -> Result<(), RepositoryError> {
    std::fs::create_dir_all(dir).map_err(|e| RepositoryError::Io(dir.to_path_buf(), e))?;

    let path = dir.join(format!("{id}.json"));
    let json = serde_json::to_string_pretty(record)?;
    std::fs::write(&path, json).map_err(|e| RepositoryError::Io(path.clone(), e))?;

    let image_path = path.with_extension("image");
    match image {
        Some(bytes) => {
            std::fs::write(&image_path, bytes).map_err(|e| RepositoryError::Io(image_path, e))?
        }
        None => remove_if_exists(&image_path)?,
    }
    Ok(())
}

fn remove_record(dir: &Path, id: RecordId) -> Result<bool, RepositoryError> {
    let path = dir.join(format!("{id}.json"));
    let existed = path.exists();
    remove_if_exists(&path)?;
    remove_if_exists(&path.with_extension("image"))?;
    Ok(existed)
}

fn remove_if_exists(path: &Path) -> Result<(), RepositoryError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(RepositoryError::Io(path.to_path_buf(), e)),
    }
}

impl ContentRepository for FileRepository {
    fn list_posts(&self) -> Result<Vec<Post>, RepositoryError> {
        read_records(&self.posts_dir(), |post: &mut Post, bytes| {
            post.image = Some(bytes)
        })
    }

    fn save_post(&self, post: &Post) -> Result<(), RepositoryError> {
        write_record(&self.posts_dir(), post.id, post, post.image.as_deref())
    }

    fn remove_post(&self, id: RecordId) -> Result<bool, RepositoryError> {
        remove_record(&self.posts_dir(), id)
    }

    fn list_projects(&self) -> Result<Vec<Project>, RepositoryError> {
        read_records(&self.projects_dir(), |project: &mut Project, bytes| {
            project.image = Some(bytes)
        })
    }

    fn save_project(&self, project: &Project) -> Result<(), RepositoryError> {
        write_record(&self.projects_dir(), project.id, project, project.image.as_deref())
    }

    fn remove_project(&self, id: RecordId) -> Result<bool, RepositoryError> {
        remove_record(&self.projects_dir(), id)
    }

    fn settings(&self) -> Result<SiteSettings, RepositoryError> {
        match SiteSettings::load_or_create(&self.settings_path()) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                warn!(error = %e, "failed to load settings");
                Err(e.into())
            }
        }
    }

    fn save_settings(&self, settings: &SiteSettings) -> Result<(), RepositoryError> {
        Ok(settings.save(&self.settings_path())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 0).unwrap()
    }

    #[test]
    fn test_memory_repository_settings_default_on_first_access() {
        let repo = MemoryRepository::new();
        let settings = repo.settings().unwrap();
        assert_eq!(settings, SiteSettings::default());
    }

    #[test]
    fn test_file_repository_round_trips_post_with_image() {
        let temp = TempDir::new().unwrap();
        let repo = FileRepository::new(temp.path());
        repo.init().unwrap();

        let mut post = Post::new("Hello", "Ana", now());
        post.image = Some(vec![1, 2, 3]);
        repo.save_post(&post).unwrap();

        let posts = repo.list_posts().unwrap();
        assert_eq!(posts, vec![post.clone()]);

        post.image = None;
        repo.save_post(&post).unwrap();
        assert!(!temp.path().join(format!("content/posts/{}.image", post.id)).exists());

        assert!(repo.remove_post(post.id).unwrap());
        assert!(!repo.remove_post(post.id).unwrap());
        assert!(repo.list_posts().unwrap().is_empty());
    }

    #[test]
    fn test_file_repository_projects_and_settings() {
        let temp = TempDir::new().unwrap();
        let repo = FileRepository::new(temp.path());

        assert!(repo.list_projects().unwrap().is_empty());

        let mut project = Project::new("Orrery", 2, now());
        project.technologies = vec!["Rust".to_string(), "WebGL".to_string()];
        repo.save_project(&project).unwrap();
        assert_eq!(repo.list_projects().unwrap(), vec![project]);

        let mut settings = repo.settings().unwrap();
        assert!(repo.settings_path().exists());
        settings.site_name = "Studio".to_string();
        repo.save_settings(&settings).unwrap();
        assert_eq!(repo.settings().unwrap().site_name, "Studio");
    }
}
