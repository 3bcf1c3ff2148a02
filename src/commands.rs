pub mod build;
pub mod clean;
pub mod init;
pub mod list;
pub mod new;
pub mod publish;
pub mod serve;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use webportal::build::{BatchReport, PublishError, Publisher};
use webportal::config::{SETTINGS_FILE, SiteSettings};
use webportal::content::{ContentRepository, FileRepository};

/// An opened workspace: its record store and current settings.
pub struct Workspace {
    pub repo: Arc<FileRepository>,
    pub settings: SiteSettings,
}

impl Workspace {
    /// Open an initialized workspace.
    pub fn open(path: &Path) -> Result<Self, anyhow::Error> {
        let path = absolute(path)?;
        if !path.join(SETTINGS_FILE).exists() {
            return Err(anyhow::anyhow!(
                "No {SETTINGS_FILE} found in {path}. Run `webportal init` first.",
                path = path.display()
            ));
        }

        let repo = Arc::new(FileRepository::new(path));
        let settings = repo.settings()?;
        Ok(Self { repo, settings })
    }

    pub fn output_dir(&self) -> PathBuf {
        self.settings.output_root(self.repo.base_path())
    }

    pub fn publisher(&self) -> Result<Publisher, PublishError> {
        Publisher::new(self.repo.clone(), self.output_dir())
    }
}

pub fn absolute(path: &Path) -> Result<PathBuf, anyhow::Error> {
    Ok(if path.is_relative() {
        std::env::current_dir()?.join(path)
    } else {
        path.to_path_buf()
    })
}

/// Print failed items of a batch; returns whether there were any.
pub fn print_failures(report: &BatchReport) -> bool {
    for failed in &report.failed {
        eprintln!("  failed: {} ({})", failed.path, failed.error);
    }
    !report.failed.is_empty()
}
