//! Site tree writing.
//!
//! Applies a batch of writes and deletes to the output directory. Writes go
//! to a temporary sibling first and are renamed over the target, so the
//! preview server never reads a half-written file.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use super::paths::output_file;

#[derive(thiserror::Error, Debug)]
pub enum WriteError {
    #[error("invalid output path '{0}'")]
    InvalidPath(String),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WriteError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A set of writes and deletes, relative to the output root.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Batch {
    writes: Vec<(String, Vec<u8>)>,
    deletes: Vec<String>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a write. A later write to the same path replaces the earlier one.
    pub fn write(&mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) -> &mut Self {
        let path = path.into();
        let contents = contents.into();
        self.deletes.retain(|p| *p != path);
        match self.writes.iter_mut().find(|(p, _)| *p == path) {
            Some(existing) => existing.1 = contents,
            None => self.writes.push((path, contents)),
        }
        self
    }

    /// Queue a delete, unless the same batch writes that path.
    pub fn delete(&mut self, path: impl Into<String>) -> &mut Self {
        let path = path.into();
        if !self.writes.iter().any(|(p, _)| *p == path) && !self.deletes.contains(&path) {
            self.deletes.push(path);
        }
        self
    }

    pub fn extend(&mut self, other: Batch) -> &mut Self {
        for (path, contents) in other.writes {
            self.write(path, contents);
        }
        for path in other.deletes {
            self.delete(path);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty() && self.deletes.is_empty()
    }

    pub fn writes(&self) -> impl Iterator<Item = &str> {
        self.writes.iter().map(|(p, _)| p.as_str())
    }

    pub fn deletes(&self) -> impl Iterator<Item = &str> {
        self.deletes.iter().map(String::as_str)
    }
}

/// A batch item that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedItem {
    pub path: String,
    pub error: String,
}

/// Per-item outcome of applying one or more batches.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub written: Vec<String>,
    pub removed: Vec<String>,
    pub failed: Vec<FailedItem>,
}

impl BatchReport {
    /// Whether every item in the batch succeeded.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn has_failed(&self, path: &str) -> bool {
        self.failed.iter().any(|f| f.path == path)
    }

    pub fn merge(&mut self, other: BatchReport) {
        self.written.extend(other.written);
        self.removed.extend(other.removed);
        self.failed.extend(other.failed);
    }
}

/// Writes batches into an output directory.
#[derive(Debug, Clone)]
pub struct SiteWriter {
    root: PathBuf,
}

impl SiteWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether a relative output path currently exists.
    pub fn exists(&self, path: &str) -> bool {
        self.target(path).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Apply a batch: all writes first, then all deletes.
    ///
    /// A failing item does not stop the rest; failures end up in the report.
    pub fn apply(&self, batch: Batch) -> BatchReport {
        let mut report = BatchReport::default();

        for (path, contents) in batch.writes {
            match self.write_atomic(&path, &contents) {
                Ok(()) => report.written.push(path),
                Err(e) => {
                    warn!(path = %path, error = %e, "failed to write output file");
                    report.failed.push(FailedItem {
                        path,
                        error: e.to_string(),
                    });
                }
            }
        }

        for path in batch.deletes {
            match self.remove(&path) {
                Ok(true) => report.removed.push(path),
                Ok(false) => {}
                Err(e) => {
                    warn!(path = %path, error = %e, "failed to remove output file");
                    report.failed.push(FailedItem {
                        path,
                        error: e.to_string(),
                    });
                }
            }
        }

        debug!(
            written = report.written.len(),
            removed = report.removed.len(),
            failed = report.failed.len(),
            "batch applied"
        );
        report
    }

    /// Files directly inside `dir` (relative to the root) that are not in `keep`.
    ///
    /// A missing directory has no stale files.
    pub fn stale_files(&self, dir: &str, keep: &HashSet<String>) -> Result<Vec<String>, WriteError> {
        let full = self.target(dir)?;
        let entries = match std::fs::read_dir(&full) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(WriteError::io(&full, e)),
        };

        let mut stale: Vec<String> = entries
            .flatten()
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().to_str().map(|name| format!("{dir}/{name}")))
            .filter(|path| !keep.contains(path))
            .collect();
        stale.sort();
        Ok(stale)
    }

    /// Map a relative path to a file under the root, refusing anything that
    /// could land outside it.
    fn target(&self, path: &str) -> Result<PathBuf, WriteError> {
        let relative = Path::new(path);
        let valid = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(WriteError::InvalidPath(path.to_string()));
        }
        Ok(output_file(&self.root, path))
    }

    fn write_atomic(&self, path: &str, contents: &[u8]) -> Result<(), WriteError> {
        let target = self.target(path)?;
        let parent = target
            .parent()
            .ok_or_else(|| WriteError::InvalidPath(path.to_string()))?;
        std::fs::create_dir_all(parent).map_err(|e| WriteError::io(parent, e))?;

        let file_name = target
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| WriteError::InvalidPath(path.to_string()))?;
        let temp = parent.join(format!(".{file_name}.tmp"));

        std::fs::write(&temp, contents).map_err(|e| WriteError::io(&temp, e))?;
        if let Err(e) = std::fs::rename(&temp, &target) {
            let _ = std::fs::remove_file(&temp);
            return Err(WriteError::io(&target, e));
        }
        Ok(())
    }

    /// Remove a file; returns whether it existed.
    fn remove(&self, path: &str) -> Result<bool, WriteError> {
        let target = self.target(path)?;
        match std::fs::remove_file(&target) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(WriteError::io(&target, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_apply_writes_and_creates_directories() {
        let temp = TempDir::new().unwrap();
        let writer = SiteWriter::new(temp.path());

        let mut batch = Batch::new();
        batch.write("blog/index.html", "<h1>Blog</h1>");
        batch.write("images/post-1.png", vec![0u8, 1, 2]);
        let report = writer.apply(batch);

        assert!(report.is_complete());
        assert_eq!(report.written.len(), 2);
        assert_eq!(
            std::fs::read_to_string(temp.path().join("blog/index.html")).unwrap(),
            "<h1>Blog</h1>"
        );
        assert_eq!(std::fs::read(temp.path().join("images/post-1.png")).unwrap(), vec![0, 1, 2]);
        // No temporary files left behind
        assert!(!temp.path().join("blog/.index.html.tmp").exists());
    }

    #[test]
    fn test_delete_missing_file_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let writer = SiteWriter::new(temp.path());

        let mut batch = Batch::new();
        batch.delete("blog/gone.html");
        let report = writer.apply(batch);

        assert!(report.is_complete());
        assert!(report.removed.is_empty());
    }

    #[test]
    fn test_failure_does_not_stop_the_batch() {
        let temp = TempDir::new().unwrap();
        // A file where a directory is needed makes the first write fail
        std::fs::write(temp.path().join("blog"), "not a directory").unwrap();
        std::fs::write(temp.path().join("old.html"), "old").unwrap();
        let writer = SiteWriter::new(temp.path());

        let mut batch = Batch::new();
        batch.write("blog/post.html", "post");
        batch.write("about.html", "about");
        batch.write("../escape.html", "nope");
        batch.delete("old.html");
        let report = writer.apply(batch);

        assert!(!report.is_complete());
        assert!(report.has_failed("blog/post.html"));
        assert!(report.has_failed("../escape.html"));
        assert_eq!(report.written, vec!["about.html".to_string()]);
        assert_eq!(report.removed, vec!["old.html".to_string()]);
        assert!(!temp.path().parent().unwrap().join("escape.html").exists());
    }

    #[test]
    fn test_overwrite_replaces_contents() {
        let temp = TempDir::new().unwrap();
        let writer = SiteWriter::new(temp.path());

        let mut first = Batch::new();
        first.write("index.html", "first version that is longer");
        writer.apply(first);

        let mut second = Batch::new();
        second.write("index.html", "second");
        writer.apply(second);

        assert_eq!(std::fs::read_to_string(temp.path().join("index.html")).unwrap(), "second");
    }

    #[test]
    fn test_batch_write_wins_over_delete() {
        let mut batch = Batch::new();
        batch.delete("blog/page-2.html");
        batch.write("blog/page-2.html", "page");
        batch.delete("blog/page-2.html");

        assert_eq!(batch.writes().collect::<Vec<_>>(), vec!["blog/page-2.html"]);
        assert_eq!(batch.deletes().count(), 0);
    }

    #[test]
    fn test_stale_files() {
        let temp = TempDir::new().unwrap();
        let writer = SiteWriter::new(temp.path());
        std::fs::create_dir_all(temp.path().join("blog")).unwrap();
        std::fs::write(temp.path().join("blog/index.html"), "").unwrap();
        std::fs::write(temp.path().join("blog/old-post.html"), "").unwrap();

        let keep: HashSet<String> = ["blog/index.html".to_string()].into_iter().collect();
        assert_eq!(
            writer.stale_files("blog", &keep).unwrap(),
            vec!["blog/old-post.html".to_string()]
        );
        assert!(writer.stale_files("portfolio", &keep).unwrap().is_empty());
    }
}
