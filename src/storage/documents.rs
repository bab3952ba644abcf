//! Filesystem-backed document store.
//!
//! Every document lives at `<root>/<normalized path>.md`. Paths coming from
//! users are normalized first and the resolved location is checked against
//! the root before any filesystem access.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::AppError;
use crate::storage::path::normalize_path;
use crate::storage::tree::{build_tree, TreeNode};

/// Markdown documents stored as plain files under a root directory.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, AppError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            AppError::Storage(format!(
                "Failed to create documents root '{}': {}",
                root.display(),
                e
            ))
        })?;
        let root = root.canonicalize().map_err(|e| {
            AppError::Storage(format!("Failed to resolve '{}': {}", root.display(), e))
        })?;
        Ok(Self { root })
    }

    /// The canonical root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a user-supplied document path to its file under the root.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, AppError> {
        let normalized = normalize_path(path);
        if normalized.is_empty() {
            return Err(AppError::InvalidPath("Path cannot be empty".into()));
        }
        let file_path = self.root.join(format!("{normalized}.md"));
        self.ensure_within_root(&file_path)?;
        tracing::debug!("Resolved '{}' to {}", path, file_path.display());
        Ok(file_path)
    }

    /// Whether a document exists at `path`.
    pub fn exists(&self, path: &str) -> Result<bool, AppError> {
        Ok(self.resolve(path)?.is_file())
    }

    /// Read a document. Returns `None` if it doesn't exist.
    pub fn read(&self, path: &str) -> Result<Option<String>, AppError> {
        let file_path = self.resolve(path)?;
        match fs::read_to_string(&file_path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to read '{}': {}",
                file_path.display(),
                e
            ))),
        }
    }

    /// Write a document, creating parent folders as needed.
    ///
    /// Content goes to a temporary sibling first and is renamed over the
    /// target, so a reader sees either the old or the new content. Returns the
    /// normalized path the document was stored under.
    pub fn write(&self, path: &str, content: &str) -> Result<String, AppError> {
        let file_path = self.resolve(path)?;
        let parent = file_path
            .parent()
            .ok_or_else(|| AppError::InvalidPath("Document has no parent folder".into()))?;
        fs::create_dir_all(parent).map_err(|e| {
            AppError::Storage(format!("Failed to create '{}': {}", parent.display(), e))
        })?;

        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp_path = parent.join(format!(
            ".{}.{}.tmp",
            file_name,
            uuid::Uuid::new_v4().simple()
        ));

        fs::write(&tmp_path, content.as_bytes()).map_err(|e| {
            AppError::Storage(format!("Failed to write '{}': {}", tmp_path.display(), e))
        })?;
        if let Err(e) = fs::rename(&tmp_path, &file_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(AppError::Storage(format!(
                "Failed to replace '{}': {}",
                file_path.display(),
                e
            )));
        }

        let normalized = normalize_path(path);
        tracing::info!("Saved document '{}'", normalized);
        Ok(normalized)
    }

    /// Delete a document and prune folders it leaves empty.
    ///
    /// Returns `false` if there was nothing to delete.
    pub fn delete(&self, path: &str) -> Result<bool, AppError> {
        let file_path = self.resolve(path)?;
        match fs::remove_file(&file_path) {
            Ok(()) => {
                tracing::info!("Deleted document '{}'", normalize_path(path));
                if let Some(parent) = file_path.parent() {
                    self.cleanup_empty_dirs(parent);
                }
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to delete '{}': {}",
                file_path.display(),
                e
            ))),
        }
    }

    /// Delete an empty folder and prune ancestors it leaves empty.
    ///
    /// Folders with any content are refused; a missing folder is a no-op.
    pub fn delete_directory(&self, path: &str) -> Result<(), AppError> {
        let normalized = normalize_path(path);
        if normalized.is_empty() {
            return Err(AppError::InvalidPath("Cannot delete root directory".into()));
        }
        let dir_path = self.root.join(&normalized);
        self.ensure_within_root(&dir_path)?;

        if !dir_path.exists() {
            return Ok(());
        }
        if !dir_path.is_dir() {
            return Err(AppError::InvalidPath(format!(
                "'{normalized}' is not a directory"
            )));
        }

        let mut entries = fs::read_dir(&dir_path).map_err(|e| {
            AppError::Storage(format!("Failed to list '{}': {}", dir_path.display(), e))
        })?;
        if entries.next().is_some() {
            return Err(AppError::DirectoryNotEmpty(normalized));
        }

        fs::remove_dir(&dir_path).map_err(|e| {
            AppError::Storage(format!("Failed to delete '{}': {}", dir_path.display(), e))
        })?;
        tracing::info!("Deleted folder '{}'", normalized);

        if let Some(parent) = dir_path.parent() {
            self.cleanup_empty_dirs(parent);
        }
        Ok(())
    }

    /// Build the folder/document tree of the whole store.
    pub fn list_tree(&self) -> Result<TreeNode, AppError> {
        build_tree(&self.root)
    }

    /// Remove `start` and its ancestors while they are empty, stopping at the
    /// root. Any error ends the walk.
    fn cleanup_empty_dirs(&self, start: &Path) {
        let mut current = start.to_path_buf();
        while current != self.root && current.starts_with(&self.root) && current.is_dir() {
            let is_empty = match fs::read_dir(&current) {
                Ok(mut entries) => entries.next().is_none(),
                Err(_) => false,
            };
            if !is_empty {
                break;
            }
            if let Err(e) = fs::remove_dir(&current) {
                tracing::warn!("Stopped cleanup at {}: {}", current.display(), e);
                break;
            }
            tracing::debug!("Removed empty folder {}", current.display());
            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }
    }

    /// Reject paths that leave the root, lexically or through a symlink at
    /// the target itself or at any parent folder.
    fn ensure_within_root(&self, candidate: &Path) -> Result<(), AppError> {
        let relative = candidate
            .strip_prefix(&self.root)
            .map_err(|_| AppError::InvalidPath("Invalid path".into()))?;
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(AppError::InvalidPath("Invalid path".into()));
        }

        if fs::symlink_metadata(candidate).is_ok() {
            // dangling links fail to canonicalize and are refused as well
            let real = candidate
                .canonicalize()
                .map_err(|_| AppError::InvalidPath("Invalid path".into()))?;
            if !real.starts_with(&self.root) {
                return Err(AppError::InvalidPath("Invalid path".into()));
            }
            return Ok(());
        }

        let mut existing = candidate.parent();
        while let Some(dir) = existing {
            if dir.exists() {
                let real = dir.canonicalize().map_err(|e| {
                    AppError::Storage(format!("Failed to resolve '{}': {}", dir.display(), e))
                })?;
                if !real.starts_with(&self.root) {
                    return Err(AppError::InvalidPath("Invalid path".into()));
                }
                break;
            }
            existing = dir.parent();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store() -> (tempfile::TempDir, DocumentStore) {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path().join("docs")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_open_creates_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("nested/docs");
        let store = DocumentStore::open(&root).unwrap();
        assert!(store.root().is_dir());
    }

    #[test]
    fn test_resolve_appends_extension() {
        let (_dir, store) = store();
        let resolved = store.resolve("notes/../a").unwrap();
        assert_eq!(resolved, store.root().join("notes/a.md"));
    }

    #[test]
    fn test_resolve_rejects_empty() {
        let (_dir, store) = store();
        assert!(matches!(
            store.resolve("/./../"),
            Err(AppError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_resolve_never_escapes_root() {
        let (_dir, store) = store();
        let resolved = store.resolve("../../outside").unwrap();
        assert!(resolved.starts_with(store.root()));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_rejects_symlinked_escape() {
        let (dir, store) = store();
        let outside = dir.path().join("outside");
        fs::create_dir(&outside).unwrap();
        std::os::unix::fs::symlink(&outside, store.root().join("link")).unwrap();

        assert!(matches!(
            store.resolve("link/secret"),
            Err(AppError::InvalidPath(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_rejects_symlinked_document() {
        let (dir, store) = store();
        let secret = dir.path().join("secret.txt");
        fs::write(&secret, "TOP SECRET").unwrap();
        std::os::unix::fs::symlink(&secret, store.root().join("leak.md")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.txt"), store.root().join("dangling.md"))
            .unwrap();

        assert!(matches!(store.read("leak"), Err(AppError::InvalidPath(_))));
        assert!(matches!(store.exists("leak"), Err(AppError::InvalidPath(_))));
        assert!(matches!(store.resolve("dangling"), Err(AppError::InvalidPath(_))));
        assert!(matches!(
            store.write("leak", "overwrite"),
            Err(AppError::InvalidPath(_))
        ));
        assert_eq!(fs::read_to_string(&secret).unwrap(), "TOP SECRET");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_inside_root_is_allowed() {
        let (_dir, store) = store();
        store.write("real", "inside").unwrap();
        std::os::unix::fs::symlink(store.root().join("real.md"), store.root().join("alias.md"))
            .unwrap();

        assert_eq!(store.read("alias").unwrap().as_deref(), Some("inside"));
    }

    #[test]
    fn test_write_then_read_roundtrip() {
        let (_dir, store) = store();
        let content = "# Title\n\nBody with ünïcödé\n";
        let normalized = store.write("/notes/./a/", content).unwrap();
        assert_eq!(normalized, "notes/a");
        assert_eq!(store.read("notes/a").unwrap().as_deref(), Some(content));
    }

    #[test]
    fn test_write_overwrites_and_leaves_no_temp_files() {
        let (_dir, store) = store();
        store.write("a", "first").unwrap();
        store.write("a", "second").unwrap();
        assert_eq!(store.read("a").unwrap().as_deref(), Some("second"));

        let entries: Vec<_> = fs::read_dir(store.root()).unwrap().flatten().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_read_missing_is_none() {
        let (_dir, store) = store();
        assert!(store.read("missing").unwrap().is_none());
        assert!(!store.exists("missing").unwrap());
    }

    #[test]
    fn test_delete_prunes_empty_ancestors() {
        let (_dir, store) = store();
        store.write("a/b/c/doc", "x").unwrap();
        store.write("a/keep", "y").unwrap();

        assert!(store.delete("a/b/c/doc").unwrap());
        assert!(!store.root().join("a/b").exists());
        assert!(store.root().join("a").is_dir());
        assert!(store.root().is_dir());
    }

    #[test]
    fn test_delete_stops_at_root() {
        let (_dir, store) = store();
        store.write("x/only", "x").unwrap();
        store.delete("x/only").unwrap();
        assert!(!store.root().join("x").exists());
        assert!(store.root().is_dir());
    }

    #[test]
    fn test_delete_missing_document() {
        let (_dir, store) = store();
        assert!(!store.delete("ghost").unwrap());
    }

    #[test]
    fn test_delete_non_empty_directory_fails() {
        let (_dir, store) = store();
        store.write("team/doc", "x").unwrap();

        let result = store.delete_directory("team");
        assert!(matches!(result, Err(AppError::DirectoryNotEmpty(_))));
        assert_eq!(store.read("team/doc").unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn test_delete_empty_directory_and_ancestors() {
        let (_dir, store) = store();
        fs::create_dir_all(store.root().join("a/b/c")).unwrap();
        store.write("other", "x").unwrap();

        store.delete_directory("a/b/c").unwrap();
        assert!(!store.root().join("a").exists());
        assert!(store.root().join("other.md").exists());
    }

    #[test]
    fn test_delete_directory_guards() {
        let (_dir, store) = store();
        assert!(matches!(
            store.delete_directory(".."),
            Err(AppError::InvalidPath(_))
        ));
        store.delete_directory("missing").unwrap();

        store.write("file", "x").unwrap();
        assert!(matches!(
            store.delete_directory("file.md"),
            Err(AppError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_list_tree_example() {
        let (_dir, store) = store();
        store.write("notes/a", "# Hello\nworld").unwrap();

        let tree = store.list_tree().unwrap();
        let notes = tree.child("notes").unwrap();
        assert!(notes.is_dir());
        let a = notes.child("a").unwrap();
        assert!(!a.is_dir());
        assert_eq!(a.path, "notes/a");
    }
}
