//! Hierarchical view of the documents root.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::AppError;

/// Whether a tree node is a folder or a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Dir,
    File,
}

/// A folder or document in the directory tree.
///
/// Folders always carry `children` (possibly empty); documents never do.
#[derive(Debug, Clone, Serialize)]
pub struct TreeNode {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Normalized path relative to the documents root (without `.md`).
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
}

impl TreeNode {
    fn dir(name: String, path: String) -> Self {
        Self {
            name,
            kind: NodeKind::Dir,
            path,
            children: Some(Vec::new()),
        }
    }

    fn file(name: String, path: String) -> Self {
        Self {
            name,
            kind: NodeKind::File,
            path,
            children: None,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Dir
    }

    /// Children of a folder node; empty for documents.
    pub fn children(&self) -> &[TreeNode] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Find a direct child by name.
    pub fn child(&self, name: &str) -> Option<&TreeNode> {
        self.children().iter().find(|c| c.name == name)
    }
}

/// Walk `root` and build the tree of folders and `.md` documents.
///
/// Within each folder, subfolders come first, then documents, each group
/// sorted by name.
pub fn build_tree(root: &Path) -> Result<TreeNode, AppError> {
    let mut node = TreeNode::dir("root".to_string(), String::new());
    if root.is_dir() {
        visit_dir(root, "", &mut node)?;
    }
    Ok(node)
}

fn visit_dir(dir: &Path, rel: &str, node: &mut TreeNode) -> Result<(), AppError> {
    let entries = fs::read_dir(dir).map_err(|e| {
        AppError::Storage(format!("Failed to list '{}': {}", dir.display(), e))
    })?;

    let mut dirs = Vec::new();
    let mut files = Vec::new();

    for entry in entries.flatten() {
        let Ok(name) = entry.file_name().into_string() else {
            tracing::warn!("Skipping non UTF-8 entry in {}", dir.display());
            continue;
        };
        // symlinks are neither followed nor listed
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_symlink() {
            tracing::debug!("Skipping symlink {}", entry.path().display());
            continue;
        }
        if file_type.is_dir() {
            dirs.push((name, entry.path()));
        } else if let Some(stem) = name.strip_suffix(".md") {
            if !stem.is_empty() {
                files.push(stem.to_string());
            }
        }
    }

    dirs.sort();
    files.sort();

    let children = node.children.get_or_insert_with(Vec::new);

    for (name, entry_path) in dirs {
        let child_path = join(rel, &name);
        let mut child = TreeNode::dir(name, child_path.clone());
        visit_dir(&entry_path, &child_path, &mut child)?;
        children.push(child);
    }

    for name in files {
        let child_path = join(rel, &name);
        children.push(TreeNode::file(name, child_path));
    }

    Ok(())
}

fn join(rel: &str, name: &str) -> String {
    if rel.is_empty() {
        name.to_string()
    } else {
        format!("{rel}/{name}")
    }
}
