//! HTML templates and the context every page shares.

use std::collections::HashMap;

use serde::Serialize;
use tera::{Context, Tera, Value};

use crate::error::AppError;
use crate::storage::tree::TreeNode;
use crate::web::breadcrumbs::{build_breadcrumbs, doc_url, folder_delete_url};

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("index.html", include_str!("../../templates/index.html")),
    ("new_doc.html", include_str!("../../templates/new_doc.html")),
    ("view_doc.html", include_str!("../../templates/view_doc.html")),
    ("edit_doc.html", include_str!("../../templates/edit_doc.html")),
    ("search_results.html", include_str!("../../templates/search_results.html")),
    ("upload_image.html", include_str!("../../templates/upload_image.html")),
    ("not_found.html", include_str!("../../templates/not_found.html")),
    ("error.html", include_str!("../../templates/error.html")),
];

/// One line of the sidebar: folders open and close around their children so
/// the template can render nesting without recursion.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SidebarEntry {
    OpenDir {
        name: String,
        path: String,
        /// Present only for empty folders, which may be deleted.
        delete_url: Option<String>,
    },
    CloseDir,
    File {
        name: String,
        path: String,
        url: String,
    },
}

/// Flatten the tree below the root into sidebar entries.
pub fn sidebar_entries(tree: &TreeNode) -> Vec<SidebarEntry> {
    let mut entries = Vec::new();
    for child in tree.children() {
        push_entries(child, &mut entries);
    }
    entries
}

fn push_entries(node: &TreeNode, entries: &mut Vec<SidebarEntry>) {
    if node.is_dir() {
        entries.push(SidebarEntry::OpenDir {
            name: node.name.clone(),
            path: node.path.clone(),
            delete_url: node
                .children()
                .is_empty()
                .then(|| folder_delete_url(&node.path)),
        });
        for child in node.children() {
            push_entries(child, entries);
        }
        entries.push(SidebarEntry::CloseDir);
    } else {
        entries.push(SidebarEntry::File {
            name: node.name.clone(),
            path: node.path.clone(),
            url: doc_url(&node.path),
        });
    }
}

/// `{{ path | doc_url }}`: link to a document page. The result is
/// percent-encoded, so templates may mark it `safe`.
fn doc_url_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let path = tera::try_get_value!("doc_url", "value", String, value);
    Ok(Value::String(doc_url(&path)))
}

/// Compiled page templates.
pub struct Views {
    tera: Tera,
}

impl Views {
    pub fn new() -> Result<Self, AppError> {
        let mut tera = Tera::default();
        tera.register_filter("doc_url", doc_url_filter);
        tera.add_raw_templates(TEMPLATES.to_vec())?;
        Ok(Self { tera })
    }

    /// Context with the sidebar tree and breadcrumbs for `current_path`.
    pub fn base_context(&self, tree: &TreeNode, current_path: Option<&str>) -> Context {
        let mut context = Context::new();
        context.insert("sidebar", &sidebar_entries(tree));
        context.insert("breadcrumbs", &build_breadcrumbs(current_path));
        context.insert("current_path", current_path.unwrap_or_default());
        context
    }

    pub fn render(&self, template: &str, context: &Context) -> Result<String, AppError> {
        Ok(self.tera.render(template, context)?)
    }
}
