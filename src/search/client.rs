use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::{Regex, RegexBuilder};
use walkdir::WalkDir;

use crate::error::AppError;
use crate::models::document::title_from_content;
use crate::models::search::SearchHit;

/// Characters of context kept on each side of the first match.
const SNIPPET_RADIUS: usize = 80;

/// Trait for search operations, enabling mock testing.
pub trait SearchService: Send + Sync {
    /// Find documents whose path, title or content contain `query`,
    /// ignoring case. An empty query matches nothing.
    fn search(&self, query: &str) -> Result<Vec<SearchHit>, AppError>;
}

/// Search by reading every Markdown file under the documents root.
pub struct ScanSearchService {
    root: PathBuf,
}

impl ScanSearchService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn markdown_files(&self) -> impl Iterator<Item = PathBuf> + '_ {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry during search: {e}");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
    }
}

impl SearchService for ScanSearchService {
    fn search(&self, query: &str) -> Result<Vec<SearchHit>, AppError> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let pattern = query_pattern(query)?;
        let lowered_query = query.to_lowercase();
        let mut hits = Vec::new();

        for file in self.markdown_files() {
            let content = match fs::read_to_string(&file) {
                Ok(content) => content,
                Err(e) if e.kind() == io::ErrorKind::InvalidData => continue,
                Err(e) => {
                    tracing::warn!("Skipping {} during search: {}", file.display(), e);
                    continue;
                }
            };

            let Some(path) = document_path(&self.root, &file) else {
                continue;
            };
            let stem = file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let title = title_from_content(&content, Some(&stem));

            let path_match = path.to_lowercase().contains(&lowered_query);
            let content_match = content.to_lowercase().contains(&lowered_query);
            let title_match = title.to_lowercase().contains(&lowered_query);

            if path_match || content_match || title_match {
                let source = if content_match { &content } else { &title };
                hits.push(SearchHit {
                    snippet: build_snippet(source, &pattern),
                    path,
                    title,
                });
            }
        }

        hits.sort_by(|a, b| a.path.cmp(&b.path));
        tracing::debug!("Search for '{}' returned {} hits", query, hits.len());
        Ok(hits)
    }
}

/// Case-insensitive literal matcher for `query`.
fn query_pattern(query: &str) -> Result<Regex, AppError> {
    RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
        .map_err(|e| AppError::BadRequest(format!("Unsupported search query: {e}")))
}

/// Slash-separated path of `file` relative to `root`, without `.md`.
fn document_path(root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?.with_extension("");
    let segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(segments.join("/"))
}

/// Excerpt of `text` around the first match of `pattern`, or its beginning
/// when there is no match, with every match highlighted.
fn build_snippet(text: &str, pattern: &Regex) -> String {
    let flat = text.replace(['\r', '\n'], " ");
    let window = match pattern.find(&flat) {
        Some(m) => {
            let start = chars_back(&flat, m.start(), SNIPPET_RADIUS);
            let end = chars_forward(&flat, m.end(), SNIPPET_RADIUS);
            &flat[start..end]
        }
        None => {
            let end = chars_forward(&flat, 0, SNIPPET_RADIUS * 2);
            &flat[..end]
        }
    };
    highlight(window.trim(), pattern)
}

/// Byte offset `n` characters before `idx`, clamped to the start.
fn chars_back(s: &str, idx: usize, n: usize) -> usize {
    s[..idx]
        .char_indices()
        .rev()
        .take(n)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(idx)
}

/// Byte offset `n` characters after `idx`, clamped to the end.
fn chars_forward(s: &str, idx: usize, n: usize) -> usize {
    s[idx..]
        .char_indices()
        .nth(n)
        .map(|(i, _)| idx + i)
        .unwrap_or(s.len())
}

/// HTML-escape `text` and wrap every match of `pattern` in `<mark>`.
fn highlight(text: &str, pattern: &Regex) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut last = 0;
    for m in pattern.find_iter(text) {
        out.push_str(&tera::escape_html(&text[last..m.start()]));
        out.push_str("<mark>");
        out.push_str(&tera::escape_html(m.as_str()));
        out.push_str("</mark>");
        last = m.end();
    }
    out.push_str(&tera::escape_html(&text[last..]));
    out
}
