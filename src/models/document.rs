use serde::Serialize;

/// A document loaded from the store, ready for display.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Normalized slash-separated path.
    pub path: String,
    pub title: String,
    /// Raw Markdown source.
    pub content: String,
}

impl Document {
    pub fn new(path: String, content: String) -> Self {
        let title = title_from_content(&content, Some(crate::storage::path::file_stem(&path)));
        Self {
            path,
            title,
            content,
        }
    }
}

/// Title of a Markdown document: the text of the first non-empty heading
/// line, otherwise `fallback`, otherwise "Untitled".
pub fn title_from_content(content: &str, fallback: Option<&str>) -> String {
    content
        .lines()
        .map(str::trim_start)
        .filter(|line| line.starts_with('#'))
        .map(|line| line.trim_start_matches('#').trim())
        .find(|title| !title.is_empty())
        .or(fallback.filter(|f| !f.is_empty()))
        .unwrap_or("Untitled")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_heading_wins() {
        let md = "intro\n\n## Second level\n# First level";
        assert_eq!(title_from_content(md, None), "Second level");
    }

    #[test]
    fn test_indented_heading() {
        assert_eq!(title_from_content("   ###  Spaced  \n", None), "Spaced");
    }

    #[test]
    fn test_empty_heading_is_skipped() {
        assert_eq!(title_from_content("#\n#   \n# Real", None), "Real");
    }

    #[test]
    fn test_fallbacks() {
        assert_eq!(title_from_content("no heading", Some("stem")), "stem");
        assert_eq!(title_from_content("no heading", None), "Untitled");
        assert_eq!(title_from_content("", Some("")), "Untitled");
    }

    #[test]
    fn test_document_uses_last_segment_as_fallback() {
        let doc = Document::new("notes/daily/monday".into(), "plain text".into());
        assert_eq!(doc.title, "monday");
    }
}
