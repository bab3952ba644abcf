use std::collections::HashMap;

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

/// Render a raw Markdown string to sanitized HTML.
///
/// Supports GitHub Flavored Markdown (GFM) features: tables,
/// footnotes, strikethrough, task lists, and smart punctuation.
/// Headings get slug ids so they can be linked to.
pub fn render_markdown(raw: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_SMART_PUNCTUATION
        | Options::ENABLE_HEADING_ATTRIBUTES;

    let mut events: Vec<Event> = Parser::new_ext(raw, options).collect();
    assign_heading_ids(&mut events);

    let mut html_output = String::new();
    html::push_html(&mut html_output, events.into_iter());
    sanitize(&html_output)
}

/// Give every heading without an explicit `{#id}` a unique slug id.
fn assign_heading_ids(events: &mut [Event<'_>]) {
    let mut seen: HashMap<String, usize> = HashMap::new();

    for i in 0..events.len() {
        if !matches!(&events[i], Event::Start(Tag::Heading { id: None, .. })) {
            continue;
        }

        let mut text = String::new();
        for event in &events[i + 1..] {
            match event {
                Event::End(TagEnd::Heading(_)) => break,
                Event::Text(t) | Event::Code(t) => text.push_str(t),
                _ => {}
            }
        }

        let base = slugify(&text);
        let base = if base.is_empty() { "section".to_string() } else { base };
        let count = seen.entry(base.clone()).or_insert(0);
        let anchor = if *count == 0 {
            base
        } else {
            format!("{base}-{count}")
        };
        *count += 1;

        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(CowStr::from(anchor));
        }
    }
}

/// Slugify heading text (e.g. "Getting Started!" -> "getting-started").
fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<&str>>()
        .join("-")
}

/// Strip scripts and unsafe attributes while keeping what the renderer
/// legitimately produces.
fn sanitize(html: &str) -> String {
    let mut builder = ammonia::Builder::default();
    builder
        .add_tags(&["input"])
        .add_tag_attributes("input", &["type", "checked", "disabled"])
        .add_tag_attributes("code", &["class"]);
    for heading in ["h1", "h2", "h3", "h4", "h5", "h6"] {
        builder.add_tag_attributes(heading, &["id"]);
    }
    builder.clean(html).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_paragraph() {
        let result = render_markdown("Hello, world!");
        assert_eq!(result.trim(), "<p>Hello, world!</p>");
    }

    #[test]
    fn test_heading() {
        let result = render_markdown("# Title");
        assert_eq!(result.trim(), "<h1 id=\"title\">Title</h1>");
    }

    #[test]
    fn test_duplicate_headings_get_unique_ids() {
        let result = render_markdown("## Setup\n\n## Setup\n\n## Setup");
        assert!(result.contains("id=\"setup\""));
        assert!(result.contains("id=\"setup-1\""));
        assert!(result.contains("id=\"setup-2\""));
    }

    #[test]
    fn test_explicit_heading_id_is_kept() {
        let result = render_markdown("# Title {#custom}");
        assert!(result.contains("id=\"custom\""));
    }

    #[test]
    fn test_bold_and_italic() {
        let result = render_markdown("**bold** and *italic*");
        assert!(result.contains("<strong>bold</strong>"));
        assert!(result.contains("<em>italic</em>"));
    }

    #[test]
    fn test_code_block_keeps_language() {
        let input = "```rust\nfn main() {}\n```";
        let result = render_markdown(input);
        assert!(result.contains("<code class=\"language-rust\""));
        assert!(result.contains("fn main()"));
    }

    #[test]
    fn test_unordered_list() {
        let input = "- item 1\n- item 2\n- item 3";
        let result = render_markdown(input);
        assert!(result.contains("<ul>"));
        assert!(result.contains("<li>item 1</li>"));
    }

    #[test]
    fn test_table() {
        let input = "| A | B |\n|---|---|\n| 1 | 2 |";
        let result = render_markdown(input);
        assert!(result.contains("<table>"));
        assert!(result.contains("<td>1</td>"));
    }

    #[test]
    fn test_strikethrough() {
        let result = render_markdown("~~deleted~~");
        assert!(result.contains("<del>deleted</del>"));
    }

    #[test]
    fn test_task_list() {
        let input = "- [x] done\n- [ ] not done";
        let result = render_markdown(input);
        assert!(result.contains("checked"));
        assert!(result.contains("type=\"checkbox\""));
    }

    #[test]
    fn test_links() {
        let result = render_markdown("[Leafwiki](https://example.com)");
        assert!(result.contains("href=\"https://example.com\""));
        assert!(result.contains(">Leafwiki</a>"));
    }

    #[test]
    fn test_images_survive() {
        let result = render_markdown("![diagram](/uploads/20240101_000000_abcd1234.png)");
        assert!(result.contains("<img"));
        assert!(result.contains("src=\"/uploads/20240101_000000_abcd1234.png\""));
    }

    #[test]
    fn test_scripts_are_stripped() {
        let input = "<script>alert(1)</script>\n\n<p onclick=\"x()\">hi</p>";
        let result = render_markdown(input);
        assert!(!result.contains("<script"));
        assert!(!result.contains("onclick"));
        assert!(result.contains("hi"));
    }

    #[test]
    fn test_empty_input() {
        let result = render_markdown("");
        assert_eq!(result, "");
    }

    #[test]
    fn test_multiline_document() {
        let input = r#"# Getting Started

Welcome to **Leafwiki**.

## Installation

```bash
cargo install leafwiki
```

- Fast
- Simple
- Plain files
"#;
        let result = render_markdown(input);
        assert!(result.contains("<h1 id=\"getting-started\">Getting Started</h1>"));
        assert!(result.contains("<h2 id=\"installation\">Installation</h2>"));
        assert!(result.contains("<strong>Leafwiki</strong>"));
        assert!(result.contains("<li>Fast</li>"));
    }
}
