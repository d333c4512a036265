//! Plain body → HTML conversion.
//!
//! The engine only needs something that turns the rendered plain body into
//! an HTML document. [`BasicHtmlRenderer`] covers the markdown that mail
//! bodies actually use: paragraphs, `#` headings and `-`/`*` bullet lists.
//! All text is escaped by tera's autoescape.

use regex::Regex;
use serde::Serialize;
use tera::{Context, Tera};

use crate::error::MessageError;

/// Markdown-to-HTML collaborator.
pub trait HtmlRenderer: Send + Sync {
    /// Render `content` as a full HTML document titled `title`.
    fn render(&self, content: &str, title: &str) -> Result<String, MessageError>;
}

const DOCUMENT: &str = "document.html";

const DOCUMENT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{{ title }}</title>
</head>
<body>
{% for block in blocks -%}
{% if block.kind == "heading" -%}
<h{{ block.level }}>{{ block.text }}</h{{ block.level }}>
{% elif block.kind == "list" -%}
<ul>
{% for item in block.items -%}
<li>{{ item }}</li>
{% endfor -%}
</ul>
{% else -%}
<p>{{ block.text }}</p>
{% endif -%}
{% endfor -%}
</body>
</html>
"#;

#[derive(Debug, Serialize, PartialEq, Eq)]
struct Block {
    kind: &'static str,
    level: usize,
    text: String,
    items: Vec<String>,
}

impl Block {
    fn heading(level: usize, text: &str) -> Self {
        Self {
            kind: "heading",
            level,
            text: text.to_string(),
            items: vec![],
        }
    }

    fn paragraph(lines: &[&str]) -> Self {
        Self {
            kind: "paragraph",
            level: 0,
            text: lines.join("\n"),
            items: vec![],
        }
    }

    fn list(items: Vec<String>) -> Self {
        Self {
            kind: "list",
            level: 0,
            text: String::new(),
            items,
        }
    }
}

/// Default [`HtmlRenderer`].
pub struct BasicHtmlRenderer {
    tera: Tera,
    heading: Regex,
    list_item: Regex,
}

impl BasicHtmlRenderer {
    pub fn new() -> Result<Self, MessageError> {
        let mut tera = Tera::default();
        tera.add_raw_template(DOCUMENT, DOCUMENT_TEMPLATE)
            .map_err(|e| MessageError::Html(format!("document template: {e}")))?;
        let heading = Regex::new(r"^(#{1,6})\s+(.+?)\s*#*\s*$")
            .map_err(|e| MessageError::Html(format!("heading pattern: {e}")))?;
        let list_item = Regex::new(r"^\s*[-*]\s+(.*)$")
            .map_err(|e| MessageError::Html(format!("list pattern: {e}")))?;
        Ok(Self {
            tera,
            heading,
            list_item,
        })
    }

    fn blocks(&self, content: &str) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut paragraph: Vec<&str> = Vec::new();
        let mut items: Vec<String> = Vec::new();

        for line in content.lines() {
            if line.trim().is_empty() {
                flush(&mut blocks, &mut paragraph, &mut items);
            } else if let Some(caps) = self.heading.captures(line) {
                flush(&mut blocks, &mut paragraph, &mut items);
                blocks.push(Block::heading(caps[1].len(), &caps[2]));
            } else if let Some(caps) = self.list_item.captures(line) {
                if !paragraph.is_empty() {
                    flush(&mut blocks, &mut paragraph, &mut items);
                }
                items.push(caps[1].to_string());
            } else {
                if !items.is_empty() {
                    flush(&mut blocks, &mut paragraph, &mut items);
                }
                paragraph.push(line.trim_end());
            }
        }
        flush(&mut blocks, &mut paragraph, &mut items);
        blocks
    }
}

/// Close the open paragraph or list, if any.
fn flush(blocks: &mut Vec<Block>, paragraph: &mut Vec<&str>, items: &mut Vec<String>) {
    if !paragraph.is_empty() {
        blocks.push(Block::paragraph(paragraph));
        paragraph.clear();
    }
    if !items.is_empty() {
        blocks.push(Block::list(std::mem::take(items)));
    }
}

impl HtmlRenderer for BasicHtmlRenderer {
    fn render(&self, content: &str, title: &str) -> Result<String, MessageError> {
        let mut ctx = Context::new();
        ctx.insert("title", title);
        ctx.insert("blocks", &self.blocks(content));
        self.tera
            .render(DOCUMENT, &ctx)
            .map_err(|e| MessageError::Html(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> BasicHtmlRenderer {
        BasicHtmlRenderer::new().unwrap()
    }

    #[test]
    fn title_and_paragraphs() {
        let html = renderer().render("Hello Bob,\nhow are you?\n\nBye", "Greetings").unwrap();
        assert!(html.contains("<title>Greetings</title>"));
        assert!(html.contains("<p>Hello Bob,\nhow are you?</p>"));
        assert!(html.contains("<p>Bye</p>"));
    }

    #[test]
    fn headings_and_lists() {
        let html = renderer()
            .render("# News\n\n- one\n- two\n\n## More", "t")
            .unwrap();
        assert!(html.contains("<h1>News</h1>"));
        assert!(html.contains("<li>one</li>"));
        assert!(html.contains("<li>two</li>"));
        assert!(html.contains("<h2>More</h2>"));
    }

    #[test]
    fn text_is_escaped() {
        let html = renderer().render("a < b & c", "x \"y\"").unwrap();
        assert!(html.contains("<p>a &lt; b &amp; c</p>"));
        assert!(!html.contains("a < b"));
    }

    #[test]
    fn list_directly_after_paragraph() {
        let blocks = renderer().blocks("Items:\n* a\n* b\nafter");
        assert_eq!(
            blocks,
            vec![
                Block::paragraph(&["Items:"]),
                Block::list(vec!["a".into(), "b".into()]),
                Block::paragraph(&["after"]),
            ]
        );
    }
}
