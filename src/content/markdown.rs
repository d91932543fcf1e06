//! Markdown to HTML conversion

use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};

use crate::error::LoadError;
use crate::helpers::view_source;

/// Markdown renderer
///
/// Code blocks come out as `<pre><code class="language-x">` and math is left
/// as written; both are picked up by the post-processing passes once the
/// HTML is in the page.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    options: Options,
}

/// Outcome of [`MarkdownRenderer::render_or_source`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub html: String,
    /// The markdown could not be rendered and is shown as source instead
    pub fallback: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES;
        Self { options }
    }

    /// Render markdown to HTML. Absent markdown is an empty document.
    pub fn render(&self, markdown: Option<&str>) -> Result<String, LoadError> {
        let markdown = markdown.unwrap_or_default();
        if markdown.trim().is_empty() {
            return Ok(String::new());
        }

        let events: Vec<Event> = Parser::new_ext(markdown, self.options).collect();
        check_display_math(&events)?;

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }

    /// Render markdown, falling back to a collapsible view of the source
    pub fn render_or_source(&self, markdown: Option<&str>) -> Rendered {
        match self.render(markdown) {
            Ok(html) => Rendered {
                html,
                fallback: false,
            },
            Err(e) => {
                tracing::warn!("Markdown render failed: {}", e);
                Rendered {
                    html: view_source(
                        "This content could not be rendered.",
                        markdown.unwrap_or_default(),
                    ),
                    fallback: true,
                }
            }
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject text whose `$$` display-math delimiters do not pair up.
///
/// Delimiters inside code blocks and inline code do not count.
fn check_display_math(events: &[Event]) -> Result<(), LoadError> {
    let mut in_code_block = false;
    let mut text = String::new();

    // Text can arrive in several events, so look at it joined
    for event in events {
        match event {
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::Text(chunk) if !in_code_block => text.push_str(chunk),
            _ => {}
        }
    }

    if text.matches("$$").count() % 2 == 0 {
        Ok(())
    } else {
        Err(LoadError::Render(
            "unterminated display math (`$$`)".to_string(),
        ))
    }
}
