//! Writing rendered content into the page

use std::sync::Arc;

use super::markdown::{MarkdownRenderer, Rendered};
use super::postprocess::{HighlightPass, MathPass, PostProcess};
use crate::browser::Document;

/// Markdown renderer plus the passes run after each container write
pub struct Renderer {
    markdown: MarkdownRenderer,
    passes: Vec<Arc<dyn PostProcess>>,
}

impl Renderer {
    /// Renderer with math and syntax-highlighting passes
    pub fn new(highlight_theme: &str) -> Self {
        Self::with_passes(vec![
            Arc::new(MathPass),
            Arc::new(HighlightPass::new(highlight_theme)),
        ])
    }

    pub fn with_passes(passes: Vec<Arc<dyn PostProcess>>) -> Self {
        Self {
            markdown: MarkdownRenderer::new(),
            passes,
        }
    }

    pub fn markdown(&self, source: Option<&str>) -> Rendered {
        self.markdown.render_or_source(source)
    }

    /// Replace the container's HTML, then schedule every pass on the next frame.
    ///
    /// Each pass gets its own frame callback and reads the container as it is
    /// when the frame runs.
    pub fn mount(&self, document: &Arc<dyn Document>, html: String) {
        document.set_container_html(html);

        for pass in &self.passes {
            let target = Arc::clone(document);
            let pass = Arc::clone(pass);
            document.request_animation_frame(Box::new(move || {
                let html = target.container_html();
                let processed = pass.apply(&html);
                if processed != html {
                    tracing::debug!("Post-processed content with {} pass", pass.name());
                    target.set_container_html(processed);
                }
            }));
        }
    }
}
