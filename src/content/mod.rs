//! Content module - backend payloads, markdown rendering and the content loader

pub mod loader;
mod markdown;
pub mod payload;
mod postprocess;
mod render;

pub use loader::ContentLoader;
pub use markdown::{MarkdownRenderer, Rendered};
pub use payload::{Article, ArticleSummary, Category, Page};
pub use postprocess::{HighlightPass, MathPass, PostProcess};
pub use render::Renderer;
