//! Helper functions for building page HTML

mod date;
mod html;

pub use date::*;
pub use html::*;
