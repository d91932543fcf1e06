//! HTML helper functions

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Undo [`html_escape`]
pub fn html_unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Generate an in-app anchor tag
///
/// # Examples
/// ```ignore
/// link_to("/article/1", "Hello") // -> <a href="/article/1">Hello</a>
/// ```
pub fn link_to(href: &str, text: &str) -> String {
    format!(
        r#"<a href="{}">{}</a>"#,
        html_escape(href),
        html_escape(text)
    )
}

/// Generate a user-visible error block
pub fn error_block(message: &str) -> String {
    format!(
        r#"<div class="error-message"><p>{}</p></div>"#,
        html_escape(message)
    )
}

/// Wrap raw source in a collapsible "view source" element
pub fn view_source(notice: &str, source: &str) -> String {
    format!(
        r#"<p class="render-notice">{}</p><details class="render-fallback"><summary>View source</summary><pre>{}</pre></details>"#,
        html_escape(notice),
        html_escape(source)
    )
}
