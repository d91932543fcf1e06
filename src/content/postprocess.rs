//! Passes applied to the content container after it is written
//!
//! Each pass reads the container HTML and returns the rewritten HTML. Passes
//! are idempotent and do not depend on each other's output, so they can run
//! in any order and more than once.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::helpers::{html_escape, html_unescape};

lazy_static! {
    /// `<pre>` and `<code>` elements, which math must not touch
    static ref CODE_REGION: Regex = Regex::new(r"(?s)<pre\b.*?</pre>|<code\b.*?</code>").unwrap();
    static ref DISPLAY_MATH: Regex = Regex::new(r"(?s)\$\$(.+?)\$\$").unwrap();
    static ref INLINE_MATH: Regex = Regex::new(r"\$([^$\n]+?)\$").unwrap();
    static ref TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref FENCED_CODE: Regex =
        Regex::new(r#"(?s)<pre><code class="language-([^"]+)">(.*?)</code></pre>"#).unwrap();
}

/// A rewrite of the content container's HTML
pub trait PostProcess: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, html: &str) -> String;
}

/// Marks up `$…$` and `$$…$$` for the math typesetter
#[derive(Debug, Default, Clone, Copy)]
pub struct MathPass;

impl MathPass {
    /// Typeset each text run between tags on its own, so a delimiter is
    /// never paired with one inside markup
    fn typeset(html: &str) -> String {
        let mut output = String::with_capacity(html.len());
        let mut last = 0;

        for tag in TAG.find_iter(html) {
            output.push_str(&Self::typeset_text(&html[last..tag.start()]));
            output.push_str(tag.as_str());
            last = tag.end();
        }
        output.push_str(&Self::typeset_text(&html[last..]));

        output
    }

    fn typeset_text(text: &str) -> String {
        let text = DISPLAY_MATH.replace_all(text, |caps: &Captures| {
            format!(r#"<div class="math display">\[{}\]</div>"#, caps[1].trim())
        });
        INLINE_MATH
            .replace_all(&text, |caps: &Captures| {
                format!(r#"<span class="math inline">\({}\)</span>"#, &caps[1])
            })
            .into_owned()
    }
}

impl PostProcess for MathPass {
    fn name(&self) -> &'static str {
        "math"
    }

    fn apply(&self, html: &str) -> String {
        let mut output = String::with_capacity(html.len());
        let mut last = 0;

        for region in CODE_REGION.find_iter(html) {
            output.push_str(&Self::typeset(&html[last..region.start()]));
            output.push_str(region.as_str());
            last = region.end();
        }
        output.push_str(&Self::typeset(&html[last..]));

        output
    }
}

/// Syntax-highlights `<pre><code class="language-x">` blocks
pub struct HighlightPass {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl HighlightPass {
    /// Create a pass using one of syntect's bundled themes
    pub fn new(theme_name: &str) -> Self {
        let mut theme_set = ThemeSet::load_defaults();
        let theme = theme_set
            .themes
            .remove(theme_name)
            .or_else(|| theme_set.themes.remove("base16-ocean.dark"))
            .unwrap_or_default();

        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
        }
    }

    fn highlight_code(&self, code: &str, lang: &str) -> String {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        match highlighted_html_for_string(code, &self.syntax_set, syntax, &self.theme) {
            Ok(highlighted) => format!(
                r#"<figure class="highlight {}">{}</figure>"#,
                html_escape(lang),
                highlighted
            ),
            Err(e) => {
                tracing::debug!("Highlighting {} failed: {}", lang, e);
                format!(
                    r#"<figure class="highlight {}"><pre><code>{}</code></pre></figure>"#,
                    html_escape(lang),
                    html_escape(code)
                )
            }
        }
    }
}

impl Default for HighlightPass {
    fn default() -> Self {
        Self::new("base16-ocean.dark")
    }
}

impl PostProcess for HighlightPass {
    fn name(&self) -> &'static str {
        "highlight"
    }

    fn apply(&self, html: &str) -> String {
        FENCED_CODE
            .replace_all(html, |caps: &Captures| {
                self.highlight_code(&html_unescape(&caps[2]), &caps[1])
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_math_inline_and_display() {
        let html = MathPass.apply("<p>Energy $E=mc^2$ and</p><p>$$\\sum x$$</p>");
        assert!(html.contains(r#"<span class="math inline">\(E=mc^2\)</span>"#));
        assert!(html.contains(r#"<div class="math display">\[\sum x\]</div>"#));
    }

    #[test]
    fn test_math_skips_code() {
        let input = r#"<p>cost $5$</p><pre><code>echo $HOME $PATH</code></pre><code>$x$</code>"#;
        let html = MathPass.apply(input);
        assert!(html.contains(r#"<span class="math inline">\(5\)</span>"#));
        assert!(html.contains("<pre><code>echo $HOME $PATH</code></pre>"));
        assert!(html.contains("<code>$x$</code>"));
    }

    #[test]
    fn test_math_ignores_dollars_in_markup() {
        let input = r#"<p>costs $5 <a title="$">here</a></p>"#;
        assert_eq!(MathPass.apply(input), input);

        let input = r#"<p>$a$ <img alt="$b$"> $c</p>"#;
        let html = MathPass.apply(input);
        assert!(html.contains(r#"<span class="math inline">\(a\)</span>"#));
        assert!(html.contains(r#"alt="$b$""#));
        assert!(html.ends_with(" $c</p>"));
    }

    #[test]
    fn test_math_is_idempotent() {
        let once = MathPass.apply("<p>$a$ and $$b$$</p>");
        assert_eq!(MathPass.apply(&once), once);
    }

    #[test]
    fn test_highlight_replaces_code_blocks() {
        let pass = HighlightPass::default();
        let input = r#"<p>x</p><pre><code class="language-rust">fn main() {}
</code></pre>"#;
        let html = pass.apply(input);
        assert!(html.contains(r#"<figure class="highlight rust">"#));
        assert!(!html.contains("language-rust"));
        assert!(html.starts_with("<p>x</p>"));
    }

    #[test]
    fn test_highlight_unescapes_before_highlighting() {
        let pass = HighlightPass::default();
        let html =
            pass.apply(r#"<pre><code class="language-html">&lt;b&gt;hi&lt;/b&gt;</code></pre>"#);
        // Highlighted output escapes the tag text again, exactly once
        assert!(html.contains("&lt;"));
        assert!(!html.contains("&amp;lt;"));
    }

    #[test]
    fn test_highlight_is_idempotent() {
        let pass = HighlightPass::default();
        let once = pass.apply(r#"<pre><code class="language-text">plain</code></pre>"#);
        assert_eq!(pass.apply(&once), once);
    }

    #[test]
    fn test_passes_commute() {
        let highlight = HighlightPass::default();
        let input = r#"<p>$x$</p><pre><code class="language-sh">echo $y</code></pre>"#;
        let a = highlight.apply(&MathPass.apply(input));
        let b = MathPass.apply(&highlight.apply(input));
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let pass = HighlightPass::new("no-such-theme");
        assert_eq!(pass.name(), "highlight");
        assert!(pass
            .apply(r#"<pre><code class="language-rust">let x = 1;</code></pre>"#)
            .contains("highlight rust"));
    }
}
