//! Link click interception
//!
//! [`decide`] is the pure check run for every click that reaches the
//! document. Links it passes through are left to the browser.

use crate::routes::{strip_query_and_fragment, RouteName, RouteTable};

/// The parts of an `<a>` element the router looks at
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Anchor {
    pub href: Option<String>,
    pub target: Option<String>,
    /// Whether the `download` attribute is present
    pub download: bool,
    /// `data-category-id`
    pub category_id: Option<String>,
    /// `data-page`
    pub page: Option<String>,
}

impl Anchor {
    pub fn new(href: &str) -> Self {
        Self {
            href: Some(href.to_string()),
            ..Default::default()
        }
    }

    pub fn with_target(mut self, target: &str) -> Self {
        self.target = Some(target.to_string());
        self
    }

    pub fn with_download(mut self) -> Self {
        self.download = true;
        self
    }

    pub fn with_category_id(mut self, id: &str) -> Self {
        self.category_id = Some(id.to_string());
        self
    }

    pub fn with_page(mut self, page: &str) -> Self {
        self.page = Some(page.to_string());
        self
    }
}

/// Why a click was left to the browser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassReason {
    MissingHref,
    Fragment,
    /// `mailto:`, `tel:`, `javascript:` or another non-http scheme
    Scheme,
    NewTab,
    Download,
    CrossOrigin,
}

/// Result of [`decide`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickDecision {
    Intercept,
    PassThrough(PassReason),
}

impl ClickDecision {
    pub fn is_intercept(&self) -> bool {
        matches!(self, ClickDecision::Intercept)
    }
}

/// Decide whether a click on `anchor` is handled by the router.
///
/// Any single exclusion is enough to let the browser handle the click.
pub fn decide(anchor: &Anchor, origin: &str) -> ClickDecision {
    use ClickDecision::PassThrough;

    let href = match anchor.href.as_deref().map(str::trim) {
        Some(href) if !href.is_empty() => href,
        _ => return PassThrough(PassReason::MissingHref),
    };

    if href.starts_with('#') {
        return PassThrough(PassReason::Fragment);
    }
    if anchor
        .target
        .as_deref()
        .is_some_and(|t| t.eq_ignore_ascii_case("_blank"))
    {
        return PassThrough(PassReason::NewTab);
    }
    if anchor.download {
        return PassThrough(PassReason::Download);
    }

    match classify(href) {
        Href::Relative => ClickDecision::Intercept,
        Href::OtherScheme => PassThrough(PassReason::Scheme),
        Href::Absolute(href_origin) => {
            let page = normalize_origin(origin, "");
            let page_scheme = page.split_once("://").map_or("", |(scheme, _)| scheme);
            if normalize_origin(&href_origin, page_scheme) == page {
                ClickDecision::Intercept
            } else {
                PassThrough(PassReason::CrossOrigin)
            }
        }
    }
}

/// Path to resolve for an intercepted click.
///
/// Routing hints win over the literal href: a category id first, then a
/// page token. `current_path` anchors relative hrefs.
pub fn path_for_anchor(anchor: &Anchor, routes: &RouteTable, current_path: &str) -> Option<String> {
    if let Some(id) = anchor.category_id.as_deref().filter(|id| !id.is_empty()) {
        return routes.url_for(RouteName::Category, Some(id)).ok();
    }

    if let Some(page) = anchor.page.as_deref() {
        return match page {
            "" | "home" => routes.url_for(RouteName::Home, None).ok(),
            "about" => routes.url_for(RouteName::About, None).ok(),
            token => routes.url_for(RouteName::Page, Some(token)).ok(),
        };
    }

    let href = anchor.href.as_deref()?.trim();
    match classify(href) {
        Href::Relative if href.starts_with('/') => Some(href.to_string()),
        Href::Relative => Some(join_relative(current_path, href)),
        Href::Absolute(origin) => {
            let rest = &href[origin.len()..];
            if rest.starts_with('/') {
                Some(rest.to_string())
            } else {
                Some(format!("/{}", rest))
            }
        }
        Href::OtherScheme => None,
    }
}

enum Href {
    Relative,
    /// Carries the `scheme://authority` part of the href
    Absolute(String),
    OtherScheme,
}

fn classify(href: &str) -> Href {
    if let Some(rest) = href.strip_prefix("//") {
        let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
        return Href::Absolute(href[..2 + end].to_string());
    }

    let Some(colon) = href.find(':') else {
        return Href::Relative;
    };
    let scheme = &href[..colon];
    let is_scheme = scheme
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    // A colon after the first `/`, `?` or `#` is part of the path
    if !is_scheme || href[..colon].contains(['/', '?', '#']) {
        return Href::Relative;
    }

    match href[colon + 1..].strip_prefix("//") {
        Some(rest)
            if scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https") =>
        {
            let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
            Href::Absolute(href[..colon + 3 + end].to_string())
        }
        _ => Href::OtherScheme,
    }
}

/// `scheme://authority`, lowercased, without a default port or trailing
/// slash. A protocol-relative origin takes `default_scheme`.
fn normalize_origin(origin: &str, default_scheme: &str) -> String {
    let origin = origin.trim_end_matches('/').to_ascii_lowercase();
    let (scheme, authority) = match origin.split_once("://") {
        Some((scheme, authority)) => (scheme, authority),
        None => (default_scheme, origin.trim_start_matches('/')),
    };

    let authority = match scheme {
        "http" => authority.strip_suffix(":80").unwrap_or(authority),
        "https" => authority.strip_suffix(":443").unwrap_or(authority),
        _ => authority,
    };
    format!("{}://{}", scheme, authority)
}

/// Resolve a relative href against the directory of `current_path`
fn join_relative(current_path: &str, href: &str) -> String {
    // `?q` and `#f` stay on the current document
    if href.starts_with(['?', '#']) {
        return format!("{}{}", strip_query_and_fragment(current_path), href);
    }

    let base_dir = match current_path.rfind('/') {
        Some(i) => &current_path[..i],
        None => "",
    };

    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    let (path_part, suffix) = match href.find(['?', '#']) {
        Some(i) => (&href[..i], &href[i..]),
        None => (href, ""),
    };

    for segment in path_part.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }

    let trailing = if path_part.ends_with('/') && !segments.is_empty() {
        "/"
    } else {
        ""
    };
    format!("/{}{}{}", segments.join("/"), trailing, suffix)
}
