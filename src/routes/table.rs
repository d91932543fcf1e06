//! Route definitions and resolution

use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;

use super::url::strip_query_and_fragment;
use super::ID_PARAM;
use crate::config::LoaderConfig;
use crate::error::RouteError;

/// Captured path parameters
pub type Params = IndexMap<String, String>;

/// Logical destination of a route; also selects the content handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteName {
    Home,
    About,
    Category,
    Article,
    Page,
}

impl RouteName {
    pub const ALL: [RouteName; 5] = [
        RouteName::Home,
        RouteName::About,
        RouteName::Category,
        RouteName::Article,
        RouteName::Page,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteName::Home => "home",
            RouteName::About => "about",
            RouteName::Category => "category",
            RouteName::Article => "article",
            RouteName::Page => "page",
        }
    }
}

impl fmt::Display for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteName {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RouteName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| RouteError::UnknownRoute(s.to_string()))
    }
}

/// A path pattern bound to a handler and a page title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// `/about` or `/article/:id`
    pub pattern: String,
    pub parameterized: bool,
    pub title: String,
    pub name: RouteName,
}

impl Route {
    /// Literal prefix of a parameterized pattern (`/article` for `/article/:id`)
    pub fn prefix(&self) -> &str {
        if self.parameterized {
            self.pattern
                .strip_suffix(&format!("/:{}", ID_PARAM))
                .unwrap_or(&self.pattern)
        } else {
            &self.pattern
        }
    }

    /// Match `path` (already stripped of query and fragment) against this route
    fn matches(&self, path: &str) -> Option<Params> {
        if !self.parameterized {
            return (self.pattern == path).then(Params::new);
        }

        let rest = path.strip_prefix(self.prefix())?.strip_prefix('/')?;
        if rest.is_empty() || rest.contains('/') {
            return None;
        }

        let mut params = Params::new();
        params.insert(ID_PARAM.to_string(), rest.to_string());
        Some(params)
    }
}

/// Result of a successful resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: Params,
}

impl RouteMatch<'_> {
    /// The captured `id`, if the route has one
    pub fn id(&self) -> Option<&str> {
        self.params.get(ID_PARAM).map(String::as_str)
    }
}

/// Mapping from pattern to route, in definition order
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: IndexMap<String, Route>,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// The blog's routes with titles derived from the site title
    pub fn for_site(config: &LoaderConfig) -> Self {
        Self::builder()
            .exact("/", RouteName::Home, config.page_title(None))
            .exact("/about", RouteName::About, config.page_title(Some("About")))
            .parameterized(
                "/category",
                RouteName::Category,
                config.page_title(Some("Category")),
            )
            .parameterized(
                "/article",
                RouteName::Article,
                config.page_title(Some("Article")),
            )
            .parameterized("/page", RouteName::Page, config.page_title(None))
            .build()
            .unwrap_or_else(|e| unreachable!("built-in route table is valid: {}", e))
    }

    /// Resolve a path to exactly one route, or `None` for not found
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        let path = strip_query_and_fragment(path);

        if let Some(route) = self.routes.get(path).filter(|r| !r.parameterized) {
            tracing::debug!("Route matched (exact): {} -> {}", path, route.name);
            return Some(RouteMatch {
                route,
                params: Params::new(),
            });
        }

        self.routes
            .values()
            .filter(|r| r.parameterized)
            .find_map(|route| {
                route.matches(path).map(|params| {
                    tracing::debug!("Route matched (param): {} -> {}", path, route.name);
                    RouteMatch { route, params }
                })
            })
    }

    /// Find the route registered under a logical name
    pub fn get(&self, name: RouteName) -> Option<&Route> {
        self.routes.values().find(|r| r.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.values()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Collects routes and checks the table invariants once, at build time
#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    routes: Vec<Route>,
}

impl RouteTableBuilder {
    /// Add a literal route such as `/about`
    pub fn exact(mut self, pattern: &str, name: RouteName, title: impl Into<String>) -> Self {
        self.routes.push(Route {
            pattern: pattern.to_string(),
            parameterized: false,
            title: title.into(),
            name,
        });
        self
    }

    /// Add a route capturing one trailing segment after `prefix`
    pub fn parameterized(mut self, prefix: &str, name: RouteName, title: impl Into<String>) -> Self {
        self.routes.push(Route {
            pattern: format!("{}/:{}", prefix.trim_end_matches('/'), ID_PARAM),
            parameterized: true,
            title: title.into(),
            name,
        });
        self
    }

    pub fn build(self) -> Result<RouteTable, RouteError> {
        let mut routes: IndexMap<String, Route> = IndexMap::new();

        for route in self.routes {
            validate_pattern(&route)?;

            if routes.contains_key(&route.pattern) {
                return Err(RouteError::DuplicatePattern(route.pattern));
            }

            if route.parameterized {
                if let Some(other) = routes
                    .values()
                    .filter(|r| r.parameterized)
                    .find(|r| prefixes_collide(r.prefix(), route.prefix()))
                {
                    return Err(RouteError::PrefixCollision(
                        other.pattern.clone(),
                        route.pattern,
                    ));
                }
            }

            routes.insert(route.pattern.clone(), route);
        }

        Ok(RouteTable { routes })
    }
}

fn validate_pattern(route: &Route) -> Result<(), RouteError> {
    let invalid = || RouteError::InvalidPattern(route.pattern.clone());

    if !route.pattern.starts_with('/') {
        return Err(invalid());
    }

    let prefix = route.prefix();
    if prefix.contains(':') || prefix.contains('?') || prefix.contains('#') {
        return Err(invalid());
    }
    if route.parameterized && (prefix.is_empty() || prefix == "/") {
        return Err(invalid());
    }

    Ok(())
}

/// `/a` collides with `/a` and with `/a/b`
fn prefixes_collide(a: &str, b: &str) -> bool {
    let nested = |outer: &str, inner: &str| {
        inner
            .strip_prefix(outer)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    };
    nested(a, b) || nested(b, a)
}
