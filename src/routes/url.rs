//! URL generation, the inverse of [`RouteTable::resolve`]

use super::table::{Params, RouteName, RouteTable};
use super::ID_PARAM;
use crate::error::RouteError;

/// Drop `?query` and `#fragment` from a path
pub fn strip_query_and_fragment(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

/// Build the canonical path for a named route
///
/// # Examples
/// ```ignore
/// url_for(&table, RouteName::Home, &Params::new())          // -> "/"
/// url_for(&table, RouteName::Category, &params!{"id": "5"}) // -> "/category/5"
/// ```
pub fn url_for(table: &RouteTable, name: RouteName, params: &Params) -> Result<String, RouteError> {
    let route = table
        .get(name)
        .ok_or_else(|| RouteError::UnknownRoute(name.to_string()))?;

    if !route.parameterized {
        return Ok(route.pattern.clone());
    }

    let missing = || RouteError::MissingParam {
        route: name.to_string(),
        param: ID_PARAM,
    };
    let id = params
        .get(ID_PARAM)
        .map(String::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(missing)?;

    // The matcher captures exactly one segment, so an id must stay one segment
    if id.contains(['/', '?', '#']) {
        return Err(RouteError::InvalidParam {
            route: name.to_string(),
            value: id.to_string(),
        });
    }

    Ok(format!("{}/{}", route.prefix(), id))
}

impl RouteTable {
    /// Shorthand for [`url_for`] with an optional id
    pub fn url_for(&self, name: RouteName, id: Option<&str>) -> Result<String, RouteError> {
        let mut params = Params::new();
        if let Some(id) = id {
            params.insert(ID_PARAM.to_string(), id.to_string());
        }
        url_for(self, name, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoaderConfig;

    fn table() -> RouteTable {
        RouteTable::for_site(&LoaderConfig::default())
    }

    #[test]
    fn test_strip_query_and_fragment() {
        assert_eq!(strip_query_and_fragment("/a?b=1#c"), "/a");
        assert_eq!(strip_query_and_fragment("/a#c?d"), "/a");
        assert_eq!(strip_query_and_fragment("/a"), "/a");
        assert_eq!(strip_query_and_fragment("?x"), "");
    }

    #[test]
    fn test_url_for_named_routes() {
        let table = table();
        assert_eq!(table.url_for(RouteName::Home, None).unwrap(), "/");
        assert_eq!(table.url_for(RouteName::About, None).unwrap(), "/about");
        assert_eq!(
            table.url_for(RouteName::Category, Some("5")).unwrap(),
            "/category/5"
        );
        assert_eq!(
            table.url_for(RouteName::Article, Some("12")).unwrap(),
            "/article/12"
        );
        assert_eq!(
            table.url_for(RouteName::Page, Some("links")).unwrap(),
            "/page/links"
        );
    }

    #[test]
    fn test_url_for_requires_id() {
        let table = table();
        assert!(matches!(
            table.url_for(RouteName::Article, None),
            Err(RouteError::MissingParam { .. })
        ));
        assert!(table.url_for(RouteName::Article, Some("")).is_err());
        assert!(table.url_for(RouteName::Article, Some("a/b")).is_err());
        assert!(table.url_for(RouteName::Article, Some("a?b")).is_err());
    }

    #[test]
    fn test_url_for_unknown_route() {
        let table = RouteTable::builder()
            .exact("/", RouteName::Home, "Home")
            .build()
            .unwrap();
        assert!(matches!(
            table.url_for(RouteName::Article, Some("1")),
            Err(RouteError::UnknownRoute(_))
        ));
    }

    #[test]
    fn test_generated_urls_resolve_back() {
        let table = table();
        for name in RouteName::ALL {
            let route = table.get(name).unwrap();
            let ids: &[&str] = if route.parameterized {
                &["1", "999", "rust-tips", "2024.01"]
            } else {
                &[]
            };

            if ids.is_empty() {
                let path = table.url_for(name, None).unwrap();
                let m = table.resolve(&path).unwrap();
                assert_eq!(m.route.name, name);
                assert!(m.params.is_empty());
            }

            for id in ids {
                let path = table.url_for(name, Some(id)).unwrap();
                let m = table.resolve(&path).unwrap();
                assert_eq!(m.route.name, name);
                assert_eq!(m.id(), Some(*id));
            }
        }
    }
}
