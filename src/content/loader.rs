//! Content loader - fetches backend data for a route and renders it

use serde_json::Value;

use super::payload::{self, Article, ArticleSummary, Category, Page};
use crate::error::LoadError;
use crate::helpers::{error_block, html_escape, link_to, time_tag};
use crate::http::encode_segment;
use crate::routes::{Params, RouteName, ID_PARAM};
use crate::AppContext;

/// Page token of the `/about` route
pub const ABOUT_PAGE: &str = "about";

/// HTML for the container, plus a title to set once it is shown
struct View {
    html: String,
    title: Option<String>,
}

/// Loads content for a resolved route and writes it into the page
pub struct ContentLoader<'a> {
    ctx: &'a AppContext,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    /// Run the handler for `name`.
    ///
    /// Backend and content failures are rendered as a message and count as
    /// handled. Only a dispatch that cannot start (a missing parameter) is
    /// returned as an error.
    pub async fn load(&self, name: RouteName, params: &Params) -> Result<(), LoadError> {
        let id = || {
            params
                .get(ID_PARAM)
                .map(String::as_str)
                .ok_or(LoadError::MissingParam(ID_PARAM))
        };

        let view = match name {
            RouteName::Home => self.home().await,
            RouteName::About => self.page(ABOUT_PAGE).await,
            RouteName::Page => self.page(id()?).await,
            RouteName::Category => self.category(id()?).await,
            RouteName::Article => self.article(id()?).await,
        };

        match view {
            Ok(view) => {
                self.ctx.renderer.mount(&self.ctx.document, view.html);
                if let Some(title) = view.title {
                    self.ctx.document.set_title(&title);
                }
            }
            Err(e) if e.is_network() => {
                tracing::warn!("Backend unreachable while loading {}: {}", name, e);
                self.show_error(&e);
            }
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", name, e);
                self.show_error(&e);
            }
        }

        Ok(())
    }

    /// Replace the content with a user-facing error message
    pub fn show_error(&self, err: &LoadError) {
        self.ctx
            .renderer
            .mount(&self.ctx.document, error_block(&err.user_message()));
    }

    async fn fetch(&self, endpoint: &str) -> Result<Value, LoadError> {
        self.ctx
            .cache
            .fetch_with_cache(endpoint, || self.ctx.client.get(endpoint))
            .await
    }

    async fn home(&self) -> Result<View, LoadError> {
        let categories: Vec<Category> = payload::decode_list(self.fetch("categories").await?)?;
        if categories.is_empty() {
            return Err(LoadError::NotFound("No categories yet".to_string()));
        }

        let mut html = format!(
            r#"<h1 class="site-title">{}</h1><ul class="category-list">"#,
            html_escape(&self.ctx.config.site_title)
        );
        for category in &categories {
            let Some(id) = payload::id_text(&category.id) else {
                tracing::debug!("Skipping category without id: {}", category.name);
                continue;
            };
            let href = match self.ctx.routes.url_for(RouteName::Category, Some(&id)) {
                Ok(href) => href,
                Err(e) => {
                    tracing::warn!("Skipping category {}: {}", id, e);
                    continue;
                }
            };

            html.push_str(&format!(
                r#"<li><a href="{}" data-category-id="{}">{}</a>"#,
                html_escape(&href),
                html_escape(&id),
                html_escape(&category.name)
            ));
            if let Some(description) = category.description.as_deref() {
                html.push_str(&format!(
                    r#" <span class="category-description">{}</span>"#,
                    html_escape(description)
                ));
            }
            html.push_str("</li>");
        }
        html.push_str("</ul>");

        Ok(View { html, title: None })
    }

    async fn category(&self, id: &str) -> Result<View, LoadError> {
        let endpoint = format!("categories/{}/articles", encode_segment(id));
        let articles: Vec<ArticleSummary> = payload::decode_list(self.fetch(&endpoint).await?)?;
        if articles.is_empty() {
            return Err(LoadError::NotFound(
                "No articles in this category".to_string(),
            ));
        }

        let mut html = String::from(r#"<ul class="article-list">"#);
        for article in &articles {
            let Some(article_id) = payload::id_text(&article.id) else {
                continue;
            };
            let Ok(href) = self.ctx.routes.url_for(RouteName::Article, Some(&article_id)) else {
                tracing::warn!("Skipping article with unroutable id {}", article_id);
                continue;
            };

            html.push_str("<li>");
            html.push_str(&link_to(&href, &article.title));
            if let Some(date) = article.published_date.as_deref() {
                html.push(' ');
                html.push_str(&time_tag(date, &self.ctx.config.date_format));
            }
            html.push_str("</li>");
        }
        html.push_str("</ul>");

        Ok(View { html, title: None })
    }

    async fn article(&self, id: &str) -> Result<View, LoadError> {
        let endpoint = format!("articles/{}", encode_segment(id));
        let article: Article = payload::decode(self.fetch(&endpoint).await?)?;
        let content = payload::non_blank(&article.content)
            .ok_or_else(|| LoadError::NotFound("Article not found".to_string()))?;

        let body = self.ctx.renderer.markdown(Some(content));
        if body.fallback {
            tracing::warn!("Article {} is shown as source", id);
        }

        let mut html = String::from(r#"<article class="post">"#);
        if !article.title.is_empty() {
            html.push_str(&format!(
                r#"<h1 class="post-title">{}</h1>"#,
                html_escape(&article.title)
            ));
        }
        if let Some(date) = article.published_date.as_deref() {
            html.push_str(&time_tag(date, &self.ctx.config.date_format));
        }
        html.push_str(r#"<div class="post-content">"#);
        html.push_str(&body.html);
        html.push_str("</div></article>");

        let title = (!article.title.is_empty())
            .then(|| self.ctx.config.page_title(Some(&article.title)));

        Ok(View { html, title })
    }

    async fn page(&self, token: &str) -> Result<View, LoadError> {
        let endpoint = format!("pages/{}", encode_segment(token));
        let page: Page = payload::decode(self.fetch(&endpoint).await?)?;
        let content = payload::non_blank(&page.content)
            .ok_or_else(|| LoadError::NotFound(format!("Page not found: {}", token)))?;

        let body = self.ctx.renderer.markdown(Some(content));
        if body.fallback {
            tracing::warn!("Page {} is shown as source", token);
        }
        Ok(View {
            html: format!(r#"<div class="page-content">{}</div>"#, body.html),
            title: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::Document;
    use crate::test_support::{Fixture, ScriptedTransport};
    use serde_json::json;

    fn params(id: &str) -> Params {
        let mut params = Params::new();
        params.insert(ID_PARAM.to_string(), id.to_string());
        params
    }

    #[tokio::test]
    async fn test_home_lists_categories() {
        let transport = ScriptedTransport::new().respond(
            &Fixture::url("categories"),
            json!([
                {"id": 1, "Name": "Rust", "Description": "Systems"},
                {"id": "go", "Name": "Go"}
            ]),
        );
        let fx = Fixture::new(transport, "/");
        ContentLoader::new(&fx.ctx)
            .load(RouteName::Home, &Params::new())
            .await
            .unwrap();

        let html = fx.document.container_html();
        assert!(html.contains(r#"<a href="/category/1" data-category-id="1">Rust</a>"#));
        assert!(html.contains(r#"<a href="/category/go" data-category-id="go">Go</a>"#));
        assert!(html.contains("Systems"));
    }

    #[tokio::test]
    async fn test_empty_category_renders_error() {
        let transport =
            ScriptedTransport::new().respond(&Fixture::url("categories/5/articles"), json!([]));
        let fx = Fixture::new(transport, "/");
        ContentLoader::new(&fx.ctx)
            .load(RouteName::Category, &params("5"))
            .await
            .unwrap();

        assert!(fx
            .document
            .container_html()
            .contains("No articles in this category"));
    }

    #[tokio::test]
    async fn test_category_lists_articles_with_dates() {
        let transport = ScriptedTransport::new().respond(
            &Fixture::url("categories/2/articles"),
            json!([{"id": 10, "Title": "First", "PublishedDate": "2024-03-01T08:00:00Z"}]),
        );
        let fx = Fixture::new(transport, "/");
        ContentLoader::new(&fx.ctx)
            .load(RouteName::Category, &params("2"))
            .await
            .unwrap();

        let html = fx.document.container_html();
        assert!(html.contains(r#"<a href="/article/10">First</a>"#));
        assert!(html.contains(">2024-03-01</time>"));
    }

    #[tokio::test]
    async fn test_article_sets_title_and_renders_markdown() {
        let transport = ScriptedTransport::new().respond(
            &Fixture::url("articles/1"),
            json!({"id": 1, "Title": "Hello", "Content": "Some *text*"}),
        );
        let fx = Fixture::new(transport, "/");
        ContentLoader::new(&fx.ctx)
            .load(RouteName::Article, &params("1"))
            .await
            .unwrap();

        assert_eq!(fx.document.title(), "Hello - Blog");
        let html = fx.document.container_html();
        assert!(html.contains(r#"<h1 class="post-title">Hello</h1>"#));
        assert!(html.contains("<em>text</em>"));
    }

    #[tokio::test]
    async fn test_article_without_content_is_not_found() {
        let transport = ScriptedTransport::new()
            .respond(&Fixture::url("articles/4"), json!({"id": 4, "Title": "Draft"}));
        let fx = Fixture::new(transport, "/");
        fx.document.set_title("Article - Blog");
        ContentLoader::new(&fx.ctx)
            .load(RouteName::Article, &params("4"))
            .await
            .unwrap();

        assert!(fx.document.container_html().contains("Article not found"));
        assert_eq!(fx.document.title(), "Article - Blog");
    }

    #[tokio::test]
    async fn test_about_and_named_pages() {
        let transport = ScriptedTransport::new()
            .respond(&Fixture::url("pages/about"), json!({"Content": "About **me**"}))
            .respond(&Fixture::url("pages/links"), json!({"Content": "Links"}));
        let fx = Fixture::new(transport, "/");
        let loader = ContentLoader::new(&fx.ctx);

        loader.load(RouteName::About, &Params::new()).await.unwrap();
        assert!(fx.document.container_html().contains("<strong>me</strong>"));

        loader.load(RouteName::Page, &params("links")).await.unwrap();
        assert!(fx.document.container_html().contains("<p>Links</p>"));
    }

    #[tokio::test]
    async fn test_network_failure_renders_network_message() {
        let transport = ScriptedTransport::new().fail(&Fixture::url("categories"), "refused");
        let fx = Fixture::new(transport, "/");
        ContentLoader::new(&fx.ctx)
            .load(RouteName::Home, &Params::new())
            .await
            .unwrap();
        assert!(fx.document.container_html().contains("Network unavailable"));
    }

    #[tokio::test]
    async fn test_status_failure_renders_status() {
        let fx = Fixture::new(ScriptedTransport::new(), "/");
        ContentLoader::new(&fx.ctx)
            .load(RouteName::Article, &params("404"))
            .await
            .unwrap();
        assert!(fx
            .document
            .container_html()
            .contains("Request failed: 404 Not Found"));
    }

    #[tokio::test]
    async fn test_responses_are_cached_per_endpoint() {
        let url = Fixture::url("articles/1");
        let transport = ScriptedTransport::new()
            .respond(&url, json!({"id": 1, "Title": "A", "Content": "a"}));
        let fx = Fixture::new(transport, "/");
        let loader = ContentLoader::new(&fx.ctx);

        loader.load(RouteName::Article, &params("1")).await.unwrap();
        loader.load(RouteName::Article, &params("1")).await.unwrap();
        assert_eq!(fx.transport.calls(&url), 1);

        fx.clock.advance(fx.ctx.config.cache_ttl());
        loader.load(RouteName::Article, &params("1")).await.unwrap();
        assert_eq!(fx.transport.calls(&url), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_retried_on_next_visit_only() {
        let url = Fixture::url("categories");
        let transport = ScriptedTransport::new().fail(&url, "refused");
        let fx = Fixture::new(transport, "/");
        let loader = ContentLoader::new(&fx.ctx);

        loader.load(RouteName::Home, &Params::new()).await.unwrap();
        assert_eq!(fx.transport.calls(&url), 1);
        loader.load(RouteName::Home, &Params::new()).await.unwrap();
        assert_eq!(fx.transport.calls(&url), 2);
    }

    #[tokio::test]
    async fn test_missing_param_is_an_error() {
        let fx = Fixture::new(ScriptedTransport::new(), "/");
        let err = ContentLoader::new(&fx.ctx)
            .load(RouteName::Article, &Params::new())
            .await
            .unwrap_err();
        assert_eq!(err, LoadError::MissingParam(ID_PARAM));
    }

    #[tokio::test]
    async fn test_unrenderable_article_shows_source() {
        let transport = ScriptedTransport::new().respond(
            &Fixture::url("articles/8"),
            json!({"id": 8, "Title": "Math", "Content": "$$x + y"}),
        );
        let fx = Fixture::new(transport, "/");
        ContentLoader::new(&fx.ctx)
            .load(RouteName::Article, &params("8"))
            .await
            .unwrap();

        let html = fx.document.container_html();
        assert!(html.contains(r#"<details class="render-fallback">"#));
        assert!(html.contains("$$x + y"));
        assert_eq!(fx.document.title(), "Math - Blog");
    }

    #[tokio::test]
    async fn test_ids_are_encoded_in_endpoints() {
        let transport = ScriptedTransport::new()
            .respond(&Fixture::url("pages/a%20b"), json!({"Content": "spaced"}));
        let fx = Fixture::new(transport, "/");
        ContentLoader::new(&fx.ctx)
            .load(RouteName::Page, &params("a b"))
            .await
            .unwrap();
        assert!(fx.document.container_html().contains("spaced"));
    }
}
