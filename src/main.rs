//! CLI entry point for blog-router

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blog_router::browser::{Document, MemoryDocument, MemoryHistory};
use blog_router::config::LoaderConfig;
use blog_router::router::{Anchor, NavigationOutcome};
use blog_router::routes::RouteName;
use blog_router::AppContext;

#[derive(Parser)]
#[command(name = "blog-router")]
#[command(author = "Yukang Chen")]
#[command(version = "0.1.0")]
#[command(about = "Route and render blog pages headlessly against a blog API", long_about = None)]
struct Cli {
    /// Config file, relative to the base directory
    #[arg(long, global = true, default_value = "blog.yml")]
    config: PathBuf,

    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the route table
    Routes,

    /// Show which route a path resolves to
    Resolve {
        path: String,
    },

    /// Build the path for a named route
    Url {
        /// Route name (home, about, category, article, page)
        name: RouteName,

        #[arg(long)]
        id: Option<String>,
    },

    /// Load the first path, click through the rest and print each page
    #[command(alias = "v")]
    Visit {
        #[arg(required = true)]
        paths: Vec<String>,

        /// Go back this many entries afterwards
        #[arg(long, default_value = "0")]
        back: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "blog_router=debug,info"
    } else {
        "blog_router=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("cannot read current directory")?,
    };
    let config_path = base_dir.join(&cli.config);
    let mut config = LoaderConfig::load_or_default(&config_path)
        .with_context(|| format!("failed to load {:?}", config_path))?;
    config.apply_env();

    match cli.command {
        Commands::Routes => {
            let ctx = headless(config, "/");
            for route in ctx.routes.iter() {
                println!("{:<10} {:<16} {}", route.name, route.pattern, route.title);
            }
        }

        Commands::Resolve { path } => {
            let ctx = headless(config, "/");
            match ctx.routes.resolve(&path) {
                Some(matched) => {
                    print!("{} ({})", matched.route.name, matched.route.pattern);
                    if let Some(id) = matched.id() {
                        print!(" id={}", id);
                    }
                    println!();
                }
                None => println!("Page not found: {}", path),
            }
        }

        Commands::Url { name, id } => {
            let ctx = headless(config, "/");
            println!("{}", ctx.routes.url_for(name, id.as_deref())?);
        }

        Commands::Visit { paths, back } => {
            let start = paths[0].clone();
            let document = Arc::new(MemoryDocument::new(""));
            let history = Arc::new(MemoryHistory::new(&start));
            let ctx = AppContext::connect(config, document.clone(), history.clone());
            let router = ctx.router();

            let outcome = router.start().await;
            print_page(&start, &outcome, &document);

            for path in &paths[1..] {
                let outcome = router.on_click(Anchor::new(path)).await;
                print_page(path, &outcome, &document);
            }

            for _ in 0..back {
                let Some(event) = history.back() else {
                    tracing::info!("Already at the first history entry");
                    break;
                };
                let outcome = router.on_popstate(event).await;
                print_page("(back)", &outcome, &document);
            }
        }
    }

    Ok(())
}

fn headless(config: LoaderConfig, path: &str) -> AppContext {
    AppContext::connect(
        config,
        Arc::new(MemoryDocument::new("")),
        Arc::new(MemoryHistory::new(path)),
    )
}

fn print_page(path: &str, outcome: &NavigationOutcome, document: &MemoryDocument) {
    document.run_animation_frame();
    println!("==> {} [{:?}]", path, outcome);
    println!("title: {}", document.title());
    println!("{}", document.container_html());
}
