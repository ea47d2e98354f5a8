use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use newsfeed::cache::{CacheStore, JsonFileCache};
use newsfeed::config::Config;
use newsfeed::logging::init_tracing;
use newsfeed::model::Article;
use newsfeed::remote::{FetchParams, HttpNewsSource};
use newsfeed::sync::ResourceSynchronizer;
use newsfeed::ui::detail::{DetailIntent, DetailViewModel, DetailViewState};
use newsfeed::ui::feed::{Banner, FeedIntent, FeedViewModel, FeedViewState, Presentation, ViewMode};

#[derive(Parser, Debug)]
#[command(name = "newsfeed", version, about = "Offline-first top headlines")]
struct Cli {
    /// Path to config file (default: platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Never contact the remote source
    #[arg(long)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show cached headlines and revalidate them
    Headlines {
        /// Always fetch, even if the fetch policy would skip it
        #[arg(long)]
        refresh: bool,
        /// Keep running and print every update
        #[arg(long)]
        watch: bool,
        /// Render as a grid
        #[arg(long)]
        grid: bool,
    },
    /// Show one cached article by URL
    Show { url: String },
    /// Print the number of cached articles
    Count,
    /// Remove every cached article
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("failed to load configuration")?;

    let cache_path = config.cache.resolved_path();
    let cache: Arc<dyn CacheStore> = Arc::new(
        JsonFileCache::open(&cache_path)
            .with_context(|| format!("failed to open cache at {}", cache_path.display()))?,
    );

    match cli.command {
        Command::Headlines {
            refresh,
            watch,
            grid,
        } => {
            if refresh && cli.offline {
                tracing::warn!("--refresh ignored in offline mode");
            }
            let synchronizer = build_synchronizer(&config, Arc::clone(&cache), cli.offline)?;
            run_headlines(synchronizer, refresh && !cli.offline, watch, grid).await
        }
        Command::Show { url } => run_show(cache, url).await,
        Command::Count => {
            println!("{}", cache.count()?);
            Ok(())
        }
        Command::Clear => {
            cache.clear()?;
            println!("cache cleared");
            Ok(())
        }
    }
}

fn build_synchronizer(
    config: &Config,
    cache: Arc<dyn CacheStore>,
    offline: bool,
) -> Result<Arc<ResourceSynchronizer>> {
    let remote = Arc::new(HttpNewsSource::new(&config.remote)?);
    let params = FetchParams {
        country: config.remote.country.clone(),
        page_size: config.remote.page_size,
    };

    let mut synchronizer = ResourceSynchronizer::new(cache, remote).with_params(params);
    if offline {
        synchronizer = synchronizer.with_should_fetch(Arc::new(|_: &[Article]| false));
    } else if !config.sync.fetch_on_subscribe {
        synchronizer =
            synchronizer.with_should_fetch(Arc::new(|snapshot: &[Article]| snapshot.is_empty()));
    }
    Ok(Arc::new(synchronizer))
}

async fn run_headlines(
    synchronizer: Arc<ResourceSynchronizer>,
    refresh: bool,
    watch: bool,
    grid: bool,
) -> Result<()> {
    let view_model = FeedViewModel::spawn(synchronizer);
    let mut states = view_model.states().subscribe();

    view_model.submit(FeedIntent::Load)?;
    if refresh {
        view_model.submit(FeedIntent::Refresh)?;
    }

    // Loading states are expected before the first settled one per intent.
    let mut pending = if refresh { 2 } else { 1 };
    let mut toggled = false;

    while let Some(state) = states.next().await {
        if matches!(state, FeedViewState::Initial) {
            continue;
        }
        render_feed(&state);

        if state.is_loading() {
            continue;
        }
        if grid && !toggled && state.view_mode() == ViewMode::List {
            toggled = true;
            view_model.submit(FeedIntent::ToggleViewMode)?;
        }
        pending -= 1;
        if pending <= 0 && !watch && !(grid && state.view_mode() == ViewMode::List) {
            break;
        }
    }

    // Let the log flush before the runtime shuts down.
    tokio::time::sleep(Duration::from_millis(10)).await;
    Ok(())
}

async fn run_show(cache: Arc<dyn CacheStore>, url: String) -> Result<()> {
    let view_model = DetailViewModel::spawn(cache);
    let mut states = view_model.states().subscribe();
    view_model.submit(DetailIntent::LoadItem(Some(url)))?;

    while let Some(state) = states.next().await {
        match state {
            DetailViewState::Initial | DetailViewState::Loading => continue,
            DetailViewState::Success(article) => {
                print_article(&article);
                break;
            }
            DetailViewState::Error(message) => {
                eprintln!("error: {}", message);
                break;
            }
        }
    }
    Ok(())
}

fn render_feed(state: &FeedViewState) {
    match state.presentation() {
        Presentation::Blank => {}
        Presentation::Spinner => println!("Loading headlines..."),
        Presentation::FullScreenError { message } => {
            println!("{}", message);
            println!("Run `newsfeed headlines --refresh` to retry.");
        }
        Presentation::Content {
            articles,
            view_mode,
            banner,
        } => {
            match banner {
                Some(Banner::Refreshing) => println!("(refreshing)"),
                Some(Banner::Error(message)) => println!("! {}", message),
                None => {}
            }
            match view_mode {
                ViewMode::List => {
                    for article in articles {
                        println!(
                            "- {} [{}]",
                            article.title.as_deref().unwrap_or("(untitled)"),
                            article.source_name().unwrap_or("unknown source")
                        );
                        println!("  {}", article.url);
                    }
                }
                ViewMode::Grid => {
                    for row in articles.chunks(2) {
                        let cells: Vec<String> = row
                            .iter()
                            .map(|a| format!("{:<40.40}", a.title.as_deref().unwrap_or("(untitled)")))
                            .collect();
                        println!("{}", cells.join(" | "));
                    }
                }
            }
            println!();
        }
    }
}

fn print_article(article: &Article) {
    println!("{}", article.title.as_deref().unwrap_or("(untitled)"));
    if let Some(source) = article.source_name() {
        println!("{}", source);
    }
    if let Some(author) = &article.author {
        println!("by {}", author);
    }
    if let Some(published) = &article.published_at {
        println!("{}", published);
    }
    println!();
    if let Some(description) = &article.description {
        println!("{}", description);
    }
    if let Some(content) = &article.content {
        println!("{}", content);
    }
    println!("\n{}", article.url);
}
