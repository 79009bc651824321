use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use cinelist::ai::{AskClient, AskSession, AskState};
use cinelist::catalog::{
    CatalogItem, ErrorKind, FilterSet, ItemId, ItemKind, Movie, PageFetcher, QueryParameters,
    SortOption, TvShow,
};
use cinelist::collection::{CollectionController, Notice};
use cinelist::config::{Config, ConfigStore};
use cinelist::favorites::{FavoriteKey, FavoriteStore, JsonFavoriteStore};
use cinelist::logging;
use cinelist::tmdb::TmdbClient;

#[derive(Parser, Debug)]
#[command(name = "cinelist", version, about = "Browse movie and TV catalogs")]
struct Cli {
    /// Log to stderr (RUST_LOG overrides the level).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List items page by page.
    Browse(BrowseArgs),
    /// Toggle the favorite flag of an item.
    Favorite {
        id: u64,
        #[arg(long)]
        kind: Option<ItemKind>,
    },
    /// List saved favorites.
    Favorites {
        #[arg(long)]
        kind: Option<ItemKind>,
    },
    /// Ask the AI assistant about an item on the first page of results.
    Ask {
        id: u64,
        #[arg(long)]
        kind: Option<ItemKind>,
        #[arg(long)]
        search: Option<String>,
    },
}

#[derive(Args, Debug)]
struct BrowseArgs {
    #[arg(long)]
    kind: Option<ItemKind>,
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    sort: Option<SortOption>,
    /// Genre id; repeat for several.
    #[arg(long = "genre")]
    genres: Vec<u32>,
    #[arg(long)]
    year: Option<u16>,
    #[arg(long)]
    min_rating: Option<f32>,
    #[arg(long, default_value_t = 1)]
    pages: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        logging::init_stderr("debug");
    } else {
        logging::init_tracing();
    }

    let config = ConfigStore::open(Config::config_path())
        .context("loading configuration")?
        .get();
    let store = Arc::new(
        JsonFavoriteStore::open(config.storage.resolved_favorites_path())
            .context("opening favorites")?,
    );

    match cli.command {
        Command::Browse(args) => {
            let kind = args.kind.unwrap_or(config.browse.default_kind);
            let query = QueryParameters::new(
                args.search.unwrap_or_default(),
                args.sort.unwrap_or(config.browse.default_sort),
                FilterSet::new()
                    .with_genres(args.genres)
                    .with_release_year(args.year)
                    .with_min_rating(args.min_rating),
            );
            let client = TmdbClient::new(config.catalog.clone())?;
            match kind {
                ItemKind::Movie => browse::<Movie, _>(client, store, query, args.pages).await,
                ItemKind::Tv => browse::<TvShow, _>(client, store, query, args.pages).await,
            }
        }
        Command::Favorite { id, kind } => {
            let kind = kind.unwrap_or(config.browse.default_kind);
            let key = FavoriteKey::new(kind, ItemId(id));
            let value = !store.is_favorite(&key);
            store.set_favorite(&key, value).await?;
            println!(
                "{} {}",
                key,
                if value { "added to favorites" } else { "removed from favorites" }
            );
            Ok(())
        }
        Command::Favorites { kind } => {
            let kinds = match kind {
                Some(kind) => vec![kind],
                None => vec![ItemKind::Movie, ItemKind::Tv],
            };
            for kind in kinds {
                for id in store.favorites(kind) {
                    println!("{}", FavoriteKey::new(kind, id));
                }
            }
            Ok(())
        }
        Command::Ask { id, kind, search } => {
            let kind = kind.unwrap_or(config.browse.default_kind);
            let query = QueryParameters::default()
                .with_search_text(search.unwrap_or_default())
                .with_sort(config.browse.default_sort);
            let client = TmdbClient::new(config.catalog.clone())?;
            let ask = AskSession::new(AskClient::new(config.ai.clone())?);
            match kind {
                ItemKind::Movie => {
                    ask_about::<Movie, _>(client, store, query, ItemId(id), &ask).await
                }
                ItemKind::Tv => {
                    ask_about::<TvShow, _>(client, store, query, ItemId(id), &ask).await
                }
            }
        }
    }
}

async fn browse<I, F>(
    fetcher: F,
    store: Arc<JsonFavoriteStore>,
    query: QueryParameters,
    pages: u32,
) -> Result<()>
where
    I: CatalogItem,
    F: PageFetcher<I>,
{
    let controller = CollectionController::new(fetcher, store, query);
    controller.refresh().await;

    let mut printed = 0;
    for page in 1..=pages.max(1) {
        if page > 1 {
            if !controller.snapshot().can_load_more {
                break;
            }
            controller.load_next().await;
        }

        let snapshot = controller.snapshot();
        if let Some(kind) = snapshot.view.error() {
            controller.discard();
            bail!(describe_failure(kind));
        }

        for (index, item) in snapshot.items().iter().enumerate().skip(printed) {
            println!("{}", format_item(index + 1, item));
        }
        printed = snapshot.items().len();

        if let Some(notice) = snapshot.notice {
            report_notice(&notice);
            controller.dismiss_notice();
            break;
        }
    }

    if printed == 0 {
        println!("No results.");
    }
    controller.discard();
    Ok(())
}

async fn ask_about<I, F>(
    fetcher: F,
    store: Arc<JsonFavoriteStore>,
    query: QueryParameters,
    id: ItemId,
    ask: &AskSession<AskClient>,
) -> Result<()>
where
    I: CatalogItem,
    F: PageFetcher<I>,
{
    let controller = CollectionController::new(fetcher, store, query);
    controller.refresh().await;

    if let Some(kind) = controller.snapshot().view.error() {
        controller.discard();
        bail!(describe_failure(kind));
    }
    let item = controller.select_item(id);
    controller.discard();

    let Some(item) = item else {
        bail!("{} {} is not on the first page; try --search", I::KIND, id);
    };

    println!("{}\n", item.title());
    match ask.ask(&item).await {
        AskState::Success { text, .. } => {
            println!("{}", text);
            Ok(())
        }
        AskState::Error { message, .. } => bail!(message),
        other => bail!("unexpected answer state: {:?}", other),
    }
}

fn format_item<I: CatalogItem>(position: usize, item: &I) -> String {
    format!(
        "{:>4}. [{}] {} ({:.1}){}",
        position,
        item.id(),
        item.title(),
        item.vote_average(),
        if item.is_favorite() { " *" } else { "" }
    )
}

fn describe_failure(kind: ErrorKind) -> String {
    if kind.is_transient() {
        format!("{}. Try again in a moment.", kind)
    } else {
        kind.to_string()
    }
}

fn report_notice(notice: &Notice) {
    match notice {
        Notice::PageLoadFailed { page, kind } => {
            eprintln!("Stopped at page {}: {}", page, describe_failure(*kind));
        }
        Notice::FavoriteNotSaved { id, reason } => {
            eprintln!("Favorite for {} not saved: {}", id, reason);
        }
    }
}
