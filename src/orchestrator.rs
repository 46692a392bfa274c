//! Run driver: resolve the category, pick a discovery mode, subscribe
//! what was found.
//!
//! The run is a straight line: resolve category → optional clear-feeds →
//! single-URL or traversal discovery → subscribe loop. Only category
//! resolution, seed harvesting, and seed domain extraction are fatal;
//! everything per-feed is logged and skipped.

use thiserror::Error;

use crate::config::Config;
use crate::discovery::{
    extract_domain, harvest_domains, scan, DomainError, FeedProber, HarvestError, ProberError,
    PROBE_PATTERNS,
};
use crate::reader::{ReaderClient, ReaderError};

/// Errors that abort a run. Per-feed subscribe and delete failures never
/// appear here; they are logged and counted as misses instead.
#[derive(Debug, Error)]
pub enum RunError {
    /// The user-supplied category could not be resolved to an ID.
    #[error("error resolving category '{category}': {source}")]
    CategoryResolution {
        category: String,
        #[source]
        source: ReaderError,
    },
    /// Listing the category's feeds failed while clearing was requested.
    #[error("error listing feeds in category {category_id}: {source}")]
    ListCategoryFeeds {
        category_id: i64,
        #[source]
        source: ReaderError,
    },
    /// The seed page could not be fetched in traversal mode.
    #[error("error fetching page {page_url}: {source}")]
    Harvest {
        page_url: String,
        #[source]
        source: HarvestError,
    },
    /// The seed URL yielded no usable domain in single URL mode.
    #[error("failed to extract domain from URL '{page_url}': {source}")]
    Domain {
        page_url: String,
        #[source]
        source: DomainError,
    },
    /// A discovery HTTP client could not be constructed.
    #[error(transparent)]
    Prober(#[from] ProberError),
    /// The page-fetch HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Per-run options, combined with [`Config`] defaults by [`run`].
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Seed page URL to discover feeds from.
    pub page_url: String,
    /// Reader category name to subscribe discovered feeds into.
    pub category: String,
    /// Simulate subscriptions instead of calling the reader.
    pub debug: bool,
    /// Delete all feeds in the category before subscribing.
    pub clear_category_feeds: bool,
    /// Three-state mode override: `Some(true)`/`Some(false)` wins over the
    /// configured default, `None` falls back to it.
    pub single_url_mode: Option<bool>,
    /// Optional override of the configured scan concurrency ceiling.
    pub concurrency: Option<usize>,
}

/// Runs one discovery-and-subscribe pass and returns the number of feeds
/// successfully subscribed.
///
/// # Errors
///
/// Returns [`RunError`] only for the fatal cases: category resolution,
/// feed listing during clear, seed harvest in traversal mode, and seed
/// domain extraction in single URL mode.
pub async fn run(
    opts: &RunOptions,
    config: &Config,
    reader: &ReaderClient,
) -> Result<usize, RunError> {
    let category_id = reader
        .resolve_category(&opts.category)
        .await
        .map_err(|source| RunError::CategoryResolution {
            category: opts.category.clone(),
            source,
        })?;

    if opts.clear_category_feeds {
        clear_category_feeds(reader, category_id).await?;
    }

    let single_url_mode = opts.single_url_mode.unwrap_or(config.single_url_mode);
    let feeds = if single_url_mode {
        discover_single(&opts.page_url).await?
    } else {
        let concurrency = opts.concurrency.unwrap_or(config.scan_concurrency).max(1);
        discover_traversal(&opts.page_url, concurrency).await?
    };

    if feeds.is_empty() {
        return Ok(0);
    }
    Ok(subscribe_feeds(reader, category_id, &feeds, opts.debug).await)
}

/// Deletes every feed currently in the category. Listing failures are
/// fatal; individual deletion failures are logged and skipped.
async fn clear_category_feeds(reader: &ReaderClient, category_id: i64) -> Result<(), RunError> {
    let feeds = reader
        .category_feeds(category_id)
        .await
        .map_err(|source| RunError::ListCategoryFeeds {
            category_id,
            source,
        })?;

    tracing::info!(category_id, count = feeds.len(), "deleting feeds from category");
    for feed in feeds {
        tracing::debug!(feed_id = feed.id, "deleting feed");
        if let Err(e) = reader.delete_feed(feed.id).await {
            tracing::error!(feed_id = feed.id, error = %e, "error deleting feed");
        }
    }
    Ok(())
}

/// Single URL mode: probe only the seed URL's own domain. The seed page
/// body is never fetched.
async fn discover_single(page_url: &str) -> Result<Vec<String>, RunError> {
    let domain = extract_domain(page_url).map_err(|source| RunError::Domain {
        page_url: page_url.to_owned(),
        source,
    })?;

    tracing::info!(domain = %domain, "using single URL mode");
    let prober = FeedProber::new()?;
    match prober.find_feed(&domain).await {
        Some(feed) => {
            tracing::info!(domain = %domain, feed = %feed, "found feed on domain");
            Ok(vec![feed])
        }
        None => {
            tracing::info!(
                domain = %domain,
                patterns = ?PROBE_PATTERNS,
                "no feeds found on domain at common patterns"
            );
            Ok(Vec::new())
        }
    }
}

/// Traversal mode: harvest the domains linked from the seed page, then
/// scan them all.
async fn discover_traversal(page_url: &str, concurrency: usize) -> Result<Vec<String>, RunError> {
    tracing::info!(page_url = %page_url, "using traversal mode, checking all domains found on page");

    let client = reqwest::Client::builder().build()?;
    let domains = harvest_domains(&client, page_url)
        .await
        .map_err(|source| RunError::Harvest {
            page_url: page_url.to_owned(),
            source,
        })?;

    tracing::info!(domains = domains.len(), "unique domains to check for feeds");
    if domains.is_empty() {
        tracing::warn!(page_url = %page_url, "no domains found on page");
        return Ok(Vec::new());
    }

    let total = domains.len();
    let prober = FeedProber::new()?;
    let feeds = scan(&prober, domains, concurrency).await;

    if feeds.is_empty() {
        tracing::info!(domains = total, "no feeds found across domains");
    } else {
        tracing::info!(feeds = feeds.len(), domains = total, "feeds found across domains");
    }
    Ok(feeds)
}

/// Subscribes each discovered feed, returning how many succeeded. In debug
/// mode subscriptions are simulated. Failures never abort the loop.
pub async fn subscribe_feeds(
    reader: &ReaderClient,
    category_id: i64,
    feeds: &[String],
    debug: bool,
) -> usize {
    let mut success_count = 0;
    for feed in feeds {
        if debug {
            tracing::debug!(feed = %feed, "debug mode enabled, pretending to subscribe to feed");
            success_count += 1;
        } else {
            match reader.subscribe(category_id, feed).await {
                Ok(()) => {
                    tracing::info!(feed = %feed, "subscribed to feed");
                    success_count += 1;
                }
                Err(e) => {
                    tracing::error!(feed = %feed, error = %e, "error subscribing to feed");
                }
            }
        }
    }
    tracing::info!(
        subscribed = success_count,
        total = feeds.len(),
        "finished processing feeds"
    );
    success_count
}
