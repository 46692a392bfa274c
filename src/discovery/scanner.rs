use std::collections::HashSet;
use std::future::Future;
use std::sync::Mutex;

use futures::{stream, StreamExt};
use tokio::sync::mpsc;

use crate::discovery::prober::FeedProber;

/// Default ceiling on concurrently probed domains. The fan-out is one task
/// per domain, but at most this many are in flight at once; pages with
/// hundreds of linked domains would otherwise open that many connections
/// simultaneously.
pub const DEFAULT_SCAN_CONCURRENCY: usize = 16;

/// Probes every domain in the set concurrently and collects the discovered
/// feed URLs.
///
/// One probe task per domain, at most `concurrency` in flight. Each domain
/// contributes at most one feed (the prober's first pattern match), and a
/// guarded membership check deduplicates before a result is published.
///
/// The returned order depends on task completion order and is not
/// deterministic; callers must not rely on it.
pub async fn scan(
    prober: &FeedProber,
    domains: HashSet<String>,
    concurrency: usize,
) -> Vec<String> {
    scan_with(domains, concurrency, |domain| async move {
        prober.find_feed(&domain).await
    })
    .await
}

/// Scan coordination, generic over the probe function so the fan-out and
/// dedup logic is testable without the network.
pub(crate) async fn scan_with<F, Fut>(
    domains: HashSet<String>,
    concurrency: usize,
    probe: F,
) -> Vec<String>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Option<String>>,
{
    if domains.is_empty() {
        return Vec::new();
    }

    let total = domains.len();
    let concurrency = concurrency.max(1);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let seen = Mutex::new(HashSet::new());

    {
        let probe = &probe;
        let seen = &seen;
        let mut tasks = stream::iter(domains)
            .map(|domain| {
                let tx = tx.clone();
                async move {
                    if let Some(feed) = probe(domain.clone()).await {
                        let first_for_domain = {
                            let mut seen = match seen.lock() {
                                Ok(guard) => guard,
                                Err(poisoned) => poisoned.into_inner(),
                            };
                            seen.insert(domain)
                        };
                        if first_for_domain {
                            let _ = tx.send(feed);
                        }
                    }
                }
            })
            .buffer_unordered(concurrency);

        while tasks.next().await.is_some() {}
    }

    // Every worker has finished and dropped its sender; drain what was
    // published.
    drop(tx);
    let mut feeds = Vec::new();
    while let Some(feed) = rx.recv().await {
        feeds.push(feed);
    }

    tracing::debug!(feeds = feeds.len(), domains = total, "domain scan finished");
    feeds
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::discovery::harvester::domains_in_html;

    fn domain_set(domains: &[&str]) -> HashSet<String> {
        domains.iter().map(|d| (*d).to_owned()).collect()
    }

    fn fixture(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(d, f)| ((*d).to_owned(), (*f).to_owned()))
            .collect()
    }

    #[tokio::test]
    async fn test_scan_collects_found_feeds() {
        let feeds = fixture(&[
            ("a.example.com", "https://a.example.com/feed"),
            ("c.example.com", "https://c.example.com/rss.xml"),
        ]);
        let domains = domain_set(&["a.example.com", "b.example.com", "c.example.com"]);

        let mut found = scan_with(domains, DEFAULT_SCAN_CONCURRENCY, |domain| {
            let feeds = feeds.clone();
            async move { feeds.get(&domain).cloned() }
        })
        .await;
        found.sort();

        assert_eq!(
            found,
            vec![
                "https://a.example.com/feed".to_owned(),
                "https://c.example.com/rss.xml".to_owned(),
            ]
        );
    }

    #[tokio::test]
    async fn test_scan_bounds_results_by_input_set() {
        let domains = domain_set(&["x.example.com", "y.example.com"]);
        let input = domains.clone();

        let found = scan_with(domains, 4, |domain| async move {
            Some(format!("https://{domain}/feed.xml"))
        })
        .await;

        assert_eq!(found.len(), input.len());
        for feed in &found {
            let host = url::Url::parse(feed).unwrap().host_str().unwrap().to_owned();
            assert!(input.contains(&host), "{host} not in input set");
        }
    }

    #[tokio::test]
    async fn test_scan_empty_input() {
        let found = scan_with(HashSet::new(), 4, |_| async move {
            Some("never".to_owned())
        })
        .await;
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_scan_all_negative() {
        let domains = domain_set(&["a.example.com", "b.example.com"]);
        let found = scan_with(domains, 4, |_| async move { None }).await;
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_scan_with_concurrency_one() {
        let feeds = fixture(&[("a.example.com", "https://a.example.com/feed")]);
        let domains = domain_set(&["a.example.com", "b.example.com"]);

        let found = scan_with(domains, 1, |domain| {
            let feeds = feeds.clone();
            async move { feeds.get(&domain).cloned() }
        })
        .await;

        assert_eq!(found, vec!["https://a.example.com/feed".to_owned()]);
    }

    #[tokio::test]
    async fn test_concurrency_ceiling_is_respected() {
        let in_flight = AtomicUsize::new(0);
        let max_seen = AtomicUsize::new(0);
        let domains: HashSet<String> =
            (0..8).map(|i| format!("d{i}.example.com")).collect();

        let in_flight = &in_flight;
        let max_seen = &max_seen;
        scan_with(domains, 2, |_| async move {
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            max_seen.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
            None
        })
        .await;

        assert!(max_seen.load(Ordering::SeqCst) <= 2);
    }

    // Traversal pipeline: harvested page links drive the scan, feed-less
    // domains contribute nothing, and the feed-serving domain contributes
    // exactly one URL.
    #[tokio::test]
    async fn test_harvest_then_scan_pipeline() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let techblog = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed.xml"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<rss/>".as_bytes(), "application/rss+xml"),
            )
            .mount(&techblog)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&techblog)
            .await;

        let sports = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&sports)
            .await;

        let page = r#"<html><body>
                <a href="https://techblog.example.org/latest">tech</a>
                <a href="https://sports.example.net/scores">sports</a>
            </body></html>"#;
        let domains = domains_in_html(page);
        assert_eq!(domains.len(), 2);

        // Map each harvested domain onto its mock server's base URL.
        let bases: HashMap<String, String> = HashMap::from([
            ("techblog.example.org".to_owned(), techblog.uri()),
            ("sports.example.net".to_owned(), sports.uri()),
        ]);
        let prober = crate::discovery::prober::FeedProber::new_unchecked();

        let found = scan_with(domains, DEFAULT_SCAN_CONCURRENCY, |domain| {
            let base = bases[&domain].clone();
            let prober = &prober;
            async move { prober.find_feed_at(&base).await }
        })
        .await;

        assert_eq!(found, vec![format!("{}/feed.xml", techblog.uri())]);
    }
}
