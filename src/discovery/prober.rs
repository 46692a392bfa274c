use std::time::Duration;

use thiserror::Error;

use crate::util::validate_url;

/// Well-known feed paths, tried in this precedence order. The first one
/// that serves feed-flavored content wins; this is a preference order,
/// not an exhaustive search.
pub const PROBE_PATTERNS: [&str; 7] = [
    "/index.xml",
    "/feed",
    "/feed.xml",
    "/rss",
    "/rss.xml",
    "/atom.xml",
    "/?format=rss",
];

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_REDIRECTS: usize = 10;

/// Errors that can occur while constructing a [`FeedProber`].
#[derive(Debug, Error)]
pub enum ProberError {
    /// The underlying HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Probes a single domain for an RSS/Atom feed at well-known paths.
///
/// The prober holds its own HTTP client configured with the redirect cap:
/// up to 10 hops are followed, after which the last response is accepted
/// as-is rather than treated as an error.
pub struct FeedProber {
    client: reqwest::Client,
    check_url_safety: bool,
}

impl FeedProber {
    /// Creates a prober with URL safety validation enabled.
    pub fn new() -> Result<Self, ProberError> {
        Ok(Self {
            client: Self::build_client()?,
            check_url_safety: true,
        })
    }

    /// Test-only constructor that skips URL safety validation, so probes
    /// can be pointed at a localhost mock server.
    #[cfg(test)]
    pub(crate) fn new_unchecked() -> Self {
        Self {
            client: Self::build_client().expect("client construction"),
            check_url_safety: false,
        }
    }

    fn build_client() -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::custom(|attempt| {
                if attempt.previous().len() >= MAX_REDIRECTS {
                    attempt.stop()
                } else {
                    attempt.follow()
                }
            }))
            .build()
    }

    /// Finds the preferred feed URL for a domain, or `None` when no pattern
    /// matches. A missing feed is a valid negative result, not an error.
    ///
    /// Each candidate `https://{domain}{pattern}` is safety-validated before
    /// the request; unsafe or failing candidates are skipped silently and
    /// probing continues with the next pattern. No state is kept between
    /// calls, so probing the same domain twice yields the same answer.
    pub async fn find_feed(&self, domain: &str) -> Option<String> {
        tracing::debug!(domain = %domain, "checking feed patterns for domain");
        let found = self.find_feed_at(&format!("https://{domain}")).await;
        if found.is_none() {
            tracing::debug!(domain = %domain, "no feeds found for domain");
        }
        found
    }

    /// Pattern loop against an explicit base URL. Tests use this directly
    /// with a mock server base; production code goes through [`find_feed`].
    pub(crate) async fn find_feed_at(&self, base: &str) -> Option<String> {
        for pattern in PROBE_PATTERNS {
            let feed_url = format!("{base}{pattern}");
            tracing::debug!(url = %feed_url, "checking feed candidate");

            if self.check_url_safety {
                if let Err(e) = validate_url(&feed_url).await {
                    tracing::debug!(url = %feed_url, error = %e, "skipping invalid feed candidate");
                    continue;
                }
            }

            if self.check_feed(&feed_url).await {
                tracing::debug!(url = %feed_url, "valid feed found");
                return Some(feed_url);
            }
        }
        None
    }

    /// Checks whether a URL serves feed-flavored content: status must be
    /// exactly 200 and the Content-Type must contain the substring `xml`
    /// or `rss`. Deliberately a substring check, not full MIME parsing.
    async fn check_feed(&self, feed_url: &str) -> bool {
        let response =
            match tokio::time::timeout(PROBE_TIMEOUT, self.client.get(feed_url).send()).await {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    tracing::debug!(url = %feed_url, error = %e, "feed probe failed");
                    return false;
                }
                Err(_) => {
                    tracing::debug!(url = %feed_url, "feed probe timed out");
                    return false;
                }
            };

        if response.status() != reqwest::StatusCode::OK {
            return false;
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        content_type.contains("xml") || content_type.contains("rss")
    }
}
