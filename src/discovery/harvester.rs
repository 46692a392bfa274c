use std::collections::HashSet;
use std::time::Duration;

use futures::StreamExt;
use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

use crate::util::{validate_url, UrlValidationError};

const HARVEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_PAGE_SIZE: usize = 5 * 1024 * 1024; // 5MB

/// Errors that can occur while harvesting linked domains from a page.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// The page URL failed safety validation (SSRF, bad scheme, etc.)
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] UrlValidationError),
    /// The page request failed at the network level.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The page request exceeded the 10-second timeout.
    #[error("request timed out")]
    Timeout,
}

/// Collects the set of unique hostnames referenced by anchor elements on
/// a page.
///
/// Validates `page_url` first (SSRF prevention), then issues a single GET
/// and scans the body for `<a href>` targets. One pass, one hop: linked
/// pages are never fetched. Malformed and relative `href` values are
/// skipped silently; a body that ends early (network error mid-stream or
/// the size cap) yields whatever was accumulated rather than failing the
/// harvest.
///
/// # Errors
///
/// Returns [`HarvestError`] when the seed URL fails validation or the
/// initial request itself fails or times out.
pub async fn harvest_domains(
    client: &reqwest::Client,
    page_url: &str,
) -> Result<HashSet<String>, HarvestError> {
    validate_url(page_url).await?;
    fetch_and_harvest(client, page_url).await
}

/// Core harvest logic: fetch a pre-validated URL and scan its HTML.
pub(crate) async fn fetch_and_harvest(
    client: &reqwest::Client,
    page_url: &str,
) -> Result<HashSet<String>, HarvestError> {
    let response = tokio::time::timeout(HARVEST_TIMEOUT, client.get(page_url).send())
        .await
        .map_err(|_| HarvestError::Timeout)?
        .map_err(HarvestError::Network)?;

    let html = read_page_text(response).await;
    Ok(domains_in_html(&html))
}

/// Reads the response body with a size cap. A mid-stream error or a body
/// exceeding the cap ends the read early with whatever arrived; the
/// harvest then works with the partial document.
async fn read_page_text(response: reqwest::Response) -> String {
    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                tracing::debug!(error = %e, collected = bytes.len(), "page body ended early");
                break;
            }
        };
        if bytes.len().saturating_add(chunk.len()) > MAX_PAGE_SIZE {
            tracing::debug!(limit = MAX_PAGE_SIZE, "page body truncated at size limit");
            break;
        }
        bytes.extend_from_slice(&chunk);
    }

    String::from_utf8_lossy(&bytes).into_owned()
}

/// Extracts the set of hostnames referenced by `<a href>` elements.
///
/// Only absolute URLs with a non-empty host contribute; relative links
/// point back at the page's own domain and carry no new information.
pub fn domains_in_html(html: &str) -> HashSet<String> {
    let document = Html::parse_document(html);
    let anchors = Selector::parse("a[href]").expect("static selector");

    let mut domains = HashSet::new();
    for element in document.select(&anchors) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if let Ok(target) = Url::parse(href) {
            if let Some(host) = target.host_str() {
                if !host.is_empty() {
                    domains.insert(host.to_owned());
                }
            }
        }
    }
    domains
}
