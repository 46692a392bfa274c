//! Feed discovery: finding RSS/Atom feeds reachable from a starting page.
//!
//! The discovery pipeline has four pieces:
//!
//! - [`domain`] - Extract a bare hostname from a URL-ish input string
//! - [`harvester`] - Collect the hostnames linked from a page's anchors
//! - [`prober`] - Try well-known feed paths on a single domain, first
//!   match wins
//! - [`scanner`] - Fan the prober out across a domain set with bounded
//!   concurrency and per-domain dedup
//!
//! Single URL mode uses the domain extractor and one probe; traversal mode
//! runs the harvester and then the scanner. Every outbound fetch goes
//! through [`crate::util::validate_url`] first.

mod domain;
mod harvester;
mod prober;
mod scanner;

pub use domain::{extract_domain, DomainError};
pub use harvester::{domains_in_html, harvest_domains, HarvestError};
pub use prober::{FeedProber, ProberError, PROBE_PATTERNS};
pub use scanner::{scan, DEFAULT_SCAN_CONCURRENCY};
