//! feedscout: find RSS/Atom feeds reachable from a web page and subscribe
//! them to a feed reader.
//!
//! Given a starting page, feedscout either probes just that page's own
//! domain (single URL mode) or collects every domain the page links to and
//! probes them all concurrently (traversal mode). Probing tries a fixed
//! precedence list of well-known feed paths (`/index.xml`, `/feed`, ...)
//! and accepts the first URL that answers with feed-flavored content.
//! Discovered feeds are subscribed into a category on a Miniflux-style
//! feed reader.
//!
//! # Architecture
//!
//! - [`discovery`] - Domain extraction, link harvesting, feed probing, and
//!   the concurrent domain scanner
//! - [`reader`] - Client for the remote feed-reader REST API
//! - [`orchestrator`] - Mode selection and the run state machine
//! - [`config`] - Endpoint/credentials/mode defaults from file and env
//! - [`util`] - URL safety validation (SSRF prevention)
//!
//! Every outbound fetch is safety-validated first: non-HTTP(S) schemes and
//! URLs resolving to private, loopback, or link-local addresses are
//! rejected so the prober cannot be turned into an internal-network
//! scanner.

pub mod config;
pub mod discovery;
pub mod orchestrator;
pub mod reader;
pub mod util;
