//! Client for the remote feed-reader REST API (Miniflux-style).
//!
//! The orchestrator uses this narrow surface: resolve a category by name,
//! list and delete the feeds it contains, and subscribe new feed URLs.

mod client;

pub use client::{Category, ReaderClient, ReaderError, ReaderFeed};
