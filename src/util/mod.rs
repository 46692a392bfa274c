//! Utility functions shared across the crate.
//!
//! Currently this is URL validation: security-focused checks that keep the
//! discovery engine from being pointed at internal networks.

mod url_validator;

pub use url_validator::{validate_url, UrlValidationError};
