use thiserror::Error;
use url::Url;

/// Maximum hostname length accepted (RFC 1035 limit for a full domain name).
const MAX_HOSTNAME_LEN: usize = 253;

/// Errors that can occur while extracting a domain from a URL-ish string.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The input string was empty.
    #[error("URL cannot be empty")]
    EmptyUrl,
    /// The input could not be parsed as a URL even after scheme normalization.
    #[error("invalid URL format '{input}': {source}")]
    Invalid {
        input: String,
        #[source]
        source: url::ParseError,
    },
    /// The parsed URL has no hostname component.
    #[error("no valid hostname found in URL '{0}'")]
    NoHost(String),
    /// The extracted hostname contains whitespace.
    #[error("hostname contains whitespace: '{0}'")]
    Whitespace(String),
    /// The extracted hostname exceeds the 253-character limit.
    #[error("hostname too long (max {MAX_HOSTNAME_LEN} characters): '{0}'")]
    TooLong(String),
}

/// Extracts the bare hostname from a URL-ish input string.
///
/// Inputs without an `http://`/`https://` prefix get `https://` prepended
/// before parsing, so bare domains like `blog.example.com` work. Ports,
/// paths, query strings, and fragments are all stripped.
///
/// Scheme-less strings with no recognizable host separator (e.g.
/// `not-a-url`) come back verbatim as the "domain": the URL parser is
/// happy to treat them as a hostname, and downstream probing fails
/// harmlessly in DNS resolution. Empty input and junk like `://invalid`
/// still fail.
///
/// # Errors
///
/// Returns [`DomainError`] when the input is empty, unparseable, hostless,
/// or produces a hostname with whitespace or more than 253 characters.
pub fn extract_domain(input: &str) -> Result<String, DomainError> {
    if input.is_empty() {
        return Err(DomainError::EmptyUrl);
    }

    let with_scheme = if input.starts_with("http://") || input.starts_with("https://") {
        input.to_owned()
    } else {
        format!("https://{input}")
    };

    let url = Url::parse(&with_scheme).map_err(|source| DomainError::Invalid {
        input: input.to_owned(),
        source,
    })?;

    let host = url
        .host_str()
        .ok_or_else(|| DomainError::NoHost(input.to_owned()))?;

    if host.chars().any(char::is_whitespace) {
        return Err(DomainError::Whitespace(host.to_owned()));
    }

    if host.len() > MAX_HOSTNAME_LEN {
        return Err(DomainError::TooLong(host.to_owned()));
    }

    Ok(host.to_owned())
}
