use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Errors that can occur during URL validation.
///
/// These errors cover both parsing failures and security policy violations
/// designed to prevent SSRF (Server-Side Request Forgery) attacks.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string was empty.
    #[error("URL cannot be empty")]
    EmptyUrl,
    /// The URL string could not be parsed.
    #[error("Invalid URL format: {0}")]
    Parse(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The URL has no hostname component.
    #[error("No hostname found in URL")]
    NoHost,
    /// The URL points to a private/internal address, either as a literal
    /// IP or through DNS resolution.
    #[error("Requests to private/internal addresses are not allowed: {host} resolves to {addr}")]
    PrivateAddress { host: String, addr: IpAddr },
    /// The hostname could not be resolved via DNS.
    #[error("Failed to resolve hostname {host}: {source}")]
    Resolution {
        host: String,
        #[source]
        source: std::io::Error,
    },
}

/// Validates that a URL is safe to request before any outbound fetch.
///
/// Performs security-focused validation to prevent SSRF attacks by rejecting:
/// - Non-HTTP(S) schemes (e.g., `file://`, `ftp://`)
/// - URLs without a hostname
/// - Literal IP hosts in private/loopback/link-local ranges
/// - Named hosts where *any* DNS-resolved address falls in those ranges
///
/// Named hosts are resolved with the async resolver, so this blocks until
/// DNS answers (or fails). The discovery engine calls this before every
/// page fetch and feed probe.
///
/// # Errors
///
/// Returns [`UrlValidationError`] if:
/// - The URL is empty or cannot be parsed
/// - The scheme is not `http` or `https`
/// - The URL has no hostname
/// - The hostname fails to resolve ([`UrlValidationError::Resolution`])
/// - Any literal or resolved address is private/loopback/link-local
///   ([`UrlValidationError::PrivateAddress`])
pub async fn validate_url(url_str: &str) -> Result<Url, UrlValidationError> {
    if url_str.is_empty() {
        return Err(UrlValidationError::EmptyUrl);
    }

    let url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    let host = url.host_str().ok_or(UrlValidationError::NoHost)?;

    // Strip brackets from IPv6 addresses for parsing
    let bare_host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    // Literal IP hosts are checked directly, without touching DNS
    if let Ok(ip) = bare_host.parse::<IpAddr>() {
        if is_private_ip(&ip) {
            return Err(UrlValidationError::PrivateAddress {
                host: host.to_owned(),
                addr: ip,
            });
        }
        return Ok(url);
    }

    // Named hosts: every resolved address must be safe, not just the first
    let port = url.port_or_known_default().unwrap_or(443);
    let addrs = tokio::net::lookup_host((bare_host, port))
        .await
        .map_err(|source| UrlValidationError::Resolution {
            host: host.to_owned(),
            source,
        })?;

    for addr in addrs {
        let ip = addr.ip();
        if is_private_ip(&ip) {
            return Err(UrlValidationError::PrivateAddress {
                host: host.to_owned(),
                addr: ip,
            });
        }
    }

    Ok(url)
}

fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            ipv4.is_private() || ipv4.is_loopback() || ipv4.is_link_local() || ipv4.is_unspecified()
        }
        IpAddr::V6(ipv6) => {
            if ipv6.is_loopback() || ipv6.is_unspecified() {
                return true;
            }
            let segments = ipv6.segments();
            // Unique Local (fc00::/7)
            let is_unique_local = (segments[0] & 0xfe00) == 0xfc00;
            // Link-Local (fe80::/10)
            let is_link_local = (segments[0] & 0xffc0) == 0xfe80;
            is_unique_local || is_link_local
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_url_rejected() {
        assert!(matches!(
            validate_url("").await,
            Err(UrlValidationError::EmptyUrl)
        ));
    }

    #[tokio::test]
    async fn test_invalid_schemes() {
        assert!(matches!(
            validate_url("file:///etc/passwd").await,
            Err(UrlValidationError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            validate_url("ftp://example.com").await,
            Err(UrlValidationError::UnsupportedScheme(_))
        ));
    }

    #[tokio::test]
    async fn test_unparseable_url_rejected() {
        assert!(matches!(
            validate_url("not a url").await,
            Err(UrlValidationError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_loopback_rejected() {
        assert!(matches!(
            validate_url("http://127.0.0.1/feed").await,
            Err(UrlValidationError::PrivateAddress { .. })
        ));
    }

    #[tokio::test]
    async fn test_private_ipv4_ranges_rejected() {
        assert!(validate_url("http://192.168.1.1/feed").await.is_err());
        assert!(validate_url("http://10.0.0.1/feed").await.is_err());
        assert!(validate_url("http://172.16.0.1/feed").await.is_err());
    }

    #[tokio::test]
    async fn test_ipv6_loopback_rejected() {
        assert!(validate_url("http://[::1]/feed").await.is_err());
    }

    #[tokio::test]
    async fn test_link_local_ipv4_rejected() {
        assert!(validate_url("http://169.254.1.1/feed").await.is_err());
    }

    #[tokio::test]
    async fn test_link_local_ipv6_rejected() {
        assert!(validate_url("http://[fe80::1]/feed").await.is_err());
    }

    #[tokio::test]
    async fn test_zero_address_rejected() {
        assert!(validate_url("http://0.0.0.0/feed").await.is_err());
    }

    #[tokio::test]
    async fn test_port_does_not_bypass_private_check() {
        assert!(validate_url("http://192.168.1.1:8080/feed").await.is_err());
        assert!(validate_url("http://10.0.0.1:3000/feed").await.is_err());
    }

    #[tokio::test]
    async fn test_public_literal_ip_accepted() {
        // Literal public address takes the fast path, no DNS involved
        let url = validate_url("http://93.184.216.34/feed.xml").await.unwrap();
        assert_eq!(url.host_str(), Some("93.184.216.34"));
    }

    // The private-range table itself, independent of DNS availability
    #[test]
    fn test_private_ranges_ipv4() {
        for addr in [
            "10.1.2.3",
            "172.31.0.1",
            "192.168.0.1",
            "127.0.0.53",
            "169.254.169.254",
        ] {
            let ip: IpAddr = addr.parse().unwrap();
            assert!(is_private_ip(&ip), "{addr} should be private");
        }
        for addr in ["8.8.8.8", "93.184.216.34", "172.32.0.1", "1.1.1.1"] {
            let ip: IpAddr = addr.parse().unwrap();
            assert!(!is_private_ip(&ip), "{addr} should be public");
        }
    }

    #[test]
    fn test_private_ranges_ipv6() {
        for addr in ["::1", "fe80::1", "fc00::1", "fdab::1"] {
            let ip: IpAddr = addr.parse().unwrap();
            assert!(is_private_ip(&ip), "{addr} should be private");
        }
        let public: IpAddr = "2606:2800:220:1:248:1893:25c8:1946".parse().unwrap();
        assert!(!is_private_ip(&public));
    }
}
