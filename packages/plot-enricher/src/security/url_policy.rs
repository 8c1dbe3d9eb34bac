//! URL policy applied before any page fetch.
//!
//! Search results point at arbitrary third-party hosts, so every URL is
//! checked before a request goes out:
//! - only http(s)
//! - no denylisted hosts (social networks, storefronts, known junk mirrors)
//! - no localhost or literal IPs inside private / link-local ranges

use std::collections::HashSet;
use std::net::IpAddr;

use url::Url;

use crate::error::{SecurityError, SecurityResult};

/// Hosts whose pages are never article content.
///
/// Matched against the host and every parent domain, so `m.facebook.com`
/// is covered by `facebook.com`.
pub const NON_ARTICLE_HOSTS: &[&str] = &[
    "revionz.safariinfosoft.com",
    "facebook.com",
    "instagram.com",
    "twitter.com",
    "x.com",
    "youtube.com",
    "linkedin.com",
    "pinterest.com",
    "tiktok.com",
    "snapchat.com",
];

/// Storefronts and catalog sites whose plots are already covered elsewhere.
pub const STOREFRONT_HOSTS: &[&str] = &[
    "imdb.com",
    "netflix.com",
    "amazon.com",
    "hulu.com",
    "disney.com",
];

/// Returns true when `host` is `domain` or a subdomain of it.
pub fn host_matches(host: &str, domain: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    host == domain || host.ends_with(&format!(".{}", domain))
}

/// Returns true when the URL's host matches any of `domains`.
pub fn url_matches_any(url: &str, domains: &[&str]) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .map(|host| domains.iter().any(|d| host_matches(&host, d)))
        .unwrap_or(false)
}

/// URL validator for fetch targets.
#[derive(Debug, Clone)]
pub struct UrlPolicy {
    /// Allowed URL schemes
    allowed_schemes: HashSet<String>,

    /// Denylisted domains (host or parent-domain match)
    blocked_domains: Vec<String>,

    /// Blocked CIDR ranges
    blocked_cidrs: Vec<ipnet::IpNet>,
}

impl Default for UrlPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlPolicy {
    /// Create a policy with the default non-article denylist.
    pub fn new() -> Self {
        Self {
            allowed_schemes: ["http", "https"].into_iter().map(String::from).collect(),
            blocked_domains: NON_ARTICLE_HOSTS
                .iter()
                .chain(["localhost", "metadata.google.internal"].iter())
                .map(|d| d.to_string())
                .collect(),
            blocked_cidrs: [
                "10.0.0.0/8",
                "172.16.0.0/12",
                "192.168.0.0/16",
                "169.254.0.0/16", // Link-local / cloud metadata
                "127.0.0.0/8",    // Loopback
                "0.0.0.0/8",
                "::1/128",   // IPv6 loopback
                "fc00::/7",  // IPv6 private
                "fe80::/10", // IPv6 link-local
            ]
            .iter()
            .filter_map(|c| c.parse().ok())
            .collect(),
        }
    }

    /// Block an additional domain.
    pub fn block_domain(mut self, domain: impl Into<String>) -> Self {
        self.blocked_domains.push(domain.into().to_ascii_lowercase());
        self
    }

    /// Block several additional domains.
    pub fn block_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocked_domains
            .extend(domains.into_iter().map(|d| d.into().to_ascii_lowercase()));
        self
    }

    /// Allow private-range IP literals (local test servers).
    pub fn allow_private_addresses(mut self) -> Self {
        self.blocked_cidrs.clear();
        self.blocked_domains.retain(|d| d != "localhost");
        self
    }

    /// Validate a URL before fetching it.
    pub fn validate(&self, url: &str) -> SecurityResult<Url> {
        let parsed = Url::parse(url)?;

        if !self.allowed_schemes.contains(parsed.scheme()) {
            return Err(SecurityError::DisallowedScheme(parsed.scheme().to_string()));
        }

        let host = parsed.host_str().ok_or(SecurityError::NoHost)?;

        if self
            .blocked_domains
            .iter()
            .any(|domain| host_matches(host, domain))
        {
            return Err(SecurityError::BlockedHost(host.to_string()));
        }

        let bare = host.trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = bare.parse::<IpAddr>() {
            if self.blocked_cidrs.iter().any(|cidr| cidr.contains(&ip)) {
                return Err(SecurityError::BlockedCidr(ip.to_string()));
            }
        }

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_matches_subdomains() {
        assert!(host_matches("en.wikipedia.org", "wikipedia.org"));
        assert!(host_matches("www.imdb.com", "imdb.com"));
        assert!(host_matches("imdb.com", "imdb.com"));
        assert!(!host_matches("notimdb.com", "imdb.com"));
    }

    #[test]
    fn test_allows_article_hosts() {
        let policy = UrlPolicy::new();
        assert!(policy.validate("https://en.wikipedia.org/wiki/Sholay").is_ok());
        assert!(policy.validate("http://www.filmcompanion.in/review").is_ok());
    }

    #[test]
    fn test_rejects_bad_schemes() {
        let policy = UrlPolicy::new();
        assert!(matches!(
            policy.validate("ftp://example.com/plot.txt"),
            Err(SecurityError::DisallowedScheme(_))
        ));
        assert!(matches!(
            policy.validate("file:///etc/passwd"),
            Err(SecurityError::DisallowedScheme(_))
        ));
    }

    #[test]
    fn test_rejects_social_networks() {
        let policy = UrlPolicy::new();
        assert!(matches!(
            policy.validate("https://m.facebook.com/somefilm"),
            Err(SecurityError::BlockedHost(_))
        ));
        assert!(matches!(
            policy.validate("https://www.youtube.com/watch?v=abc"),
            Err(SecurityError::BlockedHost(_))
        ));
    }

    #[test]
    fn test_rejects_private_addresses() {
        let policy = UrlPolicy::new();
        assert!(policy.validate("http://localhost:8080/").is_err());
        assert!(matches!(
            policy.validate("http://192.168.1.10/admin"),
            Err(SecurityError::BlockedCidr(_))
        ));
        assert!(matches!(
            policy.validate("http://169.254.169.254/latest/meta-data"),
            Err(SecurityError::BlockedCidr(_))
        ));
    }

    #[test]
    fn test_extra_blocked_domains() {
        let policy = UrlPolicy::new().block_domains(["netflix.com"]);
        assert!(policy.validate("https://www.netflix.com/title/1").is_err());
    }

    #[test]
    fn test_block_domain_is_case_insensitive() {
        let policy = UrlPolicy::new().block_domain("Spoilers.Example.com");
        assert!(matches!(
            policy.validate("https://reviews.spoilers.example.com/film"),
            Err(SecurityError::BlockedHost(_))
        ));
        assert!(policy.validate("https://example.com/film").is_ok());
    }

    #[test]
    fn test_url_matches_any() {
        assert!(url_matches_any(
            "https://www.amazon.com/dp/B0001",
            STOREFRONT_HOSTS
        ));
        assert!(!url_matches_any("not a url", STOREFRONT_HOSTS));
    }
}
