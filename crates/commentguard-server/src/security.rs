//! Security utilities for the moderation service
//!
//! Provider URL validation (SSRF protection) and the owner bearer-token check.

use std::net::IpAddr;
use subtle::ConstantTimeEq;
use thiserror::Error;
use url::Url;

/// Security-related errors
#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("URL scheme '{0}' is not allowed, only HTTPS is permitted")]
    InvalidScheme(String),

    #[error("Host '{0}' is blocked: internal/private IP addresses are not allowed")]
    BlockedHost(String),

    #[error("URL must have a host")]
    MissingHost,
}

/// Hostnames that must never be used as the provider URL
const BLOCKED_HOSTNAMES: &[&str] = &[
    "localhost",
    "localhost.localdomain",
    "ip6-localhost",
    "ip6-loopback",
    // Cloud metadata services
    "metadata.google.internal",
    "metadata.goog",
    "169.254.169.254",
    "fd00:ec2::254",
];

/// Environment variable that relaxes provider URL validation
pub const DEV_MODE_ENV: &str = "COMMENTGUARD_DEV_MODE";

/// Configuration for provider URL validation
#[derive(Debug, Clone, Default)]
pub struct UrlValidationConfig {
    /// Allow plain HTTP
    pub allow_http: bool,
    /// Allow localhost and loopback addresses
    pub allow_localhost: bool,
    /// Allow RFC 1918 and other private ranges
    pub allow_private_ips: bool,
    /// If set, only these domains (and their subdomains) are permitted
    pub allowed_domains: Option<Vec<String>>,
}

impl UrlValidationConfig {
    /// Development configuration, used for local stand-in providers
    pub fn development() -> Self {
        Self {
            allow_http: true,
            allow_localhost: true,
            allow_private_ips: true,
            allowed_domains: None,
        }
    }

    /// Strict by default, relaxed when `COMMENTGUARD_DEV_MODE` is set to a
    /// truthy value
    pub fn from_env() -> Self {
        match std::env::var(DEV_MODE_ENV) {
            Ok(v) if matches!(v.to_lowercase().as_str(), "1" | "true" | "yes") => {
                Self::development()
            }
            _ => Self::default(),
        }
    }
}

/// Validate the moderation provider base URL.
///
/// Rejects non-HTTPS schemes, blocked hostnames, loopback, private and
/// link-local addresses, and hosts outside the allowlist when one is set.
pub fn validate_provider_url(
    url_str: &str,
    config: &UrlValidationConfig,
) -> Result<Url, SecurityError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "https" => {}
        "http" if config.allow_http => {}
        scheme => return Err(SecurityError::InvalidScheme(scheme.to_string())),
    }

    let host = url.host_str().ok_or(SecurityError::MissingHost)?;
    let host_lower = host.to_lowercase();

    if !config.allow_localhost {
        let blocked = BLOCKED_HOSTNAMES
            .iter()
            .any(|b| host_lower == *b || host_lower.ends_with(&format!(".{}", b)));
        if blocked {
            return Err(SecurityError::BlockedHost(host.to_string()));
        }
    }

    // IPv6 hosts come back bracketed from host_str
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = bare.parse::<IpAddr>() {
        if !config.allow_localhost && ip.is_loopback() {
            return Err(SecurityError::BlockedHost(host.to_string()));
        }
        if !config.allow_private_ips && is_private_ip(&ip) {
            return Err(SecurityError::BlockedHost(host.to_string()));
        }
        if is_link_local(&ip) {
            return Err(SecurityError::BlockedHost(host.to_string()));
        }
    }

    if let Some(ref allowed) = config.allowed_domains {
        let is_allowed = allowed.iter().any(|domain| {
            let domain = domain.to_lowercase();
            host_lower == domain || host_lower.ends_with(&format!(".{}", domain))
        });
        if !is_allowed {
            return Err(SecurityError::BlockedHost(format!(
                "{} is not in the allowed domains list",
                host
            )));
        }
    }

    Ok(url)
}

fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let octets = v4.octets();
            v4.is_private()
                // 100.64.0.0/10 carrier-grade NAT
                || (octets[0] == 100 && (octets[1] & 0xC0) == 64)
                || octets[0] == 0
        }
        // fc00::/7
        IpAddr::V6(v6) => (v6.segments()[0] & 0xfe00) == 0xfc00,
    }
}

fn is_link_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.octets()[0] == 169 && v4.octets()[1] == 254,
        IpAddr::V6(v6) => (v6.segments()[0] & 0xffc0) == 0xfe80,
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn extract_bearer(header: &str) -> Option<&str> {
    header
        .trim()
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Compare a presented owner token against the configured one in constant time
pub fn owner_token_matches(expected: &str, presented: Option<&str>) -> bool {
    match presented {
        Some(token) => bool::from(expected.as_bytes().ct_eq(token.as_bytes())),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_https_url() {
        let config = UrlValidationConfig::default();
        assert!(validate_provider_url("https://api.openai.com/v1", &config).is_ok());
    }

    #[test]
    fn test_http_blocked_by_default() {
        let config = UrlValidationConfig::default();
        let result = validate_provider_url("http://api.example.com", &config);
        assert!(matches!(result, Err(SecurityError::InvalidScheme(_))));
    }

    #[test]
    fn test_localhost_and_loopback_blocked() {
        let config = UrlValidationConfig::default();
        assert!(matches!(
            validate_provider_url("https://localhost:8080", &config),
            Err(SecurityError::BlockedHost(_))
        ));
        assert!(matches!(
            validate_provider_url("https://127.0.0.1:8080", &config),
            Err(SecurityError::BlockedHost(_))
        ));
        assert!(matches!(
            validate_provider_url("https://[::1]:8080", &config),
            Err(SecurityError::BlockedHost(_))
        ));
    }

    #[test]
    fn test_metadata_endpoint_blocked_even_in_development() {
        let config = UrlValidationConfig::development();
        assert!(validate_provider_url("http://169.254.169.254/latest/", &config).is_err());
    }

    #[test]
    fn test_private_ranges_blocked() {
        let config = UrlValidationConfig::default();
        for url in [
            "https://10.0.0.1",
            "https://192.168.1.1",
            "https://172.16.0.1",
            "https://100.64.0.1",
        ] {
            assert!(
                matches!(
                    validate_provider_url(url, &config),
                    Err(SecurityError::BlockedHost(_))
                ),
                "{} should be blocked",
                url
            );
        }
    }

    #[test]
    fn test_allowlist() {
        let config = UrlValidationConfig {
            allowed_domains: Some(vec!["api.openai.com".to_string()]),
            ..Default::default()
        };

        assert!(validate_provider_url("https://api.openai.com/v1", &config).is_ok());
        assert!(validate_provider_url("https://eu.api.openai.com/v1", &config).is_ok());
        assert!(matches!(
            validate_provider_url("https://api.example.com/v1", &config),
            Err(SecurityError::BlockedHost(_))
        ));
    }

    #[test]
    fn test_development_allows_local_stand_in() {
        let config = UrlValidationConfig::development();
        assert!(validate_provider_url("http://127.0.0.1:9000/v1", &config).is_ok());
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer("Bearer owner-secret"), Some("owner-secret"));
        assert_eq!(extract_bearer("  Bearer  spaced "), Some("spaced"));
        assert_eq!(extract_bearer("Bearer "), None);
        assert_eq!(extract_bearer("Basic abc"), None);
    }

    #[test]
    fn test_owner_token_matches() {
        assert!(owner_token_matches("secret", Some("secret")));
        assert!(!owner_token_matches("secret", Some("secret2")));
        assert!(!owner_token_matches("secret", Some("")));
        assert!(!owner_token_matches("secret", None));
    }
}
