//! URL and hostname validation
//!
//! Destination URLs must be http(s); dangerous schemes are rejected early.

use url::{Host, Url};

#[derive(Debug)]
pub enum UrlValidationError {
    EmptyUrl,
    InvalidProtocol(String),
    DangerousProtocol(String),
    InvalidFormat(String),
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "URL cannot be empty"),
            Self::InvalidProtocol(proto) => write!(
                f,
                "Invalid protocol: {}. Only http:// and https:// are allowed",
                proto
            ),
            Self::DangerousProtocol(proto) => {
                write!(f, "Dangerous protocol blocked: {}", proto)
            }
            Self::InvalidFormat(msg) => write!(f, "Invalid URL format: {}", msg),
        }
    }
}

impl std::error::Error for UrlValidationError {}

const DANGEROUS_PROTOCOLS: &[&str] = &[
    "javascript:",
    "data:",
    "file:",
    "vbscript:",
    "about:",
    "blob:",
];

pub fn validate_url(url: &str) -> Result<(), UrlValidationError> {
    let url = url.trim();

    if url.is_empty() {
        return Err(UrlValidationError::EmptyUrl);
    }

    let url_lower = url.to_lowercase();

    for proto in DANGEROUS_PROTOCOLS {
        if url_lower.starts_with(proto) {
            return Err(UrlValidationError::DangerousProtocol(proto.to_string()));
        }
    }

    if !url_lower.starts_with("http://") && !url_lower.starts_with("https://") {
        let proto = url_lower
            .split(':')
            .next()
            .map(|s| format!("{}:", s))
            .unwrap_or_default();
        return Err(UrlValidationError::InvalidProtocol(proto));
    }

    Url::parse(url).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    Ok(())
}

/// Validate a custom-domain hostname and return its lowercase ASCII form
///
/// Parsed with `url::Host`, so IDNs come back punycoded and IP literals are
/// rejected. On top of that: at least two labels, each a DNS label
/// (`[a-z0-9-]`, 1-63 chars, no edge hyphens), and a non-numeric TLD.
pub fn normalize_hostname(input: &str) -> Option<String> {
    let trimmed = input.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    let host = match Host::parse(trimmed).ok()? {
        Host::Domain(domain) => domain,
        Host::Ipv4(_) | Host::Ipv6(_) => return None,
    };
    if host.len() > 253 {
        return None;
    }

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return None;
    }

    // Host::parse still lets `_` and edge hyphens through
    let label_ok = |label: &str| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    };
    if !labels.iter().all(|l| label_ok(l)) {
        return None;
    }

    let tld = labels.last()?;
    if tld.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    Some(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_urls() {
        assert!(validate_url("http://example.com").is_ok());
        assert!(validate_url("https://example.com/path?query=1").is_ok());
        assert!(validate_url("http://localhost:8080").is_ok());
    }

    #[test]
    fn test_dangerous_protocols() {
        assert!(matches!(
            validate_url("javascript:alert(1)"),
            Err(UrlValidationError::DangerousProtocol(_))
        ));
        assert!(matches!(
            validate_url("data:text/html,<script>alert(1)</script>"),
            Err(UrlValidationError::DangerousProtocol(_))
        ));
    }

    #[test]
    fn test_invalid_protocols_and_format() {
        assert!(matches!(
            validate_url("ftp://example.com"),
            Err(UrlValidationError::InvalidProtocol(_))
        ));
        assert!(matches!(validate_url("   "), Err(UrlValidationError::EmptyUrl)));
        assert!(matches!(
            validate_url("http://"),
            Err(UrlValidationError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_normalize_hostname() {
        assert_eq!(
            normalize_hostname("Go.Example.COM").as_deref(),
            Some("go.example.com")
        );
        assert_eq!(
            normalize_hostname("abc123.link-test.com.").as_deref(),
            Some("abc123.link-test.com")
        );
        assert!(normalize_hostname("localhost").is_none());
        assert!(normalize_hostname("-bad.example.com").is_none());
        assert!(normalize_hostname("under_score.com").is_none());
        assert!(normalize_hostname("https://example.com").is_none());
        assert!(normalize_hostname("10.0.0.1").is_none());
        assert!(normalize_hostname("[::1]").is_none());
        assert!(normalize_hostname("example.com:8080").is_none());
        assert!(normalize_hostname("a..example.com").is_none());
    }

    #[test]
    fn test_normalize_hostname_punycodes_idn() {
        assert_eq!(
            normalize_hostname("Bücher.Example").as_deref(),
            Some("xn--bcher-kva.example")
        );
        assert_eq!(
            normalize_hostname("xn--bcher-kva.example").as_deref(),
            Some("xn--bcher-kva.example")
        );
    }
}
