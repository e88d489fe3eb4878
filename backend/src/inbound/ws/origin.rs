//! Origin allow-list for WebSocket upgrades.
//!
//! Entries are origins such as `https://spin.example.com`. A leading `*.` on
//! the host (`https://*.example.com`) admits any subdomain. HTTP requests from
//! `localhost` with an explicit non-zero port are admitted when local origins
//! are enabled.

use actix_web::http::header::HeaderValue;
use tracing::{error, warn};
use url::Url;

const LOCALHOST: &str = "localhost";
const WILDCARD_PREFIX: &str = "*.";

#[derive(Debug, Clone, PartialEq, Eq)]
enum HostRule {
    Exact(String),
    Subdomain(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct OriginRule {
    scheme: String,
    host: HostRule,
    port: Option<u16>,
}

impl OriginRule {
    fn parse(raw: &str) -> Result<Self, OriginPolicyError> {
        let invalid = || OriginPolicyError::InvalidEntry(raw.to_owned());
        let (scheme, rest) = raw.trim().split_once("://").ok_or_else(invalid)?;
        let (host, wildcard) = match rest.strip_prefix(WILDCARD_PREFIX) {
            Some(suffix) => (suffix, true),
            None => (rest, false),
        };
        let url = Url::parse(&format!("{scheme}://{host}")).map_err(|_| invalid())?;
        let host = url.host_str().ok_or_else(invalid)?.to_owned();
        if url.path() != "/" || url.query().is_some() {
            return Err(invalid());
        }
        Ok(Self {
            scheme: url.scheme().to_owned(),
            host: if wildcard {
                HostRule::Subdomain(format!(".{host}"))
            } else {
                HostRule::Exact(host)
            },
            port: url.port(),
        })
    }

    fn matches(&self, origin: &Url, host: &str) -> bool {
        if origin.scheme() != self.scheme || origin.port() != self.port {
            return false;
        }
        match &self.host {
            HostRule::Exact(expected) => host == expected,
            HostRule::Subdomain(suffix) => host
                .strip_suffix(suffix.as_str())
                .is_some_and(|label| !label.is_empty()),
        }
    }
}

/// Errors raised while building an [`OriginPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OriginPolicyError {
    #[error("invalid WebSocket origin entry: {0}")]
    InvalidEntry(String),
}

/// Origins allowed to open live connections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginPolicy {
    rules: Vec<OriginRule>,
    allow_localhost: bool,
}

impl OriginPolicy {
    /// Parse configured entries.
    ///
    /// # Examples
    /// ```
    /// use spinwheel::inbound::ws::origin::OriginPolicy;
    ///
    /// let policy = OriginPolicy::new(["https://*.example.com"], false).expect("valid");
    /// assert!(policy.allows_str("https://spin.example.com"));
    /// assert!(!policy.allows_str("https://example.com.evil.test"));
    /// ```
    pub fn new<I, S>(entries: I, allow_localhost: bool) -> Result<Self, OriginPolicyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = entries
            .into_iter()
            .filter(|entry| !entry.as_ref().trim().is_empty())
            .map(|entry| OriginRule::parse(entry.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            rules,
            allow_localhost,
        })
    }

    /// True when no origin can ever be admitted.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && !self.allow_localhost
    }

    /// Whether a parsed origin is admitted.
    pub fn allows(&self, origin: &Url) -> bool {
        let Some(host) = origin.host_str() else {
            return false;
        };
        if self.allow_localhost && origin.scheme() == "http" && host == LOCALHOST {
            return matches!(origin.port(), Some(port) if port != 0);
        }
        self.rules.iter().any(|rule| rule.matches(origin, host))
    }

    /// Whether a raw origin string is admitted.
    pub fn allows_str(&self, origin: &str) -> bool {
        Url::parse(origin).is_ok_and(|url| self.allows(&url))
    }

    /// Check the `Origin` header of an upgrade request.
    pub fn validate(&self, origin_header: &HeaderValue) -> actix_web::Result<()> {
        let origin_value = origin_header.to_str().map_err(|error| {
            error!(error = %error, "Failed to parse Origin header as string");
            actix_web::error::ErrorBadRequest("Invalid Origin header")
        })?;
        let origin = Url::parse(origin_value).map_err(|error| {
            error!(error = %error, "Failed to parse Origin header as URL");
            actix_web::error::ErrorBadRequest("Invalid Origin header")
        })?;
        if self.allows(&origin) {
            Ok(())
        } else {
            warn!(origin = origin_value, "Rejected WS upgrade due to disallowed Origin");
            Err(actix_web::error::ErrorForbidden("Origin not allowed"))
        }
    }
}
