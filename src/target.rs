//! Device targets.
//!
//! A [`Target`] is the validated `(ip, community, port)` triple a discovery
//! call is made against. Validation happens before any socket is opened.
//! The community string is a credential: it is never included in `Debug`
//! or `Display` output, so targets can be logged freely.

use std::net::{IpAddr, SocketAddr};

use crate::error::{Error, InputField, Result};
use crate::transport::TransportKind;

/// Default SNMP agent port.
pub const DEFAULT_PORT: u16 = 161;

/// A validated SNMP device target.
#[derive(Clone, PartialEq, Eq)]
pub struct Target {
    host: String,
    community: String,
    port: u16,
}

impl Target {
    /// Validate and build a target.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] when `ip` is empty or contains whitespace,
    /// `community` is empty, or `port` is 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use snmp_discovery::Target;
    ///
    /// let target = Target::new("10.0.0.1", "public", 161).unwrap();
    /// assert_eq!(target.to_string(), "10.0.0.1:161");
    /// assert!(!format!("{target:?}").contains("public"));
    ///
    /// assert!(Target::new("", "public", 161).is_err());
    /// assert!(Target::new("10.0.0.1", "", 161).is_err());
    /// ```
    pub fn new(ip: &str, community: &str, port: u16) -> Result<Self> {
        let host = ip.trim();
        if host.is_empty() {
            return Err(Error::invalid_input(InputField::Ip, "is required"));
        }
        if host.chars().any(char::is_whitespace) {
            return Err(Error::invalid_input(InputField::Ip, "must not contain whitespace"));
        }
        if community.is_empty() {
            return Err(Error::invalid_input(InputField::Community, "is required"));
        }
        if port == 0 {
            return Err(Error::invalid_input(InputField::Port, "must be between 1 and 65535"));
        }

        // Accept bracketed IPv6 literals as typed in URLs.
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);

        Ok(Self {
            host: host.to_string(),
            community: community.to_string(),
            port,
        })
    }

    /// Host name or address as supplied by the caller.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The community string. Do not log this.
    pub fn community(&self) -> &str {
        &self.community
    }

    /// Resolve the target to a socket address of the requested family.
    ///
    /// IP literals resolve without a DNS lookup.
    pub async fn resolve(&self, kind: TransportKind) -> Result<SocketAddr> {
        if let Ok(ip) = self.host.parse::<IpAddr>() {
            let addr = SocketAddr::new(ip, self.port);
            if kind.accepts(&addr) {
                return Ok(addr);
            }
            return Err(Error::Io {
                target: Some(addr),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("address family does not match transport {kind}"),
                ),
            });
        }

        let resolved = tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|source| Error::Io {
                target: None,
                source,
            })?;

        resolved
            .into_iter()
            .find(|addr| kind.accepts(addr))
            .ok_or_else(|| Error::Io {
                target: None,
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("could not resolve {} to a {kind} address", self.host),
                ),
            })
    }
}

impl std::fmt::Debug for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Target")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("community", &"<redacted>")
            .finish()
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
