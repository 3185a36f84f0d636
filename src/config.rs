//! Gateway configuration.
//!
//! [`GatewayConfig`] is built once at startup and handed to
//! [`Gateway::new`](crate::Gateway::new). It is read-only afterwards, so
//! concurrent discovery calls share it without coordination.
//!
//! | Field | Environment variable | Default |
//! |---|---|---|
//! | `max_repetitions` | `SNMP_MAX_REPETITIONS` | 20 |
//! | `global_timeout` | `SNMP_GLOBAL_TIMEOUT_MS` | 60000 ms |
//! | `step_timeout` | `SNMP_STEP_TIMEOUT_MS` | 5000 ms |
//! | `session.timeout` | `SNMP_TIMEOUT_MS` | 5000 ms |
//! | `session.retries` | `SNMP_RETRIES` | 1 |
//! | `bgp_peer_description` | `SNMP_BGP_PEER_DESCR_OID` | `1.3.6.1.2.1.15.3.1.18` |

use std::time::Duration;

use crate::mib;
use crate::oid::Oid;
use crate::session::SessionOptions;

pub const ENV_MAX_REPETITIONS: &str = "SNMP_MAX_REPETITIONS";
pub const ENV_GLOBAL_TIMEOUT_MS: &str = "SNMP_GLOBAL_TIMEOUT_MS";
pub const ENV_STEP_TIMEOUT_MS: &str = "SNMP_STEP_TIMEOUT_MS";
pub const ENV_TIMEOUT_MS: &str = "SNMP_TIMEOUT_MS";
pub const ENV_RETRIES: &str = "SNMP_RETRIES";
pub const ENV_BGP_PEER_DESCR_OID: &str = "SNMP_BGP_PEER_DESCR_OID";

/// Global timeouts below this are almost certainly a unit mistake.
const MIN_SENSIBLE_GLOBAL_TIMEOUT: Duration = Duration::from_millis(1000);

/// Discovery settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// Rows requested per GETBULK round.
    pub max_repetitions: u32,
    /// Outer bound for a whole discovery call.
    pub global_timeout: Duration,
    /// Bound for single-shot GETs (local AS, ping).
    pub step_timeout: Duration,
    /// Options for the per-call session.
    pub session: SessionOptions,
    /// Vendor peer-description column, `None` to skip the lookup.
    pub bgp_peer_description: Option<Oid>,
    /// Problems found while loading, reported by [`warnings`](Self::warnings).
    load_warnings: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_repetitions: 20,
            global_timeout: Duration::from_millis(60_000),
            step_timeout: Duration::from_millis(5_000),
            session: SessionOptions::default(),
            bgp_peer_description: Some(mib::bgp_peer_description()),
            load_warnings: Vec::new(),
        }
    }
}

impl GatewayConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to read variables.
    ///
    /// Unset or blank variables keep their defaults. Unparseable values keep
    /// the default and are reported by [`warnings`](Self::warnings).
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use snmp_discovery::GatewayConfig;
    ///
    /// let config = GatewayConfig::from_lookup(|key| match key {
    ///     "SNMP_MAX_REPETITIONS" => Some("50".into()),
    ///     "SNMP_GLOBAL_TIMEOUT_MS" => Some("15000".into()),
    ///     _ => None,
    /// });
    /// assert_eq!(config.max_repetitions, 50);
    /// assert_eq!(config.global_timeout, Duration::from_secs(15));
    /// assert!(config.warnings().is_empty());
    /// ```
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(raw) = get(ENV_MAX_REPETITIONS) {
            match raw.parse::<i64>() {
                Ok(n) if n >= 1 => config.max_repetitions = u32::try_from(n).unwrap_or(u32::MAX),
                Ok(_) => {
                    let warning = format!(
                        "{ENV_MAX_REPETITIONS} should be >= 1 (current='{raw}'), using {}",
                        config.max_repetitions
                    );
                    config.load_warnings.push(warning);
                }
                Err(_) => config.reject(ENV_MAX_REPETITIONS, &raw),
            }
        }
        if let Some(raw) = get(ENV_GLOBAL_TIMEOUT_MS) {
            match raw.parse::<u64>() {
                Ok(ms) => config.global_timeout = Duration::from_millis(ms),
                Err(_) => config.reject(ENV_GLOBAL_TIMEOUT_MS, &raw),
            }
        }
        if let Some(raw) = get(ENV_STEP_TIMEOUT_MS) {
            match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => config.step_timeout = Duration::from_millis(ms),
                _ => config.reject(ENV_STEP_TIMEOUT_MS, &raw),
            }
        }
        if let Some(raw) = get(ENV_TIMEOUT_MS) {
            match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => config.session.timeout = Duration::from_millis(ms),
                _ => config.reject(ENV_TIMEOUT_MS, &raw),
            }
        }
        if let Some(raw) = get(ENV_RETRIES) {
            match raw.parse::<u32>() {
                Ok(retries) => config.session.retries = retries,
                Err(_) => config.reject(ENV_RETRIES, &raw),
            }
        }
        // Set but blank disables the description lookup.
        if let Some(raw) = lookup(ENV_BGP_PEER_DESCR_OID) {
            let raw = raw.trim();
            if raw.is_empty() {
                config.bgp_peer_description = None;
            } else {
                match Oid::parse(raw) {
                    Ok(oid) => config.bgp_peer_description = Some(oid),
                    Err(_) => config.reject(ENV_BGP_PEER_DESCR_OID, raw),
                }
            }
        }

        config
    }

    fn reject(&mut self, key: &str, raw: &str) {
        self.load_warnings
            .push(format!("ignoring invalid {key}='{raw}', using default"));
    }

    /// Human-readable problems with this configuration.
    ///
    /// Covers values that failed to load and values that load but are
    /// suspicious, such as a global timeout under one second.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = self.load_warnings.clone();
        if self.global_timeout < MIN_SENSIBLE_GLOBAL_TIMEOUT {
            warnings.push(format!(
                "{ENV_GLOBAL_TIMEOUT_MS} seems too low (current={}ms)",
                self.global_timeout.as_millis()
            ));
        }
        if self.step_timeout > self.global_timeout {
            warnings.push(format!(
                "step timeout {}ms exceeds global timeout {}ms",
                self.step_timeout.as_millis(),
                self.global_timeout.as_millis()
            ));
        }
        warnings
    }

    /// Set rows per GETBULK round (minimum 1).
    pub fn max_repetitions(mut self, max_repetitions: u32) -> Self {
        self.max_repetitions = max_repetitions.max(1);
        self
    }

    pub fn global_timeout(mut self, timeout: Duration) -> Self {
        self.global_timeout = timeout;
        self
    }

    pub fn step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = timeout;
        self
    }

    pub fn session(mut self, session: SessionOptions) -> Self {
        self.session = session;
        self
    }

    pub fn bgp_peer_description(mut self, column: Option<Oid>) -> Self {
        self.bgp_peer_description = column;
        self
    }
}
