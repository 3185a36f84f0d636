//! Command-line argument structures for `snmp-discover`.

use clap::{Parser, ValueEnum};
use std::time::Duration;

use crate::config::GatewayConfig;
use crate::target::{DEFAULT_PORT, Target};
use crate::transport::TransportKind;
use crate::version::Version;

/// SNMP version for CLI argument parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SnmpVersion {
    /// SNMPv1
    #[value(name = "1")]
    V1,
    /// SNMPv2c (default)
    #[default]
    #[value(name = "2c")]
    V2c,
}

impl From<SnmpVersion> for Version {
    fn from(v: SnmpVersion) -> Self {
        match v {
            SnmpVersion::V1 => Version::V1,
            SnmpVersion::V2c => Version::V2c,
        }
    }
}

/// Output format for CLI tools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable columns.
    #[default]
    Human,
    /// JSON, in the same shape a REST caller receives.
    Json,
}

/// Device and session arguments shared by every subcommand.
///
/// Unset options fall back to the `SNMP_*` environment configuration.
#[derive(Debug, Parser)]
pub struct CommonArgs {
    /// Device IP address or hostname.
    #[arg(value_name = "IP")]
    pub ip: String,

    /// Community string.
    #[arg(short = 'c', long = "community", default_value = "public")]
    pub community: String,

    /// Agent UDP port.
    #[arg(short = 'p', long = "port", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// SNMP version: 1 or 2c.
    #[arg(short = 'v', long = "snmp-version", default_value = "2c")]
    pub snmp_version: SnmpVersion,

    /// Talk to the device over IPv6.
    #[arg(short = '6', long = "ipv6")]
    pub ipv6: bool,

    /// Per-request timeout in seconds.
    #[arg(short = 't', long = "timeout")]
    pub timeout: Option<f64>,

    /// Retry count.
    #[arg(short = 'r', long = "retries")]
    pub retries: Option<u32>,

    /// Timeout for the whole discovery call, in seconds.
    #[arg(long = "global-timeout")]
    pub global_timeout: Option<f64>,

    /// Timeout for single GETs (local AS, ping), in seconds.
    #[arg(long = "step-timeout")]
    pub step_timeout: Option<f64>,

    /// GETBULK max-repetitions.
    #[arg(long = "max-rep")]
    pub max_repetitions: Option<u32>,
}

impl CommonArgs {
    /// Validated device target.
    pub fn target(&self) -> crate::Result<Target> {
        Target::new(&self.ip, &self.community, self.port)
    }

    /// Apply command-line overrides on top of `base`.
    pub fn config(&self, base: GatewayConfig) -> GatewayConfig {
        let mut session = base.session;
        session.version = self.snmp_version.into();
        if self.ipv6 {
            session.transport = TransportKind::Udp6;
        }
        if let Some(timeout) = self.timeout.and_then(seconds) {
            session.timeout = timeout;
        }
        if let Some(retries) = self.retries {
            session.retries = retries;
        }

        let mut config = base.session(session);
        if let Some(timeout) = self.global_timeout.and_then(seconds) {
            config = config.global_timeout(timeout);
        }
        if let Some(timeout) = self.step_timeout.and_then(seconds) {
            config = config.step_timeout(timeout);
        }
        if let Some(max_repetitions) = self.max_repetitions {
            config = config.max_repetitions(max_repetitions);
        }
        config
    }
}

/// Negative, NaN and overflowing values are ignored.
fn seconds(value: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(value).ok()
}

/// Output control arguments.
#[derive(Debug, Parser)]
pub struct OutputArgs {
    /// Output format: human or json.
    #[arg(short = 'O', long = "output", default_value = "human")]
    pub format: OutputFormat,

    /// Show call timing.
    #[arg(long = "timing")]
    pub timing: bool,

    /// Enable debug logging (snmp_discovery=debug).
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Enable trace logging (snmp_discovery=trace).
    #[arg(short = 'D', long = "trace")]
    pub trace: bool,
}

impl OutputArgs {
    /// Initialize tracing based on debug/trace flags.
    ///
    /// Logs go to stderr so JSON on stdout stays parseable.
    pub fn init_tracing(&self) {
        use tracing_subscriber::EnvFilter;

        let filter = if self.trace {
            "snmp_discovery=trace"
        } else if self.debug {
            "snmp_discovery=debug"
        } else {
            "snmp_discovery=warn"
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(filter))
            .with_writer(std::io::stderr)
            .try_init();
    }
}
