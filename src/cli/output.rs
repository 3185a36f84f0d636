//! Output formatting for `snmp-discover`.
//!
//! JSON output mirrors the REST payloads. Human output is one aligned line
//! per record.

use crate::cli::args::OutputFormat;
use crate::discovery::{BgpDiscovery, InterfaceDiscovery, PingReply};
use crate::error::{Error, ErrorClass};
use serde::Serialize;
use std::io::{self, Write};
use std::time::Duration;

/// Process exit code for a failed call.
///
/// | Class | Code |
/// |---|---|
/// | invalid input | 2 |
/// | timeout | 3 |
/// | other | 1 |
pub fn exit_code(err: &Error) -> u8 {
    match err.class() {
        ErrorClass::InvalidInput => 2,
        ErrorClass::Timeout => 3,
        ErrorClass::Failure => 1,
    }
}

/// Error body, as a REST shell would answer.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub status: u16,
}

impl From<&Error> for ErrorBody {
    fn from(err: &Error) -> Self {
        Self {
            error: err.to_string(),
            status: err.class().status_code(),
        }
    }
}

/// Failed ping body.
#[derive(Debug, Serialize)]
pub struct PingFailure {
    pub ok: bool,
    pub error: String,
}

/// Output context for formatting.
pub struct OutputContext {
    pub format: OutputFormat,
    pub show_timing: bool,
}

impl OutputContext {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            show_timing: false,
        }
    }

    pub fn write_interfaces<W: Write>(
        &self,
        w: &mut W,
        result: &InterfaceDiscovery,
        elapsed: Duration,
    ) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            return write_json(w, result);
        }

        let name_width = column_width(result.interfaces.iter().map(|i| i.name.as_str()), "NAME");
        writeln!(w, "{:<8} {:<name_width$} {:>5}  DESC", "INDEX", "NAME", "TYPE")?;
        for interface in &result.interfaces {
            writeln!(
                w,
                "{:<8} {:<name_width$} {:>5}  {}",
                interface.index, interface.name, interface.if_type, interface.desc
            )?;
        }
        writeln!(w, "\n{} interface(s) on {}", result.count, result.device)?;
        self.write_timing(w, elapsed)
    }

    pub fn write_bgp_peers<W: Write>(
        &self,
        w: &mut W,
        result: &BgpDiscovery,
        elapsed: Duration,
    ) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            return write_json(w, result);
        }

        writeln!(w, "Local AS: {}", result.local_asn)?;
        let ip_width = column_width(result.peers.iter().map(|p| p.ip.as_str()), "PEER");
        writeln!(w, "{:<ip_width$} {:>10}  NAME", "PEER", "ASN")?;
        for peer in &result.peers {
            writeln!(w, "{:<ip_width$} {:>10}  {}", peer.ip, peer.asn, peer.name)?;
        }
        writeln!(w, "\n{} peer(s) on {}", result.count, result.device)?;
        self.write_timing(w, elapsed)
    }

    pub fn write_ping<W: Write>(&self, w: &mut W, reply: &PingReply, elapsed: Duration) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            return write_json(w, reply);
        }

        if reply.sys_name.is_empty() {
            writeln!(w, "ok")?;
        } else {
            writeln!(w, "ok: {}", reply.sys_name)?;
        }
        self.write_timing(w, elapsed)
    }

    /// Report a failed call.
    ///
    /// JSON errors go to `w`; human errors go to `err_w`.
    pub fn write_error<W: Write, E: Write>(
        &self,
        w: &mut W,
        err_w: &mut E,
        err: &Error,
        ping: bool,
    ) -> io::Result<()> {
        match self.format {
            OutputFormat::Json if ping => write_json(
                w,
                &PingFailure {
                    ok: false,
                    error: err.to_string(),
                },
            ),
            OutputFormat::Json => write_json(w, &ErrorBody::from(err)),
            OutputFormat::Human => writeln!(err_w, "Error ({}): {}", err.class(), err),
        }
    }

    fn write_timing<W: Write>(&self, w: &mut W, elapsed: Duration) -> io::Result<()> {
        if self.show_timing {
            writeln!(w, "Timing: {:.1}ms", elapsed.as_secs_f64() * 1000.0)?;
        }
        Ok(())
    }
}

fn write_json<W: Write, T: Serialize>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    writeln!(w, "{}", json)
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str) -> usize {
    values
        .map(|v| v.chars().count())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0)
}
