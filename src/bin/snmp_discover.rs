//! snmp-discover: discover interfaces and BGP peers of a device.
//!
//! Part of the snmp-discovery CLI utilities.

use snmp_discovery::cli::args::{CommonArgs, OutputArgs};
use snmp_discovery::cli::output::{OutputContext, exit_code};
use snmp_discovery::{Gateway, GatewayConfig};
use clap::{Parser, Subcommand};
use std::io;
use std::process::ExitCode;
use std::time::Instant;

/// Discover interfaces and BGP peers over SNMP.
///
/// Defaults come from the SNMP_* environment variables; options given here
/// override them.
#[derive(Debug, Parser)]
#[command(name = "snmp-discover", version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List interfaces (IF-MIB).
    Interfaces(CommonArgs),
    /// List BGP peers and the local AS (BGP4-MIB).
    BgpPeers(CommonArgs),
    /// Check that the device answers and print its sysName.
    Ping(CommonArgs),
}

impl Command {
    fn common(&self) -> &CommonArgs {
        match self {
            Command::Interfaces(common) | Command::BgpPeers(common) | Command::Ping(common) => {
                common
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    args.output.init_tracing();

    let base = GatewayConfig::from_env();
    for warning in base.warnings() {
        tracing::warn!(target: "snmp_discovery::config", "{}", warning);
    }

    let common = args.command.common();
    let gateway = Gateway::new(common.config(base));
    let ctx = OutputContext {
        format: args.output.format,
        show_timing: args.output.timing,
    };

    let mut stdout = io::stdout();
    let start = Instant::now();

    let outcome = match common.target() {
        Err(e) => Err(e),
        Ok(target) => match &args.command {
            Command::Interfaces(_) => gateway
                .discover_interfaces(&target)
                .await
                .map(|result| ctx.write_interfaces(&mut stdout, &result, start.elapsed())),
            Command::BgpPeers(_) => gateway
                .discover_bgp_peers(&target)
                .await
                .map(|result| ctx.write_bgp_peers(&mut stdout, &result, start.elapsed())),
            Command::Ping(_) => gateway
                .ping(&target)
                .await
                .map(|reply| ctx.write_ping(&mut stdout, &reply, start.elapsed())),
        },
    };

    match outcome {
        Ok(Ok(())) => ExitCode::SUCCESS,
        Ok(Err(e)) => {
            eprintln!("Error writing output: {}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            let ping = matches!(args.command, Command::Ping(_));
            if let Err(write_err) = ctx.write_error(&mut stdout, &mut io::stderr(), &e, ping) {
                eprintln!("Error writing output: {}", write_err);
            }
            ExitCode::from(exit_code(&e))
        }
    }
}
