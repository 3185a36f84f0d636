//! CLI utilities for snmp-discovery.
//!
//! Argument parsing and output formatting for the `snmp-discover` binary.
//!
//! This module is only available with the `cli` feature.

pub mod args;
pub mod output;
