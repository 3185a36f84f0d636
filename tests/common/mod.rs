//! Shared test utilities for snmp-discovery integration tests.

// Allow dead code and unused imports since not all test files use all utilities
#![allow(dead_code)]
#![allow(unused_imports)]

mod agent;
mod device;
mod fixtures;

pub use agent::{EchoAgent, Replies};
pub use device::{Device, DeviceTransport, Request};
pub use fixtures::*;
