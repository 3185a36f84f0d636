//! Prelude module for convenient imports.
//!
//! ```rust,no_run
//! use snmp_discovery::prelude::*;
//! ```
//!
//! This imports the gateway and its configuration, the request and result
//! types, error handling, and the [`oid!`] macro.

pub use crate::config::GatewayConfig;
pub use crate::discovery::{BgpPeerRecord, Gateway, InterfaceRecord};
pub use crate::error::{Error, Result};
pub use crate::oid::Oid;
pub use crate::target::Target;
pub use crate::value::Value;
pub use crate::varbind::VarBind;
pub use crate::version::Version;

#[doc(no_inline)]
pub use crate::oid;
