//! Validation of servers before submission.

use crate::models::{Listener, Server};
use shieldoo_core::{Error, Result};
use std::ops::RangeInclusive;

const PORT_RANGE: RangeInclusive<i64> = 1..=65535;

/// Validate ports and protocol of one listener.
///
/// # Errors
///
/// Returns [`Error::ValidationError`] naming the offending field and value.
pub fn normalize_server_listener(listener: &Listener) -> Result<()> {
    check_port("listen_port", listener.listen_port)?;
    check_port("forward_port", listener.forward_port)?;
    if listener.protocol != "tcp" && listener.protocol != "udp" {
        return Err(Error::ValidationError(format!(
            "protocol {:?} must be tcp or udp",
            listener.protocol
        )));
    }
    Ok(())
}

fn check_port(field: &str, port: i64) -> Result<()> {
    if PORT_RANGE.contains(&port) {
        return Ok(());
    }
    Err(Error::ValidationError(format!(
        "{field} {port} must be between 1 and 65535"
    )))
}

/// Validate a server: it must reference a firewall, and every listener must
/// be valid. Stops at the first error.
///
/// # Errors
///
/// Returns the first validation error.
pub fn normalize_server(server: &Server) -> Result<()> {
    if server.firewall.id.is_empty() {
        return Err(Error::ValidationError(format!(
            "server {} must reference a firewall id",
            server.name
        )));
    }
    server.listeners.iter().try_for_each(normalize_server_listener)
}
