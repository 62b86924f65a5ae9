//! Server resource and data source for Shieldoo.
//!
//! Servers are overlay network members bound to a firewall. Creating one
//! makes the API generate an agent configuration, which is kept secret and
//! surfaced to the host runtime as sensitive state.

#![deny(missing_docs)]

pub mod client;
pub mod data_source;
pub mod models;
pub mod normalize;
pub mod resource;

pub use client::ServerClient;
pub use data_source::{ServerDataSource, ServerLookup};
pub use models::{FirewallRef, Listener, ListenerConfig, OsUpdatePolicy, Server, ServerModel};
pub use normalize::{normalize_server, normalize_server_listener};
pub use resource::{ServerResource, RESOURCE_TYPE};

/// Convenient result alias that reuses the shared Shieldoo error type.
pub type Result<T> = shieldoo_core::Result<T>;
