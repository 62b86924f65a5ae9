//! Firewall resource and data source for Shieldoo.
//!
//! Maps host configuration into firewall payloads, validates rules locally
//! and reconciles them against the Shieldoo API.

#![deny(missing_docs)]

pub mod client;
pub mod data_source;
pub mod models;
pub mod normalize;
pub mod resource;

pub use client::FirewallClient;
pub use data_source::{FirewallDataSource, FirewallLookup};
pub use models::{Firewall, FirewallModel, FirewallRule, PortSpec, RuleConfig, RuleHost, RuleProtocol};
pub use normalize::{normalize_firewall, normalize_firewall_rule};
pub use resource::{FirewallResource, RESOURCE_TYPE};

/// Convenient result alias that reuses the shared Shieldoo error type.
pub type Result<T> = shieldoo_core::Result<T>;
