//! Shieldoo provider for infrastructure-as-code hosts.
//!
//! Resolves the provider configuration, builds one shared API client and
//! exposes the `shieldoo_firewall` and `shieldoo_server` resources and data
//! sources to the host runtime.

#![deny(missing_docs)]

pub mod provider;

pub use provider::{Provider, DATA_SOURCE_TYPES, PROVIDER_TYPE, RESOURCE_TYPES};
pub use shieldoo_core::{Error, MappingPolicy, ProviderConfig, ProviderSettings};
pub use shieldoo_firewall::{FirewallDataSource, FirewallModel, FirewallResource};
pub use shieldoo_server::{ServerDataSource, ServerModel, ServerResource};

/// Convenient result alias that reuses the shared Shieldoo error type.
pub type Result<T> = shieldoo_core::Result<T>;
