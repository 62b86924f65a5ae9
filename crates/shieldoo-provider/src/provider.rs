//! Provider configuration and wiring of resources and data sources.

use crate::Result;
use serde_json::Value;
use shieldoo_core::attributes::decode;
use shieldoo_core::{ProviderConfig, ProviderSettings, ShieldooClient};
use shieldoo_firewall::{FirewallDataSource, FirewallResource};
use shieldoo_server::{ServerDataSource, ServerResource};
use tracing::info;

/// Provider type name; resource type names are prefixed with it.
pub const PROVIDER_TYPE: &str = "shieldoo";

/// Resource types served by this provider.
pub const RESOURCE_TYPES: [&str; 2] = [
    shieldoo_firewall::RESOURCE_TYPE,
    shieldoo_server::RESOURCE_TYPE,
];

/// Data source types served by this provider.
pub const DATA_SOURCE_TYPES: [&str; 2] = [
    shieldoo_firewall::data_source::DATA_SOURCE_TYPE,
    shieldoo_server::data_source::DATA_SOURCE_TYPE,
];

/// A configured provider.
///
/// One [`ShieldooClient`] is built at configure time; every resource and
/// data source receives a clone of it.
#[derive(Debug, Clone)]
pub struct Provider {
    config: ProviderConfig,
    client: ShieldooClient,
}

impl Provider {
    /// Configure from the host's provider block, falling back to the process
    /// environment for unset values.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the endpoint or API key is missing
    /// or invalid.
    pub fn configure(settings: &ProviderSettings) -> Result<Self> {
        Self::from_config(ProviderConfig::resolve(settings)?)
    }

    /// Configure using a custom environment lookup.
    ///
    /// # Errors
    ///
    /// See [`Provider::configure`].
    pub fn configure_with_env<F>(settings: &ProviderSettings, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_config(ProviderConfig::resolve_with_env(settings, env)?)
    }

    /// Configure from the provider block as a raw attribute tree.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the tree is malformed, otherwise see
    /// [`Provider::configure`].
    pub fn configure_from_attributes(tree: &Value) -> Result<Self> {
        let settings: ProviderSettings = decode("provider configuration", tree)?;
        Self::configure(&settings)
    }

    /// Build a provider from an already validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built.
    pub fn from_config(config: ProviderConfig) -> Result<Self> {
        let client =
            ShieldooClient::from_config(&config).map_err(|err| err.traced("configure provider"))?;
        info!(
            endpoint = %config.endpoint,
            test_mode = config.test_mode,
            mapping = ?config.mapping,
            "configured Shieldoo provider"
        );
        Ok(Self { config, client })
    }

    /// The resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// The shared API client.
    #[must_use]
    pub const fn client(&self) -> &ShieldooClient {
        &self.client
    }

    /// Reconciler for `shieldoo_firewall`.
    #[must_use]
    pub fn firewall_resource(&self) -> FirewallResource {
        FirewallResource::new(self.client.clone(), self.config.mapping)
    }

    /// Reconciler for `shieldoo_server`.
    #[must_use]
    pub fn server_resource(&self) -> ServerResource {
        ServerResource::new(self.client.clone(), self.config.mapping)
    }

    /// Data source for `shieldoo_firewall`.
    #[must_use]
    pub fn firewall_data_source(&self) -> FirewallDataSource {
        FirewallDataSource::new(self.client.clone())
    }

    /// Data source for `shieldoo_server`.
    #[must_use]
    pub fn server_data_source(&self) -> ServerDataSource {
        ServerDataSource::new(self.client.clone())
    }
}
