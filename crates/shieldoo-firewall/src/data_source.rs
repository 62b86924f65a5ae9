//! `shieldoo_firewall` data source: look up an existing firewall by name.

use crate::client::FirewallClient;
use crate::Result;
use serde::{Deserialize, Serialize};
use shieldoo_core::ShieldooClient;

/// Data source type name registered with the host runtime.
pub const DATA_SOURCE_TYPE: &str = "shieldoo_firewall";

/// Result of a firewall lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallLookup {
    /// Name that was looked up
    pub name: String,
    /// Id of the matching firewall
    pub id: String,
}

/// Read-only firewall lookup.
#[derive(Debug, Clone)]
pub struct FirewallDataSource {
    client: FirewallClient,
}

impl FirewallDataSource {
    /// Create a data source using a shared client.
    #[must_use]
    pub const fn new(client: ShieldooClient) -> Self {
        Self {
            client: FirewallClient::new(client),
        }
    }

    /// Find the firewall called `name`.
    ///
    /// # Errors
    ///
    /// Absence is an error here, unlike resource reads.
    pub async fn read(&self, name: &str) -> Result<FirewallLookup> {
        let firewall = self
            .client
            .get_firewall(name)
            .await
            .map_err(|err| err.traced("read firewall data source"))?;
        Ok(FirewallLookup {
            name: name.to_string(),
            id: firewall.id,
        })
    }
}
