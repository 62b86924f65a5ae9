//! Firewall operations on top of the shared Shieldoo client.

use crate::models::Firewall;
use crate::Result;
use shieldoo_core::{Entity, ShieldooClient};

/// Typed firewall client.
#[derive(Debug, Clone)]
pub struct FirewallClient {
    inner: ShieldooClient,
}

impl FirewallClient {
    /// Wrap a shared client.
    #[must_use]
    pub const fn new(inner: ShieldooClient) -> Self {
        Self { inner }
    }

    /// Look up a firewall by name.
    pub async fn get_firewall(&self, name: &str) -> Result<Firewall> {
        self.inner.get(Entity::Firewalls, name).await
    }

    /// Create a firewall.
    pub async fn create_firewall(&self, firewall: &Firewall) -> Result<Firewall> {
        self.inner.create(Entity::Firewalls, firewall).await
    }

    /// Update a firewall in place, addressed by its id.
    pub async fn update_firewall(&self, firewall: &Firewall) -> Result<Firewall> {
        self.inner
            .update(Entity::Firewalls, &firewall.id, firewall)
            .await
    }

    /// Delete a firewall.
    pub async fn delete_firewall(&self, id: &str) -> Result<()> {
        self.inner.delete(Entity::Firewalls, id).await
    }
}
