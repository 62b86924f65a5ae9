//! `shieldoo_firewall` resource reconciler.

use crate::client::FirewallClient;
use crate::models::FirewallModel;
use crate::normalize::normalize_firewall;
use crate::Result;
use serde_json::{json, Value};
use shieldoo_core::{Error, MappingPolicy, ShieldooClient};
use tracing::{debug, info};

/// Resource type name registered with the host runtime.
pub const RESOURCE_TYPE: &str = "shieldoo_firewall";

/// Reconciles desired firewall configuration with the API.
#[derive(Debug, Clone)]
pub struct FirewallResource {
    client: FirewallClient,
    mapping: MappingPolicy,
}

impl FirewallResource {
    /// Create a reconciler using a shared client.
    #[must_use]
    pub const fn new(client: ShieldooClient, mapping: MappingPolicy) -> Self {
        Self {
            client: FirewallClient::new(client),
            mapping,
        }
    }

    /// Create the firewall described by `plan` and return the new state.
    ///
    /// # Errors
    ///
    /// Validation errors abort before any API call; API errors propagate.
    pub async fn create(&self, plan: FirewallModel) -> Result<FirewallModel> {
        let mut firewall = plan
            .to_firewall(self.mapping)
            .map_err(|err| err.traced("map firewall"))?;
        firewall.id.clear();
        normalize_firewall(&mut firewall).map_err(|err| err.traced("normalize firewall"))?;

        let created = self
            .client
            .create_firewall(&firewall)
            .await
            .map_err(|err| err.traced("create firewall"))?;

        info!(name = %plan.name, id = %created.id, "created firewall");
        Ok(FirewallModel {
            id: Some(created.id),
            ..plan
        })
    }

    /// Refresh `state` from the API.
    ///
    /// Returns `Ok(None)` when the firewall no longer exists, telling the
    /// host to drop it from state.
    ///
    /// # Errors
    ///
    /// Propagates every error other than absence.
    pub async fn read(&self, state: FirewallModel) -> Result<Option<FirewallModel>> {
        match self.client.get_firewall(&state.name).await {
            Ok(firewall) => Ok(Some(FirewallModel {
                id: Some(firewall.id),
                ..state
            })),
            Err(err) if err.is_not_found() => {
                info!(name = %state.name, "firewall is gone, removing from state");
                Ok(None)
            }
            Err(err) => Err(err.traced("read firewall")),
        }
    }

    /// Apply `plan` to the existing firewall it identifies.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the plan carries no id, when mapping
    /// or normalization fails, and propagates API errors.
    pub async fn update(&self, plan: FirewallModel) -> Result<FirewallModel> {
        let mut firewall = plan
            .to_firewall(self.mapping)
            .map_err(|err| err.traced("map firewall"))?;
        if firewall.id.is_empty() {
            return Err(Error::ValidationError(format!(
                "firewall {} has no id to update",
                plan.name
            ))
            .traced("update firewall"));
        }
        normalize_firewall(&mut firewall).map_err(|err| err.traced("normalize firewall"))?;

        self.client
            .update_firewall(&firewall)
            .await
            .map_err(|err| err.traced("update firewall"))?;

        debug!(name = %plan.name, id = %firewall.id, "updated firewall");
        Ok(plan)
    }

    /// Delete the firewall recorded in `state`.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the state carries no id, and
    /// propagates API errors.
    pub async fn delete(&self, state: &FirewallModel) -> Result<()> {
        let id = match state.id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => {
                return Err(Error::ValidationError(format!(
                    "firewall {} has no id to delete",
                    state.name
                ))
                .traced("delete firewall"))
            }
        };
        self.client
            .delete_firewall(id)
            .await
            .map_err(|err| err.traced("delete firewall"))?;
        info!(name = %state.name, id, "deleted firewall");
        Ok(())
    }

    /// State tree for an import by id; the host refreshes the rest.
    #[must_use]
    pub fn import_state(id: &str) -> Value {
        json!({ "id": id })
    }
}
