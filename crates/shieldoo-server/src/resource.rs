//! `shieldoo_server` resource reconciler.

use crate::client::ServerClient;
use crate::models::ServerModel;
use crate::normalize::normalize_server;
use crate::Result;
use secrecy::SecretString;
use serde_json::{json, Value};
use shieldoo_core::{Error, MappingPolicy, ShieldooClient};
use tracing::{debug, info};

/// Resource type name registered with the host runtime.
pub const RESOURCE_TYPE: &str = "shieldoo_server";

/// Reconciles desired server configuration with the API.
#[derive(Debug, Clone)]
pub struct ServerResource {
    client: ServerClient,
    mapping: MappingPolicy,
}

impl ServerResource {
    /// Create a reconciler using a shared client.
    #[must_use]
    pub const fn new(client: ShieldooClient, mapping: MappingPolicy) -> Self {
        Self {
            client: ServerClient::new(client),
            mapping,
        }
    }

    /// Create the server described by `plan`.
    ///
    /// The returned state carries the assigned id and the generated
    /// configuration, plus the assigned IP address when the plan had none.
    ///
    /// # Errors
    ///
    /// Validation errors abort before any API call; API errors propagate.
    pub async fn create(&self, plan: ServerModel) -> Result<ServerModel> {
        let mut server = plan
            .to_server(self.mapping)
            .map_err(|err| err.traced("map server"))?;
        server.id.clear();
        normalize_server(&server).map_err(|err| err.traced("normalize server"))?;

        let created = self
            .client
            .create_server(&server)
            .await
            .map_err(|err| err.traced("create server"))?;

        info!(name = %plan.name, id = %created.id, "created server");
        let ip_address = match plan.ip_address {
            Some(ip) if !ip.is_empty() => Some(ip),
            _ => Some(created.ip_address),
        };
        Ok(ServerModel {
            id: Some(created.id),
            ip_address,
            configuration: Some(SecretString::from(created.configuration)),
            ..plan
        })
    }

    /// Refresh id and configuration of `state` from the API.
    ///
    /// Returns `Ok(None)` when the server no longer exists.
    ///
    /// # Errors
    ///
    /// Propagates every error other than absence.
    pub async fn read(&self, state: ServerModel) -> Result<Option<ServerModel>> {
        match self.client.get_server(&state.name).await {
            Ok(server) => Ok(Some(ServerModel {
                id: Some(server.id),
                configuration: Some(SecretString::from(server.configuration)),
                ..state
            })),
            Err(err) if err.is_not_found() => {
                info!(name = %state.name, "server is gone, removing from state");
                Ok(None)
            }
            Err(err) => Err(err.traced("read server")),
        }
    }

    /// Apply `plan` to the existing server it identifies and pick up the
    /// regenerated configuration.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the plan carries no id or fails
    /// validation, and propagates API errors.
    pub async fn update(&self, plan: ServerModel) -> Result<ServerModel> {
        let server = plan
            .to_server(self.mapping)
            .map_err(|err| err.traced("map server"))?;
        if server.id.is_empty() {
            return Err(Error::ValidationError(format!(
                "server {} has no id to update",
                plan.name
            ))
            .traced("update server"));
        }
        normalize_server(&server).map_err(|err| err.traced("normalize server"))?;

        let updated = self
            .client
            .update_server(&server)
            .await
            .map_err(|err| err.traced("update server"))?;

        debug!(name = %plan.name, id = %server.id, "updated server");
        Ok(ServerModel {
            configuration: Some(SecretString::from(updated.configuration)),
            ..plan
        })
    }

    /// Delete the server recorded in `state`.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the state carries no id, and
    /// propagates API errors.
    pub async fn delete(&self, state: &ServerModel) -> Result<()> {
        let id = match state.id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => {
                return Err(Error::ValidationError(format!(
                    "server {} has no id to delete",
                    state.name
                ))
                .traced("delete server"))
            }
        };
        self.client
            .delete_server(id)
            .await
            .map_err(|err| err.traced("delete server"))?;
        info!(name = %state.name, id, "deleted server");
        Ok(())
    }

    /// State tree for an import by id; the host refreshes the rest.
    #[must_use]
    pub fn import_state(id: &str) -> Value {
        json!({ "id": id })
    }
}
