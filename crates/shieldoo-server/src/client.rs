//! Server operations on top of the shared Shieldoo client.

use crate::models::Server;
use crate::Result;
use shieldoo_core::{Entity, ShieldooClient};

/// Typed server client.
#[derive(Debug, Clone)]
pub struct ServerClient {
    inner: ShieldooClient,
}

impl ServerClient {
    /// Wrap a shared client.
    #[must_use]
    pub const fn new(inner: ShieldooClient) -> Self {
        Self { inner }
    }

    /// Look up a server by name.
    pub async fn get_server(&self, name: &str) -> Result<Server> {
        self.inner.get(Entity::Servers, name).await
    }

    /// Fetch a server by id.
    pub async fn get_server_by_id(&self, id: &str) -> Result<Server> {
        self.inner.get_by_id(Entity::Servers, id).await
    }

    /// Create a server; the response carries the generated configuration.
    pub async fn create_server(&self, server: &Server) -> Result<Server> {
        self.inner.create(Entity::Servers, server).await
    }

    /// Update a server in place, addressed by its id.
    pub async fn update_server(&self, server: &Server) -> Result<Server> {
        self.inner.update(Entity::Servers, &server.id, server).await
    }

    /// Delete a server.
    pub async fn delete_server(&self, id: &str) -> Result<()> {
        self.inner.delete(Entity::Servers, id).await
    }
}
