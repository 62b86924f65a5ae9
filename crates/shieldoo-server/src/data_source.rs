//! `shieldoo_server` data source.

use crate::client::ServerClient;
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, Serializer};
use shieldoo_core::ShieldooClient;

/// Data source type name registered with the host runtime.
pub const DATA_SOURCE_TYPE: &str = "shieldoo_server";

/// Result of a server lookup.
#[derive(Debug, Clone, Serialize)]
pub struct ServerLookup {
    /// Name that was looked up
    pub name: String,
    /// Id of the matching server
    pub id: String,
    /// Overlay IP address
    pub ip_address: String,
    /// Agent configuration
    #[serde(serialize_with = "expose")]
    pub configuration: SecretString,
}

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Read-only server lookup.
#[derive(Debug, Clone)]
pub struct ServerDataSource {
    client: ServerClient,
}

impl ServerDataSource {
    /// Create a data source using a shared client.
    #[must_use]
    pub const fn new(client: ShieldooClient) -> Self {
        Self {
            client: ServerClient::new(client),
        }
    }

    /// Find the server called `name`.
    ///
    /// # Errors
    ///
    /// Absence is an error here, unlike resource reads.
    pub async fn read(&self, name: &str) -> crate::Result<ServerLookup> {
        let server = self
            .client
            .get_server(name)
            .await
            .map_err(|err| err.traced("read server data source"))?;
        Ok(ServerLookup {
            name: name.to_string(),
            id: server.id,
            ip_address: server.ip_address,
            configuration: SecretString::from(server.configuration),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shieldoo_core::client::ShieldooClientBuilder;
    use shieldoo_core::mockup::MockupTransport;
    use shieldoo_core::Error;
    use std::sync::Arc;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn lookup_exposes_connection_details() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cliapi/servers"))
            .and(query_param("name", "db"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": "s-1",
                "name": "db",
                "ipAddress": "100.64.0.2",
                "configuration": "cfg"
            }])))
            .mount(&server)
            .await;

        let client =
            ShieldooClient::new(server.uri(), SecretString::from("key".to_string())).unwrap();
        let found = ServerDataSource::new(client).read("db").await.unwrap();
        assert_eq!(
            serde_json::to_value(&found).unwrap(),
            json!({
                "name": "db",
                "id": "s-1",
                "ip_address": "100.64.0.2",
                "configuration": "cfg"
            })
        );
        assert!(!format!("{found:?}").contains("\"cfg\""));
    }

    #[tokio::test]
    async fn mockup_lookup() {
        let client = ShieldooClientBuilder::new(
            "https://acme.shieldoo.net",
            SecretString::from("key".to_string()),
        )
        .unwrap()
        .with_transport(Arc::new(MockupTransport))
        .build()
        .unwrap();
        let found = ServerDataSource::new(client).read("example").await.unwrap();
        assert_eq!(found.id, "mockup");
        assert_eq!(found.ip_address, "mockup");
        assert_eq!(found.configuration.expose_secret(), "mockup");
    }

    #[tokio::test]
    async fn server_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cliapi/servers"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such server"))
            .mount(&server)
            .await;

        let client =
            ShieldooClient::new(server.uri(), SecretString::from("key".to_string())).unwrap();
        let err = ServerDataSource::new(client).read("db").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(err, Error::Api { .. }));
    }
}
