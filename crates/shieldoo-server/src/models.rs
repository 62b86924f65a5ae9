//! Server data models: the wire representation and the host configuration model.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use shieldoo_core::attributes::{decode, decode_list, MappingPolicy};
use shieldoo_core::types::{group_list, null_default, nullable_list};
use shieldoo_core::{GroupRef, Result};
use std::fmt;

/// Reference to the firewall a server is bound to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallRef {
    /// Firewall id
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
}

/// Port forwarding listener exposed by a server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listener {
    /// Port on the overlay network, 1-65535
    #[serde(default, deserialize_with = "null_default")]
    pub listen_port: i64,
    /// `tcp` or `udp`
    #[serde(default, deserialize_with = "null_default")]
    pub protocol: String,
    /// Port on the forward host, 1-65535
    #[serde(default, deserialize_with = "null_default")]
    pub forward_port: i64,
    /// Host traffic is forwarded to
    #[serde(default, deserialize_with = "null_default")]
    pub forward_host: String,
    /// Free-form description
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
}

/// Operating system update policy of a server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OsUpdatePolicy {
    /// Whether OS updates are managed at all
    #[serde(default, deserialize_with = "null_default")]
    pub enabled: bool,
    /// Install security updates automatically
    #[serde(default, deserialize_with = "null_default")]
    pub security_autoupdate_enabled: bool,
    /// Install all updates automatically
    #[serde(default, deserialize_with = "null_default")]
    pub all_autoupdate_enabled: bool,
    /// Reboot after installing updates
    #[serde(default, deserialize_with = "null_default")]
    pub restart_after_update: bool,
    /// GMT hour for updates; 0 means any time
    #[serde(default, deserialize_with = "null_default")]
    pub update_hour: i64,
}

/// Server as sent to and returned by the API.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    /// Server-assigned identifier
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
    /// Server name
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    /// Group memberships
    #[serde(default, deserialize_with = "group_list")]
    pub groups: Vec<GroupRef>,
    /// Firewall applied to the server
    #[serde(default, deserialize_with = "null_default")]
    pub firewall: FirewallRef,
    /// Port forwarding listeners
    #[serde(default, deserialize_with = "nullable_list")]
    pub listeners: Vec<Listener>,
    /// Agent self-update
    #[serde(default, deserialize_with = "null_default")]
    pub autoupdate: bool,
    /// Overlay IP address
    #[serde(default, deserialize_with = "null_default")]
    pub ip_address: String,
    /// Free-form description
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    /// Server-generated agent configuration
    #[serde(default, deserialize_with = "null_default")]
    pub configuration: String,
    /// OS update policy
    #[serde(default, rename = "osUpdatePolicy", deserialize_with = "null_default")]
    pub os_update_policy: OsUpdatePolicy,
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("groups", &self.groups)
            .field("firewall", &self.firewall)
            .field("listeners", &self.listeners)
            .field("autoupdate", &self.autoupdate)
            .field("ip_address", &self.ip_address)
            .field("description", &self.description)
            .field("configuration", &"[REDACTED]")
            .field("os_update_policy", &self.os_update_policy)
            .finish()
    }
}

/// Listener block of the host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerConfig {
    /// Overlay port
    pub listen_port: i64,
    /// Protocol name
    pub protocol: String,
    /// Forward port
    pub forward_port: i64,
    /// Forward host
    pub forward_host: String,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
}

impl From<ListenerConfig> for Listener {
    fn from(config: ListenerConfig) -> Self {
        Self {
            listen_port: config.listen_port,
            protocol: config.protocol,
            forward_port: config.forward_port,
            forward_host: config.forward_host,
            description: config.description.unwrap_or_default(),
        }
    }
}

/// `shieldoo_server` resource model as exchanged with the host runtime.
///
/// Optional attributes are `Option` because the host sends `null` for
/// anything left unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerModel {
    /// Server name
    pub name: String,
    /// Server-assigned identifier, unknown before create
    #[serde(default)]
    pub id: Option<String>,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
    /// Agent self-update
    #[serde(default)]
    pub autoupdate: Option<bool>,
    /// OS updates managed
    #[serde(default)]
    pub os_update_enabled: Option<bool>,
    /// Automatic security updates
    #[serde(default)]
    pub os_security_update_enabled: Option<bool>,
    /// Automatic full updates
    #[serde(default)]
    pub os_all_update_enabled: Option<bool>,
    /// Reboot after updates
    #[serde(default)]
    pub os_restart_after_update: Option<bool>,
    /// GMT update hour
    #[serde(default)]
    pub os_update_hour: Option<i64>,
    /// Id of the firewall applied to the server
    pub firewall_id: String,
    /// Overlay IP address; assigned by the API when left unset
    #[serde(default)]
    pub ip_address: Option<String>,
    /// Groups referenced by id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_ids: Option<Value>,
    /// Groups referenced by display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_names: Option<Value>,
    /// Groups referenced by directory object id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_object_ids: Option<Value>,
    /// Listener blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listeners: Option<Value>,
    /// Server-generated agent configuration
    #[serde(
        default,
        serialize_with = "expose_configuration",
        deserialize_with = "secret_configuration"
    )]
    pub configuration: Option<SecretString>,
}

impl ServerModel {
    /// Decode the model from a host attribute tree.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the tree does not match the model.
    pub fn from_attributes(tree: &Value) -> Result<Self> {
        decode("server", tree)
    }

    /// Encode the model as a host attribute tree.
    ///
    /// The configuration secret is written in clear; the host runtime marks
    /// it sensitive.
    #[must_use]
    pub fn to_attributes(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Map the model into a wire server (not yet normalized).
    ///
    /// Groups are concatenated ids first, then names, then object ids.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed lists under
    /// [`MappingPolicy::Strict`].
    pub fn to_server(&self, policy: MappingPolicy) -> Result<Server> {
        let groups = GroupRef::from_lists(
            decode_list("group_ids", self.group_ids.as_ref(), policy)?,
            decode_list("group_names", self.group_names.as_ref(), policy)?,
            decode_list("group_object_ids", self.group_object_ids.as_ref(), policy)?,
        );
        let listeners = decode_list::<ListenerConfig>("listeners", self.listeners.as_ref(), policy)?
            .into_iter()
            .map(Listener::from)
            .collect();

        Ok(Server {
            id: self.id.clone().unwrap_or_default(),
            name: self.name.clone(),
            groups,
            firewall: FirewallRef {
                id: self.firewall_id.clone(),
            },
            listeners,
            autoupdate: self.autoupdate.unwrap_or_default(),
            ip_address: self.ip_address.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
            configuration: String::new(),
            os_update_policy: OsUpdatePolicy {
                enabled: self.os_update_enabled.unwrap_or_default(),
                security_autoupdate_enabled: self.os_security_update_enabled.unwrap_or_default(),
                all_autoupdate_enabled: self.os_all_update_enabled.unwrap_or_default(),
                restart_after_update: self.os_restart_after_update.unwrap_or_default(),
                update_hour: self.os_update_hour.unwrap_or_default(),
            },
        })
    }

    /// Exposed configuration secret, if known.
    #[must_use]
    pub fn configuration(&self) -> Option<&str> {
        self.configuration.as_ref().map(|secret| secret.expose_secret())
    }
}

fn expose_configuration<S: Serializer>(
    value: &Option<SecretString>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    value
        .as_ref()
        .map(|secret| secret.expose_secret())
        .serialize(serializer)
}

fn secret_configuration<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<SecretString>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}
