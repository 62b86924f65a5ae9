//! Firewall models: the wire representation and the host configuration model.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use shieldoo_core::attributes::{decode, decode_list, MappingPolicy};
use shieldoo_core::types::{group_list, null_default, nullable_list};
use shieldoo_core::{Error, GroupRef, Result};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Literal accepted for "any port", "any protocol" and "any host".
pub const ANY: &str = "any";

/// Protocols a firewall rule may match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleProtocol {
    /// Any protocol
    Any,
    /// ICMP
    Icmp,
    /// TCP
    Tcp,
    /// UDP
    Udp,
}

impl RuleProtocol {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Any => ANY,
            Self::Icmp => "icmp",
            Self::Tcp => "tcp",
            Self::Udp => "udp",
        }
    }
}

impl fmt::Display for RuleProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleProtocol {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        match input {
            ANY => Ok(Self::Any),
            "icmp" => Ok(Self::Icmp),
            "tcp" => Ok(Self::Tcp),
            "udp" => Ok(Self::Udp),
            other => Err(Error::ValidationError(format!("invalid protocol: {other}"))),
        }
    }
}

/// Port selector of a firewall rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortSpec {
    /// Every port
    Any,
    /// One port
    Single(u16),
    /// Inclusive range
    Range(u16, u16),
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str(ANY),
            Self::Single(port) => write!(f, "{port}"),
            Self::Range(low, high) => write!(f, "{low}-{high}"),
        }
    }
}

impl FromStr for PortSpec {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        let invalid = || Error::ValidationError(format!("invalid port: {input}"));

        if input == ANY {
            return Ok(Self::Any);
        }
        match input.split_once('-') {
            None => parse_port(input).map(Self::Single).ok_or_else(invalid),
            Some((low, high)) => {
                let low = parse_port(low).ok_or_else(invalid)?;
                let high = parse_port(high).ok_or_else(invalid)?;
                if low > high {
                    return Err(invalid());
                }
                Ok(Self::Range(low, high))
            }
        }
    }
}

/// Parse a port in 1..=65535 written without sign or leading zeros.
fn parse_port(input: &str) -> Option<u16> {
    if input.is_empty()
        || input.starts_with('0')
        || !input.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    input.parse::<u16>().ok()
}

/// Peer selector derived from the group references of a rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleHost {
    /// Any peer
    #[default]
    Any,
    /// Members of the referenced groups
    Group,
}

// Recomputed from the groups on every submission, so anything the API
// returns other than "group" reads as `Any`.
impl<'de> Deserialize<'de> for RuleHost {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match Option::<String>::deserialize(deserializer)?.as_deref() {
            Some("group") => Self::Group,
            _ => Self::Any,
        })
    }
}

/// Firewall rule as sent to and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallRule {
    /// `any`, `icmp`, `tcp` or `udp`
    #[serde(default, deserialize_with = "null_default")]
    pub protocol: String,
    /// Port, `A-B` range or `any`
    #[serde(default, deserialize_with = "null_default")]
    pub port: String,
    /// Computed during normalization
    #[serde(default)]
    pub host: RuleHost,
    /// Group references
    #[serde(default, deserialize_with = "group_list")]
    pub groups: Vec<GroupRef>,
}

impl FirewallRule {
    /// Build a rule from raw protocol and port strings.
    #[must_use]
    pub fn new(protocol: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            port: port.into(),
            host: RuleHost::Any,
            groups: Vec::new(),
        }
    }

    /// The rule allowing everything, used as the default outbound rule.
    #[must_use]
    pub fn allow_any() -> Self {
        Self::new(ANY, ANY)
    }

    /// Attach group references.
    #[must_use]
    pub fn with_groups(mut self, groups: Vec<GroupRef>) -> Self {
        self.groups = groups;
        self
    }
}

/// Firewall as sent to and returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Firewall {
    /// Server-assigned identifier
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
    /// Firewall name
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    /// Inbound rules
    #[serde(default, rename = "rulesIn", deserialize_with = "nullable_list")]
    pub rules_in: Vec<FirewallRule>,
    /// Outbound rules
    #[serde(default, rename = "rulesOut", deserialize_with = "nullable_list")]
    pub rules_out: Vec<FirewallRule>,
}

/// Rule block of the host configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Port expression
    pub port: String,
    /// Protocol name
    pub protocol: String,
    /// Groups referenced by id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_ids: Option<Value>,
    /// Groups referenced by display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_names: Option<Value>,
    /// Groups referenced by directory object id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_object_ids: Option<Value>,
}

impl RuleConfig {
    /// Map into a wire rule, concatenating ids, names and object ids.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed group lists under
    /// [`MappingPolicy::Strict`].
    pub fn to_rule(&self, policy: MappingPolicy) -> Result<FirewallRule> {
        let groups = GroupRef::from_lists(
            decode_list("group_ids", self.group_ids.as_ref(), policy)?,
            decode_list("group_names", self.group_names.as_ref(), policy)?,
            decode_list("group_object_ids", self.group_object_ids.as_ref(), policy)?,
        );
        Ok(FirewallRule::new(&self.protocol, &self.port).with_groups(groups))
    }
}

/// `shieldoo_firewall` resource model as exchanged with the host runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirewallModel {
    /// Firewall name
    pub name: String,
    /// Server-assigned identifier, unknown before create
    #[serde(default)]
    pub id: Option<String>,
    /// Inbound rule blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules_inbound: Option<Value>,
    /// Outbound rule blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules_outbound: Option<Value>,
}

impl FirewallModel {
    /// Decode the model from a host attribute tree.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the tree does not match the model.
    pub fn from_attributes(tree: &Value) -> Result<Self> {
        decode("firewall", tree)
    }

    /// Encode the model as a host attribute tree.
    #[must_use]
    pub fn to_attributes(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Map the model into a wire firewall (not yet normalized).
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed rule lists under
    /// [`MappingPolicy::Strict`]. Under [`MappingPolicy::Lenient`] a
    /// malformed rule is logged and skipped.
    pub fn to_firewall(&self, policy: MappingPolicy) -> Result<Firewall> {
        Ok(Firewall {
            id: self.id.clone().unwrap_or_default(),
            name: self.name.clone(),
            rules_in: rules(self.rules_inbound.as_ref(), "rules_inbound", policy)?,
            rules_out: rules(self.rules_outbound.as_ref(), "rules_outbound", policy)?,
        })
    }
}

fn rules(value: Option<&Value>, list: &str, policy: MappingPolicy) -> Result<Vec<FirewallRule>> {
    let mut rules = Vec::new();
    for (index, config) in decode_list::<RuleConfig>(list, value, policy)?
        .iter()
        .enumerate()
    {
        match config.to_rule(MappingPolicy::Strict) {
            Ok(rule) => rules.push(rule),
            Err(err) => match policy {
                MappingPolicy::Lenient => {
                    warn!(list, index, error = %err, "skipping malformed rule");
                }
                MappingPolicy::Strict => return Err(err),
            },
        }
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn port_spec_accepts_valid_forms() {
        assert_eq!("any".parse::<PortSpec>().unwrap(), PortSpec::Any);
        assert_eq!("1".parse::<PortSpec>().unwrap(), PortSpec::Single(1));
        assert_eq!("65535".parse::<PortSpec>().unwrap(), PortSpec::Single(65535));
        assert_eq!(
            "1000-2000".parse::<PortSpec>().unwrap(),
            PortSpec::Range(1000, 2000)
        );
        assert_eq!("22-22".parse::<PortSpec>().unwrap(), PortSpec::Range(22, 22));
    }

    #[test]
    fn port_spec_rejects_invalid_forms() {
        for input in [
            "", "0", "65536", "080", "+80", "-80", "80-", "1-2-3", "2000-1000", "ANY", " 80",
            "http", "1-0",
        ] {
            assert!(input.parse::<PortSpec>().is_err(), "{input:?} should be rejected");
        }
    }

    #[test]
    fn port_spec_display_round_trips() {
        for input in ["any", "443", "8000-8080"] {
            assert_eq!(input.parse::<PortSpec>().unwrap().to_string(), input);
        }
    }

    #[test]
    fn protocol_parse() {
        assert_eq!("icmp".parse::<RuleProtocol>().unwrap(), RuleProtocol::Icmp);
        let err = "http".parse::<RuleProtocol>().unwrap_err();
        assert!(err.to_string().contains("http"));
    }

    #[test]
    fn firewall_serializes_with_wire_names() {
        let firewall = Firewall {
            id: String::new(),
            name: "fw".into(),
            rules_in: vec![FirewallRule::new("tcp", "22")
                .with_groups(vec![GroupRef::ObjectId("o1".into())])],
            rules_out: vec![FirewallRule::allow_any()],
        };
        let value = serde_json::to_value(&firewall).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "",
                "name": "fw",
                "rulesIn": [{
                    "protocol": "tcp",
                    "port": "22",
                    "host": "any",
                    "groups": [{ "id": "", "name": "", "objectId": "o1" }]
                }],
                "rulesOut": [{ "protocol": "any", "port": "any", "host": "any", "groups": [] }]
            })
        );
    }

    #[test]
    fn firewall_decodes_null_rule_lists() {
        let firewall: Firewall =
            serde_json::from_value(json!({ "id": "fw-1", "name": "fw", "rulesIn": null }))
                .unwrap();
        assert_eq!(firewall.id, "fw-1");
        assert!(firewall.rules_in.is_empty());
        assert!(firewall.rules_out.is_empty());
    }

    #[test]
    fn model_maps_rules_and_group_lists() {
        let model = FirewallModel::from_attributes(&json!({
            "name": "web",
            "id": null,
            "rules_inbound": [{
                "port": "443",
                "protocol": "tcp",
                "group_names": ["admins"],
                "group_ids": ["g-1"],
                "group_object_ids": null
            }]
        }))
        .unwrap();

        let firewall = model.to_firewall(MappingPolicy::Strict).unwrap();
        assert_eq!(firewall.id, "");
        assert_eq!(firewall.rules_in.len(), 1);
        assert_eq!(
            firewall.rules_in[0].groups,
            vec![GroupRef::Id("g-1".into()), GroupRef::Name("admins".into())]
        );
        assert!(firewall.rules_out.is_empty());
    }

    #[test]
    fn lenient_mapping_skips_malformed_rules() {
        let model = FirewallModel::from_attributes(&json!({
            "name": "web",
            "rules_inbound": [{ "port": "22" }, { "port": "80", "protocol": "tcp" }]
        }))
        .unwrap();

        let firewall = model.to_firewall(MappingPolicy::Lenient).unwrap();
        assert_eq!(firewall.rules_in, vec![FirewallRule::new("tcp", "80")]);

        let err = model.to_firewall(MappingPolicy::Strict).unwrap_err();
        assert!(matches!(err, Error::ValidationError(ref msg) if msg.contains("rules_inbound[0]")));
    }

    #[test]
    fn lenient_mapping_skips_rule_with_malformed_group_list() {
        let model = FirewallModel::from_attributes(&json!({
            "name": "web",
            "rules_inbound": [
                { "port": "22", "protocol": "tcp", "group_ids": "g-1" },
                { "port": "80", "protocol": "tcp", "group_names": ["ops"] }
            ]
        }))
        .unwrap();

        let firewall = model.to_firewall(MappingPolicy::Lenient).unwrap();
        assert_eq!(
            firewall.rules_in,
            vec![FirewallRule::new("tcp", "80").with_groups(vec![GroupRef::Name("ops".into())])]
        );

        let err = model.to_firewall(MappingPolicy::Strict).unwrap_err();
        assert!(matches!(err, Error::ValidationError(ref msg) if msg.contains("group_ids")));
    }

    #[test]
    fn firewall_decoding_tolerates_api_gaps() {
        let firewall: Firewall = serde_json::from_value(json!({
            "id": "fw-1",
            "name": null,
            "rulesIn": [{
                "protocol": "tcp",
                "port": null,
                "host": "weird",
                "groups": [
                    { "id": "", "name": "", "objectId": "" },
                    { "id": "g-1", "name": null, "objectId": null }
                ]
            }],
            "rulesOut": [{ "protocol": "any", "port": "any", "host": null, "groups": null }]
        }))
        .unwrap();

        assert_eq!(firewall.name, "");
        assert_eq!(firewall.rules_in[0].port, "");
        assert_eq!(firewall.rules_in[0].host, RuleHost::Any);
        assert_eq!(firewall.rules_in[0].groups, vec![GroupRef::Id("g-1".into())]);
        assert_eq!(firewall.rules_out, vec![FirewallRule::allow_any()]);
    }

    #[test]
    fn model_without_name_is_rejected() {
        let err = FirewallModel::from_attributes(&json!({ "rules_inbound": [] })).unwrap_err();
        assert!(matches!(err, Error::ValidationError(_)));
    }

    #[test]
    fn model_round_trips_through_attributes() {
        let tree = json!({ "name": "web", "id": "fw-1", "rules_outbound": [] });
        let model = FirewallModel::from_attributes(&tree).unwrap();
        assert_eq!(model.to_attributes(), tree);
    }
}
