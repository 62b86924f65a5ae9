//! Core Shieldoo domain types shared by the firewall and server crates.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::Error;

/// Remote API entity categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    /// Firewall definitions
    Firewalls,
    /// Servers (tunnel endpoints)
    Servers,
    /// Access groups
    Groups,
}

impl Entity {
    /// Path segment used under `/cliapi/`.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Firewalls => "firewalls",
            Self::Servers => "servers",
            Self::Groups => "groups",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Group as it appears on the wire.
///
/// Lists returned by the API have all three fields populated; references
/// sent by the client set exactly one of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Group identifier
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
    /// Display name
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    /// Directory object identifier
    #[serde(default, rename = "objectId", deserialize_with = "null_default")]
    pub object_id: String,
}

/// Reference to a group by exactly one of its identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Group", try_from = "Group")]
pub enum GroupRef {
    /// Reference by group id
    Id(String),
    /// Reference by display name
    Name(String),
    /// Reference by directory object id
    ObjectId(String),
}

impl GroupRef {
    /// The identifying value regardless of addressing mode.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Id(value) | Self::Name(value) | Self::ObjectId(value) => value,
        }
    }

    /// Addressing mode name, used in messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Id(_) => "id",
            Self::Name(_) => "name",
            Self::ObjectId(_) => "objectId",
        }
    }

    /// Build references from the three parallel lists used in configuration.
    ///
    /// The result is ordered ids, then names, then object ids.
    #[must_use]
    pub fn from_lists(ids: Vec<String>, names: Vec<String>, object_ids: Vec<String>) -> Vec<Self> {
        ids.into_iter()
            .map(Self::Id)
            .chain(names.into_iter().map(Self::Name))
            .chain(object_ids.into_iter().map(Self::ObjectId))
            .collect()
    }
}

impl fmt::Display for GroupRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?}", self.kind(), self.value())
    }
}

impl From<GroupRef> for Group {
    fn from(reference: GroupRef) -> Self {
        match reference {
            GroupRef::Id(id) => Self {
                id,
                ..Self::default()
            },
            GroupRef::Name(name) => Self {
                name,
                ..Self::default()
            },
            GroupRef::ObjectId(object_id) => Self {
                object_id,
                ..Self::default()
            },
        }
    }
}

impl TryFrom<Group> for GroupRef {
    type Error = Error;

    fn try_from(group: Group) -> Result<Self, Self::Error> {
        if !group.id.is_empty() {
            Ok(Self::Id(group.id))
        } else if !group.name.is_empty() {
            Ok(Self::Name(group.name))
        } else if !group.object_id.is_empty() {
            Ok(Self::ObjectId(group.object_id))
        } else {
            Err(Error::ValidationError(
                "group reference has no id, name or objectId".to_string(),
            ))
        }
    }
}

/// Deserialize a list that the API may send as `null`.
///
/// Use with `#[serde(default, deserialize_with = "nullable_list")]`.
///
/// # Errors
///
/// Propagates element decoding errors.
pub fn nullable_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Deserialize a value the API may send as `null`, using its default instead.
///
/// Use with `#[serde(default, deserialize_with = "null_default")]`.
///
/// # Errors
///
/// Propagates decoding errors of non-null values.
pub fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Deserialize a group list returned by the API.
///
/// `null` is an empty list and groups without any identifier are dropped,
/// so a refresh never fails on group data it does not use.
///
/// # Errors
///
/// Propagates decoding errors when the value is not a list of objects.
pub fn group_list<'de, D>(deserializer: D) -> Result<Vec<GroupRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let groups: Vec<Group> = nullable_list(deserializer)?;
    Ok(groups
        .into_iter()
        .filter_map(|group| match GroupRef::try_from(group) {
            Ok(reference) => Some(reference),
            Err(err) => {
                debug!(error = %err, "dropping group without identifier");
                None
            }
        })
        .collect())
}
