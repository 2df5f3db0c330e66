//! Entity traits defining the core abstraction for backend records

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt;
use validator::Validate;

/// Identifier assigned by the backend
///
/// The backend issues numeric ids while older endpoints return strings, so
/// both JSON shapes are accepted and normalized to their string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = EntityId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or integer identifier")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<EntityId, E> {
                if v.trim().is_empty() {
                    return Err(E::custom("identifier must not be empty"));
                }
                Ok(EntityId::new(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<EntityId, E> {
                Ok(EntityId(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<EntityId, E> {
                Ok(EntityId(v.to_string()))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// Human-facing names for an entity kind, used in default error messages
#[derive(Debug, Clone, Copy)]
pub struct EntityLabels {
    /// Collection name ("members", "staff")
    pub plural: &'static str,
    /// Short singular used in detail/status messages ("member", "staff")
    pub short: &'static str,
    /// Singular for a whole record ("member", "staff member")
    pub record: &'static str,
}

impl EntityLabels {
    pub fn fetch_all_failed(&self) -> String {
        format!("Failed to fetch {}", self.plural)
    }

    pub fn fetch_one_failed(&self) -> String {
        format!("Failed to fetch {} details", self.short)
    }

    pub fn create_failed(&self) -> String {
        format!("Failed to create {}", self.record)
    }

    pub fn update_status_failed(&self) -> String {
        format!("Failed to update {} status", self.short)
    }

    pub fn delete_failed(&self) -> String {
        format!("Failed to delete {}", self.record)
    }
}

/// Base trait for records managed by an [`EntityStore`](crate::store::EntityStore)
///
/// Each implementation maps to one REST resource exposing list, detail,
/// create, status update and delete.
pub trait Entity: Clone + fmt::Debug + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Creation payload, validated before it is sent
    type Draft: Serialize + Validate + Send + Sync;

    /// The resource path segment (e.g., "members", "staff")
    fn resource_name() -> &'static str;

    /// Names used in messages and logs
    fn labels() -> &'static EntityLabels;

    /// Get the backend identifier for this record
    fn id(&self) -> &EntityId;

    /// Get the record status
    fn status(&self) -> &str;

    /// Overwrite the record status after the backend confirmed a change
    fn set_status(&mut self, status: &str);

    /// Check if the record is active
    fn is_active(&self) -> bool {
        self.status().eq_ignore_ascii_case("active")
    }
}
