//! Entity vocabulary shared by the client, classifier and resolver.
//!
//! Records are kept as untyped JSON objects: the loader only needs the
//! identifier, name and self-link fields, everything else is passed through
//! to the server as written in the source document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Field holding the server-assigned stable identifier.
pub const ID_FIELD: &str = "@iot.id";
/// Field holding the human-readable name.
pub const NAME_FIELD: &str = "name";
/// Field holding the canonical URL of a created entity.
pub const SELF_LINK_FIELD: &str = "@iot.selfLink";

/// Reference fields resolved before a record is created, in resolution order.
pub const REFERENCE_FIELDS: [&str; 3] = ["Sensor", "ObservedProperty", "Thing"];

/// A single entity as exchanged with the remote API.
pub type EntityRecord = Map<String, Value>;

/// The fixed set of entity types a SensorThings server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    Thing,
    Location,
    Sensor,
    ObservedProperty,
    Datastream,
    FeatureOfInterest,
}

impl EntityType {
    pub const ALL: [EntityType; 6] = [
        EntityType::Thing,
        EntityType::Location,
        EntityType::Sensor,
        EntityType::ObservedProperty,
        EntityType::Datastream,
        EntityType::FeatureOfInterest,
    ];

    /// Remote collection name, as advertised by the API root.
    #[must_use]
    pub fn collection(&self) -> &'static str {
        match self {
            EntityType::Thing => "Things",
            EntityType::Location => "Locations",
            EntityType::Sensor => "Sensors",
            EntityType::ObservedProperty => "ObservedProperties",
            EntityType::Datastream => "Datastreams",
            EntityType::FeatureOfInterest => "FeaturesOfInterest",
        }
    }

    /// Key introducing a group of records of this type in a source document.
    #[must_use]
    pub fn group_key(&self) -> &'static str {
        match self {
            EntityType::Thing => "things",
            EntityType::Location => "locations",
            EntityType::Sensor => "sensors",
            EntityType::ObservedProperty => "observedProperties",
            EntityType::Datastream => "datastreams",
            EntityType::FeatureOfInterest => "features",
        }
    }

    /// Field name used by other records to reference an entity of this type.
    #[must_use]
    pub fn reference_key(&self) -> &'static str {
        match self {
            EntityType::Thing => "Thing",
            EntityType::Location => "Location",
            EntityType::Sensor => "Sensor",
            EntityType::ObservedProperty => "ObservedProperty",
            EntityType::Datastream => "Datastream",
            EntityType::FeatureOfInterest => "Feature",
        }
    }

    /// Singular display name, used in log messages.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            EntityType::Thing => "Thing",
            EntityType::Location => "Location",
            EntityType::Sensor => "Sensor",
            EntityType::ObservedProperty => "ObservedProperty",
            EntityType::Datastream => "Datastream",
            EntityType::FeatureOfInterest => "FeatureOfInterest",
        }
    }

    #[must_use]
    pub fn from_collection(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.collection() == name)
    }

    #[must_use]
    pub fn from_group_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.group_key() == key)
    }

    #[must_use]
    pub fn from_reference_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.reference_key() == key)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

/// Textual form of a scalar identifier; ids may be strings or numbers.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[must_use]
pub fn record_id(record: &EntityRecord) -> Option<String> {
    record.get(ID_FIELD).and_then(scalar_text)
}

#[must_use]
pub fn record_name(record: &EntityRecord) -> Option<&str> {
    record.get(NAME_FIELD).and_then(Value::as_str)
}

#[must_use]
pub fn record_self_link(record: &EntityRecord) -> Option<&str> {
    record.get(SELF_LINK_FIELD).and_then(Value::as_str)
}

/// Lookup key for idempotent creation: the identifier if set, else the name.
#[must_use]
pub fn record_lookup_key(record: &EntityRecord) -> Option<String> {
    record_id(record).or_else(|| record_name(record).map(str::to_string))
}

/// Whether `record` is the one named or identified by `name_or_id`.
#[must_use]
pub fn matches_name_or_id(record: &EntityRecord, name_or_id: &str) -> bool {
    record_name(record) == Some(name_or_id) || record_id(record).as_deref() == Some(name_or_id)
}

/// Label used when reporting a record: its name, else its id, else a placeholder.
#[must_use]
pub fn record_label(record: &EntityRecord) -> String {
    record_name(record)
        .map(str::to_string)
        .or_else(|| record_id(record))
        .unwrap_or_else(|| "<unnamed>".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> EntityRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_collection_mapping_is_injective() {
        let mut names: Vec<_> = EntityType::ALL.iter().map(|t| t.collection()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), EntityType::ALL.len());
    }

    #[test]
    fn test_lookup_tables_round_trip() {
        for t in EntityType::ALL {
            assert_eq!(EntityType::from_collection(t.collection()), Some(t));
            assert_eq!(EntityType::from_group_key(t.group_key()), Some(t));
            assert_eq!(EntityType::from_reference_key(t.reference_key()), Some(t));
        }
        assert_eq!(EntityType::from_group_key("Things"), None);
        assert_eq!(
            EntityType::from_reference_key("Feature"),
            Some(EntityType::FeatureOfInterest)
        );
    }

    #[test]
    fn test_numeric_id_matches_textually() {
        let r = record(json!({"@iot.id": 42, "name": "buoy"}));
        assert_eq!(record_id(&r).as_deref(), Some("42"));
        assert!(matches_name_or_id(&r, "42"));
        assert!(matches_name_or_id(&r, "buoy"));
        assert!(!matches_name_or_id(&r, "43"));
    }

    #[test]
    fn test_lookup_key_prefers_id() {
        let r = record(json!({"@iot.id": "abc", "name": "buoy"}));
        assert_eq!(record_lookup_key(&r).as_deref(), Some("abc"));

        let r = record(json!({"name": "buoy"}));
        assert_eq!(record_lookup_key(&r).as_deref(), Some("buoy"));

        let r = record(json!({"description": "nothing"}));
        assert_eq!(record_lookup_key(&r), None);
        assert_eq!(record_label(&r), "<unnamed>");
    }
}
