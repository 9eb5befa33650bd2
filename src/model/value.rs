use serde::{Deserialize, Serialize};

use super::id::EntityId;

/// Typed value carried by a value snak
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum DataValue {
    #[serde(rename = "string")]
    String(String),
    #[serde(rename = "wikibase-entityid")]
    EntityId(EntityIdValue),
    #[serde(rename = "monolingualtext")]
    MonolingualText(MonolingualTextValue),
    #[serde(rename = "quantity")]
    Quantity(QuantityValue),
    #[serde(rename = "time")]
    Time(TimeValue),
    #[serde(rename = "globecoordinate")]
    GlobeCoordinate(GlobeCoordinateValue),
}

impl DataValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::String(_) => "string",
            DataValue::EntityId(_) => "wikibase-entityid",
            DataValue::MonolingualText(_) => "monolingualtext",
            DataValue::Quantity(_) => "quantity",
            DataValue::Time(_) => "time",
            DataValue::GlobeCoordinate(_) => "globecoordinate",
        }
    }

    /// Content hash identifying this value across entities
    pub fn hash(&self) -> String {
        super::hash::hash_canonical(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityIdValue {
    pub id: EntityId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonolingualTextValue {
    pub text: String,
    pub language: String,
}

/// Amounts and bounds keep their decimal lexical form, e.g. `+10.5`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityValue {
    pub amount: String,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<String>,
}

fn default_unit() -> String {
    "1".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeValue {
    /// Timestamp like `+2001-12-31T00:00:00Z`
    pub time: String,
    #[serde(default)]
    pub timezone: i32,
    #[serde(default)]
    pub before: u32,
    #[serde(default)]
    pub after: u32,
    pub precision: u8,
    pub calendarmodel: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobeCoordinateValue {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<f64>,
    pub globe: String,
}
