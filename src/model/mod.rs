//! Entity document model consumed by the exporter.

pub mod hash;
pub mod id;
pub mod value;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use id::{EntityId, EntityKind};
pub use value::{
    DataValue, EntityIdValue, GlobeCoordinateValue, MonolingualTextValue, QuantityValue, TimeValue,
};

/// A property/value-kind unit: a value, no value, or an unspecified value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "snaktype")]
pub enum Snak {
    #[serde(rename = "value")]
    Value {
        property: EntityId,
        datatype: String,
        datavalue: DataValue,
    },
    #[serde(rename = "novalue")]
    NoValue { property: EntityId },
    #[serde(rename = "somevalue")]
    SomeValue { property: EntityId },
}

impl Snak {
    pub fn value(property: EntityId, datatype: impl Into<String>, datavalue: DataValue) -> Self {
        Snak::Value {
            property,
            datatype: datatype.into(),
            datavalue,
        }
    }

    pub fn property(&self) -> &EntityId {
        match self {
            Snak::Value { property, .. } | Snak::NoValue { property } | Snak::SomeValue { property } => {
                property
            }
        }
    }

    pub fn hash(&self) -> String {
        hash::hash_canonical(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Preferred,
    #[default]
    Normal,
    Deprecated,
}

impl Rank {
    /// Local name of the rank individual in the ontology
    pub fn ontology_name(self) -> &'static str {
        match self {
            Rank::Preferred => "PreferredRank",
            Rank::Normal => "NormalRank",
            Rank::Deprecated => "DeprecatedRank",
        }
    }
}

/// An ordered list of snaks supporting a statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub snaks: Vec<Snak>,
}

impl Reference {
    pub fn new(snaks: Vec<Snak>) -> Self {
        Self { snaks }
    }

    pub fn hash(&self) -> String {
        hash::hash_canonical(&self.snaks)
    }

    /// Snaks grouped by property, in order of first appearance
    pub fn grouped_snaks(&self) -> Vec<&Snak> {
        group_by_property(&self.snaks)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub rank: Rank,
    pub mainsnak: Snak,
    #[serde(default)]
    pub qualifiers: Vec<Snak>,
    #[serde(default)]
    pub references: Vec<Reference>,
}

impl Statement {
    pub fn new(mainsnak: Snak) -> Self {
        Self {
            id: None,
            rank: Rank::Normal,
            mainsnak,
            qualifiers: Vec::new(),
            references: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_rank(mut self, rank: Rank) -> Self {
        self.rank = rank;
        self
    }

    pub fn with_qualifier(mut self, snak: Snak) -> Self {
        self.qualifiers.push(snak);
        self
    }

    pub fn with_reference(mut self, reference: Reference) -> Self {
        self.references.push(reference);
        self
    }

    pub fn property(&self) -> &EntityId {
        self.mainsnak.property()
    }

    pub fn hash(&self) -> String {
        hash::hash_canonical(self)
    }

    pub fn grouped_qualifiers(&self) -> Vec<&Snak> {
        group_by_property(&self.qualifiers)
    }

    pub fn has_qualifier_with_hash(&self, hash: &str) -> bool {
        self.qualifiers.iter().any(|q| q.hash() == hash)
    }

    pub fn has_reference_with_hash(&self, hash: &str) -> bool {
        self.references.iter().any(|r| r.hash() == hash)
    }

    /// Local name of the statement node: the GUID with unsafe characters
    /// replaced, or a name derived from the statement content
    pub fn node_name(&self, entity: &EntityId) -> String {
        match &self.id {
            Some(guid) => guid
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '-' })
                .collect(),
            None => format!("{}-{}", entity.local_part(), self.hash()),
        }
    }
}

fn group_by_property(snaks: &[Snak]) -> Vec<&Snak> {
    let mut groups: IndexMap<&EntityId, Vec<&Snak>> = IndexMap::new();
    for snak in snaks {
        groups.entry(snak.property()).or_default().push(snak);
    }
    groups.into_values().flatten().collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteLink {
    pub title: String,
    #[serde(default)]
    pub badges: Vec<EntityId>,
}

/// An item or property as loaded from the entity store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDocument {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub descriptions: BTreeMap<String, String>,
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub claims: Vec<Statement>,
    #[serde(default)]
    pub sitelinks: IndexMap<String, SiteLink>,
    /// Property datatype, properties only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastrevid: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

impl EntityDocument {
    pub fn new(id: EntityId) -> Self {
        Self {
            kind: id.kind(),
            id,
            labels: BTreeMap::new(),
            descriptions: BTreeMap::new(),
            aliases: BTreeMap::new(),
            claims: Vec::new(),
            sitelinks: IndexMap::new(),
            datatype: None,
            lastrevid: None,
            modified: None,
        }
    }

    pub fn with_label(mut self, language: &str, text: &str) -> Self {
        self.labels.insert(language.to_string(), text.to_string());
        self
    }

    pub fn with_description(mut self, language: &str, text: &str) -> Self {
        self.descriptions.insert(language.to_string(), text.to_string());
        self
    }

    pub fn with_alias(mut self, language: &str, text: &str) -> Self {
        self.aliases.entry(language.to_string()).or_default().push(text.to_string());
        self
    }

    pub fn with_statement(mut self, statement: Statement) -> Self {
        self.claims.push(statement);
        self
    }

    pub fn with_sitelink(mut self, site: &str, title: &str, badges: Vec<EntityId>) -> Self {
        self.sitelinks.insert(
            site.to_string(),
            SiteLink {
                title: title.to_string(),
                badges,
            },
        );
        self
    }

    pub fn with_datatype(mut self, datatype: &str) -> Self {
        self.datatype = Some(datatype.to_string());
        self
    }

    /// Parse a single document, a JSON array of documents, or one document per line
    pub fn parse_many(content: &str) -> serde_json::Result<Vec<EntityDocument>> {
        let trimmed = content.trim_start();
        if trimmed.starts_with('[') {
            return serde_json::from_str(trimmed);
        }

        match serde_json::from_str::<EntityDocument>(trimmed) {
            Ok(doc) => Ok(vec![doc]),
            Err(whole_err) => {
                let mut docs = Vec::new();
                for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
                    // dump files separate documents with a trailing comma
                    let line = line.trim_end_matches(',');
                    match serde_json::from_str(line) {
                        Ok(doc) => docs.push(doc),
                        Err(_) if docs.is_empty() => return Err(whole_err),
                        Err(e) => return Err(e),
                    }
                }
                Ok(docs)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(s: &str) -> EntityId {
        EntityId::parse(s).unwrap()
    }

    fn string_snak(property: &str, value: &str) -> Snak {
        Snak::value(pid(property), "string", DataValue::String(value.to_string()))
    }

    #[test]
    fn test_deserialize_entity_document() {
        let json = r#"{
            "id": "Q1", "type": "item",
            "labels": {"en": "Universe"},
            "aliases": {"en": ["cosmos", "all"]},
            "claims": [{
                "id": "Q1$abc", "rank": "preferred",
                "mainsnak": {"snaktype": "value", "property": "P2", "datatype": "wikibase-item",
                             "datavalue": {"type": "wikibase-entityid", "value": {"id": "Q5"}}},
                "qualifiers": [{"snaktype": "novalue", "property": "P3"}],
                "references": [{"snaks": [{"snaktype": "somevalue", "property": "P4"}]}]
            }],
            "sitelinks": {"enwiki": {"title": "Universe", "badges": ["Q17437796"]}}
        }"#;

        let doc: EntityDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.id, pid("Q1"));
        assert_eq!(doc.kind, EntityKind::Item);
        assert_eq!(doc.aliases["en"], vec!["cosmos", "all"]);
        assert_eq!(doc.claims[0].rank, Rank::Preferred);
        assert_eq!(doc.claims[0].property(), &pid("P2"));
        assert!(matches!(doc.claims[0].qualifiers[0], Snak::NoValue { .. }));
        assert_eq!(doc.sitelinks["enwiki"].badges, vec![pid("Q17437796")]);
    }

    #[test]
    fn test_qualifiers_grouped_by_property_preserving_order() {
        let statement = Statement::new(string_snak("P1", "main"))
            .with_qualifier(string_snak("P7", "a"))
            .with_qualifier(string_snak("P3", "b"))
            .with_qualifier(string_snak("P7", "c"));

        let grouped: Vec<String> = statement
            .grouped_qualifiers()
            .iter()
            .map(|s| match s {
                Snak::Value { datavalue: DataValue::String(v), .. } => v.clone(),
                _ => String::new(),
            })
            .collect();

        assert_eq!(grouped, vec!["a", "c", "b"]);
    }

    #[test]
    fn test_hash_lookups() {
        let qualifier = string_snak("P7", "a");
        let reference = Reference::new(vec![string_snak("P4", "source")]);
        let statement = Statement::new(string_snak("P1", "main"))
            .with_qualifier(qualifier.clone())
            .with_reference(reference.clone());

        assert!(statement.has_qualifier_with_hash(&qualifier.hash()));
        assert!(statement.has_reference_with_hash(&reference.hash()));
        assert!(!statement.has_qualifier_with_hash(&reference.hash()));
    }

    #[test]
    fn test_statement_node_name() {
        let entity = pid("Q1");
        let with_guid = Statement::new(string_snak("P1", "x")).with_id("Q1$5ab-C d");
        assert_eq!(with_guid.node_name(&entity), "Q1-5ab-C-d");

        let anonymous = Statement::new(string_snak("P1", "x"));
        assert_eq!(anonymous.node_name(&entity), format!("Q1-{}", anonymous.hash()));
    }

    #[test]
    fn test_parse_many_formats() {
        let single = r#"{"id":"Q1","type":"item"}"#;
        assert_eq!(EntityDocument::parse_many(single).unwrap().len(), 1);

        let array = r#"[{"id":"Q1","type":"item"},{"id":"P2","type":"property","datatype":"string"}]"#;
        assert_eq!(EntityDocument::parse_many(array).unwrap().len(), 2);

        let lines = "{\"id\":\"Q1\",\"type\":\"item\"},\n{\"id\":\"Q2\",\"type\":\"item\"}\n";
        let docs = EntityDocument::parse_many(lines).unwrap();
        assert_eq!(docs[1].id, pid("Q2"));

        assert!(EntityDocument::parse_many("not json").is_err());
    }
}
